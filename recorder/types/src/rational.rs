/*!
    Rational numbers for frame rates and time bases.
*/

use std::fmt;

/**
    A rational number, `num / den`.

    Used for frame rates (frames per second) and time bases (seconds per tick).
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /**
        Returns `den / num`, e.g. the time base matching a frame rate.
    */
    pub const fn invert(self) -> Self {
        Self {
            num: self.den,
            den: self.num,
        }
    }

    /**
        Best rational approximation of `value` whose denominator does not
        exceed `max_den`, found by walking the continued fraction expansion.

        Returns `None` for non-finite values, a non-positive `max_den`, or
        values whose numerator would not fit in an `i32`.
    */
    pub fn from_f64(value: f64, max_den: i32) -> Option<Self> {
        if !value.is_finite() || max_den <= 0 {
            return None;
        }

        let sign = if value < 0.0 { -1 } else { 1 };
        let mut rem = value.abs();

        // Convergents h/k, seeded with h(-2)/k(-2) = 0/1 and h(-1)/k(-1) = 1/0.
        let (mut h0, mut h1) = (0i64, 1i64);
        let (mut k0, mut k1) = (1i64, 0i64);

        loop {
            let whole = rem.floor();
            if whole > i32::MAX as f64 {
                break;
            }
            let a = whole as i64;
            let h2 = a * h1 + h0;
            let k2 = a * k1 + k0;
            if k2 > max_den as i64 || h2 > i32::MAX as i64 {
                break;
            }
            (h0, h1) = (h1, h2);
            (k0, k1) = (k1, k2);

            let frac = rem - whole;
            if frac < 1e-9 {
                break;
            }
            rem = 1.0 / frac;
        }

        if k1 == 0 {
            return None;
        }
        Some(Self::new(sign * h1 as i32, k1 as i32))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_rates() {
        assert_eq!(Rational::from_f64(30.0, 1000), Some(Rational::new(30, 1)));
        assert_eq!(Rational::from_f64(24.0, 1000), Some(Rational::new(24, 1)));
    }

    #[test]
    fn fractional_rates() {
        assert_eq!(
            Rational::from_f64(29.97, 1000),
            Some(Rational::new(2997, 100))
        );
        assert_eq!(
            Rational::from_f64(23.976, 1000),
            Some(Rational::new(2997, 125))
        );
        assert_eq!(Rational::from_f64(12.5, 1000), Some(Rational::new(25, 2)));
    }

    #[test]
    fn denominator_is_bounded() {
        let r = Rational::from_f64(std::f64::consts::PI, 1000).unwrap();
        assert!(r.den <= 1000);
        let value = r.num as f64 / r.den as f64;
        assert!((value - std::f64::consts::PI).abs() < 1e-5);
    }

    #[test]
    fn rejects_unrepresentable() {
        assert_eq!(Rational::from_f64(f64::NAN, 1000), None);
        assert_eq!(Rational::from_f64(f64::INFINITY, 1000), None);
        assert_eq!(Rational::from_f64(1e12, 1000), None);
        assert_eq!(Rational::from_f64(30.0, 0), None);
    }

    #[test]
    fn invert_gives_time_base() {
        assert_eq!(Rational::new(30, 1).invert(), Rational::new(1, 30));
        assert_eq!(Rational::new(30, 1).to_string(), "30/1");
    }
}
