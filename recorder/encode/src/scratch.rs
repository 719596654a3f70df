/*!
    Reusable byte buffer for converted frames.
*/

/**
    Grow-only byte buffer. Holds the pixel-converted image between the
    scaler and the codec; reallocated only when a larger image is needed.
*/
#[derive(Debug, Default)]
pub struct ScratchBuffer {
    data: Vec<u8>,
}

impl ScratchBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Make the buffer at least `required` bytes long.

        Returns true if the buffer was reallocated. A buffer that is already
        large enough is left untouched.
    */
    pub fn ensure(&mut self, required: usize) -> bool {
        if self.data.len() >= required {
            return false;
        }
        self.data = vec![0; required];
        true
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /**
        Free the allocation.
    */
    pub fn release(&mut self) {
        self.data = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_only() {
        let mut scratch = ScratchBuffer::new();
        assert!(scratch.is_empty());
        assert!(scratch.ensure(100));
        assert_eq!(scratch.len(), 100);
        assert!(!scratch.ensure(100));
        assert!(!scratch.ensure(10));
        assert_eq!(scratch.len(), 100);
        assert!(scratch.ensure(200));
        assert_eq!(scratch.len(), 200);
    }

    #[test]
    fn release_frees() {
        let mut scratch = ScratchBuffer::new();
        scratch.ensure(64);
        scratch.release();
        assert!(scratch.is_empty());
        assert!(scratch.ensure(1));
    }
}
