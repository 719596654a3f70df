use recorder_types::RowOrder;

/**
    Synthetic RGBA frame source.

    Produces a gradient that drifts a little every frame, laid out in the
    requested row order so the encoded video always shows the same image.
*/
pub struct PatternSource {
    width: u32,
    height: u32,
    row_order: RowOrder,
    index: u32,
    buffer: Vec<u8>,
}

impl PatternSource {
    pub fn new(width: u32, height: u32, row_order: RowOrder) -> Self {
        Self {
            width,
            height,
            row_order,
            index: 0,
            buffer: vec![0; width as usize * height as usize * 4],
        }
    }

    /**
        Render the next frame into the internal buffer and return it.
    */
    pub fn next_frame(&mut self) -> &[u8] {
        let stride = self.width as usize * 4;
        let t = self.index;

        for y in 0..self.height {
            let row = match self.row_order {
                RowOrder::TopDown => y,
                RowOrder::BottomUp => self.height - 1 - y,
            } as usize;
            let line = &mut self.buffer[row * stride..(row + 1) * stride];
            for (x, pixel) in line.chunks_exact_mut(4).enumerate() {
                let x = x as u32;
                pixel[0] = (x + t) as u8;
                pixel[1] = (y + t * 2) as u8;
                pixel[2] = ((x + y) / 4 + t) as u8;
                pixel[3] = 255;
            }
        }

        self.index += 1;
        &self.buffer
    }

    /// Frames produced so far.
    pub fn frames(&self) -> u32 {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_size_and_alpha() {
        let mut source = PatternSource::new(8, 4, RowOrder::TopDown);
        let frame = source.next_frame();
        assert_eq!(frame.len(), 8 * 4 * 4);
        assert!(frame.chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test]
    fn frames_change() {
        let mut source = PatternSource::new(8, 4, RowOrder::TopDown);
        let first = source.next_frame().to_vec();
        let second = source.next_frame().to_vec();
        assert_ne!(first, second);
        assert_eq!(source.frames(), 2);
    }

    #[test]
    fn bottom_up_mirrors_rows() {
        let mut top_down = PatternSource::new(8, 4, RowOrder::TopDown);
        let mut bottom_up = PatternSource::new(8, 4, RowOrder::BottomUp);
        let a = top_down.next_frame().to_vec();
        let b = bottom_up.next_frame().to_vec();

        let stride = 8 * 4;
        for row in 0..4 {
            let mirrored = 3 - row;
            assert_eq!(
                &a[row * stride..(row + 1) * stride],
                &b[mirrored * stride..(mirrored + 1) * stride]
            );
        }
    }
}
