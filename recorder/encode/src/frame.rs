/*!
    Zero-copy binding of caller memory to FFmpeg frames.

    The encoder keeps two long-lived frame shells (source and converted) and
    points their planes at caller-owned memory for the duration of a single
    `encode` call. A binding unbinds on drop, so the frame never outlives the
    memory it points at.
*/

use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use ffmpeg_next::{ffi, format::Pixel, frame::Video as VideoFrameFFmpeg};
use recorder_types::{Error, Result};

/**
    Allocate an empty frame shell with format and dimensions set but no
    pixel storage.
*/
pub(crate) fn frame_shell(format: Pixel, width: u32, height: u32) -> VideoFrameFFmpeg {
    let mut frame = VideoFrameFFmpeg::empty();
    frame.set_format(format);
    frame.set_width(width);
    frame.set_height(height);
    frame
}

/**
    Bytes needed for one tightly packed (alignment 1) image.
*/
pub(crate) fn image_buffer_size(format: Pixel, width: u32, height: u32) -> Result<usize> {
    let size = unsafe {
        ffi::av_image_get_buffer_size(format.into(), width as i32, height as i32, 1)
    };
    if size < 0 {
        return Err(Error::configuration(format!(
            "cannot size a {width}x{height} {format:?} image"
        )));
    }
    Ok(size as usize)
}

/**
    A frame whose planes point into borrowed memory.
*/
pub(crate) struct PlaneBinding<'a> {
    frame: &'a mut VideoFrameFFmpeg,
    _data: PhantomData<&'a mut [u8]>,
}

impl<'a> PlaneBinding<'a> {
    /**
        Bind a frame the encoder only reads from.
    */
    pub(crate) fn read_only(frame: &'a mut VideoFrameFFmpeg, data: &'a [u8]) -> Result<Self> {
        unsafe { Self::bind(frame, data.as_ptr(), data.len()) }
    }

    /**
        Bind a frame the scaler writes into.
    */
    pub(crate) fn writable(frame: &'a mut VideoFrameFFmpeg, data: &'a mut [u8]) -> Result<Self> {
        unsafe { Self::bind(frame, data.as_mut_ptr(), data.len()) }
    }

    /// # Safety
    /// `data` must be valid for `len` bytes for all of `'a`.
    unsafe fn bind(frame: &'a mut VideoFrameFFmpeg, data: *const u8, len: usize) -> Result<Self> {
        let required = image_buffer_size(frame.format(), frame.width(), frame.height())?;
        if len < required {
            return Err(Error::invalid_data(format!(
                "frame buffer holds {len} bytes, {required} required"
            )));
        }

        let format: ffi::AVPixelFormat = frame.format().into();
        let (width, height) = (frame.width() as i32, frame.height() as i32);
        let filled = unsafe {
            let ptr = frame.as_mut_ptr();
            ffi::av_image_fill_arrays(
                (*ptr).data.as_mut_ptr(),
                (*ptr).linesize.as_mut_ptr(),
                data,
                format,
                width,
                height,
                1,
            )
        };
        if filled < 0 {
            unbind(frame);
            return Err(Error::encoding(format!(
                "failed to bind frame planes: {}",
                ffmpeg_next::Error::from(filled)
            )));
        }

        Ok(Self {
            frame,
            _data: PhantomData,
        })
    }

    /**
        Present the image upside down without touching pixel data: each
        plane starts at its last row and walks backwards.
    */
    pub(crate) fn flip_rows(&mut self) {
        for plane in 0..self.frame.planes() {
            let rows = self.frame.plane_height(plane) as isize;
            unsafe {
                let ptr = self.frame.as_mut_ptr();
                let stride = (*ptr).linesize[plane] as isize;
                (*ptr).data[plane] = (*ptr).data[plane].offset(stride * (rows - 1));
                (*ptr).linesize[plane] = -(*ptr).linesize[plane];
            }
        }
    }

    /**
        Current stride of `plane`; negative once flipped.
    */
    #[cfg(test)]
    pub(crate) fn linesize(&self, plane: usize) -> i32 {
        unsafe { (*self.frame.as_ptr()).linesize[plane] }
    }

    #[cfg(test)]
    pub(crate) fn plane_ptr(&self, plane: usize) -> *const u8 {
        unsafe { (*self.frame.as_ptr()).data[plane] }
    }
}

impl Deref for PlaneBinding<'_> {
    type Target = VideoFrameFFmpeg;

    fn deref(&self) -> &Self::Target {
        self.frame
    }
}

impl DerefMut for PlaneBinding<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.frame
    }
}

impl Drop for PlaneBinding<'_> {
    fn drop(&mut self) {
        unbind(self.frame);
    }
}

/**
    Detach a frame from whatever memory its planes point at.
*/
fn unbind(frame: &mut VideoFrameFFmpeg) {
    unsafe {
        let ptr = frame.as_mut_ptr();
        for plane in 0..ffi::AV_NUM_DATA_POINTERS as usize {
            (*ptr).data[plane] = std::ptr::null_mut();
            (*ptr).linesize[plane] = 0;
        }
    }
}
