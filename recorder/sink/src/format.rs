/*!
    Output container format inference.
*/

use std::ffi::{CStr, CString};
use std::path::Path;

use ffmpeg_next::ffi;
use recorder_types::{Error, Result};

/**
    A muxer chosen from an output path's extension.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerFormat {
    name: String,
    flags: i32,
}

impl ContainerFormat {
    /**
        Infer the container format from `path`.

        Fails with an I/O error if no muxer claims the extension.
    */
    pub fn guess(path: &Path) -> Result<Self> {
        let path_str = path
            .to_str()
            .ok_or_else(|| Error::io(format!("path {} is not valid UTF-8", path.display())))?;
        let c_path = CString::new(path_str)
            .map_err(|_| Error::io(format!("path {} contains a NUL byte", path.display())))?;

        unsafe {
            let format = ffi::av_guess_format(std::ptr::null(), c_path.as_ptr(), std::ptr::null());
            if format.is_null() {
                return Err(Error::io(format!(
                    "could not infer a container format from {}",
                    path.display()
                )));
            }
            let name = CStr::from_ptr((*format).name).to_string_lossy().into_owned();
            Ok(Self {
                name,
                flags: (*format).flags,
            })
        }
    }

    /**
        FFmpeg's short name for the muxer, e.g. "mp4" or "avi".
    */
    pub fn name(&self) -> &str {
        &self.name
    }

    /**
        Returns true if the muxer wants codec headers out of band.
    */
    pub fn wants_global_header(&self) -> bool {
        self.flags & ffi::AVFMT_GLOBALHEADER as i32 != 0
    }

    /**
        Returns true if the muxer writes through a file handle we open.
        Muxers that manage their own outputs (image sequences, for one)
        are not.
    */
    pub fn is_file_based(&self) -> bool {
        self.flags & ffi::AVFMT_NOFILE as i32 == 0
    }

    /**
        Returns true for muxers that take a major brand option.
    */
    pub fn supports_brand(&self) -> bool {
        matches!(self.name.as_str(), "mp4" | "mov")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mp4() {
        let format = ContainerFormat::guess(Path::new("out/recording.mp4")).unwrap();
        assert_eq!(format.name(), "mp4");
        assert!(format.wants_global_header());
        assert!(format.is_file_based());
        assert!(format.supports_brand());
    }

    #[test]
    fn avi() {
        let format = ContainerFormat::guess(Path::new("clip.avi")).unwrap();
        assert_eq!(format.name(), "avi");
        assert!(!format.wants_global_header());
        assert!(!format.supports_brand());
    }

    #[test]
    fn matroska() {
        let format = ContainerFormat::guess(Path::new("clip.mkv")).unwrap();
        assert_eq!(format.name(), "matroska");
        assert!(format.wants_global_header());
    }

    #[test]
    fn image_sequence_is_not_file_based() {
        let format = ContainerFormat::guess(Path::new("frame.jpg")).unwrap();
        assert!(!format.is_file_based());
    }

    #[test]
    fn unknown_extension_is_io_error() {
        let err = ContainerFormat::guess(Path::new("clip.notacontainer")).unwrap_err();
        assert_eq!(err.kind(), recorder_types::ErrorKind::Io);
    }
}
