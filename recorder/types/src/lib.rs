/*!
    Shared types for the recording pipeline.

    This crate defines the types that cross crate boundaries between the
    encoder, the container writer and whatever produces frames. It has no
    dependency on FFmpeg, so a frame producer can depend on it without
    pulling in FFmpeg bindings.
*/

mod codec;
mod error;
mod format;
mod rational;

pub use codec::CodecId;
pub use error::{Error, ErrorKind, ParseError, Result};
pub use format::{PixelFormat, RowOrder, SampleFormat};
pub use rational::Rational;
