/*!
    Packet drain loop.

    After a frame (or end-of-stream) is submitted, the codec is polled until
    it has nothing more to give. "Needs more input" and "fully flushed" both
    end the loop normally; anything else is an encoding failure.
*/

use ffmpeg_next::{Error as FFmpegError, ffi};
use recorder_types::{Error, Result};

/**
    Outcome of one poll of the codec.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Drained {
    /// A packet was produced (and handed on).
    Packet,
    /// The codec needs another frame before it can produce more.
    Pending,
    /// The codec has been flushed and will produce nothing more.
    Finished,
}

/**
    Classify the result of `avcodec_receive_packet`.
*/
pub fn classify(result: std::result::Result<(), FFmpegError>) -> Result<Drained> {
    match result {
        Ok(()) => Ok(Drained::Packet),
        Err(FFmpegError::Other { errno }) if errno == ffi::EAGAIN => Ok(Drained::Pending),
        Err(FFmpegError::Eof) => Ok(Drained::Finished),
        Err(e) => Err(Error::encoding(format!("failed to receive packet: {e}"))),
    }
}

/**
    Poll `step` until it stops producing packets.

    Returns the number of packets produced. The first error ends the loop
    and is returned as-is.
*/
pub fn drain<F>(mut step: F) -> Result<u64>
where
    F: FnMut() -> Result<Drained>,
{
    let mut packets = 0;
    loop {
        match step()? {
            Drained::Packet => packets += 1,
            Drained::Pending | Drained::Finished => return Ok(packets),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recorder_types::ErrorKind;

    fn scripted(script: Vec<Result<Drained>>) -> impl FnMut() -> Result<Drained> {
        let mut script = script.into_iter();
        move || script.next().expect("drain polled past the end of the script")
    }

    #[test]
    fn classify_results() {
        assert_eq!(classify(Ok(())).unwrap(), Drained::Packet);
        assert_eq!(
            classify(Err(FFmpegError::Other {
                errno: ffi::EAGAIN
            }))
            .unwrap(),
            Drained::Pending
        );
        assert_eq!(classify(Err(FFmpegError::Eof)).unwrap(), Drained::Finished);

        let err = classify(Err(FFmpegError::InvalidData)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
    }

    #[test]
    fn counts_packets_until_pending() {
        let step = scripted(vec![
            Ok(Drained::Packet),
            Ok(Drained::Packet),
            Ok(Drained::Pending),
        ]);
        assert_eq!(drain(step).unwrap(), 2);
    }

    #[test]
    fn stops_at_end_of_stream() {
        let step = scripted(vec![Ok(Drained::Packet), Ok(Drained::Finished)]);
        assert_eq!(drain(step).unwrap(), 1);
    }

    #[test]
    fn nothing_pending_is_success() {
        let step = scripted(vec![Ok(Drained::Pending)]);
        assert_eq!(drain(step).unwrap(), 0);
    }

    #[test]
    fn error_stops_polling() {
        let mut calls = 0;
        let result = drain(|| {
            calls += 1;
            match calls {
                1 => Ok(Drained::Packet),
                _ => Err(Error::mux("disk full")),
            }
        });
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Mux);
        assert_eq!(calls, 2);
    }
}
