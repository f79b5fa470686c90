// Error taxonomy for compression streams.

use std::io;

/// Errors raised by [`Deflater`](crate::Deflater) and the codec binding.
#[derive(Debug, thiserror::Error)]
pub enum DeflateError {
    /// The codec rejected stream construction or reset.
    #[error("deflate stream initialization failed: {message} (code {code})")]
    Initialization { code: i32, message: String },

    /// An operation was invoked in a state that does not allow it.
    #[error("illegal deflate stream state: {0}")]
    State(String),

    /// The codec returned a fatal status. The stream is unusable afterwards.
    #[error("deflate codec error: {message} (code {code})")]
    Codec { code: i32, message: String },

    /// A caller-supplied `offset`/`len` pair does not fit its buffer.
    #[error("range {offset}+{len} is out of bounds for a buffer of {buf_len} bytes")]
    Bounds {
        offset: usize,
        len: usize,
        buf_len: usize,
    },

    /// A parameter value outside its documented range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl DeflateError {
    /// The codec status code carried by this error, if any.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Initialization { code, .. } | Self::Codec { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<DeflateError> for io::Error {
    fn from(e: DeflateError) -> Self {
        let kind = match e {
            DeflateError::Bounds { .. } | DeflateError::InvalidArgument(_) => {
                io::ErrorKind::InvalidInput
            }
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, e)
    }
}

/// Check that `offset..offset + len` lies within a buffer of `buf_len` bytes.
pub(crate) fn check_range(offset: usize, len: usize, buf_len: usize) -> Result<(), DeflateError> {
    match offset.checked_add(len) {
        Some(end) if end <= buf_len => Ok(()),
        _ => Err(DeflateError::Bounds {
            offset,
            len,
            buf_len,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_checks() {
        assert!(check_range(0, 0, 0).is_ok());
        assert!(check_range(0, 11, 11).is_ok());
        assert!(check_range(11, 0, 11).is_ok());
        assert!(check_range(5, 7, 11).is_err());
        assert!(check_range(12, 0, 11).is_err());
        assert!(matches!(
            check_range(usize::MAX, 2, 11),
            Err(DeflateError::Bounds { offset: usize::MAX, len: 2, buf_len: 11 })
        ));
    }

    #[test]
    fn io_error_kind_mapping() {
        let e: io::Error = DeflateError::Bounds {
            offset: 1,
            len: 2,
            buf_len: 0,
        }
        .into();
        assert_eq!(e.kind(), io::ErrorKind::InvalidInput);

        let e: io::Error = DeflateError::State("ended".into()).into();
        assert_eq!(e.kind(), io::ErrorKind::Other);
        assert!(e.to_string().contains("ended"));
    }

    #[test]
    fn codes_are_exposed() {
        let e = DeflateError::Codec {
            code: -2,
            message: "stream error".into(),
        };
        assert_eq!(e.code(), Some(-2));
        assert_eq!(DeflateError::State("x".into()).code(), None);
    }
}
