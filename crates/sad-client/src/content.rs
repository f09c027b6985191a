//! Profile content passed to write and append.

use std::fmt;
use std::io::Read;

use crate::error::ClientError;

/// Bytes to upload, either in memory or behind a reader.
///
/// A reader is drained completely before any request goes out.
pub enum Content {
    Bytes(Vec<u8>),
    Reader(Box<dyn Read + Send>),
}

impl Content {
    /// Wrap a reader.
    pub fn reader(reader: impl Read + Send + 'static) -> Self {
        Self::Reader(Box::new(reader))
    }

    /// Collect the full payload.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidArgument`] if the reader fails.
    pub fn into_bytes(self) -> Result<Vec<u8>, ClientError> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::Reader(mut reader) => {
                let mut bytes = Vec::new();
                reader
                    .read_to_end(&mut bytes)
                    .map_err(|e| ClientError::InvalidArgument(format!("unreadable content: {e}")))?;
                Ok(bytes)
            }
        }
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Reader(_) => f.write_str("Reader"),
        }
    }
}

impl From<Vec<u8>> for Content {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for Content {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Bytes(text.as_bytes().to_vec())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Bytes(text.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "closed"))
        }
    }

    #[test]
    fn bytes_pass_through() {
        assert_eq!(Content::from("abc").into_bytes().unwrap(), b"abc");
    }

    #[test]
    fn reader_is_drained() {
        let content = Content::reader(io::Cursor::new(vec![1u8, 2, 3]));
        assert_eq!(content.into_bytes().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn failing_reader_is_invalid_argument() {
        let err = Content::reader(Broken).into_bytes().unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(msg) if msg.contains("closed")));
    }
}
