use core::error;
use core::fmt::{Display, Formatter, Result};

use bytemuck::PodCastError;

/// The part of the image a decoder was reading when it ran out of bytes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Header,
    Size,
    Name,
    Content,
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let name = match self {
            Field::Header => "header",
            Field::Size => "size",
            Field::Name => "name",
            Field::Content => "content",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum Error {
    Cast(PodCastError),
    CapacityExceeded(usize),
    EmptyInput,
    InvalidEncoding(core::str::Utf8Error),
    TruncatedStream {
        field: Field,
        expected: u64,
        actual: u64,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> Result {
        use Error::*;

        match self {
            Cast(err) => write!(f, "Bytemuck: {:?}", err),
            CapacityExceeded(count) => write!(
                f,
                "Too many entries: {} (at most {})",
                count,
                crate::MAX_ENTRIES
            ),
            EmptyInput => write!(f, "No entries to pack"),
            InvalidEncoding(err) => write!(f, "Entry name is not valid UTF-8: {}", err),
            TruncatedStream {
                field,
                expected,
                actual,
            } => write!(
                f,
                "Truncated {}: expected {} bytes, got {}",
                field, expected, actual
            ),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::InvalidEncoding(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PodCastError> for Error {
    fn from(err: PodCastError) -> Error {
        Error::Cast(err)
    }
}

impl From<core::str::Utf8Error> for Error {
    fn from(err: core::str::Utf8Error) -> Error {
        Error::InvalidEncoding(err)
    }
}
