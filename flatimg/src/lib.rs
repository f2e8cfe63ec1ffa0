use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

pub use flatimg_core::{DecodedEntry, EntryHead, Header, ImageSrc};

/// Build a closure that wraps an [`io::Error`] into [`Error::Io`], optionally
/// recording the path it happened on.
macro_rules! wrap_io_err {
    ($path:expr, $context:expr) => {
        |source| $crate::Error::Io {
            source,
            path: Some(AsRef::<::std::path::Path>::as_ref(&$path).to_path_buf()),
            context: $context,
        }
    };
    ($context:expr) => {
        |source| $crate::Error::Io {
            source,
            path: None,
            context: $context,
        }
    };
}

mod bin;
mod builder;
pub mod ext;
mod image;
mod report;

pub use bin::*;
pub use builder::*;
pub use image::*;
pub use report::*;

const READ_WRITE_BUF_SIZE: usize = 4 * 1024 * 1024;

fn fmt_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" ({})", path.display()),
        None => String::new(),
    }
}

#[derive(thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] flatimg_core::Error),

    #[error("{context}{}", fmt_path(.path))]
    Io {
        #[source]
        source: io::Error,
        path: Option<PathBuf>,
        context: &'static str,
    },

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Invalid input {}: {reason}", .path.display())]
    InvalidInput { path: PathBuf, reason: &'static str },

    #[error("Invalid path component {} in entry {}", .component.display(), .entry.display())]
    InvalidPath { entry: PathBuf, component: PathBuf },

    #[error("Size of {} changed while packing: expected {expected}, got {actual}", .path.display())]
    LengthMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("Entry {index}")]
    Entry {
        index: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attach the 1-based entry index this error happened on
    pub fn entry(self, index: usize) -> Error {
        match self {
            Error::Entry { .. } => self,
            other => Error::Entry {
                index,
                source: Box::new(other),
            },
        }
    }

    /// Record `path` on an I/O error that doesn't have one yet
    pub fn path(self, new_path: impl AsRef<Path>) -> Error {
        match self {
            Error::Io {
                source,
                path: None,
                context,
            } => Error::Io {
                source,
                path: Some(new_path.as_ref().to_path_buf()),
                context,
            },
            Error::Entry { index, source } => Error::Entry {
                index,
                source: Box::new(source.path(new_path)),
            },
            other => other,
        }
    }

    /// The codec error underneath any context, if there is one
    pub fn core(&self) -> Option<&flatimg_core::Error> {
        match self {
            Error::Core(err) => Some(err),
            Error::Entry { source, .. } => source.core(),
            _ => None,
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{self}")?;

        let mut source = self.source();
        while let Some(err) = source {
            writeln!(f, "\tCaused by: {err}")?;
            source = err.source();
        }

        Ok(())
    }
}
