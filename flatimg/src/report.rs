//! Progress and anomaly reporting. The library never prints; callers pick
//! where events go by passing a [`Reporter`].
use std::path::PathBuf;

use tracing::{debug, info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// An entry was appended to the image being written
    Packed {
        index: usize,
        name: String,
        size: u64,
    },
    /// A source name did not fit the name field and was shortened
    NameTruncated {
        index: usize,
        name: String,
        stored: String,
    },
    ImageWritten {
        path: PathBuf,
        entries: usize,
        bytes: u64,
    },
    CreatedDir(PathBuf),
    /// An entry was written out during unpacking
    Unpacked {
        index: usize,
        name: String,
        size: u64,
        path: PathBuf,
    },
    /// An entry had an empty name and was given a generated one
    GeneratedName {
        index: usize,
        name: String,
    },
    /// The image header declared zero entries
    EmptyImage,
    /// Bytes left over after the last declared entry
    TrailingData {
        bytes: u64,
    },
}

pub trait Reporter {
    fn report(&mut self, event: Event);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, event: Event) {
        (**self).report(event)
    }
}

/// Collects every event, mostly useful in tests
impl Reporter for Vec<Event> {
    fn report(&mut self, event: Event) {
        self.push(event);
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&mut self, _event: Event) {}
}

/// Forwards events to `tracing`: progress at info, anomalies at warn
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&mut self, event: Event) {
        match event {
            Event::Packed { index, name, size } => {
                info!(index, size, "packed {}", name);
            }
            Event::NameTruncated {
                index,
                name,
                stored,
            } => {
                warn!(index, "name {:?} truncated to {:?}", name, stored);
            }
            Event::ImageWritten {
                path,
                entries,
                bytes,
            } => {
                info!(entries, bytes, "wrote image {}", path.display());
            }
            Event::CreatedDir(path) => {
                debug!("created directory {}", path.display());
            }
            Event::Unpacked {
                index,
                name,
                size,
                path,
            } => {
                info!(index, size, "unpacked {} -> {}", name, path.display());
            }
            Event::GeneratedName { index, name } => {
                warn!(index, "entry has no name, using {}", name);
            }
            Event::EmptyImage => {
                warn!("image contains no entries");
            }
            Event::TrailingData { bytes } => {
                warn!(bytes, "{} bytes of unused data at end of image", bytes);
            }
        }
    }
}
