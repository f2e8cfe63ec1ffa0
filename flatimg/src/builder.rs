use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use flatimg_core::{truncate_name, EntryHead, Header, ENTRY_HEAD_SIZE, HEADER_SIZE};

use crate::ext::entry_name;
use crate::{Error, Event, Reporter, READ_WRITE_BUF_SIZE};

/// Copy exactly `size` bytes from `read` to `write`, returning how many were
/// actually available.
fn copy_sized<R: Read, W: Write>(
    read: R,
    mut write: W,
    size: u64,
    buf: &mut [u8],
) -> io::Result<u64> {
    let mut read = read.take(size);
    let mut total = 0;
    loop {
        let count = match read.read(buf) {
            Ok(0) => break,
            Ok(count) => count,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        write.write_all(&buf[..count])?;
        total += count as u64;
    }
    Ok(total)
}

/// Make sure `source` names an existing regular file that can be opened
/// for reading. The handle is dropped again; it is reopened when written.
fn check_source(source: &Path) -> Result<(), Error> {
    let file = File::open(source).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => Error::FileNotFound(source.to_path_buf()),
        _ => Error::Io {
            source: err,
            path: Some(source.to_path_buf()),
            context: "Open source file",
        },
    })?;
    let metadata = file
        .metadata()
        .map_err(wrap_io_err!(source, "Stat source file"))?;
    if !metadata.is_file() {
        return Err(Error::NotAFile(source.to_path_buf()));
    }
    Ok(())
}

#[derive(Debug)]
struct BuilderEntry {
    /// Name stored in the image
    name: String,
    kind: BuilderEntryKind,
}

enum BuilderEntryKind {
    /// Path to a regular file on the packing system
    File(PathBuf),

    /// Content held in memory
    Bytes(Vec<u8>),
}

impl fmt::Debug for BuilderEntryKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use BuilderEntryKind::*;
        match self {
            File(p) => write!(f, "BuilderEntryKind::File({:?})", p),
            Bytes(b) => write!(f, "BuilderEntryKind::Bytes({} bytes)", b.len()),
        }
    }
}

/// Builder pattern for constructing images. Holds an ordered list of entries
/// and consumes itself to write the image.
///
/// Entries keep the order they were added in. Sources on disk are only
/// checked when added and read when the image is written.
///
/// # Example
/// ```
/// use std::io::Cursor;
///
/// use flatimg::{ImageBuilder, NullReporter};
///
/// let mut image = Cursor::new(Vec::new());
///
/// let mut builder = ImageBuilder::new();
/// builder
///     .file_bytes("hello.txt", &b"hello"[..])
///     .file_bytes("empty.bin", Vec::<u8>::new());
///
/// let written = builder.write_image(&mut image, &mut NullReporter).unwrap();
/// assert_eq!(written, 1 + (264 + 5) + 264);
/// assert_eq!(image.into_inner()[0], 2);
/// ```
#[derive(Debug, Default)]
pub struct ImageBuilder {
    entries: Vec<BuilderEntry>,
}

impl ImageBuilder {
    pub fn new() -> ImageBuilder {
        ImageBuilder::default()
    }

    /// Add a regular file. Only the basename of `source` is stored.
    pub fn file(&mut self, source: impl AsRef<Path>) -> Result<&mut ImageBuilder, Error> {
        let source = source.as_ref();
        check_source(source)?;
        let name = entry_name(source)?.to_string();
        self.entries.push(BuilderEntry {
            name,
            kind: BuilderEntryKind::File(source.to_path_buf()),
        });
        Ok(self)
    }

    /// Add an entry from memory under `name`
    pub fn file_bytes(
        &mut self,
        name: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> &mut ImageBuilder {
        self.entries.push(BuilderEntry {
            name: name.into(),
            kind: BuilderEntryKind::Bytes(content.into()),
        });
        self
    }

    /// Add every regular file directly inside `dir`, sorted by file name.
    /// Subdirectories and special files are skipped.
    pub fn dir(&mut self, dir: impl AsRef<Path>) -> Result<&mut ImageBuilder, Error> {
        let dir = dir.as_ref();
        match fs::metadata(dir) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Err(Error::NotADirectory(dir.to_path_buf())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(Error::FileNotFound(dir.to_path_buf()));
            }
            Err(source) => {
                return Err(Error::Io {
                    source,
                    path: Some(dir.to_path_buf()),
                    context: "Stat directory",
                });
            }
        }

        let mut read_dir = Vec::new();
        for entry_res in fs::read_dir(dir).map_err(wrap_io_err!(dir, "Read directory"))? {
            let entry = entry_res.map_err(wrap_io_err!(dir, "Read directory"))?;
            let file_type = entry
                .file_type()
                .map_err(wrap_io_err!(entry.path(), "Stat directory entry"))?;
            if file_type.is_file() {
                read_dir.push(entry);
            }
        }
        read_dir.sort_by_key(|entry| entry.file_name());

        for entry in read_dir {
            self.file(entry.path())?;
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Refuse to write over one of this builder's own sources. `output` not
    /// existing yet is fine.
    pub fn check_output(&self, output: impl AsRef<Path>) -> Result<(), Error> {
        let output = output.as_ref();
        let out_meta = match fs::metadata(output) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(Error::Io {
                    source,
                    path: Some(output.to_path_buf()),
                    context: "Stat image",
                });
            }
        };

        for entry in &self.entries {
            if let BuilderEntryKind::File(path) = &entry.kind {
                let src_meta = fs::metadata(path).map_err(wrap_io_err!(path, "Stat source file"))?;
                if src_meta.dev() == out_meta.dev() && src_meta.ino() == out_meta.ino() {
                    return Err(Error::InvalidInput {
                        path: path.clone(),
                        reason: "output is also an input",
                    });
                }
            }
        }
        Ok(())
    }

    /// Validate the entry count, returning the header that would be written
    pub fn header(&self) -> Result<Header, Error> {
        Ok(Header::new(self.entries.len())?)
    }

    /// Consume this `ImageBuilder`, writing the header followed by every
    /// entry. Returns the number of bytes written.
    ///
    /// Fails before writing anything if the entry count is out of range.
    pub fn write_image<W>(self, writer: &mut W, reporter: &mut dyn Reporter) -> Result<u64, Error>
    where
        W: Write,
    {
        let header = self.header()?;
        writer
            .write_all(&header.to_bytes())
            .map_err(wrap_io_err!("Write header"))?;
        let mut written = HEADER_SIZE as u64;

        let mut buf = vec![0; READ_WRITE_BUF_SIZE];
        for (i, entry) in self.entries.into_iter().enumerate() {
            let index = i + 1;
            let size = match entry.kind {
                BuilderEntryKind::File(source) => {
                    write_file_entry(writer, &entry.name, &source, &mut buf)
                        .map_err(|err| err.entry(index))?
                }
                BuilderEntryKind::Bytes(content) => {
                    let head = EntryHead::new(&entry.name, content.len() as u64);
                    write_bytes_entry(writer, &head, &content).map_err(|err| err.entry(index))?;
                    head.size()
                }
            };

            let stored = truncate_name(&entry.name);
            if stored.len() != entry.name.len() {
                reporter.report(Event::NameTruncated {
                    index,
                    name: entry.name.clone(),
                    stored: stored.to_string(),
                });
            }
            reporter.report(Event::Packed {
                index,
                name: entry.name,
                size,
            });
            written += ENTRY_HEAD_SIZE as u64 + size;
        }
        Ok(written)
    }
}

fn write_bytes_entry<W: Write>(writer: &mut W, head: &EntryHead, content: &[u8]) -> Result<(), Error> {
    writer
        .write_all(head.as_bytes())
        .map_err(wrap_io_err!("Write entry head"))?;
    writer
        .write_all(content)
        .map_err(wrap_io_err!("Write entry content"))
}

/// Stream one file into `writer`, failing if its length changed since the
/// entry head was written.
fn write_file_entry<W: Write>(
    writer: &mut W,
    name: &str,
    path: &Path,
    buf: &mut [u8],
) -> Result<u64, Error> {
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
        _ => Error::Io {
            source,
            path: Some(path.to_path_buf()),
            context: "Open source file",
        },
    })?;
    let expected = file
        .metadata()
        .map_err(wrap_io_err!(path, "Stat source file"))?
        .len();

    let head = EntryHead::new(name, expected);
    writer
        .write_all(head.as_bytes())
        .map_err(wrap_io_err!("Write entry head"))?;

    let actual = copy_sized(file, &mut *writer, expected, buf)
        .map_err(wrap_io_err!(path, "Copy source file"))?;
    if actual != expected {
        return Err(Error::LengthMismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(actual)
}
