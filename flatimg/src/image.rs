use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use bytemuck::Zeroable;
use flatimg_core::{DecodedEntry, Header, ImageSrc};

use crate::Error;

/// Sequential reader over an image held by any [`Read`] source.
///
/// The header is read on construction; entries are then decoded one at a
/// time, in order.
#[derive(Debug)]
pub struct ImageReader<R> {
    src: R,
    header: Header,
    /// Entries decoded so far
    decoded: usize,
}

impl<R: Read> ImageReader<R> {
    pub fn new(src: R) -> Result<ImageReader<R>, Error> {
        let mut new = ImageReader {
            src,
            // Need a blank header to construct the reader, since reading the
            //   real one goes through ImageSrc
            header: Header::zeroed(),
            decoded: 0,
        };

        new.header = new.read_header()?;
        Ok(new)
    }

    pub fn header(&self) -> Header {
        self.header
    }

    /// Entries declared by the header that have not been decoded yet
    pub fn remaining(&self) -> usize {
        self.header.count() - self.decoded
    }

    /// Decode the next entry, returning it with its 1-based index, or `None`
    /// once every declared entry has been read.
    pub fn next_entry(&mut self) -> Result<Option<(usize, DecodedEntry)>, Error> {
        if self.remaining() == 0 {
            return Ok(None);
        }
        let index = self.decoded + 1;
        let entry = self.read_entry().map_err(|err| err.entry(index))?;
        self.decoded = index;
        Ok(Some((index, entry)))
    }

    /// Consume whatever follows the last declared entry and count it. Only
    /// meaningful once [`next_entry`](Self::next_entry) has returned `None`.
    pub fn trailing_bytes(&mut self) -> Result<u64, Error> {
        io::copy(&mut self.src, &mut io::sink()).map_err(wrap_io_err!("Read trailing data"))
    }

    pub fn into_inner(self) -> R {
        self.src
    }
}

impl<R: Read> ImageSrc for ImageReader<R> {
    type Err = Error;

    fn read_fill(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.src.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(count) => filled += count,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(source) => {
                    return Err(Error::Io {
                        source,
                        path: None,
                        context: "Read image",
                    })
                }
            }
        }
        Ok(filled)
    }
}

/// An image file on disk
#[derive(Debug)]
pub struct ImageFile {
    path: PathBuf,
    reader: ImageReader<BufReader<File>>,
}

impl ImageFile {
    pub fn open(path: impl AsRef<Path>) -> Result<ImageFile, Error> {
        let path = path.as_ref().to_path_buf();

        let file = File::open(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => Error::FileNotFound(path.clone()),
            _ => Error::Io {
                source,
                path: Some(path.clone()),
                context: "Open image",
            },
        })?;
        if !file
            .metadata()
            .map_err(wrap_io_err!(path, "Stat image"))?
            .is_file()
        {
            return Err(Error::NotAFile(path));
        }

        let reader = ImageReader::new(BufReader::new(file)).map_err(|err| err.path(&path))?;
        Ok(ImageFile { path, reader })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> Header {
        self.reader.header()
    }

    pub fn next_entry(&mut self) -> Result<Option<(usize, DecodedEntry)>, Error> {
        self.reader.next_entry().map_err(|err| err.path(&self.path))
    }

    pub fn trailing_bytes(&mut self) -> Result<u64, Error> {
        self.reader.trailing_bytes().map_err(|err| err.path(&self.path))
    }
}
