use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::{EntryHead, Error, Field, Header, HEADER_SIZE, NAME_SIZE};

/// Content is pulled in pieces no larger than this, so a corrupt size field
/// can't force a huge allocation before the stream runs out.
const CONTENT_CHUNK_SIZE: usize = 64 * 1024;

/// One entry as read back from an image
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedEntry {
    pub name: String,
    pub content: Vec<u8>,
}

impl DecodedEntry {
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// A sequential source of image bytes.
pub trait ImageSrc {
    type Err: From<Error>;

    /// Fill as much of `buf` as the source can. A count smaller than
    /// `buf.len()` means the stream has ended.
    fn read_fill(&mut self, buf: &mut [u8]) -> Result<usize, Self::Err>;

    /// Fill all of `buf`, or fail with [`Error::TruncatedStream`]
    fn read_field(&mut self, field: Field, buf: &mut [u8]) -> Result<(), Self::Err> {
        let count = self.read_fill(buf)?;
        if count != buf.len() {
            return Err(Error::TruncatedStream {
                field,
                expected: buf.len() as u64,
                actual: count as u64,
            }
            .into());
        }
        Ok(())
    }

    fn read_header(&mut self) -> Result<Header, Self::Err> {
        let mut data = [0; HEADER_SIZE];
        self.read_field(Field::Header, &mut data)?;
        Ok(Header::from_bytes(data))
    }

    fn read_entry_head(&mut self) -> Result<EntryHead, Self::Err> {
        let mut size = [0; 8];
        self.read_field(Field::Size, &mut size)?;

        let mut name = [0; NAME_SIZE];
        self.read_field(Field::Name, &mut name)?;

        // The size field keeps its on-disk byte order
        Ok(EntryHead {
            size: u64::from_ne_bytes(size),
            name,
        })
    }

    fn read_content(&mut self, size: u64) -> Result<Vec<u8>, Self::Err> {
        let mut content = Vec::new();
        let mut remaining = size;
        while remaining > 0 {
            // Never more than CONTENT_CHUNK_SIZE, so this always fits in usize
            let want = remaining.min(CONTENT_CHUNK_SIZE as u64) as usize;
            let start = content.len();
            content.resize(start + want, 0);

            let count = self.read_fill(&mut content[start..])?;
            if count != want {
                return Err(Error::TruncatedStream {
                    field: Field::Content,
                    expected: size,
                    actual: size - remaining + count as u64,
                }
                .into());
            }
            remaining -= want as u64;
        }
        Ok(content)
    }

    /// Read the next whole entry. Nothing is returned unless the size, name
    /// and every content byte were available.
    fn read_entry(&mut self) -> Result<DecodedEntry, Self::Err> {
        let head = self.read_entry_head()?;
        let name = head.name()?.to_string();
        let content = self.read_content(head.size())?;
        Ok(DecodedEntry { name, content })
    }
}

impl ImageSrc for &[u8] {
    type Err = Error;

    fn read_fill(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let count = buf.len().min(self.len());
        let (head, rest) = self.split_at(count);
        buf[..count].copy_from_slice(head);
        *self = rest;
        Ok(count)
    }
}

pub fn decode_entry<S: ImageSrc + ?Sized>(src: &mut S) -> Result<DecodedEntry, S::Err> {
    src.read_entry()
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::{encode_entry, encode_header, ENTRY_HEAD_SIZE};

    #[test]
    fn decode_sequence() {
        let mut image = encode_header(2).unwrap().to_vec();
        image.extend(encode_entry("a.txt", b"abc"));
        image.extend(encode_entry("b.bin", b""));

        let mut src = image.as_slice();
        assert_eq!(src.read_header().unwrap().count(), 2);

        let a = decode_entry(&mut src).unwrap();
        assert_eq!(a.name, "a.txt");
        assert_eq!(a.content, b"abc");

        let b = decode_entry(&mut src).unwrap();
        assert_eq!(b.name, "b.bin");
        assert_eq!(b.size(), 0);

        assert!(src.is_empty());
    }

    #[test]
    fn truncated_at_every_offset() {
        let data = encode_entry("truncated", &[0x5a; 100]);
        for cut in 0..data.len() {
            let mut src = &data[..cut];
            let expected_field = if cut < 8 {
                Field::Size
            } else if cut < ENTRY_HEAD_SIZE {
                Field::Name
            } else {
                Field::Content
            };
            match decode_entry(&mut src) {
                Err(Error::TruncatedStream { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("cut at {}: unexpected {:?}", cut, other),
            }
        }

        let mut src = data.as_slice();
        assert_eq!(decode_entry(&mut src).unwrap().content, vec![0x5a; 100]);
    }

    #[test]
    fn huge_size_is_truncation() {
        let mut data = encode_entry("big", b"tiny");
        data[..8].copy_from_slice(&(u32::MAX as u64).to_le_bytes());

        let mut src = data.as_slice();
        match decode_entry(&mut src) {
            Err(Error::TruncatedStream {
                field: Field::Content,
                expected,
                actual,
            }) => {
                assert_eq!(expected, u32::MAX as u64);
                assert_eq!(actual, 4);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn size_beyond_address_space_is_truncation() {
        let mut data = encode_entry("huge", b"abc");
        data[..8].copy_from_slice(&u64::MAX.to_le_bytes());

        let mut src = data.as_slice();
        match decode_entry(&mut src) {
            Err(Error::TruncatedStream {
                field: Field::Content,
                expected,
                actual,
            }) => {
                assert_eq!(expected, u64::MAX);
                assert_eq!(actual, 3);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn empty_name_is_not_an_error() {
        let data = encode_entry("", b"x");
        let mut src = data.as_slice();
        let entry = decode_entry(&mut src).unwrap();
        assert_eq!(entry.name, "");
        assert_eq!(entry.content, b"x");
    }

    #[test]
    fn invalid_name_fails_decode() {
        let mut data = encode_entry("ok", b"x");
        data[8] = 0xc3;
        data[9] = 0x28;
        let mut src = data.as_slice();
        assert!(matches!(
            decode_entry(&mut src),
            Err(Error::InvalidEncoding(_))
        ));
    }

    #[test]
    fn missing_header() {
        let mut src: &[u8] = &[];
        assert!(matches!(
            src.read_header(),
            Err(Error::TruncatedStream {
                field: Field::Header,
                expected: 1,
                actual: 0
            })
        ));
    }
}
