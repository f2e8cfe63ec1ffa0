//! The packed structs represent the on-disk format of a flat image

use bytemuck::{Pod, Zeroable};

use crate::{Error, HEADER_SIZE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Header {
    /// Count of entries, which start immediately after the header
    pub count: u8,
}

impl Header {
    /// Build a header for `count` entries. An image written by this crate
    /// always holds at least one entry.
    pub fn new(count: usize) -> Result<Header, Error> {
        if count == 0 {
            return Err(Error::EmptyInput);
        }
        let count = u8::try_from(count).map_err(|_| Error::CapacityExceeded(count))?;
        Ok(Header { count })
    }

    /// Any byte is a valid header; zero is an empty image.
    pub fn from_bytes(data: [u8; HEADER_SIZE]) -> Header {
        bytemuck::cast(data)
    }

    pub fn to_bytes(self) -> [u8; HEADER_SIZE] {
        bytemuck::cast(self)
    }

    pub fn count(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

pub fn encode_header(count: usize) -> Result<[u8; HEADER_SIZE], Error> {
    Header::new(count).map(Header::to_bytes)
}

pub fn decode_header(byte: u8) -> usize {
    Header::from_bytes([byte]).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_ENTRIES;

    #[test]
    fn header_round_trip() {
        for count in 1..=MAX_ENTRIES {
            let bytes = encode_header(count).unwrap();
            assert_eq!(decode_header(bytes[0]), count);
        }
    }

    #[test]
    fn header_rejects_empty() {
        assert!(matches!(encode_header(0), Err(Error::EmptyInput)));
    }

    #[test]
    fn header_rejects_overflow() {
        assert!(matches!(
            encode_header(256),
            Err(Error::CapacityExceeded(256))
        ));
        assert!(matches!(
            Header::new(usize::MAX),
            Err(Error::CapacityExceeded(usize::MAX))
        ));
    }

    #[test]
    fn zero_byte_is_empty_image() {
        let header = Header::from_bytes([0]);
        assert!(header.is_empty());
        assert_eq!(decode_header(0), 0);
    }
}
