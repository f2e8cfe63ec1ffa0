//! The packed structs represent the on-disk format of a flat image
use alloc::vec::Vec;
use core::fmt::Display;

use bytemuck::{Pod, Zeroable};

use crate::{Error, ENTRY_HEAD_SIZE, MAX_NAME_LEN, NAME_SIZE};

/// Fixed-size record preceding each entry's content
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(packed, C)]
pub struct EntryHead {
    /// Size in bytes of the content that follows, stored little endian
    pub size: u64,
    /// NUL-terminated UTF-8 file name, zero padded
    pub name: [u8; NAME_SIZE],
}

impl Display for EntryHead {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "name={:?} size={}",
            core::str::from_utf8(self.name_bytes()).unwrap_or_default(),
            self.size()
        )
    }
}

impl EntryHead {
    pub fn new(name: &str, size: u64) -> EntryHead {
        EntryHead {
            size: size.to_le(),
            name: encode_name(name),
        }
    }

    /// Parse an entry head from exactly [`ENTRY_HEAD_SIZE`] bytes
    pub fn from_bytes(data: &[u8]) -> Result<EntryHead, Error> {
        Ok(bytemuck::try_pod_read_unaligned(data)?)
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    pub fn size(&self) -> u64 {
        u64::from_le(self.size)
    }

    /// Retrieve the name, ending at the first NUL
    pub fn name_bytes(&self) -> &[u8] {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.name.len());
        &self.name[..end]
    }

    /// The name decoded as UTF-8. May be empty.
    pub fn name(&self) -> Result<&str, Error> {
        Ok(core::str::from_utf8(self.name_bytes())?)
    }
}

/// The prefix of `name` that fits in a name field.
///
/// Names longer than [`MAX_NAME_LEN`] bytes are cut at the last character
/// boundary that fits, so the stored prefix is still valid UTF-8.
pub fn truncate_name(name: &str) -> &str {
    let mut end = name.len().min(MAX_NAME_LEN);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

/// Zero-pad `name` into an on-disk name field. The field always ends in at
/// least one NUL.
pub fn encode_name(name: &str) -> [u8; NAME_SIZE] {
    let stored = truncate_name(name).as_bytes();

    let mut field = [0; NAME_SIZE];
    field[..stored.len()].copy_from_slice(stored);
    field
}

/// Serialize one entry: `size || name || content`
pub fn encode_entry(name: &str, content: &[u8]) -> Vec<u8> {
    let head = EntryHead::new(name, content.len() as u64);

    let mut data = Vec::with_capacity(ENTRY_HEAD_SIZE + content.len());
    data.extend_from_slice(head.as_bytes());
    data.extend_from_slice(content);
    data
}
