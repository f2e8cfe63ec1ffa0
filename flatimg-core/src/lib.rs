#![no_std]
extern crate alloc;

use core::mem;

pub use crate::entry::{encode_entry, encode_name, truncate_name, EntryHead};
pub use crate::error::{Error, Field};
pub use crate::header::{decode_header, encode_header, Header};
pub use crate::src::{decode_entry, DecodedEntry, ImageSrc};

mod entry;
mod error;
mod header;
mod src;

pub const HEADER_SIZE: usize = mem::size_of::<Header>();
pub const ENTRY_HEAD_SIZE: usize = mem::size_of::<EntryHead>();

/// Size of the on-disk name field, including the terminating NUL
pub const NAME_SIZE: usize = 256;
/// Longest encoded name that still leaves room for a NUL
pub const MAX_NAME_LEN: usize = NAME_SIZE - 1;
/// The header count is a single byte
pub const MAX_ENTRIES: usize = u8::MAX as usize;
