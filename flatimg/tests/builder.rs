use std::io;

use flatimg::{Error, ImageBuilder, ImageReader, NullReporter};
use flatimg_core::{ENTRY_HEAD_SIZE, HEADER_SIZE};

const SOME_FILE_NAME: &str = "some-file";
const SOME_FILE_CONTENTS: &[u8; 18] = b"some file contents";

#[test]
fn builder_file_writer() -> Result<(), Error> {
    let mut archive_dest = io::Cursor::new(Vec::new());

    let mut builder = ImageBuilder::new();
    builder.file_bytes(SOME_FILE_NAME, &SOME_FILE_CONTENTS[..]);
    let written = builder.write_image(&mut archive_dest, &mut NullReporter)?;

    // Check raw image
    let image = archive_dest.into_inner();
    assert_eq!(written, image.len() as u64);
    assert_eq!(image[0], 1);
    assert_eq!(&image[1..9], &18u64.to_le_bytes());
    assert_eq!(&image[9..9 + SOME_FILE_NAME.len()], SOME_FILE_NAME.as_bytes());
    assert_eq!(SOME_FILE_CONTENTS, &image[HEADER_SIZE + ENTRY_HEAD_SIZE..]);

    // Read it back
    let mut reader = ImageReader::new(image.as_slice())?;
    assert_eq!(reader.header().count(), 1);
    let (index, entry) = reader.next_entry()?.expect("one entry");
    assert_eq!(index, 1);
    assert_eq!(entry.name, SOME_FILE_NAME);
    assert_eq!(entry.content, SOME_FILE_CONTENTS);
    assert!(reader.next_entry()?.is_none());
    assert_eq!(reader.trailing_bytes()?, 0);

    Ok(())
}

#[test]
fn empty_builder_writes_nothing() {
    let mut dest = Vec::new();
    let err = ImageBuilder::new()
        .write_image(&mut dest, &mut NullReporter)
        .unwrap_err();
    assert!(matches!(err.core(), Some(flatimg_core::Error::EmptyInput)));
    assert!(dest.is_empty());
}

#[test]
fn overfull_builder_writes_nothing() {
    let mut builder = ImageBuilder::new();
    for i in 0..256 {
        builder.file_bytes(format!("{}", i), Vec::<u8>::new());
    }
    assert_eq!(builder.len(), 256);

    let mut dest = Vec::new();
    let err = builder.write_image(&mut dest, &mut NullReporter).unwrap_err();
    assert!(matches!(
        err.core(),
        Some(flatimg_core::Error::CapacityExceeded(256))
    ));
    assert!(dest.is_empty());
}
