use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flatimg_core::Header;

use crate::builder::ImageBuilder;
use crate::ext::{check_path, generated_name};
use crate::image::ImageFile;
use crate::{Error, Event, Reporter};

/// What [`unpack`] produced
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnpackSummary {
    /// Files written, in image order. A path repeats if a later entry
    /// overwrote an earlier one.
    pub files: Vec<PathBuf>,
    /// Unused bytes found after the last declared entry
    pub trailing_bytes: u64,
}

/// One entry as reported by [`list`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListedEntry {
    pub index: usize,
    pub name: String,
    pub size: u64,
}

/// Write `builder` to `output`. The count, and that `output` isn't one of
/// the sources, are checked before `output` is created, so a rejected
/// builder never touches it.
fn write_image_file(
    output: &Path,
    builder: ImageBuilder,
    reporter: &mut dyn Reporter,
) -> Result<u64, Error> {
    let entries = builder.header()?.count();
    builder.check_output(output)?;

    let file = File::create(output).map_err(wrap_io_err!(output, "Create image"))?;
    let mut writer = BufWriter::new(file);
    let bytes = builder
        .write_image(&mut writer, reporter)
        .map_err(|err| err.path(output))?;
    writer
        .flush()
        .map_err(wrap_io_err!(output, "Flush image"))?;

    reporter.report(Event::ImageWritten {
        path: output.to_path_buf(),
        entries,
        bytes,
    });
    Ok(bytes)
}

/// Pack `inputs` into a new image at `output`, in the given order.
///
/// The count and every input are validated before `output` is created or
/// truncated. Returns the size of the image in bytes.
pub fn pack<I, P>(
    output: impl AsRef<Path>,
    inputs: I,
    reporter: &mut dyn Reporter,
) -> Result<u64, Error>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let inputs: Vec<P> = inputs.into_iter().collect();
    Header::new(inputs.len())?;

    let mut builder = ImageBuilder::new();
    for input in &inputs {
        builder.file(input)?;
    }
    write_image_file(output.as_ref(), builder, reporter)
}

/// Pack every regular file directly inside `dir` into a new image at
/// `output`, sorted by file name.
pub fn pack_dir(
    output: impl AsRef<Path>,
    dir: impl AsRef<Path>,
    reporter: &mut dyn Reporter,
) -> Result<u64, Error> {
    let mut builder = ImageBuilder::new();
    builder.dir(dir)?;
    write_image_file(output.as_ref(), builder, reporter)
}

/// Make sure `output_dir` exists and is a directory
fn prepare_output_dir(output_dir: &Path, reporter: &mut dyn Reporter) -> Result<(), Error> {
    match fs::metadata(output_dir) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(Error::NotADirectory(output_dir.to_path_buf())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(output_dir)
                .map_err(wrap_io_err!(output_dir, "Create output directory"))?;
            reporter.report(Event::CreatedDir(output_dir.to_path_buf()));
            Ok(())
        }
        Err(source) => Err(Error::Io {
            source,
            path: Some(output_dir.to_path_buf()),
            context: "Stat output directory",
        }),
    }
}

/// Unpack the image at `image` into `output_dir`, creating it if needed.
///
/// Each entry is decoded completely before its file is written, so an entry
/// cut short by the end of the image produces no file. Entries are not
/// rolled back on failure; the caller should discard a partial output.
pub fn unpack(
    image: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    reporter: &mut dyn Reporter,
) -> Result<UnpackSummary, Error> {
    let output_dir = output_dir.as_ref();

    let mut image = ImageFile::open(image)?;
    prepare_output_dir(output_dir, reporter)?;

    if image.header().is_empty() {
        reporter.report(Event::EmptyImage);
    }

    let mut summary = UnpackSummary::default();
    while let Some((index, entry)) = image.next_entry()? {
        let name = if entry.name.is_empty() {
            let name = generated_name(index);
            reporter.report(Event::GeneratedName {
                index,
                name: name.clone(),
            });
            name
        } else {
            entry.name
        };

        let relative = check_path(&name).map_err(|err| err.entry(index))?;
        let target = output_dir.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(wrap_io_err!(parent, "Create directory"))
                .map_err(|err| err.entry(index))?;
        }
        fs::write(&target, &entry.content)
            .map_err(wrap_io_err!(target, "Write file"))
            .map_err(|err| err.entry(index))?;

        reporter.report(Event::Unpacked {
            index,
            size: entry.content.len() as u64,
            name,
            path: target.clone(),
        });
        summary.files.push(target);
    }

    summary.trailing_bytes = image.trailing_bytes()?;
    if summary.trailing_bytes > 0 {
        reporter.report(Event::TrailingData {
            bytes: summary.trailing_bytes,
        });
    }
    Ok(summary)
}

/// Decode every entry of `image` without writing anything.
pub fn list(image: impl AsRef<Path>) -> Result<Vec<ListedEntry>, Error> {
    let mut image = ImageFile::open(image)?;

    let mut entries = Vec::with_capacity(image.header().count());
    while let Some((index, entry)) = image.next_entry()? {
        entries.push(ListedEntry {
            index,
            size: entry.size(),
            name: entry.name,
        });
    }
    Ok(entries)
}
