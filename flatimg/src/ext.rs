//! Path handling shared by the packer and unpacker.
use std::path::{Component, Path};

use crate::Error;

/// Iterate the components of an entry name and ensure that there are no
/// non-normal components, so unpacking stays inside the output directory.
pub fn check_path(name: &str) -> Result<&Path, Error> {
    let path = Path::new(name);
    for component in path.components() {
        match component {
            Component::Normal(_) => {}
            invalid => {
                let bad_component: &Path = invalid.as_ref();
                return Err(Error::InvalidPath {
                    entry: path.to_path_buf(),
                    component: bad_component.to_path_buf(),
                });
            }
        }
    }
    Ok(path)
}

/// The name stored for a source file: its final component, as UTF-8
pub fn entry_name(source: &Path) -> Result<&str, Error> {
    let file_name = source.file_name().ok_or_else(|| Error::InvalidInput {
        path: source.to_path_buf(),
        reason: "path has no file name",
    })?;
    file_name.to_str().ok_or_else(|| Error::InvalidInput {
        path: source.to_path_buf(),
        reason: "file name is not valid UTF-8",
    })
}

/// Placeholder for an entry whose stored name is empty
pub fn generated_name(index: usize) -> String {
    format!("file_{}.bin", index)
}
