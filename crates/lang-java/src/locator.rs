//! Reads class bytes straight from a loader's own classpath entries.

use crate::converter::JavaTypeConverter;
use classscan_plugin::{BoxError, ClassLoader};
use std::fs::File;
use std::io::Read;
use zip::ZipArchive;
use zip::result::ZipError;

/// Bytes of `binary_name`'s class file from the first of `loader`'s own
/// entries that holds it. Ancestors are not consulted.
pub fn find_class_bytes(loader: &ClassLoader, binary_name: &str) -> Result<Option<Vec<u8>>, BoxError> {
    let resource = JavaTypeConverter::resource_name(binary_name);

    for entry in loader.local_entries() {
        if entry.is_dir() {
            let file = entry.join(&resource);
            if file.is_file() {
                return Ok(Some(std::fs::read(&file)?));
            }
        } else if entry.is_file() {
            let mut archive = match ZipArchive::new(File::open(&entry)?) {
                Ok(archive) => archive,
                // Not an archive; nothing to load from it
                Err(ZipError::InvalidArchive(_)) => continue,
                Err(e) => return Err(format!("Failed to open {}: {e}", entry.display()).into()),
            };
            match archive.by_name(&resource) {
                Ok(mut file) => {
                    let mut bytes = Vec::new();
                    file.read_to_end(&mut bytes)?;
                    return Ok(Some(bytes));
                }
                Err(ZipError::FileNotFound) => continue,
                Err(e) => {
                    return Err(format!("Failed to read {resource} from {}: {e}", entry.display()).into());
                }
            }
        }
    }

    Ok(None)
}
