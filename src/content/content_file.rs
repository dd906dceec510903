use std::path::{Path, PathBuf};
use std::{fs, io};

use crate::error::LoadError;

/// Metadata block and markdown body are separated by the first run of three
/// consecutive blank lines.
const META_DELIMITER: &str = "\n\n\n\n";

/// One content file split into its raw metadata block and body. Parsing the
/// metadata into typed fields happens later, in meta.rs.
#[derive(Debug)]
pub struct ContentFile {
    pub file_path: PathBuf,
    pub meta_block: String,
    pub body: String,
}

impl ContentFile {
    pub fn from_file(file_path: PathBuf) -> Result<ContentFile, LoadError> {
        let raw = fs::read_to_string(&file_path)?;
        Self::from_string(file_path, raw.as_str())
    }

    pub fn from_string(file_path: PathBuf, raw: &str) -> Result<ContentFile, LoadError> {
        let raw = raw.replace("\r\n", "\n");

        let mut parts = raw.splitn(2, META_DELIMITER);
        let meta_block = parts.next().unwrap_or("").to_string();
        let body = match parts.next() {
            Some(body) => body.trim_start_matches('\n').to_string(),
            None => return Err(LoadError::MalformedContentFile { path: file_path }),
        };

        Ok(ContentFile {
            file_path,
            meta_block,
            body,
        })
    }
}

/// Enumerates the .md files of one content directory. The listing order is
/// kept as-is; it decides tiebreaks between posts with equal dates.
pub fn list_content_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = vec![];
    let entries = fs::read_dir(dir)?;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(file_name) = entry.file_name().to_str() {
            if file_name.ends_with(".md") {
                files.push(entry.path());
            }
        }
    }
    Ok(files)
}
