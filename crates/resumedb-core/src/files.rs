use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Document formats the pipeline knows how to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Doc,
    Docx,
}

impl DocumentKind {
    /// Detect the kind from a path's extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "doc" => Some(Self::Doc),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }
}

/// Lazily list the supported documents directly inside `root`.
///
/// Sub-directories are not descended into. Fails up front when `root` is
/// missing or not a directory.
pub fn iterate_files(root: &Path) -> Result<impl Iterator<Item = PathBuf>> {
    let meta = std::fs::metadata(root).map_err(|e| Error::io(root, e))?;
    if !meta.is_dir() {
        return Err(Error::io(
            root,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
        ));
    }
    std::fs::read_dir(root).map_err(|e| Error::io(root, e))?;

    Ok(walkdir::WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| DocumentKind::from_path(e.path()).is_some())
        .map(walkdir::DirEntry::into_path))
}

/// Stable identifier for a file: `{parent_directory_name}/{filename}`.
pub fn get_file_id(path: &Path) -> String {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let directory = path
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if filename.is_empty() || directory.is_empty() {
        filename
    } else {
        format!("{directory}/{filename}")
    }
}
