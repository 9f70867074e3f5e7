//! The persisted copy of the last successfully uploaded schema.
//!
//! Writes go to a uniquely named temporary sibling first and are renamed
//! into place, so a crash mid-write never leaves a truncated
//! `current_form.json` and concurrent writers never share a temp file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// File name of the persisted schema inside the schema directory.
pub const CURRENT_FORM_FILE: &str = "current_form.json";

/// Handle to `<dir>/current_form.json`.
#[derive(Debug, Clone)]
pub struct SchemaFile {
    path: PathBuf,
}

impl SchemaFile {
    /// A handle inside `dir`. Nothing is touched until read or write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(CURRENT_FORM_FILE),
        }
    }

    /// Full path of the persisted schema.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw bytes of the persisted schema, or `None` if it does not exist.
    pub async fn read(&self) -> io::Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Replace the persisted schema with `bytes`.
    pub async fn write(&self, bytes: &[u8]) -> io::Result<()> {
        let path = self.path.clone();
        let bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || replace_atomically(&path, &bytes))
            .await
            .map_err(io::Error::other)?
    }
}

fn replace_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
