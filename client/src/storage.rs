use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::BooruError;

pub const STORAGE_KEY_TOKEN: &str = "token";
pub const STORAGE_KEY_THEME: &str = "theme";

#[cfg(unix)]
const STORAGE_FILE_MODE: u32 = 0o600;

/// Persistent string key/value store backed by a TOML file.
///
/// Every mutation is written through to disk, through a temporary file
/// renamed over the previous one. A missing file reads as an empty store
/// and is only created on the first write.
#[derive(Debug)]
pub struct LocalStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl LocalStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BooruError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(BooruError::Io(e)),
        };
        debug!("Opened storage {} ({} keys)", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), BooruError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    /// Removes `key`, returning whether it was present.
    pub fn remove(&mut self, key: &str) -> Result<bool, BooruError> {
        if self.entries.remove(key).is_none() {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<(), BooruError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;
        let content = toml::to_string(&self.entries)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(STORAGE_FILE_MODE))?;
        }
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}
