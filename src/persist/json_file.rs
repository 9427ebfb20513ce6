//! JSON file sink.

use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use super::{ContactSink, PersistResult};

const APP_DIR: &str = "contactbook";
const FILE_NAME: &str = "contacts.json";

/// Contact array stored in a single file.
///
/// Writes go to a sibling temporary file that is renamed over the target, so
/// a failed save leaves the previous file in place.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    /// Sink for the file at `path`. Nothing is touched until the first
    /// read or write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Sink at `<data dir>/contactbook/contacts.json`, or `./contacts.json`
    /// when the platform has no data directory.
    pub fn default_location() -> Self {
        match dirs::data_dir() {
            Some(dir) => Self::new(dir.join(APP_DIR).join(FILE_NAME)),
            None => Self::new(FILE_NAME),
        }
    }

    /// Target file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ContactSink for JsonFileSink {
    fn read_bytes(&self) -> PersistResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> PersistResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.temp_path();
        let res = write_synced(&tmp, bytes).and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(err) = res {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
