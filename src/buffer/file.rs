//! Reading and writing buffers to disk

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use super::TextBuffer;

/// Error type for saving a buffer
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("no file name")]
    NoFilename,

    #[error("can't open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't truncate {}: {source}", path.display())]
    Truncate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TextBuffer {
    /// Load `path` into the buffer and remember it as the file name.
    ///
    /// A file that does not exist yet opens as an empty buffer, so the
    /// first save creates it.
    pub fn open(&mut self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();

        match fs::read(path) {
            Ok(bytes) => {
                self.load_bytes(&bytes);
                tracing::info!("opened {} ({} lines)", path.display(), self.len());
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.load(Vec::<Vec<u8>>::new());
                tracing::info!("{} does not exist, starting empty", path.display());
            },
            Err(e) => return Err(e),
        }

        self.set_filename(path);
        Ok(())
    }

    /// Write the buffer to its file name.
    ///
    /// The file is opened without truncation, cut to the new length and only
    /// then written, so a failed open never destroys the old contents. On
    /// success the buffer becomes clean and the number of bytes written is
    /// returned; on failure it stays dirty.
    pub fn save(&mut self) -> Result<usize, PersistenceError> {
        let path = self
            .filename
            .clone()
            .ok_or(PersistenceError::NoFilename)?;
        let data = self.serialize();

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .mode(0o644)
            .open(&path)
            .map_err(|source| PersistenceError::Open {
                path: path.clone(),
                source,
            })?;

        file.set_len(data.len() as u64)
            .map_err(|source| PersistenceError::Truncate {
                path: path.clone(),
                source,
            })?;

        file.write_all(&data)
            .and_then(|()| file.flush())
            .map_err(|source| PersistenceError::Write {
                path: path.clone(),
                source,
            })?;

        self.mark_saved();
        tracing::info!("wrote {} bytes to {}", data.len(), path.display());
        Ok(data.len())
    }

    /// Set the file name, then save
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<usize, PersistenceError> {
        self.set_filename(path);
        self.save()
    }
}
