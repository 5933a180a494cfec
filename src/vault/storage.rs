//! Where container bytes live.
//!
//! The session never touches the filesystem directly; it reads and
//! writes whole containers through [`VaultStorage`]. I/O errors pass
//! through unmodified. `FileStorage` is the real backend, `MemoryStorage`
//! backs tests and any embedding that manages its own persistence.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{Result, VaultError};

/// Storage collaborator for encrypted container bytes.
pub trait VaultStorage {
    /// Whether a container has ever been written here.
    fn exists(&self) -> bool;

    /// Where the container lives, for error messages and logs.
    fn location(&self) -> PathBuf;

    fn read_bytes(&self) -> Result<Vec<u8>>;

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;
}

/// Container bytes in a file on disk.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VaultStorage for FileStorage {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        if !self.path.exists() {
            return Err(VaultError::VaultNotFound(self.path.clone()));
        }
        Ok(fs::read(&self.path)?)
    }

    /// Atomic write: temp file in the same directory, then rename, so a
    /// reader never sees a half-written container. Owner-only file mode
    /// on Unix.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let parent = self.path.parent().unwrap_or(Path::new("."));
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            self.path.file_name().unwrap_or_default().to_string_lossy()
        ));

        fs::write(&tmp_path, bytes)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

/// Container bytes held in memory.
#[derive(Default)]
pub struct MemoryStorage {
    bytes: Option<Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes: Some(bytes) }
    }

    /// The last written container, if any.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }
}

impl VaultStorage for MemoryStorage {
    fn exists(&self) -> bool {
        self.bytes.is_some()
    }

    fn location(&self) -> PathBuf {
        PathBuf::from(":memory:")
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        self.bytes
            .clone()
            .ok_or_else(|| VaultError::VaultNotFound(self.location()))
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.bytes = Some(bytes.to_vec());
        Ok(())
    }
}
