use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Local filesystem storage. Paths arrive already resolved against the output root.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for LocalStorage {
    fn write_file(&self, path: &Path, data: &[u8]) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // 先寫入暫存檔再改名
        let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
        temp_name.push(".partial");
        let temp_path = path.with_file_name(temp_name);

        if let Err(e) = fs::write(&temp_path, data).and_then(|_| fs::rename(&temp_path, path)) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        tracing::debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(path.to_path_buf())
    }
}
