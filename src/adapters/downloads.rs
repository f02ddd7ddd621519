use crate::domain::ports::DownloadSink;
use crate::domain::view::ExportFile;
use crate::utils::error::{CheckError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Saves offered exports into a local directory.
#[derive(Debug, Clone)]
pub struct LocalDownloads {
    base_path: PathBuf,
}

impl LocalDownloads {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }
}

impl DownloadSink for LocalDownloads {
    fn offer(&mut self, file: &ExportFile) -> Result<String> {
        fs::create_dir_all(&self.base_path)?;
        let target = self.base_path.join(&file.file_name);

        // 先寫暫存檔再改名，不會留下寫到一半的檔案
        let mut temp = NamedTempFile::new_in(&self.base_path)?;
        temp.write_all(&file.bytes)?;
        temp.flush()?;
        temp.persist(&target)
            .map_err(|e| CheckError::export_failure(e.error))?;

        let location = target.display().to_string();
        tracing::info!("📁 Saved {} ({} bytes)", location, file.bytes.len());
        Ok(location)
    }
}

/// Keeps offered files in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDownloads {
    pub files: Vec<ExportFile>,
}

impl DownloadSink for MemoryDownloads {
    fn offer(&mut self, file: &ExportFile) -> Result<String> {
        self.files.push(file.clone());
        Ok(file.file_name.clone())
    }
}
