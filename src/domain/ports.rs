use crate::domain::model::ResultRecord;
use crate::domain::view::ExportFile;
use crate::utils::error::Result;

/// Session-lifetime key-value storage for the submitted snapshot.
pub trait SessionStore {
    fn put(&mut self, key: &str, value: String) -> Result<()>;
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Turns a result record into a single-sheet spreadsheet file.
pub trait SpreadsheetEncoder {
    fn file_extension(&self) -> &'static str;
    fn encode(&self, sheet_name: &str, record: &ResultRecord) -> Result<Vec<u8>>;
}

/// 只會收到完整編碼好的檔案；回傳檔案所在位置
pub trait DownloadSink {
    fn offer(&mut self, file: &ExportFile) -> Result<String>;
}
