use crate::domain::model::ResultRecord;
use crate::domain::ports::SpreadsheetEncoder;
use crate::utils::error::{CheckError, Result};

/// Plain CSV export: a header line and one data line. The sheet name has
/// no place in the format and is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvEncoder;

impl SpreadsheetEncoder for CsvEncoder {
    fn file_extension(&self) -> &'static str {
        "csv"
    }

    fn encode(&self, _sheet_name: &str, record: &ResultRecord) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(record.headers())?;
        writer.write_record(record.cells().map(|cell| cell.to_string()))?;

        let bytes = writer
            .into_inner()
            .map_err(|e| CheckError::export_failure(e.error()))?;
        tracing::debug!("CSV export is {} bytes", bytes.len());
        Ok(bytes)
    }
}
