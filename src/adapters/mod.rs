// Adapters layer: concrete session stores, spreadsheet encoders and download sinks.

pub mod csv_encoder;
pub mod downloads;
pub mod session_store;
pub mod xlsx;

pub use csv_encoder::CsvEncoder;
pub use downloads::{LocalDownloads, MemoryDownloads};
pub use session_store::{FileSessionStore, MemorySessionStore};
pub use xlsx::XlsxEncoder;

use crate::config::ExportFormat;
use crate::domain::model::ResultRecord;
use crate::domain::ports::SpreadsheetEncoder;
use crate::utils::error::Result;

/// Encoder picked at runtime from the configured export format.
#[derive(Debug, Clone)]
pub enum AnyEncoder {
    Xlsx(XlsxEncoder),
    Csv(CsvEncoder),
}

impl AnyEncoder {
    pub fn for_format(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Xlsx => Self::Xlsx(XlsxEncoder::new()),
            ExportFormat::Csv => Self::Csv(CsvEncoder),
        }
    }
}

impl SpreadsheetEncoder for AnyEncoder {
    fn file_extension(&self) -> &'static str {
        match self {
            Self::Xlsx(encoder) => encoder.file_extension(),
            Self::Csv(encoder) => encoder.file_extension(),
        }
    }

    fn encode(&self, sheet_name: &str, record: &ResultRecord) -> Result<Vec<u8>> {
        match self {
            Self::Xlsx(encoder) => encoder.encode(sheet_name, record),
            Self::Csv(encoder) => encoder.encode(sheet_name, record),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_follows_format() {
        assert_eq!(AnyEncoder::for_format(ExportFormat::Xlsx).file_extension(), "xlsx");
        assert_eq!(AnyEncoder::for_format(ExportFormat::Csv).file_extension(), "csv");

        let mut record = ResultRecord::new();
        record.push("name", "Anna");
        let bytes = AnyEncoder::for_format(ExportFormat::Csv)
            .encode("Results", &record)
            .unwrap();
        assert_eq!(bytes, b"name\nAnna\n".to_vec());
    }
}
