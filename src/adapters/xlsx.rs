use crate::domain::model::{Cell, ResultRecord};
use crate::domain::ports::SpreadsheetEncoder;
use crate::utils::error::Result;
use crate::utils::validation::validate_sheet_name;
use chrono::{DateTime, SecondsFormat, Utc};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

// 第 1 種樣式為粗體，用於標題列
const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs></styleSheet>"#;

/// Writes a minimal Office Open XML workbook: one sheet, a bold header
/// row with the column names and one data row.
#[derive(Debug, Clone, Default)]
pub struct XlsxEncoder {
    created_at: Option<DateTime<Utc>>,
}

impl XlsxEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 固定文件建立時間，讓輸出可重現
    pub fn with_created_at(created_at: DateTime<Utc>) -> Self {
        Self {
            created_at: Some(created_at),
        }
    }

    fn core_properties(&self) -> String {
        let created = self
            .created_at
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                "\n",
                r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
                r#"<dc:creator>compat-check</dc:creator>"#,
                r#"<dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created>"#,
                r#"</cp:coreProperties>"#
            ),
            created = created
        )
    }
}

impl SpreadsheetEncoder for XlsxEncoder {
    fn file_extension(&self) -> &'static str {
        "xlsx"
    }

    fn encode(&self, sheet_name: &str, record: &ResultRecord) -> Result<Vec<u8>> {
        validate_sheet_name("sheet_name", sheet_name)?;

        tracing::debug!(
            "Encoding XLSX sheet '{}' with {} columns",
            sheet_name,
            record.len()
        );

        let parts: [(&str, String); 7] = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", ROOT_RELS.to_string()),
            ("docProps/core.xml", self.core_properties()),
            ("xl/workbook.xml", workbook_xml(sheet_name)),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
            ("xl/styles.xml", STYLES.to_string()),
            ("xl/worksheets/sheet1.xml", sheet_xml(record)),
        ];

        let bytes = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            for (name, content) in &parts {
                zip.start_file::<_, ()>(*name, FileOptions::default())?;
                zip.write_all(content.as_bytes())?;
            }
            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("XLSX workbook is {} bytes", bytes.len());
        Ok(bytes)
    }
}

fn workbook_xml(sheet_name: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<sheets><sheet name="{name}" sheetId="1" r:id="rId1"/></sheets></workbook>"#
        ),
        name = escape_xml(sheet_name)
    )
}

fn sheet_xml(record: &ResultRecord) -> String {
    let mut header = String::new();
    let mut values = String::new();

    for (index, (column, cell)) in record.iter().enumerate() {
        let letters = column_letters(index);
        header.push_str(&format!(
            r#"<c r="{letters}1" t="inlineStr" s="1"><is><t>{}</t></is></c>"#,
            escape_cell_text(column)
        ));
        match cell {
            Cell::Number(number) => {
                values.push_str(&format!(r#"<c r="{letters}2"><v>{number}</v></c>"#));
            }
            Cell::Text(text) => {
                values.push_str(&format!(
                    r#"<c r="{letters}2" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                    escape_cell_text(text)
                ));
            }
        }
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
            r#"<sheetData><row r="1">{header}</row><row r="2">{values}</row></sheetData></worksheet>"#
        ),
        header = header,
        values = values
    )
}

/// 0 → A, 25 → Z, 26 → AA
pub(crate) fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

fn is_xml_control(c: char) -> bool {
    (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r')
}

/// Cell text: control characters become `_xHHHH_`, and an underscore that
/// would otherwise start such an escape is itself written as `_x005F_`.
pub(crate) fn escape_cell_text(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut encoded = String::with_capacity(text.len());
    for (index, &ch) in chars.iter().enumerate() {
        if is_xml_control(ch) {
            encoded.push_str(&format!("_x{:04X}_", ch as u32));
        } else if ch == '_' && starts_ooxml_escape(&chars[index..]) {
            encoded.push_str("_x005F_");
        } else {
            encoded.push(ch);
        }
    }
    escape_xml(&encoded)
}

fn starts_ooxml_escape(rest: &[char]) -> bool {
    rest.len() >= 7
        && rest[1] == 'x'
        && rest[2..6].iter().all(|c| c.is_ascii_hexdigit())
        && rest[6] == '_'
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            // XML 1.0 不允許的控制字元，屬性值裡無法保留
            c if is_xml_control(c) => {
                tracing::warn!("Dropping control character U+{:04X} from XML text", c as u32);
            }
            c => escaped.push(c),
        }
    }
    escaped
}
