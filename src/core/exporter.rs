use crate::config::catalogue::{Catalogue, QuestionConfig};
use crate::domain::model::{Answer, FormState, PairSlot, ResultRecord};
use crate::domain::ports::SpreadsheetEncoder;
use crate::domain::view::{DisplayItem, DisplaySection, DisplayView, ExportFile};
use crate::utils::error::{CheckError, Result};
use chrono::{DateTime, Utc};

/// Derives the results view and the spreadsheet export from a submitted
/// state. Pure except for the encoder, which only sees the flat record.
#[derive(Debug, Clone)]
pub struct ResultExporter<'a, E: SpreadsheetEncoder> {
    catalogue: &'a Catalogue,
    encoder: E,
}

impl<'a, E: SpreadsheetEncoder> ResultExporter<'a, E> {
    pub fn new(catalogue: &'a Catalogue, encoder: E) -> Self {
        Self { catalogue, encoder }
    }

    /// Human-readable view grouped by catalogue section.
    ///
    /// Fields whose section is not declared still get shown, in extra
    /// sections ordered by first appearance.
    pub fn to_display_view(
        &self,
        state: &FormState,
        submitted_at: Option<DateTime<Utc>>,
    ) -> DisplayView {
        let mut section_order: Vec<&String> = self.catalogue.sections.iter().collect();
        for question in &self.catalogue.fields {
            if !section_order.contains(&&question.section) {
                tracing::warn!(
                    "Section '{}' of '{}' is not declared, appending it",
                    question.section,
                    question.name
                );
                section_order.push(&question.section);
            }
        }

        let sections = section_order
            .into_iter()
            .filter_map(|section| {
                let items: Vec<DisplayItem> = self
                    .catalogue
                    .fields
                    .iter()
                    .filter(|question| &question.section == section)
                    .flat_map(|question| self.display_items(question, state))
                    .collect();

                if items.is_empty() {
                    None
                } else {
                    Some(DisplaySection {
                        title: section.clone(),
                        items,
                    })
                }
            })
            .collect();

        DisplayView {
            title: self.catalogue.title.clone(),
            submitted_at,
            sections,
        }
    }

    fn display_items(&self, question: &QuestionConfig, state: &FormState) -> Vec<DisplayItem> {
        let fallback = &self.catalogue.fallback;
        let empty = question.kind.empty_answer();
        let answer = match state.get(&question.name) {
            Some(answer) => answer,
            None => {
                tracing::warn!("State has no answer for '{}'", question.name);
                &empty
            }
        };
        let (min, max) = question.bounds();
        let rated = |value: i64| {
            if value < min || value > max {
                tracing::warn!(
                    "Rating {} for '{}' is outside {}..={}",
                    value,
                    question.name,
                    min,
                    max
                );
            }
            format!("{}/{}", value, max)
        };

        let item = |key: String, title: String, value: Option<String>| {
            let provided = value.is_some();
            DisplayItem {
                key,
                title,
                value: value.unwrap_or_else(|| fallback.clone()),
                provided,
                long_text: question.multiline,
            }
        };

        match answer {
            Answer::MultiSelect(tags) => {
                let value = (!tags.is_empty()).then(|| tags.join(", "));
                vec![item(question.name.clone(), question.title.clone(), value)]
            }
            Answer::Text(text) => {
                let value = (!text.is_empty()).then(|| text.clone());
                vec![item(question.name.clone(), question.title.clone(), value)]
            }
            Answer::Choice(code) => {
                let value = (!code.is_empty()).then(|| match question.label_for(code) {
                    Some(label) => label.to_string(),
                    None => {
                        tracing::warn!("Unknown option '{}' for '{}'", code, question.name);
                        code.clone()
                    }
                });
                vec![item(question.name.clone(), question.title.clone(), value)]
            }
            Answer::Rating(rating) => {
                let value = rating.map(rated);
                vec![item(question.name.clone(), question.title.clone(), value)]
            }
            Answer::RatingPair(pair) => PairSlot::ALL
                .iter()
                .map(|slot| {
                    item(
                        format!("{}_{}", question.name, slot.as_str()),
                        question.slot_title(*slot),
                        pair.get(*slot).map(rated),
                    )
                })
                .collect(),
        }
    }

    /// Flattens a state into one spreadsheet row, in state order.
    pub fn to_record(&self, state: &FormState) -> ResultRecord {
        let mut record = ResultRecord::new();
        for (field, answer) in state.iter() {
            match answer {
                Answer::MultiSelect(tags) => record.push(field, tags.join(", ")),
                Answer::Text(text) | Answer::Choice(text) => record.push(field, text.as_str()),
                Answer::Rating(rating) => record.push(
                    field,
                    rating.map(|v| v.to_string()).unwrap_or_default(),
                ),
                Answer::RatingPair(pair) => {
                    for slot in PairSlot::ALL {
                        record.push(
                            format!("{}_{}", field, slot.as_str()),
                            pair.get(slot).unwrap_or(0),
                        );
                    }
                }
            }
        }
        record
    }

    /// Encodes the record into a complete file. Nothing is returned unless
    /// encoding finished.
    pub fn serialize(&self, record: &ResultRecord, filename_hint: Option<&str>) -> Result<ExportFile> {
        let settings = &self.catalogue.export;
        let bytes = self
            .encoder
            .encode(&settings.sheet_name, record)
            .map_err(|e| {
                tracing::error!("❌ Spreadsheet encoding failed: {}", e);
                match e {
                    failure @ CheckError::ExportFailure { .. } => failure,
                    other => CheckError::export_failure(other),
                }
            })?;

        let label = filename_hint
            .map(str::trim)
            .filter(|hint| !hint.is_empty())
            .unwrap_or(settings.file_fallback.as_str());
        let file_name = format!(
            "{}_{}.{}",
            sanitize_file_name(&settings.file_prefix),
            sanitize_file_name(label),
            self.encoder.file_extension()
        );

        tracing::info!("📦 Export ready: {} ({} bytes)", file_name, bytes.len());
        Ok(ExportFile { file_name, bytes })
    }

    /// 依設定取得檔名提示（預設為受測者姓名）
    pub fn filename_hint<'s>(&self, state: &'s FormState) -> Option<&'s str> {
        let field = self.catalogue.export.file_name_field.as_deref()?;
        match state.get(field) {
            Some(Answer::Text(value)) | Some(Answer::Choice(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Record plus encoding in one step.
    pub fn export(&self, state: &FormState) -> Result<ExportFile> {
        let record = self.to_record(state);
        self.serialize(&record, self.filename_hint(state))
    }
}

fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() || c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::form::FormModel;
    use crate::domain::model::{Cell, ResultRecord};

    struct FailingEncoder;

    impl SpreadsheetEncoder for FailingEncoder {
        fn file_extension(&self) -> &'static str {
            "xlsx"
        }

        fn encode(&self, _sheet_name: &str, _record: &ResultRecord) -> Result<Vec<u8>> {
            Err(CheckError::IoError(std::io::Error::other("disk full")))
        }
    }

    struct EchoEncoder;

    impl SpreadsheetEncoder for EchoEncoder {
        fn file_extension(&self) -> &'static str {
            "txt"
        }

        fn encode(&self, sheet_name: &str, record: &ResultRecord) -> Result<Vec<u8>> {
            Ok(format!("{}:{}", sheet_name, record.len()).into_bytes())
        }
    }

    fn form(catalogue: &Catalogue) -> FormModel {
        FormModel::new(catalogue.schema())
    }

    #[test]
    fn test_record_for_anna() {
        let catalogue = Catalogue::builtin().unwrap();
        let mut form = form(&catalogue);
        form.toggle_set_member("expectations", "marriage").unwrap();
        form.toggle_set_member("expectations", "children").unwrap();
        form.set_nested_rating("lifeScores", "leisure", 3).unwrap();
        form.set_nested_rating("lifeScores", "work", 8).unwrap();
        form.set_scalar("name", "Anna").unwrap();

        let exporter = ResultExporter::new(&catalogue, EchoEncoder);
        let record = exporter.to_record(&form.snapshot());

        assert_eq!(
            record.get("expectations"),
            Some(&Cell::Text("marriage, children".to_string()))
        );
        assert_eq!(record.get("lifeScores_leisure"), Some(&Cell::Number(3)));
        assert_eq!(record.get("lifeScores_work"), Some(&Cell::Number(8)));
        assert_eq!(record.get("name"), Some(&Cell::Text("Anna".to_string())));
        assert!(record.get("lifeScores").is_none());
        // 36 個欄位，巢狀評分展開成兩欄
        assert_eq!(record.len(), 37);

        let headers: Vec<&str> = record.headers().take(4).collect();
        assert_eq!(
            headers,
            vec!["expectations", "interests", "lifeScores_leisure", "lifeScores_work"]
        );
    }

    #[test]
    fn test_unset_pair_slot_exports_zero_and_unset_rating_empty() {
        let catalogue = Catalogue::builtin().unwrap();
        let mut form = form(&catalogue);
        form.set_nested_rating("lifeScores", "leisure", 7).unwrap();

        let exporter = ResultExporter::new(&catalogue, EchoEncoder);
        let record = exporter.to_record(&form.snapshot());

        assert_eq!(record.get("lifeScores_leisure"), Some(&Cell::Number(7)));
        assert_eq!(record.get("lifeScores_work"), Some(&Cell::Number(0)));
        assert_eq!(record.get("timeTogether"), Some(&Cell::Text(String::new())));
        assert_eq!(record.get("expectations"), Some(&Cell::Text(String::new())));
    }

    #[test]
    fn test_record_is_deterministic() {
        let catalogue = Catalogue::builtin().unwrap();
        let mut form = form(&catalogue);
        form.toggle_set_member("hobbies", "own-things").unwrap();
        form.set_rating("timeTogether", 5).unwrap();

        let exporter = ResultExporter::new(&catalogue, EchoEncoder);
        let state = form.snapshot();
        assert_eq!(exporter.to_record(&state), exporter.to_record(&state));
    }

    #[test]
    fn test_display_view_formats_answers() {
        let catalogue = Catalogue::builtin().unwrap();
        let mut form = form(&catalogue);
        form.toggle_set_member("expectations", "marriage").unwrap();
        form.toggle_set_member("expectations", "children").unwrap();
        form.set_scalar("personalityType", "introvert").unwrap();
        form.set_scalar("pets", "dragon").unwrap();
        form.set_rating("timeTogether", 6).unwrap();
        form.set_nested_rating("lifeScores", "leisure", 7).unwrap();

        let exporter = ResultExporter::new(&catalogue, EchoEncoder);
        let view = exporter.to_display_view(&form.snapshot(), None);

        let value = |key: &str| view.item(key).map(|item| item.value.clone());
        assert_eq!(value("expectations").as_deref(), Some("marriage, children"));
        assert_eq!(value("personalityType").as_deref(), Some("Introverted"));
        assert_eq!(value("pets").as_deref(), Some("dragon"));
        assert_eq!(value("timeTogether").as_deref(), Some("6/10"));
        assert_eq!(value("lifeScores_leisure").as_deref(), Some("7/10"));
        assert_eq!(value("lifeScores_work").as_deref(), Some("Not provided"));
        assert_eq!(value("hobbies").as_deref(), Some("Not provided"));

        let leisure = view.item("lifeScores_leisure").unwrap();
        assert_eq!(leisure.title, "Leisure vs. career");
        assert!(leisure.provided);
        assert!(!view.item("hobbies").unwrap().provided);
    }

    #[test]
    fn test_empty_state_displays_fallback_everywhere() {
        let catalogue = Catalogue::builtin().unwrap();
        let exporter = ResultExporter::new(&catalogue, EchoEncoder);
        let view = exporter.to_display_view(&catalogue.schema().empty_state(), None);

        assert_eq!(view.title, catalogue.title);
        // 36 個欄位，巢狀評分佔兩項
        assert_eq!(view.items().count(), 37);
        for item in view.items() {
            assert_eq!(item.value, "Not provided", "item {}", item.key);
            assert!(!item.provided);
        }

        let section_titles: Vec<&str> = view.sections.iter().map(|s| s.title.as_str()).collect();
        let expected: Vec<&str> = catalogue.sections.iter().map(String::as_str).collect();
        assert_eq!(section_titles, expected);
    }

    #[test]
    fn test_serialize_names_file_after_hint() {
        let catalogue = Catalogue::builtin().unwrap();
        let exporter = ResultExporter::new(&catalogue, EchoEncoder);
        let record = exporter.to_record(&catalogue.schema().empty_state());

        let file = exporter.serialize(&record, Some("Anna")).unwrap();
        assert_eq!(file.file_name, "Future-Partner-Check_Anna.txt");
        assert_eq!(file.bytes, b"Results:37".to_vec());

        let file = exporter.serialize(&record, Some("  ")).unwrap();
        assert_eq!(file.file_name, "Future-Partner-Check_Results.txt");

        let file = exporter.serialize(&record, Some("Anna/Ben: 2")).unwrap();
        assert_eq!(file.file_name, "Future-Partner-Check_Anna_Ben__2.txt");
    }

    #[test]
    fn test_export_uses_name_answer() {
        let catalogue = Catalogue::builtin().unwrap();
        let mut form = form(&catalogue);
        form.set_scalar("name", "Jürgen").unwrap();

        let exporter = ResultExporter::new(&catalogue, EchoEncoder);
        let file = exporter.export(&form.snapshot()).unwrap();
        assert_eq!(file.file_name, "Future-Partner-Check_Jürgen.txt");
    }

    #[test]
    fn test_encoder_failure_is_export_failure() {
        let catalogue = Catalogue::builtin().unwrap();
        let exporter = ResultExporter::new(&catalogue, FailingEncoder);
        let state = catalogue.schema().empty_state();

        match exporter.export(&state) {
            Err(CheckError::ExportFailure { message }) => assert!(message.contains("disk full")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_undeclared_section_is_still_displayed() {
        let catalogue = Catalogue::from_toml_str(
            r#"
title = "Mini"
sections = ["A"]

[[fields]]
name = "name"
kind = "text"
section = "A"
title = "Name"

[[fields]]
name = "email"
kind = "text"
section = "B"
title = "Email"
"#,
        )
        .unwrap();
        let mut form = form(&catalogue);
        form.set_scalar("email", "a@b.c").unwrap();

        let exporter = ResultExporter::new(&catalogue, EchoEncoder);
        let state = form.snapshot();
        let view = exporter.to_display_view(&state, None);

        assert_eq!(view.items().count(), exporter.to_record(&state).len());
        assert_eq!(view.item("email").map(|i| i.value.as_str()), Some("a@b.c"));
        let titles: Vec<&str> = view.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn test_out_of_range_rating_is_shown_as_given() {
        let catalogue = Catalogue::builtin().unwrap();
        let mut form = form(&catalogue);
        form.set_rating("timeTogether", 42).unwrap();
        form.set_nested_rating("lifeScores", "work", -1).unwrap();

        let exporter = ResultExporter::new(&catalogue, EchoEncoder);
        let state = form.snapshot();
        let view = exporter.to_display_view(&state, None);

        let timing = view.item("timeTogether").unwrap();
        assert_eq!(timing.value, "42/10");
        assert!(timing.provided);
        assert_eq!(
            view.item("lifeScores_work").map(|i| i.value.as_str()),
            Some("-1/10")
        );

        let record = exporter.to_record(&state);
        assert_eq!(record.get("timeTogether"), Some(&Cell::Text("42".to_string())));
        assert_eq!(record.get("lifeScores_work"), Some(&Cell::Number(-1)));
    }
}
