//! Rendering-agnostic view models handed to whatever presents the results.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayItem {
    /// Field name, or `<field>_<slot>` for one half of a rating pair.
    pub key: String,
    pub title: String,
    pub value: String,
    pub provided: bool,
    pub long_text: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplaySection {
    pub title: String,
    pub items: Vec<DisplayItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayView {
    pub title: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub sections: Vec<DisplaySection>,
}

impl DisplayView {
    pub fn items(&self) -> impl Iterator<Item = &DisplayItem> {
        self.sections.iter().flat_map(|section| section.items.iter())
    }

    pub fn item(&self, key: &str) -> Option<&DisplayItem> {
        self.items().find(|item| item.key == key)
    }
}

impl fmt::Display for DisplayView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if let Some(at) = self.submitted_at {
            writeln!(f, "Submitted: {}", at.format("%Y-%m-%d %H:%M UTC"))?;
        }

        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "== {} ==", section.title)?;
            for item in &section.items {
                if item.long_text {
                    writeln!(f, "{}:", item.title)?;
                    for line in item.value.lines() {
                        writeln!(f, "    {}", line)?;
                    }
                } else {
                    writeln!(f, "{}: {}", item.title, item.value)?;
                }
            }
        }
        Ok(())
    }
}

/// A fully encoded export, ready to be offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Failure,
}

/// 對使用者顯示、可關閉的提示訊息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn failure(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Failure,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.kind == NotificationKind::Failure
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.kind {
            NotificationKind::Success => "✅",
            NotificationKind::Failure => "❌",
        };
        write!(f, "{} {}: {}", marker, self.title, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_view_renders_sections() {
        let view = DisplayView {
            title: "Results".to_string(),
            submitted_at: None,
            sections: vec![DisplaySection {
                title: "Personal details".to_string(),
                items: vec![
                    DisplayItem {
                        key: "name".to_string(),
                        title: "Name".to_string(),
                        value: "Anna".to_string(),
                        provided: true,
                        long_text: false,
                    },
                    DisplayItem {
                        key: "idealPartner".to_string(),
                        title: "About me".to_string(),
                        value: "line one\nline two".to_string(),
                        provided: true,
                        long_text: true,
                    },
                ],
            }],
        };

        let text = view.to_string();
        assert!(text.starts_with("Results\n"));
        assert!(text.contains("== Personal details =="));
        assert!(text.contains("Name: Anna"));
        assert!(text.contains("About me:\n    line one\n    line two"));
        assert_eq!(view.item("name").map(|i| i.value.as_str()), Some("Anna"));
    }
}
