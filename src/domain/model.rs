use crate::utils::error::{CheckError, Result};
use chrono::{DateTime, Utc};
use serde::de;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// 問題的答案型別，決定允許的更新操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    MultiSelect,
    Text,
    Choice,
    Rating,
    RatingPair,
}

impl AnswerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MultiSelect => "multi_select",
            Self::Text => "text",
            Self::Choice => "choice",
            Self::Rating => "rating",
            Self::RatingPair => "rating_pair",
        }
    }

    /// 表單建立時的初始值
    pub fn empty_answer(self) -> Answer {
        match self {
            Self::MultiSelect => Answer::MultiSelect(Vec::new()),
            Self::Text => Answer::Text(String::new()),
            Self::Choice => Answer::Choice(String::new()),
            Self::Rating => Answer::Rating(None),
            Self::RatingPair => Answer::RatingPair(RatingPairValue::default()),
        }
    }

    pub fn is_scalar(self) -> bool {
        matches!(self, Self::Text | Self::Choice)
    }
}

impl fmt::Display for AnswerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two halves of a nested rating pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairSlot {
    Leisure,
    Work,
}

impl PairSlot {
    pub const ALL: [PairSlot; 2] = [PairSlot::Leisure, PairSlot::Work];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Leisure => "leisure",
            Self::Work => "work",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "leisure" => Some(Self::Leisure),
            "work" => Some(Self::Work),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingPairValue {
    pub leisure: Option<i64>,
    pub work: Option<i64>,
}

impl RatingPairValue {
    pub fn get(&self, slot: PairSlot) -> Option<i64> {
        match slot {
            PairSlot::Leisure => self.leisure,
            PairSlot::Work => self.work,
        }
    }

    pub fn set(&mut self, slot: PairSlot, value: i64) {
        match slot {
            PairSlot::Leisure => self.leisure = Some(value),
            PairSlot::Work => self.work = Some(value),
        }
    }
}

/// A single question's value.
///
/// Serialized untagged: sets become arrays, text and choices strings,
/// ratings numbers or `null`, pairs `{ "leisure": .., "work": .. }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    MultiSelect(Vec<String>),
    Text(String),
    Choice(String),
    Rating(Option<i64>),
    RatingPair(RatingPairValue),
}

impl Answer {
    pub fn kind(&self) -> AnswerKind {
        match self {
            Self::MultiSelect(_) => AnswerKind::MultiSelect,
            Self::Text(_) => AnswerKind::Text,
            Self::Choice(_) => AnswerKind::Choice,
            Self::Rating(_) => AnswerKind::Rating,
            Self::RatingPair(_) => AnswerKind::RatingPair,
        }
    }

    /// 是否已填寫（空集合、空字串、未評分都算未填）
    pub fn is_provided(&self) -> bool {
        match self {
            Self::MultiSelect(tags) => !tags.is_empty(),
            Self::Text(s) | Self::Choice(s) => !s.is_empty(),
            Self::Rating(value) => value.is_some(),
            Self::RatingPair(pair) => pair.leisure.is_some() || pair.work.is_some(),
        }
    }

    /// Decode a JSON value produced by `Serialize` back into an answer of `kind`.
    pub fn from_json(field: &str, kind: AnswerKind, value: serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        let answer = match (kind, value) {
            (AnswerKind::MultiSelect, Value::Array(items)) => {
                let mut tags: Vec<String> = Vec::with_capacity(items.len());
                for item in items {
                    let tag: String = serde_json::from_value(item)?;
                    if !tags.contains(&tag) {
                        tags.push(tag);
                    }
                }
                Self::MultiSelect(tags)
            }
            (AnswerKind::Text, Value::String(s)) => Self::Text(s),
            (AnswerKind::Choice, Value::String(s)) => Self::Choice(s),
            (AnswerKind::Rating, value @ (Value::Null | Value::Number(_))) => {
                Self::Rating(serde_json::from_value(value)?)
            }
            (AnswerKind::RatingPair, value @ Value::Object(_)) => {
                Self::RatingPair(serde_json::from_value(value)?)
            }
            (kind, other) => {
                return Err(CheckError::SerializationError(de::Error::custom(format!(
                    "stored value for '{}' does not match kind {}: {}",
                    field, kind, other
                ))))
            }
        };
        Ok(answer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: AnswerKind,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: AnswerKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// 固定的欄位清單；執行期間不會增減
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 每個欄位都在，值為初始空值
    pub fn empty_state(&self) -> FormState {
        FormState {
            entries: self
                .fields
                .iter()
                .map(|spec| (spec.name.clone(), spec.kind.empty_answer()))
                .collect(),
        }
    }

    /// Rebuild a state from the JSON object written by `FormState`'s `Serialize`.
    ///
    /// Missing fields fall back to their empty answer and unknown keys are
    /// skipped; both are logged. A value of the wrong shape is an error.
    pub fn decode_state(&self, value: serde_json::Value) -> Result<FormState> {
        let serde_json::Value::Object(mut object) = value else {
            return Err(CheckError::SerializationError(de::Error::custom(
                "stored answers are not a JSON object",
            )));
        };

        let mut entries = Vec::with_capacity(self.fields.len());
        for spec in &self.fields {
            let answer = match object.remove(&spec.name) {
                Some(raw) => Answer::from_json(&spec.name, spec.kind, raw)?,
                None => {
                    tracing::warn!("Stored answers lack field '{}', using empty value", spec.name);
                    spec.kind.empty_answer()
                }
            };
            entries.push((spec.name.clone(), answer));
        }

        for unknown in object.keys() {
            tracing::warn!("Ignoring stored answer for unknown field '{}'", unknown);
        }

        Ok(FormState { entries })
    }
}

/// The complete set of answers at one point in time, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    entries: Vec<(String, Answer)>,
}

impl FormState {
    pub fn get(&self, field: &str) -> Option<&Answer> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, answer)| answer)
    }

    pub(crate) fn get_mut(&mut self, field: &str) -> Option<&mut Answer> {
        self.entries
            .iter_mut()
            .find(|(name, _)| name == field)
            .map(|(_, answer)| answer)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Answer)> {
        self.entries
            .iter()
            .map(|(name, answer)| (name.as_str(), answer))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 已填寫的欄位數
    pub fn answered(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, answer)| answer.is_provided())
            .count()
    }
}

impl Serialize for FormState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, answer) in &self.entries {
            map.serialize_entry(name, answer)?;
        }
        map.end()
    }
}

/// 送出當下的快照與時間
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub submitted_at: DateTime<Utc>,
    pub state: FormState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
    pub missing_required: Vec<String>,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.missing_required.is_empty()
    }
}

/// One spreadsheet cell of a result record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(i64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

/// Flat, ordered column → cell mapping; one spreadsheet data row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultRecord {
    columns: Vec<(String, Cell)>,
}

impl ResultRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>, cell: impl Into<Cell>) {
        self.columns.push((column.into(), cell.into()));
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, cell)| cell)
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.columns.iter().map(|(_, cell)| cell)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.columns.iter().map(|(name, cell)| (name.as_str(), cell))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for ResultRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, cell) in &self.columns {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}
