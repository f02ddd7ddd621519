use crate::config::catalogue::Catalogue;
use crate::domain::model::{
    Answer, AnswerKind, FormState, PairSlot, Progress, Schema,
};
use crate::domain::questionnaire::{
    ChoiceField, MultiSelect, RatingField, RatingPair, TextField, TypedField,
};
use crate::utils::error::{CheckError, Result};

/// Holds the in-progress answers and offers the only legal mutations.
///
/// Fields are addressed by name; a name outside the schema or of another
/// kind is a `SchemaViolation`. Values themselves are not validated: any
/// tag, any choice string and any rating are accepted.
#[derive(Debug, Clone)]
pub struct FormModel {
    schema: Schema,
    state: FormState,
}

impl FormModel {
    pub fn new(schema: Schema) -> Self {
        let state = schema.empty_state();
        tracing::debug!("Created form model with {} fields", state.len());
        Self { schema, state }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn get(&self, field: &str) -> Option<&Answer> {
        self.state.get(field)
    }

    pub fn is_selected(&self, field: &str, tag: &str) -> bool {
        matches!(self.state.get(field), Some(Answer::MultiSelect(tags)) if tags.iter().any(|t| t == tag))
    }

    /// 已選則移除，未選則加到最後
    pub fn toggle_set_member(&mut self, field: &str, tag: &str) -> Result<()> {
        let Answer::MultiSelect(tags) = self.slot_mut(field, AnswerKind::MultiSelect)? else {
            return Err(kind_mismatch(field, AnswerKind::MultiSelect));
        };

        if let Some(position) = tags.iter().position(|t| t == tag) {
            tags.remove(position);
            tracing::debug!("Deselected '{}' in {}", tag, field);
        } else {
            tags.push(tag.to_string());
            tracing::debug!("Selected '{}' in {}", tag, field);
        }
        Ok(())
    }

    pub fn set_scalar(&mut self, field: &str, value: &str) -> Result<()> {
        let kind = self.kind_of(field)?;
        match self.slot_mut(field, kind)? {
            Answer::Text(current) | Answer::Choice(current) => {
                *current = value.to_string();
                tracing::debug!("Set {} ({})", field, kind);
                Ok(())
            }
            _ => Err(CheckError::schema_violation(
                field,
                format!("expected a text or choice field, found {}", kind),
            )),
        }
    }

    /// Range checks belong to the presenter; out-of-range values are stored as given.
    pub fn set_rating(&mut self, field: &str, value: i64) -> Result<()> {
        let Answer::Rating(current) = self.slot_mut(field, AnswerKind::Rating)? else {
            return Err(kind_mismatch(field, AnswerKind::Rating));
        };
        *current = Some(value);
        tracing::debug!("Rated {} = {}", field, value);
        Ok(())
    }

    pub fn set_nested_rating(&mut self, parent: &str, slot: &str, value: i64) -> Result<()> {
        let slot = PairSlot::parse(slot).ok_or_else(|| {
            CheckError::schema_violation(
                format!("{}.{}", parent, slot),
                "rating pairs only have 'leisure' and 'work'",
            )
        })?;
        self.set_pair_slot(parent, slot, value)
    }

    pub fn set_pair_slot(&mut self, parent: &str, slot: PairSlot, value: i64) -> Result<()> {
        let Answer::RatingPair(pair) = self.slot_mut(parent, AnswerKind::RatingPair)? else {
            return Err(kind_mismatch(parent, AnswerKind::RatingPair));
        };
        pair.set(slot, value);
        tracing::debug!("Rated {}.{} = {}", parent, slot.as_str(), value);
        Ok(())
    }

    /// 回傳獨立副本，之後修改模型不會影響它
    pub fn snapshot(&self) -> FormState {
        self.state.clone()
    }

    /// 送出後模型即被消耗，狀態不可再變
    pub fn submit(self) -> FormState {
        tracing::info!(
            "Form submitted with {} of {} fields answered",
            self.state.answered(),
            self.state.len()
        );
        self.state
    }

    fn kind_of(&self, field: &str) -> Result<AnswerKind> {
        self.schema
            .field(field)
            .map(|spec| spec.kind)
            .ok_or_else(|| CheckError::schema_violation(field, "field is not part of the schema"))
    }

    fn slot_mut(&mut self, field: &str, expected: AnswerKind) -> Result<&mut Answer> {
        let kind = self.kind_of(field)?;
        let kind_matches = kind == expected || (kind.is_scalar() && expected.is_scalar());
        if !kind_matches {
            tracing::error!("Field '{}' is {}, not {}", field, kind, expected);
            return Err(kind_mismatch(field, expected));
        }

        self.state
            .get_mut(field)
            .ok_or_else(|| CheckError::schema_violation(field, "field missing from state"))
    }
}

fn kind_mismatch(field: &str, expected: AnswerKind) -> CheckError {
    CheckError::schema_violation(field, format!("field is not a {} field", expected))
}

/// 計算填答進度；必填欄位只提示，不阻擋送出
pub fn progress(catalogue: &Catalogue, state: &FormState) -> Progress {
    let missing_required = catalogue
        .required_fields()
        .filter(|question| {
            !state
                .get(&question.name)
                .map(Answer::is_provided)
                .unwrap_or(false)
        })
        .map(|question| question.name.clone())
        .collect();

    Progress {
        answered: state.answered(),
        total: state.len(),
        missing_required,
    }
}

/// Compile-time addressed form for the built-in questionnaire.
///
/// The catalogue is checked once at construction; afterwards the typed
/// operations cannot hit an unknown field or the wrong kind.
#[derive(Debug, Clone)]
pub struct CompatibilityForm {
    model: FormModel,
}

impl CompatibilityForm {
    pub fn new(catalogue: &Catalogue) -> Result<Self> {
        let schema = catalogue.schema();
        check_typed_fields::<MultiSelect>(&schema)?;
        check_typed_fields::<RatingField>(&schema)?;
        check_typed_fields::<ChoiceField>(&schema)?;
        check_typed_fields::<TextField>(&schema)?;
        check_typed_fields::<RatingPair>(&schema)?;

        Ok(Self {
            model: FormModel::new(schema),
        })
    }

    pub fn toggle(&mut self, field: MultiSelect, tag: &str) {
        let outcome = self.model.toggle_set_member(field.name(), tag);
        unreachable_violation(outcome);
    }

    pub fn set_text(&mut self, field: TextField, value: &str) {
        let outcome = self.model.set_scalar(field.name(), value);
        unreachable_violation(outcome);
    }

    pub fn choose(&mut self, field: ChoiceField, value: &str) {
        let outcome = self.model.set_scalar(field.name(), value);
        unreachable_violation(outcome);
    }

    pub fn rate(&mut self, field: RatingField, value: i64) {
        let outcome = self.model.set_rating(field.name(), value);
        unreachable_violation(outcome);
    }

    pub fn rate_pair(&mut self, field: RatingPair, slot: PairSlot, value: i64) {
        let outcome = self.model.set_pair_slot(field.name(), slot, value);
        unreachable_violation(outcome);
    }

    pub fn model(&self) -> &FormModel {
        &self.model
    }

    pub fn snapshot(&self) -> FormState {
        self.model.snapshot()
    }

    pub fn into_model(self) -> FormModel {
        self.model
    }
}

fn check_typed_fields<F: TypedField>(schema: &Schema) -> Result<()> {
    for field in F::all() {
        match schema.field(field.name()) {
            Some(spec) if spec.kind == F::KIND => {}
            Some(spec) => {
                return Err(CheckError::schema_violation(
                    field.name(),
                    format!("catalogue declares {}, expected {}", spec.kind, F::KIND),
                ))
            }
            None => {
                return Err(CheckError::schema_violation(
                    field.name(),
                    "catalogue does not define this field",
                ))
            }
        }
    }
    Ok(())
}

// 建構時已驗證過，這裡失敗代表程式錯誤：開發時中斷，正式版只記錄並忽略
fn unreachable_violation(outcome: Result<()>) {
    if let Err(err) = outcome {
        tracing::error!("Ignoring mutation after schema violation: {}", err);
        debug_assert!(false, "typed form mutation failed: {err}");
    }
}
