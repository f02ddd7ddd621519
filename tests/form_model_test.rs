use anyhow::Result;
use compat_check::core::form::progress;
use compat_check::domain::questionnaire::{
    ChoiceField, MultiSelect, RatingField, RatingPair, TextField,
};
use compat_check::{
    Answer, AnswerSheet, Catalogue, CheckError, CompatibilityForm, FormModel, PairSlot,
    ResultExporter, XlsxEncoder,
};

#[test]
fn test_typed_and_string_forms_agree() -> Result<()> {
    let catalogue = Catalogue::builtin()?;

    let mut typed = CompatibilityForm::new(&catalogue)?;
    typed.toggle(MultiSelect::Hobbies, "own-things");
    typed.rate(RatingField::OverallRating, 9);
    typed.choose(ChoiceField::Gender, "female");
    typed.set_text(TextField::Email, "anna@example.com");
    typed.rate_pair(RatingPair::LifeScores, PairSlot::Leisure, 4);

    let sheet = AnswerSheet::from_toml_str(
        r#"
hobbies = ["own-things"]
overallRating = 9
gender = "female"
email = "anna@example.com"
lifeScores = { leisure = 4 }
"#,
    )?;
    let mut model = FormModel::new(catalogue.schema());
    sheet.apply(&mut model)?;

    assert_eq!(typed.snapshot(), model.snapshot());
    Ok(())
}

#[test]
fn test_every_display_item_uses_fallback_for_blank_form() -> Result<()> {
    let catalogue = Catalogue::builtin()?;
    let state = CompatibilityForm::new(&catalogue)?.into_model().submit();

    let exporter = ResultExporter::new(&catalogue, XlsxEncoder::new());
    let view = exporter.to_display_view(&state, None);
    assert!(view.items().all(|item| item.value == catalogue.fallback));

    let report = progress(&catalogue, &state);
    assert_eq!(report.answered, 0);
    assert_eq!(report.total, 36);
    assert_eq!(
        report.missing_required.len(),
        catalogue.required_fields().count()
    );
    Ok(())
}

#[test]
fn test_answer_sheet_rejects_undefined_field() -> Result<()> {
    let catalogue = Catalogue::builtin()?;
    let mut model = FormModel::new(catalogue.schema());
    let before = model.snapshot();

    let sheet = AnswerSheet::from_toml_str("favouriteColour = \"green\"")?;
    let err = sheet.apply(&mut model).unwrap_err();

    assert!(matches!(err, CheckError::SchemaViolation { .. }));
    assert_eq!(model.snapshot(), before);
    Ok(())
}

#[test]
fn test_toggle_round_trip_on_every_multi_select() -> Result<()> {
    let catalogue = Catalogue::builtin()?;
    let mut form = CompatibilityForm::new(&catalogue)?;
    let before = form.snapshot();

    for field in [MultiSelect::Expectations, MultiSelect::TrustIssues, MultiSelect::LifePriorities] {
        form.toggle(field, "x");
        form.toggle(field, "x");
    }
    assert_eq!(form.snapshot(), before);

    form.toggle(MultiSelect::Expectations, "marriage");
    assert_eq!(
        form.model().get("expectations"),
        Some(&Answer::MultiSelect(vec!["marriage".to_string()]))
    );
    Ok(())
}
