use anyhow::Result;
use compat_check::core::session::{self, SESSION_KEY};
use compat_check::domain::ports::SessionStore;
use compat_check::{
    AnswerSheet, Catalogue, CsvEncoder, FileSessionStore, FormModel, LocalDownloads,
    ResultExporter, ResultsPage, ResultsState, ResultsView, XlsxEncoder,
};
use std::io::Read;
use tempfile::TempDir;

const ANNA: &str = r#"
expectations = ["marriage", "children"]
lifeScores = { leisure = 3, work = 8 }
timeTogether = 7
personalityType = "ambivert"
pets = "dog"
idealPartner = """
Kind & honest.
Likes <long> walks."""
name = "Anna"
"#;

fn anna_model(catalogue: &Catalogue) -> Result<FormModel> {
    let mut model = FormModel::new(catalogue.schema());
    AnswerSheet::from_toml_str(ANNA)?.apply(&mut model)?;
    Ok(model)
}

#[test]
fn test_end_to_end_xlsx_export() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let catalogue = Catalogue::builtin()?;

    // Fill in and submit
    let mut store = FileSessionStore::new(temp_dir.path().join(".session"))?;
    let (_, notification) = session::submit(anna_model(&catalogue)?, &mut store, &catalogue)?;
    assert!(!notification.is_failure());

    // Mount the results page
    let exporter = ResultExporter::new(&catalogue, XlsxEncoder::new());
    let mut page = ResultsPage::new(&catalogue);
    assert!(matches!(page.mount(&store), ResultsState::HasData(_)));

    let ResultsView::Results(view) = page.view(&exporter) else {
        panic!("expected results view");
    };
    assert_eq!(
        view.item("expectations").map(|i| i.value.as_str()),
        Some("marriage, children")
    );
    assert_eq!(
        view.item("lifeScores_work").map(|i| i.value.as_str()),
        Some("8/10")
    );

    // Export
    let output_dir = temp_dir.path().join("downloads");
    let mut downloads = LocalDownloads::new(&output_dir);
    let notification = page.export(&exporter, &mut downloads);
    assert!(!notification.is_failure(), "{}", notification);

    let path = output_dir.join("Future-Partner-Check_Anna.xlsx");
    assert!(path.exists());

    let zip_data = std::fs::read(&path)?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data))?;
    let mut sheet = String::new();
    archive
        .by_name("xl/worksheets/sheet1.xml")?
        .read_to_string(&mut sheet)?;

    assert!(sheet.contains("<t>expectations</t>"));
    assert!(sheet.contains("<t>lifeScores_leisure</t>"));
    assert!(sheet.contains("marriage, children"));
    assert!(sheet.contains("<v>3</v>"));
    assert!(sheet.contains("<v>8</v>"));
    assert!(sheet.contains("Kind &amp; honest."));
    assert!(sheet.contains("&lt;long&gt;"));

    let mut workbook = String::new();
    archive
        .by_name("xl/workbook.xml")?
        .read_to_string(&mut workbook)?;
    assert!(workbook.contains(r#"name="Results""#));

    Ok(())
}

#[test]
fn test_csv_export_has_header_and_one_row() -> Result<()> {
    let catalogue = Catalogue::builtin()?;
    let state = anna_model(&catalogue)?.submit();

    let exporter = ResultExporter::new(&catalogue, CsvEncoder);
    let file = exporter.export(&state)?;
    assert_eq!(file.file_name, "Future-Partner-Check_Anna.csv");

    let mut reader = csv::Reader::from_reader(file.bytes.as_slice());
    let headers = reader.headers()?.clone();
    assert_eq!(headers.len(), 37);
    assert_eq!(&headers[0], "expectations");
    assert_eq!(&headers[36], "name");

    let rows: Vec<csv::StringRecord> = reader.records().collect::<std::result::Result<_, _>>()?;
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "marriage, children");
    assert_eq!(&rows[0][2], "3");
    assert_eq!(&rows[0][3], "8");
    assert_eq!(&rows[0][36], "Anna");

    Ok(())
}

#[test]
fn test_session_survives_reopen_and_ends_on_drop() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let catalogue = Catalogue::builtin()?;
    let session_dir = temp_dir.path().join(".session");

    let submitted = {
        let mut store = FileSessionStore::new(&session_dir)?.clear_on_drop(true);
        let (submission, _) = session::submit(anna_model(&catalogue)?, &mut store, &catalogue)?;

        // A second reader of the same session sees the same snapshot
        let reader = FileSessionStore::new(&session_dir)?;
        let loaded = session::load_submission(&reader, &catalogue.schema())?;
        assert_eq!(loaded.as_ref(), Some(&submission));
        submission
    };
    assert_eq!(submitted.state.answered(), 7);

    let store = FileSessionStore::new(&session_dir)?;
    assert!(store.get(SESSION_KEY)?.is_none());

    let mut page = ResultsPage::new(&catalogue);
    assert_eq!(page.mount(&store), &ResultsState::NoData);

    Ok(())
}

#[test]
fn test_custom_catalogue_from_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("catalogue.toml");
    std::fs::write(
        &path,
        r#"
title = "Team fit"
fallback = "n/a"
sections = ["Work"]

[export]
sheet_name = "Fit"
file_prefix = "Team-Fit"

[[fields]]
name = "remote"
kind = "choice"
section = "Work"
title = "Remote work"
options = [{ tag = "yes", label = "Yes please" }, { tag = "no", label = "No" }]

[[fields]]
name = "meetings"
kind = "rating"
section = "Work"
title = "Meetings"
min = 0
max = 5
"#,
    )?;

    let catalogue = Catalogue::from_file(&path)?;
    catalogue.validate_config()?;

    let mut model = FormModel::new(catalogue.schema());
    model.set_scalar("remote", "yes")?;
    model.set_rating("meetings", 2)?;
    let state = model.submit();

    let exporter = ResultExporter::new(&catalogue, CsvEncoder);
    let view = exporter.to_display_view(&state, None);
    assert_eq!(view.item("remote").map(|i| i.value.as_str()), Some("Yes please"));
    assert_eq!(view.item("meetings").map(|i| i.value.as_str()), Some("2/5"));

    let file = exporter.export(&state)?;
    assert_eq!(file.file_name, "Team-Fit_Results.csv");
    assert_eq!(String::from_utf8(file.bytes)?, "remote,meetings\nyes,2\n");

    Ok(())
}
