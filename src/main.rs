use anyhow::Context;
use clap::Parser;
use compat_check::core::session;
use compat_check::utils::error::{CheckError, ErrorSeverity};
use compat_check::utils::{logger, validation::Validate};
use compat_check::{
    AnswerSheet, AnyEncoder, Catalogue, CliConfig, FileSessionStore, FormModel, LocalDownloads,
    ResultExporter, ResultsPage, ResultsView,
};
use std::path::Path;

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting compat-check");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(err) = run(&config) {
        let Some(e) = err.downcast_ref::<CheckError>() else {
            return Err(err);
        };

        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ compat-check failed: {:#} (Category: {:?}, Severity: {:?})",
            err,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2, // 可重試，例如匯出失敗
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3, // 問卷與答案不一致
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn run(config: &CliConfig) -> anyhow::Result<()> {
    let catalogue = match &config.catalogue {
        Some(path) => Catalogue::from_file(path)
            .with_context(|| format!("loading catalogue {}", path))?,
        None => Catalogue::builtin().context("loading built-in catalogue")?,
    };
    catalogue.validate()?;

    let mut store = FileSessionStore::new(Path::new(&config.output_path).join(".session"))?
        .clear_on_drop(!config.keep_session);

    if !config.results_only {
        let mut model = FormModel::new(catalogue.schema());
        if let Some(path) = &config.answers {
            let sheet = AnswerSheet::from_file(path)
                .with_context(|| format!("loading answer sheet {}", path))?;
            sheet.apply(&mut model)?;
        } else {
            tracing::warn!("No answer sheet given, submitting an empty form");
        }

        let (_, notification) = session::submit(model, &mut store, &catalogue)?;
        println!("{}", notification);
    }

    let format = config.format.unwrap_or(catalogue.export.format);
    let exporter = ResultExporter::new(&catalogue, AnyEncoder::for_format(format));

    let mut page = ResultsPage::new(&catalogue);
    page.mount(&store);

    match page.view(&exporter) {
        ResultsView::Results(view) => {
            if !config.quiet {
                println!();
                print!("{}", view);
                println!();
            }
        }
        ResultsView::Empty {
            title,
            message,
            call_to_action,
        } => {
            println!("{}", title);
            println!("{}", message);
            println!("➡️  {}", call_to_action);
            return Ok(());
        }
        ResultsView::Loading => {}
    }

    if config.no_export {
        return Ok(());
    }

    let mut downloads = LocalDownloads::new(&config.output_path);
    let notification = page.export(&exporter, &mut downloads);
    println!("{}", notification);

    if notification.is_failure() {
        return Err(CheckError::ExportFailure {
            message: notification.description,
        }
        .into());
    }

    Ok(())
}
