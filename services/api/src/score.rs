use crate::infra::{parse_table_input, InMemoryScoreRepository, TableInput};
use clap::Args;
use lkps_scoring::config::AppConfig;
use lkps_scoring::error::AppError;
use lkps_scoring::telemetry;
use lkps_scoring::workflows::lkps::{
    LkpsScoringService, PluginRegistry, SaveReport, ScoreRepository, TableCode,
};
use lkps_scoring::workflows::spreadsheet::SpreadsheetImporter;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Table spreadsheet as CODE=PATH; repeat in dependency order (3a1 first)
    #[arg(long = "input", value_parser = parse_table_input, required = true)]
    pub(crate) inputs: Vec<TableInput>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    // stdout carries the report
    telemetry::init_with_writer(&config.telemetry, std::io::stderr)?;

    let service = LkpsScoringService::new(
        Arc::new(InMemoryScoreRepository::default()),
        config.scoring,
    );

    println!("LKPS scoring run");
    for input in &args.inputs {
        let (report, skipped) = score_input(&service, input)?;
        render_report(&report, skipped);
    }
    render_scored_tables(&service.scored_tables()?);

    Ok(())
}

pub(crate) fn score_input<R>(
    service: &LkpsScoringService<R>,
    input: &TableInput,
) -> Result<(SaveReport, usize), AppError>
where
    R: ScoreRepository + 'static,
{
    let plugin = service.registry().resolve(input.code.as_str());
    let mut sheet = SpreadsheetImporter::from_path(&input.path, &input.code, plugin.as_deref())?;
    // batch runs confirm every candidate row
    for record in &mut sheet.records {
        record.selected = true;
    }

    let report = service.save_records(&input.code, sheet.records)?;
    Ok((report, sheet.skipped))
}

pub(crate) fn run_list_plugins() {
    for summary in PluginRegistry::standard().summaries() {
        let selection = if summary.allows_selection {
            " (candidate selection)"
        } else {
            ""
        };
        println!("{:<7} {}{}", summary.code, summary.title, selection);
    }
}

fn render_scored_tables(codes: &[TableCode]) {
    let listed = codes
        .iter()
        .map(TableCode::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    println!("\nScored tables: {}", if listed.is_empty() { "none" } else { listed.as_str() });
}

fn render_report(report: &SaveReport, skipped: usize) {
    println!(
        "\nTable {}: {} rows saved, {} template rows skipped",
        report.code, report.rows, skipped
    );

    match &report.outcome {
        Some(outcome) => {
            for entry in &outcome.scores {
                println!("  Butir {:>2}: {:.2}", entry.butir, entry.nilai);
            }
            let detail = outcome
                .score_detail
                .iter()
                .map(|(key, value)| format!("{key}={value:.3}"))
                .collect::<Vec<_>>()
                .join(", ");
            println!("  Detail: {}", detail);
        }
        None => println!("  Not scored"),
    }

    for issue in &report.validation {
        println!("  Row {}: {}", issue.sequence, issue.messages.join("; "));
    }
    for warning in &report.warnings {
        println!("  Warning: {}", warning);
    }
}
