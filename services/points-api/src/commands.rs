use crate::infra::{parse_column, parse_date};
use agility_points::config::AppConfig;
use agility_points::document::PointsDocument;
use agility_points::error::AppError;
use agility_points::filter::VisibilityFilterState;
use agility_points::report::PointsReportBuilder;
use agility_points::runs::{visible_rows, RunColumn, RunComparator};
use agility_points::scoring::{RunEvaluator, ScoringResolver};
use agility_points::telemetry;
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum ReportFormat {
    #[default]
    Text,
    Html,
    Csv,
}

#[derive(Args, Debug)]
pub(crate) struct PointsReportArgs {
    /// JSON document snapshot holding the configuration and dogs
    #[arg(long)]
    pub(crate) document: PathBuf,
    /// Call name of the dog to report on
    #[arg(long)]
    pub(crate) dog: String,
    /// Report date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Output format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub(crate) format: ReportFormat,
    /// Saved filter to apply instead of the document's active filter
    #[arg(long)]
    pub(crate) filter: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct RunsListArgs {
    /// JSON document snapshot holding the configuration and dogs
    #[arg(long)]
    pub(crate) document: PathBuf,
    /// Call name of the dog whose runs are listed
    #[arg(long)]
    pub(crate) dog: String,
    /// Column to sort by, as a key (`title_points`) or label (`Title Pts`)
    #[arg(long, value_parser = parse_column)]
    pub(crate) sort: Option<RunColumn>,
    /// Sort in descending order
    #[arg(long)]
    pub(crate) descending: bool,
    /// Saved filter to apply instead of the document's active filter
    #[arg(long)]
    pub(crate) filter: Option<String>,
}

fn filter_state(document: &PointsDocument, name: Option<&str>) -> VisibilityFilterState {
    let Some(name) = name else {
        return document.filter.clone();
    };
    let mut catalog = document.catalog();
    if !catalog.set_current(name) {
        warn!(filter = name, "unknown saved filter; showing every run");
    }
    catalog.current().clone()
}

pub(crate) fn run_points_report(args: PointsReportArgs) -> Result<(), AppError> {
    let PointsReportArgs {
        document,
        dog,
        today,
        format,
        filter,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let document = PointsDocument::from_path(&document)?;
    let dog = document.dog(&dog)?;
    let state = filter_state(&document, filter.as_deref());
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let report = PointsReportBuilder::new(
        &document.configuration,
        state.filter(),
        config.scoring,
        config.report,
    )
    .build(dog, today);

    let stdout = std::io::stdout();
    match format {
        ReportFormat::Text => stdout.lock().write_all(report.to_text().as_bytes())?,
        ReportFormat::Html => stdout.lock().write_all(report.html().as_bytes())?,
        ReportFormat::Csv => report.write_csv(stdout.lock())?,
    }

    info!(dog = %dog.call_name, lines = report.lines().len(), ?format, "points report written");
    Ok(())
}

pub(crate) fn run_runs_list(args: RunsListArgs) -> Result<(), AppError> {
    let RunsListArgs {
        document,
        dog,
        sort,
        descending,
        filter,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let document = PointsDocument::from_path(&document)?;
    let dog = document.dog(&dog)?;
    let state = filter_state(&document, filter.as_deref());

    let resolver = ScoringResolver::new(&document.configuration);
    let evaluator = RunEvaluator::new(config.scoring);
    let mut rows = visible_rows(dog, resolver, &evaluator, state.filter());
    if let Some(column) = sort {
        RunComparator::for_column(column, descending).sort(&mut rows);
    }

    let columns = RunColumn::ordered();
    let mut out = std::io::stdout().lock();
    let header: Vec<&str> = columns.iter().map(|column| column.label()).collect();
    writeln!(out, "{}", header.join("\t"))?;
    for row in &rows {
        writeln!(out, "{}", row.cells(&columns).join("\t"))?;
    }

    info!(dog = %dog.call_name, runs = rows.len(), "runs listed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agility_points::filter::RunsView;
    use std::io::Cursor;

    fn document() -> PointsDocument {
        let json = r#"{
            "filter": {"runs_view": "non_qualifying_only"},
            "filters": {"Qs": {"runs_view": "qualifying_only"}}
        }"#;
        PointsDocument::from_reader(Cursor::new(json)).expect("document")
    }

    #[test]
    fn saved_filter_replaces_active_filter() {
        let document = document();
        assert_eq!(
            filter_state(&document, None).runs_view,
            RunsView::NonQualifyingOnly
        );
        assert_eq!(
            filter_state(&document, Some("Qs")).runs_view,
            RunsView::QualifyingOnly
        );
        assert_eq!(filter_state(&document, Some("Nope")).runs_view, RunsView::All);
    }
}
