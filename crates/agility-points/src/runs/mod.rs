//! Flat run listing with per-column text and sorting.

mod columns;
mod compare;

pub use columns::RunColumn;
pub use compare::RunComparator;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::filter::VisibilityFilter;
use crate::scoring::domain::{Dog, QStatus, Run, Trial};
use crate::scoring::multiq::run_multi_qs;
use crate::scoring::rules::MultiQDefinition;
use crate::scoring::{EvaluatedRun, RunEvaluator, ScoringResolver};

/// One listed run with its derived values.
#[derive(Debug, Clone)]
pub struct RunRow<'a> {
    pub dog: &'a Dog,
    pub trial: &'a Trial,
    pub run: &'a Run,
    pub evaluated: EvaluatedRun<'a>,
    pub multi_qs: Vec<&'a MultiQDefinition>,
}

impl<'a> RunRow<'a> {
    pub fn new(
        dog: &'a Dog,
        trial: &'a Trial,
        run: &'a Run,
        resolver: ScoringResolver<'a>,
        evaluator: &RunEvaluator,
    ) -> Self {
        let evaluated = evaluator.evaluate(run, resolver.resolve_run(trial, run));
        let multi_qs = trial
            .club_for(run)
            .and_then(|club| resolver.venue(&club.venue))
            .map(|venue| run_multi_qs(venue, trial, run))
            .unwrap_or_default();
        Self {
            dog,
            trial,
            run,
            evaluated,
            multi_qs,
        }
    }

    pub fn cells(&self, columns: &[RunColumn]) -> Vec<String> {
        columns.iter().map(|column| self.text(*column)).collect()
    }
}

/// Runs the filter lists for a dog, in trial then entry order.
pub fn visible_rows<'a>(
    dog: &'a Dog,
    resolver: ScoringResolver<'a>,
    evaluator: &RunEvaluator,
    filter: VisibilityFilter<'_>,
) -> Vec<RunRow<'a>> {
    let rows: Vec<RunRow<'a>> = dog
        .trials
        .iter()
        .filter(|trial| filter.is_trial_visible(trial))
        .flat_map(|trial| {
            trial
                .runs
                .iter()
                .filter(move |run| filter.is_run_visible(trial, run).listed)
                .map(move |run| (trial, run))
        })
        .map(|(trial, run)| RunRow::new(dog, trial, run, resolver, evaluator))
        .collect();
    debug!(dog = %dog.call_name, rows = rows.len(), "listed runs");
    rows
}

/// Serializable snapshot of a row for hosts.
#[derive(Debug, Clone, Serialize)]
pub struct RunRowView {
    pub date: NaiveDate,
    pub event: String,
    pub q: QStatus,
    pub cells: Vec<String>,
}

impl RunRow<'_> {
    pub fn view(&self, columns: &[RunColumn]) -> RunRowView {
        RunRowView {
            date: self.run.date,
            event: self.run.event.clone(),
            q: self.run.q,
            cells: self.cells(columns),
        }
    }
}
