use std::collections::BTreeMap;

use super::lines::{OtherPointsEntry, OtherPointsLine, ReportLine, RunRef, TABLE_HEADER};
use crate::filter::VisibilityFilter;
use crate::scoring::domain::{Dog, ExistingPointKind};
use crate::scoring::rules::{Configuration, OtherPointsConfig, OtherPointsTally};

/// Awards for one definition from eligible runs of visible trials, followed
/// by imported points of the same name.
fn collect(
    definition: &OtherPointsConfig,
    dog: &Dog,
    filter: VisibilityFilter<'_>,
) -> Vec<OtherPointsEntry> {
    let mut entries = Vec::new();
    for (trial_index, trial) in dog.trials.iter().enumerate() {
        if !filter.is_trial_visible(trial) {
            continue;
        }
        let venue = trial
            .primary_club()
            .map(|club| club.venue.clone())
            .unwrap_or_default();
        for (run_index, run) in trial.runs.iter().enumerate() {
            if !filter.is_run_visible(trial, run).eligible {
                continue;
            }
            for award in run
                .other_points
                .iter()
                .filter(|award| award.name == definition.name)
            {
                entries.push(OtherPointsEntry {
                    run: Some(RunRef {
                        trial: trial_index,
                        run: run_index,
                    }),
                    date: run.date,
                    venue: venue.clone(),
                    division: run.division.clone(),
                    level: run.level.clone(),
                    event: run.event.clone(),
                    points: award.points,
                });
            }
        }
    }

    entries.extend(
        dog.existing_points
            .iter()
            .filter(|pts| pts.kind == ExistingPointKind::OtherPoints)
            .filter(|pts| pts.other_points == definition.name)
            .map(|pts| OtherPointsEntry {
                run: None,
                date: pts.date,
                venue: pts.venue.clone(),
                division: pts.division.clone(),
                level: pts.level.clone(),
                event: pts.event.clone(),
                points: pts.points,
            }),
    );
    entries
}

fn grouped<K: Ord>(
    entries: Vec<OtherPointsEntry>,
    key: impl Fn(&OtherPointsEntry) -> K,
) -> BTreeMap<K, Vec<OtherPointsEntry>> {
    let mut groups: BTreeMap<K, Vec<OtherPointsEntry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(key(&entry)).or_default().push(entry);
    }
    groups
}

/// The trailing other-points section; empty when nothing is configured.
pub(super) fn other_points_lines(
    config: &Configuration,
    dog: &Dog,
    filter: VisibilityFilter<'_>,
) -> Vec<ReportLine> {
    if config.other_points.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![
        ReportLine::separator(format!("<h2>Other Points</h2>{TABLE_HEADER}")),
        ReportLine::text(false, "", ""),
        ReportLine::text(false, "Other Points", ""),
    ];

    for definition in &config.other_points {
        let entries = collect(definition, dog, filter);
        if entries.is_empty() {
            continue;
        }
        let line = |level: Option<String>, event: Option<String>, entries: Vec<OtherPointsEntry>| {
            ReportLine::OtherPoints(OtherPointsLine {
                name: definition.name.clone(),
                tally: definition.tally,
                level,
                event,
                entries,
            })
        };

        match definition.tally {
            OtherPointsTally::All => lines.push(line(None, None, entries)),
            OtherPointsTally::AllByEvent => {
                lines.push(ReportLine::text(true, "", definition.name.clone()));
                for (event, group) in grouped(entries, |entry| entry.event.clone()) {
                    lines.push(line(None, Some(event), group));
                }
            }
            OtherPointsTally::Level => {
                lines.push(ReportLine::text(true, "", definition.name.clone()));
                for (level, group) in grouped(entries, |entry| entry.level.clone()) {
                    lines.push(line(Some(level), None, group));
                }
            }
            OtherPointsTally::LevelByEvent => {
                lines.push(ReportLine::text(true, "", definition.name.clone()));
                let groups = grouped(entries, |entry| (entry.level.clone(), entry.event.clone()));
                for ((level, event), group) in groups {
                    lines.push(line(Some(level), Some(event), group));
                }
            }
        }
    }

    lines.push(ReportLine::separator("</table>"));
    lines
}
