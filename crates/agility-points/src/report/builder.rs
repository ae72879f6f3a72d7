use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::debug;

use super::lines::{
    DogLine, EventLine, EventTally, LifetimeLine, LifetimeSubtotalLine, MultiQLine, ReportLine,
    RunRef, SpeedLine, TitleLine, VenueLine, TABLE_HEADER,
};
use super::other::other_points_lines;
use super::summary::PointsReport;
use crate::config::{PointsSortKey, ReportOptions, ScoringOptions};
use crate::filter::VisibilityFilter;
use crate::scoring::domain::{Dog, ExistingPointKind, ExistingPoints, QStatus, Run, Trial};
use crate::scoring::resolver::same_rule;
use crate::scoring::rules::{
    Configuration, DivisionConfig, EventConfig, LevelConfig, ScoringRule, VenueConfig,
};
use crate::scoring::{
    EvaluatedRun, LifetimeKind, LifetimePointAccumulator, LifetimeTally, MultiQTracker,
    RunEvaluator, ScoringResolver, Subtotal,
};

/// Inclusive date window; open ends are `None`.
type Window = (Option<NaiveDate>, Option<NaiveDate>);

fn later(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<NaiveDate> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

fn earlier(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<NaiveDate> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// The rule's validity narrowed to the filter's date bounds.
fn rule_window(rule: &ScoringRule, bounds: Window) -> Window {
    (later(rule.valid_from, bounds.0), earlier(rule.valid_to, bounds.1))
}

fn within(window: Window, date: NaiveDate) -> bool {
    window.0.map_or(true, |from| from <= date) && window.1.map_or(true, |to| date <= to)
}

/// A venue/division/level, optionally narrowed to one event, used to select
/// imported points.
struct ClassScope<'s> {
    venue: &'s str,
    division: &'s str,
    level: &'s LevelConfig,
    event: Option<&'s str>,
}

impl ClassScope<'_> {
    fn covers(&self, pts: &ExistingPoints, kind: ExistingPointKind, window: Window) -> bool {
        pts.kind == kind
            && pts.venue == self.venue
            && pts.division == self.division
            && self.level.contains(&pts.level)
            && self.event.map_or(true, |event| pts.event == event)
            && within(window, pts.date)
    }

    fn any(&self, dog: &Dog, kinds: &[ExistingPointKind], window: Window) -> bool {
        dog.existing_points
            .iter()
            .any(|pts| kinds.iter().any(|kind| self.covers(pts, *kind, window)))
    }

    fn total(&self, dog: &Dog, kind: ExistingPointKind, window: Window) -> f64 {
        dog.existing_points
            .iter()
            .filter(|pts| self.covers(pts, kind, window))
            .map(|pts| pts.points)
            .sum()
    }
}

/// A venue run with its rule applied and its report visibility decided.
struct ScoredRun<'d, 'a> {
    at: RunRef,
    run: &'d Run,
    evaluated: EvaluatedRun<'a>,
    visible: bool,
}

impl ScoredRun<'_, '_> {
    fn scored_by(&self, rule: &ScoringRule) -> bool {
        self.evaluated
            .rule
            .is_some_and(|scored| same_rule(scored, rule))
    }
}

/// Running totals for one event line across every rule of the event.
#[derive(Default)]
struct EventCounter {
    runs: Vec<RunRef>,
    judges: BTreeSet<String>,
    qualified_judges: BTreeSet<String>,
    partners: BTreeSet<String>,
    qualified_partners: BTreeSet<String>,
    clean: usize,
    not_clean: usize,
    points: f64,
    super_qs: usize,
    existing_super_qs: f64,
    has_super_q: bool,
    speed: f64,
}

impl EventCounter {
    fn count(&mut self, scored: &ScoredRun<'_, '_>, rule: &ScoringRule, event: &EventConfig) {
        let run = scored.run;
        let qualified = run.q.qualified();
        self.judges.insert(run.judge.clone());
        if qualified {
            self.qualified_judges.insert(run.judge.clone());
        }
        if rule.super_q && run.q == QStatus::SuperQ {
            self.super_qs += 1;
        }
        if rule.speed_points {
            self.speed += f64::from(scored.evaluated.speed_points.unwrap_or(0));
        }
        // Pairs only; larger relays are not tallied by partner.
        if event.has_partner {
            if let [partner] = run.partners.as_slice() {
                self.partners.insert(partner.key());
                if qualified {
                    self.qualified_partners.insert(partner.key());
                }
            }
        }
    }

    fn tally(&self, has_speed: bool) -> Option<EventTally> {
        if self.points <= 0.0 && self.runs.is_empty() {
            return None;
        }
        Some(EventTally {
            runs: self.runs.len(),
            judges: self.judges.len(),
            partners: self.partners.len(),
            qualified: self.clean + self.not_clean,
            clean: self.clean,
            qualified_judges: self.qualified_judges.len(),
            qualified_partners: self.qualified_partners.len(),
            points: self.points + self.existing_super_qs,
            super_qs: self
                .has_super_q
                .then(|| self.super_qs as f64 + self.existing_super_qs),
            speed: (has_speed && self.speed > 0.0).then_some(self.speed),
        })
    }
}

/// Assembles the points report for one dog.
#[derive(Debug, Clone, Copy)]
pub struct PointsReportBuilder<'a> {
    resolver: ScoringResolver<'a>,
    filter: VisibilityFilter<'a>,
    evaluator: RunEvaluator,
    options: ReportOptions,
}

impl<'a> PointsReportBuilder<'a> {
    pub fn new(
        config: &'a Configuration,
        filter: VisibilityFilter<'a>,
        scoring: ScoringOptions,
        options: ReportOptions,
    ) -> Self {
        Self {
            resolver: ScoringResolver::new(config),
            filter,
            evaluator: RunEvaluator::new(scoring),
            options,
        }
    }

    pub fn build(&self, dog: &Dog, today: NaiveDate) -> PointsReport {
        debug!(dog = %dog.call_name, "building points report");
        let mut lines = vec![ReportLine::Dog(DogLine {
            call_name: dog.call_name.clone(),
            registered_name: dog.registered_name.clone(),
            today,
        })];

        let config = self.resolver.configuration();
        for venue in &config.venues {
            if self.filter.is_venue_in_scope(&venue.name) {
                self.venue_lines(dog, venue, &mut lines);
            }
        }
        lines.extend(other_points_lines(config, dog, self.filter));

        debug!(dog = %dog.call_name, lines = lines.len(), "points report built");
        PointsReport {
            call_name: dog.call_name.clone(),
            today,
            lines,
        }
    }

    fn venue_lines(&self, dog: &Dog, venue: &'a VenueConfig, lines: &mut Vec<ReportLine>) {
        let header = || {
            ReportLine::Venue(VenueLine {
                venue: venue.name.clone(),
                url: venue.url.clone(),
                registration: dog.registration_for(&venue.name).map(str::to_string),
            })
        };
        let mut header_inserted = false;

        let titles: Vec<_> = dog
            .titles
            .iter()
            .filter(|title| title.venue == venue.name && self.filter.is_title_visible(title))
            .collect();
        if !titles.is_empty() {
            lines.push(header());
            header_inserted = true;
            lines.push(ReportLine::separator(format!("<h3>Titles</h3>{TABLE_HEADER}")));
            lines.extend(titles.into_iter().map(|title| {
                ReportLine::Title(TitleLine {
                    venue: title.venue.clone(),
                    name: title.name.clone(),
                    date: title.date,
                    received: title.received,
                })
            }));
            lines.push(ReportLine::separator("</table>"));
        }

        let trials: Vec<(usize, &Trial)> = dog
            .trials
            .iter()
            .enumerate()
            .filter(|(_, trial)| trial.has_venue(&venue.name))
            .collect();
        if trials.is_empty() && !dog.has_existing_points(&venue.name) {
            return;
        }
        if !header_inserted {
            lines.push(header());
        }
        lines.push(ReportLine::separator(format!("<h3>Runs</h3>{TABLE_HEADER}")));

        let scored = self.score_runs(venue, &trials);
        debug!(venue = %venue.name, runs = scored.len(), "evaluated venue runs");

        let mut events: Vec<EventLine> = Vec::new();
        let mut speed_lines = Vec::new();
        let mut lifetime = LifetimePointAccumulator::new();
        for (division_index, division) in venue.divisions.iter().enumerate() {
            let speed = self.division_events(
                dog,
                venue,
                (division_index, division),
                &scored,
                &mut events,
                &mut lifetime,
            );
            if let Some(points) = speed {
                speed_lines.push(ReportLine::Speed(SpeedLine {
                    venue: venue.name.clone(),
                    division: division.name.clone(),
                    points,
                }));
            }
        }

        events.sort_by_key(|line| self.sort_key(line));
        lines.extend(events.into_iter().map(ReportLine::Event));
        lines.extend(speed_lines);

        let tracker = MultiQTracker::new(self.filter);
        lines.extend(
            tracker
                .accumulate(venue, &dog.trials, &dog.existing_points)
                .into_iter()
                .filter(|summary| !summary.is_empty())
                .map(|summary| {
                    ReportLine::MultiQ(MultiQLine {
                        venue: venue.name.clone(),
                        name: summary.definition.name.clone(),
                        short_name: summary.definition.short_name.clone(),
                        occurrences: summary.occurrences.into_iter().collect(),
                        existing: summary.existing,
                    })
                }),
        );

        for kind in LifetimeKind::ordered() {
            lines.extend(self.lifetime_lines(venue, kind, lifetime.tally(kind)));
        }
        lines.push(ReportLine::separator("</table>"));
    }

    fn score_runs<'d>(
        &self,
        venue: &VenueConfig,
        trials: &[(usize, &'d Trial)],
    ) -> Vec<ScoredRun<'d, 'a>> {
        trials
            .iter()
            .flat_map(|&(trial_index, trial)| {
                trial.runs.iter().enumerate().map(move |(run_index, run)| {
                    let rule = self.resolver.resolve_run(trial, run);
                    ScoredRun {
                        at: RunRef {
                            trial: trial_index,
                            run: run_index,
                        },
                        run,
                        evaluated: self.evaluator.evaluate(run, rule),
                        visible: self.filter.is_run_visible(trial, run).eligible
                            && self.filter.is_run_visible_in_venue(&venue.name, trial, run),
                    }
                })
            })
            .collect()
    }

    /// Adds the division's event lines and lifetime points. Returns the
    /// division's speed-point total when any of its events carry them.
    fn division_events(
        &self,
        dog: &Dog,
        venue: &VenueConfig,
        (division_index, division): (usize, &DivisionConfig),
        scored: &[ScoredRun<'_, 'a>],
        events: &mut Vec<EventLine>,
        lifetime: &mut LifetimePointAccumulator,
    ) -> Option<f64> {
        let bounds = self.filter.date_bounds();
        let mut has_speed = false;
        let mut division_speed = 0.0;

        for (level_index, level) in division.levels.iter().enumerate() {
            let level_visible =
                self.filter
                    .is_venue_level_visible(&venue.name, &division.name, &level.name);

            for (event_index, event) in venue.events.iter().enumerate() {
                let rules = self.resolver.rules_for(
                    &venue.name,
                    &event.name,
                    &division.name,
                    &level.name,
                    true,
                );
                if rules.is_empty() {
                    continue;
                }
                let scope = ClassScope {
                    venue: &venue.name,
                    division: &division.name,
                    level,
                    event: Some(event.name.as_str()),
                };

                let mut counter = EventCounter::default();
                for rule in rules {
                    let window = rule_window(rule, bounds);
                    let has_existing = level_visible
                        && scope.any(
                            dog,
                            &[ExistingPointKind::Title, ExistingPointKind::SuperQ],
                            window,
                        );
                    let has_existing_lifetime =
                        level_visible && scope.any(dog, &[ExistingPointKind::Lifetime], window);

                    let mut counted: Vec<&ScoredRun<'_, 'a>> = Vec::new();
                    for entry in scored.iter().filter(|entry| {
                        entry.run.division == division.name
                            && level.contains(&entry.run.level)
                            && entry.run.event == event.name
                            && entry.scored_by(rule)
                    }) {
                        if entry.visible && entry.run.q.allows_tally() {
                            counter.count(entry, rule, event);
                            counted.push(entry);
                        }
                        lifetime.record_in(
                            &division.name,
                            &level.name,
                            entry.run,
                            &entry.evaluated,
                            entry.visible,
                        );
                    }

                    let mut existing_points = 0.0;
                    if has_existing || has_existing_lifetime || !counted.is_empty() {
                        existing_points = scope.total(dog, ExistingPointKind::Title, window);
                        if rule.super_q {
                            counter.existing_super_qs +=
                                scope.total(dog, ExistingPointKind::SuperQ, window);
                        }
                    }
                    if has_existing_lifetime && rule.carries_lifetime() {
                        let points = scope.total(dog, ExistingPointKind::Lifetime, window);
                        if points != 0.0 {
                            lifetime.add_existing(&division.name, &level.name, &event.name, points);
                        }
                    }

                    if has_existing || !counted.is_empty() {
                        for entry in counted.iter().filter(|entry| entry.run.q.qualified()) {
                            counter.points += entry.evaluated.title_points.unwrap_or(0.0);
                            if entry.evaluated.clean {
                                counter.clean += 1;
                            } else {
                                counter.not_clean += 1;
                            }
                        }
                        counter.points += existing_points;
                        counter.has_super_q |= rule.super_q;
                        has_speed |= rule.speed_points;
                        counter.runs.extend(counted.iter().map(|entry| entry.at));
                    }
                }

                division_speed += counter.speed;
                if let Some(tally) = counter.tally(has_speed) {
                    events.push(EventLine {
                        venue: venue.name.clone(),
                        division: division.name.clone(),
                        level: level.name.clone(),
                        event: event.name.clone(),
                        division_index,
                        level_index,
                        event_index,
                        has_partner: event.has_partner,
                        runs: counter.runs,
                        tally,
                    });
                }
            }

            if has_speed {
                let scope = ClassScope {
                    venue: &venue.name,
                    division: &division.name,
                    level,
                    event: None,
                };
                division_speed += scope.total(dog, ExistingPointKind::Speed, bounds);
            }
        }

        has_speed.then_some(division_speed)
    }

    fn sort_key(&self, line: &EventLine) -> [usize; 3] {
        self.options.sort_order.map(|key| match key {
            PointsSortKey::Division => line.division_index,
            PointsSortKey::Level => line.level_index,
            PointsSortKey::Event => line.event_index,
        })
    }

    fn lifetime_lines(
        &self,
        venue: &VenueConfig,
        kind: LifetimeKind,
        tally: &LifetimeTally,
    ) -> Vec<ReportLine> {
        if tally.is_empty() {
            return Vec::new();
        }

        let breakdown = if self.options.lifetime_by_event {
            let mut events = tally.event_totals();
            events.sort_by(|a, b| a.name.cmp(&b.name));
            events
        } else {
            tally
                .buckets()
                .iter()
                .map(|bucket| Subtotal {
                    name: format!("{} {}", bucket.division, bucket.level),
                    total: bucket.total(),
                    filtered: bucket.filtered(),
                })
                .collect()
        };

        let mut lines = vec![ReportLine::Lifetime(LifetimeLine {
            venue: venue.name.clone(),
            kind,
            lifetime_name: venue.lifetime_name.clone(),
            total: tally.total(),
            filtered: tally.filtered(),
            breakdown,
        })];

        let mut divisions = tally.division_totals();
        if divisions.len() > 1 {
            divisions.sort_by(|a, b| a.name.cmp(&b.name));
            lines.extend(divisions.into_iter().map(|subtotal| {
                ReportLine::LifetimeSubtotal(LifetimeSubtotalLine {
                    venue: venue.name.clone(),
                    kind,
                    subtotal,
                })
            }));
        }
        lines
    }
}
