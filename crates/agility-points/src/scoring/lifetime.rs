use serde::Serialize;

use super::domain::Run;
use super::evaluator::EvaluatedRun;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifetimeKind {
    Lifetime,
    Placement,
}

impl LifetimeKind {
    pub const fn ordered() -> [Self; 2] {
        [Self::Lifetime, Self::Placement]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Lifetime => "Lifetime",
            Self::Placement => "Placement",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifetimeEntry {
    pub event: String,
    pub points: f64,
    /// Earned by a run the active filter excludes.
    pub filtered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifetimeBucket {
    pub division: String,
    pub level: String,
    pub entries: Vec<LifetimeEntry>,
}

impl LifetimeBucket {
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|entry| entry.points).sum()
    }

    pub fn filtered(&self) -> f64 {
        self.entries
            .iter()
            .filter(|entry| entry.filtered)
            .map(|entry| entry.points)
            .sum()
    }
}

/// Points summed under one grouping key, split into counted and hidden.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subtotal {
    pub name: String,
    pub total: f64,
    pub filtered: f64,
}

impl Subtotal {
    pub fn counted(&self) -> f64 {
        self.total - self.filtered
    }
}

/// (division, level) buckets in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LifetimeTally {
    buckets: Vec<LifetimeBucket>,
}

impl LifetimeTally {
    pub fn add(&mut self, division: &str, level: &str, event: &str, points: f64, filtered: bool) {
        let entry = LifetimeEntry {
            event: event.to_string(),
            points,
            filtered,
        };
        match self
            .buckets
            .iter_mut()
            .find(|bucket| bucket.division == division && bucket.level == level)
        {
            Some(bucket) => bucket.entries.push(entry),
            None => self.buckets.push(LifetimeBucket {
                division: division.to_string(),
                level: level.to_string(),
                entries: vec![entry],
            }),
        }
    }

    pub fn buckets(&self) -> &[LifetimeBucket] {
        &self.buckets
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.buckets.iter().map(LifetimeBucket::total).sum()
    }

    pub fn filtered(&self) -> f64 {
        self.buckets.iter().map(LifetimeBucket::filtered).sum()
    }

    pub fn counted(&self) -> f64 {
        self.total() - self.filtered()
    }

    /// Rolls the level buckets up to their division.
    pub fn division_totals(&self) -> Vec<Subtotal> {
        let mut totals: Vec<Subtotal> = Vec::new();
        for bucket in &self.buckets {
            add_to(&mut totals, &bucket.division, bucket.total(), bucket.filtered());
        }
        totals
    }

    pub fn event_totals(&self) -> Vec<Subtotal> {
        let mut totals: Vec<Subtotal> = Vec::new();
        for entry in self.buckets.iter().flat_map(|bucket| &bucket.entries) {
            let filtered = if entry.filtered { entry.points } else { 0.0 };
            add_to(&mut totals, &entry.event, entry.points, filtered);
        }
        totals
    }
}

fn add_to(totals: &mut Vec<Subtotal>, name: &str, total: f64, filtered: f64) {
    match totals.iter_mut().find(|subtotal| subtotal.name == name) {
        Some(subtotal) => {
            subtotal.total += total;
            subtotal.filtered += filtered;
        }
        None => totals.push(Subtotal {
            name: name.to_string(),
            total,
            filtered,
        }),
    }
}

/// Lifetime and placement tallies for one venue.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LifetimePointAccumulator {
    pub lifetime: LifetimeTally,
    pub placement: LifetimeTally,
}

impl LifetimePointAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a run's lifetime and placement points. Not-applicable runs are
    /// skipped; `eligible` is the run's Q-independent visibility.
    pub fn record(&mut self, run: &Run, evaluated: &EvaluatedRun<'_>, eligible: bool) {
        self.record_in(&run.division, &run.level, run, evaluated, eligible);
    }

    /// Like `record`, but buckets under a configured division and level, so
    /// sub-level runs land with their parent level.
    pub fn record_in(
        &mut self,
        division: &str,
        level: &str,
        run: &Run,
        evaluated: &EvaluatedRun<'_>,
        eligible: bool,
    ) {
        if !run.q.allows_tally() || !run.q.qualified() {
            return;
        }
        if let Some(points) = evaluated.lifetime_points.filter(|points| *points > 0.0) {
            self.lifetime
                .add(division, level, &run.event, points, !eligible);
        }
        if let Some(points) = evaluated.placement_points.filter(|points| *points > 0.0) {
            self.placement
                .add(division, level, &run.event, points, !eligible);
        }
    }

    /// Imported lifetime points always count.
    pub fn add_existing(&mut self, division: &str, level: &str, event: &str, points: f64) {
        self.lifetime.add(division, level, event, points, false);
    }

    pub fn accumulate<'r, 'a: 'r, I>(runs: I) -> Self
    where
        I: IntoIterator<Item = (&'r Run, &'r EvaluatedRun<'a>, bool)>,
    {
        let mut accumulator = Self::new();
        for (run, evaluated, eligible) in runs {
            accumulator.record(run, evaluated, eligible);
        }
        accumulator
    }

    pub fn tally(&self, kind: LifetimeKind) -> &LifetimeTally {
        match kind {
            LifetimeKind::Lifetime => &self.lifetime,
            LifetimeKind::Placement => &self.placement,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lifetime.is_empty() && self.placement.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringOptions;
    use crate::scoring::domain::QStatus;
    use crate::scoring::evaluator::RunEvaluator;
    use crate::scoring::rules::{LifetimePoints, PlaceValue, ScoringRule, ScoringStyle};
    use chrono::NaiveDate;

    fn rule() -> ScoringRule {
        let mut rule = ScoringRule::new(ScoringStyle::FaultsThenTime);
        rule.lifetime_points = vec![LifetimePoints {
            faults: 0.0,
            points: 10.0,
            use_speed_points: false,
        }];
        rule.placement_points = vec![PlaceValue {
            place: 1,
            value: 4.0,
        }];
        rule
    }

    fn run(level: &str, q: QStatus) -> Run {
        let date = NaiveDate::from_ymd_opt(2024, 8, 3).expect("valid date");
        let mut run = Run::new(date, "Standard", level, "Jumpers");
        run.scoring.time = 30.0;
        run.scoring.sct = 40.0;
        run.place = 1;
        run.q = q;
        run
    }

    #[test]
    fn levels_get_separate_buckets_that_roll_up() {
        let rule = rule();
        let evaluator = RunEvaluator::new(ScoringOptions::default());
        let novice = run("Novice", QStatus::Qualified);
        let open = run("Open", QStatus::Qualified);
        let novice_eval = evaluator.evaluate(&novice, Some(&rule));
        let open_eval = evaluator.evaluate(&open, Some(&rule));

        let acc = LifetimePointAccumulator::accumulate([
            (&novice, &novice_eval, true),
            (&open, &open_eval, false),
        ]);

        let buckets = acc.lifetime.buckets();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].level, "Novice");
        assert_eq!(buckets[1].level, "Open");

        let divisions = acc.lifetime.division_totals();
        assert_eq!(divisions.len(), 1);
        assert_eq!(
            divisions[0].total,
            buckets.iter().map(LifetimeBucket::total).sum::<f64>()
        );
        assert_eq!(divisions[0].filtered, 10.0);
        assert_eq!(divisions[0].counted(), 10.0);
        assert_eq!(acc.placement.total(), 8.0);
        assert_eq!(acc.placement.filtered(), 4.0);
    }

    #[test]
    fn not_applicable_runs_never_enter_a_bucket() {
        let rule = rule();
        let evaluator = RunEvaluator::new(ScoringOptions::default());
        let na = run("Novice", QStatus::NotApplicable);
        let evaluated = evaluator.evaluate(&na, Some(&rule));
        for eligible in [true, false] {
            let acc = LifetimePointAccumulator::accumulate([(&na, &evaluated, eligible)]);
            assert!(acc.is_empty());
        }
    }

    #[test]
    fn existing_points_count_unfiltered_and_group_by_event() {
        let mut acc = LifetimePointAccumulator::new();
        acc.add_existing("Standard", "Novice", "Jumpers", 25.0);
        acc.lifetime.add("Standard", "Open", "Jumpers", 5.0, true);
        acc.lifetime.add("Standard", "Open", "Gamblers", 3.0, false);

        assert_eq!(acc.lifetime.total(), 33.0);
        assert_eq!(acc.lifetime.counted(), 28.0);
        let events = acc.lifetime.event_totals();
        assert_eq!(events[0].name, "Jumpers");
        assert_eq!(events[0].total, 30.0);
        assert_eq!(events[0].filtered, 5.0);
        assert_eq!(events[1].name, "Gamblers");
    }

    #[test]
    fn accumulation_is_repeatable() {
        let rule = rule();
        let evaluator = RunEvaluator::new(ScoringOptions::default());
        let novice = run("Novice", QStatus::Qualified);
        let evaluated = evaluator.evaluate(&novice, Some(&rule));
        let first = LifetimePointAccumulator::accumulate([(&novice, &evaluated, true)]);
        let second = LifetimePointAccumulator::accumulate([(&novice, &evaluated, true)]);
        assert_eq!(first, second);
    }
}
