use chrono::NaiveDate;
use tracing::trace;

use super::domain::{Run, Trial};
use super::rules::{Configuration, EventConfig, ScoringRule, VenueConfig, WILDCARD};

/// Looks up the scoring rule that governs a run.
#[derive(Debug, Clone, Copy)]
pub struct ScoringResolver<'a> {
    config: &'a Configuration,
}

impl<'a> ScoringResolver<'a> {
    pub fn new(config: &'a Configuration) -> Self {
        Self { config }
    }

    pub fn configuration(&self) -> &'a Configuration {
        self.config
    }

    pub fn venue(&self, name: &str) -> Option<&'a VenueConfig> {
        self.config.venue(name)
    }

    pub fn event(&self, venue: &str, event: &str) -> Option<&'a EventConfig> {
        self.venue(venue)?.event(event)
    }

    /// The most specific rule valid on `date`, or `None` when the run cannot
    /// be scored.
    pub fn resolve(
        &self,
        venue: &str,
        event: &str,
        division: &str,
        level: &str,
        date: NaiveDate,
    ) -> Option<&'a ScoringRule> {
        let venue = self.venue(venue)?;
        let parent_level = venue.division(division)?.level_for(level)?;
        let event = venue.event(event)?;

        event
            .rules
            .iter()
            .filter(|rule| rule.is_valid_on(date))
            .filter(|rule| rule.division_matches(division))
            .filter(|rule| rule.level_matches(&parent_level.name))
            .min_by_key(|rule| (specificity(rule), std::cmp::Reverse(rule.valid_from)))
    }

    /// Resolves through the club the run was entered under.
    pub fn resolve_run(&self, trial: &Trial, run: &Run) -> Option<&'a ScoringRule> {
        let Some(club) = trial.club_for(run) else {
            trace!(event = %run.event, date = %run.date, "trial has no club");
            return None;
        };
        let rule = self.resolve(&club.venue, &run.event, &run.division, &run.level, run.date);
        if rule.is_none() {
            trace!(
                venue = %club.venue,
                event = %run.event,
                division = %run.division,
                level = %run.level,
                date = %run.date,
                "no scoring rule for run"
            );
        }
        rule
    }

    /// Every rule configured for an event in a division/level, regardless of
    /// date. With `points_only`, rules without title or lifetime tables are
    /// skipped.
    pub fn rules_for(
        &self,
        venue: &str,
        event: &str,
        division: &str,
        level: &str,
        points_only: bool,
    ) -> Vec<&'a ScoringRule> {
        let Some(event) = self.event(venue, event) else {
            return Vec::new();
        };
        event
            .rules
            .iter()
            .filter(|rule| rule.division_matches(division) && rule.level_matches(level))
            .filter(|rule| !points_only || rule.carries_points())
            .collect()
    }
}

/// Lower ranks are more specific.
fn specificity(rule: &ScoringRule) -> u8 {
    match (rule.division == WILDCARD, rule.level == WILDCARD) {
        (false, false) => 0,
        (false, true) => 1,
        (true, false) => 2,
        (true, true) => 3,
    }
}

/// Identity comparison used when grouping runs by the rule that scored them.
pub fn same_rule(a: &ScoringRule, b: &ScoringRule) -> bool {
    std::ptr::eq(a, b)
}
