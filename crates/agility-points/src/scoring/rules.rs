use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::RunScoring;

/// Matches any division or level in a scoring rule.
pub const WILDCARD: &str = "*";

fn wildcard() -> String {
    WILDCARD.to_string()
}

fn unit_multiplier() -> f64 {
    1.0
}

/// How results are ranked for an event, which also fixes its scoring type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStyle {
    FaultsThenTime,
    Faults100ThenTime,
    Faults200ThenTime,
    OpenCloseThenTime,
    ScoreThenTime,
    TimePlusFaults,
    TimeNoPlaces,
    PassFail,
}

impl ScoringStyle {
    pub const fn scoring_type(self) -> ScoringType {
        match self {
            Self::FaultsThenTime
            | Self::Faults100ThenTime
            | Self::Faults200ThenTime
            | Self::TimePlusFaults => ScoringType::ByTime,
            Self::OpenCloseThenTime => ScoringType::ByOpenClose,
            Self::ScoreThenTime => ScoringType::ByPoints,
            Self::TimeNoPlaces => ScoringType::BySpeed,
            Self::PassFail => ScoringType::ByPass,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FaultsThenTime => "Faults Then Time",
            Self::Faults100ThenTime => "100 Minus Faults Then Time",
            Self::Faults200ThenTime => "200 Minus Faults Then Time",
            Self::OpenCloseThenTime => "Opening/Closing Points Then Time",
            Self::ScoreThenTime => "Points Then Time",
            Self::TimePlusFaults => "Time Plus Faults",
            Self::TimeNoPlaces => "Time (No Placements)",
            Self::PassFail => "Pass/Fail",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringType {
    ByTime,
    ByOpenClose,
    ByPoints,
    BySpeed,
    ByPass,
}

impl ScoringType {
    /// Types that accrue time faults against a course time.
    pub const fn has_time_faults(self) -> bool {
        matches!(self, Self::ByTime | Self::ByOpenClose | Self::ByPoints)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TitlePoints {
    pub faults: f64,
    pub points: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifetimePoints {
    pub faults: f64,
    #[serde(default)]
    pub points: f64,
    /// Award the run's speed points instead of a fixed amount.
    #[serde(default)]
    pub use_speed_points: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaceValue {
    pub place: i16,
    pub value: f64,
}

/// Date-bounded scoring configuration for one event in a division/level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRule {
    #[serde(default = "wildcard")]
    pub division: String,
    #[serde(default = "wildcard")]
    pub level: String,
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
    pub style: ScoringStyle,
    #[serde(default)]
    pub drop_fractions: bool,
    #[serde(default)]
    pub qs_must_be_clean: bool,
    #[serde(default)]
    pub time_faults_under: bool,
    #[serde(default)]
    pub time_faults_over: bool,
    #[serde(default)]
    pub titling_points_raw_faults: bool,
    #[serde(default)]
    pub subtract_time_faults: bool,
    #[serde(default = "unit_multiplier")]
    pub time_fault_multiplier: f64,
    #[serde(default)]
    pub required_open_points: f64,
    #[serde(default)]
    pub required_close_points: f64,
    #[serde(default)]
    pub super_q: bool,
    #[serde(default)]
    pub speed_points: bool,
    #[serde(default)]
    pub bonus_title_points: bool,
    #[serde(default)]
    pub place_multipliers: Vec<PlaceValue>,
    #[serde(default)]
    pub title_points: Vec<TitlePoints>,
    #[serde(default)]
    pub lifetime_points: Vec<LifetimePoints>,
    #[serde(default)]
    pub placement_points: Vec<PlaceValue>,
}

impl ScoringRule {
    /// A wildcard rule with no optional behavior enabled.
    pub fn new(style: ScoringStyle) -> Self {
        Self {
            division: wildcard(),
            level: wildcard(),
            valid_from: None,
            valid_to: None,
            style,
            drop_fractions: false,
            qs_must_be_clean: false,
            time_faults_under: false,
            time_faults_over: false,
            titling_points_raw_faults: false,
            subtract_time_faults: false,
            time_fault_multiplier: 1.0,
            required_open_points: 0.0,
            required_close_points: 0.0,
            super_q: false,
            speed_points: false,
            bonus_title_points: false,
            place_multipliers: Vec::new(),
            title_points: Vec::new(),
            lifetime_points: Vec::new(),
            placement_points: Vec::new(),
        }
    }

    pub fn scoring_type(&self) -> ScoringType {
        self.style.scoring_type()
    }

    /// Opening and closing points a run must reach. A run that recorded no
    /// requirement falls back to the rule's defaults.
    pub fn required_points(&self, scoring: &RunScoring) -> (f64, f64) {
        let pick = |recorded: f64, default: f64| if recorded > 0.0 { recorded } else { default };
        (
            pick(scoring.need_open_points, self.required_open_points),
            pick(scoring.need_close_points, self.required_close_points),
        )
    }

    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.valid_from.map_or(true, |from| from <= date)
            && self.valid_to.map_or(true, |to| date <= to)
    }

    /// Rules without title or lifetime tables never appear in the points report.
    pub fn carries_points(&self) -> bool {
        !self.title_points.is_empty() || !self.lifetime_points.is_empty()
    }

    pub fn carries_lifetime(&self) -> bool {
        !self.lifetime_points.is_empty()
    }

    pub fn carries_placement(&self) -> bool {
        !self.placement_points.is_empty()
    }

    pub fn effective_time_fault_multiplier(&self) -> f64 {
        if self.time_fault_multiplier > 0.0 {
            self.time_fault_multiplier
        } else {
            1.0
        }
    }

    /// Points for the tightest fault threshold the score fits under.
    pub fn title_points_for(&self, faults: f64) -> f64 {
        self.title_points
            .iter()
            .filter(|entry| faults <= entry.faults)
            .min_by(|a, b| a.faults.total_cmp(&b.faults))
            .map_or(0.0, |entry| entry.points)
    }

    pub fn lifetime_points_for(&self, faults: f64, speed_points: Option<i32>) -> f64 {
        self.lifetime_points
            .iter()
            .filter(|entry| faults <= entry.faults)
            .min_by(|a, b| a.faults.total_cmp(&b.faults))
            .map_or(0.0, |entry| {
                if entry.use_speed_points {
                    f64::from(speed_points.unwrap_or(0))
                } else {
                    entry.points
                }
            })
    }

    pub fn place_multiplier(&self, place: i16) -> Option<f64> {
        lookup_place(&self.place_multipliers, place)
    }

    pub fn placement_points_for(&self, place: i16) -> f64 {
        lookup_place(&self.placement_points, place).unwrap_or(0.0)
    }

    pub(crate) fn division_matches(&self, division: &str) -> bool {
        self.division == division || self.division == WILDCARD
    }

    pub(crate) fn level_matches(&self, level: &str) -> bool {
        self.level == level || self.level == WILDCARD
    }
}

fn lookup_place(values: &[PlaceValue], place: i16) -> Option<f64> {
    values
        .iter()
        .find(|entry| entry.place == place)
        .map(|entry| entry.value)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub name: String,
    #[serde(default)]
    pub sub_levels: Vec<String>,
}

impl LevelConfig {
    /// True for the level itself or one of its sub-levels.
    pub fn contains(&self, level: &str) -> bool {
        self.name == level || self.sub_levels.iter().any(|sub| sub == level)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionConfig {
    pub name: String,
    #[serde(default)]
    pub levels: Vec<LevelConfig>,
}

impl DivisionConfig {
    /// Translates a recorded level (possibly a sub-level) to its configured level.
    pub fn level_for(&self, level: &str) -> Option<&LevelConfig> {
        self.levels.iter().find(|config| config.contains(level))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    pub name: String,
    #[serde(default)]
    pub has_partner: bool,
    #[serde(default)]
    pub rules: Vec<ScoringRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiQItem {
    pub division: String,
    pub level: String,
    pub event: String,
}

/// Classes that must all be qualified on one date to earn a multi-Q.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiQDefinition {
    pub name: String,
    pub short_name: String,
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
    pub items: Vec<MultiQItem>,
}

impl MultiQDefinition {
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.valid_from.map_or(true, |from| from <= date)
            && self.valid_to.map_or(true, |to| date <= to)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueConfig {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub lifetime_name: Option<String>,
    #[serde(default)]
    pub divisions: Vec<DivisionConfig>,
    #[serde(default)]
    pub events: Vec<EventConfig>,
    #[serde(default)]
    pub multi_qs: Vec<MultiQDefinition>,
}

impl VenueConfig {
    pub fn division(&self, name: &str) -> Option<&DivisionConfig> {
        self.divisions.iter().find(|division| division.name == name)
    }

    pub fn event(&self, name: &str) -> Option<&EventConfig> {
        self.events.iter().find(|event| event.name == name)
    }

    /// True when `recorded` is `level` or one of its sub-levels in `division`.
    pub fn level_matches(&self, division: &str, level: &str, recorded: &str) -> bool {
        if level == recorded {
            return true;
        }
        self.division(division)
            .and_then(|config| config.levels.iter().find(|config| config.name == level))
            .is_some_and(|config| config.contains(recorded))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtherPointsTally {
    #[default]
    All,
    AllByEvent,
    Level,
    LevelByEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherPointsConfig {
    pub name: String,
    #[serde(default)]
    pub tally: OtherPointsTally,
}

/// Read-only venue and other-points configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub venues: Vec<VenueConfig>,
    #[serde(default)]
    pub other_points: Vec<OtherPointsConfig>,
}

impl Configuration {
    pub fn venue(&self, name: &str) -> Option<&VenueConfig> {
        self.venues.iter().find(|venue| venue.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiered_rule() -> ScoringRule {
        let mut rule = ScoringRule::new(ScoringStyle::FaultsThenTime);
        rule.title_points = vec![
            TitlePoints {
                faults: 5.0,
                points: 5.0,
            },
            TitlePoints {
                faults: 0.0,
                points: 10.0,
            },
        ];
        rule
    }

    #[test]
    fn title_points_use_tightest_threshold_regardless_of_order() {
        let rule = tiered_rule();
        assert_eq!(rule.title_points_for(0.0), 10.0);
        assert_eq!(rule.title_points_for(3.0), 5.0);
        assert_eq!(rule.title_points_for(5.0), 5.0);
        assert_eq!(rule.title_points_for(5.5), 0.0);
    }

    #[test]
    fn validity_bounds_are_inclusive() {
        let mut rule = tiered_rule();
        rule.valid_from = NaiveDate::from_ymd_opt(2020, 1, 1);
        rule.valid_to = NaiveDate::from_ymd_opt(2020, 12, 31);
        let first = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date");
        let last = NaiveDate::from_ymd_opt(2020, 12, 31).expect("valid date");
        let after = NaiveDate::from_ymd_opt(2021, 1, 1).expect("valid date");
        assert!(rule.is_valid_on(first));
        assert!(rule.is_valid_on(last));
        assert!(!rule.is_valid_on(after));
    }

    #[test]
    fn non_positive_multiplier_means_one() {
        let mut rule = tiered_rule();
        rule.time_fault_multiplier = -1.0;
        assert_eq!(rule.effective_time_fault_multiplier(), 1.0);
        rule.time_fault_multiplier = 2.0;
        assert_eq!(rule.effective_time_fault_multiplier(), 2.0);
    }

    #[test]
    fn lifetime_entry_can_defer_to_speed_points() {
        let mut rule = tiered_rule();
        rule.lifetime_points = vec![LifetimePoints {
            faults: 0.0,
            points: 0.0,
            use_speed_points: true,
        }];
        assert_eq!(rule.lifetime_points_for(0.0, Some(7)), 7.0);
        assert_eq!(rule.lifetime_points_for(1.0, Some(7)), 0.0);
    }

    #[test]
    fn sub_levels_resolve_to_parent_level() {
        let venue = VenueConfig {
            name: "NADAC".to_string(),
            url: None,
            lifetime_name: None,
            divisions: vec![DivisionConfig {
                name: "Standard".to_string(),
                levels: vec![LevelConfig {
                    name: "Novice".to_string(),
                    sub_levels: vec!["Novice A".to_string(), "Novice B".to_string()],
                }],
            }],
            events: Vec::new(),
            multi_qs: Vec::new(),
        };

        let division = venue.division("Standard").expect("division configured");
        assert_eq!(
            division.level_for("Novice B").map(|level| level.name.as_str()),
            Some("Novice")
        );
        assert!(venue.level_matches("Standard", "Novice", "Novice A"));
        assert!(!venue.level_matches("Standard", "Novice", "Elite"));
    }
}
