use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Recorded qualifying outcome of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QStatus {
    NotApplicable,
    #[default]
    Unknown,
    Eliminated,
    DidNotRun,
    NotQualified,
    Qualified,
    SuperQ,
}

impl QStatus {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::NotApplicable,
            Self::Unknown,
            Self::Eliminated,
            Self::DidNotRun,
            Self::NotQualified,
            Self::Qualified,
            Self::SuperQ,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NotApplicable => "NA",
            Self::Unknown => "?",
            Self::Eliminated => "E",
            Self::DidNotRun => "DNR",
            Self::NotQualified => "NQ",
            Self::Qualified => "Q",
            Self::SuperQ => "SQ",
        }
    }

    pub const fn qualified(self) -> bool {
        matches!(self, Self::Qualified | Self::SuperQ)
    }

    /// Not-applicable runs never enter any tally.
    pub const fn allows_tally(self) -> bool {
        !matches!(self, Self::NotApplicable)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Club {
    pub name: String,
    pub venue: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub handler: String,
    pub dog: String,
    #[serde(default)]
    pub registration: String,
}

impl Partner {
    /// Identity used when counting distinct partners.
    pub fn key(&self) -> String {
        format!("{}{}", self.dog, self.registration)
    }
}

/// Raw timing and point fields as entered for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunScoring {
    pub course_faults: f64,
    pub time: f64,
    pub sct: f64,
    /// Closing time on open/close events, added to `sct` for time faults.
    pub sct2: f64,
    pub yards: f64,
    pub obstacles: u16,
    pub table: bool,
    pub need_open_points: f64,
    pub need_close_points: f64,
    pub open_points: f64,
    pub close_points: f64,
    pub bonus_title_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherPointsAward {
    pub name: String,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub date: NaiveDate,
    /// Club the run was entered under; the trial's primary club when absent.
    #[serde(default)]
    pub club: Option<String>,
    pub division: String,
    pub level: String,
    pub event: String,
    #[serde(default)]
    pub sub_name: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub judge: String,
    #[serde(default)]
    pub handler: String,
    #[serde(default)]
    pub conditions: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub partners: Vec<Partner>,
    /// Free-form fault notes, e.g. "Knocked bar".
    #[serde(default)]
    pub faults: Vec<String>,
    #[serde(default)]
    pub scoring: RunScoring,
    #[serde(default)]
    pub q: QStatus,
    #[serde(default)]
    pub place: i16,
    #[serde(default)]
    pub in_class: i16,
    #[serde(default)]
    pub dogs_qd: i16,
    #[serde(default)]
    pub other_points: Vec<OtherPointsAward>,
}

impl Run {
    /// A run with no scoring data and an unknown Q status.
    pub fn new(
        date: NaiveDate,
        division: impl Into<String>,
        level: impl Into<String>,
        event: impl Into<String>,
    ) -> Self {
        Self {
            date,
            club: None,
            division: division.into(),
            level: level.into(),
            event: event.into(),
            sub_name: String::new(),
            height: String::new(),
            judge: String::new(),
            handler: String::new(),
            conditions: String::new(),
            comments: String::new(),
            partners: Vec::new(),
            faults: Vec::new(),
            scoring: RunScoring::default(),
            q: QStatus::Unknown,
            place: 0,
            in_class: 0,
            dogs_qd: 0,
            other_points: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub notes: String,
    pub clubs: Vec<Club>,
    #[serde(default)]
    pub runs: Vec<Run>,
}

impl Trial {
    pub fn primary_club(&self) -> Option<&Club> {
        self.clubs.first()
    }

    pub fn has_venue(&self, venue: &str) -> bool {
        self.clubs.iter().any(|club| club.venue == venue)
    }

    /// The club a run counts under, falling back to the primary club.
    pub fn club_for(&self, run: &Run) -> Option<&Club> {
        run.club
            .as_deref()
            .and_then(|name| self.clubs.iter().find(|club| club.name == name))
            .or_else(|| self.primary_club())
    }

    /// Earliest and latest run dates; `None` for a trial without runs.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.runs.iter().map(|run| run.date).min()?;
        let end = self.runs.iter().map(|run| run.date).max()?;
        Some((start, end))
    }

    pub fn venue_names(&self) -> String {
        self.clubs
            .iter()
            .map(|club| club.venue.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn club_names(&self) -> String {
        self.clubs
            .iter()
            .map(|club| club.name.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub venue: String,
    pub name: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub received: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationNumber {
    pub venue: String,
    pub number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistingPointKind {
    OtherPoints,
    Lifetime,
    Title,
    Speed,
    MultiQ,
    SuperQ,
}

impl ExistingPointKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::OtherPoints => "Other Points",
            Self::Lifetime => "Lifetime",
            Self::Title => "Title",
            Self::Speed => "Speed",
            Self::MultiQ => "Multi-Q",
            Self::SuperQ => "SuperQ",
        }
    }
}

/// Points entered by hand for runs that are not recorded individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingPoints {
    pub kind: ExistingPointKind,
    pub date: NaiveDate,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub multi_q: String,
    #[serde(default)]
    pub division: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub other_points: String,
    pub points: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    #[default]
    NotEntered,
    Planning,
    Pending,
    Entered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub venue: String,
    #[serde(default)]
    pub club: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: EntryStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingEntry {
    pub date: NaiveDate,
    pub name: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dog {
    pub call_name: String,
    #[serde(default)]
    pub registered_name: String,
    #[serde(default)]
    pub registration_numbers: Vec<RegistrationNumber>,
    #[serde(default)]
    pub titles: Vec<Title>,
    #[serde(default)]
    pub existing_points: Vec<ExistingPoints>,
    #[serde(default)]
    pub trials: Vec<Trial>,
}

impl Dog {
    pub fn registration_for(&self, venue: &str) -> Option<&str> {
        self.registration_numbers
            .iter()
            .find(|reg| reg.venue == venue)
            .map(|reg| reg.number.as_str())
    }

    /// True when any non-other-points entry was imported for the venue.
    pub fn has_existing_points(&self, venue: &str) -> bool {
        self.existing_points
            .iter()
            .any(|pts| pts.kind != ExistingPointKind::OtherPoints && pts.venue == venue)
    }
}
