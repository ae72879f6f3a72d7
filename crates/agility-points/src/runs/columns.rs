use serde::{Deserialize, Serialize};

use super::RunRow;
use crate::scoring::domain::QStatus;
use crate::scoring::rules::ScoringType;

/// Data columns of the runs list, in their default order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunColumn {
    RegName,
    CallName,
    Date,
    Venue,
    Club,
    Location,
    TrialNotes,
    Division,
    Level,
    Event,
    Height,
    Judge,
    Handler,
    Conditions,
    CourseFaults,
    Time,
    Yards,
    MinYps,
    Yps,
    Obstacles,
    Ops,
    Sct,
    TotalFaults,
    ReqOpening,
    ReqClosing,
    Opening,
    Closing,
    ReqPoints,
    Points,
    Place,
    InClass,
    DogsQd,
    Q,
    Score,
    TitlePoints,
    Comments,
    Faults,
    Speed,
}

impl RunColumn {
    pub const fn ordered() -> [Self; 38] {
        [
            Self::RegName,
            Self::CallName,
            Self::Date,
            Self::Venue,
            Self::Club,
            Self::Location,
            Self::TrialNotes,
            Self::Division,
            Self::Level,
            Self::Event,
            Self::Height,
            Self::Judge,
            Self::Handler,
            Self::Conditions,
            Self::CourseFaults,
            Self::Time,
            Self::Yards,
            Self::MinYps,
            Self::Yps,
            Self::Obstacles,
            Self::Ops,
            Self::Sct,
            Self::TotalFaults,
            Self::ReqOpening,
            Self::ReqClosing,
            Self::Opening,
            Self::Closing,
            Self::ReqPoints,
            Self::Points,
            Self::Place,
            Self::InClass,
            Self::DogsQd,
            Self::Q,
            Self::Score,
            Self::TitlePoints,
            Self::Comments,
            Self::Faults,
            Self::Speed,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::RegName => "Registered Name",
            Self::CallName => "Call Name",
            Self::Date => "Date",
            Self::Venue => "Venue",
            Self::Club => "Club",
            Self::Location => "Location",
            Self::TrialNotes => "Trial Notes",
            Self::Division => "Division",
            Self::Level => "Level",
            Self::Event => "Event",
            Self::Height => "Height",
            Self::Judge => "Judge",
            Self::Handler => "Handler",
            Self::Conditions => "Conditions",
            Self::CourseFaults => "Course Faults",
            Self::Time => "Time",
            Self::Yards => "Yards",
            Self::MinYps => "Min YPS",
            Self::Yps => "YPS",
            Self::Obstacles => "Obstacles",
            Self::Ops => "OPS",
            Self::Sct => "SCT",
            Self::TotalFaults => "Total Faults",
            Self::ReqOpening => "Opening Pts Required",
            Self::ReqClosing => "Closing Pts Required",
            Self::Opening => "Opening Pts",
            Self::Closing => "Closing Pts",
            Self::ReqPoints => "Points Required",
            Self::Points => "Points",
            Self::Place => "Place",
            Self::InClass => "In Class",
            Self::DogsQd => "Dogs Q'd",
            Self::Q => "Q",
            Self::Score => "Score",
            Self::TitlePoints => "Title Pts",
            Self::Comments => "Comments",
            Self::Faults => "Faults",
            Self::Speed => "Speed Pts",
        }
    }

    /// Accepts the snake_case key or the display label, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        let wanted = value.trim();
        Self::ordered().into_iter().find(|column| {
            column.key().eq_ignore_ascii_case(wanted) || column.label().eq_ignore_ascii_case(wanted)
        })
    }

    /// Stable key; the same string the column serializes as.
    pub const fn key(self) -> &'static str {
        match self {
            Self::RegName => "reg_name",
            Self::CallName => "call_name",
            Self::Date => "date",
            Self::Venue => "venue",
            Self::Club => "club",
            Self::Location => "location",
            Self::TrialNotes => "trial_notes",
            Self::Division => "division",
            Self::Level => "level",
            Self::Event => "event",
            Self::Height => "height",
            Self::Judge => "judge",
            Self::Handler => "handler",
            Self::Conditions => "conditions",
            Self::CourseFaults => "course_faults",
            Self::Time => "time",
            Self::Yards => "yards",
            Self::MinYps => "min_yps",
            Self::Yps => "yps",
            Self::Obstacles => "obstacles",
            Self::Ops => "ops",
            Self::Sct => "sct",
            Self::TotalFaults => "total_faults",
            Self::ReqOpening => "req_opening",
            Self::ReqClosing => "req_closing",
            Self::Opening => "opening",
            Self::Closing => "closing",
            Self::ReqPoints => "req_points",
            Self::Points => "points",
            Self::Place => "place",
            Self::InClass => "in_class",
            Self::DogsQd => "dogs_qd",
            Self::Q => "q",
            Self::Score => "score",
            Self::TitlePoints => "title_points",
            Self::Comments => "comments",
            Self::Faults => "faults",
            Self::Speed => "speed",
        }
    }
}

/// Present only for runs scored under `kind`.
fn when_type(row: &RunRow<'_>, kind: ScoringType, value: f64) -> Option<f64> {
    (row.evaluated.scoring_type == Some(kind)).then_some(value)
}

fn required_when(row: &RunRow<'_>, kind: ScoringType, value: Option<f64>) -> Option<f64> {
    value.filter(|_| row.evaluated.scoring_type == Some(kind))
}

impl RunRow<'_> {
    /// Numeric value for columns that are not always applicable.
    pub(crate) fn optional_value(&self, column: RunColumn) -> Option<f64> {
        let scoring = &self.run.scoring;
        let by_time = self.evaluated.scoring_type == Some(ScoringType::ByTime);
        match column {
            RunColumn::Yards => (by_time && scoring.yards > 0.0).then_some(scoring.yards),
            RunColumn::MinYps => self.evaluated.min_yps.map(|rate| rate.value),
            RunColumn::Yps => self.evaluated.yps.map(|rate| rate.value),
            RunColumn::Ops => self.evaluated.ops.map(|rate| rate.value),
            RunColumn::Sct => (by_time && scoring.sct > 0.0).then_some(scoring.sct),
            RunColumn::TotalFaults => self.evaluated.total_faults.filter(|_| by_time),
            RunColumn::ReqOpening => required_when(
                self,
                ScoringType::ByOpenClose,
                self.evaluated.required_open_points,
            ),
            RunColumn::ReqClosing => required_when(
                self,
                ScoringType::ByOpenClose,
                self.evaluated.required_close_points,
            ),
            RunColumn::Opening => when_type(self, ScoringType::ByOpenClose, scoring.open_points),
            RunColumn::Closing => when_type(self, ScoringType::ByOpenClose, scoring.close_points),
            RunColumn::ReqPoints => {
                required_when(self, ScoringType::ByPoints, self.evaluated.required_open_points)
            }
            RunColumn::Points => when_type(self, ScoringType::ByPoints, scoring.open_points),
            RunColumn::Score => {
                let shown = self.run.q.qualified() || self.run.q == QStatus::NotQualified;
                self.evaluated.score.filter(|_| shown)
            }
            RunColumn::Speed => self.evaluated.speed_points.map(f64::from),
            _ => None,
        }
    }

    pub fn text(&self, column: RunColumn) -> String {
        let run = self.run;
        let scoring = &run.scoring;
        match column {
            RunColumn::RegName => self.dog.registered_name.clone(),
            RunColumn::CallName => self.dog.call_name.clone(),
            RunColumn::Date => run.date.format("%Y-%m-%d").to_string(),
            RunColumn::Venue => self.trial.venue_names(),
            RunColumn::Club => self.trial.club_names(),
            RunColumn::Location => self.trial.location.clone(),
            RunColumn::TrialNotes => self.trial.notes.replace('\n', " "),
            RunColumn::Division => run.division.clone(),
            RunColumn::Level => run.level.clone(),
            RunColumn::Event => run.event.clone(),
            RunColumn::Height => run.height.clone(),
            RunColumn::Judge => run.judge.clone(),
            RunColumn::Handler => run.handler.clone(),
            RunColumn::Conditions => run.conditions.clone(),
            RunColumn::CourseFaults => scoring.course_faults.to_string(),
            RunColumn::Time => scoring.time.to_string(),
            RunColumn::Yards => self
                .optional_value(column)
                .map(|yards| format!("{yards:.0}"))
                .unwrap_or_default(),
            RunColumn::MinYps => rate_text(self.evaluated.min_yps),
            RunColumn::Yps => rate_text(self.evaluated.yps),
            RunColumn::Ops => rate_text(self.evaluated.ops),
            RunColumn::Obstacles if scoring.obstacles > 0 => scoring.obstacles.to_string(),
            RunColumn::Obstacles => String::new(),
            RunColumn::TotalFaults => self
                .optional_value(column)
                .map(|faults| format!("{faults:.0}"))
                .unwrap_or_default(),
            RunColumn::Place => match run.place {
                place if place < 0 => "?".to_string(),
                0 => "-".to_string(),
                place => place.to_string(),
            },
            RunColumn::InClass if run.in_class <= 0 => "?".to_string(),
            RunColumn::InClass => run.in_class.to_string(),
            RunColumn::DogsQd if run.dogs_qd < 0 => "?".to_string(),
            RunColumn::DogsQd => run.dogs_qd.to_string(),
            RunColumn::Q => self.q_text(),
            RunColumn::TitlePoints => self.evaluated.title_points.unwrap_or(0.0).to_string(),
            RunColumn::Comments => run.comments.replace('\n', " "),
            RunColumn::Faults => run.faults.join(", "),
            RunColumn::Sct
            | RunColumn::ReqOpening
            | RunColumn::ReqClosing
            | RunColumn::Opening
            | RunColumn::Closing
            | RunColumn::ReqPoints
            | RunColumn::Points
            | RunColumn::Score
            | RunColumn::Speed => self
                .optional_value(column)
                .map(|value| value.to_string())
                .unwrap_or_default(),
        }
    }

    /// Q label, replaced by the run's multi-Q short names when it earned any.
    fn q_text(&self) -> String {
        let q = self.run.q;
        if !q.qualified() {
            return q.label().to_string();
        }
        let mut names: Vec<&str> = self
            .multi_qs
            .iter()
            .map(|definition| definition.short_name.as_str())
            .collect();
        if q == QStatus::SuperQ {
            names.push(q.label());
        }
        if names.is_empty() {
            q.label().to_string()
        } else {
            names.join("/")
        }
    }
}

fn rate_text(rate: Option<crate::scoring::Rate>) -> String {
    rate.map(|rate| rate.display()).unwrap_or_default()
}
