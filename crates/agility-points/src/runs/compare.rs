use std::cmp::Ordering;

use super::{RunColumn, RunRow};
use crate::scoring::domain::QStatus;

/// Sort keys a column compares by.
enum SortKey {
    Text(String),
    Number(f64),
    /// Absent values always sort after present ones.
    Optional(Option<f64>),
    /// Non-positive places sort after real placements when ascending.
    Place(i16),
}

fn q_rank(q: QStatus) -> f64 {
    QStatus::ordered()
        .iter()
        .position(|status| *status == q)
        .map_or(0.0, |index| index as f64)
}

fn sort_key(row: &RunRow<'_>, column: RunColumn) -> SortKey {
    let run = row.run;
    let scoring = &run.scoring;
    match column {
        RunColumn::Date => SortKey::Text(run.date.format("%Y-%m-%d").to_string()),
        RunColumn::CourseFaults => SortKey::Number(scoring.course_faults),
        RunColumn::Time => SortKey::Number(scoring.time),
        RunColumn::Obstacles => SortKey::Number(f64::from(scoring.obstacles)),
        RunColumn::InClass => SortKey::Number(f64::from(run.in_class)),
        RunColumn::DogsQd => SortKey::Number(f64::from(run.dogs_qd)),
        RunColumn::Q => SortKey::Number(q_rank(run.q)),
        RunColumn::TitlePoints => SortKey::Number(row.evaluated.title_points.unwrap_or(0.0)),
        RunColumn::Place => SortKey::Place(run.place),
        RunColumn::Yards
        | RunColumn::MinYps
        | RunColumn::Yps
        | RunColumn::Ops
        | RunColumn::Sct
        | RunColumn::TotalFaults
        | RunColumn::ReqOpening
        | RunColumn::ReqClosing
        | RunColumn::Opening
        | RunColumn::Closing
        | RunColumn::ReqPoints
        | RunColumn::Points
        | RunColumn::Score
        | RunColumn::Speed => SortKey::Optional(row.optional_value(column)),
        RunColumn::RegName
        | RunColumn::CallName
        | RunColumn::Venue
        | RunColumn::Club
        | RunColumn::Location
        | RunColumn::TrialNotes
        | RunColumn::Division
        | RunColumn::Level
        | RunColumn::Event
        | RunColumn::Height
        | RunColumn::Judge
        | RunColumn::Handler
        | RunColumn::Conditions
        | RunColumn::Comments
        | RunColumn::Faults => SortKey::Text(row.text(column).to_lowercase()),
    }
}

fn directed(ordering: Ordering, descending: bool) -> Ordering {
    if descending {
        ordering.reverse()
    } else {
        ordering
    }
}

/// Orders runs by one display column.
///
/// Display index 0 is the icon column and never reorders anything, so data
/// columns are looked up at `index - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunComparator {
    column: Option<RunColumn>,
    descending: bool,
}

impl RunComparator {
    pub fn new(columns: &[RunColumn], display_index: usize, descending: bool) -> Self {
        let column = display_index
            .checked_sub(1)
            .and_then(|index| columns.get(index).copied());
        Self { column, descending }
    }

    pub fn for_column(column: RunColumn, descending: bool) -> Self {
        Self {
            column: Some(column),
            descending,
        }
    }

    pub fn column(&self) -> Option<RunColumn> {
        self.column
    }

    pub fn compare(&self, a: &RunRow<'_>, b: &RunRow<'_>) -> Ordering {
        let Some(column) = self.column else {
            return Ordering::Equal;
        };
        match (sort_key(a, column), sort_key(b, column)) {
            (SortKey::Text(a), SortKey::Text(b)) => directed(a.cmp(&b), self.descending),
            (SortKey::Number(a), SortKey::Number(b)) => {
                directed(a.total_cmp(&b), self.descending)
            }
            (SortKey::Optional(a), SortKey::Optional(b)) => match (a, b) {
                (Some(a), Some(b)) => directed(a.total_cmp(&b), self.descending),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            (SortKey::Place(a), SortKey::Place(b)) => {
                let ascending = match (a > 0, b > 0) {
                    (true, true) => a.cmp(&b),
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    (false, false) => Ordering::Equal,
                };
                directed(ascending, self.descending)
            }
            _ => Ordering::Equal,
        }
    }

    /// Stable sort; ties keep their incoming order.
    pub fn sort(&self, rows: &mut [RunRow<'_>]) {
        rows.sort_by(|a, b| self.compare(a, b));
    }
}
