use chrono::NaiveDate;
use serde::Serialize;

use super::html::{anchor, attribute, cell, escape};
use crate::scoring::rules::OtherPointsTally;
use crate::scoring::{LifetimeKind, MultiQOccurrence, Subtotal};

/// Opening tag shared by every table in the rendered report.
pub const TABLE_HEADER: &str = r#"<table border="2" cellspacing="0" cellpadding="2">"#;

/// Column slots every line exposes to list views and CSV export.
pub const COLUMN_COUNT: usize = 9;

/// Position of a run inside the dog's trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RunRef {
    pub trial: usize,
    pub run: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Separator,
    Text,
    Dog,
    Venue,
    Title,
    Event,
    Lifetime,
    LifetimeSubtotal,
    MultiQ,
    Speed,
    OtherPoints,
}

impl LineKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Separator => "Separator",
            Self::Text => "Text",
            Self::Dog => "Dog",
            Self::Venue => "Venue",
            Self::Title => "Title",
            Self::Event => "Event",
            Self::Lifetime => "Lifetime",
            Self::LifetimeSubtotal => "Lifetime Subtotal",
            Self::MultiQ => "Multi-Q",
            Self::Speed => "Speed Points",
            Self::OtherPoints => "Other Points",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DogLine {
    pub call_name: String,
    pub registered_name: String,
    pub today: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueLine {
    pub venue: String,
    pub url: Option<String>,
    pub registration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleLine {
    pub venue: String,
    pub name: String,
    pub date: Option<NaiveDate>,
    pub received: bool,
}

/// Counters behind one event-summary line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventTally {
    pub runs: usize,
    pub judges: usize,
    pub partners: usize,
    pub qualified: usize,
    pub clean: usize,
    pub qualified_judges: usize,
    pub qualified_partners: usize,
    pub points: f64,
    /// Present when a rule for the event awards super-Qs.
    pub super_qs: Option<f64>,
    /// Present when the event earned speed points.
    pub speed: Option<f64>,
}

impl EventTally {
    /// Truncated percentage of counted runs that qualified.
    pub fn q_percent(&self) -> u32 {
        if self.runs == 0 {
            0
        } else {
            (self.qualified as f64 / self.runs as f64 * 100.0) as u32
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventLine {
    pub venue: String,
    pub division: String,
    pub level: String,
    pub event: String,
    pub division_index: usize,
    pub level_index: usize,
    pub event_index: usize,
    pub has_partner: bool,
    pub runs: Vec<RunRef>,
    pub tally: EventTally,
}

impl EventLine {
    fn run_count(&self) -> String {
        let tally = &self.tally;
        let mut text = format!("{} Runs, {} Judges", tally.runs, tally.judges);
        if self.has_partner && tally.partners > 0 {
            text.push_str(&format!(", {} Partners", tally.partners));
        }
        text
    }

    fn q_count(&self) -> String {
        let tally = &self.tally;
        let mut text = format!("{} Qs ({}%)", tally.qualified, tally.q_percent());
        if tally.clean > 0 {
            text.push_str(&format!(", {} clean", tally.clean));
        }
        if tally.qualified_judges > 0 {
            text.push_str(&format!(", {} Judges", tally.qualified_judges));
        }
        if self.has_partner && tally.qualified_partners > 0 {
            text.push_str(&format!(", {} Partners", tally.qualified_partners));
        }
        text
    }

    fn super_q_text(&self) -> Option<String> {
        self.tally.super_qs.map(|count| format!("{count} SQs"))
    }

    fn speed_text(&self) -> Option<String> {
        self.tally
            .speed
            .map(|points| format!("Speed Points: {points}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifetimeLine {
    pub venue: String,
    pub kind: LifetimeKind,
    /// Venue-specific name for lifetime points, when configured.
    pub lifetime_name: Option<String>,
    pub total: f64,
    pub filtered: f64,
    /// Per (division, level) or per event, depending on the report options.
    pub breakdown: Vec<Subtotal>,
}

impl LifetimeLine {
    pub fn heading(&self) -> String {
        match self.kind {
            LifetimeKind::Lifetime => format!(
                "{} Points",
                self.lifetime_name.as_deref().unwrap_or("Lifetime")
            ),
            LifetimeKind::Placement => "Placement Points".to_string(),
        }
    }
}

/// Per-division rollup printed under a lifetime or placement line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifetimeSubtotalLine {
    pub venue: String,
    pub kind: LifetimeKind,
    pub subtotal: Subtotal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiQLine {
    pub venue: String,
    pub name: String,
    pub short_name: String,
    pub occurrences: Vec<MultiQOccurrence>,
    pub existing: f64,
}

impl MultiQLine {
    pub fn total(&self) -> f64 {
        self.occurrences.len() as f64 + self.existing
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedLine {
    pub venue: String,
    pub division: String,
    pub points: f64,
}

/// One award feeding an other-points line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtherPointsEntry {
    /// Absent for imported points.
    pub run: Option<RunRef>,
    pub date: NaiveDate,
    pub venue: String,
    pub division: String,
    pub level: String,
    pub event: String,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtherPointsLine {
    pub name: String,
    pub tally: OtherPointsTally,
    pub level: Option<String>,
    pub event: Option<String>,
    pub entries: Vec<OtherPointsEntry>,
}

impl OtherPointsLine {
    pub fn points(&self) -> f64 {
        self.entries.iter().map(|entry| entry.points).sum()
    }
}

/// What a line's drill-down refers to. The host decides what opening it
/// means, such as editing the dog or listing the runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineDetails<'a> {
    Dog {
        call_name: &'a str,
    },
    Registration {
        venue: &'a str,
        number: &'a str,
    },
    Title {
        venue: &'a str,
        name: &'a str,
    },
    Runs(&'a [RunRef]),
    Lifetime {
        venue: &'a str,
        kind: LifetimeKind,
    },
    MultiQ {
        venue: &'a str,
        name: &'a str,
        occurrences: &'a [MultiQOccurrence],
    },
    OtherPoints(&'a [OtherPointsEntry]),
}

/// One row of the points report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportLine {
    /// Raw markup with no list-view cells.
    Separator { html: String },
    Text {
        in_html: bool,
        first: String,
        second: String,
    },
    Dog(DogLine),
    Venue(VenueLine),
    Title(TitleLine),
    Event(EventLine),
    Lifetime(LifetimeLine),
    LifetimeSubtotal(LifetimeSubtotalLine),
    MultiQ(MultiQLine),
    Speed(SpeedLine),
    OtherPoints(OtherPointsLine),
}

fn total_text(label: &str, total: f64, filtered: f64) -> String {
    if filtered > 0.0 {
        format!("{label}: {} ({total})", total - filtered)
    } else {
        format!("{label}: {total}")
    }
}

impl ReportLine {
    pub fn separator(html: impl Into<String>) -> Self {
        Self::Separator { html: html.into() }
    }

    pub fn text(in_html: bool, first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::Text {
            in_html,
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn kind(&self) -> LineKind {
        match self {
            Self::Separator { .. } => LineKind::Separator,
            Self::Text { .. } => LineKind::Text,
            Self::Dog(_) => LineKind::Dog,
            Self::Venue(_) => LineKind::Venue,
            Self::Title(_) => LineKind::Title,
            Self::Event(_) => LineKind::Event,
            Self::Lifetime(_) => LineKind::Lifetime,
            Self::LifetimeSubtotal(_) => LineKind::LifetimeSubtotal,
            Self::MultiQ(_) => LineKind::MultiQ,
            Self::Speed(_) => LineKind::Speed,
            Self::OtherPoints(_) => LineKind::OtherPoints,
        }
    }

    /// Text for one list-view column; empty when the line has nothing there.
    pub fn column_text(&self, column: usize) -> String {
        match (self, column) {
            (Self::Text { first, .. }, 0) => first.clone(),
            (Self::Text { second, .. }, 1) => second.clone(),

            (Self::Dog(dog), 1) => dog.call_name.clone(),
            (Self::Dog(dog), 2) => dog.registered_name.clone(),
            (Self::Dog(dog), 7) => dog.today.format("%Y-%m-%d").to_string(),

            (Self::Venue(venue), 0) => venue.venue.clone(),
            (Self::Venue(venue), 1) => venue
                .registration
                .as_ref()
                .map(|number| format!("[{number}]"))
                .unwrap_or_default(),

            (Self::Title(title), 1) => title
                .date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            (Self::Title(title), 2) if title.received => format!("{}*", title.name),
            (Self::Title(title), 2) => title.name.clone(),

            (Self::Event(line), 1) => line.division.clone(),
            (Self::Event(line), 2) => line.level.clone(),
            (Self::Event(line), 3) => line.event.clone(),
            (Self::Event(line), 4) => line.run_count(),
            (Self::Event(line), 5) => line.q_count(),
            (Self::Event(line), 6) => line.tally.points.to_string(),
            (Self::Event(line), 7) => line
                .super_q_text()
                .or_else(|| line.speed_text())
                .unwrap_or_default(),
            (Self::Event(line), 8) => line
                .super_q_text()
                .and(line.speed_text())
                .unwrap_or_default(),

            (Self::Lifetime(line), 1) => line.heading(),
            (Self::Lifetime(line), 2) => total_text("Total", line.total, line.filtered),

            (Self::LifetimeSubtotal(line), 2) => total_text(
                &line.subtotal.name,
                line.subtotal.total,
                line.subtotal.filtered,
            ),

            (Self::MultiQ(line), 7) => format!("{} {}", line.total(), line.short_name),

            (Self::Speed(line), 1) => line.division.clone(),
            (Self::Speed(line), 7) => format!("Speed Points: {}", line.points),

            (Self::OtherPoints(line), _) => other_points_text(line, column),

            _ => String::new(),
        }
    }

    pub fn cells(&self) -> Vec<String> {
        (0..COLUMN_COUNT)
            .map(|column| self.column_text(column))
            .collect()
    }

    /// Markup fragment; `line_no` feeds the drill-down anchor.
    pub fn html(&self, line_no: usize) -> String {
        let text = |column| self.column_text(column);
        match self {
            Self::Separator { html } => html.clone(),
            Self::Text { in_html: false, .. } => String::new(),
            Self::Text { second, .. } => format!("<tr>\n<td>{}</td>\n</tr>\n", cell(second)),
            Self::Dog(dog) => {
                let mut data = format!(
                    "<h1 align=\"center\">Titling Points {}</h1><h1>{}",
                    escape(&text(7)),
                    anchor(line_no, &dog.call_name)
                );
                if !dog.registered_name.is_empty() {
                    data.push_str(&format!(" [{}]", escape(&dog.registered_name)));
                }
                data.push_str("</h1>\n");
                data
            }
            Self::Venue(venue) => {
                let mut data = String::from("<h2>");
                match &venue.url {
                    Some(url) if !url.is_empty() => data.push_str(&format!(
                        "<a href=\"{}\">{}</a>",
                        attribute(url),
                        escape(&venue.venue)
                    )),
                    _ => data.push_str(&escape(&venue.venue)),
                }
                if let Some(number) = &venue.registration {
                    data.push_str(&format!(" [{}]\n", anchor(line_no, number)));
                }
                data.push_str("</h2>\n");
                data
            }
            Self::Title(_) => format!(
                "<tr>\n<td>{}</td>\n<td>{}</td>\n</tr>\n",
                cell(&text(1)),
                anchor(line_no, &text(2))
            ),
            Self::Event(_) => format!(
                concat!(
                    "<tr>\n<td>{}</td>\n<td>{}</td>\n<td>{}</td>\n<td>{}</td>\n",
                    "<td>{}</td>\n<td align=\"right\">{}</td>\n<td>{}</td>\n<td>{}</td>\n</tr>\n"
                ),
                cell(&text(1)),
                cell(&text(2)),
                cell(&text(3)),
                anchor(line_no, &text(4)),
                cell(&text(5)),
                cell(&text(6)),
                cell(&text(7)),
                cell(&text(8))
            ),
            Self::Lifetime(_) => format!(
                "<tr><td>&nbsp;</td></tr>\n<tr>\n<td>{}</td>\n<td align=\"right\">{}</td>\n</tr>\n",
                cell(&text(1)),
                anchor(line_no, &text(2))
            ),
            Self::LifetimeSubtotal(_) => format!(
                "<tr>\n<td>&nbsp;</td>\n<td align=\"right\">{}</td>\n</tr>\n",
                cell(&text(2))
            ),
            Self::MultiQ(_) => format!(
                "<tr>\n<td colspan=\"6\"/>\n<td>{}</td>\n</tr>\n",
                anchor(line_no, &text(7))
            ),
            Self::Speed(_) => format!(
                "<tr>\n<td>{}</td>\n<td colspan=\"5\"/>\n<td>{}</td>\n</tr>\n",
                cell(&text(1)),
                cell(&text(7))
            ),
            Self::OtherPoints(line) => other_points_html(line, line_no),
        }
    }

    /// Lines that open a detail view when activated.
    pub fn has_details(&self) -> bool {
        self.details().is_some()
    }

    pub fn details(&self) -> Option<LineDetails<'_>> {
        match self {
            Self::Dog(dog) => Some(LineDetails::Dog {
                call_name: &dog.call_name,
            }),
            Self::Venue(venue) => venue
                .registration
                .as_deref()
                .map(|number| LineDetails::Registration {
                    venue: &venue.venue,
                    number,
                }),
            Self::Title(title) => Some(LineDetails::Title {
                venue: &title.venue,
                name: &title.name,
            }),
            Self::Event(event) => Some(LineDetails::Runs(&event.runs)),
            Self::Lifetime(lifetime) => Some(LineDetails::Lifetime {
                venue: &lifetime.venue,
                kind: lifetime.kind,
            }),
            Self::MultiQ(multi_q) => Some(LineDetails::MultiQ {
                venue: &multi_q.venue,
                name: &multi_q.name,
                occurrences: &multi_q.occurrences,
            }),
            Self::OtherPoints(other) => Some(LineDetails::OtherPoints(&other.entries)),
            Self::Separator { .. }
            | Self::Text { .. }
            | Self::LifetimeSubtotal(_)
            | Self::Speed(_) => None,
        }
    }

    /// True when both lines describe the same underlying entity. Used to keep
    /// a selection across rebuilds, so displayed numbers are ignored.
    pub fn is_same_entity(&self, other: &ReportLine) -> bool {
        match (self, other) {
            (Self::Dog(a), Self::Dog(b)) => a.call_name == b.call_name,
            (Self::Venue(a), Self::Venue(b)) => a.venue == b.venue,
            (Self::Title(a), Self::Title(b)) => a.venue == b.venue && a.name == b.name,
            (Self::Event(a), Self::Event(b)) => {
                a.venue == b.venue
                    && a.division == b.division
                    && a.level == b.level
                    && a.event == b.event
            }
            (Self::Lifetime(a), Self::Lifetime(b)) => a.venue == b.venue && a.kind == b.kind,
            (Self::LifetimeSubtotal(a), Self::LifetimeSubtotal(b)) => {
                a.venue == b.venue && a.kind == b.kind && a.subtotal.name == b.subtotal.name
            }
            (Self::MultiQ(a), Self::MultiQ(b)) => a.venue == b.venue && a.name == b.name,
            (Self::Speed(a), Self::Speed(b)) => a.venue == b.venue && a.division == b.division,
            (Self::OtherPoints(a), Self::OtherPoints(b)) => {
                a.name == b.name && a.level == b.level && a.event == b.event
            }
            _ => false,
        }
    }
}

fn other_points_text(line: &OtherPointsLine, column: usize) -> String {
    let level = || line.level.clone().unwrap_or_default();
    let event = || line.event.clone().unwrap_or_default();
    match (line.tally, column) {
        (OtherPointsTally::All, 1) => line.name.clone(),
        (OtherPointsTally::All, 2) => line.points().to_string(),
        (OtherPointsTally::AllByEvent, 2) => event(),
        (OtherPointsTally::Level, 2) => level(),
        (OtherPointsTally::AllByEvent | OtherPointsTally::Level, 3) => line.points().to_string(),
        (OtherPointsTally::LevelByEvent, 2) => level(),
        (OtherPointsTally::LevelByEvent, 3) => event(),
        (OtherPointsTally::LevelByEvent, 4) => line.points().to_string(),
        _ => String::new(),
    }
}

fn other_points_html(line: &OtherPointsLine, line_no: usize) -> String {
    let text = |column| other_points_text(line, column);
    match line.tally {
        OtherPointsTally::All => format!(
            "<tr>\n<td>{}</td>\n<td align=\"right\">{}</td>\n</tr>\n",
            cell(&text(1)),
            anchor(line_no, &text(2))
        ),
        OtherPointsTally::AllByEvent | OtherPointsTally::Level => format!(
            "<tr>\n<td>&nbsp;</td>\n<td>{}</td>\n<td align=\"right\">{}</td>\n</tr>\n",
            cell(&text(2)),
            anchor(line_no, &text(3))
        ),
        OtherPointsTally::LevelByEvent => format!(
            "<tr>\n<td>&nbsp;</td>\n<td>{}</td>\n<td>{}</td>\n<td align=\"right\">{}</td>\n</tr>\n",
            cell(&text(2)),
            cell(&text(3)),
            anchor(line_no, &text(4))
        ),
    }
}
