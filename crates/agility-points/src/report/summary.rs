use chrono::NaiveDate;
use serde::Serialize;
use std::io;

use super::export;
use super::html::{link_target, render_document};
use super::lines::{LineDetails, ReportLine};
use super::views::ReportLineView;

/// The ordered lines of one dog's points report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointsReport {
    pub call_name: String,
    pub today: NaiveDate,
    pub lines: Vec<ReportLine>,
}

impl PointsReport {
    pub fn lines(&self) -> &[ReportLine] {
        &self.lines
    }

    pub fn line(&self, line_no: usize) -> Option<&ReportLine> {
        self.lines.get(line_no)
    }

    pub fn details(&self, line_no: usize) -> Option<LineDetails<'_>> {
        self.line(line_no)?.details()
    }

    /// Follows a drill-down link from the rendered document and hands what it
    /// points at to `action`. Returns `None` for foreign links and for lines
    /// without details.
    pub fn open_details<R>(
        &self,
        href: &str,
        action: impl FnOnce(LineDetails<'_>) -> R,
    ) -> Option<R> {
        let details = self.details(link_target(href)?)?;
        Some(action(details))
    }

    /// Where a line held from a previous build now sits, for keeping the
    /// selection across a rebuild.
    pub fn position_of(&self, previous: &ReportLine) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.is_same_entity(previous))
    }

    pub fn title(&self) -> String {
        format!("Titling Points {}", self.today.format("%Y-%m-%d"))
    }

    pub fn html(&self) -> String {
        render_document(&self.title(), &self.lines)
    }

    pub fn to_csv(&self) -> Result<String, csv::Error> {
        export::to_csv(&self.lines)
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        export::write_csv(&self.lines, writer)
    }

    pub fn to_text(&self) -> String {
        export::to_text(&self.lines)
    }

    pub fn views(&self) -> Vec<ReportLineView> {
        self.lines
            .iter()
            .enumerate()
            .map(|(line_no, line)| ReportLineView::new(line_no, line))
            .collect()
    }
}
