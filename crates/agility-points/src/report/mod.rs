//! Points report: per-venue titles, event summaries, lifetime totals and
//! multi-Qs, rendered as list cells, HTML or CSV.

mod builder;
mod export;
mod html;
pub mod lines;
mod other;
mod summary;
pub mod views;

#[cfg(test)]
mod tests;

pub use builder::PointsReportBuilder;
pub use html::{attribute, escape, link_target, LINK_SCHEME};
pub use lines::{LineDetails, LineKind, ReportLine, RunRef, COLUMN_COUNT, TABLE_HEADER};
pub use summary::PointsReport;
pub use views::ReportLineView;
