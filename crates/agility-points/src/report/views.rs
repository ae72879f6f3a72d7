use serde::Serialize;

use super::lines::{LineKind, ReportLine};

#[derive(Debug, Clone, Serialize)]
pub struct ReportLineView {
    pub line: usize,
    pub kind: LineKind,
    pub kind_label: &'static str,
    pub cells: Vec<String>,
    pub has_details: bool,
}

impl ReportLineView {
    pub fn new(line_no: usize, line: &ReportLine) -> Self {
        let kind = line.kind();
        Self {
            line: line_no,
            kind,
            kind_label: kind.label(),
            cells: line.cells(),
            has_details: line.has_details(),
        }
    }
}
