use std::io;

use super::lines::ReportLine;

/// Writes one CSV record per line, each with every column cell.
pub fn write_csv<W: io::Write>(lines: &[ReportLine], writer: W) -> Result<(), csv::Error> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(false)
        .from_writer(writer);
    for line in lines {
        csv.write_record(line.cells())?;
    }
    csv.flush()?;
    Ok(())
}

pub fn to_csv(lines: &[ReportLine]) -> Result<String, csv::Error> {
    let mut buffer = Vec::new();
    write_csv(lines, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|err| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, err)))
}

/// Plain-text listing: tab-separated cells, lines without text skipped.
pub fn to_text(lines: &[ReportLine]) -> String {
    let mut text = String::new();
    for line in lines {
        let cells = line.cells();
        if cells.iter().all(String::is_empty) {
            continue;
        }
        text.push_str(cells.join("\t").trim_end());
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_record_has_nine_cells() {
        let lines = vec![
            ReportLine::text(false, "Other Points", ""),
            ReportLine::separator("</table>"),
        ];
        let csv = to_csv(&lines).expect("csv");
        let records: Vec<&str> = csv.lines().collect();
        assert_eq!(records, vec!["Other Points,,,,,,,,", ",,,,,,,,"]);
    }

    #[test]
    fn text_listing_skips_blank_lines() {
        let lines = vec![
            ReportLine::separator("<h3>Runs</h3>"),
            ReportLine::text(false, "Other Points", ""),
        ];
        assert_eq!(to_text(&lines), "Other Points\n");
    }

    #[test]
    fn cells_with_commas_are_quoted() {
        let lines = vec![ReportLine::text(false, "1 Runs, 1 Judges", "")];
        let csv = to_csv(&lines).expect("csv");
        assert!(csv.starts_with("\"1 Runs, 1 Judges\","));
    }
}
