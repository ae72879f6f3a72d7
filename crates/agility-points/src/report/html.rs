use super::lines::ReportLine;

/// Scheme of drill-down links; the host maps `arb:<line>` back to a line.
pub const LINK_SCHEME: &str = "arb:";

/// Escapes element text.
pub fn escape(raw: &str) -> String {
    html_escape::encode_text(raw).into_owned()
}

/// Escapes a value placed inside a double-quoted attribute.
pub fn attribute(raw: &str) -> String {
    html_escape::encode_double_quoted_attribute(raw).into_owned()
}

/// Escaped table-cell content; empty cells keep their borders.
pub(crate) fn cell(raw: &str) -> String {
    if raw.is_empty() {
        "&nbsp;".to_string()
    } else {
        escape(raw)
    }
}

pub(crate) fn anchor(line_no: usize, text: &str) -> String {
    format!("<a href=\"{LINK_SCHEME}{line_no}\">{}</a>", escape(text))
}

/// Parses a drill-down link back into its line number.
pub fn link_target(href: &str) -> Option<usize> {
    href.strip_prefix(LINK_SCHEME)?.parse().ok()
}

/// Full document: every line's fragment in order, numbered from 0.
pub fn render_document(title: &str, lines: &[ReportLine]) -> String {
    let mut data = format!(
        "<html>\n<head><title>{}</title></head>\n<body>\n",
        escape(title)
    );
    for (line_no, line) in lines.iter().enumerate() {
        data.push_str(&line.html(line_no));
    }
    data.push_str("</body></html>\n");
    data
}
