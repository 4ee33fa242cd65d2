//! Server-rendered HTML pages.

use allergy_core::{CategorySummary, ParsedAllergy};
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 2rem; color: #222; }
nav a { margin-right: 1rem; }
table { border-collapse: collapse; margin-top: 1rem; }
th, td { border: 1px solid #ccc; padding: 0.3rem 0.6rem; text-align: left; }
.bar { background: #3b7dd8; height: 1rem; }
.muted { color: #888; }
.category { margin-bottom: 1.5rem; }
"#;

const NAV_HTML: &str = r#"<nav>
  <a href="/">Visualisation</a>
  <a href="/data_visualization/allergies/">Records</a>
  <a href="/data_visualization/api/allergy-data/">JSON</a>
  <a href="/swagger-ui">API docs</a>
</nav>"#;

const EMPTY_HTML: &str = r#"<p class="muted">No allergy records available.</p>"#;

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn page_shell(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <style>{STYLE}</style>
</head>
<body>
{NAV_HTML}
<h1>{title}</h1>
{body}
</body>
</html>"#,
        title = escape_html(title),
    )
}

fn record_rows(allergies: &[ParsedAllergy]) -> String {
    let mut rows = String::new();
    for a in allergies {
        let _ = writeln!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            a.s_number,
            escape_html(&a.category),
            escape_html(&a.criticality),
            escape_html(&a.specific_reason),
        );
    }
    rows
}

fn record_table(allergies: &[ParsedAllergy]) -> String {
    format!(
        r#"<table>
<thead><tr><th>#</th><th>Category</th><th>Criticality</th><th>Specific reason</th></tr></thead>
<tbody>
{}</tbody>
</table>"#,
        record_rows(allergies)
    )
}

/// The tabular records page.
pub fn render_allergy_table(allergies: &[ParsedAllergy]) -> String {
    let body = if allergies.is_empty() {
        EMPTY_HTML.to_string()
    } else {
        record_table(allergies)
    };
    page_shell("Allergy Intolerance", &body)
}

/// The visualisation page: share of records per category with criticality and allergen
/// breakdowns, followed by the record list.
pub fn render_visualization(
    allergies: &[ParsedAllergy],
    summary: &[CategorySummary],
    threshold: usize,
) -> String {
    if allergies.is_empty() {
        return page_shell("Allergy Visualisation", EMPTY_HTML);
    }

    let total = allergies.len();
    let mut body = format!(
        r#"<p>{total} records in {} categories. Categories with fewer than {threshold} records are grouped under "Other".</p>"#,
        summary.len()
    );

    for category in summary {
        let percent = category.total as f64 * 100.0 / total as f64;
        let criticality = category
            .by_criticality
            .iter()
            .map(|(name, count)| format!("{}: {count}", escape_html(name)))
            .collect::<Vec<_>>()
            .join(", ");
        let reasons = category
            .by_reason
            .iter()
            .map(|(name, count)| format!("<li>{} ({count})</li>", escape_html(name)))
            .collect::<String>();

        let _ = write!(
            body,
            r#"
<div class="category">
  <h2>{name} <span class="muted">{count} ({percent:.1}%)</span></h2>
  <div class="bar" style="width: {percent:.1}%"></div>
  <p>Criticality: {criticality}</p>
  <ul>{reasons}</ul>
</div>"#,
            name = escape_html(&category.category),
            count = category.total,
        );
    }

    body.push_str("\n<h2>All records</h2>\n");
    body.push_str(&record_table(allergies));

    page_shell("Allergy Visualisation", &body)
}
