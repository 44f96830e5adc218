//! HTML rendering of a profile report. Single document, no external assets.

use std::fmt::Write as _;

use crate::profile::{ColumnSummary, ProfileReport};

const STYLE: &str = "\
body{font-family:sans-serif;margin:2rem;color:#222}\
h1{border-bottom:2px solid #444;padding-bottom:.3rem}\
h2{margin-top:2rem}\
table{border-collapse:collapse;margin:.5rem 0}\
td,th{border:1px solid #bbb;padding:.25rem .6rem;text-align:left}\
th{background:#f0f0f0}\
.overview td:first-child{font-weight:bold}\
.muted{color:#777}";

pub(super) fn render(report: &ProfileReport) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
         <title>{}</title><style>{}</style></head><body>",
        escape(&report.title),
        STYLE
    );
    let _ = write!(out, "<h1>{}</h1>", escape(&report.title));

    let _ = write!(
        out,
        "<h2>Overview</h2><table class=\"overview\">\
         <tr><td>Rows</td><td>{}</td></tr>\
         <tr><td>Columns</td><td>{}</td></tr>\
         <tr><td>Missing cells</td><td>{} ({:.1}%)</td></tr>\
         <tr><td>Duplicate rows</td><td>{}</td></tr></table>",
        report.row_count,
        report.column_count,
        report.missing_cells,
        report.missing_ratio * 100.0,
        report.duplicate_rows
    );

    for column in &report.columns {
        render_column(&mut out, column);
    }

    out.push_str("</body></html>");
    out
}

fn render_column(out: &mut String, column: &ColumnSummary) {
    let _ = write!(
        out,
        "<h2>{} <span class=\"muted\">({:?}, {:?})</span></h2><table>",
        escape(&column.name),
        column.kind,
        column.dtype
    );
    let _ = write!(
        out,
        "<tr><td>Values</td><td>{}</td></tr>\
         <tr><td>Missing</td><td>{}</td></tr>\
         <tr><td>Distinct</td><td>{}</td></tr>",
        column.count, column.null_count, column.distinct
    );

    if let Some(stats) = &column.numeric {
        let _ = write!(
            out,
            "<tr><td>Mean</td><td>{:.4}</td></tr>\
             <tr><td>Std</td><td>{:.4}</td></tr>\
             <tr><td>Min</td><td>{}</td></tr>\
             <tr><td>Q1</td><td>{}</td></tr>\
             <tr><td>Median</td><td>{}</td></tr>\
             <tr><td>Q3</td><td>{}</td></tr>\
             <tr><td>Max</td><td>{}</td></tr>\
             <tr><td>Zeros</td><td>{}</td></tr>",
            stats.mean,
            stats.std,
            stats.min,
            stats.q1,
            stats.median,
            stats.q3,
            stats.max,
            column.zero_count
        );
    }

    if let Some((lo, hi)) = column.length_range {
        let _ = write!(out, "<tr><td>Length</td><td>{} .. {}</td></tr>", lo, hi);
    }

    if let Some((lo, hi)) = column.datetime_range {
        let _ = write!(
            out,
            "<tr><td>Range</td><td>{} .. {}</td></tr>",
            lo.format("%Y-%m-%d %H:%M:%S"),
            hi.format("%Y-%m-%d %H:%M:%S")
        );
    }
    out.push_str("</table>");

    if !column.top_values.is_empty() {
        out.push_str("<table><tr><th>Value</th><th>Count</th></tr>");
        for (value, count) in &column.top_values {
            let _ = write!(
                out,
                "<tr><td>{}</td><td>{}</td></tr>",
                escape(value),
                count
            );
        }
        out.push_str("</table>");
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
