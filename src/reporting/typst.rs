//! Typst formatter (spec section 4.10).

use crate::domain::ProjectTree;

use super::{format_hm, format_hm_with_average, Formatter, ReportData, INVALID_SENTENCE, NO_RECORDS_SENTENCE};

const HEADER: &str = "#set text(font: \"Linux Libertine\", size: 11pt, spacing: 0.65em)\n";

const KEYWORD_COLORS: &[(&str, &str)] = &[
    ("study", "blue"),
    ("recreation", "orange"),
    ("meal", "green"),
    ("exercise", "red"),
    ("routine", "purple"),
    ("sleep", "maroon"),
    ("code", "teal"),
];

pub struct TypstFormatter;

impl Formatter for TypstFormatter {
    fn render(&self, data: &ReportData) -> String {
        let mut out = String::new();
        out.push_str(HEADER);

        if data.is_invalid() {
            out.push_str(INVALID_SENTENCE);
            out.push('\n');
            return out;
        }
        let Some(body) = data.body() else {
            out.push_str(INVALID_SENTENCE);
            out.push('\n');
            return out;
        };

        out.push_str(&format!("= {}\n\n", title_for(data)));

        if body.is_empty() {
            out.push_str(NO_RECORDS_SENTENCE);
            out.push('\n');
            return out;
        }

        let actual_days = if matches!(data, ReportData::Period { .. }) { body.actual_days } else { 0 };

        out.push_str(&format!("Total: {}\n\n", format_hm_with_average(body.total_duration, actual_days)));

        if let ReportData::Daily { .. } = data {
            for rec in &body.detailed_records {
                out.push_str(&format!(
                    "- {}\n",
                    colorize(&rec.project_path, &format!(
                        "{}-{}: {} ({})",
                        rec.start_str,
                        rec.end_str,
                        rec.project_path,
                        format_hm(rec.duration_seconds)
                    ))
                ));
                if let Some(remark) = &rec.remark {
                    out.push_str(&format!("  - {remark}\n"));
                }
            }
            out.push('\n');
        }

        if matches!(data, ReportData::Period { .. }) {
            out.push_str(&format!("Actual days: {}\n\n", body.actual_days));
        }

        out.push_str(&format!("- sleep: {}\n", format_hm_with_average(body.stats.sleep_total_time, actual_days)));
        out.push_str(&format!("- exercise: {}\n", format_hm_with_average(body.stats.total_exercise_time, actual_days)));
        out.push_str(&format!("- study: {}\n\n", format_hm_with_average(body.stats.total_study_time, actual_days)));

        render_tree(&body.project_tree, 0, actual_days, &mut out);
        out
    }
}

fn title_for(data: &ReportData) -> String {
    match data {
        ReportData::Daily { date, .. } => format!("Day {date}"),
        ReportData::Monthly { year_month, .. } => format!("Month {year_month}"),
        ReportData::Weekly { iso_week, .. } => format!("Week {iso_week}"),
        ReportData::Yearly { year, .. } => format!("Year {year}"),
        ReportData::Period { days_to_query, .. } => format!("Last {days_to_query} days"),
        ReportData::Range { start_date, end_date, .. } => format!("{start_date} .. {end_date}"),
        ReportData::Invalid { .. } => "Invalid".to_string(),
    }
}

fn colorize(project_path: &str, text: &str) -> String {
    for (keyword, color) in KEYWORD_COLORS {
        if project_path.contains(keyword) {
            return format!("#text({color})[{text}]");
        }
    }
    text.to_string()
}

fn render_tree(node: &ProjectTree, depth: usize, actual_days: i64, out: &mut String) {
    for child in node.sorted_children() {
        let indent = "  ".repeat(depth);
        let line = format!("{}: {}", child.name, format_hm_with_average(child.duration_seconds, actual_days));
        out.push_str(&format!("{indent}- {}\n", colorize(&child.name, &line)));
        render_tree(child, depth + 1, actual_days, out);
    }
}
