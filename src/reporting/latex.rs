//! LaTeX formatter (spec section 4.10).
//!
//! Grounded on the original `DayTexUtils.cpp` preamble/content/postfix
//! structure (see `original_source/`): a self-contained document with a
//! fixed preamble declaring paper options, Latin+CJK fonts, list spacing,
//! and keyword colors, followed by rendered content and a closing
//! `\end{document}`.

use crate::domain::ProjectTree;

use super::{escape_latex, format_hm, format_hm_with_average, Formatter, ReportData, INVALID_SENTENCE, NO_RECORDS_SENTENCE};

const PREAMBLE: &str = r"\documentclass[a4paper,12pt]{article}
\usepackage{xeCJK}
\usepackage[utf8]{inputenc}
\setmainfont{Latin Modern Roman}
\setCJKmainfont{Noto Sans CJK SC}
\usepackage{enumitem}
\setlist{nosep,leftmargin=1.5em}
\usepackage[dvipsnames]{xcolor}
\definecolor{studycolor}{HTML}{1F77B4}
\definecolor{recreationcolor}{HTML}{FF7F0E}
\definecolor{mealcolor}{HTML}{2CA02C}
\definecolor{exercisecolor}{HTML}{D62728}
\definecolor{routinecolor}{HTML}{9467BD}
\definecolor{sleepcolor}{HTML}{8C564B}
\definecolor{codecolor}{HTML}{17BECF}
\begin{document}
";

const POSTFIX: &str = "\\end{document}\n";

/// Mirrors `typst.rs`'s `KEYWORD_COLORS`, matched against the `\definecolor`
/// names declared in `PREAMBLE`.
const KEYWORD_COLORS: &[(&str, &str)] = &[
    ("study", "studycolor"),
    ("recreation", "recreationcolor"),
    ("meal", "mealcolor"),
    ("exercise", "exercisecolor"),
    ("routine", "routinecolor"),
    ("sleep", "sleepcolor"),
    ("code", "codecolor"),
];

fn colorize(project_path: &str, text: &str) -> String {
    for (keyword, color) in KEYWORD_COLORS {
        if project_path.contains(keyword) {
            return format!("\\textcolor{{{color}}}{{{text}}}");
        }
    }
    text.to_string()
}

pub struct LatexFormatter;

impl Formatter for LatexFormatter {
    fn render(&self, data: &ReportData) -> String {
        let mut out = String::new();
        out.push_str(PREAMBLE);

        if data.is_invalid() {
            out.push_str(&format!("{INVALID_SENTENCE}\n"));
            out.push_str(POSTFIX);
            return out;
        }
        let Some(body) = data.body() else {
            out.push_str(&format!("{INVALID_SENTENCE}\n"));
            out.push_str(POSTFIX);
            return out;
        };

        out.push_str(&format!("\\section*{{{}}}\n", escape_latex(&title_for(data))));

        if body.is_empty() {
            out.push_str(&format!("{NO_RECORDS_SENTENCE}\n"));
            out.push_str(POSTFIX);
            return out;
        }

        let actual_days = if matches!(data, ReportData::Period { .. }) { body.actual_days } else { 0 };

        out.push_str(&format!("Total: {}\n\n", format_hm_with_average(body.total_duration, actual_days)));

        if let ReportData::Daily { .. } = data {
            out.push_str("\\begin{itemize}\n");
            for rec in &body.detailed_records {
                let line = format!(
                    "{}--{}: {} ({})",
                    rec.start_str,
                    rec.end_str,
                    escape_latex(&rec.project_path),
                    format_hm(rec.duration_seconds)
                );
                out.push_str(&format!("  \\item {}\n", colorize(&rec.project_path, &line)));
                if let Some(remark) = &rec.remark {
                    out.push_str(&format!("  \\par\\textit{{{}}}\n", escape_latex(remark)));
                }
            }
            out.push_str("\\end{itemize}\n");
        }

        if matches!(data, ReportData::Period { .. }) {
            out.push_str(&format!("Actual days: {}\n\n", body.actual_days));
        }

        out.push_str("\\begin{itemize}\n");
        out.push_str(&format!("  \\item sleep: {}\n", format_hm_with_average(body.stats.sleep_total_time, actual_days)));
        out.push_str(&format!("  \\item exercise: {}\n", format_hm_with_average(body.stats.total_exercise_time, actual_days)));
        out.push_str(&format!("  \\item study: {}\n", format_hm_with_average(body.stats.total_study_time, actual_days)));
        out.push_str("\\end{itemize}\n");

        render_tree(&body.project_tree, actual_days, &mut out);
        out.push_str(POSTFIX);
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

fn render_tree(node: &ProjectTree, actual_days: i64, out: &mut String) {
    if node.sorted_children().is_empty() {
        return;
    }
    out.push_str("\\begin{itemize}\n");
    for child in node.sorted_children() {
        let line = format!("{}: {}", escape_latex(&child.name), format_hm_with_average(child.duration_seconds, actual_days));
        out.push_str(&format!("  \\item {}\n", colorize(&child.name, &line)));
        render_tree(child, actual_days, out);
    }
    out.push_str("\\end{itemize}\n");
}
