//! Formatter Registry (C9, spec section 4.9).
//!
//! Built once at startup from the bundle's declared `(kind, format)`
//! pairs; immutable afterwards (spec section 5). Asking for an
//! undeclared pair is a configuration error (`FormatterMissing`), not a
//! panic (property P8).

use std::collections::HashMap;

use super::{latex::LatexFormatter, markdown::MarkdownFormatter, typst::TypstFormatter};
use super::{Format, Formatter, ReportData, ReportKind};
use crate::error::CoreError;

#[derive(Debug, thiserror::Error)]
#[error("no formatter registered for {0}")]
pub struct RegistryBuildError(String);

pub struct FormatterRegistry {
    formatters: HashMap<(ReportKind, Format), Box<dyn Formatter>>,
}

impl FormatterRegistry {
    /// Builds the registry from exactly the `(kind, format)` pairs the
    /// bundle declared. `Range` is an internal kind and is always wired
    /// to whichever formats are declared for `Period`, since a range
    /// query renders with the same template as a period query.
    #[must_use]
    pub fn from_declared(declared: &[(ReportKind, Format)]) -> Self {
        let mut formatters: HashMap<(ReportKind, Format), Box<dyn Formatter>> = HashMap::new();
        for (kind, format) in declared {
            formatters.insert((*kind, *format), make_formatter(*format));
            if *kind == ReportKind::Period {
                formatters.insert((ReportKind::Range, *format), make_formatter(*format));
            }
        }
        Self { formatters }
    }

    pub fn render(&self, data: &ReportData, format: Format) -> Result<String, CoreError> {
        let kind = data.kind();
        match self.formatters.get(&(kind, format)) {
            Some(formatter) => Ok(formatter.render(data)),
            None => Err(CoreError::FormatterMissing {
                kind: kind.to_string(),
                format: format.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn supports(&self, kind: ReportKind, format: Format) -> bool {
        self.formatters.contains_key(&(kind, format))
    }

    /// Every format declared for `kind`, used by the "export all periods"
    /// batch export to iterate the full registered matrix instead of a
    /// single caller-supplied format.
    #[must_use]
    pub fn formats_for(&self, kind: ReportKind) -> Vec<Format> {
        self.formatters.keys().filter(|(k, _)| *k == kind).map(|(_, f)| *f).collect()
    }
}

fn make_formatter(format: Format) -> Box<dyn Formatter> {
    match format {
        Format::Markdown => Box::new(MarkdownFormatter),
        Format::Latex => Box::new(LatexFormatter),
        Format::Typst => Box::new(TypstFormatter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProjectTree;
    use crate::reporting::ReportBody;

    fn empty_body() -> ReportBody {
        ReportBody {
            total_duration: 0,
            actual_days: 0,
            records: Vec::new(),
            project_tree: ProjectTree::root(),
            stats: Default::default(),
            detailed_records: Vec::new(),
        }
    }

    #[test]
    fn missing_pair_returns_formatter_missing() {
        let registry = FormatterRegistry::from_declared(&[(ReportKind::Day, Format::Markdown)]);
        let data = ReportData::Daily { date: "2026-01-01".into(), body: empty_body() };
        let err = registry.render(&data, Format::Latex).unwrap_err();
        assert!(matches!(err, CoreError::FormatterMissing { .. }));
    }

    #[test]
    fn declared_pair_renders() {
        let registry = FormatterRegistry::from_declared(&[(ReportKind::Day, Format::Markdown)]);
        let data = ReportData::Daily { date: "2026-01-01".into(), body: empty_body() };
        assert!(registry.render(&data, Format::Markdown).is_ok());
    }
}
