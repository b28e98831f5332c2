//! Output formatting for result envelopes
//!
//! Renders operation and script envelopes for terminal display:
//! - Compact or pretty-printed JSON of the full envelope
//! - A compact summary mode (counts and ids only)
//! - Optional color highlighting for pretty-printed JSON

use colored_json::prelude::*;
use serde_json::Value;

use crate::config::{DisplayConfig, OutputFormat};
use crate::engine::{Outcome, OutcomeData};
use crate::sql::ScriptOutcome;

/// Envelope formatter driven by the display configuration.
pub struct Formatter {
    format: OutputFormat,
    use_colors: bool,
    show_timing: bool,
}

impl Formatter {
    /// Create a formatter from a display configuration.
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self {
            format: config.format,
            use_colors: config.color_output,
            show_timing: config.show_timing,
        }
    }

    /// Format an operation envelope.
    pub fn format(&self, outcome: &Outcome) -> String {
        match self.format {
            OutputFormat::Compact => self.format_compact(outcome),
            _ => self.render(outcome.to_json()),
        }
    }

    /// Format a script envelope.
    pub fn format_script(&self, outcome: &ScriptOutcome) -> String {
        self.render(outcome.to_json())
    }

    fn render(&self, mut envelope: Value) -> String {
        if !self.show_timing {
            if let Some(object) = envelope.as_object_mut() {
                object.shift_remove("executionTime");
            }
        }

        let json_str = if self.format == OutputFormat::Json {
            serde_json::to_string(&envelope).unwrap_or_else(|_| envelope.to_string())
        } else {
            serde_json::to_string_pretty(&envelope).unwrap_or_else(|_| envelope.to_string())
        };

        // Only apply colors to pretty-printed JSON; compact output
        // stays plain for piping and logging.
        if self.use_colors && self.format != OutputFormat::Json {
            json_str.to_colored_json_auto().unwrap_or(json_str)
        } else {
            json_str
        }
    }

    /// One-line summary: what happened, not the full payload.
    fn format_compact(&self, outcome: &Outcome) -> String {
        if !outcome.success {
            let error = outcome.error.as_deref().unwrap_or("unknown error");
            return format!("error: {error}");
        }

        let summary = match &outcome.data {
            OutcomeData::Documents(docs) => format!("{} document(s)", docs.len()),
            OutcomeData::Document(Some(_)) => "1 document".to_string(),
            OutcomeData::Document(None) => "null".to_string(),
            OutcomeData::Inserted { id } => format!("inserted {id}"),
            OutcomeData::InsertedMany { ids } => format!("inserted {} document(s)", ids.len()),
            OutcomeData::Updated { matched, modified } => {
                format!("matched {matched}, modified {modified}")
            }
            OutcomeData::Deleted { deleted } => format!("deleted {deleted}"),
            OutcomeData::Count(count) => count.to_string(),
            OutcomeData::Dropped(true) => "dropped".to_string(),
            OutcomeData::Dropped(false) => "no such collection".to_string(),
            OutcomeData::None => "ok".to_string(),
        };

        if self.show_timing {
            format!("{summary} ({} ms)", outcome.execution_time_ms)
        } else {
            summary
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatter(format: OutputFormat) -> Formatter {
        Formatter {
            format,
            use_colors: false,
            show_timing: true,
        }
    }

    #[test]
    fn test_format_json_single_line() {
        let outcome = Outcome::success(OutcomeData::Count(3), 1);
        let text = formatter(OutputFormat::Json).format(&outcome);
        assert!(!text.contains('\n'));
        assert!(text.contains("\"count\":3"));
    }

    #[test]
    fn test_format_pretty_multi_line() {
        let outcome = Outcome::success(OutcomeData::Count(3), 1);
        let text = formatter(OutputFormat::JsonPretty).format(&outcome);
        assert!(text.contains('\n'));
    }

    #[test]
    fn test_format_compact_update() {
        let outcome = Outcome::success(
            OutcomeData::Updated {
                matched: 5,
                modified: 5,
            },
            2,
        );
        let text = formatter(OutputFormat::Compact).format(&outcome);
        assert!(text.contains("matched 5, modified 5"));
    }

    #[test]
    fn test_format_compact_error() {
        let outcome = Outcome::failure("Invalid query syntax".to_string(), 0);
        let text = formatter(OutputFormat::Compact).format(&outcome);
        assert!(text.starts_with("error: Invalid query syntax"));
    }

    #[test]
    fn test_timing_can_be_hidden() {
        let mut f = formatter(OutputFormat::Json);
        f.show_timing = false;
        let outcome = Outcome::success(OutcomeData::Count(3), 1);
        assert!(!f.format(&outcome).contains("executionTime"));
    }
}
