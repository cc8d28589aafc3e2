//! Output formatters for CLI commands.
//!
//! Every command renders its result through one of three modes: JSON for
//! machines, plain text for scripts and colorized pretty output for
//! terminals.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use svckit_codegen::{FileStatus, GenerationReport};
use svckit_core::cli::OutputFormat;
use svckit_introspector::InterfaceModel;

/// Format data according to the specified output format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Examples
///
/// ```
/// use svckit_cli::formatters::format_output;
/// use svckit_core::cli::OutputFormat;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Summary {
///     files: usize,
/// }
///
/// let output = format_output(&Summary { files: 18 }, OutputFormat::Json)?;
/// assert!(output.contains("\"files\": 18"));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::format(data),
        OutputFormat::Text => text::format(data),
        OutputFormat::Pretty => pretty::format(data),
    }
}

/// Formats the report of a generation run.
///
/// Text and pretty output list one line per target file followed by a
/// summary. `dry_run` marks the summary as a preview.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_report(report: &GenerationReport, format: OutputFormat, dry_run: bool) -> Result<String> {
    match format {
        OutputFormat::Json => json::format(report),
        OutputFormat::Text => Ok(text::report(report)),
        OutputFormat::Pretty => Ok(pretty::report(report, dry_run)),
    }
}

/// Formats a discovered interface.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_interface(model: &InterfaceModel, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::format(model),
        OutputFormat::Text => Ok(text::interface(model)),
        OutputFormat::Pretty => Ok(pretty::interface(model)),
    }
}

fn declarations(count: usize) -> String {
    if count == 1 {
        "1 declaration".to_string()
    } else {
        format!("{count} declarations")
    }
}

fn signature(method: &svckit_introspector::Method) -> String {
    let params = method
        .params()
        .iter()
        .map(|p| format!("{}: {}", p.name, p.ty))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{}({}) -> Result<{}, {}>",
        method.name(),
        params,
        method.response().ty,
        method.error().ty
    )
}

/// JSON output formatting.
pub mod json {
    use super::{Result, Serialize};

    /// Format data as JSON with 2-space indentation.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let json = serde_json::to_string_pretty(data)?;
        Ok(json)
    }

    /// Format data as compact JSON.
    pub fn format_compact<T: Serialize>(data: &T) -> Result<String> {
        let json = serde_json::to_string(data)?;
        Ok(json)
    }
}

/// Plain text output formatting.
pub mod text {
    use super::{GenerationReport, InterfaceModel, Result, Serialize, declarations, json, signature};

    /// Format data as plain text.
    ///
    /// Uses the compact JSON representation, suitable for piping.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        json::format_compact(data)
    }

    /// One `status path` line per file, then a summary line.
    #[must_use]
    pub fn report(report: &GenerationReport) -> String {
        let mut out = String::new();
        for file in &report.files {
            out.push_str(file.status.label());
            out.push(' ');
            out.push_str(&file.path);
            if file.added > 0 {
                out.push_str(&format!(" ({})", declarations(file.added)));
            }
            if !file.stale.is_empty() {
                out.push_str(&format!(" [stale: {}]", file.stale.join(", ")));
            }
            out.push('\n');
        }
        out.push_str(&format!(
            "{} created, {} updated, {} unchanged",
            report.created(),
            report.updated(),
            report.unchanged()
        ));
        out
    }

    /// The trait path followed by one signature per line.
    #[must_use]
    pub fn interface(model: &InterfaceModel) -> String {
        let mut out = model.interface.qualified_name();
        for method in &model.interface.methods {
            out.push('\n');
            out.push_str(&signature(method));
        }
        out
    }
}

/// Pretty (human-readable) output formatting.
pub mod pretty {
    use super::{Colorize, FileStatus, GenerationReport, InterfaceModel, Result, Serialize, declarations, signature};

    /// Format data as colorized, human-readable output.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        format_value(&value, 0)
    }

    /// Colorized file list with a summary.
    #[must_use]
    pub fn report(report: &GenerationReport, dry_run: bool) -> String {
        let mut out = format!(
            "{} {} ({})\n",
            "Service:".bold(),
            report.app_name.cyan(),
            report.interface
        );

        for file in &report.files {
            let status = match file.status {
                FileStatus::Created => format!("{:>9}", "created").green(),
                FileStatus::Updated { .. } => format!("{:>9}", "updated").yellow(),
                FileStatus::Unchanged => format!("{:>9}", "unchanged").dimmed(),
            };
            let detail = if file.added > 0 && !matches!(file.status, FileStatus::Created) {
                format!(" (+{})", declarations(file.added))
            } else {
                String::new()
            };
            out.push_str(&format!("  {status} {}{}\n", file.path, detail.dimmed()));
            if !file.stale.is_empty() {
                out.push_str(&format!(
                    "            {} {} lists old methods; delete and re-run to refresh\n",
                    "stale:".yellow(),
                    file.stale.join(", ")
                ));
            }
        }

        let summary = format!(
            "{} created, {} updated, {} unchanged",
            report.created(),
            report.updated(),
            report.unchanged()
        );
        if dry_run {
            out.push_str(&format!("{} {summary} (nothing written)", "Dry run:".yellow().bold()));
        } else if report.is_noop() {
            out.push_str(&format!("{} already up to date", "✓".green()));
        } else {
            out.push_str(&format!("{} {summary}", "✓".green()));
        }
        out
    }

    /// Colorized interface listing.
    #[must_use]
    pub fn interface(model: &InterfaceModel) -> String {
        let interface = &model.interface;
        let mut out = format!(
            "{} {}\n{} {}\n{} {}",
            "Interface:".bold(),
            interface.qualified_name().cyan(),
            "Source:".bold(),
            interface.source,
            "Methods:".bold(),
            interface.methods.len()
        );
        for method in &interface.methods {
            out.push_str(&format!("\n  {} {}", "•".blue(), signature(method)));
            for doc in method.docs() {
                out.push_str(&format!("\n      {}", doc.trim().dimmed()));
            }
        }
        out
    }

    /// Recursively format a JSON value with colors and indentation.
    fn format_value(value: &serde_json::Value, indent: usize) -> Result<String> {
        use serde_json::Value;

        let indent_str = "  ".repeat(indent);
        let next_indent_str = "  ".repeat(indent + 1);

        match value {
            Value::Null => Ok("null".dimmed().to_string()),
            Value::Bool(b) => Ok(b.to_string().yellow().to_string()),
            Value::Number(n) => Ok(n.to_string().cyan().to_string()),
            Value::String(s) => Ok(format!("\"{}\"", s.green())),
            Value::Array(arr) => {
                if arr.is_empty() {
                    return Ok("[]".to_string());
                }

                let mut result = "[\n".to_string();
                for (i, item) in arr.iter().enumerate() {
                    result.push_str(&next_indent_str);
                    result.push_str(&format_value(item, indent + 1)?);
                    if i < arr.len() - 1 {
                        result.push(',');
                    }
                    result.push('\n');
                }
                result.push_str(&indent_str);
                result.push(']');
                Ok(result)
            }
            Value::Object(obj) => {
                if obj.is_empty() {
                    return Ok("{}".to_string());
                }

                let mut result = "{\n".to_string();
                for (i, (key, val)) in obj.iter().enumerate() {
                    result.push_str(&next_indent_str);
                    result.push_str(&format!("\"{}\": ", key.blue().bold()));
                    result.push_str(&format_value(val, indent + 1)?);
                    if i < obj.len() - 1 {
                        result.push(',');
                    }
                    result.push('\n');
                }
                result.push_str(&indent_str);
                result.push('}');
                Ok(result)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svckit_codegen::FileReport;

    fn report() -> GenerationReport {
        GenerationReport {
            app_name: "kv".to_string(),
            interface: "crate::pb::KvService".to_string(),
            methods: 1,
            files: vec![
                FileReport {
                    path: "src/service/mod.rs".to_string(),
                    generator: "service",
                    status: FileStatus::Created,
                    added: 3,
                    skipped: 0,
                    digest: Some("abc".to_string()),
                    stale: Vec::new(),
                },
                FileReport {
                    path: "src/autogen/rpc/mod.rs".to_string(),
                    generator: "rpc_registry",
                    status: FileStatus::Updated { added: 1 },
                    added: 1,
                    skipped: 4,
                    digest: Some("def".to_string()),
                    stale: vec!["handlers()".to_string()],
                },
                FileReport {
                    path: "src/main.rs".to_string(),
                    generator: "main",
                    status: FileStatus::Unchanged,
                    added: 0,
                    skipped: 6,
                    digest: Some("123".to_string()),
                    stale: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn test_format_output_json() {
        let output = format_output(&report(), OutputFormat::Json).unwrap();
        assert!(output.contains("\"app_name\": \"kv\""));
        assert!(output.contains("\"generator\": \"rpc_registry\""));
    }

    #[test]
    fn test_format_output_text_is_compact() {
        let output = format_output(&report(), OutputFormat::Text).unwrap();
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_format_output_pretty() {
        let output = format_output(&report(), OutputFormat::Pretty).unwrap();
        assert!(output.contains("app_name"));
    }

    #[test]
    fn test_text_report() {
        let output = format_report(&report(), OutputFormat::Text, false).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], "created src/service/mod.rs (3 declarations)");
        assert_eq!(lines[1], "updated src/autogen/rpc/mod.rs (1 declaration) [stale: handlers()]");
        assert_eq!(lines[2], "unchanged src/main.rs");
        assert_eq!(lines[3], "1 created, 1 updated, 1 unchanged");
    }

    #[test]
    fn test_pretty_report() {
        colored::control::set_override(false);
        let output = format_report(&report(), OutputFormat::Pretty, false).unwrap();
        assert!(output.contains("Service: kv (crate::pb::KvService)"));
        assert!(output.contains("updated src/autogen/rpc/mod.rs (+1 declaration)"));
        assert!(output.contains("stale: handlers() lists old methods"));
        assert!(output.contains("1 created, 1 updated, 1 unchanged"));

        let output = format_report(&report(), OutputFormat::Pretty, true).unwrap();
        assert!(output.contains("Dry run:"));
        assert!(output.contains("nothing written"));
    }

    #[test]
    fn test_pretty_format_value_empty_collections() {
        colored::control::set_override(false);
        let output = format_output(&serde_json::json!({"a": [], "b": {}}), OutputFormat::Pretty).unwrap();
        assert!(output.contains("[]"));
        assert!(output.contains("{}"));
    }
}
