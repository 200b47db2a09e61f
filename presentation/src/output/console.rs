//! Console output formatter for configuration and batch results

use colored::Colorize;
use leadforge_application::{BatchSummary, ResolvedConfig};
use leadforge_domain::{CatalogEntry, ConfigValue, RunState, ValidationErrors};
use std::path::PathBuf;

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Effective configuration with the layer each key came from
    pub fn format_config(resolved: &ResolvedConfig) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Effective Configuration"));
        output.push('\n');

        output.push_str(&Self::section_header("Layers (lowest precedence first)"));
        for layer in &resolved.layers {
            let location = match &layer.origin {
                Some(path) => path.display().to_string(),
                None if layer.keys > 0 => "(command line)".dimmed().to_string(),
                None => "not found".yellow().to_string(),
            };
            output.push_str(&format!(
                "  {:<9} {:<40} {:>3} keys  {}\n",
                layer.kind.as_str().cyan(),
                layer.artifact,
                layer.keys,
                location
            ));
        }

        output.push_str(&Self::section_header("Values"));
        let width = resolved
            .effective
            .iter()
            .map(|(k, _)| k.len())
            .max()
            .unwrap_or(0);
        for (key, value) in resolved.effective.iter() {
            let origin = resolved
                .effective
                .origin(key)
                .map(|kind| kind.as_str())
                .unwrap_or("?");
            output.push_str(&format!(
                "  {:<width$} = {}  {}\n",
                key,
                Self::render_value(value),
                format!("[{origin}]").dimmed(),
                width = width
            ));
        }

        output
    }

    /// Effective configuration as JSON: values, origins and layers
    pub fn format_config_json(resolved: &ResolvedConfig) -> String {
        let values: serde_json::Map<String, serde_json::Value> = resolved
            .effective
            .iter()
            .map(|(k, v)| {
                (
                    k.clone(),
                    serde_json::to_value(v).unwrap_or(serde_json::Value::Null),
                )
            })
            .collect();
        let origins: serde_json::Map<String, serde_json::Value> = resolved
            .effective
            .iter()
            .filter_map(|(k, _)| {
                resolved
                    .effective
                    .origin(k)
                    .map(|kind| (k.clone(), kind.as_str().into()))
            })
            .collect();
        let layers: Vec<serde_json::Value> = resolved
            .layers
            .iter()
            .map(|l| {
                serde_json::json!({
                    "kind": l.kind.as_str(),
                    "artifact": l.artifact,
                    "origin": l.origin.as_ref().map(|p| p.display().to_string()),
                    "keys": l.keys,
                })
            })
            .collect();

        serde_json::to_string_pretty(&serde_json::json!({
            "layers": layers,
            "values": values,
            "origins": origins,
        }))
        .unwrap_or_else(|_| "{}".to_string())
    }

    /// Where the next run would start
    pub fn format_run_state(state: &RunState) -> String {
        let mut output = Self::section_header("Run");
        output.push_str(&format!(
            "  {} {} / {} / {}\n",
            "Target:".bold(),
            state.environment,
            state.customer_type,
            state.city_code
        ));
        let epoch = if state.is_new_epoch() {
            "new numbering epoch".green().to_string()
        } else {
            format!("continuing after #{}", state.last_processed_index)
        };
        output.push_str(&format!(
            "  {} #{} to #{} ({} leads, {})\n",
            "Ordinals:".bold(),
            state.resume_index,
            state.final_ordinal(),
            state.lead_count,
            epoch
        ));
        output
    }

    /// Every validation problem, one per line
    pub fn format_validation(errors: &ValidationErrors) -> String {
        let mut output = format!(
            "{} {} problem(s) in run parameters:\n",
            "Error:".red().bold(),
            errors.len()
        );
        for error in errors.iter() {
            output.push_str(&format!("  {} {}\n", "*".red(), error));
        }
        output
    }

    /// Outcome of a batch
    pub fn format_summary(summary: &BatchSummary) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Lead Creation Summary"));
        output.push('\n');

        let status = if summary.completed {
            "completed".green().bold()
        } else {
            "stopped".red().bold()
        };
        output.push_str(&format!("{} {}\n", "Status:".cyan().bold(), status));
        output.push_str(&format!(
            "{} {}/{}\n",
            "Created:".cyan().bold(),
            summary.created(),
            summary.requested
        ));
        output.push_str(&format!(
            "{} #{} ({})\n",
            "Resume after:".cyan().bold(),
            summary.last_successful_ordinal,
            summary.run_date.format("%d-%m-%Y")
        ));
        if !summary.persisted {
            output.push_str(&format!(
                "{} resume position was not saved\n",
                "Warning:".yellow().bold()
            ));
        }
        if summary.audit_failures > 0 {
            output.push_str(&format!(
                "{} {} created lead(s) missing from the report\n",
                "Warning:".yellow().bold(),
                summary.audit_failures
            ));
        }
        if let Some(path) = &summary.report_path {
            output.push_str(&format!(
                "{} {}\n",
                "Report:".cyan().bold(),
                path.display()
            ));
        }

        if !summary.records.is_empty() {
            output.push_str(&Self::section_header("Leads"));
            for record in &summary.records {
                output.push_str(&format!(
                    "  #{:<3} {:<14} {:<14} {}\n",
                    record.ordinal, record.customer_id, record.project_id, record.dp_name
                ));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Result of catalog verification
    pub fn format_catalog_check(missing: &[CatalogEntry], searched: &[PathBuf]) -> String {
        let mut output = Self::section_header("Searched locations");
        for dir in searched {
            output.push_str(&format!("  {}\n", dir.display()));
        }
        output.push('\n');

        if missing.is_empty() {
            output.push_str(&format!(
                "{} every configured artifact is present\n",
                "OK:".green().bold()
            ));
            return output;
        }

        output.push_str(&format!(
            "{} {} artifact(s) not found:\n",
            "Missing:".red().bold(),
            missing.len()
        ));
        for entry in missing {
            output.push_str(&format!(
                "  {:<9} {:<5} {}\n",
                entry.kind.as_str(),
                entry.key,
                entry.artifact
            ));
        }
        output
    }

    fn render_value(value: &ConfigValue) -> String {
        match value.as_text() {
            Some(text) => text.to_string(),
            None => serde_json::to_string(value).unwrap_or_default(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadforge_application::LayerProvenance;
    use leadforge_domain::{ConfigLayer, EffectiveConfig, LayerKind, ValidationError};

    fn resolved() -> ResolvedConfig {
        let std = ConfigLayer::from_pairs(
            "standardConfig_HL.json",
            LayerKind::StandardByCustomerType,
            [("flow", "api"), ("region", "none")],
        );
        let run = ConfigLayer::from_pairs("run", LayerKind::RunParameters, [("region", "south")]);
        ResolvedConfig {
            effective: EffectiveConfig::merge(&[std, run]),
            layers: vec![LayerProvenance {
                kind: LayerKind::StandardByCustomerType,
                artifact: "standardConfig_HL.json".to_string(),
                origin: Some(PathBuf::from("/cfg/standardConfig_HL.json")),
                keys: 2,
            }],
        }
    }

    #[test]
    fn test_config_shows_origins() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::format_config(&resolved());
        assert!(output.contains("flow   = api  [standard]"));
        assert!(output.contains("region = south  [run]"));
        assert!(output.contains("/cfg/standardConfig_HL.json"));
    }

    #[test]
    fn test_config_json() {
        let json: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_config_json(&resolved())).unwrap();
        assert_eq!(json["values"]["region"], "south");
        assert_eq!(json["origins"]["region"], "run");
        assert_eq!(json["layers"][0]["keys"], 2);
    }

    #[test]
    fn test_validation_lists_every_problem() {
        colored::control::set_override(false);
        let errors = ValidationErrors(vec![
            ValidationError::InvalidMobilePrefix {
                found: "59".to_string(),
            },
            ValidationError::InvalidLeadCount {
                found: "0".to_string(),
            },
        ]);
        let output = ConsoleFormatter::format_validation(&errors);
        assert!(output.contains("2 problem(s)"));
        assert_eq!(output.lines().count(), 3);
    }

    #[test]
    fn test_catalog_check_ok() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::format_catalog_check(&[], &[PathBuf::from("/cfg")]);
        assert!(output.contains("every configured artifact is present"));
    }
}
