//! `sift rules`: list manual cleaning rules

use crate::config::Config;
use crate::error::{Result, SiftError};
use crate::rules::{FilterRule, RuleSet, RuleSummary};
use colored::Colorize;
use prettytable::{format, row, Table};
use serde::Serialize;

#[derive(Serialize)]
struct RulesReport<'a> {
    rules: &'a [FilterRule],
    summary: RuleSummary,
}

/// List the configured rules with their summary
///
/// # Errors
///
/// Returns `SiftError::Serialization` if JSON output fails
pub fn list_rules(config: &Config, json: bool) -> Result<()> {
    let rules = RuleSet::new(config.rules.clone());
    tracing::debug!("Listing {} rules", rules.rules().len());

    if json {
        let report = RulesReport {
            rules: rules.rules(),
            summary: rules.summary(),
        };
        let output = serde_json::to_string_pretty(&report).map_err(SiftError::from)?;
        println!("{}", output);
        return Ok(());
    }

    if rules.rules().is_empty() {
        println!("{}", "No rules configured.".yellow());
        return Ok(());
    }

    println!("\nManual cleaning rules:\n");
    rules_table(&rules).printstd();
    let summary = rules.summary();
    println!(
        "\nActive: {}  Keep: {}  Remove: {}\n",
        summary.active,
        summary.keep.to_string().green(),
        summary.remove.to_string().red()
    );
    Ok(())
}

fn rules_table(rules: &RuleSet) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row!["ID", "Name", "Condition", "Value", "Action", "Enabled"]);
    for rule in rules.rules() {
        let enabled = if rule.enabled { "yes" } else { "no" };
        table.add_row(row![
            rule.id,
            rule.name,
            rule.condition,
            rule.value,
            rule.action,
            enabled
        ]);
    }
    table
}
