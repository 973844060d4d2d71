//! `sift sources`: list configured data sources

use crate::config::Config;
use crate::error::{Result, SiftError};
use crate::sources::{DataSource, SourceCatalog, SourceStatus, SourceSummary};
use colored::Colorize;
use prettytable::{format, row, Table};
use serde::Serialize;

#[derive(Serialize)]
struct SourcesReport<'a> {
    sources: &'a [DataSource],
    summary: SourceSummary,
}

/// List the configured sources with their summary
///
/// # Errors
///
/// Returns `SiftError::Serialization` if JSON output fails
pub fn list_sources(config: &Config, json: bool) -> Result<()> {
    let catalog = SourceCatalog::new(config.sources.clone());
    tracing::debug!("Listing {} sources", catalog.sources().len());

    if json {
        let report = SourcesReport {
            sources: catalog.sources(),
            summary: catalog.summary(),
        };
        let output = serde_json::to_string_pretty(&report).map_err(SiftError::from)?;
        println!("{}", output);
        return Ok(());
    }

    if catalog.sources().is_empty() {
        println!("{}", "No data sources configured.".yellow());
        return Ok(());
    }

    println!("\nData sources:\n");
    sources_table(&catalog).printstd();
    let summary = catalog.summary();
    println!(
        "\nActive: {}  Total items: {}  Errors: {}\n",
        summary.active.to_string().green(),
        summary.total_items,
        summary.errored.to_string().red()
    );
    Ok(())
}

fn status_text(status: SourceStatus) -> String {
    match status {
        SourceStatus::Active => status.to_string().green().to_string(),
        SourceStatus::Inactive => status.to_string().yellow().to_string(),
        SourceStatus::Error => status.to_string().red().to_string(),
    }
}

fn sources_table(catalog: &SourceCatalog) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row!["ID", "Name", "Type", "Status", "Items", "Last Sync"]);
    for source in catalog.sources() {
        table.add_row(row![
            source.id,
            source.name,
            source.kind,
            status_text(source.status),
            source.item_count,
            source.last_sync
        ]);
    }
    table
}
