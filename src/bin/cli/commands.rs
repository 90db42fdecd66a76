//! Command Execution Logic

use std::sync::Arc;

use owo_colors::OwoColorize;
use tabled::{settings::Style as TableStyle, Table, Tabled};
use tracing::{debug, info};

use crate::cli::args::{InlineArgs, RunArgs};
use crate::cli::config_layer::build_layered_config;
use envinline::core::pipeline::{
    discover, registry_from_config, ConsoleReporter, DiscoveryOptions, InlinePipeline,
};
use envinline::lang::registry::registered_languages;
use envinline::{BuildEvent, InlinerConfig, RunOutcome};

/// Run the pipeline for the requested hook and exit non-zero when the build fails.
pub async fn run_command(args: RunArgs, verbose: bool) -> anyhow::Result<()> {
    let config = build_layered_config(&args.inline, verbose)?;
    let event = args
        .event
        .as_deref()
        .map(BuildEvent::from)
        .unwrap_or_else(|| config.build_event.clone());

    let reporter = Arc::new(ConsoleReporter::new());
    let registry = registry_from_config(&config);
    let pipeline = InlinePipeline::new(config, registry, reporter.clone());

    match pipeline.on_event(&event).await {
        None => {
            info!(
                "Nothing to do for {} (configured for {})",
                event,
                pipeline.config().build_event
            );
        }
        Some(RunOutcome::Failed { attempted, .. }) => {
            debug!("Run failed after attempting {attempted} file(s)");
        }
        Some(outcome) => debug!("Run finished: {outcome:?}"),
    }

    if reporter.build_failed() {
        std::process::exit(1);
    }
    Ok(())
}

/// Print the files a run would rewrite, one per line.
pub async fn discover_command(args: InlineArgs, verbose: bool) -> anyhow::Result<()> {
    let config = build_layered_config(&args, verbose)?;
    let registry = registry_from_config(&config);
    let options = DiscoveryOptions {
        inline_all: config.inline_all,
        functions_src: config.functions_src.clone(),
    };

    let files = discover(registry.as_ref(), &options)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    for file in &files {
        println!("{}", file.display());
    }
    info!("{} file(s) would be rewritten", files.len());
    Ok(())
}

/// Print default configuration in YAML format
pub async fn print_default_config() -> anyhow::Result<()> {
    println!("{}", "# Default envinline configuration".dimmed());
    println!("{}", "# Save this to .envinline.yml and customize as needed".dimmed());
    println!(
        "{}",
        "# Usage: envinline run --config your-config.yml".dimmed()
    );
    println!();

    let config = InlinerConfig::default();
    println!("{}", config.to_yaml_string()?);

    Ok(())
}

/// List supported source kinds
pub async fn list_languages() -> anyhow::Result<()> {
    println!("{}", "Supported Source Kinds".bright_blue().bold());
    println!("   Found {} source kinds", registered_languages().len());
    println!();

    #[derive(Tabled)]
    struct LanguageRow {
        language: String,
        extensions: String,
        notes: String,
    }

    let rows: Vec<LanguageRow> = registered_languages()
        .iter()
        .map(|info| LanguageRow {
            language: info.name.to_string(),
            extensions: info
                .extensions
                .iter()
                .map(|ext| format!(".{ext}"))
                .collect::<Vec<_>>()
                .join(", "),
            notes: info.notes.to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{}", table);

    Ok(())
}
