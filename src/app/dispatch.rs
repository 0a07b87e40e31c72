use crate::cli::commands::{Cli, Commands};
use anyhow::{Context, Result, bail};
use nutrisight::Config;
use nutrisight::biometrics::watch_snapshot_from_str;
use nutrisight::gateway::{self, AppState};
use nutrisight::providers::Provider as _;
use std::path::PathBuf;
use tracing::info;

/// Offline frame-sequence driver: one coordinator, frames in order.
async fn run_analyze(config: &Config, frames: &[PathBuf], enrich: bool) -> Result<()> {
    let state = AppState::from_config(config);
    if !state.coordinator.classifier().provider().is_configured() {
        bail!("No Gemini API key configured. Set GEMINI_API_KEY or GOOGLE_API_KEY.");
    }

    let total = frames.len();
    for (index, path) in frames.iter().enumerate() {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read frame {}", path.display()))?;
        let outcome = state
            .coordinator
            .process_frame(&bytes)
            .await
            .with_context(|| format!("Failed to analyze frame {}", path.display()))?;

        println!(
            "[{}/{total}] {}: {} (stage: {}, action: {:?}, history: {}, buffered: {})",
            index + 1,
            path.display(),
            outcome.classification.status,
            outcome.state.action_progress,
            outcome.state.current_action,
            outcome.state.history_len,
            outcome.frames_buffered,
        );
        println!("    reply: {}", outcome.raw_text().trim());

        if let Some(entry) = &outcome.committed {
            println!(
                "    ✓ committed {} [{}] {} ({} kcal)",
                entry.id, entry.action_type, entry.title, entry.macros.calories
            );
            if enrich && let Some((name, category)) = outcome.enrichment_target() {
                match state.enrichment.lookup(name, category).await {
                    Some(info) => println!("    info: {}", serde_json::to_string(&info)?),
                    None => println!("    info: none found"),
                }
            }
        }
    }

    let summary = state.coordinator.summary().await;
    println!("\n{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            let port = port.unwrap_or(config.gateway.port);
            info!(%host, port, model = %config.classifier.model, "Starting gateway");
            gateway::run_gateway(&host, port, config).await
        }
        Commands::Analyze { frames, enrich } => run_analyze(&config, &frames, enrich).await,
        Commands::WatchData { override_json } => {
            let data = watch_snapshot_from_str(override_json.as_deref());
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(())
        }
    }
}
