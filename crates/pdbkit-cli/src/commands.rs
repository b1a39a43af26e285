pub mod bonds;
pub mod inspect;
pub mod symmetry;
pub mod symop;

use crate::cli::LoaderArgs;
use crate::config::PartialLoaderConfig;
use crate::error::{CliError, Result};
use crate::ui::{CliProgressHandler, UiEvent};
use pdbkit::core::models::structure::Structure;
use pdbkit::engine::progress::{CancellationToken, ProgressReporter};
use pdbkit::workflows;
use std::path::Path;
use tokio::sync::mpsc;
use tokio::task;
use tracing::{info, warn};

/// Resolves the loader configuration and loads `source` off the async runtime.
///
/// Ctrl-C during the load cancels it at the next line boundary.
pub async fn load_structure(
    source: &str,
    loader_args: &LoaderArgs,
    config_path: Option<&Path>,
    ui_sender: mpsc::Sender<UiEvent>,
) -> Result<Structure> {
    let partial_config = PartialLoaderConfig::load(config_path)?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(loader_args)?;

    let token = CancellationToken::new();
    let interrupt_token = token.clone();
    let interrupt_watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling the load.");
            interrupt_token.cancel();
        }
    });

    let handler = CliProgressHandler::new(ui_sender);
    let name = source.to_string();
    info!("Loading structure from {}", name);
    let result = task::spawn_blocking(move || {
        let reporter = ProgressReporter::with_callback(handler.get_callback());
        workflows::load::run(&name, &config, &reporter, Some(token))
    })
    .await;
    interrupt_watcher.abort();

    let structure = result.map_err(|e| CliError::Other(anyhow::anyhow!("Load task failed: {}", e)))??;
    Ok(structure)
}
