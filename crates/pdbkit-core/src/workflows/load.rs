use crate::core::models::structure::Structure;
use crate::engine::config::LoaderConfig;
use crate::engine::error::LoadError;
use crate::engine::loader::PdbLoader;
use crate::engine::progress::{CancellationToken, ProgressReporter};
use tracing::{info, instrument};

/// Loads the structure named by a path, `file:` URL or network URL.
#[instrument(skip_all, name = "load_workflow", fields(source = %name))]
pub fn run(
    name: &str,
    config: &LoaderConfig,
    reporter: &ProgressReporter,
    cancellation: Option<CancellationToken>,
) -> Result<Structure, LoadError> {
    let mut loader = PdbLoader::new(config.clone());
    if let Some(token) = cancellation {
        loader = loader.with_cancellation(token);
    }

    let structure = loader.load(name, reporter)?;
    info!(
        entities = structure.entity_names().len(),
        symmetry_operations = structure.symmetry_operations().len(),
        "Load workflow finished"
    );
    Ok(structure)
}
