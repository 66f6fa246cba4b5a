pub mod check;
pub mod pool;
pub mod stats;

use std::path::Path;

use ic_core::Actor;
use ic_rules::EngineConfig;

/// Read and prepare an actor file.
fn load_actor(path: &Path) -> Result<Actor, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Actor::from_json(&text).map_err(|e| format!("{}: {e}", path.display()))
}

/// Read a configuration file, or use the defaults.
fn load_config(path: Option<&Path>) -> Result<EngineConfig, String> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    EngineConfig::from_json(&text).map_err(|e| format!("{}: {e}", path.display()))
}

/// Split a comma separated argument, dropping empty entries.
fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
