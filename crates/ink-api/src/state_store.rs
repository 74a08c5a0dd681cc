use std::fs;
use std::path::Path;

use ink_core::InkError;
use ink_runtime::StoryState;
use tracing::debug;

use crate::error_map::{map_state_encode, map_state_read, map_state_write};

pub(crate) fn save_state(path: &Path, state: &StoryState) -> Result<(), InkError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(map_state_write)?;

    let payload = serde_json::to_string_pretty(&state.to_document()).map_err(map_state_encode)?;
    fs::write(path, payload).map_err(map_state_write)?;
    debug!("wrote story state to {}", path.display());
    Ok(())
}

pub(crate) fn load_state(path: &Path, state: &mut StoryState) -> Result<(), InkError> {
    if !path.exists() {
        return Err(InkError::new(
            "API_STATE_NOT_FOUND",
            format!("State file does not exist: {}", path.display()),
        ));
    }

    let raw = fs::read_to_string(path).map_err(map_state_read)?;
    state.load_json(&raw)?;
    debug!("loaded story state from {}", path.display());
    Ok(())
}
