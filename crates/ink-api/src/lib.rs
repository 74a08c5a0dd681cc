mod error_map;
mod state_store;

use std::path::Path;
use std::sync::Arc;

pub use ink_core::{InkError, StoryGraph};

pub use ink_core::{
    ContentArena, ContentId, ContentKind, InkPath, RuntimeObject, SaveStateDocument,
    INK_SAVE_STATE_VERSION, MIN_COMPATIBLE_LOAD_VERSION,
};
pub use ink_runtime::{Choice, FrameType, StoryState, StoryStateOptions};

/// Fresh state positioned at the start of the graph's main container.
pub fn create_story_state(graph: Arc<dyn StoryGraph>, options: StoryStateOptions) -> StoryState {
    StoryState::new(graph, options)
}

pub fn save_state_to_json(state: &StoryState) -> Result<String, InkError> {
    state.to_json()
}

/// Replaces `state` with the saved one. `state` is unchanged on error.
pub fn load_state_from_json(state: &mut StoryState, json: &str) -> Result<(), InkError> {
    state.load_json(json)
}

pub fn save_state_to_file(path: &Path, state: &StoryState) -> Result<(), InkError> {
    state_store::save_state(path, state)
}

pub fn load_state_from_file(path: &Path, state: &mut StoryState) -> Result<(), InkError> {
    state_store::load_state(path, state)
}

#[cfg(test)]
mod tests;
