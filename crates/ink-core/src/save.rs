use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::path::InkPath;

/// Version written by `StoryState::to_json`.
pub const INK_SAVE_STATE_VERSION: i32 = 4;
/// Oldest save version that can still be loaded.
pub const MIN_COMPATIBLE_LOAD_VERSION: i32 = 4;
/// Compiled-story format version recorded alongside a save.
pub const INK_FORMAT_VERSION_CURRENT: i32 = 17;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStateDocument {
    pub ink_save_version: i32,
    pub ink_format_version: i32,
    pub callstack_threads: CallStackDocument,
    pub variables_state: BTreeMap<String, Value>,
    pub eval_stack: Vec<Value>,
    pub output_stream: Vec<Value>,
    pub current_choices: Vec<ChoiceDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_threads: Option<BTreeMap<String, ThreadDocument>>,
    #[serde(rename = "currRightGlue", default, skip_serializing_if = "Option::is_none")]
    pub curr_right_glue: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_divert_target: Option<InkPath>,
    pub visit_counts: BTreeMap<String, u32>,
    pub turn_indices: BTreeMap<String, u32>,
    #[serde(rename = "turnIdx")]
    pub turn_idx: u32,
    pub story_seed: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStackDocument {
    pub threads: Vec<ThreadDocument>,
    pub thread_counter: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadDocument {
    pub callstack: Vec<FrameDocument>,
    pub thread_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_content_object: Option<InkPath>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameDocument {
    #[serde(rename = "cPath", default, skip_serializing_if = "Option::is_none")]
    pub container_path: Option<InkPath>,
    pub idx: usize,
    pub exp: bool,
    #[serde(rename = "type")]
    pub frame_type: u8,
    #[serde(default)]
    pub temp: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceDocument {
    pub text: String,
    pub index: usize,
    pub original_choice_path: InkPath,
    pub original_thread_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_path: Option<InkPath>,
}
