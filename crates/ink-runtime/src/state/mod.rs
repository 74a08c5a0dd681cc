mod counters;
mod eval_stack;
mod lifecycle;
mod output;
mod rng;
mod snapshot;


use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ink_core::{
    ContentId, ControlCommand, Glue, InkError, InkPath, RuntimeObject, StoryGraph, Text,
    INK_FORMAT_VERSION_CURRENT,
};
use tracing::{debug, warn};

use crate::callstack::{CallStack, Pointer};
use crate::choice::Choice;
use crate::variables::VariablesState;

pub use output::split_head_tail_whitespace;

#[derive(Debug, Clone, Default)]
pub struct StoryStateOptions {
    /// Fixed replay seed. `None` seeds from the wall clock.
    pub story_seed: Option<i32>,
    pub ink_format_version: Option<i32>,
}

/// Everything needed to pause and resume a story: position, stacks, output,
/// choices and counters. The compiled graph is shared; everything else is
/// owned, so `copy()` is a plain deep clone.
#[derive(Clone)]
pub struct StoryState {
    graph: Arc<dyn StoryGraph>,
    output_stream: Vec<RuntimeObject>,
    /// Index of the open right glue in `output_stream`.
    current_right_glue: Option<usize>,
    call_stack: CallStack,
    variables_state: VariablesState,
    evaluation_stack: Vec<RuntimeObject>,
    current_choices: Vec<Choice>,
    current_errors: Vec<String>,
    visit_counts: BTreeMap<String, u32>,
    turn_indices: BTreeMap<String, u32>,
    current_turn_index: u32,
    story_seed: i32,
    ink_format_version: i32,
    diverted_target: Option<ContentId>,
    did_safe_exit: bool,
}

impl fmt::Debug for StoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoryState")
            .field("output_stream", &self.output_stream)
            .field("current_right_glue", &self.current_right_glue)
            .field("call_stack", &self.call_stack)
            .field("variables_state", &self.variables_state)
            .field("evaluation_stack", &self.evaluation_stack)
            .field("current_choices", &self.current_choices)
            .field("current_errors", &self.current_errors)
            .field("visit_counts", &self.visit_counts)
            .field("turn_indices", &self.turn_indices)
            .field("current_turn_index", &self.current_turn_index)
            .field("story_seed", &self.story_seed)
            .field("diverted_target", &self.diverted_target)
            .field("did_safe_exit", &self.did_safe_exit)
            .finish_non_exhaustive()
    }
}
