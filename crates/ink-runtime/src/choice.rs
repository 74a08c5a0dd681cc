use ink_core::{ContentId, InkPath};

use crate::callstack::Thread;

/// A choice offered to the player. The thread it was generated on is kept
/// by value so the choice can be followed even after that thread is popped.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub text: String,
    pub index: usize,
    pub target_path: Option<InkPath>,
    pub original_choice_path: InkPath,
    pub original_thread_index: usize,
    pub choice_point: Option<ContentId>,
    pub thread_at_generation: Option<Thread>,
}

impl Choice {
    /// False for choices restored without their origin thread.
    pub fn is_usable(&self) -> bool {
        self.choice_point.is_some() && self.thread_at_generation.is_some()
    }
}
