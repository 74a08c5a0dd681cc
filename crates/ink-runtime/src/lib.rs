mod callstack;
mod choice;
mod json;
mod state;
mod variables;

pub use callstack::{CallFrame, CallStack, FrameType, Pointer, Thread};
pub use choice::Choice;
pub use state::{split_head_tail_whitespace, StoryState, StoryStateOptions};
pub use variables::VariablesState;

#[cfg(test)]
pub(crate) mod test_support;
