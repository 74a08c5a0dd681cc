use std::collections::BTreeMap;

use ink_core::{ContentId, InkError, RuntimeObject, StoryGraph};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameType {
    Tunnel,
    Function,
    ExternalFunction,
    Divert,
}

impl FrameType {
    pub fn code(self) -> u8 {
        match self {
            Self::Tunnel => 0,
            Self::Function => 1,
            Self::ExternalFunction => 2,
            Self::Divert => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Tunnel),
            1 => Some(Self::Function),
            2 => Some(Self::ExternalFunction),
            3 => Some(Self::Divert),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Tunnel => "TUNNEL",
            Self::Function => "FUNCTION",
            Self::ExternalFunction => "EXTERNAL FUNCTION",
            Self::Divert => "DIVERT",
        }
    }
}

/// Position inside the compiled graph: a container plus the index of the
/// content being executed in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pointer {
    pub container: Option<ContentId>,
    pub index: usize,
}

impl Pointer {
    pub fn start_of(container: ContentId) -> Self {
        Self {
            container: Some(container),
            index: 0,
        }
    }

    pub fn is_null(&self) -> bool {
        self.container.is_none()
    }

    pub fn resolve(&self, graph: &dyn StoryGraph) -> Option<ContentId> {
        graph.content_at(self.container?, self.index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallFrame {
    pub pointer: Pointer,
    pub in_expression_evaluation: bool,
    pub temporary_variables: BTreeMap<String, RuntimeObject>,
    pub frame_type: FrameType,
}

impl CallFrame {
    pub fn new(frame_type: FrameType, pointer: Pointer) -> Self {
        Self {
            pointer,
            in_expression_evaluation: false,
            temporary_variables: BTreeMap::new(),
            frame_type,
        }
    }

    pub fn current_container(&self) -> Option<ContentId> {
        self.pointer.container
    }

    pub fn current_content_index(&self) -> usize {
        self.pointer.index
    }

    pub fn current_object(&self, graph: &dyn StoryGraph) -> Option<ContentId> {
        self.pointer.resolve(graph)
    }

    /// Points the frame at `object`. Content is addressed through its parent
    /// container; a container without a parent becomes the container itself.
    pub fn set_current_object(&mut self, graph: &dyn StoryGraph, object: Option<ContentId>) {
        let Some(object) = object else {
            self.pointer = Pointer::default();
            return;
        };

        let located = graph
            .parent_of(object)
            .zip(graph.index_in_parent(object));
        self.pointer = match located {
            Some((parent, index)) => Pointer {
                container: Some(parent),
                index,
            },
            None => Pointer::start_of(object),
        };
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Thread {
    root: CallFrame,
    calls: Vec<CallFrame>,
    pub thread_index: usize,
    pub previous_content_object: Option<ContentId>,
}

impl Thread {
    pub fn new(root: CallFrame, thread_index: usize) -> Self {
        Self {
            root,
            calls: Vec::new(),
            thread_index,
            previous_content_object: None,
        }
    }

    /// Rebuilds a thread from its frames, root first. `None` when `frames`
    /// is empty.
    pub fn from_frames(
        frames: Vec<CallFrame>,
        thread_index: usize,
        previous_content_object: Option<ContentId>,
    ) -> Option<Self> {
        let mut frames = frames.into_iter();
        let root = frames.next()?;
        Some(Self {
            root,
            calls: frames.collect(),
            thread_index,
            previous_content_object,
        })
    }

    pub fn frames(&self) -> impl Iterator<Item = &CallFrame> {
        std::iter::once(&self.root).chain(self.calls.iter())
    }

    pub fn depth(&self) -> usize {
        self.calls.len() + 1
    }

    pub fn frame(&self, index: usize) -> Option<&CallFrame> {
        match index {
            0 => Some(&self.root),
            _ => self.calls.get(index - 1),
        }
    }

    pub fn frame_mut(&mut self, index: usize) -> Option<&mut CallFrame> {
        match index {
            0 => Some(&mut self.root),
            _ => self.calls.get_mut(index - 1),
        }
    }

    pub fn current_frame(&self) -> &CallFrame {
        self.calls.last().unwrap_or(&self.root)
    }

    pub fn current_frame_mut(&mut self) -> &mut CallFrame {
        self.calls.last_mut().unwrap_or(&mut self.root)
    }
}

/// Threads of call frames. The current thread is always the most recently
/// pushed one; the root thread and its root frame can never be popped.
#[derive(Debug, Clone, PartialEq)]
pub struct CallStack {
    background: Vec<Thread>,
    current: Thread,
    thread_counter: usize,
}

impl CallStack {
    pub fn new(root_container: ContentId) -> Self {
        Self {
            background: Vec::new(),
            current: Thread::new(
                CallFrame::new(FrameType::Divert, Pointer::start_of(root_container)),
                0,
            ),
            thread_counter: 0,
        }
    }

    /// Rebuilds a call stack from threads in push order. `None` when
    /// `threads` is empty.
    pub fn from_threads(mut threads: Vec<Thread>, thread_counter: usize) -> Option<Self> {
        let current = threads.pop()?;
        Some(Self {
            background: threads,
            current,
            thread_counter,
        })
    }

    pub fn threads(&self) -> impl Iterator<Item = &Thread> {
        self.background.iter().chain(std::iter::once(&self.current))
    }

    pub fn thread_count(&self) -> usize {
        self.background.len() + 1
    }

    pub fn thread_counter(&self) -> usize {
        self.thread_counter
    }

    pub fn current_thread(&self) -> &Thread {
        &self.current
    }

    pub fn current_thread_mut(&mut self) -> &mut Thread {
        &mut self.current
    }

    pub fn current_frame(&self) -> &CallFrame {
        self.current.current_frame()
    }

    pub fn current_frame_mut(&mut self) -> &mut CallFrame {
        self.current.current_frame_mut()
    }

    pub fn depth(&self) -> usize {
        self.current.depth()
    }

    pub fn current_frame_index(&self) -> usize {
        self.current.depth() - 1
    }

    pub fn push(&mut self, frame_type: FrameType) {
        let pointer = self.current_frame().pointer;
        self.current.calls.push(CallFrame::new(frame_type, pointer));
    }

    pub fn can_pop(&self, frame_type: Option<FrameType>) -> bool {
        let Some(top) = self.current.calls.last() else {
            return false;
        };
        frame_type.map_or(true, |expected| top.frame_type == expected)
    }

    /// Pops the top frame. With `Some(frame_type)` the top frame must be of
    /// that type; on any failure the stack is left untouched.
    pub fn pop(&mut self, frame_type: Option<FrameType>) -> Result<CallFrame, InkError> {
        let top = self.current.calls.last().ok_or_else(|| {
            InkError::new(
                "CALLSTACK_POP_ROOT",
                "Cannot pop the root frame of the call stack.",
            )
        })?;

        if let Some(expected) = frame_type {
            if top.frame_type != expected {
                return Err(InkError::new(
                    "CALLSTACK_POP_MISMATCH",
                    format!(
                        "Mismatched pop: expected {:?} frame but found {:?}.",
                        expected, top.frame_type
                    ),
                ));
            }
        }

        self.current.calls.pop().ok_or_else(|| {
            InkError::new(
                "CALLSTACK_POP_ROOT",
                "Cannot pop the root frame of the call stack.",
            )
        })
    }

    pub fn push_thread(&mut self) {
        let forked = self.fork_thread();
        debug!("pushing thread {}", forked.thread_index);
        let previous = std::mem::replace(&mut self.current, forked);
        self.background.push(previous);
    }

    /// Copies the current thread under a fresh index without making it
    /// current.
    pub fn fork_thread(&mut self) -> Thread {
        self.thread_counter += 1;
        let mut forked = self.current.clone();
        forked.thread_index = self.thread_counter;
        forked
    }

    pub fn can_pop_thread(&self) -> bool {
        !self.background.is_empty()
            && self.current_frame().frame_type != FrameType::ExternalFunction
    }

    pub fn pop_thread(&mut self) -> Result<Thread, InkError> {
        if self.current_frame().frame_type == FrameType::ExternalFunction {
            return Err(InkError::new(
                "CALLSTACK_POP_THREAD",
                "Cannot pop a thread while an external function call is in progress.",
            ));
        }
        let previous = self.background.pop().ok_or_else(|| {
            InkError::new(
                "CALLSTACK_POP_THREAD",
                "Cannot pop the only remaining thread.",
            )
        })?;
        let popped = std::mem::replace(&mut self.current, previous);
        debug!("popped thread {}", popped.thread_index);
        Ok(popped)
    }

    /// Drops every poppable thread and frame, leaving the root frame of the
    /// remaining thread.
    pub fn unwind(&mut self) {
        while self.can_pop_thread() {
            let Some(previous) = self.background.pop() else {
                break;
            };
            self.current = previous;
        }
        self.current.calls.clear();
    }

    pub fn thread_with_index(&self, thread_index: usize) -> Option<&Thread> {
        self.threads()
            .find(|thread| thread.thread_index == thread_index)
    }

    /// 0 when `name` is not a temporary of the current frame, otherwise the
    /// current frame index + 1.
    pub fn context_for_variable_named(&self, name: &str) -> i32 {
        if self
            .current_frame()
            .temporary_variables
            .contains_key(name)
        {
            self.current_frame_index() as i32 + 1
        } else {
            0
        }
    }

    pub fn get_temporary_variable_with_name(
        &self,
        name: &str,
        context_index: i32,
    ) -> Option<&RuntimeObject> {
        let frame_index = self.frame_index_for_context(context_index)?;
        self.current
            .frame(frame_index)?
            .temporary_variables
            .get(name)
    }

    pub fn set_temporary_variable(
        &mut self,
        name: &str,
        value: RuntimeObject,
        declare_new: bool,
        context_index: i32,
    ) -> Result<(), InkError> {
        let frame = self
            .frame_index_for_context(context_index)
            .and_then(|frame_index| self.current.frame_mut(frame_index))
            .ok_or_else(|| {
                InkError::new(
                    "CALLSTACK_CONTEXT_INDEX",
                    format!("No call frame for context index {}.", context_index),
                )
            })?;

        if !declare_new && !frame.temporary_variables.contains_key(name) {
            return Err(InkError::new(
                "VARIABLE_NOT_FOUND",
                format!("Could not find temporary variable \"{}\" to set.", name),
            ));
        }

        frame.temporary_variables.insert(name.to_string(), value);
        Ok(())
    }

    fn frame_index_for_context(&self, context_index: i32) -> Option<usize> {
        if context_index == -1 {
            return Some(self.current_frame_index());
        }
        usize::try_from(context_index).ok()?.checked_sub(1)
    }

    pub fn call_stack_trace(&self, graph: &dyn StoryGraph) -> String {
        let mut trace = String::new();
        let total = self.thread_count();
        for (position, thread) in self.threads().enumerate() {
            let is_current = position + 1 == total;
            trace.push_str(&format!(
                "=== THREAD {}/{} {}===\n",
                position + 1,
                total,
                if is_current { "(current) " } else { "" }
            ));
            for frame in thread.frames() {
                let location = frame
                    .current_container()
                    .map(|container| graph.path_of(container).to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                trace.push_str(&format!(
                    "  [{}] {} @ {}\n",
                    frame.frame_type.label(),
                    location,
                    frame.current_content_index()
                ));
            }
        }
        trace
    }
}

#[cfg(test)]
mod callstack_tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn new_call_stack_has_one_root_frame() {
        let story = sample_story();
        let stack = CallStack::new(story.graph.root());
        assert_eq!(stack.thread_count(), 1);
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current_frame().frame_type, FrameType::Divert);
        assert!(!stack.can_pop(None));
        assert!(!stack.can_pop_thread());
    }

    #[test]
    fn pop_below_root_fails() {
        let story = sample_story();
        let mut stack = CallStack::new(story.graph.root());
        let error = stack.pop(None).expect_err("root pop should fail");
        assert_eq!(error.code, "CALLSTACK_POP_ROOT");
        assert!(error.is_fatal());
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn mismatched_pop_leaves_stack_unchanged() {
        let story = sample_story();
        let mut stack = CallStack::new(story.graph.root());
        stack.push(FrameType::Function);
        let before = stack.clone();

        let error = stack
            .pop(Some(FrameType::Tunnel))
            .expect_err("tunnel pop of function frame should fail");
        assert_eq!(error.code, "CALLSTACK_POP_MISMATCH");
        assert_eq!(stack, before);

        assert!(stack.can_pop(Some(FrameType::Function)));
        let popped = stack.pop(Some(FrameType::Function)).expect("function pop");
        assert_eq!(popped.frame_type, FrameType::Function);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn push_copies_pointer_but_not_expression_state() {
        let story = sample_story();
        let mut stack = CallStack::new(story.intro);
        stack.current_frame_mut().pointer.index = 2;
        stack.current_frame_mut().in_expression_evaluation = true;
        stack.push(FrameType::Tunnel);
        assert_eq!(
            stack.current_frame().pointer,
            Pointer {
                container: Some(story.intro),
                index: 2
            }
        );
        assert!(!stack.current_frame().in_expression_evaluation);
        assert_eq!(stack.current_frame_index(), 1);
    }

    #[test]
    fn threads_fork_with_fresh_indices_and_independent_frames() {
        let story = sample_story();
        let mut stack = CallStack::new(story.graph.root());
        stack.push_thread();
        assert_eq!(stack.thread_count(), 2);
        assert_eq!(stack.current_thread().thread_index, 1);

        stack.current_frame_mut().pointer.index = 5;
        stack.push(FrameType::Tunnel);
        let original = stack.thread_with_index(0).expect("root thread is live");
        assert_eq!(original.depth(), 1);
        assert_eq!(original.current_frame().pointer.index, 0);

        let forked = stack.fork_thread();
        assert_eq!(forked.thread_index, 2);
        assert_eq!(stack.thread_count(), 2);
        assert!(stack.thread_with_index(2).is_none());

        let popped = stack.pop_thread().expect("thread pop");
        assert_eq!(popped.thread_index, 1);
        assert_eq!(popped.depth(), 2);
        let error = stack.pop_thread().expect_err("last thread pop should fail");
        assert_eq!(error.code, "CALLSTACK_POP_THREAD");
        assert!(error.message.contains("only remaining thread"));
    }

    #[test]
    fn external_function_frame_blocks_thread_pop() {
        let story = sample_story();
        let mut stack = CallStack::new(story.graph.root());
        stack.push_thread();
        stack.push(FrameType::ExternalFunction);
        assert!(!stack.can_pop_thread());
        let error = stack.pop_thread().expect_err("external frame should block");
        assert_eq!(error.code, "CALLSTACK_POP_THREAD");
        assert!(error.message.contains("external function"));
        assert_eq!(stack.thread_count(), 2);

        stack.pop(Some(FrameType::ExternalFunction)).expect("pop external");
        assert!(stack.can_pop_thread());
    }

    #[test]
    fn unwind_returns_to_single_root_frame() {
        let story = sample_story();
        let mut stack = CallStack::new(story.graph.root());
        stack.push(FrameType::Tunnel);
        stack.push_thread();
        stack.push(FrameType::Function);
        stack.unwind();
        assert_eq!(stack.thread_count(), 1);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn temporary_variables_resolve_by_context_index() {
        let story = sample_story();
        let mut stack = CallStack::new(story.graph.root());
        stack
            .set_temporary_variable("x", RuntimeObject::Int(1), true, -1)
            .expect("declare in root");
        stack.push(FrameType::Function);
        stack
            .set_temporary_variable("x", RuntimeObject::Int(2), true, -1)
            .expect("declare in function");

        assert_eq!(stack.context_for_variable_named("x"), 2);
        assert_eq!(stack.context_for_variable_named("y"), 0);
        assert_eq!(
            stack.get_temporary_variable_with_name("x", 1),
            Some(&RuntimeObject::Int(1))
        );
        assert_eq!(
            stack.get_temporary_variable_with_name("x", -1),
            Some(&RuntimeObject::Int(2))
        );
        assert_eq!(stack.get_temporary_variable_with_name("x", 0), None);

        let missing = stack
            .set_temporary_variable("y", RuntimeObject::Int(3), false, -1)
            .expect_err("undeclared set should fail");
        assert_eq!(missing.code, "VARIABLE_NOT_FOUND");
        let bad_context = stack
            .set_temporary_variable("x", RuntimeObject::Int(3), true, 9)
            .expect_err("out of range context");
        assert_eq!(bad_context.code, "CALLSTACK_CONTEXT_INDEX");
    }

    #[test]
    fn set_current_object_addresses_content_through_parent() {
        let story = sample_story();
        let graph = story.graph.as_ref();
        let mut frame = CallFrame::new(FrameType::Divert, Pointer::start_of(graph.root()));
        frame.set_current_object(graph, Some(story.choice_point));
        assert_eq!(frame.current_container(), Some(story.intro));
        assert_eq!(frame.current_object(graph), Some(story.choice_point));

        frame.set_current_object(graph, Some(graph.root()));
        assert_eq!(frame.pointer, Pointer::start_of(graph.root()));

        frame.set_current_object(graph, None);
        assert!(frame.pointer.is_null());
        assert_eq!(frame.current_object(graph), None);
    }

    #[test]
    fn call_stack_trace_lists_every_thread() {
        let story = sample_story();
        let mut stack = CallStack::new(story.intro);
        stack.push(FrameType::Tunnel);
        stack.push_thread();
        let trace = stack.call_stack_trace(story.graph.as_ref());
        assert!(trace.contains("=== THREAD 1/2 ==="));
        assert!(trace.contains("=== THREAD 2/2 (current) ==="));
        assert!(trace.contains("[TUNNEL] intro @ 0"));
    }

    #[test]
    fn frame_type_codes_round_trip() {
        for frame_type in [
            FrameType::Tunnel,
            FrameType::Function,
            FrameType::ExternalFunction,
            FrameType::Divert,
        ] {
            assert_eq!(FrameType::from_code(frame_type.code()), Some(frame_type));
        }
        assert_eq!(FrameType::from_code(9), None);
    }
}
