use super::*;

impl StoryState {
    pub fn new(graph: Arc<dyn StoryGraph>, options: StoryStateOptions) -> Self {
        let root = graph.root_container();
        let story_seed = options.story_seed.unwrap_or_else(rng::seed_from_clock);
        let mut state = Self {
            graph,
            output_stream: Vec::new(),
            current_right_glue: None,
            call_stack: CallStack::new(root),
            variables_state: VariablesState::new(),
            evaluation_stack: Vec::new(),
            current_choices: Vec::new(),
            current_errors: Vec::new(),
            visit_counts: BTreeMap::new(),
            turn_indices: BTreeMap::new(),
            current_turn_index: 0,
            story_seed,
            ink_format_version: options
                .ink_format_version
                .unwrap_or(INK_FORMAT_VERSION_CURRENT),
            diverted_target: None,
            did_safe_exit: false,
        };
        state.go_to_start();
        state
    }

    /// Independent copy for speculative stepping. Graph handles are shared,
    /// all mutable state is duplicated.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn graph(&self) -> &dyn StoryGraph {
        self.graph.as_ref()
    }

    pub fn go_to_start(&mut self) {
        let main = self.graph.main_container();
        self.call_stack.current_frame_mut().pointer = Pointer::start_of(main);
    }

    pub fn call_stack(&self) -> &CallStack {
        &self.call_stack
    }

    pub fn call_stack_mut(&mut self) -> &mut CallStack {
        &mut self.call_stack
    }

    pub fn variables_state(&self) -> &VariablesState {
        &self.variables_state
    }

    pub fn variable(&self, name: &str) -> Option<RuntimeObject> {
        self.variables_state
            .get_variable_with_name(&self.call_stack, name)
    }

    pub fn assign_variable(
        &mut self,
        name: &str,
        value: RuntimeObject,
        is_new_declaration: bool,
        is_global: bool,
    ) -> Result<(), InkError> {
        self.variables_state.assign(
            &mut self.call_stack,
            name,
            value,
            is_new_declaration,
            is_global,
        )
    }

    pub fn current_container(&self) -> Option<ContentId> {
        self.call_stack.current_frame().current_container()
    }

    pub fn current_content_index(&self) -> usize {
        self.call_stack.current_frame().current_content_index()
    }

    pub fn current_content_object(&self) -> Option<ContentId> {
        self.call_stack
            .current_frame()
            .current_object(self.graph.as_ref())
    }

    pub fn set_current_content_object(&mut self, object: Option<ContentId>) {
        let graph = Arc::clone(&self.graph);
        self.call_stack
            .current_frame_mut()
            .set_current_object(graph.as_ref(), object);
    }

    pub fn current_path(&self) -> Option<InkPath> {
        self.current_content_object()
            .map(|object| self.graph.path_of(object))
    }

    pub fn set_current_path(&mut self, path: Option<&InkPath>) -> Result<(), InkError> {
        let object = path
            .map(|path| self.graph.resolve_path(path))
            .transpose()?;
        self.set_current_content_object(object);
        Ok(())
    }

    pub fn previous_content_object(&self) -> Option<ContentId> {
        self.call_stack.current_thread().previous_content_object
    }

    pub fn set_previous_content_object(&mut self, object: Option<ContentId>) {
        self.call_stack.current_thread_mut().previous_content_object = object;
    }

    pub fn in_expression_evaluation(&self) -> bool {
        self.call_stack.current_frame().in_expression_evaluation
    }

    pub fn set_in_expression_evaluation(&mut self, value: bool) {
        self.call_stack.current_frame_mut().in_expression_evaluation = value;
    }

    pub fn diverted_target(&self) -> Option<ContentId> {
        self.diverted_target
    }

    pub fn set_diverted_target(&mut self, target: Option<ContentId>) {
        self.diverted_target = target;
    }

    pub fn did_safe_exit(&self) -> bool {
        self.did_safe_exit
    }

    pub fn set_did_safe_exit(&mut self, value: bool) {
        self.did_safe_exit = value;
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("story error: {}", message);
        self.current_errors.push(message);
    }

    pub fn has_error(&self) -> bool {
        !self.current_errors.is_empty()
    }

    pub fn current_errors(&self) -> &[String] {
        &self.current_errors
    }

    pub fn reset_errors(&mut self) {
        self.current_errors.clear();
    }

    pub fn current_choices(&self) -> &[Choice] {
        &self.current_choices
    }

    /// Offers a choice generated on the current thread. The thread is
    /// captured by value so the choice survives the thread being popped.
    pub fn add_choice(
        &mut self,
        text: impl Into<String>,
        choice_point: ContentId,
        target_path: Option<InkPath>,
    ) -> usize {
        let thread = self.call_stack.current_thread().clone();
        let index = self.current_choices.len();
        self.current_choices.push(Choice {
            text: text.into(),
            index,
            target_path,
            original_choice_path: self.graph.path_of(choice_point),
            original_thread_index: thread.thread_index,
            choice_point: Some(choice_point),
            thread_at_generation: Some(thread),
        });
        index
    }

    /// Stops the flow where it is: drops every poppable thread and frame
    /// and all pending choices.
    pub fn force_end_flow(&mut self) {
        self.set_current_content_object(None);
        self.call_stack.unwind();
        self.current_choices.clear();
        self.did_safe_exit = true;
    }

    /// Moves to `path` after a choice was taken and starts a new turn.
    pub fn set_chosen_path(&mut self, path: &InkPath) -> Result<(), InkError> {
        let target = self.graph.resolve_path(path)?;
        self.current_choices.clear();
        self.set_current_content_object(Some(target));
        self.current_turn_index += 1;
        Ok(())
    }
}
