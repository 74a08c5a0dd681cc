use ink_core::{
    SaveStateDocument, ThreadDocument, INK_SAVE_STATE_VERSION, MIN_COMPATIBLE_LOAD_VERSION,
};
use serde_json::Value;

use super::*;
use crate::callstack::Thread;
use crate::json::{
    call_stack_from_document, call_stack_to_document, choice_to_document, object_map_from_json,
    object_map_to_json, objects_from_json, objects_to_json, thread_from_document,
    thread_to_document,
};

fn format_incorrect() -> InkError {
    InkError::new(
        "SAVE_FORMAT_INCORRECT",
        "ink save format incorrect, can't load.",
    )
}

fn version_incompatible(version: i64) -> InkError {
    InkError::new(
        "SAVE_VERSION_INCOMPATIBLE",
        format!(
            "Ink save format isn't compatible with the current version (saw '{}', but minimum is {}), so can't load.",
            version, MIN_COMPATIBLE_LOAD_VERSION
        ),
    )
}

fn check_save_version(version: i64) -> Result<(), InkError> {
    if version < i64::from(MIN_COMPATIBLE_LOAD_VERSION) {
        return Err(version_incompatible(version));
    }
    Ok(())
}

/// Everything a load rebuilds, assembled before any of it replaces the
/// live state.
struct RestoredState {
    call_stack: CallStack,
    variables_state: VariablesState,
    evaluation_stack: Vec<RuntimeObject>,
    output_stream: Vec<RuntimeObject>,
    current_right_glue: Option<usize>,
    current_choices: Vec<Choice>,
    diverted_target: Option<ContentId>,
}

impl StoryState {
    pub fn to_document(&self) -> SaveStateDocument {
        let graph = self.graph.as_ref();

        let mut choice_threads = BTreeMap::new();
        for choice in &self.current_choices {
            let Some(thread) = &choice.thread_at_generation else {
                continue;
            };
            if self.call_stack.thread_with_index(thread.thread_index).is_none() {
                choice_threads.insert(
                    thread.thread_index.to_string(),
                    thread_to_document(thread, graph),
                );
            }
        }

        let curr_right_glue = self
            .current_right_glue
            .filter(|index| {
                self.output_stream
                    .get(*index)
                    .and_then(RuntimeObject::as_glue)
                    .is_some()
            })
            .map(|index| index as i64);

        SaveStateDocument {
            ink_save_version: INK_SAVE_STATE_VERSION,
            ink_format_version: self.ink_format_version,
            callstack_threads: call_stack_to_document(&self.call_stack, graph),
            variables_state: object_map_to_json(self.variables_state.globals(), graph),
            eval_stack: objects_to_json(&self.evaluation_stack, graph),
            output_stream: objects_to_json(&self.output_stream, graph),
            current_choices: self
                .current_choices
                .iter()
                .map(|choice| choice_to_document(choice, graph))
                .collect(),
            choice_threads: (!choice_threads.is_empty()).then_some(choice_threads),
            curr_right_glue,
            current_divert_target: self.diverted_target.map(|target| graph.path_of(target)),
            visit_counts: self.visit_counts.clone(),
            turn_indices: self.turn_indices.clone(),
            turn_idx: self.current_turn_index,
            story_seed: self.story_seed,
        }
    }

    pub fn to_json(&self) -> Result<String, InkError> {
        let document = self.to_document();
        let json = serde_json::to_string(&document).map_err(|error| {
            InkError::new(
                "SAVE_FORMAT_INVALID",
                format!("Failed to encode save state: {}", error),
            )
        })?;
        debug!(
            "saved state: {} bytes, {} choice threads",
            json.len(),
            document.choice_threads.as_ref().map_or(0, BTreeMap::len)
        );
        Ok(json)
    }

    /// Restores from a JSON save. On any error the current state is left
    /// as it was.
    pub fn load_json(&mut self, json: &str) -> Result<(), InkError> {
        let value: Value = serde_json::from_str(json).map_err(|error| {
            InkError::new(
                "SAVE_FORMAT_INVALID",
                format!("Save state is not valid JSON: {}", error),
            )
        })?;

        let version = value
            .get("inkSaveVersion")
            .and_then(Value::as_i64)
            .ok_or_else(format_incorrect)?;
        check_save_version(version)?;

        let document: SaveStateDocument = serde_json::from_value(value).map_err(|error| {
            InkError::new(
                "SAVE_FORMAT_INVALID",
                format!("Save state document is malformed: {}", error),
            )
        })?;
        self.load_document(document)
    }

    pub fn load_document(&mut self, document: SaveStateDocument) -> Result<(), InkError> {
        check_save_version(i64::from(document.ink_save_version))?;
        debug!(
            "loading save version {} (format {}), {} threads",
            document.ink_save_version,
            document.ink_format_version,
            document.callstack_threads.threads.len()
        );

        let restored = self.restore(&document)?;

        self.call_stack = restored.call_stack;
        self.variables_state = restored.variables_state;
        self.evaluation_stack = restored.evaluation_stack;
        self.output_stream = restored.output_stream;
        self.current_right_glue = restored.current_right_glue;
        self.current_choices = restored.current_choices;
        self.diverted_target = restored.diverted_target;
        self.visit_counts = document.visit_counts;
        self.turn_indices = document.turn_indices;
        self.current_turn_index = document.turn_idx;
        self.story_seed = document.story_seed;
        Ok(())
    }

    fn restore(&self, document: &SaveStateDocument) -> Result<RestoredState, InkError> {
        let graph = self.graph.as_ref();

        let call_stack = call_stack_from_document(&document.callstack_threads, graph)?;
        let variables_state =
            VariablesState::from_globals(object_map_from_json(&document.variables_state, graph)?);
        let evaluation_stack = objects_from_json(&document.eval_stack, graph)?;
        let output_stream = objects_from_json(&document.output_stream, graph)?;

        let current_right_glue = document.curr_right_glue.and_then(|position| {
            let index = usize::try_from(position).ok().filter(|index| {
                output_stream
                    .get(*index)
                    .and_then(RuntimeObject::as_glue)
                    .is_some_and(Glue::is_right)
            });
            if index.is_none() {
                warn!(
                    "dropping currRightGlue {}: no right glue at that position",
                    position
                );
            }
            index
        });

        let diverted_target = document
            .current_divert_target
            .as_ref()
            .map(|path| graph.resolve_path(path))
            .transpose()?;

        let mut current_choices = Vec::with_capacity(document.current_choices.len());
        for choice in &document.current_choices {
            let choice_point = graph.resolve_path(&choice.original_choice_path)?;
            let thread_at_generation = Self::restore_choice_thread(
                &call_stack,
                document.choice_threads.as_ref(),
                choice.original_thread_index,
                graph,
            )?;
            current_choices.push(Choice {
                text: choice.text.clone(),
                index: choice.index,
                target_path: choice.target_path.clone(),
                original_choice_path: choice.original_choice_path.clone(),
                original_thread_index: choice.original_thread_index,
                choice_point: Some(choice_point),
                thread_at_generation,
            });
        }

        Ok(RestoredState {
            call_stack,
            variables_state,
            evaluation_stack,
            output_stream,
            current_right_glue,
            current_choices,
            diverted_target,
        })
    }

    /// Live thread with the choice's index first, then the saved copy.
    fn restore_choice_thread(
        call_stack: &CallStack,
        choice_threads: Option<&BTreeMap<String, ThreadDocument>>,
        thread_index: usize,
        graph: &dyn StoryGraph,
    ) -> Result<Option<Thread>, InkError> {
        if let Some(thread) = call_stack.thread_with_index(thread_index) {
            return Ok(Some(thread.clone()));
        }
        let saved = choice_threads.and_then(|threads| threads.get(&thread_index.to_string()));
        match saved {
            Some(document) => thread_from_document(document, graph).map(Some),
            None => {
                warn!(
                    "choice thread {} is neither live nor saved; choice restored unusable",
                    thread_index
                );
                Ok(None)
            }
        }
    }
}
