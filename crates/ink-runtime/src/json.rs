use std::collections::BTreeMap;

use ink_core::{
    CallStackDocument, ChoiceDocument, ControlCommand, FrameDocument, Glue, GlueKind, InkError,
    InkPath, RuntimeObject, StoryGraph, Text, ThreadDocument, VariablePointer,
};
use serde_json::{json, Map, Value};

use crate::callstack::{CallFrame, CallStack, FrameType, Pointer, Thread};
use crate::choice::Choice;

const DIVERT_TARGET_KEY: &str = "^->";
const VARIABLE_POINTER_KEY: &str = "^var";
const CONTEXT_INDEX_KEY: &str = "ci";
const CONTENT_REF_KEY: &str = "^ref";
const VOID_TOKEN: &str = "void";
const GLUE_KINDS: [GlueKind; 3] = [GlueKind::Left, GlueKind::Right, GlueKind::Bidirectional];

fn invalid_object(value: &Value) -> InkError {
    InkError::new(
        "SAVE_OBJECT_INVALID",
        format!("Unrecognised runtime object encoding: {}", value),
    )
}

fn invalid_format(message: impl Into<String>) -> InkError {
    InkError::new("SAVE_FORMAT_INVALID", message)
}

fn resolve(graph: &dyn StoryGraph, raw: &str) -> Result<ink_core::ContentId, InkError> {
    graph.resolve_path(&InkPath::parse(raw)?)
}

pub(crate) fn object_to_json(object: &RuntimeObject, graph: &dyn StoryGraph) -> Value {
    match object {
        RuntimeObject::Text(text) if text.is_newline() => json!("\n"),
        RuntimeObject::Text(text) => Value::String(format!("^{}", text.value)),
        RuntimeObject::Int(value) => json!(value),
        RuntimeObject::Float(value) => json!(value),
        RuntimeObject::Glue(glue) => match glue.parent {
            None => json!(glue.kind.token()),
            Some(parent) => {
                let mut map = Map::new();
                map.insert(
                    glue.kind.token().to_string(),
                    Value::String(graph.path_of(parent).to_string()),
                );
                Value::Object(map)
            }
        },
        RuntimeObject::Control(command) => json!(command.name()),
        RuntimeObject::DivertTarget(path) => json!({ DIVERT_TARGET_KEY: path.to_string() }),
        RuntimeObject::VariablePointer(pointer) => json!({
            VARIABLE_POINTER_KEY: pointer.name,
            CONTEXT_INDEX_KEY: pointer.context_index,
        }),
        RuntimeObject::Content(id) => json!({ CONTENT_REF_KEY: graph.path_of(*id).to_string() }),
        RuntimeObject::Void => json!(VOID_TOKEN),
    }
}

pub(crate) fn object_from_json(
    value: &Value,
    graph: &dyn StoryGraph,
) -> Result<RuntimeObject, InkError> {
    match value {
        Value::String(raw) => {
            if let Some(text) = raw.strip_prefix('^') {
                return Ok(RuntimeObject::text(text));
            }
            if raw == "\n" {
                return Ok(RuntimeObject::Text(Text::newline()));
            }
            if raw == VOID_TOKEN {
                return Ok(RuntimeObject::Void);
            }
            if let Some(kind) = GlueKind::from_token(raw) {
                return Ok(RuntimeObject::glue(kind));
            }
            ControlCommand::from_name(raw)
                .map(RuntimeObject::Control)
                .ok_or_else(|| invalid_object(value))
        }
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return i32::try_from(int)
                    .map(RuntimeObject::Int)
                    .map_err(|_| invalid_object(value));
            }
            number
                .as_f64()
                .map(RuntimeObject::Float)
                .ok_or_else(|| invalid_object(value))
        }
        Value::Object(map) => {
            if let Some(target) = map.get(DIVERT_TARGET_KEY).and_then(Value::as_str) {
                return Ok(RuntimeObject::DivertTarget(InkPath::parse(target)?));
            }
            if let Some(name) = map.get(VARIABLE_POINTER_KEY).and_then(Value::as_str) {
                let context_index = map
                    .get(CONTEXT_INDEX_KEY)
                    .and_then(Value::as_i64)
                    .and_then(|index| i32::try_from(index).ok())
                    .unwrap_or(-1);
                return Ok(RuntimeObject::VariablePointer(VariablePointer::new(
                    name,
                    context_index,
                )));
            }
            if let Some(path) = map.get(CONTENT_REF_KEY).and_then(Value::as_str) {
                return Ok(RuntimeObject::Content(resolve(graph, path)?));
            }
            for kind in GLUE_KINDS {
                if let Some(parent) = map.get(kind.token()).and_then(Value::as_str) {
                    return Ok(RuntimeObject::Glue(Glue::with_parent(
                        kind,
                        resolve(graph, parent)?,
                    )));
                }
            }
            Err(invalid_object(value))
        }
        _ => Err(invalid_object(value)),
    }
}

pub(crate) fn objects_to_json(objects: &[RuntimeObject], graph: &dyn StoryGraph) -> Vec<Value> {
    objects
        .iter()
        .map(|object| object_to_json(object, graph))
        .collect()
}

pub(crate) fn objects_from_json(
    values: &[Value],
    graph: &dyn StoryGraph,
) -> Result<Vec<RuntimeObject>, InkError> {
    values
        .iter()
        .map(|value| object_from_json(value, graph))
        .collect()
}

pub(crate) fn object_map_to_json(
    objects: &BTreeMap<String, RuntimeObject>,
    graph: &dyn StoryGraph,
) -> BTreeMap<String, Value> {
    objects
        .iter()
        .map(|(name, object)| (name.clone(), object_to_json(object, graph)))
        .collect()
}

pub(crate) fn object_map_from_json(
    values: &BTreeMap<String, Value>,
    graph: &dyn StoryGraph,
) -> Result<BTreeMap<String, RuntimeObject>, InkError> {
    values
        .iter()
        .map(|(name, value)| Ok((name.clone(), object_from_json(value, graph)?)))
        .collect()
}

fn frame_to_document(frame: &CallFrame, graph: &dyn StoryGraph) -> FrameDocument {
    FrameDocument {
        container_path: frame
            .current_container()
            .map(|container| graph.path_of(container)),
        idx: frame.current_content_index(),
        exp: frame.in_expression_evaluation,
        frame_type: frame.frame_type.code(),
        temp: object_map_to_json(&frame.temporary_variables, graph),
    }
}

fn frame_from_document(
    document: &FrameDocument,
    graph: &dyn StoryGraph,
) -> Result<CallFrame, InkError> {
    let frame_type = FrameType::from_code(document.frame_type).ok_or_else(|| {
        invalid_format(format!("Unknown call frame type {}.", document.frame_type))
    })?;
    let container = document
        .container_path
        .as_ref()
        .map(|path| graph.resolve_path(path))
        .transpose()?;

    Ok(CallFrame {
        pointer: Pointer {
            container,
            index: document.idx,
        },
        in_expression_evaluation: document.exp,
        temporary_variables: object_map_from_json(&document.temp, graph)?,
        frame_type,
    })
}

pub(crate) fn thread_to_document(thread: &Thread, graph: &dyn StoryGraph) -> ThreadDocument {
    ThreadDocument {
        callstack: thread
            .frames()
            .map(|frame| frame_to_document(frame, graph))
            .collect(),
        thread_index: thread.thread_index,
        previous_content_object: thread
            .previous_content_object
            .map(|object| graph.path_of(object)),
    }
}

pub(crate) fn thread_from_document(
    document: &ThreadDocument,
    graph: &dyn StoryGraph,
) -> Result<Thread, InkError> {
    let frames = document
        .callstack
        .iter()
        .map(|frame| frame_from_document(frame, graph))
        .collect::<Result<Vec<_>, _>>()?;
    let previous_content_object = document
        .previous_content_object
        .as_ref()
        .map(|path| graph.resolve_path(path))
        .transpose()?;

    Thread::from_frames(frames, document.thread_index, previous_content_object).ok_or_else(|| {
        invalid_format(format!(
            "Thread {} has no call frames.",
            document.thread_index
        ))
    })
}

pub(crate) fn call_stack_to_document(
    call_stack: &CallStack,
    graph: &dyn StoryGraph,
) -> CallStackDocument {
    CallStackDocument {
        threads: call_stack
            .threads()
            .map(|thread| thread_to_document(thread, graph))
            .collect(),
        thread_counter: call_stack.thread_counter(),
    }
}

pub(crate) fn call_stack_from_document(
    document: &CallStackDocument,
    graph: &dyn StoryGraph,
) -> Result<CallStack, InkError> {
    let threads = document
        .threads
        .iter()
        .map(|thread| thread_from_document(thread, graph))
        .collect::<Result<Vec<_>, _>>()?;
    CallStack::from_threads(threads, document.thread_counter)
        .ok_or_else(|| invalid_format("Call stack has no threads."))
}

pub(crate) fn choice_to_document(choice: &Choice, graph: &dyn StoryGraph) -> ChoiceDocument {
    ChoiceDocument {
        text: choice.text.clone(),
        index: choice.index,
        original_choice_path: choice
            .choice_point
            .map(|point| graph.path_of(point))
            .unwrap_or_else(|| choice.original_choice_path.clone()),
        original_thread_index: choice.original_thread_index,
        target_path: choice.target_path.clone(),
    }
}
