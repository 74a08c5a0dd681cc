use std::collections::{BTreeMap, BTreeSet};

use ink_core::{InkError, RuntimeObject, VariablePointer};

use crate::callstack::CallStack;

/// Global variables. Temporaries live in the call frames, so every lookup
/// takes the call stack it should consult.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariablesState {
    globals: BTreeMap<String, RuntimeObject>,
}

impl VariablesState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_globals(globals: BTreeMap<String, RuntimeObject>) -> Self {
        Self { globals }
    }

    pub fn globals(&self) -> &BTreeMap<String, RuntimeObject> {
        &self.globals
    }

    pub fn global_variable_exists(&self, name: &str) -> bool {
        self.globals.contains_key(name)
    }

    pub fn set_global(&mut self, name: impl Into<String>, value: RuntimeObject) {
        self.globals.insert(name.into(), value);
    }

    /// Value of `name`, following a variable pointer to its target.
    pub fn get_variable_with_name(
        &self,
        call_stack: &CallStack,
        name: &str,
    ) -> Option<RuntimeObject> {
        match self.get_raw_variable_with_name(call_stack, name, -1)? {
            RuntimeObject::VariablePointer(pointer) => {
                self.value_at_variable_pointer(call_stack, &pointer)
            }
            value => Some(value),
        }
    }

    pub fn get_raw_variable_with_name(
        &self,
        call_stack: &CallStack,
        name: &str,
        context_index: i32,
    ) -> Option<RuntimeObject> {
        if context_index == 0 || context_index == -1 {
            if let Some(value) = self.globals.get(name) {
                return Some(value.clone());
            }
        }
        if context_index == 0 {
            return None;
        }
        call_stack
            .get_temporary_variable_with_name(name, context_index)
            .cloned()
    }

    pub fn value_at_variable_pointer(
        &self,
        call_stack: &CallStack,
        pointer: &VariablePointer,
    ) -> Option<RuntimeObject> {
        self.get_raw_variable_with_name(call_stack, &pointer.name, pointer.context_index)
    }

    /// 0 for globals. Otherwise the context of the frame below the current
    /// one: pointers are pinned while a callee declares its parameters, and
    /// they refer to the caller's temporaries.
    pub fn context_index_of_variable_named(&self, call_stack: &CallStack, name: &str) -> i32 {
        if self.global_variable_exists(name) {
            0
        } else {
            call_stack.current_frame_index() as i32
        }
    }

    /// Pins a pointer to a concrete context. A pointer to a variable that is
    /// itself a pointer collapses to the inner pointer.
    pub fn resolve_variable_pointer(
        &self,
        call_stack: &CallStack,
        pointer: &VariablePointer,
    ) -> VariablePointer {
        let context_index = if pointer.context_index == -1 {
            self.context_index_of_variable_named(call_stack, &pointer.name)
        } else {
            pointer.context_index
        };

        match self.get_raw_variable_with_name(call_stack, &pointer.name, context_index) {
            Some(RuntimeObject::VariablePointer(double_redirection)) => double_redirection,
            _ => VariablePointer::new(pointer.name.clone(), context_index),
        }
    }

    pub fn assign(
        &mut self,
        call_stack: &mut CallStack,
        name: &str,
        value: RuntimeObject,
        is_new_declaration: bool,
        is_global: bool,
    ) -> Result<(), InkError> {
        let mut name = name.to_string();
        let mut value = value;
        let mut context_index = -1;
        let mut set_global = if is_new_declaration {
            is_global
        } else {
            self.global_variable_exists(&name)
        };

        if is_new_declaration {
            if let RuntimeObject::VariablePointer(pointer) = &value {
                value = RuntimeObject::VariablePointer(
                    self.resolve_variable_pointer(call_stack, pointer),
                );
            }
        } else {
            let mut seen = BTreeSet::new();
            while let Some(RuntimeObject::VariablePointer(pointer)) =
                self.get_raw_variable_with_name(call_stack, &name, context_index)
            {
                if !seen.insert((pointer.name.clone(), pointer.context_index)) {
                    return Err(InkError::new(
                        "VARIABLE_POINTER_INVALID",
                        format!("Variable pointer cycle through \"{}\".", pointer.name),
                    ));
                }
                name = pointer.name;
                context_index = pointer.context_index;
                set_global = context_index == 0;
            }
        }

        if set_global {
            self.globals.insert(name, value);
            Ok(())
        } else {
            call_stack.set_temporary_variable(&name, value, is_new_declaration, context_index)
        }
    }
}
