use super::*;

fn empty_stack_error() -> InkError {
    InkError::new("EVAL_STACK_EMPTY", "Evaluation stack is empty.")
}

impl StoryState {
    pub fn evaluation_stack(&self) -> &[RuntimeObject] {
        &self.evaluation_stack
    }

    pub fn push_evaluation_stack(&mut self, object: RuntimeObject) {
        self.evaluation_stack.push(object);
    }

    pub fn pop_evaluation_stack(&mut self) -> Result<RuntimeObject, InkError> {
        self.evaluation_stack.pop().ok_or_else(empty_stack_error)
    }

    /// Removes the top `count` objects, returned bottom first. Nothing is
    /// removed when the stack holds fewer than `count`.
    pub fn pop_evaluation_stack_n(&mut self, count: usize) -> Result<Vec<RuntimeObject>, InkError> {
        let depth = self.evaluation_stack.len();
        if count > depth {
            return Err(InkError::new(
                "EVAL_STACK_UNDERFLOW",
                format!(
                    "Insufficient operands: tried to pop {} objects from a stack of {}.",
                    count, depth
                ),
            ));
        }
        Ok(self.evaluation_stack.split_off(depth - count))
    }

    pub fn peek_evaluation_stack(&self) -> Result<&RuntimeObject, InkError> {
        self.evaluation_stack.last().ok_or_else(empty_stack_error)
    }
}
