use super::*;

fn is_inline_space(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

/// Splits newlines out of the head and tail whitespace of `text`:
///
/// ```text
/// "  \n \n  the text \n is here \n  "
///  ^^ ^    ^-----------------^ ^ ^^
/// ```
///
/// Runs of newlines collapse to a single `"\n"` fragment; spacing outside
/// the newlines is kept as its own fragment. Newlines inside the text are
/// left alone. Returns `None` when neither end has a newline.
pub fn split_head_tail_whitespace(text: &str) -> Option<Vec<Text>> {
    let bytes = text.as_bytes();

    let mut head_first_newline = None;
    let mut head_last_newline = None;
    for (index, byte) in bytes.iter().enumerate() {
        match *byte {
            b'\n' => {
                head_first_newline.get_or_insert(index);
                head_last_newline = Some(index);
            }
            byte if is_inline_space(byte) => {}
            _ => break,
        }
    }

    let mut tail_last_newline = None;
    let mut tail_first_newline = None;
    for (index, byte) in bytes.iter().enumerate().rev() {
        match *byte {
            b'\n' => {
                tail_last_newline.get_or_insert(index);
                tail_first_newline = Some(index);
            }
            byte if is_inline_space(byte) => {}
            _ => break,
        }
    }

    if head_first_newline.is_none() && tail_last_newline.is_none() {
        return None;
    }

    let mut fragments = Vec::new();
    let mut inner_start = 0;
    let mut inner_end = text.len();

    if let (Some(first), Some(last)) = (head_first_newline, head_last_newline) {
        if first > 0 {
            fragments.push(Text::new(&text[..first]));
        }
        fragments.push(Text::newline());
        inner_start = last + 1;
    }

    if let Some(first) = tail_first_newline {
        inner_end = first;
    }

    if inner_end > inner_start {
        fragments.push(Text::new(&text[inner_start..inner_end]));
    }

    if let (Some(first), Some(last)) = (tail_first_newline, tail_last_newline) {
        let overlaps_head = head_last_newline.is_some_and(|head_last| first <= head_last);
        if !overlaps_head {
            fragments.push(Text::newline());
            if last + 1 < text.len() {
                fragments.push(Text::new(&text[last + 1..]));
            }
        }
    }

    Some(fragments)
}

impl StoryState {
    pub fn output_stream(&self) -> &[RuntimeObject] {
        &self.output_stream
    }

    pub fn current_right_glue(&self) -> Option<usize> {
        self.current_right_glue
    }

    pub fn reset_output(&mut self) {
        self.output_stream.clear();
        self.current_right_glue = None;
    }

    /// Concatenated text of the output stream.
    pub fn current_text(&self) -> String {
        self.output_stream
            .iter()
            .filter_map(RuntimeObject::as_text)
            .map(|text| text.value.as_str())
            .collect()
    }

    pub fn in_string_evaluation(&self) -> bool {
        self.output_stream
            .iter()
            .any(|object| matches!(object, RuntimeObject::Control(ControlCommand::BeginString)))
    }

    /// Emits `object`, splitting head/tail newlines out of text first so
    /// that each fragment can be glued on its own.
    pub fn push_to_output_stream(&mut self, object: RuntimeObject) {
        if let RuntimeObject::Text(text) = &object {
            if let Some(fragments) = split_head_tail_whitespace(&text.value) {
                for fragment in fragments {
                    self.push_to_output_stream_individual(RuntimeObject::Text(fragment));
                }
                return;
            }
        }
        self.push_to_output_stream_individual(object);
    }

    fn push_to_output_stream_individual(&mut self, object: RuntimeObject) {
        let include_in_output = match &object {
            RuntimeObject::Glue(glue) => self.accept_glue(*glue),
            RuntimeObject::Text(text) => self.accept_text(text),
            _ => true,
        };
        if include_in_output {
            self.output_stream.push(object);
        }
    }

    fn open_right_glue(&self) -> Option<&Glue> {
        self.current_right_glue
            .and_then(|index| self.output_stream.get(index))
            .and_then(RuntimeObject::as_glue)
    }

    /// Left and bidirectional glue trim trailing newlines, closing the open
    /// right glue when both share a parent. Only bidirectional glue and a
    /// newly opened right glue are kept.
    fn accept_glue(&mut self, glue: Glue) -> bool {
        let absorbs_left = glue.is_left() || glue.is_bi();
        let closes_right_glue = absorbs_left
            && self
                .open_right_glue()
                .is_some_and(|open| open.parent == glue.parent);

        if absorbs_left {
            self.trim_newlines_from_output_stream(closes_right_glue);
        }
        if closes_right_glue && glue.is_bi() {
            // Bidirectional glue still absorbs the newline before the
            // right glue it just closed.
            self.trim_newlines_from_output_stream(false);
        }
        if closes_right_glue {
            self.current_right_glue = None;
        }

        let is_new_right_glue = glue.is_right() && self.current_right_glue.is_none();
        if is_new_right_glue {
            self.current_right_glue = Some(self.output_stream.len());
        }

        glue.is_bi() || is_new_right_glue
    }

    fn accept_text(&mut self, text: &Text) -> bool {
        if self.current_glue_index().is_some() {
            if text.is_newline() {
                self.trim_from_existing_glue();
                return false;
            }
            if text.is_non_whitespace() {
                self.remove_existing_glue();
                self.current_right_glue = None;
            }
            return true;
        }

        if text.is_newline() {
            return !self.output_stream_ends_in_newline() && self.output_stream_contains_content();
        }
        true
    }

    /// Removes an output object, keeping the open right glue index in step.
    fn remove_output_at(&mut self, index: usize) -> RuntimeObject {
        self.current_right_glue = match self.current_right_glue {
            Some(glue) if glue == index => None,
            Some(glue) if glue > index => Some(glue - 1),
            other => other,
        };
        self.output_stream.remove(index)
    }

    /// Nearest glue at the tail of the stream. Control markers end the
    /// search.
    pub(crate) fn current_glue_index(&self) -> Option<usize> {
        for (index, object) in self.output_stream.iter().enumerate().rev() {
            match object {
                RuntimeObject::Glue(_) => return Some(index),
                RuntimeObject::Control(_) => return None,
                _ => {}
            }
        }
        None
    }

    pub(crate) fn output_stream_ends_in_newline(&self) -> bool {
        for object in self.output_stream.iter().rev() {
            match object {
                RuntimeObject::Control(_) => break,
                RuntimeObject::Text(text) if text.is_newline() => return true,
                RuntimeObject::Text(text) if text.is_non_whitespace() => break,
                _ => {}
            }
        }
        false
    }

    pub(crate) fn output_stream_contains_content(&self) -> bool {
        for object in self.output_stream.iter().rev() {
            match object {
                RuntimeObject::Control(_) => break,
                RuntimeObject::Text(_) => return true,
                _ => {}
            }
        }
        false
    }

    /// Drops whitespace text after the nearest glue.
    fn trim_from_existing_glue(&mut self) {
        let Some(mut index) = self.current_glue_index() else {
            return;
        };
        while index < self.output_stream.len() {
            let is_whitespace = self.output_stream[index]
                .as_text()
                .is_some_and(|text| !text.is_non_whitespace());
            if is_whitespace {
                self.remove_output_at(index);
            } else {
                index += 1;
            }
        }
    }

    /// Drops every glue back to the nearest control marker.
    fn remove_existing_glue(&mut self) {
        let mut index = self.output_stream.len();
        while index > 0 {
            index -= 1;
            match &self.output_stream[index] {
                RuntimeObject::Glue(_) => {
                    self.remove_output_at(index);
                }
                RuntimeObject::Control(_) => break,
                _ => {}
            }
        }
    }

    /// Removes trailing whitespace from the last newline that follows any
    /// content. With `remove_right_glue` the open right glue is removed too
    /// if it is reachable without crossing a control marker.
    fn trim_newlines_from_output_stream(&mut self, remove_right_glue: bool) {
        let mut remove_whitespace_from = None;
        let mut right_glue_position = None;
        let mut found_non_whitespace = false;

        for (index, object) in self.output_stream.iter().enumerate().rev() {
            match object {
                RuntimeObject::Control(_) => break,
                RuntimeObject::Text(text) if text.is_non_whitespace() => {
                    found_non_whitespace = true;
                    if !remove_right_glue {
                        break;
                    }
                }
                RuntimeObject::Glue(_)
                    if remove_right_glue && Some(index) == self.current_right_glue =>
                {
                    right_glue_position = Some(index);
                    break;
                }
                RuntimeObject::Text(text) if text.is_newline() && !found_non_whitespace => {
                    remove_whitespace_from = Some(index);
                }
                _ => {}
            }
        }

        if let Some(mut index) = remove_whitespace_from {
            while index < self.output_stream.len() {
                if matches!(self.output_stream[index], RuntimeObject::Text(_)) {
                    self.remove_output_at(index);
                } else {
                    index += 1;
                }
            }
        }

        // The glue sits before the trimmed whitespace, so its index holds.
        if let Some(index) = right_glue_position {
            self.remove_output_at(index);
        }
    }
}
