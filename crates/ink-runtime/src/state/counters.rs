use super::rng::{next_random_bounded, next_random_u32};
use super::*;

impl StoryState {
    /// Visits recorded for the container at `path`, 0 when never visited.
    pub fn visit_count_at_path_string(&self, path: &str) -> u32 {
        self.visit_counts.get(path).copied().unwrap_or(0)
    }

    pub fn visit_counts(&self) -> &BTreeMap<String, u32> {
        &self.visit_counts
    }

    pub fn turn_indices(&self) -> &BTreeMap<String, u32> {
        &self.turn_indices
    }

    pub fn current_turn_index(&self) -> u32 {
        self.current_turn_index
    }

    pub fn story_seed(&self) -> i32 {
        self.story_seed
    }

    pub fn ink_format_version(&self) -> i32 {
        self.ink_format_version
    }

    /// Counts one more entry into `container`.
    pub fn record_visit(&mut self, container: ContentId) -> u32 {
        let path = self.graph.path_of(container).to_string();
        let count = self.visit_counts.entry(path).or_insert(0);
        *count += 1;
        *count
    }

    /// Marks `container` as entered on the current turn.
    pub fn record_turn_index(&mut self, container: ContentId) {
        let path = self.graph.path_of(container).to_string();
        self.turn_indices.insert(path, self.current_turn_index);
    }

    /// Turns elapsed since the container at `path` was last entered, `None`
    /// when it never was.
    pub fn turns_since_for_path(&self, path: &str) -> Option<u32> {
        self.turn_indices
            .get(path)
            .map(|turn| self.current_turn_index.saturating_sub(*turn))
    }

    /// Deterministic value for a shuffle at `offset`; the same seed and
    /// offset give the same value after a save and load.
    pub fn next_sequence_shuffle_seed(&self, offset: i32) -> u32 {
        let mut state = self.story_seed.wrapping_add(offset) as u32;
        next_random_u32(&mut state)
    }

    /// Picks one of `element_count` shuffle elements, `None` when there are
    /// none.
    pub fn sequence_shuffle_index(&self, offset: i32, element_count: u32) -> Option<u32> {
        if element_count == 0 {
            return None;
        }
        let mut state = self.next_sequence_shuffle_seed(offset);
        Some(next_random_bounded(&mut state, element_count))
    }
}
