use std::sync::Arc;

use ink_core::{ContentArena, ContentId, ContentKind};

use crate::state::{StoryState, StoryStateOptions};

pub(crate) struct SampleStory {
    pub(crate) graph: Arc<ContentArena>,
    pub(crate) intro: ContentId,
    pub(crate) intro_text: ContentId,
    pub(crate) choice_point: ContentId,
    pub(crate) second_choice_point: ContentId,
    pub(crate) knot: ContentId,
    pub(crate) stitch: ContentId,
}

/// root
///   intro: [text, choice, choice]
///   knot: [text, stitch: [text]]
pub(crate) fn sample_story() -> SampleStory {
    let mut arena = ContentArena::new();
    let root = arena.root();
    let intro = arena.add_container(root, Some("intro"));
    let intro_text = arena.add_content(intro, ContentKind::Text);
    let choice_point = arena.add_content(intro, ContentKind::ChoicePoint);
    let second_choice_point = arena.add_content(intro, ContentKind::ChoicePoint);
    let knot = arena.add_container(root, Some("knot"));
    arena.add_content(knot, ContentKind::Text);
    let stitch = arena.add_container(knot, Some("stitch"));
    arena.add_content(stitch, ContentKind::Text);
    arena.set_main(intro);

    SampleStory {
        graph: Arc::new(arena),
        intro,
        intro_text,
        choice_point,
        second_choice_point,
        knot,
        stitch,
    }
}

pub(crate) fn state_for(story: &SampleStory) -> StoryState {
    StoryState::new(
        story.graph.clone(),
        StoryStateOptions {
            story_seed: Some(7),
            ..StoryStateOptions::default()
        },
    )
}
