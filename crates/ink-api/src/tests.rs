use super::*;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("ink-state-{}-{}", name, nanos))
}

fn story_graph() -> (Arc<ContentArena>, ContentId) {
    let mut arena = ContentArena::new();
    let root = arena.root();
    let start = arena.add_container(root, Some("start"));
    arena.add_content(start, ContentKind::Text);
    let choice_point = arena.add_content(start, ContentKind::ChoicePoint);
    arena.set_main(start);
    (Arc::new(arena), choice_point)
}

fn seeded_state(graph: &Arc<ContentArena>, seed: i32) -> StoryState {
    create_story_state(
        graph.clone(),
        StoryStateOptions {
            story_seed: Some(seed),
            ..StoryStateOptions::default()
        },
    )
}

#[test]
fn create_story_state_starts_at_main_container() {
    let (graph, _) = story_graph();
    let state = seeded_state(&graph, 5);
    assert_eq!(
        state.current_path().map(|path| path.to_string()),
        Some("start.0".to_string())
    );
    assert_eq!(state.story_seed(), 5);
}

#[test]
fn json_round_trip_through_facade() {
    let (graph, choice_point) = story_graph();
    let mut state = seeded_state(&graph, 5);
    state.push_to_output_stream(RuntimeObject::text("Once upon a time\n"));
    state.add_choice("Continue", choice_point, None);

    let json = save_state_to_json(&state).expect("save");
    let mut restored = seeded_state(&graph, 1);
    load_state_from_json(&mut restored, &json).expect("load");
    assert_eq!(restored.current_text(), "Once upon a time\n");
    assert_eq!(restored.current_choices().len(), 1);
    assert_eq!(restored.story_seed(), 5);

    let error = load_state_from_json(&mut restored, "[]").expect_err("not a document");
    assert_eq!(error.code, "SAVE_FORMAT_INCORRECT");
}

#[test]
fn file_round_trip_creates_parent_directories() {
    let (graph, _) = story_graph();
    let mut state = seeded_state(&graph, 5);
    state.push_to_output_stream(RuntimeObject::text("saved line"));

    let dir = temp_path("nested");
    let path = dir.join("saves").join("slot1.json");
    save_state_to_file(&path, &state).expect("save file");
    assert!(path.exists());

    let mut restored = seeded_state(&graph, 1);
    load_state_from_file(&path, &mut restored).expect("load file");
    assert_eq!(restored.to_document(), state.to_document());

    fs::remove_dir_all(&dir).expect("cleanup");
}

#[test]
fn missing_state_file_is_reported() {
    let (graph, _) = story_graph();
    let mut state = seeded_state(&graph, 5);
    let error = load_state_from_file(&temp_path("missing"), &mut state).expect_err("missing");
    assert_eq!(error.code, "API_STATE_NOT_FOUND");
}

#[test]
fn corrupt_state_file_keeps_existing_state() {
    let (graph, _) = story_graph();
    let mut state = seeded_state(&graph, 5);
    state.push_to_output_stream(RuntimeObject::text("kept"));
    let before = state.to_document();

    let path = temp_path("corrupt");
    fs::write(&path, r#"{"inkSaveVersion": 3}"#).expect("write corrupt file");
    let error = load_state_from_file(&path, &mut state).expect_err("old version");
    assert_eq!(error.code, "SAVE_VERSION_INCOMPATIBLE");
    assert_eq!(state.to_document(), before);

    fs::remove_file(&path).expect("cleanup");
}
