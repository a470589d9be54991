//! Tests for #[derive(ActionKind)] macro

use std::borrow::Cow;

use slice_dispatch::{ActionKind, BoundActions, Instance, Message, SliceConfig};

#[derive(ActionKind, Clone, Copy, Debug, PartialEq)]
enum Todo {
    Add,
    #[action(payload)]
    RemoveAt,
    ClearCompleted,
}

#[test]
fn test_default_names_are_snake_case() {
    assert_eq!(Todo::Add.name(), "add");
    assert_eq!(Todo::RemoveAt.name(), "remove_at");
    assert_eq!(Todo::ClearCompleted.name(), "clear_completed");
}

#[test]
fn test_all_in_declaration_order() {
    assert_eq!(Todo::all(), &[Todo::Add, Todo::RemoveAt, Todo::ClearCompleted]);
    assert_eq!(Todo::names(), vec!["add", "remove_at", "clear_completed"]);
}

#[test]
fn test_takes_payload() {
    assert!(!Todo::Add.takes_payload());
    assert!(Todo::RemoveAt.takes_payload());
    assert!(!Todo::ClearCompleted.takes_payload());
}

#[test]
fn test_into_cow() {
    let name: Cow<'static, str> = Todo::RemoveAt.into();
    assert_eq!(name, "remove_at");
}

#[test]
fn test_message() {
    assert_eq!(
        Todo::RemoveAt.message(Some(3usize)),
        Message::with_payload("remove_at", 3usize)
    );
    assert_eq!(Todo::Add.message::<usize>(None), Message::new("add"));
}

#[test]
fn test_rename_all_camel_case() {
    #[derive(ActionKind, Clone, Copy, Debug)]
    #[action(rename_all = "camelCase")]
    enum Counter {
        Increment,
        #[action(payload)]
        IncrementBy,
    }

    assert_eq!(Counter::Increment.name(), "increment");
    assert_eq!(Counter::IncrementBy.name(), "incrementBy");
}

#[test]
fn test_variant_rename() {
    #[derive(ActionKind, Clone, Copy, Debug)]
    enum Editor {
        #[action(rename = "editor/undo")]
        Undo,
        Redo,
    }

    assert_eq!(Editor::Undo.name(), "editor/undo");
    assert_eq!(Editor::Redo.name(), "redo");
}

#[test]
fn test_keyword_variant_gets_raw_method() {
    #[derive(ActionKind, Clone, Copy, Debug)]
    enum Cursor {
        #[action(payload)]
        Move,
    }

    #[derive(Clone, Debug, Default)]
    struct Position {
        x: i32,
    }

    let config = SliceConfig::<Position, i32>::new(Position::default())
        .handler(Cursor::Move, |pos, msg| pos.x += msg.payload().copied().unwrap_or(0));

    let mut instance = Instance::new();
    let (_, actions, _) = instance.render(|cx| slice_dispatch::use_bound_state(cx, &config));
    actions.r#move(4);

    let (pos, _, _) = instance.render(|cx| slice_dispatch::use_bound_state(cx, &config));
    assert_eq!(pos.x, 4);
}

#[derive(Clone, Debug, Default, PartialEq)]
struct TodoState {
    items: Vec<(String, bool)>,
}

fn todo_config() -> SliceConfig<TodoState, usize> {
    SliceConfig::new(TodoState::default())
        .handler(Todo::Add, |state: &mut TodoState, _: &Message<usize>| {
            let n = state.items.len();
            state.items.push((format!("item {}", n), n % 2 == 1));
        })
        .handler(Todo::RemoveAt, |state: &mut TodoState, msg: &Message<usize>| {
            if let Some(&index) = msg.payload() {
                if index < state.items.len() {
                    state.items.remove(index);
                }
            }
        })
        .handler(Todo::ClearCompleted, |state: &mut TodoState, _: &Message<usize>| {
            state.items.retain(|(_, done)| !done)
        })
}

#[test]
fn test_generated_trait_dispatches() {
    let config = todo_config();
    let mut instance = Instance::new();

    let (_, actions, _) = instance.render(|cx| slice_dispatch::use_bound_state(cx, &config));
    let actions: BoundActions<usize> = actions;
    actions.add();
    actions.add();
    actions.add();
    actions.remove_at(0);

    let (state, actions, _) = instance.render(|cx| slice_dispatch::use_bound_state(cx, &config));
    assert_eq!(
        state.items,
        vec![("item 1".to_string(), true), ("item 2".to_string(), false)]
    );

    actions.clear_completed();
    let (state, _, _) = instance.render(|cx| slice_dispatch::use_bound_state(cx, &config));
    assert_eq!(state.items, vec![("item 2".to_string(), false)]);
}

#[test]
fn test_config_mirrors_kind_enum() {
    let config = todo_config();
    assert!(config.missing_kinds::<Todo>().is_empty());
    assert!(config.extra_kinds::<Todo>().is_empty());

    slice_dispatch::SliceHarness::new(&config).assert_mirrors::<Todo>();
}

#[test]
fn test_missing_handler_is_reported() {
    let config = SliceConfig::<TodoState, usize>::new(TodoState::default())
        .handler(Todo::Add, |state: &mut TodoState, _: &Message<usize>| {
            state.items.push((String::new(), false))
        })
        .handler("rename", |_: &mut TodoState, _: &Message<usize>| {});

    assert_eq!(
        config.missing_kinds::<Todo>(),
        vec!["remove_at", "clear_completed"]
    );
    assert_eq!(config.extra_kinds::<Todo>(), vec!["rename"]);
}
