// Property-based tests using proptest
// These tests generate random sequences of plain-mode edits and verify the
// history laws

mod common;

use common::harness::EditorTestHarness;
use proptest::prelude::*;
use teditor::model::history::History;
use teditor::model::selection::CursorDirection;

/// Random plain-mode edit operations
#[derive(Debug, Clone)]
enum EditOp {
    TypeChar(char),
    TypeString(String),
    Backspace,
    Delete,
    Enter,
    Move(CursorDirection),
    Extend(CursorDirection),
    SelectAll,
    Cut,
    Paste,
}

impl EditOp {
    fn apply(&self, harness: &mut EditorTestHarness) {
        let c = &mut harness.controller;
        match self {
            Self::TypeChar(ch) => {
                c.insert_text(&ch.to_string());
            }
            Self::TypeString(s) => {
                c.insert_text(s);
            }
            Self::Backspace => {
                c.delete_backward();
            }
            Self::Delete => {
                c.delete_forward();
            }
            Self::Enter => {
                c.insert_text("\n");
            }
            Self::Move(direction) => c.move_cursor(*direction),
            Self::Extend(direction) => c.extend_selection(*direction),
            Self::SelectAll => c.select_all(),
            Self::Cut => {
                c.cut();
            }
            Self::Paste => {
                c.plain_text_paste();
            }
        }
    }
}

fn direction_strategy() -> impl Strategy<Value = CursorDirection> {
    prop_oneof![
        Just(CursorDirection::Start),
        Just(CursorDirection::Left),
        Just(CursorDirection::Up),
        Just(CursorDirection::Down),
        Just(CursorDirection::Right),
        Just(CursorDirection::End),
    ]
}

/// Strategy for generating random edit operations
fn edit_op_strategy() -> impl Strategy<Value = EditOp> {
    prop_oneof![
        // Typing operations (more common)
        4 => any::<char>()
            .prop_filter("no control chars", |c| !c.is_control())
            .prop_map(EditOp::TypeChar),
        2 => "[a-zA-Z0-9 é]{1,8}".prop_map(EditOp::TypeString),
        1 => Just(EditOp::Enter),
        // Deletions
        2 => Just(EditOp::Backspace),
        1 => Just(EditOp::Delete),
        // Navigation and selection
        2 => direction_strategy().prop_map(EditOp::Move),
        1 => direction_strategy().prop_map(EditOp::Extend),
        1 => Just(EditOp::SelectAll),
        // Clipboard
        1 => Just(EditOp::Cut),
        1 => Just(EditOp::Paste),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 100,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    /// Undoing every recorded edit returns to the empty document
    #[test]
    fn prop_undo_to_empty(ops in prop::collection::vec(edit_op_strategy(), 1..100)) {
        let mut harness = EditorTestHarness::new();
        for op in &ops {
            op.apply(&mut harness);
        }

        while harness.controller.undo() {}

        prop_assert_eq!(harness.controller.content(), "");
    }

    /// Undo followed by redo lands on the content seen before the undo
    #[test]
    fn prop_undo_redo_roundtrip(ops in prop::collection::vec(edit_op_strategy(), 1..60)) {
        let mut harness = EditorTestHarness::new();
        for op in &ops {
            op.apply(&mut harness);
        }
        let before = harness.controller.content().to_string();

        if harness.controller.undo() {
            prop_assert!(harness.controller.redo());
        }

        prop_assert_eq!(harness.controller.content(), before.as_str());
    }

    /// An edit after an undo clears the redo stack
    #[test]
    fn prop_edit_after_undo_clears_redo(
        ops in prop::collection::vec(edit_op_strategy(), 1..40),
        text in "[a-z]{1,4}",
    ) {
        let mut harness = EditorTestHarness::new();
        for op in &ops {
            op.apply(&mut harness);
        }
        harness.controller.undo();

        prop_assert!(harness.controller.insert_text(&text));
        prop_assert!(!harness.controller.can_redo());
    }

    /// The plain selection always lies on character boundaries of the content
    #[test]
    fn prop_selection_stays_on_char_boundaries(ops in prop::collection::vec(edit_op_strategy(), 1..80)) {
        let mut harness = EditorTestHarness::new();
        for op in &ops {
            op.apply(&mut harness);
            let content = harness.controller.content();
            let selection = harness.controller.selection();
            prop_assert!(content.is_char_boundary(selection.anchor), "{:?} after {:?}", selection, op);
            prop_assert!(content.is_char_boundary(selection.head), "{:?} after {:?}", selection, op);
        }
    }

    /// Recording a snapshot identical to the newest one never grows the history
    #[test]
    fn prop_duplicate_snapshot_not_recorded(snapshots in prop::collection::vec("[ab]{0,2}", 1..30)) {
        let mut history = History::new(100);
        for snapshot in &snapshots {
            history.record(snapshot);
            let len = history.undo_len();
            history.record(snapshot);
            prop_assert_eq!(history.undo_len(), len);
        }
    }

    /// The history never holds more than its capacity
    #[test]
    fn prop_history_bounded(capacity in 1usize..10, count in 0usize..40) {
        let mut history = History::new(capacity);
        for i in 0..count {
            history.record(&i.to_string());
        }
        prop_assert!(history.undo_len() <= capacity);
        prop_assert_eq!(history.undo_len(), count.min(capacity));
    }
}
