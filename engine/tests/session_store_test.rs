//! Property tests for the session store
//!
//! Transcript and memory must stay in step whatever sequence of operations
//! is applied.

use proptest::prelude::*;
use sage_engine::session::{SessionStore, GREETING};
use sdk::{Exchange, Role, SageError, Turn};

#[derive(Debug, Clone)]
enum Op {
    Initialize,
    Reset,
    AppendUser(String),
    Record(String, String),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Initialize),
        Just(Op::Reset),
        "[ a-z]{0,12}".prop_map(Op::AppendUser),
        ("[a-z]{1,8}", "[a-z]{1,8}").prop_map(|(u, a)| Op::Record(u, a)),
    ]
}

fn apply(store: &mut SessionStore, op: &Op) {
    match op {
        Op::Initialize => store.initialize(),
        Op::Reset => store.reset(),
        Op::AppendUser(text) => {
            let _ = store.append_user_turn(text);
        }
        Op::Record(u, a) => store.record_exchange(u, a),
    }
}

fn fresh_transcript() -> Vec<Turn> {
    vec![Turn::assistant(GREETING)]
}

proptest! {
    #[test]
    fn reset_always_yields_greeting_only(ops in prop::collection::vec(op_strategy(), 0..20)) {
        let mut store = SessionStore::new();
        for op in &ops {
            apply(&mut store, op);
        }

        store.reset();

        let expected = fresh_transcript();
        prop_assert_eq!(store.transcript(), expected.as_slice());
        prop_assert!(store.memory().is_empty());
    }

    #[test]
    fn non_blank_user_turn_grows_transcript_by_one(
        ops in prop::collection::vec(op_strategy(), 0..20),
        text in "[a-z][a-z ]{0,20}",
    ) {
        let mut store = SessionStore::new();
        store.initialize();
        for op in &ops {
            apply(&mut store, op);
        }

        let before = store.transcript().len();
        let memory_before = store.memory().len();
        store.append_user_turn(&text).unwrap();

        prop_assert_eq!(store.transcript().len(), before + 1);
        prop_assert_eq!(store.transcript().last().unwrap(), &Turn::user(text.clone()));
        prop_assert_eq!(store.memory().len(), memory_before);
    }

    #[test]
    fn blank_user_turn_is_rejected_without_change(
        ops in prop::collection::vec(op_strategy(), 0..20),
        blank in "[ \t\n]{0,6}",
    ) {
        let mut store = SessionStore::new();
        store.initialize();
        for op in &ops {
            apply(&mut store, op);
        }

        let before = store.transcript().to_vec();
        let result = store.append_user_turn(&blank);

        prop_assert!(matches!(result, Err(SageError::Validation(_))));
        prop_assert_eq!(store.transcript(), before.as_slice());
    }

    #[test]
    fn record_exchange_keeps_memory_in_step(
        ops in prop::collection::vec(op_strategy(), 0..20),
        user in "[a-z]{1,10}",
        assistant in "[a-z]{1,10}",
    ) {
        let mut store = SessionStore::new();
        store.initialize();
        for op in &ops {
            apply(&mut store, op);
        }

        let transcript_before = store.transcript().len();
        let memory_before = store.memory().len();
        store.record_exchange(&user, &assistant);

        prop_assert_eq!(store.transcript().len(), transcript_before + 1);
        prop_assert_eq!(store.memory().len(), memory_before + 1);
        prop_assert_eq!(store.memory().last().unwrap(), &Exchange::new(user, assistant.clone()));
        prop_assert_eq!(store.transcript().last().unwrap().role, Role::Assistant);
        prop_assert_eq!(&store.transcript().last().unwrap().content, &assistant);
    }

    #[test]
    fn initialize_twice_equals_once(ops in prop::collection::vec(op_strategy(), 0..20)) {
        let mut once = SessionStore::new();
        let mut twice = SessionStore::new();
        for op in &ops {
            apply(&mut once, op);
            apply(&mut twice, op);
        }

        once.initialize();
        twice.initialize();
        twice.initialize();

        prop_assert_eq!(once.transcript(), twice.transcript());
        prop_assert_eq!(once.memory(), twice.memory());
    }

    #[test]
    fn transcript_never_shrinks_without_reset(
        ops in prop::collection::vec(op_strategy().prop_filter("no reset", |op| !matches!(op, Op::Reset)), 0..30),
    ) {
        let mut store = SessionStore::new();
        let mut last_len = 0;
        for op in &ops {
            apply(&mut store, op);
            prop_assert!(store.transcript().len() >= last_len);
            last_len = store.transcript().len();
        }
    }

    #[test]
    fn transcript_always_starts_with_greeting(ops in prop::collection::vec(op_strategy(), 1..20)) {
        let mut store = SessionStore::new();
        for op in &ops {
            apply(&mut store, op);
        }

        if store.is_initialized() {
            prop_assert_eq!(&store.transcript()[0], &Turn::assistant(GREETING));
        }
    }
}
