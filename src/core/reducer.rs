//! # Reducer
//!
//! `reduce(scope, action, table)` applies one action to one scope and
//! returns the new scope, or `None` when the action doesn't apply here.
//! `None` is "try another scope", never success.
//!
//! The input is never touched. Children of removed or replaced entries go
//! away with the entry.

use crate::core::action::{Action, ActionType, Props};
use crate::core::route::RouteTable;
use crate::core::scene::SceneType;
use crate::core::state::{NavigationState, seed_entry};

pub fn reduce(
    state: &NavigationState,
    action: &Action,
    table: &RouteTable,
) -> Option<NavigationState> {
    match action.kind {
        ActionType::Push => {
            let key = local_target(state, action, table)?;
            let mut next = state.clone();
            next.stack.push(seed_entry(table, key, action.props.clone()));
            next.index = next.stack.len() - 1;
            Some(next)
        }
        ActionType::Jump => {
            let position = state.position(action.key.as_deref()?)?;
            let mut next = state.clone();
            next.index = position;
            merge_props(&mut next.stack[position].props, &action.props);
            Some(next)
        }
        ActionType::Reset => {
            let key = local_target(state, action, table)?;
            let mut next = state.clone();
            next.stack = vec![seed_entry(table, key, action.props.clone())];
            next.index = 0;
            Some(next)
        }
        ActionType::Replace => {
            let key = local_target(state, action, table)?;
            let mut next = state.clone();
            let index = next.index;
            next.stack[index] = seed_entry(table, key, action.props.clone());
            Some(next)
        }
        ActionType::Pop => {
            if state.len() <= 1 || is_switch(state, table) {
                return None;
            }
            let mut next = state.clone();
            next.stack.pop();
            next.index = next.index.min(next.stack.len() - 1);
            Some(next)
        }
        ActionType::Refresh => {
            let mut next = state.clone();
            let index = next.index;
            merge_props(&mut next.stack[index].props, &action.props);
            Some(next)
        }
        ActionType::Focus => {
            let position = state.position(action.key.as_deref()?)?;
            let mut next = state.clone();
            next.index = position;
            Some(next)
        }
        ActionType::Init => action.state.as_deref().cloned(),
    }
}

/// The action's key, if this scope's container defines it.
fn local_target<'a>(
    state: &NavigationState,
    action: &'a Action,
    table: &RouteTable,
) -> Option<&'a str> {
    let key = action.key.as_deref()?;
    table.defines(state.key(), key).then_some(key)
}

/// Tab roots can't be popped; their scope has to hand the pop upward.
fn is_switch(state: &NavigationState, table: &RouteTable) -> bool {
    table
        .get(&state.current().key)
        .is_some_and(|route| route.scene_type == SceneType::Jump)
}

fn merge_props(target: &mut Props, source: &Props) {
    for (name, value) in source {
        target.insert(name.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::route::compile;
    use crate::core::state::{initial_state, resolve_active};
    use crate::test_support::{nested_tabs_scene, props, simple_stack_table};
    use proptest::prelude::*;

    fn push(key: &str) -> Action {
        Action::to(ActionType::Push, key, Props::new())
    }

    #[test]
    fn test_push_appends_and_moves_index() {
        let table = simple_stack_table();
        let state = initial_state(&table);
        let next = reduce(&state, &push("detail"), &table).unwrap();
        assert_eq!(next.keys(), vec!["home", "detail"]);
        assert_eq!(next.index(), 1);
        // input untouched
        assert_eq!(state.keys(), vec!["home"]);
    }

    #[test]
    fn test_push_unknown_key_is_not_handled() {
        let table = simple_stack_table();
        let state = initial_state(&table);
        assert!(reduce(&state, &push("nowhere"), &table).is_none());
        assert!(reduce(&state, &Action::new(ActionType::Push), &table).is_none());
    }

    #[test]
    fn test_push_then_pop_restores_shape() {
        let table = simple_stack_table();
        let state = initial_state(&table);
        let pushed = reduce(&state, &push("detail"), &table).unwrap();
        let popped = reduce(&pushed, &Action::pop(), &table).unwrap();
        assert_eq!(popped, state);
    }

    #[test]
    fn test_pop_singleton_is_not_handled() {
        let table = simple_stack_table();
        let state = initial_state(&table);
        assert!(reduce(&state, &Action::pop(), &table).is_none());
    }

    #[test]
    fn test_pop_in_tab_scope_is_not_handled() {
        let table = compile(&nested_tabs_scene().with_initial(1)).unwrap();
        let state = initial_state(&table);
        let tabs = state.current().child.as_ref().unwrap();
        assert_eq!(tabs.len(), 2);
        assert!(reduce(tabs, &Action::pop(), &table).is_none());
    }

    #[test]
    fn test_pop_after_focus_keeps_index_in_range() {
        let table = simple_stack_table();
        let mut state = initial_state(&table);
        for key in ["detail", "settings"] {
            state = reduce(&state, &push(key), &table).unwrap();
        }
        let focused = reduce(
            &state,
            &Action::to(ActionType::Focus, "home", Props::new()),
            &table,
        )
        .unwrap();
        let popped = reduce(&focused, &Action::pop(), &table).unwrap();
        assert_eq!(popped.keys(), vec!["home", "detail"]);
        assert_eq!(popped.index(), 0);
    }

    #[test]
    fn test_reset_discards_history() {
        let table = simple_stack_table();
        let mut state = initial_state(&table);
        for key in ["detail", "settings", "detail"] {
            state = reduce(&state, &push(key), &table).unwrap();
        }
        let reset = reduce(
            &state,
            &Action::to(ActionType::Reset, "settings", props(&[("tab", "x")])),
            &table,
        )
        .unwrap();
        assert_eq!(reset.keys(), vec!["settings"]);
        assert_eq!(reset.index(), 0);
        assert_eq!(reset.current().props["tab"], "x");
    }

    #[test]
    fn test_replace_overwrites_current_entry() {
        let table = simple_stack_table();
        let state = reduce(&initial_state(&table), &push("detail"), &table).unwrap();
        let replaced = reduce(
            &state,
            &Action::to(ActionType::Replace, "settings", Props::new()),
            &table,
        )
        .unwrap();
        assert_eq!(replaced.keys(), vec!["home", "settings"]);
        assert_eq!(replaced.index(), 1);
    }

    #[test]
    fn test_refresh_merges_props_only() {
        let table = simple_stack_table();
        let state = reduce(
            &initial_state(&table),
            &Action::to(ActionType::Push, "detail", props(&[("id", "1"), ("title", "old")])),
            &table,
        )
        .unwrap();
        let refreshed = reduce(&state, &Action::refresh(props(&[("title", "new")])), &table).unwrap();
        assert_eq!(refreshed.keys(), state.keys());
        assert_eq!(refreshed.index(), state.index());
        assert_eq!(refreshed.current().props["id"], "1");
        assert_eq!(refreshed.current().props["title"], "new");
    }

    #[test]
    fn test_focus_changes_only_index() {
        let table = simple_stack_table();
        let mut state = initial_state(&table);
        for key in ["detail", "settings"] {
            state = reduce(&state, &push(key), &table).unwrap();
        }
        let focused = reduce(
            &state,
            &Action::to(ActionType::Focus, "detail", Props::new()),
            &table,
        )
        .unwrap();
        assert_eq!(focused.keys(), state.keys());
        assert_eq!(focused.index(), 1);

        let missing = Action::to(ActionType::Focus, "nowhere", Props::new());
        assert!(reduce(&state, &missing, &table).is_none());
    }

    #[test]
    fn test_jump_switches_tab_and_keeps_stacks() {
        let table = compile(&nested_tabs_scene().with_initial(1)).unwrap();
        let state = initial_state(&table);
        let tabs = state.current().child.as_ref().unwrap().clone();

        let jumped = reduce(
            &tabs,
            &Action::to(ActionType::Jump, "profile", props(&[("from", "feed")])),
            &table,
        )
        .unwrap();
        assert_eq!(jumped.len(), tabs.len());
        assert_eq!(jumped.index(), 1);
        assert_eq!(jumped.current().props["from"], "feed");
        assert_eq!(resolve_active(&jumped).keys(), vec!["profile_"]);
    }

    #[test]
    fn test_init_replaces_wholesale() {
        let table = simple_stack_table();
        let state = initial_state(&table);
        let target = reduce(&state, &push("settings"), &table).unwrap();
        let restored = reduce(&state, &Action::init(target.clone()), &table).unwrap();
        assert_eq!(restored, target);
        assert!(reduce(&state, &Action::new(ActionType::Init), &table).is_none());
    }

    proptest! {
        #[test]
        fn prop_pushes_keep_index_in_range(keys in proptest::collection::vec(0usize..3, 0..20)) {
            let table = simple_stack_table();
            let names = ["home", "detail", "settings"];
            let mut state = initial_state(&table);
            for k in keys {
                state = reduce(&state, &push(names[k]), &table).unwrap();
                prop_assert!(state.index() < state.len());
                prop_assert_eq!(state.index(), state.len() - 1);
            }
        }

        #[test]
        fn prop_push_pop_is_identity_on_shape(depth in 0usize..10, key in 0usize..3) {
            let table = simple_stack_table();
            let names = ["home", "detail", "settings"];
            let mut state = initial_state(&table);
            for _ in 0..depth {
                state = reduce(&state, &push("detail"), &table).unwrap();
            }
            let pushed = reduce(&state, &push(names[key]), &table).unwrap();
            let popped = reduce(&pushed, &Action::pop(), &table).unwrap();
            prop_assert_eq!(popped, state);
        }

        #[test]
        fn prop_reset_always_yields_singleton(depth in 0usize..10) {
            let table = simple_stack_table();
            let mut state = initial_state(&table);
            for _ in 0..depth {
                state = reduce(&state, &push("detail"), &table).unwrap();
            }
            let reset = reduce(
                &state,
                &Action::to(ActionType::Reset, "home", Props::new()),
                &table,
            )
            .unwrap();
            prop_assert_eq!(reset.len(), 1);
            prop_assert_eq!(reset.index(), 0);
        }
    }
}
