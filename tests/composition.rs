//! Several optimistic logs nested in one state tree, next to plain slices.

use optimist::{
    ensure_state, json, reducer_fn, wrap, Action, CompositeState, Optimist, OptimistError,
    Reducer, Stored, TransactionKind, STORE_INIT,
};
use serde_json::{json, Value};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Msg {
    Inc,
    AddTodo(&'static str),
    Visit,
    Noop,
}

type AppAction = Action<Msg, &'static str>;

fn counter() -> impl Reducer<AppAction, State = i64> {
    reducer_fn(|n: i64, action: &AppAction| match action.payload {
        Msg::Inc => n + 1,
        _ => n,
    })
}

fn todos() -> impl Reducer<AppAction, State = Vec<&'static str>> {
    reducer_fn(|mut items: Vec<&'static str>, action: &AppAction| {
        if let Msg::AddTodo(text) = action.payload {
            items.push(text);
        }
        items
    })
}

/// Parent state: two wrapped slices and one plain one.
#[derive(Clone, Debug, Default)]
struct App {
    counter: Option<CompositeState<i64, AppAction>>,
    todos: Option<CompositeState<Vec<&'static str>, AppAction>>,
    visits: u32,
}

struct AppReducer<C, T> {
    counter: Optimist<C>,
    todos: Optimist<T>,
}

impl<C, T> AppReducer<C, T>
where
    C: Reducer<AppAction, State = i64>,
    T: Reducer<AppAction, State = Vec<&'static str>>,
{
    fn reduce(&self, app: &App, action: AppAction) -> optimist::Result<App> {
        Ok(App {
            counter: Some(self.counter.reduce(app.counter.as_ref(), action.clone())?),
            todos: Some(self.todos.reduce(app.todos.as_ref(), action.clone())?),
            visits: app.visits + u32::from(action.payload == Msg::Visit),
        })
    }
}

fn app() -> AppReducer<
    impl Reducer<AppAction, State = i64>,
    impl Reducer<AppAction, State = Vec<&'static str>>,
> {
    AppReducer {
        counter: wrap(counter()),
        todos: wrap(todos()),
    }
}

fn current_counter(app: &App) -> i64 {
    *app.counter.as_ref().unwrap().current()
}

fn current_todos(app: &App) -> Vec<&'static str> {
    app.todos.as_ref().unwrap().current().clone()
}

#[test]
fn test_slices_track_the_same_transaction() {
    let reducer = app();
    let mut state = App::default();

    for action in [
        Action::begin(Msg::AddTodo("milk"), "save-1"),
        Action::plain(Msg::Inc),
        Action::plain(Msg::Visit),
        Action::begin(Msg::AddTodo("eggs"), "save-2"),
    ] {
        state = reducer.reduce(&state, action).unwrap();
    }
    assert_eq!(current_todos(&state), vec!["milk", "eggs"]);
    assert_eq!(current_counter(&state), 1);
    assert_eq!(state.visits, 1);

    let state = reducer
        .reduce(&state, Action::revert(Msg::Noop, "save-1"))
        .unwrap();
    assert_eq!(current_todos(&state), vec!["eggs"]);
    assert_eq!(current_counter(&state), 1);
    assert_eq!(state.visits, 1);

    let state = reducer
        .reduce(&state, Action::commit(Msg::Noop, "save-2"))
        .unwrap();
    assert_eq!(current_todos(&state), vec!["eggs"]);
    assert!(state.todos.as_ref().unwrap().history().is_empty());
    assert!(state.counter.as_ref().unwrap().history().is_empty());
}

#[test]
fn test_instances_are_isolated() {
    let left = wrap(counter());
    let right = wrap(counter());

    let l = left.reduce(None, Action::begin(Msg::Inc, "a")).unwrap();
    let r = right.reduce(None, Action::plain(Msg::Inc)).unwrap();

    // "a" only exists in the left log.
    let err = right
        .reduce(Some(&r), Action::commit(Msg::Noop, "a"))
        .unwrap_err();
    assert!(matches!(err, OptimistError::TransactionNotFound { .. }));

    let l = left.reduce(Some(&l), Action::revert(Msg::Noop, "a")).unwrap();
    assert_eq!(*l.current(), 0);
    assert_eq!(*r.current(), 1);
}

#[test]
fn test_mixed_slices_unwrap_uniformly() {
    let optimist = wrap(counter());
    let wrapped: Stored<i64, AppAction> = optimist
        .reduce(None, Action::begin(Msg::Inc, "x"))
        .unwrap()
        .into();
    let plain: Stored<i64, AppAction> = Stored::Raw(41);

    let total: i64 = [&wrapped, &plain].into_iter().map(ensure_state).sum();
    assert_eq!(total, 42);
}

// --- JSON Slices ---

fn json_counter() -> Optimist<impl Reducer<Value, State = Value>> {
    wrap(reducer_fn(|state: Value, action: &Value| {
        let counter = state["counter"].as_i64().unwrap_or(0);
        let counter = match action["type"].as_str() {
            Some("INC") => counter + 1,
            Some("DEC") => counter - 1,
            _ => counter,
        };
        json!({ "counter": counter })
    }))
}

#[test]
fn test_json_actions_drive_transactions() {
    let optimist = json_counter();
    let state = optimist
        .reduce(None, json::optimistic_action("INC", TransactionKind::Begin, "t1"))
        .unwrap();
    let state = optimist.reduce(Some(&state), json::action("DEC")).unwrap();
    assert_eq!(state.current(), &json!({ "counter": 0 }));

    let state = optimist
        .reduce(
            Some(&state),
            json::optimistic_action("--", TransactionKind::Revert, "t1"),
        )
        .unwrap();
    assert_eq!(state.current(), &json!({ "counter": -1 }));
    assert!(state.history().is_empty());
}

#[test]
fn test_json_store_init_and_unwrap() {
    let optimist = json_counter();
    let state = optimist
        .reduce(None, json::optimistic_action("INC", TransactionKind::Begin, 7))
        .unwrap();

    let stored = serde_json::to_value(&state).unwrap();
    assert_eq!(json::ensure_state(&stored), &json!({ "counter": 1 }));
    assert!(stored["history"].is_array());

    let state = optimist
        .reduce(Some(&state), json::action(STORE_INIT))
        .unwrap();
    assert!(state.history().is_empty());
    let stored = serde_json::to_value(&state).unwrap();
    assert_eq!(json::ensure_state(&stored), &json!({ "counter": 1 }));
}
