//! Slice builder: configuration in, reducer and action-creators out
//!
//! A slice is a named set of handlers over one state type. [`build`] turns a
//! [`SliceConfig`] into a pure [`SliceReducer`] and a matching set of
//! [`ActionCreators`], one per handler name.
//!
//! # Example
//!
//! ```
//! use slice_dispatch_core::{build, Message, SliceConfig};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Counter {
//!     count: i32,
//! }
//!
//! let config = SliceConfig::<Counter, i32>::new(Counter { count: 0 })
//!     .handler("increment", |state, _| state.count += 1)
//!     .handler("incrementBy", |state, msg| {
//!         state.count += msg.payload().copied().unwrap_or_default()
//!     });
//!
//! let slice = build(&config);
//! let msg = slice.actions.create("incrementBy", Some(2)).unwrap();
//! let next = slice.reducer.reduce_value(Counter { count: 1 }, &msg);
//! assert_eq!(next, Counter { count: 3 });
//! ```
//!
//! # Handler styles
//!
//! Handlers receive `&mut S` and may either mutate it in place (return `()`)
//! or produce a whole new state (return [`Replace`]). Both styles can be mixed
//! inside one slice.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::action::{ActionKind, Message};
use crate::error::SliceError;

/// Name given to slices configured without one.
pub const DEFAULT_SLICE_NAME: &str = "local";

/// What a handler did to the state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update<S> {
    /// The state was mutated in place
    Mutated,
    /// The handler produced a new state that replaces the current one
    Replaced(S),
}

/// Handler return value for the produce-a-new-state style.
///
/// ```
/// use slice_dispatch_core::{build, Message, Replace, SliceConfig};
///
/// let config = SliceConfig::<i32, ()>::new(3).handler("double", |n, _| Replace(*n * 2));
/// let slice = build(&config);
/// assert_eq!(slice.reducer.reduce_value(3, &Message::new("double")), 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replace<S>(pub S);

impl<S> From<()> for Update<S> {
    fn from(_: ()) -> Self {
        Update::Mutated
    }
}

impl<S> From<Replace<S>> for Update<S> {
    fn from(replace: Replace<S>) -> Self {
        Update::Replaced(replace.0)
    }
}

type HandlerFn<S, P> = dyn Fn(&mut S, &Message<P>) -> Update<S>;

/// A named mutation handler, shared between clones of a config
pub struct Handler<S, P> {
    name: Cow<'static, str>,
    func: Rc<HandlerFn<S, P>>,
}

impl<S, P> Handler<S, P> {
    /// The handler's name (the message kind it answers to)
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<S, P> Clone for Handler<S, P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            func: Rc::clone(&self.func),
        }
    }
}

impl<S, P> fmt::Debug for Handler<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").field("name", &self.name).finish()
    }
}

/// Slice configuration: optional name, initial state, and named handlers.
///
/// Handler names keep their declaration order. Registering a name twice
/// replaces the earlier handler.
pub struct SliceConfig<S, P = serde_json::Value> {
    name: Option<Cow<'static, str>>,
    initial_state: S,
    handlers: Vec<Handler<S, P>>,
}

impl<S, P> SliceConfig<S, P> {
    /// Start a config from its initial state
    pub fn new(initial_state: S) -> Self {
        Self {
            name: None,
            initial_state,
            handlers: Vec::new(),
        }
    }

    /// Set an explicit slice name
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Register a handler for one message kind.
    ///
    /// The handler may return `()` (mutated in place) or [`Replace`] (new
    /// state).
    pub fn handler<F, R>(mut self, name: impl Into<Cow<'static, str>>, func: F) -> Self
    where
        F: Fn(&mut S, &Message<P>) -> R + 'static,
        R: Into<Update<S>>,
    {
        let handler = Handler {
            name: name.into(),
            func: Rc::new(move |state: &mut S, message: &Message<P>| {
                func(state, message).into()
            }),
        };
        match self.handlers.iter_mut().find(|h| h.name == handler.name) {
            Some(existing) => {
                tracing::debug!(kind = %handler.name, "Replacing duplicate handler");
                *existing = handler;
            }
            None => self.handlers.push(handler),
        }
        self
    }

    /// The configured name, if one was set
    pub fn slice_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The initial state
    pub fn initial_state(&self) -> &S {
        &self.initial_state
    }

    /// The registered handlers, in declaration order
    pub fn handlers(&self) -> &[Handler<S, P>] {
        &self.handlers
    }

    /// Handler names, in declaration order
    pub fn kinds(&self) -> impl Iterator<Item = &str> + '_ {
        self.handlers.iter().map(Handler::name)
    }

    /// Kinds declared by `K` that have no handler here
    pub fn missing_kinds<K: ActionKind>(&self) -> Vec<&'static str> {
        K::all()
            .iter()
            .map(|kind| kind.name())
            .filter(|name| !self.kinds().any(|k| k == *name))
            .collect()
    }

    /// Handler names that `K` does not declare
    pub fn extra_kinds<K: ActionKind>(&self) -> Vec<&str> {
        self.kinds()
            .filter(|name| !K::all().iter().any(|kind| kind.name() == *name))
            .collect()
    }
}

impl<S: Clone, P> Clone for SliceConfig<S, P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            initial_state: self.initial_state.clone(),
            handlers: self.handlers.clone(),
        }
    }
}

impl<S: fmt::Debug, P> fmt::Debug for SliceConfig<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliceConfig")
            .field("name", &self.name)
            .field("initial_state", &self.initial_state)
            .field("handlers", &self.kinds().collect::<Vec<_>>())
            .finish()
    }
}

/// Normalize a config's name without building anything.
///
/// Returns the same initial state and handlers, with the name defaulted to
/// [`DEFAULT_SLICE_NAME`] when none was set.
pub fn prepare<S, P>(mut config: SliceConfig<S, P>) -> SliceConfig<S, P> {
    if config.name.is_none() {
        config.name = Some(Cow::Borrowed(DEFAULT_SLICE_NAME));
    }
    config
}

/// Reducer and action-creators built from one config
#[derive(Debug)]
pub struct Slice<S, P> {
    pub reducer: SliceReducer<S, P>,
    pub actions: ActionCreators<P>,
}

impl<S, P> Clone for Slice<S, P> {
    fn clone(&self) -> Self {
        Self {
            reducer: self.reducer.clone(),
            actions: self.actions.clone(),
        }
    }
}

/// Build a reducer and action-creators from a config.
///
/// Pure and repeatable: two builds of the same config produce reducers that
/// agree on every state and message.
pub fn build<S, P>(config: &SliceConfig<S, P>) -> Slice<S, P> {
    let name = config
        .name
        .clone()
        .unwrap_or(Cow::Borrowed(DEFAULT_SLICE_NAME));

    let handlers: HashMap<_, _> = config
        .handlers
        .iter()
        .map(|h| (h.name.clone(), Rc::clone(&h.func)))
        .collect();

    let creators = config
        .handlers
        .iter()
        .map(|h| ActionCreator {
            kind: h.name.clone(),
            _payload: std::marker::PhantomData,
        })
        .collect();

    Slice {
        reducer: SliceReducer {
            name,
            handlers: Rc::new(handlers),
        },
        actions: ActionCreators { creators },
    }
}

/// Pure reducer over `Rc` state snapshots.
///
/// Mutating handlers write through [`Rc::make_mut`]: a snapshot still held
/// elsewhere is copied before the write and never changes, while an unshared
/// snapshot is updated in place and the same reference is returned.
pub struct SliceReducer<S, P> {
    name: Cow<'static, str>,
    handlers: Rc<HashMap<Cow<'static, str>, Rc<HandlerFn<S, P>>>>,
}

impl<S, P> Clone for SliceReducer<S, P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            handlers: Rc::clone(&self.handlers),
        }
    }
}

impl<S, P> fmt::Debug for SliceReducer<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.handlers.keys().collect();
        kinds.sort();
        f.debug_struct("SliceReducer")
            .field("name", &self.name)
            .field("kinds", &kinds)
            .finish()
    }
}

impl<S, P> SliceReducer<S, P> {
    /// The slice name (defaulted if the config had none)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a handler exists for `kind`
    pub fn handles(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Handler names, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<_> = self.handlers.keys().map(|k| k.as_ref()).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl<S: Clone, P> SliceReducer<S, P> {
    /// Apply a message.
    ///
    /// A message whose kind has no handler leaves the state unchanged and
    /// logs a warning; use [`try_reduce`](Self::try_reduce) to get an error
    /// instead.
    pub fn reduce(&self, mut state: Rc<S>, message: &Message<P>) -> Rc<S> {
        self.reduce_in_place(&mut state, message);
        state
    }

    /// Apply a message to a snapshot slot, replacing it with the next state.
    ///
    /// Unknown kinds are handled as in [`reduce`](Self::reduce).
    pub fn reduce_in_place(&self, state: &mut Rc<S>, message: &Message<P>) {
        match self.handlers.get(message.kind.as_ref()) {
            Some(handler) => Self::apply(handler.as_ref(), state, message),
            None => {
                tracing::warn!(
                    slice = %self.name,
                    kind = %message.kind,
                    "Unhandled message kind, state unchanged"
                );
            }
        }
    }

    /// Apply a message, failing on an unknown kind
    pub fn try_reduce(
        &self,
        mut state: Rc<S>,
        message: &Message<P>,
    ) -> Result<Rc<S>, SliceError> {
        let handler = self.handlers.get(message.kind.as_ref()).ok_or_else(|| {
            SliceError::UnhandledKind {
                slice: self.name.to_string(),
                kind: message.kind.to_string(),
            }
        })?;
        Self::apply(handler.as_ref(), &mut state, message);
        Ok(state)
    }

    /// Apply a message to a plain value
    pub fn reduce_value(&self, state: S, message: &Message<P>) -> S {
        let next = self.reduce(Rc::new(state), message);
        Rc::try_unwrap(next).unwrap_or_else(|shared| (*shared).clone())
    }

    /// Apply a sequence of messages starting from `initial`
    pub fn fold<'a, I>(&self, initial: S, messages: I) -> S
    where
        I: IntoIterator<Item = &'a Message<P>>,
        P: 'a,
    {
        messages
            .into_iter()
            .fold(initial, |state, message| self.reduce_value(state, message))
    }

    // Handlers take `&mut S` whichever style they use, so a snapshot still
    // held elsewhere is cloned even when the handler goes on to return a
    // replacement. Unshared snapshots are mutated without copying.
    fn apply(handler: &HandlerFn<S, P>, state: &mut Rc<S>, message: &Message<P>) {
        if let Update::Replaced(next) = handler(Rc::make_mut(state), message) {
            *state = Rc::new(next);
        }
    }
}

/// Pure message builder for one handler name
pub struct ActionCreator<P> {
    kind: Cow<'static, str>,
    _payload: std::marker::PhantomData<fn(P)>,
}

impl<P> ActionCreator<P> {
    /// The kind of message this creator builds
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Build a message with an optional payload
    pub fn create(&self, payload: Option<P>) -> Message<P> {
        Message {
            kind: self.kind.clone(),
            payload,
        }
    }

    /// Build a message without a payload
    pub fn call(&self) -> Message<P> {
        self.create(None)
    }

    /// Build a message carrying `payload`
    pub fn call_with(&self, payload: P) -> Message<P> {
        self.create(Some(payload))
    }
}

impl<P> Clone for ActionCreator<P> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            _payload: std::marker::PhantomData,
        }
    }
}

impl<P> fmt::Debug for ActionCreator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActionCreator").field(&self.kind).finish()
    }
}

/// One pure [`ActionCreator`] per handler name, in declaration order
pub struct ActionCreators<P> {
    creators: Vec<ActionCreator<P>>,
}

impl<P> ActionCreators<P> {
    /// Look up the creator for `kind`
    pub fn get(&self, kind: &str) -> Option<&ActionCreator<P>> {
        self.creators.iter().find(|c| c.kind == kind)
    }

    /// Build a message for `kind`, if a handler of that name exists
    pub fn create(&self, kind: &str, payload: Option<P>) -> Option<Message<P>> {
        self.get(kind).map(|creator| creator.create(payload))
    }

    /// Creator names, in declaration order
    pub fn kinds(&self) -> impl Iterator<Item = &str> + '_ {
        self.creators.iter().map(ActionCreator::kind)
    }

    /// Iterate over the creators
    pub fn iter(&self) -> std::slice::Iter<'_, ActionCreator<P>> {
        self.creators.iter()
    }

    pub fn len(&self) -> usize {
        self.creators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }
}

impl<P> Clone for ActionCreators<P> {
    fn clone(&self) -> Self {
        Self {
            creators: self.creators.clone(),
        }
    }
}

impl<P> fmt::Debug for ActionCreators<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}

impl<'a, P> IntoIterator for &'a ActionCreators<P> {
    type Item = &'a ActionCreator<P>;
    type IntoIter = std::slice::Iter<'a, ActionCreator<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.creators.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Counter {
        count: i32,
    }

    fn counter_config() -> SliceConfig<Counter, i32> {
        SliceConfig::new(Counter::default())
            .handler("increment", |state: &mut Counter, _| state.count += 1)
            .handler("incrementBy", |state: &mut Counter, msg: &Message<i32>| {
                state.count += msg.payload().copied().unwrap_or_default()
            })
            .handler("reset", |_: &mut Counter, _| Replace(Counter::default()))
    }

    #[test]
    fn test_build_creates_one_creator_per_handler() {
        let slice = build(&counter_config());

        let kinds: Vec<_> = slice.actions.kinds().collect();
        assert_eq!(kinds, vec!["increment", "incrementBy", "reset"]);
        assert_eq!(slice.actions.len(), 3);
        assert_eq!(slice.reducer.kinds(), vec!["increment", "incrementBy", "reset"]);
    }

    #[test]
    fn test_creators_build_messages() {
        let slice = build(&counter_config());

        let msg = slice.actions.get("incrementBy").unwrap().call_with(2);
        assert_eq!(msg, Message::with_payload("incrementBy", 2));

        let msg = slice.actions.get("increment").unwrap().call();
        assert_eq!(msg, Message::new("increment"));

        assert!(slice.actions.create("missing", None).is_none());
    }

    #[test]
    fn test_default_name() {
        let slice = build(&counter_config());
        assert_eq!(slice.reducer.name(), DEFAULT_SLICE_NAME);

        let slice = build(&counter_config().name("counter"));
        assert_eq!(slice.reducer.name(), "counter");
    }

    #[test]
    fn test_reduce_mutating_handler_keeps_unshared_reference() {
        let slice = build(&counter_config());
        let state = Rc::new(Counter::default());
        let ptr = Rc::as_ptr(&state);

        let next = slice.reducer.reduce(state, &Message::new("increment"));
        assert_eq!(next.count, 1);
        assert_eq!(Rc::as_ptr(&next), ptr);
    }

    #[test]
    fn test_reduce_leaves_shared_snapshot_untouched() {
        let slice = build(&counter_config());
        let snapshot = Rc::new(Counter { count: 7 });

        let next = slice
            .reducer
            .reduce(Rc::clone(&snapshot), &Message::with_payload("incrementBy", 3));

        assert_eq!(snapshot.count, 7);
        assert_eq!(next.count, 10);
        assert!(!Rc::ptr_eq(&snapshot, &next));
    }

    #[test]
    fn test_reduce_replacing_handler() {
        let slice = build(&counter_config());
        let next = slice
            .reducer
            .reduce_value(Counter { count: 9 }, &Message::new("reset"));
        assert_eq!(next, Counter::default());
    }

    #[test]
    fn test_replacing_handler_on_shared_snapshot() {
        let slice = build(&counter_config());
        let snapshot = Rc::new(Counter { count: 4 });

        let next = slice
            .reducer
            .reduce(Rc::clone(&snapshot), &Message::new("reset"));

        assert_eq!(snapshot.count, 4);
        assert_eq!(*next, Counter::default());
    }

    #[test]
    fn test_try_reduce_known_kind() {
        let slice = build(&counter_config());
        let next = slice
            .reducer
            .try_reduce(Rc::new(Counter { count: 1 }), &Message::new("increment"))
            .unwrap();
        assert_eq!(next.count, 2);
    }

    #[test]
    fn test_reduce_unknown_kind_is_noop() {
        let slice = build(&counter_config());
        let state = Rc::new(Counter { count: 2 });

        let next = slice
            .reducer
            .reduce(Rc::clone(&state), &Message::new("decrement"));
        assert!(Rc::ptr_eq(&state, &next));
    }

    #[test]
    fn test_try_reduce_unknown_kind_errors() {
        let slice = build(&counter_config().name("counter"));
        let err = slice
            .reducer
            .try_reduce(Rc::new(Counter::default()), &Message::new("decrement"))
            .unwrap_err();

        assert!(err.is_unhandled_kind());
        assert_eq!(
            err.to_string(),
            "slice `counter` has no handler for message kind `decrement`"
        );
    }

    #[test]
    fn test_fold() {
        let slice = build(&counter_config());
        let messages = [
            Message::new("increment"),
            Message::with_payload("incrementBy", 2),
            Message::new("increment"),
        ];

        let state = slice.reducer.fold(Counter::default(), &messages);
        assert_eq!(state, Counter { count: 4 });
    }

    #[test]
    fn test_duplicate_handler_replaces_earlier() {
        let config = counter_config().handler("increment", |state: &mut Counter, _| {
            state.count += 100
        });
        assert_eq!(config.handlers().len(), 3);

        let slice = build(&config);
        let next = slice
            .reducer
            .reduce_value(Counter::default(), &Message::new("increment"));
        assert_eq!(next.count, 100);
    }

    #[test]
    fn test_prepare_fills_name_only() {
        let prepared = prepare(counter_config());
        assert_eq!(prepared.slice_name(), Some(DEFAULT_SLICE_NAME));
        assert_eq!(prepared.initial_state(), &Counter::default());
        assert_eq!(
            prepared.kinds().collect::<Vec<_>>(),
            vec!["increment", "incrementBy", "reset"]
        );

        let prepared = prepare(counter_config().name("counter"));
        assert_eq!(prepared.slice_name(), Some("counter"));
    }

    #[test]
    fn test_builds_are_extensionally_equal() {
        let config = counter_config();
        let first = build(&config);
        let second = build(&config);

        let messages = [
            Message::new("increment"),
            Message::with_payload("incrementBy", -4),
            Message::new("reset"),
            Message::new("unknown"),
        ];
        for start in [-3, 0, 11] {
            for msg in &messages {
                assert_eq!(
                    first.reducer.reduce_value(Counter { count: start }, msg),
                    second.reducer.reduce_value(Counter { count: start }, msg),
                );
            }
        }
    }
}
