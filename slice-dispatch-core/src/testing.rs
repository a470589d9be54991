//! Test utilities for slice-dispatch
//!
//! - [`SliceHarness`]: builds its own reducer and creators from a config and
//!   applies messages immediately, outside any component instance
//! - Assertion macros for verifying dispatched messages
//!
//! # Example
//!
//! ```
//! use slice_dispatch_core::testing::SliceHarness;
//! use slice_dispatch_core::{assert_dispatched, prepare, Message, SliceConfig};
//!
//! let config = prepare(
//!     SliceConfig::<i32, i32>::new(0)
//!         .handler("add", |n, msg| *n += msg.payload().copied().unwrap_or(1)),
//! );
//!
//! let mut harness = SliceHarness::new(&config);
//! harness.dispatch_kind("add", Some(2));
//! assert_eq!(harness.state, 2);
//!
//! let dispatched = harness.drain_dispatched();
//! assert_dispatched!(dispatched, "add", 2);
//! ```

use tokio::sync::mpsc;

use crate::action::{ActionKind, Message};
use crate::slice::{build, ActionCreators, SliceConfig, SliceReducer};

/// Out-of-component harness for one slice.
///
/// The harness builds its reducer and creators independently from the
/// config, so a component and its tests can share one (prepared) config.
/// Every dispatched message is recorded for later draining.
pub struct SliceHarness<S, P> {
    /// The slice state under test
    pub state: S,
    reducer: SliceReducer<S, P>,
    actions: ActionCreators<P>,
    tx: mpsc::UnboundedSender<Message<P>>,
    rx: mpsc::UnboundedReceiver<Message<P>>,
}

impl<S: Clone, P> SliceHarness<S, P> {
    /// Create a harness seeded with the config's initial state
    pub fn new(config: &SliceConfig<S, P>) -> Self {
        let slice = build(config);
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: config.initial_state().clone(),
            reducer: slice.reducer,
            actions: slice.actions,
            tx,
            rx,
        }
    }

    /// The harness's own reducer
    pub fn reducer(&self) -> &SliceReducer<S, P> {
        &self.reducer
    }

    /// The harness's own (pure) action-creators
    pub fn actions(&self) -> &ActionCreators<P> {
        &self.actions
    }

    /// Apply a message to the state and record it
    pub fn dispatch(&mut self, message: Message<P>) -> &S {
        self.state = self.reducer.reduce_value(self.state.clone(), &message);
        let _ = self.tx.send(message);
        &self.state
    }

    /// Build a message with the creator for `kind` and dispatch it.
    ///
    /// # Panics
    ///
    /// Panics if the slice has no handler named `kind`.
    pub fn dispatch_kind(&mut self, kind: &str, payload: Option<P>) -> &S {
        let message = self
            .actions
            .create(kind, payload)
            .unwrap_or_else(|| panic!("slice has no action named {:?}", kind));
        self.dispatch(message)
    }

    /// Drain all recorded messages.
    pub fn drain_dispatched(&mut self) -> Vec<Message<P>> {
        let mut messages = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            messages.push(message);
        }
        messages
    }

    /// Check if any messages were dispatched since the last drain.
    pub fn has_dispatched(&mut self) -> bool {
        !self.drain_dispatched().is_empty()
    }

    /// Assert that the slice's handlers are exactly the kinds of `K`.
    ///
    /// # Panics
    ///
    /// Panics listing the kinds missing on either side.
    pub fn assert_mirrors<K: ActionKind>(&self) {
        let mut missing: Vec<&str> = K::names()
            .into_iter()
            .filter(|name| !self.reducer.handles(name))
            .collect();
        let mut extra: Vec<&str> = self
            .actions
            .kinds()
            .filter(|name| !K::all().iter().any(|kind| kind.name() == *name))
            .collect();
        missing.sort_unstable();
        extra.sort_unstable();

        assert!(
            missing.is_empty() && extra.is_empty(),
            "handlers do not mirror {}: missing {:?}, undeclared {:?}",
            std::any::type_name::<K>(),
            missing,
            extra
        );
    }
}

/// Assert that a message of the given kind (and optionally payload) was
/// dispatched.
///
/// # Example
///
/// ```ignore
/// let messages = harness.drain_dispatched();
/// assert_dispatched!(messages, "increment");
/// assert_dispatched!(messages, "incrementBy", 2);
/// ```
#[macro_export]
macro_rules! assert_dispatched {
    ($messages:expr, $kind:expr) => {
        assert!(
            $messages.iter().any(|m| m.kind == $kind),
            "Expected message of kind `{}` to be dispatched, but got: {:?}",
            $kind,
            $messages
        );
    };
    ($messages:expr, $kind:expr, $payload:expr) => {
        assert!(
            $messages
                .iter()
                .any(|m| m.kind == $kind && m.payload.as_ref() == Some(&$payload)),
            "Expected message `{}` with payload {:?} to be dispatched, but got: {:?}",
            $kind,
            $payload,
            $messages
        );
    };
}

/// Assert that no message of the given kind was dispatched.
///
/// # Example
///
/// ```ignore
/// let messages = harness.drain_dispatched();
/// assert_not_dispatched!(messages, "reset");
/// ```
#[macro_export]
macro_rules! assert_not_dispatched {
    ($messages:expr, $kind:expr) => {
        assert!(
            !$messages.iter().any(|m| m.kind == $kind),
            "Expected NO message of kind `{}` to be dispatched, but got: {:?}",
            $kind,
            $messages
        );
    };
}

/// Find the first dispatched message of a kind.
///
/// # Example
///
/// ```ignore
/// let messages = harness.drain_dispatched();
/// let msg = find_dispatched!(messages, "incrementBy").unwrap();
/// assert_eq!(msg.payload, Some(2));
/// ```
#[macro_export]
macro_rules! find_dispatched {
    ($messages:expr, $kind:expr) => {
        $messages.iter().find(|m| m.kind == $kind)
    };
}

/// Count dispatched messages of a kind.
///
/// # Example
///
/// ```ignore
/// let messages = harness.drain_dispatched();
/// assert_eq!(count_dispatched!(messages, "increment"), 2);
/// ```
#[macro_export]
macro_rules! count_dispatched {
    ($messages:expr, $kind:expr) => {
        $messages.iter().filter(|m| m.kind == $kind).count()
    };
}
