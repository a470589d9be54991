//! Component instances, hook slots, and the bound-state hook
//!
//! An [`Instance`] is one mounted component. Each call to
//! [`Instance::render`] runs a render pass with a [`Scope`] that hands out
//! hook slots by call order, the same way on every render. State cells live
//! in those slots for as long as the instance does.
//!
//! [`use_bound_state`] is the main entry point: it builds a slice from a
//! config, binds its reducer to a local state cell, and returns the current
//! state, auto-dispatching action callables, and the raw dispatcher.
//!
//! # Example
//!
//! ```
//! use slice_dispatch_core::{use_bound_state, Instance, Message, SliceConfig};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Counter {
//!     count: i32,
//! }
//!
//! let config = SliceConfig::<Counter, i32>::new(Counter { count: 0 })
//!     .handler("increment", |state, _| state.count += 1);
//!
//! let mut instance = Instance::new();
//! let (state, actions, _dispatch) = instance.render(|cx| use_bound_state(cx, &config));
//! assert_eq!(state.count, 0);
//!
//! actions.get("increment").unwrap().call();
//! assert!(instance.has_pending());
//!
//! let (state, _, _) = instance.render(|cx| use_bound_state(cx, &config));
//! assert_eq!(state.count, 1);
//! ```

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use tokio::sync::mpsc;

use crate::action::Message;
use crate::slice::{build, ActionCreator, ActionCreators, Slice, SliceConfig, SliceReducer};
use crate::store::{Dispatcher, Schedule, StateCell};

/// A mounted component instance owning its hook state.
///
/// Dropping the instance unmounts it; [`remount`](Self::remount) resets
/// every hook as if the component had been mounted fresh (e.g. on key
/// change).
pub struct Instance {
    slots: Vec<Box<dyn Any>>,
    schedule_tx: mpsc::UnboundedSender<usize>,
    schedule_rx: mpsc::UnboundedReceiver<usize>,
    pending: bool,
    renders: u64,
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("slots", &self.slots.len())
            .field("pending", &self.pending)
            .field("renders", &self.renders)
            .finish()
    }
}

impl Instance {
    /// Mount a new instance with no hook state
    pub fn new() -> Self {
        let (schedule_tx, schedule_rx) = mpsc::unbounded_channel();
        Self {
            slots: Vec::new(),
            schedule_tx,
            schedule_rx,
            pending: false,
            renders: 0,
        }
    }

    /// Run one render pass.
    ///
    /// Queued dispatches become visible to hooks called during this pass.
    pub fn render<R>(&mut self, f: impl FnOnce(&mut Scope<'_>) -> R) -> R {
        self.drain_schedule();
        self.pending = false;

        let mut scope = Scope {
            instance: self,
            cursor: 0,
        };
        let output = f(&mut scope);
        let used = scope.cursor;

        if used != self.slots.len() {
            tracing::warn!(
                used,
                slots = self.slots.len(),
                "Render called fewer hooks than a previous render"
            );
        }
        self.renders += 1;
        output
    }

    /// Number of completed render passes since mount
    pub fn renders(&self) -> u64 {
        self.renders
    }

    /// Whether a dispatch has scheduled a render since the last pass
    pub fn has_pending(&mut self) -> bool {
        self.drain_schedule();
        self.pending
    }

    /// Wait until a dispatch schedules a render.
    ///
    /// Returns immediately if one is already pending.
    pub async fn scheduled(&mut self) {
        if self.has_pending() {
            return;
        }
        if self.schedule_rx.recv().await.is_some() {
            self.pending = true;
        }
    }

    /// Drop all hook state; the next render starts from initial values.
    ///
    /// Dispatchers handed out before the remount become inert.
    pub fn remount(&mut self) {
        tracing::debug!(slots = self.slots.len(), "Remounting instance");
        self.slots.clear();
        self.drain_schedule();
        self.pending = false;
        self.renders = 0;
    }

    fn drain_schedule(&mut self) {
        while self.schedule_rx.try_recv().is_ok() {
            self.pending = true;
        }
    }
}

/// Hook context for one render pass
pub struct Scope<'a> {
    instance: &'a mut Instance,
    cursor: usize,
}

impl Scope<'_> {
    /// Local reducer-driven state.
    ///
    /// On the first render the cell is seeded from `init`; afterwards `init`
    /// is ignored, `reducer` replaces the previous one, and any queued
    /// messages are applied before the current state is returned.
    ///
    /// # Panics
    ///
    /// Panics if the hook at this position had a different state or payload
    /// type on an earlier render (hooks called in a different order).
    pub fn use_reducer<S, P>(
        &mut self,
        reducer: SliceReducer<S, P>,
        init: impl FnOnce() -> S,
    ) -> (Rc<S>, Dispatcher<P>)
    where
        S: Clone + 'static,
        P: 'static,
    {
        let slot = self.cursor;
        self.cursor += 1;

        let cell = if slot == self.instance.slots.len() {
            let schedule = Schedule {
                tx: self.instance.schedule_tx.clone(),
                slot,
            };
            let cell = StateCell::new(init(), reducer).with_schedule(schedule);
            self.instance.slots.push(Box::new(cell));
            cell_at::<S, P>(&mut self.instance.slots, slot)
        } else {
            let cell = cell_at::<S, P>(&mut self.instance.slots, slot);
            cell.replace_reducer(reducer);
            cell
        };

        cell.commit();
        (cell.state(), cell.dispatcher())
    }
}

fn cell_at<S: 'static, P: 'static>(
    slots: &mut [Box<dyn Any>],
    slot: usize,
) -> &mut StateCell<S, P> {
    slots[slot]
        .downcast_mut::<StateCell<S, P>>()
        .unwrap_or_else(|| {
            panic!(
                "hook slot {slot} changed type between renders; \
                 hooks must be called in the same order on every render"
            )
        })
}

/// Bind a slice config to local state.
///
/// Builds the slice (on every call), registers its reducer with a state cell
/// seeded from the config's initial state, and returns
/// `(current_state, bound_actions, dispatch)`.
///
/// The bound actions are a fresh mapping: each entry builds its message with
/// the slice's creator and hands it to `dispatch`, returning nothing. The raw
/// dispatcher is returned for messages the bound actions cannot express.
pub fn use_bound_state<S, P>(
    cx: &mut Scope<'_>,
    config: &SliceConfig<S, P>,
) -> (Rc<S>, BoundActions<P>, Dispatcher<P>)
where
    S: Clone + 'static,
    P: 'static,
{
    let Slice { reducer, actions } = build(config);
    let (state, dispatch) = cx.use_reducer(reducer, || config.initial_state().clone());
    let bound = BoundActions::bind(&actions, &dispatch);
    (state, bound, dispatch)
}

/// An action-creator that submits its message instead of returning it
pub struct BoundAction<P> {
    creator: ActionCreator<P>,
    dispatcher: Dispatcher<P>,
}

impl<P> BoundAction<P> {
    /// The message kind this action dispatches
    pub fn kind(&self) -> &str {
        self.creator.kind()
    }

    /// Dispatch a message with an optional payload
    pub fn invoke(&self, payload: Option<P>) {
        self.dispatcher.dispatch(self.creator.create(payload));
    }

    /// Dispatch a message without a payload
    pub fn call(&self) {
        self.invoke(None);
    }

    /// Dispatch a message carrying `payload`
    pub fn call_with(&self, payload: P) {
        self.invoke(Some(payload));
    }
}

impl<P> Clone for BoundAction<P> {
    fn clone(&self) -> Self {
        Self {
            creator: self.creator.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<P> fmt::Debug for BoundAction<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BoundAction").field(&self.kind()).finish()
    }
}

/// One [`BoundAction`] per handler name, all sharing one dispatcher.
///
/// `#[derive(ActionKind)]` adds typed methods to this type through a
/// generated `{Enum}Actions<P>` trait.
pub struct BoundActions<P> {
    actions: Vec<BoundAction<P>>,
    dispatcher: Dispatcher<P>,
}

impl<P> BoundActions<P> {
    /// Wrap each creator in a closure over `dispatcher`
    pub fn bind(creators: &ActionCreators<P>, dispatcher: &Dispatcher<P>) -> Self {
        let actions = creators
            .iter()
            .map(|creator| BoundAction {
                creator: creator.clone(),
                dispatcher: dispatcher.clone(),
            })
            .collect();
        Self {
            actions,
            dispatcher: dispatcher.clone(),
        }
    }

    /// Look up the bound action for `kind`
    pub fn get(&self, kind: &str) -> Option<&BoundAction<P>> {
        self.actions.iter().find(|action| action.kind() == kind)
    }

    /// Dispatch a message by kind without going through a creator.
    ///
    /// The reducer decides what an unknown kind does.
    pub fn dispatch_kind(&self, kind: impl Into<Cow<'static, str>>, payload: Option<P>) {
        self.dispatcher.dispatch(Message {
            kind: kind.into(),
            payload,
        });
    }

    /// Action names, in declaration order
    pub fn kinds(&self) -> impl Iterator<Item = &str> + '_ {
        self.actions.iter().map(BoundAction::kind)
    }

    /// Iterate over the bound actions
    pub fn iter(&self) -> std::slice::Iter<'_, BoundAction<P>> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<P> Clone for BoundActions<P> {
    fn clone(&self) -> Self {
        Self {
            actions: self.actions.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<P> fmt::Debug for BoundActions<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}

impl<'a, P> IntoIterator for &'a BoundActions<P> {
    type Item = &'a BoundAction<P>;
    type IntoIter = std::slice::Iter<'a, BoundAction<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

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
    }

    #[test]
    fn test_first_render_returns_initial_state() {
        let config = counter_config();
        let mut instance = Instance::new();

        let (state, actions, _) = instance.render(|cx| use_bound_state(cx, &config));

        assert_eq!(*state, Counter::default());
        assert_eq!(actions.kinds().collect::<Vec<_>>(), vec!["increment", "incrementBy"]);
        assert_eq!(instance.renders(), 1);
        assert!(!instance.has_pending());
    }

    #[test]
    fn test_bound_action_updates_on_next_render() {
        let config = counter_config();
        let mut instance = Instance::new();

        let (state, actions, _) = instance.render(|cx| use_bound_state(cx, &config));
        actions.get("incrementBy").unwrap().call_with(3);

        // The snapshot from the earlier render never changes.
        assert_eq!(state.count, 0);
        assert!(instance.has_pending());

        let (state, _, _) = instance.render(|cx| use_bound_state(cx, &config));
        assert_eq!(state.count, 3);
        assert!(!instance.has_pending());
    }

    #[test]
    fn test_initial_state_only_seeds_first_render() {
        let mut instance = Instance::new();
        let (_, actions, _) = instance.render(|cx| use_bound_state(cx, &counter_config()));
        actions.get("increment").unwrap().call();

        let reseeded = SliceConfig::<Counter, i32>::new(Counter { count: 50 })
            .handler("increment", |state: &mut Counter, _| state.count += 1);
        let (state, _, _) = instance.render(|cx| use_bound_state(cx, &reseeded));
        assert_eq!(state.count, 1);
    }

    #[test]
    fn test_multiple_hooks_keep_separate_state() {
        let config = counter_config();
        let mut instance = Instance::new();

        let (first, second) = instance.render(|cx| {
            let (_, first, _) = use_bound_state(cx, &config);
            let (_, second, _) = use_bound_state(cx, &config);
            (first, second)
        });
        first.get("incrementBy").unwrap().call_with(10);
        second.get("increment").unwrap().call();

        let (a, b) = instance.render(|cx| {
            let (a, _, _) = use_bound_state(cx, &config);
            let (b, _, _) = use_bound_state(cx, &config);
            (a, b)
        });
        assert_eq!(a.count, 10);
        assert_eq!(b.count, 1);
    }

    #[test]
    fn test_remount_resets_state() {
        let config = counter_config();
        let mut instance = Instance::new();

        let (_, actions, _) = instance.render(|cx| use_bound_state(cx, &config));
        actions.get("increment").unwrap().call();
        instance.render(|cx| use_bound_state(cx, &config));

        instance.remount();
        let (state, _, dispatch) = instance.render(|cx| use_bound_state(cx, &config));
        assert_eq!(state.count, 0);
        assert!(dispatch.is_live());

        // Actions bound before the remount no longer reach any cell.
        actions.get("increment").unwrap().call();
        assert!(!instance.has_pending());
    }

    #[test]
    fn test_dispatch_after_unmount_is_noop() {
        let config = counter_config();
        let mut instance = Instance::new();
        let (_, actions, dispatch) = instance.render(|cx| use_bound_state(cx, &config));

        drop(instance);
        assert!(!dispatch.is_live());
        actions.get("increment").unwrap().call();
        dispatch.dispatch(Message::new("increment"));
    }

    #[test]
    fn test_dispatch_kind_reaches_reducer() {
        let config = counter_config();
        let mut instance = Instance::new();

        let (_, actions, _) = instance.render(|cx| use_bound_state(cx, &config));
        actions.dispatch_kind("incrementBy", Some(7));
        actions.dispatch_kind("unknown", None);

        let (state, _, _) = instance.render(|cx| use_bound_state(cx, &config));
        assert_eq!(state.count, 7);
    }

    #[test]
    #[should_panic(expected = "changed type between renders")]
    fn test_hook_order_change_panics() {
        let mut instance = Instance::new();
        instance.render(|cx| use_bound_state(cx, &counter_config()));

        let other = SliceConfig::<String, ()>::new(String::new());
        instance.render(|cx| use_bound_state(cx, &other));
    }

    #[tokio::test]
    async fn test_scheduled_wakes_after_dispatch() {
        let config = counter_config();
        let mut instance = Instance::new();
        let (_, _, dispatch) = instance.render(|cx| use_bound_state(cx, &config));

        let task = tokio::spawn(async move {
            dispatch.dispatch(Message::with_payload("incrementBy", 4));
        });
        tokio::time::timeout(Duration::from_secs(1), instance.scheduled())
            .await
            .expect("dispatch should schedule a render");
        task.await.unwrap();

        let (state, _, _) = instance.render(|cx| use_bound_state(cx, &config));
        assert_eq!(state.count, 4);
    }
}
