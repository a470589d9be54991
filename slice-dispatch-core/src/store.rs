//! Single-owner state cell with a deferred dispatch queue

use std::fmt;
use std::rc::Rc;

use tokio::sync::mpsc;

use crate::action::Message;
use crate::slice::SliceReducer;

/// Notifies the owning instance that a cell has queued work
#[derive(Clone, Debug)]
pub(crate) struct Schedule {
    pub(crate) tx: mpsc::UnboundedSender<usize>,
    pub(crate) slot: usize,
}

/// Entry point for submitting messages to one [`StateCell`].
///
/// Dispatching only enqueues: the state changes when the cell next commits
/// (for hook-owned cells, on the next render pass). A dispatcher whose cell
/// has been dropped ignores further messages.
pub struct Dispatcher<P> {
    tx: mpsc::UnboundedSender<Message<P>>,
    schedule: Option<Schedule>,
}

impl<P> Dispatcher<P> {
    /// Queue a message for the owning cell
    pub fn dispatch(&self, message: Message<P>) {
        if let Err(mpsc::error::SendError(message)) = self.tx.send(message) {
            tracing::debug!(kind = %message.kind, "State cell dropped, message ignored");
            return;
        }
        if let Some(schedule) = &self.schedule {
            let _ = schedule.tx.send(schedule.slot);
        }
    }

    /// Whether the owning cell still exists
    pub fn is_live(&self) -> bool {
        !self.tx.is_closed()
    }
}

impl<P> Clone for Dispatcher<P> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            schedule: self.schedule.clone(),
        }
    }
}

impl<P> fmt::Debug for Dispatcher<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("live", &self.is_live())
            .field("slot", &self.schedule.as_ref().map(|s| s.slot))
            .finish()
    }
}

/// Local state container driven by a [`SliceReducer`].
///
/// The cell is the only writer of its state. Messages arrive through
/// [`Dispatcher`] handles and are applied in order by [`commit`](Self::commit);
/// [`apply`](Self::apply) bypasses the queue.
///
/// # Example
///
/// ```
/// use slice_dispatch_core::{build, Message, SliceConfig, StateCell};
///
/// let config = SliceConfig::<i32, i32>::new(0)
///     .handler("add", |n, msg| *n += msg.payload().copied().unwrap_or(1));
/// let mut cell = StateCell::new(0, build(&config).reducer);
///
/// let dispatch = cell.dispatcher();
/// dispatch.dispatch(Message::with_payload("add", 5));
/// assert_eq!(*cell.state(), 0);
///
/// assert_eq!(cell.commit(), 1);
/// assert_eq!(*cell.state(), 5);
/// ```
pub struct StateCell<S, P> {
    state: Rc<S>,
    reducer: SliceReducer<S, P>,
    tx: mpsc::UnboundedSender<Message<P>>,
    rx: mpsc::UnboundedReceiver<Message<P>>,
    schedule: Option<Schedule>,
}

impl<S, P> StateCell<S, P> {
    /// Create a cell seeded with `state`
    pub fn new(state: S, reducer: SliceReducer<S, P>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: Rc::new(state),
            reducer,
            tx,
            rx,
            schedule: None,
        }
    }

    pub(crate) fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// A handle that queues messages for this cell
    pub fn dispatcher(&self) -> Dispatcher<P> {
        Dispatcher {
            tx: self.tx.clone(),
            schedule: self.schedule.clone(),
        }
    }

    /// The current state snapshot
    pub fn state(&self) -> Rc<S> {
        Rc::clone(&self.state)
    }

    /// The reducer used by the next commit
    pub fn reducer(&self) -> &SliceReducer<S, P> {
        &self.reducer
    }

    /// Swap in a new reducer; queued messages will be reduced by it
    pub fn replace_reducer(&mut self, reducer: SliceReducer<S, P>) {
        self.reducer = reducer;
    }
}

impl<S: Clone, P> StateCell<S, P> {
    /// Apply a message immediately, bypassing the queue
    pub fn apply(&mut self, message: &Message<P>) {
        self.reducer.reduce_in_place(&mut self.state, message);
    }

    /// Apply every queued message in order.
    ///
    /// Returns the number of messages processed.
    pub fn commit(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.apply(&message);
            applied += 1;
        }
        if applied > 0 {
            tracing::debug!(
                slice = %self.reducer.name(),
                applied,
                "Committed queued messages"
            );
        }
        applied
    }
}
