//! slice-dispatch: local reducer slices with auto-dispatching action creators
//!
//! Declare a slice once (initial state plus named handlers) and bind it to a
//! component instance: you get the current state, one callable per handler
//! that dispatches itself, and the raw dispatcher.
//!
//! # Example
//! ```
//! use slice_dispatch::prelude::*;
//!
//! #[derive(ActionKind, Clone, Copy, Debug)]
//! #[action(rename_all = "camelCase")]
//! enum Counter {
//!     Increment,
//!     #[action(payload)]
//!     IncrementBy,
//! }
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct CounterState {
//!     count: i32,
//! }
//!
//! let config = SliceConfig::<CounterState, i32>::new(CounterState::default())
//!     .handler(Counter::Increment, |state, _| state.count += 1)
//!     .handler(Counter::IncrementBy, |state, msg| {
//!         state.count += msg.payload().copied().unwrap_or_default()
//!     });
//!
//! let mut instance = Instance::new();
//! let (_, actions, _) = instance.render(|cx| use_bound_state(cx, &config));
//! actions.increment();
//! actions.increment_by(2);
//!
//! let (state, _, _) = instance.render(|cx| use_bound_state(cx, &config));
//! assert_eq!(state.count, 3);
//! ```

// Re-export everything from core
pub use slice_dispatch_core::*;

// Re-export derive macros
pub use slice_dispatch_macros::ActionKind;

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use slice_dispatch_core::ActionKind;

    // Slice builder
    pub use slice_dispatch_core::{build, prepare, Message, Replace, SliceConfig, SliceReducer};

    // State cells and hooks
    pub use slice_dispatch_core::{
        use_bound_state, BoundAction, BoundActions, Dispatcher, Instance, Scope, StateCell,
    };

    pub use slice_dispatch_core::SliceError;

    // Derive macros
    pub use slice_dispatch_macros::ActionKind;
}
