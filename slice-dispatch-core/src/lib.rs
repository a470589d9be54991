//! Core types for slice-dispatch
//!
//! This crate provides local, reducer-driven state for component-style code:
//! declare a slice (initial state plus named handlers) once, and get back the
//! current state and action callables that dispatch themselves.
//!
//! # Core Concepts
//!
//! - **Slice**: a [`SliceConfig`] turned by [`build`] into a pure
//!   [`SliceReducer`] and matching [`ActionCreators`]
//! - **Message**: a tagged value naming a handler plus an optional payload
//! - **StateCell**: single-owner state driven by a reducer through a queued
//!   [`Dispatcher`]
//! - **Instance / Scope**: a mounted component and its per-render hook slots
//! - **Bound actions**: creators wrapped so calling them dispatches
//!
//! # Basic Example
//!
//! ```
//! use slice_dispatch_core::prelude::*;
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
//! let mut instance = Instance::new();
//! let (_, actions, dispatch) = instance.render(|cx| use_bound_state(cx, &config));
//!
//! actions.get("increment").unwrap().call();
//! actions.get("incrementBy").unwrap().call_with(2);
//! dispatch.dispatch(Message::with_payload("incrementBy", 5));
//!
//! let (state, _, _) = instance.render(|cx| use_bound_state(cx, &config));
//! assert_eq!(state.count, 8);
//! ```
//!
//! # Unknown message kinds
//!
//! A message naming a kind without a handler leaves the state unchanged and
//! logs a warning through `tracing`. [`SliceReducer::try_reduce`] reports the
//! same situation as [`SliceError::UnhandledKind`].

pub mod action;
pub mod error;
pub mod hooks;
pub mod slice;
pub mod store;
pub mod testing;

// Core exports
pub use action::{ActionKind, Message};
pub use error::SliceError;

// Slice builder exports
pub use slice::{
    build, prepare, ActionCreator, ActionCreators, Handler, Replace, Slice, SliceConfig,
    SliceReducer, Update, DEFAULT_SLICE_NAME,
};

// State cell exports
pub use store::{Dispatcher, StateCell};

// Hook exports
pub use hooks::{use_bound_state, BoundAction, BoundActions, Instance, Scope};

// Testing exports
pub use testing::SliceHarness;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{ActionKind, Message};
    pub use crate::error::SliceError;
    pub use crate::hooks::{use_bound_state, BoundAction, BoundActions, Instance, Scope};
    pub use crate::slice::{build, prepare, Replace, SliceConfig, SliceReducer};
    pub use crate::store::{Dispatcher, StateCell};
}
