//! Messages and typed action kinds

use std::borrow::Cow;
use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::SliceError;

/// A tagged message describing one intended state change.
///
/// `kind` names the handler that should run; `payload` carries its optional
/// argument. Messages are built by action-creators and consumed only by the
/// reducer.
///
/// The payload type defaults to [`serde_json::Value`] so a slice whose
/// handlers take different payload shapes can still share one message type.
///
/// # Example
///
/// ```
/// use slice_dispatch_core::Message;
///
/// let msg: Message<i32> = Message::with_payload("incrementBy", 5);
/// assert_eq!(msg.kind, "incrementBy");
/// assert_eq!(msg.payload(), Some(&5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message<P = serde_json::Value> {
    /// Name of the handler this message targets
    pub kind: Cow<'static, str>,
    /// Optional handler argument
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<P>,
}

impl<P> Message<P> {
    /// Create a message without a payload
    pub fn new(kind: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
        }
    }

    /// Create a message carrying a payload
    pub fn with_payload(kind: impl Into<Cow<'static, str>>, payload: P) -> Self {
        Self {
            kind: kind.into(),
            payload: Some(payload),
        }
    }

    /// Borrow the payload, if any
    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }
}

impl<P: DeserializeOwned> Message<P> {
    /// Parse a hand-built message such as `{"kind": "incrementBy", "payload": 5}`.
    pub fn from_json(json: &str) -> Result<Self, SliceError> {
        serde_json::from_str(json).map_err(SliceError::InvalidMessage)
    }
}

/// A closed set of handler names known at compile time.
///
/// Implemented by `#[derive(ActionKind)]` on unit-only enums. Each variant
/// names one handler; the derive also generates a `{Enum}Actions<P>` trait on
/// [`BoundActions`](crate::BoundActions) with one method per variant, so the
/// bound-action surface mirrors the handler set exactly.
pub trait ActionKind: Copy + Debug + 'static {
    /// The handler name this kind dispatches to
    fn name(&self) -> &'static str;

    /// Every kind, in declaration order
    fn all() -> &'static [Self];

    /// Whether the generated bound method takes a payload argument
    fn takes_payload(&self) -> bool;

    /// Build a pure message of this kind
    fn message<P>(self, payload: Option<P>) -> Message<P> {
        Message {
            kind: Cow::Borrowed(self.name()),
            payload,
        }
    }

    /// Names of every kind, in declaration order
    fn names() -> Vec<&'static str> {
        Self::all().iter().map(|kind| kind.name()).collect()
    }
}
