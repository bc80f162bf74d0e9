//! Typed push events.
//!
//! The push transport delivers opaque `(channel, event name, JSON payload)`
//! triples. [`PushEvent::decode`] turns them into a closed enum at the
//! transport boundary so the state machines never see an event-name string.
//!
//! # Invariants
//!
//! - Every variant is valid on exactly one channel category; a known event
//!   name arriving on the wrong channel decodes to `None` (ignored).
//! - Unknown event names decode to `None`, never to an error. Only a known
//!   name with a malformed payload errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Channel;

/// Wire-level event names per channel.
///
/// The server grew these names across revisions, so the visitor's private
/// channel uses PascalCase class names while the provider's private channel
/// and the broadcast channel use dotted names. Decoding accepts both
/// spellings where the server has emitted both.
pub mod event_names {
    /// Provider picked this visitor up (visitor private channel).
    pub const VISITOR_PICKED_UP: &str = "VisitorPickedUpEvent";
    /// This visitor's examination completed (visitor private channel).
    pub const VISITOR_EXAMINATION_COMPLETED: &str = "VisitorExaminationCompletedEvent";
    /// The provider ended the pairing (visitor private channel).
    pub const VISITOR_EXITED: &str = "VisitorExitedEvent";

    /// A visitor joined the queue (broadcast channel).
    pub const VISITOR_JOINED_QUEUE: &str = "visitor.joined.queue";
    /// Legacy spelling of [`VISITOR_JOINED_QUEUE`].
    pub const VISITOR_JOINED_QUEUE_LEGACY: &str = "VisitorJoinedQueue";
    /// A visitor left the queue (broadcast channel).
    pub const VISITOR_EXITED_QUEUE: &str = "visitor.exited.queue";
    /// Legacy spelling of [`VISITOR_EXITED_QUEUE`].
    pub const VISITOR_EXITED_QUEUE_LEGACY: &str = "VisitorExitedQueue";

    /// This provider picked a visitor up (provider private channel).
    pub const PROVIDER_PICKED_UP_VISITOR: &str = "provider.pickedup.visitor";
    /// This provider completed an examination (provider private channel).
    pub const PROVIDER_COMPLETED_EXAMINATION: &str = "provider.completed.examination";
}

/// One raw delivery from the push transport, before decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEnvelope {
    /// Channel the event arrived on.
    pub channel: Channel,
    /// Wire-level event name.
    pub event: String,
    /// Opaque JSON payload.
    pub payload: serde_json::Value,
}

/// One party of an examination, as carried in pickup events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Role-scoped id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Email, when the server shares it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Payload of [`PushEvent::VisitorPickedUp`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupEvent {
    /// The provider who picked the visitor up.
    pub provider: Party,
    /// The visitor who was picked up.
    pub visitor: Party,
    /// Server-assigned examination id.
    pub examination_id: u64,
    /// Server timestamp of the pickup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    /// Server-side message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Payload of the queue membership broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueBroadcast {
    /// Visitor whose membership changed.
    pub visitor_id: u64,
    /// Display name, when carried.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitor_name: Option<String>,
    /// Position after the change, when carried.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    /// Server-side message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A decoded push event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    /// A provider picked this visitor up. Visitor private channel.
    VisitorPickedUp(PickupEvent),
    /// This visitor's examination completed. Visitor private channel.
    VisitorExaminationCompleted,
    /// The provider ended the pairing without a formal completion. Visitor
    /// private channel.
    VisitorExited,
    /// A visitor joined the queue. Broadcast channel.
    VisitorJoinedQueue(QueueBroadcast),
    /// A visitor left the queue. Broadcast channel.
    VisitorExitedQueue(QueueBroadcast),
    /// This provider picked a visitor up. Provider private channel.
    ProviderPickedUpVisitor,
    /// This provider completed an examination. Provider private channel.
    ProviderCompletedExamination,
}

/// Malformed payload for a known event name.
#[derive(Debug, Error)]
#[error("malformed payload for push event {event:?}: {source}")]
pub struct DecodeError {
    /// The event name whose payload failed to decode.
    pub event: String,
    /// Underlying JSON error.
    #[source]
    pub source: serde_json::Error,
}

impl PushEvent {
    /// Decode a raw delivery.
    ///
    /// `Ok(None)` means the event is outside the contract for that channel
    /// and must be ignored.
    pub fn decode(
        channel: Channel,
        event: &str,
        payload: &serde_json::Value,
    ) -> Result<Option<Self>, DecodeError> {
        use event_names as names;

        let decoded = match (channel, event) {
            (Channel::VisitorPrivate(_), names::VISITOR_PICKED_UP) => {
                Some(Self::VisitorPickedUp(parse(event, payload)?))
            },
            (Channel::VisitorPrivate(_), names::VISITOR_EXAMINATION_COMPLETED) => {
                Some(Self::VisitorExaminationCompleted)
            },
            (Channel::VisitorPrivate(_), names::VISITOR_EXITED) => Some(Self::VisitorExited),

            (
                Channel::LoungeQueue,
                names::VISITOR_JOINED_QUEUE | names::VISITOR_JOINED_QUEUE_LEGACY,
            ) => Some(Self::VisitorJoinedQueue(parse(event, payload)?)),
            (
                Channel::LoungeQueue,
                names::VISITOR_EXITED_QUEUE | names::VISITOR_EXITED_QUEUE_LEGACY,
            ) => Some(Self::VisitorExitedQueue(parse(event, payload)?)),

            (Channel::ProviderPrivate(_), names::PROVIDER_PICKED_UP_VISITOR) => {
                Some(Self::ProviderPickedUpVisitor)
            },
            (Channel::ProviderPrivate(_), names::PROVIDER_COMPLETED_EXAMINATION) => {
                Some(Self::ProviderCompletedExamination)
            },

            _ => None,
        };

        Ok(decoded)
    }

    /// Decode an envelope. See [`PushEvent::decode`].
    pub fn decode_envelope(envelope: &PushEnvelope) -> Result<Option<Self>, DecodeError> {
        Self::decode(envelope.channel, &envelope.event, &envelope.payload)
    }
}

fn parse<T: serde::de::DeserializeOwned>(
    event: &str,
    payload: &serde_json::Value,
) -> Result<T, DecodeError> {
    serde_json::from_value(payload.clone())
        .map_err(|source| DecodeError { event: event.to_string(), source })
}
