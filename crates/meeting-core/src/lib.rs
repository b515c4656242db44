//! # Meeting Core - Meeting State Layer
//!
//! Pure state layer for multi-party meeting sessions. This crate owns the
//! data model and the reconciliation logic that turns two independent
//! asynchronous event sources - the signaling/presence channel and the
//! media relay - into a single coherent picture:
//!
//! - **presence**: authoritative live-participant list, merged from
//!   full-sync snapshots and incremental join/leave/update events
//! - **chat**: append-only, deduplicated, arrival-ordered message log
//! - **speaker**: last-write-wins active speaker highlight
//! - **binding**: pure resolution of participants + consumers + producers
//!   into a rendering-ready track mapping, including the screen-share
//!   spotlight
//! - **wire**: the typed named-event contract spoken with the
//!   coordination server
//!
//! There is no I/O here. All mutation goes through reducer-style
//! application functions so each piece of state has exactly one writer and
//! can be tested in isolation. Orchestration (join sequencing, producer
//! lifecycle, teardown) lives in the companion `omnimeet-meeting-client`
//! crate.

#![warn(missing_docs)]

pub mod binding;
pub mod chat;
pub mod media;
pub mod presence;
pub mod speaker;
pub mod types;
pub mod wire;

// Re-export main types
pub use binding::{BoundTrack, PresentationBinding, RenderPlan, TileBinding};
pub use chat::ChatLog;
pub use media::{
    ConsumerId, MediaConsumer, MediaKind, MediaProducer, MediaSource, MediaTrack, ProducerId,
    TrackId,
};
pub use presence::PresenceReconciler;
pub use speaker::ActiveSpeakerTracker;
pub use types::{
    ChatMessage, ConsentFlags, InvitedParticipant, MeetingDetails, MeetingId, MeetingStatus,
    Participant, ParticipantState, Role, RoomCredentials, SessionPhase, SummaryDocument, UserId,
};
pub use wire::{SignalCommand, SignalEvent, WireError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
