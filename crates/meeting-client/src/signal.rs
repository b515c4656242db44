//! Signaling channel abstraction
//!
//! The coordination server is reached over a persistent bidirectional
//! event connection (socket transport details live in the implementor).
//! This module defines the capability the session controller needs:
//! emitting typed commands and holding a room-scoped subscription.
//!
//! Subscriptions are explicit owned objects rather than ambient listener
//! registrations: the controller creates one on entering the meeting and
//! drops it on leaving, which deregisters the handlers and guarantees no
//! stale events are applied after a rejoin.

use async_trait::async_trait;
use tokio::sync::mpsc;

use omnimeet_meeting_core::types::MeetingId;
use omnimeet_meeting_core::wire::{SignalCommand, SignalEvent};

use crate::error::MeetingResult;

/// An owned, room-scoped subscription to inbound signaling events
///
/// Dropping the subscription closes the receiving side; implementations
/// observe the closed channel and deregister their underlying listeners.
#[derive(Debug)]
pub struct SignalSubscription {
    meeting_id: MeetingId,
    events: mpsc::Receiver<SignalEvent>,
}

impl SignalSubscription {
    /// Build a subscription from a meeting scope and an event receiver
    pub fn new(meeting_id: MeetingId, events: mpsc::Receiver<SignalEvent>) -> Self {
        Self { meeting_id, events }
    }

    /// The meeting this subscription is scoped to
    pub fn meeting_id(&self) -> &MeetingId {
        &self.meeting_id
    }

    /// Receive the next inbound event
    ///
    /// Returns `None` once the channel side has shut down.
    pub async fn recv(&mut self) -> Option<SignalEvent> {
        self.events.recv().await
    }
}

/// Persistent bidirectional event connection to the coordination server
///
/// Implementations handle transport, authentication, and reconnection;
/// the controller only sees typed commands and events. On re-join after a
/// reconnect the server sends a fresh full-sync snapshot, which is the
/// recovery path for any incremental events missed while disconnected.
#[async_trait]
pub trait SignalChannel: Send + Sync {
    /// Emit a command on the meeting's logical room
    async fn emit(&self, command: SignalCommand) -> MeetingResult<()>;

    /// Subscribe to inbound events for one meeting room
    async fn subscribe(&self, meeting_id: &MeetingId) -> MeetingResult<SignalSubscription>;
}
