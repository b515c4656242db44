//! Media relay abstraction
//!
//! The SFU is consumed as an opaque capability: join a room with
//! credentials, offer local tracks as producers, receive remote consumers,
//! stop producers by source tag, and tear the whole session down. Offer/
//! answer and ICE negotiation happen inside the implementor and never
//! surface here.

use async_trait::async_trait;
use tokio::sync::mpsc;

use omnimeet_meeting_core::media::{
    ConsumerId, MediaConsumer, MediaKind, MediaProducer, MediaSource, MediaTrack,
};
use omnimeet_meeting_core::types::{MeetingId, RoomCredentials};

use crate::error::MeetingResult;

/// Asynchronous notifications from the relay session
#[derive(Debug)]
pub enum RelayNotification {
    /// A remote producer became available and was subscribed to
    ConsumerAdded(MediaConsumer),

    /// A remote producer stopped; its consumer is gone
    ConsumerClosed {
        /// The departed consumer
        consumer_id: ConsumerId,
    },

    /// The platform ended a local producer out-of-band
    ///
    /// The canonical case is the user clicking the native "stop sharing"
    /// control, which kills the screen track without any command from the
    /// controller. The controller must react exactly as it would to an
    /// explicit stop.
    ProducerClosed {
        /// Source tag of the closed producer
        source: MediaSource,
    },
}

/// Capability contract for the media relay session
///
/// One relay session exists per meeting attempt. Producers are keyed by
/// source tag on the relay side, matching the at-most-one-per-source
/// invariant of the local session.
#[async_trait]
pub trait MediaRelay: Send + Sync {
    /// Establish the relay session using credentials from the join handshake
    async fn join_room(
        &self,
        meeting_id: &MeetingId,
        credentials: &RoomCredentials,
    ) -> MeetingResult<()>;

    /// Offer a local track to the relay
    async fn create_producer(
        &self,
        track: MediaTrack,
        kind: MediaKind,
        source: MediaSource,
    ) -> MeetingResult<MediaProducer>;

    /// Stop the producer with the given source tag, if any
    async fn stop_producer(&self, source: MediaSource) -> MeetingResult<()>;

    /// Take the notification stream for this session
    ///
    /// Called once per session, after [`MediaRelay::join_room`] succeeds.
    async fn take_notifications(&self) -> MeetingResult<mpsc::Receiver<RelayNotification>>;

    /// Tear down the relay session and everything in it
    async fn close(&self) -> MeetingResult<()>;
}
