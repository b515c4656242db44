//! Client-facing event stream
//!
//! The session controller broadcasts [`MeetingEvent`]s so UI layers can
//! re-render without polling. Events describe state that has *already*
//! been applied to the session's stores; handlers should read current
//! state from the session at call time rather than capturing snapshots.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use omnimeet_meeting_core::types::{ChatMessage, Participant, ParticipantState, SessionPhase, UserId};

/// Events emitted by the meeting session controller
#[derive(Debug, Clone)]
pub enum MeetingEvent {
    /// Lifecycle phase changed
    PhaseChanged {
        /// The phase now in effect
        phase: SessionPhase,
    },

    /// A full participant snapshot replaced the live roster
    ParticipantsSynced {
        /// Size of the new roster
        count: usize,
    },

    /// A participant joined the live roster
    ParticipantJoined {
        /// Who joined
        participant: Participant,
    },

    /// A participant left the live roster
    ParticipantLeft {
        /// Who left
        user_id: UserId,
    },

    /// A participant's live state was replaced
    ParticipantUpdated {
        /// Whose state changed
        user_id: UserId,
        /// The new state record
        state: ParticipantState,
    },

    /// The active speaker highlight moved
    ActiveSpeakerChanged {
        /// New active speaker; `None` clears the highlight
        user_id: Option<UserId>,
    },

    /// A chat message was appended to the log
    ChatMessageReceived {
        /// The appended message
        message: ChatMessage,
    },

    /// Consumers or producers changed; the render plan should be recomputed
    MediaBindingsChanged,

    /// Local screen sharing started
    ScreenShareStarted,

    /// Local screen sharing stopped (explicitly or by the platform)
    ScreenShareStopped,

    /// The meeting ended
    MeetingEnded {
        /// Whether the host forced the end (as opposed to a local leave)
        by_host: bool,
    },

    /// Non-fatal problem the UI may want to surface
    Warning {
        /// Human-readable description
        message: String,
    },
}

/// Stream adapter over the session's broadcast channel
///
/// Lagged receivers skip the dropped events and continue; the stream ends
/// when the session is dropped.
pub struct EventStream {
    inner: BroadcastStream<MeetingEvent>,
}

impl EventStream {
    pub(crate) fn new(rx: broadcast::Receiver<MeetingEvent>) -> Self {
        Self {
            inner: BroadcastStream::new(rx),
        }
    }
}

impl Stream for EventStream {
    type Item = MeetingEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => return Poll::Ready(Some(event)),
                // Dropped events under lag are skipped, not surfaced
                Poll::Ready(Some(Err(_))) => continue,
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
