//! Error types for the meeting client library
//!
//! The taxonomy mirrors how failures are actually handled: device trouble
//! is non-fatal and degrades to an off state, join failures are retryable
//! and leave the session in pre-join, stale updates are not errors at all
//! (the reducers discard them), and a host-forced end is a normal
//! transition rather than a failure. No error path may leave the session
//! controller in an undefined phase.

use std::fmt;
use thiserror::Error;

use omnimeet_meeting_core::wire::WireError;

/// Result type for meeting client operations
pub type MeetingResult<T> = Result<T, MeetingError>;

/// Which step of the join sequence failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStage {
    /// The join handshake with the meeting service
    Handshake,
    /// Establishing the media relay session
    RelayConnect,
    /// Creating local media producers
    Produce,
    /// Subscribing to the meeting's signaling room
    Subscribe,
    /// Announcing presence on the signaling channel
    Announce,
}

impl fmt::Display for JoinStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JoinStage::Handshake => "join handshake",
            JoinStage::RelayConnect => "relay connect",
            JoinStage::Produce => "producer setup",
            JoinStage::Subscribe => "signal subscribe",
            JoinStage::Announce => "presence announce",
        };
        f.write_str(s)
    }
}

/// Errors that can occur in the meeting client
#[derive(Debug, Error)]
pub enum MeetingError {
    /// Camera/microphone denied or unavailable; recovered locally by
    /// falling back to an off state
    #[error("media device unavailable: {reason}")]
    DeviceUnavailable {
        /// What the device layer reported
        reason: String,
    },

    /// A join attempt failed; the session is back in pre-join and the user
    /// may retry explicitly
    #[error("join failed during {stage}: {reason}")]
    JoinFailed {
        /// Step of the join sequence that failed
        stage: JoinStage,
        /// What went wrong
        reason: String,
    },

    /// A leave arrived while a join was in flight; the attempt was
    /// unwound and all resources released
    #[error("join attempt cancelled")]
    JoinCancelled,

    /// Operation is not valid in the current lifecycle phase
    #[error("invalid state: {message}")]
    InvalidState {
        /// Details of the violation
        message: String,
    },

    /// Operation requires an active meeting session
    #[error("not currently in a meeting")]
    NotInMeeting,

    /// The meeting service does not know this meeting
    #[error("meeting not found: {meeting_id}")]
    MeetingNotFound {
        /// The unknown meeting id
        meeting_id: String,
    },

    /// Meeting service request failed
    #[error("meeting service error: {message}")]
    Service {
        /// What the service reported
        message: String,
    },

    /// Media relay operation failed
    #[error("media relay error: {message}")]
    Relay {
        /// What the relay reported
        message: String,
    },

    /// Signaling channel operation failed
    #[error("signaling error: {message}")]
    Signal {
        /// What the channel reported
        message: String,
    },

    /// Malformed signaling traffic
    #[error("wire protocol error: {0}")]
    Wire(#[from] WireError),
}

impl MeetingError {
    /// Create a device-unavailable error
    pub fn device(reason: impl Into<String>) -> Self {
        Self::DeviceUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a join-failed error for the given stage
    pub fn join_failed(stage: JoinStage, reason: impl Into<String>) -> Self {
        Self::JoinFailed {
            stage,
            reason: reason.into(),
        }
    }

    /// Create an invalid-state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a meeting service error
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }

    /// Create a media relay error
    pub fn relay(message: impl Into<String>) -> Self {
        Self::Relay {
            message: message.into(),
        }
    }

    /// Create a signaling error
    pub fn signal(message: impl Into<String>) -> Self {
        Self::Signal {
            message: message.into(),
        }
    }
}
