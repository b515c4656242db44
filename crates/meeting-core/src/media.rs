//! Media producer and consumer types
//!
//! The relay is consumed as an opaque capability: a *producer* is a locally
//! originated stream offered to the relay, a *consumer* is a remotely
//! originated stream received from it. These types carry just enough
//! metadata (owner, kind, source tag) for the binding resolver to map each
//! consumer onto the participant tile it visually belongs to. Transport and
//! codec negotiation stay inside the relay client.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::types::UserId;

/// Identifier for a local media track handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(Uuid);

impl TrackId {
    /// Generate a fresh track id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Relay-assigned identifier for a producer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProducerId(String);

impl ProducerId {
    /// Wrap a relay-assigned producer id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the underlying id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProducerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Relay-assigned identifier for a consumer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsumerId(String);

impl ConsumerId {
    /// Wrap a relay-assigned consumer id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the underlying id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of media carried by a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Audio stream
    Audio,
    /// Video stream
    Video,
}

impl MediaKind {
    /// Wire name for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

/// Source tag distinguishing what a track captures
///
/// A camera track and a screen-capture track are both video; the source tag
/// is what lets the resolver route them to different rendering slots, so it
/// is an exhaustive enum rather than a string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaSource {
    /// Microphone capture
    #[serde(rename = "mic")]
    Microphone,
    /// Camera capture
    #[serde(rename = "cam")]
    Camera,
    /// Screen capture
    #[serde(rename = "screen")]
    Screen,
}

impl MediaSource {
    /// Wire tag for this source
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaSource::Microphone => "mic",
            MediaSource::Camera => "cam",
            MediaSource::Screen => "screen",
        }
    }

    /// Media kind produced from this source
    pub fn kind(&self) -> MediaKind {
        match self {
            MediaSource::Microphone => MediaKind::Audio,
            MediaSource::Camera | MediaSource::Screen => MediaKind::Video,
        }
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle to a local platform media track
///
/// Stands in for the device-layer track object. The coordinator only moves
/// these handles around; capture, enablement, and teardown happen behind the
/// device manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTrack {
    /// Handle identity
    pub id: TrackId,
    /// Audio or video
    pub kind: MediaKind,
}

impl MediaTrack {
    /// Create a fresh audio track handle
    pub fn audio() -> Self {
        Self {
            id: TrackId::new(),
            kind: MediaKind::Audio,
        }
    }

    /// Create a fresh video track handle
    pub fn video() -> Self {
        Self {
            id: TrackId::new(),
            kind: MediaKind::Video,
        }
    }
}

/// A locally originated media stream offered to the relay
///
/// At most one active producer per source tag exists in a local session:
/// one microphone-audio, one camera-video, one screen-video, each
/// independent of the others.
#[derive(Debug, Clone)]
pub struct MediaProducer {
    /// Relay-assigned producer id
    pub id: ProducerId,
    /// Audio or video
    pub kind: MediaKind,
    /// What this producer captures
    pub source: MediaSource,
    /// Underlying local track handle
    pub track: MediaTrack,
}

/// A remotely originated media stream received from the relay
#[derive(Debug, Clone)]
pub struct MediaConsumer {
    /// Relay-assigned consumer id
    pub id: ConsumerId,
    /// Remote producer this consumer subscribes to
    pub producer_id: ProducerId,
    /// Participant the stream belongs to
    pub participant_id: UserId,
    /// Audio or video
    pub kind: MediaKind,
    /// Source tag of the remote producer
    pub source: MediaSource,
    /// Opaque transport track handle for playback
    pub track: MediaTrack,
}
