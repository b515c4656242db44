//! Core data model for meeting sessions
//!
//! This module contains the identity, participant, chat, and meeting
//! metadata types shared by every layer of the coordinator. All wire-facing
//! types carry serde derives matching the camelCase field names used by the
//! coordination server.
//!
//! # Type Categories
//!
//! - **Identity Types** - `UserId`, `MeetingId` newtype wrappers
//! - **Participant Types** - live roster entries and per-participant state
//! - **Chat Types** - deduplicated meeting chat messages
//! - **Meeting Types** - scheduled meeting metadata, distinct from the live roster
//! - **Session Types** - lifecycle phase and join parameters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ===== IDENTITY TYPES =====

/// Unique identifier for a user account
///
/// Wraps the opaque id assigned by the workspace backend. The same id is
/// used to correlate presence events, media consumers, and chat senders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a user id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the underlying id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Unique identifier for a meeting room
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeetingId(String);

impl MeetingId {
    /// Create a meeting id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the underlying id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MeetingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MeetingId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ===== PARTICIPANT TYPES =====

/// Organization role of a participant
///
/// Closed set of roles assigned by the workspace backend. Rendering and
/// moderation behavior differ by role, so this is an exhaustive enum rather
/// than a free-form string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Organization administrator
    OrgAdmin,
    /// Cross-workspace power user
    Omni,
    /// Regular crew member
    Crew,
}

impl Role {
    /// Short human-readable badge label for this role
    pub fn label(&self) -> &'static str {
        match self {
            Role::OrgAdmin => "Admin",
            Role::Omni => "Omni",
            Role::Crew => "Crew",
        }
    }
}

/// Per-participant live state
///
/// Pushed wholesale on every change; an update event replaces the previous
/// record entirely rather than merging field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantState {
    /// Whether the participant's microphone is live
    pub mic_on: bool,
    /// Whether the participant's camera is live
    pub camera_on: bool,
    /// Whether the participant is sharing their screen
    pub screen_sharing: bool,
    /// Whether the participant has raised their hand
    pub hand_raised: bool,
    /// When the participant joined the live session
    pub joined_at: DateTime<Utc>,
}

impl ParticipantState {
    /// Create a fresh state record with everything off, joined now
    pub fn new() -> Self {
        Self {
            mic_on: false,
            camera_on: false,
            screen_sharing: false,
            hand_raised: false,
            joined_at: Utc::now(),
        }
    }

    /// Builder-style setter for the microphone flag
    pub fn with_mic(mut self, on: bool) -> Self {
        self.mic_on = on;
        self
    }

    /// Builder-style setter for the camera flag
    pub fn with_camera(mut self, on: bool) -> Self {
        self.camera_on = on;
        self
    }

    /// Builder-style setter for the screen-sharing flag
    pub fn with_screen_sharing(mut self, on: bool) -> Self {
        self.screen_sharing = on;
        self
    }
}

impl Default for ParticipantState {
    fn default() -> Self {
        Self::new()
    }
}

/// A participant in the live meeting roster
///
/// Distinct from [`InvitedParticipant`]: this type describes someone who is
/// currently connected, with their live state flattened into the wire
/// representation the way the coordination server sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Stable user identity
    pub user_id: UserId,
    /// Display name
    pub name: String,
    /// Organization role
    pub role: Role,
    /// Live per-participant state
    #[serde(flatten)]
    pub state: ParticipantState,
}

impl Participant {
    /// Create a participant with a fresh default state
    pub fn new(user_id: UserId, name: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            name: name.into(),
            role,
            state: ParticipantState::new(),
        }
    }
}

// ===== CHAT TYPES =====

/// A single meeting chat message
///
/// The `id` is globally unique and is the deduplication key: the channel may
/// deliver the same message more than once and duplicates must collapse to a
/// single log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Globally unique message id
    pub id: String,
    /// Sender's user id
    pub sender_id: UserId,
    /// Sender's display name at send time
    pub sender_name: String,
    /// Message body
    pub text: String,
    /// Server-side receive timestamp
    pub timestamp: DateTime<Utc>,
}

// ===== MEETING TYPES =====

/// Lifecycle status of a scheduled meeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    /// Created but not yet started
    Scheduled,
    /// Currently running
    InProgress,
    /// Finished; no further joins possible
    Ended,
}

/// An invited participant on the meeting roster
///
/// Invitees may never connect; `joined_at` is populated only once they do.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitedParticipant {
    /// Stable user identity
    pub user_id: UserId,
    /// Display name, if the backend resolved it
    pub name: Option<String>,
    /// First join time, if the invitee ever connected
    pub joined_at: Option<DateTime<Utc>>,
}

/// Metadata for a scheduled meeting
///
/// Fetched from the meeting service before joining. The invited roster here
/// is distinct from the live participant list maintained by the presence
/// reconciler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingDetails {
    /// Meeting identifier
    pub meeting_id: MeetingId,
    /// Meeting title
    pub title: String,
    /// Optional agenda text
    pub agenda: Option<String>,
    /// Current lifecycle status
    pub status: MeetingStatus,
    /// Display name of the organizer
    pub organizer_name: String,
    /// Scheduled start time
    pub start_time: Option<DateTime<Utc>>,
    /// Scheduled or actual end time
    pub end_time: Option<DateTime<Utc>>,
    /// Invited roster
    pub invited: Vec<InvitedParticipant>,
    /// Ids of recordings captured for this meeting
    pub recording_ids: Vec<String>,
    /// Id of the AI summary document, once generated
    pub ai_summary_id: Option<String>,
}

/// AI-generated summary document for an ended meeting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDocument {
    /// Summary body text
    pub text: String,
    /// Extracted action items
    pub action_items: Vec<String>,
}

// ===== SESSION TYPES =====

/// Consent flags submitted with the join handshake
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ConsentFlags {
    /// User consents to the meeting being recorded
    pub recording: bool,
    /// User consents to AI transcription
    pub transcription: bool,
}

/// Opaque room credentials returned by the join handshake
///
/// Passed to the media relay when establishing the transport session. The
/// capability blob is relay-specific and never interpreted by the
/// coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCredentials {
    /// Bearer token scoped to this room
    pub token: String,
    /// Relay capability-negotiation blob
    pub router_capabilities: serde_json::Value,
}

/// Lifecycle phase of one meeting attempt
///
/// `Joining` guards against re-entrant join attempts while the handshake and
/// relay connection are in flight; every failure path resolves it back to
/// [`SessionPhase::PreJoin`]. `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Previewing local media, not yet connected
    PreJoin,
    /// Join sequence in flight
    Joining,
    /// Connected to the room
    InMeeting,
    /// Session over; all resources released
    Ended,
}

impl SessionPhase {
    /// Whether this phase is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Ended)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionPhase::PreJoin => "pre-join",
            SessionPhase::Joining => "joining",
            SessionPhase::InMeeting => "in-meeting",
            SessionPhase::Ended => "ended",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_wire_format_is_flat_camel_case() {
        let p = Participant::new(UserId::new("u1"), "Alice", Role::OrgAdmin);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["role"], "org_admin");
        // Live state is flattened into the participant object
        assert_eq!(json["micOn"], false);
        assert!(json.get("state").is_none());
    }

    #[test]
    fn role_round_trips_through_wire_names() {
        for (role, name) in [
            (Role::OrgAdmin, "\"org_admin\""),
            (Role::Omni, "\"omni\""),
            (Role::Crew, "\"crew\""),
        ] {
            assert_eq!(serde_json::to_string(&role).unwrap(), name);
            let back: Role = serde_json::from_str(name).unwrap();
            assert_eq!(back, role);
        }
    }

    #[test]
    fn session_phase_terminality() {
        assert!(!SessionPhase::PreJoin.is_terminal());
        assert!(!SessionPhase::Joining.is_terminal());
        assert!(!SessionPhase::InMeeting.is_terminal());
        assert!(SessionPhase::Ended.is_terminal());
    }
}
