//! Session-local state stores
//!
//! Two stores back the session controller: [`RoomState`] holds everything
//! driven by inbound signaling (roster, chat, active speaker), and
//! [`LocalMediaState`] holds the local user's tracks and flags. Both are
//! plain data; the controller owns the locking around them.

use chrono::{DateTime, Utc};

use omnimeet_meeting_core::chat::ChatLog;
use omnimeet_meeting_core::media::MediaTrack;
use omnimeet_meeting_core::presence::PresenceReconciler;
use omnimeet_meeting_core::speaker::ActiveSpeakerTracker;
use omnimeet_meeting_core::types::{ConsentFlags, ParticipantState};

/// State driven by inbound signaling events
///
/// Reset wholesale when a meeting attempt ends; a rejoin starts from an
/// empty room and recovers via the server's full-sync snapshot.
#[derive(Debug, Default)]
pub struct RoomState {
    /// Live participant roster
    pub presence: PresenceReconciler,
    /// Deduplicated chat log
    pub chat: ChatLog,
    /// Current active speaker
    pub speaker: ActiveSpeakerTracker,
}

impl RoomState {
    /// Create an empty room
    pub fn new() -> Self {
        Self::default()
    }
}

/// The local user's media tracks and announced flags
///
/// Track handles survive the pre-join/in-meeting transition; the flags are
/// the source of truth for what gets announced on `update-state`.
#[derive(Debug)]
pub struct LocalMediaState {
    /// Microphone track from the preview, if acquired
    pub audio_track: Option<MediaTrack>,
    /// Camera track from the preview, if acquired
    pub video_track: Option<MediaTrack>,
    /// Screen-capture track while sharing
    pub screen_track: Option<MediaTrack>,
    /// Whether the microphone is live
    pub mic_enabled: bool,
    /// Whether the camera is live
    pub camera_enabled: bool,
    /// Whether the screen is being shared
    pub screen_sharing: bool,
    /// Whether the local hand is raised
    pub hand_raised: bool,
    /// When the local user entered the meeting
    pub joined_at: DateTime<Utc>,
    /// Consent flags submitted with the join handshake
    pub consents: ConsentFlags,
}

impl LocalMediaState {
    /// Create a fresh local state with everything off
    pub fn new() -> Self {
        Self {
            audio_track: None,
            video_track: None,
            screen_track: None,
            mic_enabled: false,
            camera_enabled: false,
            screen_sharing: false,
            hand_raised: false,
            joined_at: Utc::now(),
            consents: ConsentFlags::default(),
        }
    }

    /// Snapshot the announced state record
    pub fn participant_state(&self) -> ParticipantState {
        ParticipantState {
            mic_on: self.mic_enabled,
            camera_on: self.camera_enabled,
            screen_sharing: self.screen_sharing,
            hand_raised: self.hand_raised,
            joined_at: self.joined_at,
        }
    }

    /// All live track handles, for bulk teardown
    pub fn tracks(&self) -> Vec<MediaTrack> {
        [
            self.audio_track.clone(),
            self.video_track.clone(),
            self.screen_track.clone(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

impl Default for LocalMediaState {
    fn default() -> Self {
        Self::new()
    }
}
