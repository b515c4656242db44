//! Configuration for a meeting session
//!
//! One [`MeetingConfig`] describes one meeting attempt: who the local user
//! is, which meeting to join, and how the local media preview starts out.

use omnimeet_meeting_core::types::{MeetingId, Role, UserId};

/// Configuration for one meeting session attempt
///
/// # Examples
///
/// ```rust
/// use omnimeet_meeting_client::MeetingConfig;
/// use omnimeet_meeting_core::types::{MeetingId, Role, UserId};
///
/// let config = MeetingConfig::new(
///     MeetingId::new("mtg-42"),
///     UserId::new("u-1"),
///     "Alice",
/// )
/// .with_role(Role::OrgAdmin)
/// .with_camera(false);
/// assert!(!config.start_with_camera);
/// ```
#[derive(Debug, Clone)]
pub struct MeetingConfig {
    /// Meeting to join
    pub meeting_id: MeetingId,
    /// Local user's identity
    pub user_id: UserId,
    /// Local user's display name
    pub display_name: String,
    /// Local user's organization role
    pub role: Role,
    /// Whether the microphone starts enabled in the pre-join preview
    pub start_with_mic: bool,
    /// Whether the camera starts enabled in the pre-join preview
    pub start_with_camera: bool,
    /// Capacity of the client-facing event broadcast channel
    pub event_capacity: usize,
}

impl MeetingConfig {
    /// Create a configuration with default preview settings
    ///
    /// Mic and camera start enabled, role defaults to crew, and the event
    /// channel holds 100 events.
    pub fn new(meeting_id: MeetingId, user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            meeting_id,
            user_id,
            display_name: display_name.into(),
            role: Role::Crew,
            start_with_mic: true,
            start_with_camera: true,
            event_capacity: 100,
        }
    }

    /// Set the local user's role
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Set whether the microphone starts enabled
    pub fn with_mic(mut self, enabled: bool) -> Self {
        self.start_with_mic = enabled;
        self
    }

    /// Set whether the camera starts enabled
    pub fn with_camera(mut self, enabled: bool) -> Self {
        self.start_with_camera = enabled;
        self
    }

    /// Set the event broadcast channel capacity
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }
}
