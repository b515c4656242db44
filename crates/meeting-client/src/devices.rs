//! Local media device abstraction
//!
//! Wraps platform capture. Track handles acquired for the pre-join preview
//! are retained across the join (not re-acquired) and must be fully stopped
//! on leave; the controller owns that lifecycle and this trait supplies the
//! primitives.

use async_trait::async_trait;

use omnimeet_meeting_core::media::MediaTrack;

use crate::error::MeetingResult;

/// Tracks acquired for the local preview
#[derive(Debug, Default, Clone)]
pub struct LocalMedia {
    /// Microphone track, if requested and granted
    pub audio: Option<MediaTrack>,
    /// Camera track, if requested and granted
    pub video: Option<MediaTrack>,
}

/// Capability contract for local capture devices
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Acquire microphone and/or camera tracks
    ///
    /// Requesting neither returns an empty [`LocalMedia`]. Denied or
    /// missing devices surface as [`MeetingError::DeviceUnavailable`],
    /// which callers treat as a non-fatal degradation.
    ///
    /// [`MeetingError::DeviceUnavailable`]: crate::error::MeetingError::DeviceUnavailable
    async fn acquire(&self, mic: bool, camera: bool) -> MeetingResult<LocalMedia>;

    /// Acquire a screen-capture track
    ///
    /// Fails when the user dismisses the platform picker.
    async fn acquire_screen(&self) -> MeetingResult<MediaTrack>;

    /// Enable or disable a live track without releasing the device
    async fn set_enabled(&self, track: &MediaTrack, enabled: bool) -> MeetingResult<()>;

    /// Stop a track and release the underlying device
    async fn stop(&self, track: &MediaTrack) -> MeetingResult<()>;
}
