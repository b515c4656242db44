//! Meeting service abstraction
//!
//! Request/response calls against the workspace backend. These are opaque
//! external calls: only their success/failure and payload shapes matter to
//! the coordinator; transport, retries, and authentication live in the
//! implementor.

use async_trait::async_trait;

use omnimeet_meeting_core::types::{
    ConsentFlags, MeetingDetails, MeetingId, RoomCredentials, SummaryDocument,
};

use crate::error::MeetingResult;

/// Request/response contract with the meeting service
#[async_trait]
pub trait MeetingApi: Send + Sync {
    /// Fetch meeting metadata and the invited roster
    async fn get_meeting(&self, meeting_id: &MeetingId) -> MeetingResult<MeetingDetails>;

    /// Join handshake: submit consent flags, receive room credentials
    async fn join_meeting(
        &self,
        meeting_id: &MeetingId,
        consents: ConsentFlags,
    ) -> MeetingResult<RoomCredentials>;

    /// Record that the local user left the meeting
    async fn leave_meeting(&self, meeting_id: &MeetingId) -> MeetingResult<()>;

    /// Start a scheduled meeting (organizer only)
    async fn start_meeting(&self, meeting_id: &MeetingId) -> MeetingResult<()>;

    /// End a running meeting for everyone (host only)
    async fn end_meeting(&self, meeting_id: &MeetingId) -> MeetingResult<()>;

    /// Fetch the AI summary document generated for an ended meeting
    async fn get_summary_document(&self, document_id: &str) -> MeetingResult<SummaryDocument>;
}
