//! Typed signaling wire contract
//!
//! The coordination server speaks named events with JSON payloads over the
//! meeting's logical room. This module is the single place where those
//! names and payload shapes are defined: [`SignalEvent`] for the inbound
//! direction and [`SignalCommand`] for outbound emission. Everything above
//! this layer works with typed values and exhaustive matches.
//!
//! Decode failures are wire errors and are distinct from the expected
//! races (stale updates, duplicate chat ids), which decode fine and are
//! discarded by the reducers instead.
//!
//! # Event names
//!
//! | Direction | Name |
//! |---|---|
//! | out | `meeting:join`, `meeting:update-state`, `meeting:chat-message` |
//! | in | `meeting:sync-participants`, `meeting:participant-joined`, `meeting:participant-left`, `meeting:participant-updated`, `meeting:active-speaker`, `meeting:chat-message`, `meeting:ended` |

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::types::{ChatMessage, MeetingId, Participant, ParticipantState, UserId};

/// Errors decoding or encoding signaling traffic
#[derive(Debug, Error)]
pub enum WireError {
    /// The server sent an event name this client does not know
    #[error("unknown signaling event: {name}")]
    UnknownEvent {
        /// The unrecognized event name
        name: String,
    },

    /// The payload did not match the declared shape for the event
    #[error("invalid payload for {event}: {source}")]
    InvalidPayload {
        /// Event whose payload failed to decode
        event: &'static str,
        /// Underlying decode error
        #[source]
        source: serde_json::Error,
    },
}

/// Inbound events delivered on the meeting room
#[derive(Debug, Clone, PartialEq)]
pub enum SignalEvent {
    /// Full-sync snapshot of the live participant list
    SyncParticipants {
        /// Complete replacement roster
        participants: Vec<Participant>,
    },
    /// Incremental join
    ParticipantJoined {
        /// The participant who joined
        participant: Participant,
    },
    /// Incremental leave
    ParticipantLeft {
        /// Who left
        user_id: UserId,
    },
    /// Incremental state update, replacing the participant's state wholesale
    ParticipantUpdated {
        /// Whose state changed
        user_id: UserId,
        /// The full replacement state record
        state: ParticipantState,
    },
    /// Active speaker changed; `None` clears the highlight
    ActiveSpeaker {
        /// The new active speaker, if any
        user_id: Option<UserId>,
    },
    /// Inbound chat message (including the sender's own echo)
    ChatMessage(ChatMessage),
    /// Host ended the meeting
    MeetingEnded,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyncParticipantsPayload {
    participants: Vec<Participant>,
}

#[derive(Deserialize)]
struct ParticipantJoinedPayload {
    participant: Participant,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParticipantLeftPayload {
    user_id: UserId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParticipantUpdatedPayload {
    user_id: UserId,
    state: ParticipantState,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActiveSpeakerPayload {
    // Absent or empty means "no active speaker"
    #[serde(default)]
    user_id: Option<String>,
}

impl SignalEvent {
    /// Wire name for this event
    pub fn event_name(&self) -> &'static str {
        match self {
            SignalEvent::SyncParticipants { .. } => "meeting:sync-participants",
            SignalEvent::ParticipantJoined { .. } => "meeting:participant-joined",
            SignalEvent::ParticipantLeft { .. } => "meeting:participant-left",
            SignalEvent::ParticipantUpdated { .. } => "meeting:participant-updated",
            SignalEvent::ActiveSpeaker { .. } => "meeting:active-speaker",
            SignalEvent::ChatMessage(_) => "meeting:chat-message",
            SignalEvent::MeetingEnded => "meeting:ended",
        }
    }

    /// Decode a named event and its JSON payload
    ///
    /// Unknown names and malformed payloads are rejected with a
    /// [`WireError`]; callers decide whether to surface or log them.
    pub fn parse(name: &str, payload: Value) -> Result<Self, WireError> {
        fn decode<T: serde::de::DeserializeOwned>(
            event: &'static str,
            payload: Value,
        ) -> Result<T, WireError> {
            serde_json::from_value(payload)
                .map_err(|source| WireError::InvalidPayload { event, source })
        }

        match name {
            "meeting:sync-participants" => {
                let p: SyncParticipantsPayload = decode("meeting:sync-participants", payload)?;
                Ok(SignalEvent::SyncParticipants {
                    participants: p.participants,
                })
            }
            "meeting:participant-joined" => {
                let p: ParticipantJoinedPayload = decode("meeting:participant-joined", payload)?;
                Ok(SignalEvent::ParticipantJoined {
                    participant: p.participant,
                })
            }
            "meeting:participant-left" => {
                let p: ParticipantLeftPayload = decode("meeting:participant-left", payload)?;
                Ok(SignalEvent::ParticipantLeft { user_id: p.user_id })
            }
            "meeting:participant-updated" => {
                let p: ParticipantUpdatedPayload = decode("meeting:participant-updated", payload)?;
                Ok(SignalEvent::ParticipantUpdated {
                    user_id: p.user_id,
                    state: p.state,
                })
            }
            "meeting:active-speaker" => {
                let p: ActiveSpeakerPayload = decode("meeting:active-speaker", payload)?;
                let user_id = p.user_id.filter(|id| !id.is_empty()).map(UserId::new);
                Ok(SignalEvent::ActiveSpeaker { user_id })
            }
            "meeting:chat-message" => {
                let message: ChatMessage = decode("meeting:chat-message", payload)?;
                Ok(SignalEvent::ChatMessage(message))
            }
            "meeting:ended" => Ok(SignalEvent::MeetingEnded),
            other => Err(WireError::UnknownEvent {
                name: other.to_string(),
            }),
        }
    }

    /// Encode this event back to its wire payload
    ///
    /// The inverse of [`SignalEvent::parse`], used by test doubles and
    /// loopback servers.
    pub fn to_payload(&self) -> Value {
        match self {
            SignalEvent::SyncParticipants { participants } => {
                json!({ "participants": participants })
            }
            SignalEvent::ParticipantJoined { participant } => {
                json!({ "participant": participant })
            }
            SignalEvent::ParticipantLeft { user_id } => json!({ "userId": user_id }),
            SignalEvent::ParticipantUpdated { user_id, state } => {
                json!({ "userId": user_id, "state": state })
            }
            SignalEvent::ActiveSpeaker { user_id } => match user_id {
                Some(id) => json!({ "userId": id }),
                None => json!({}),
            },
            SignalEvent::ChatMessage(message) => {
                serde_json::to_value(message).unwrap_or(Value::Null)
            }
            SignalEvent::MeetingEnded => Value::Null,
        }
    }
}

/// Outbound commands emitted on the meeting room
///
/// Encoding goes through [`SignalCommand::payload`], which owns the
/// camelCase key names; the enum itself is not serialized.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalCommand {
    /// Announce presence intent after the join sequence completes
    Join {
        /// Meeting to announce into
        meeting_id: MeetingId,
    },
    /// Push the local participant's state, wholesale
    UpdateState {
        /// Meeting scope
        meeting_id: MeetingId,
        /// Full replacement state record
        state: ParticipantState,
    },
    /// Send a chat message; the log entry arrives back as the echo
    ChatSend {
        /// Meeting scope
        meeting_id: MeetingId,
        /// Message body
        text: String,
    },
}

impl SignalCommand {
    /// Wire name for this command
    pub fn event_name(&self) -> &'static str {
        match self {
            SignalCommand::Join { .. } => "meeting:join",
            SignalCommand::UpdateState { .. } => "meeting:update-state",
            SignalCommand::ChatSend { .. } => "meeting:chat-message",
        }
    }

    /// Encode this command's wire payload
    ///
    /// `meeting:join` carries the bare meeting id; the others carry an
    /// object scoped by `meetingId`.
    pub fn payload(&self) -> Value {
        match self {
            SignalCommand::Join { meeting_id } => json!(meeting_id),
            SignalCommand::UpdateState { meeting_id, state } => {
                json!({ "meetingId": meeting_id, "state": state })
            }
            SignalCommand::ChatSend { meeting_id, text } => {
                json!({ "meetingId": meeting_id, "text": text })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use chrono::Utc;

    #[test]
    fn parses_every_inbound_event_name() {
        let participant = Participant::new(UserId::new("u1"), "Alice", Role::Omni);
        let message = ChatMessage {
            id: "m1".to_string(),
            sender_id: UserId::new("u1"),
            sender_name: "Alice".to_string(),
            text: "hi".to_string(),
            timestamp: Utc::now(),
        };

        let cases = vec![
            SignalEvent::SyncParticipants {
                participants: vec![participant.clone()],
            },
            SignalEvent::ParticipantJoined {
                participant: participant.clone(),
            },
            SignalEvent::ParticipantLeft {
                user_id: UserId::new("u1"),
            },
            SignalEvent::ParticipantUpdated {
                user_id: UserId::new("u1"),
                state: participant.state.clone(),
            },
            SignalEvent::ActiveSpeaker {
                user_id: Some(UserId::new("u1")),
            },
            SignalEvent::ChatMessage(message),
            SignalEvent::MeetingEnded,
        ];

        for event in cases {
            let parsed = SignalEvent::parse(event.event_name(), event.to_payload()).unwrap();
            assert_eq!(parsed, event);
        }
    }

    #[test]
    fn empty_speaker_id_means_none() {
        let parsed =
            SignalEvent::parse("meeting:active-speaker", json!({ "userId": "" })).unwrap();
        assert_eq!(parsed, SignalEvent::ActiveSpeaker { user_id: None });

        let parsed = SignalEvent::parse("meeting:active-speaker", json!({})).unwrap();
        assert_eq!(parsed, SignalEvent::ActiveSpeaker { user_id: None });
    }

    #[test]
    fn unknown_event_is_rejected() {
        let err = SignalEvent::parse("meeting:bogus", json!({})).unwrap_err();
        assert!(matches!(err, WireError::UnknownEvent { name } if name == "meeting:bogus"));
    }

    #[test]
    fn malformed_payload_is_rejected() {
        let err =
            SignalEvent::parse("meeting:participant-left", json!({ "wrong": true })).unwrap_err();
        assert!(matches!(err, WireError::InvalidPayload { event, .. }
            if event == "meeting:participant-left"));
    }

    #[test]
    fn join_command_carries_the_bare_meeting_id() {
        let command = SignalCommand::Join {
            meeting_id: MeetingId::new("mtg-1"),
        };
        assert_eq!(command.event_name(), "meeting:join");
        assert_eq!(command.payload(), json!("mtg-1"));
    }

    #[test]
    fn update_state_command_shape() {
        let command = SignalCommand::UpdateState {
            meeting_id: MeetingId::new("mtg-1"),
            state: ParticipantState::new().with_mic(true),
        };
        let payload = command.payload();
        assert_eq!(payload["meetingId"], "mtg-1");
        assert_eq!(payload["state"]["micOn"], true);
        assert_eq!(payload["state"]["screenSharing"], false);
    }

    #[test]
    fn chat_send_command_shape() {
        let command = SignalCommand::ChatSend {
            meeting_id: MeetingId::new("mtg-1"),
            text: "hello".to_string(),
        };
        assert_eq!(command.event_name(), "meeting:chat-message");
        assert_eq!(
            command.payload(),
            json!({ "meetingId": "mtg-1", "text": "hello" })
        );
    }
}
