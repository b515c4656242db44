//! Media binding resolution
//!
//! Pure function of (live participant list, remote consumers, local
//! producers) to a rendering-ready mapping: for every participant a tile
//! with optional camera/audio/screen tracks, plus an optional spotlighted
//! presentation slot when anyone is screen sharing.
//!
//! The resolver owns nothing and holds no media resources; it is recomputed
//! from snapshots on every relevant change. A slot with no matching track is
//! reported as absent so the renderer can fall back to an avatar instead of
//! erroring.

use crate::media::{ConsumerId, MediaConsumer, MediaKind, MediaProducer, MediaSource, MediaTrack};
use crate::types::{Participant, UserId};

/// A track routed to a rendering slot, with its origin
#[derive(Debug, Clone, PartialEq)]
pub enum BoundTrack {
    /// Local producer track; a party never consumes its own media
    Local {
        /// Underlying local track handle
        track: MediaTrack,
    },
    /// Remote consumer track
    Remote {
        /// Consumer the track came from
        consumer_id: ConsumerId,
        /// Playback track handle
        track: MediaTrack,
    },
}

/// Rendering slots for one participant tile
#[derive(Debug, Clone)]
pub struct TileBinding {
    /// The participant this tile renders
    pub participant: Participant,
    /// Whether this is the local user's tile
    pub is_local: bool,
    /// Camera-video slot; `None` renders the avatar fallback
    pub camera: Option<BoundTrack>,
    /// Microphone-audio slot
    pub audio: Option<BoundTrack>,
    /// Screen-video slot for this participant
    pub screen: Option<BoundTrack>,
}

/// The single spotlighted presentation, when anyone is screen sharing
#[derive(Debug, Clone)]
pub struct PresentationBinding {
    /// Participant who is presenting
    pub presenter_id: UserId,
    /// Whether the presenter is the local user
    pub is_local: bool,
    /// Screen track to spotlight
    pub track: BoundTrack,
}

/// Complete participant-to-track mapping for the renderer
#[derive(Debug, Clone, Default)]
pub struct RenderPlan {
    /// One tile per live participant, in roster order
    pub tiles: Vec<TileBinding>,
    /// Spotlight slot; present when any participant has an active screen share
    pub presentation: Option<PresentationBinding>,
}

/// Resolve the current render plan
///
/// For the local participant, camera/audio/screen slots are filled from
/// local producers directly. For remote participants, each slot selects the
/// consumer whose `participant_id`, kind, and source tag match. The
/// presentation slot prefers the local screen share when local and remote
/// shares exist at the same time; concurrent shares beyond that are not
/// supported and only one is spotlighted.
pub fn resolve(
    local_user: &UserId,
    participants: &[Participant],
    producers: &[MediaProducer],
    consumers: &[MediaConsumer],
) -> RenderPlan {
    let tiles = participants
        .iter()
        .map(|participant| {
            let is_local = &participant.user_id == local_user;
            if is_local {
                TileBinding {
                    participant: participant.clone(),
                    is_local,
                    camera: local_slot(producers, MediaSource::Camera),
                    audio: local_slot(producers, MediaSource::Microphone),
                    screen: local_slot(producers, MediaSource::Screen),
                }
            } else {
                TileBinding {
                    participant: participant.clone(),
                    is_local,
                    camera: remote_slot(consumers, &participant.user_id, MediaKind::Video, MediaSource::Camera),
                    audio: remote_slot(consumers, &participant.user_id, MediaKind::Audio, MediaSource::Microphone),
                    screen: remote_slot(consumers, &participant.user_id, MediaKind::Video, MediaSource::Screen),
                }
            }
        })
        .collect();

    RenderPlan {
        tiles,
        presentation: resolve_presentation(local_user, producers, consumers),
    }
}

fn local_slot(producers: &[MediaProducer], source: MediaSource) -> Option<BoundTrack> {
    producers
        .iter()
        .find(|p| p.source == source)
        .map(|p| BoundTrack::Local {
            track: p.track.clone(),
        })
}

fn remote_slot(
    consumers: &[MediaConsumer],
    participant_id: &UserId,
    kind: MediaKind,
    source: MediaSource,
) -> Option<BoundTrack> {
    consumers
        .iter()
        .find(|c| &c.participant_id == participant_id && c.kind == kind && c.source == source)
        .map(|c| BoundTrack::Remote {
            consumer_id: c.id.clone(),
            track: c.track.clone(),
        })
}

fn resolve_presentation(
    local_user: &UserId,
    producers: &[MediaProducer],
    consumers: &[MediaConsumer],
) -> Option<PresentationBinding> {
    // Local share wins the tie when both exist at once
    if let Some(track) = local_slot(producers, MediaSource::Screen) {
        return Some(PresentationBinding {
            presenter_id: local_user.clone(),
            is_local: true,
            track,
        });
    }

    consumers
        .iter()
        .find(|c| c.source == MediaSource::Screen && c.kind == MediaKind::Video)
        .map(|c| PresentationBinding {
            presenter_id: c.participant_id.clone(),
            is_local: false,
            track: BoundTrack::Remote {
                consumer_id: c.id.clone(),
                track: c.track.clone(),
            },
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{ProducerId, TrackId};
    use crate::types::Role;

    fn participant(id: &str) -> Participant {
        Participant::new(UserId::new(id), id.to_uppercase(), Role::Crew)
    }

    fn producer(source: MediaSource) -> MediaProducer {
        MediaProducer {
            id: ProducerId::new(format!("prod-{}", source.as_str())),
            kind: source.kind(),
            source,
            track: MediaTrack {
                id: TrackId::new(),
                kind: source.kind(),
            },
        }
    }

    fn consumer(id: &str, owner: &str, source: MediaSource) -> MediaConsumer {
        MediaConsumer {
            id: ConsumerId::new(id),
            producer_id: ProducerId::new(format!("{}-producer", id)),
            participant_id: UserId::new(owner),
            kind: source.kind(),
            source,
            track: MediaTrack {
                id: TrackId::new(),
                kind: source.kind(),
            },
        }
    }

    #[test]
    fn local_slots_come_from_producers() {
        let local = UserId::new("me");
        let participants = vec![participant("me")];
        let producers = vec![producer(MediaSource::Camera), producer(MediaSource::Microphone)];
        // A consumer falsely claiming the local id must not win the slot
        let consumers = vec![consumer("c1", "me", MediaSource::Camera)];

        let plan = resolve(&local, &participants, &producers, &consumers);
        let tile = &plan.tiles[0];
        assert!(tile.is_local);
        assert!(matches!(tile.camera, Some(BoundTrack::Local { .. })));
        assert!(matches!(tile.audio, Some(BoundTrack::Local { .. })));
        assert!(tile.screen.is_none());
    }

    #[test]
    fn remote_slots_match_by_kind_and_source() {
        let local = UserId::new("me");
        let participants = vec![participant("me"), participant("peer")];
        let consumers = vec![
            consumer("cam", "peer", MediaSource::Camera),
            consumer("mic", "peer", MediaSource::Microphone),
            consumer("scr", "peer", MediaSource::Screen),
        ];

        let plan = resolve(&local, &participants, &[], &consumers);
        let tile = plan.tiles.iter().find(|t| !t.is_local).unwrap();
        assert!(matches!(
            tile.camera,
            Some(BoundTrack::Remote { ref consumer_id, .. }) if consumer_id.as_str() == "cam"
        ));
        assert!(matches!(
            tile.audio,
            Some(BoundTrack::Remote { ref consumer_id, .. }) if consumer_id.as_str() == "mic"
        ));
        assert!(matches!(
            tile.screen,
            Some(BoundTrack::Remote { ref consumer_id, .. }) if consumer_id.as_str() == "scr"
        ));
    }

    #[test]
    fn screen_consumer_never_fills_the_camera_slot() {
        let local = UserId::new("me");
        let participants = vec![participant("peer")];
        let consumers = vec![consumer("scr", "peer", MediaSource::Screen)];

        let plan = resolve(&local, &participants, &[], &consumers);
        assert!(plan.tiles[0].camera.is_none());
    }

    #[test]
    fn missing_tracks_report_absent_slots() {
        let local = UserId::new("me");
        let participants = vec![participant("peer")];

        let plan = resolve(&local, &participants, &[], &[]);
        let tile = &plan.tiles[0];
        assert!(tile.camera.is_none());
        assert!(tile.audio.is_none());
        assert!(tile.screen.is_none());
        assert!(plan.presentation.is_none());
    }

    #[test]
    fn remote_screen_share_is_spotlighted() {
        let local = UserId::new("me");
        let participants = vec![participant("me"), participant("peer")];
        let consumers = vec![consumer("scr", "peer", MediaSource::Screen)];

        let plan = resolve(&local, &participants, &[], &consumers);
        let presentation = plan.presentation.unwrap();
        assert!(!presentation.is_local);
        assert_eq!(presentation.presenter_id, UserId::new("peer"));
    }

    #[test]
    fn local_share_wins_the_spotlight_tie() {
        let local = UserId::new("me");
        let participants = vec![participant("me"), participant("peer")];
        let producers = vec![producer(MediaSource::Screen)];
        let consumers = vec![consumer("scr", "peer", MediaSource::Screen)];

        let plan = resolve(&local, &participants, &producers, &consumers);
        let presentation = plan.presentation.unwrap();
        assert!(presentation.is_local);
        assert_eq!(presentation.presenter_id, local);
    }

    #[test]
    fn tiles_follow_roster_order() {
        let local = UserId::new("me");
        let participants = vec![participant("a"), participant("me"), participant("b")];

        let plan = resolve(&local, &participants, &[], &[]);
        let order: Vec<&str> = plan
            .tiles
            .iter()
            .map(|t| t.participant.user_id.as_str())
            .collect();
        assert_eq!(order, vec!["a", "me", "b"]);
    }
}
