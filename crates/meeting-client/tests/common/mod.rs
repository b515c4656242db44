//! Shared test doubles for the session controller tests
//!
//! Each collaborator trait gets an in-memory fake with switchable failure
//! modes and call recording. The fakes are deliberately dumb: they assert
//! nothing themselves, the tests inspect the records.

#![allow(dead_code)]

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use omnimeet_meeting_client::devices::{LocalMedia, MediaDevices};
use omnimeet_meeting_client::error::{MeetingError, MeetingResult};
use omnimeet_meeting_client::relay::{MediaRelay, RelayNotification};
use omnimeet_meeting_client::service::MeetingApi;
use omnimeet_meeting_client::signal::{SignalChannel, SignalSubscription};
use omnimeet_meeting_client::{MeetingConfig, MeetingSession};
use omnimeet_meeting_core::media::{
    MediaKind, MediaProducer, MediaSource, MediaTrack, ProducerId, TrackId,
};
use omnimeet_meeting_core::types::{
    ChatMessage, ConsentFlags, MeetingDetails, MeetingId, MeetingStatus, Participant, Role,
    RoomCredentials, SummaryDocument, UserId,
};
use omnimeet_meeting_core::wire::{SignalCommand, SignalEvent};

// ===== FAKE MEETING API =====

pub struct FakeApi {
    pub fail_join: AtomicBool,
    pub join_delay: Mutex<Option<Duration>>,
    pub join_calls: AtomicUsize,
    pub leave_calls: AtomicUsize,
    pub end_calls: AtomicUsize,
    pub status: Mutex<MeetingStatus>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            fail_join: AtomicBool::new(false),
            join_delay: Mutex::new(None),
            join_calls: AtomicUsize::new(0),
            leave_calls: AtomicUsize::new(0),
            end_calls: AtomicUsize::new(0),
            status: Mutex::new(MeetingStatus::InProgress),
        }
    }
}

#[async_trait]
impl MeetingApi for FakeApi {
    async fn get_meeting(&self, meeting_id: &MeetingId) -> MeetingResult<MeetingDetails> {
        Ok(MeetingDetails {
            meeting_id: meeting_id.clone(),
            title: "Weekly sync".to_string(),
            agenda: None,
            status: *self.status.lock(),
            organizer_name: "Olive".to_string(),
            start_time: Some(Utc::now()),
            end_time: None,
            invited: Vec::new(),
            recording_ids: Vec::new(),
            ai_summary_id: Some("doc-1".to_string()),
        })
    }

    async fn join_meeting(
        &self,
        _meeting_id: &MeetingId,
        _consents: ConsentFlags,
    ) -> MeetingResult<RoomCredentials> {
        self.join_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.join_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_join.load(Ordering::SeqCst) {
            return Err(MeetingError::service("handshake rejected"));
        }
        Ok(RoomCredentials {
            token: "tok-1".to_string(),
            router_capabilities: serde_json::json!({ "codecs": [] }),
        })
    }

    async fn leave_meeting(&self, _meeting_id: &MeetingId) -> MeetingResult<()> {
        self.leave_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn start_meeting(&self, _meeting_id: &MeetingId) -> MeetingResult<()> {
        Ok(())
    }

    async fn end_meeting(&self, _meeting_id: &MeetingId) -> MeetingResult<()> {
        self.end_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_summary_document(&self, _document_id: &str) -> MeetingResult<SummaryDocument> {
        Ok(SummaryDocument {
            text: "Summary".to_string(),
            action_items: vec!["Follow up".to_string()],
        })
    }
}

// ===== FAKE SIGNAL CHANNEL =====

#[derive(Default)]
pub struct FakeSignal {
    pub fail_subscribe: AtomicBool,
    pub emit_delay: Mutex<Option<Duration>>,
    pub emitted: Mutex<Vec<SignalCommand>>,
    event_tx: Mutex<Option<mpsc::Sender<SignalEvent>>>,
}

impl FakeSignal {
    /// Inject an inbound event, as the server would deliver it
    pub async fn push(&self, event: SignalEvent) {
        let tx = self.event_tx.lock().clone();
        if let Some(tx) = tx {
            // The pump may already be gone; that is a valid outcome
            let _ = tx.send(event).await;
        }
    }

    pub fn emitted(&self) -> Vec<SignalCommand> {
        self.emitted.lock().clone()
    }

    /// The state records announced so far, in emission order
    pub fn announced_states(&self) -> Vec<omnimeet_meeting_core::types::ParticipantState> {
        self.emitted
            .lock()
            .iter()
            .filter_map(|c| match c {
                SignalCommand::UpdateState { state, .. } => Some(state.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl SignalChannel for FakeSignal {
    async fn emit(&self, command: SignalCommand) -> MeetingResult<()> {
        let delay = *self.emit_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.emitted.lock().push(command);
        Ok(())
    }

    async fn subscribe(&self, meeting_id: &MeetingId) -> MeetingResult<SignalSubscription> {
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(MeetingError::signal("subscribe refused"));
        }
        let (tx, rx) = mpsc::channel(64);
        *self.event_tx.lock() = Some(tx);
        Ok(SignalSubscription::new(meeting_id.clone(), rx))
    }
}

// ===== FAKE MEDIA RELAY =====

#[derive(Default)]
pub struct FakeRelay {
    pub fail_join_room: AtomicBool,
    pub fail_create_producer: AtomicBool,
    pub joined: AtomicBool,
    pub closed: AtomicBool,
    pub created: Mutex<Vec<MediaSource>>,
    pub stopped: Mutex<Vec<MediaSource>>,
    notif_tx: Mutex<Option<mpsc::Sender<RelayNotification>>>,
}

impl FakeRelay {
    /// Inject a relay notification, as the transport would deliver it
    pub async fn notify(&self, notification: RelayNotification) {
        let tx = self.notif_tx.lock().clone();
        if let Some(tx) = tx {
            let _ = tx.send(notification).await;
        }
    }
}

#[async_trait]
impl MediaRelay for FakeRelay {
    async fn join_room(
        &self,
        _meeting_id: &MeetingId,
        _credentials: &RoomCredentials,
    ) -> MeetingResult<()> {
        if self.fail_join_room.load(Ordering::SeqCst) {
            return Err(MeetingError::relay("transport refused"));
        }
        self.joined.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn create_producer(
        &self,
        track: MediaTrack,
        kind: MediaKind,
        source: MediaSource,
    ) -> MeetingResult<MediaProducer> {
        if self.fail_create_producer.load(Ordering::SeqCst) {
            return Err(MeetingError::relay("produce refused"));
        }
        self.created.lock().push(source);
        Ok(MediaProducer {
            id: ProducerId::new(format!("prod-{}", source)),
            kind,
            source,
            track,
        })
    }

    async fn stop_producer(&self, source: MediaSource) -> MeetingResult<()> {
        self.stopped.lock().push(source);
        Ok(())
    }

    async fn take_notifications(&self) -> MeetingResult<mpsc::Receiver<RelayNotification>> {
        let (tx, rx) = mpsc::channel(64);
        *self.notif_tx.lock() = Some(tx);
        Ok(rx)
    }

    async fn close(&self) -> MeetingResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

// ===== FAKE DEVICES =====

#[derive(Default)]
pub struct FakeDevices {
    pub fail_acquire: AtomicBool,
    pub fail_screen: AtomicBool,
    pub stopped: Mutex<Vec<TrackId>>,
}

#[async_trait]
impl MediaDevices for FakeDevices {
    async fn acquire(&self, mic: bool, camera: bool) -> MeetingResult<LocalMedia> {
        if self.fail_acquire.load(Ordering::SeqCst) {
            return Err(MeetingError::device("permission denied"));
        }
        Ok(LocalMedia {
            audio: mic.then(MediaTrack::audio),
            video: camera.then(MediaTrack::video),
        })
    }

    async fn acquire_screen(&self) -> MeetingResult<MediaTrack> {
        if self.fail_screen.load(Ordering::SeqCst) {
            return Err(MeetingError::device("picker dismissed"));
        }
        Ok(MediaTrack::video())
    }

    async fn set_enabled(&self, _track: &MediaTrack, _enabled: bool) -> MeetingResult<()> {
        Ok(())
    }

    async fn stop(&self, track: &MediaTrack) -> MeetingResult<()> {
        self.stopped.lock().push(track.id);
        Ok(())
    }
}

// ===== HARNESS =====

pub struct Harness {
    pub api: Arc<FakeApi>,
    pub signal: Arc<FakeSignal>,
    pub relay: Arc<FakeRelay>,
    pub devices: Arc<FakeDevices>,
    pub session: Arc<MeetingSession>,
}

pub fn harness() -> Harness {
    harness_with(MeetingConfig::new(
        MeetingId::new("mtg-1"),
        UserId::new("me"),
        "Mel",
    ))
}

/// Route session logs through the test writer, honoring `RUST_LOG`
fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub fn harness_with(config: MeetingConfig) -> Harness {
    init_tracing();
    let api = Arc::new(FakeApi::default());
    let signal = Arc::new(FakeSignal::default());
    let relay = Arc::new(FakeRelay::default());
    let devices = Arc::new(FakeDevices::default());
    let session = Arc::new(MeetingSession::new(
        config,
        api.clone(),
        signal.clone(),
        relay.clone(),
        devices.clone(),
    ));
    Harness {
        api,
        signal,
        relay,
        devices,
        session,
    }
}

// ===== FIXTURES =====

pub fn participant(id: &str) -> Participant {
    Participant::new(UserId::new(id), id.to_uppercase(), Role::Crew)
}

pub fn chat_message(id: &str, sender: &str, text: &str) -> ChatMessage {
    ChatMessage {
        id: id.to_string(),
        sender_id: UserId::new(sender),
        sender_name: sender.to_uppercase(),
        text: text.to_string(),
        timestamp: Utc::now(),
    }
}

/// Poll an async condition until it holds, or panic after ~1s
pub async fn wait_for<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if condition().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within the timeout");
}
