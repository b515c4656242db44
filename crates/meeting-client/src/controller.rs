//! Meeting session controller
//!
//! [`MeetingSession`] drives one meeting attempt end to end: pre-join
//! preview, the ordered join sequence, in-meeting media and chat, and
//! teardown. It composes the capability traits ([`MeetingApi`],
//! [`SignalChannel`], [`MediaRelay`], [`MediaDevices`]) with the pure state
//! machines from `omnimeet-meeting-core` and pumps inbound events on a
//! background task.
//!
//! # Lifecycle
//!
//! ```text
//! PreJoin --join()--> Joining --sequence ok--> InMeeting --leave()/ended--> Ended
//!                        |
//!                        +--failure--> PreJoin (retryable)
//!                        +--leave() while joining--> Ended (cancelled)
//! ```
//!
//! Every failure path resolves the phase; no error leaves the session in
//! `Joining`.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use omnimeet_meeting_client::{MeetingConfig, MeetingSession};
//! # use omnimeet_meeting_client::service::MeetingApi;
//! # use omnimeet_meeting_client::signal::SignalChannel;
//! # use omnimeet_meeting_client::relay::MediaRelay;
//! # use omnimeet_meeting_client::devices::MediaDevices;
//! # use omnimeet_meeting_core::types::{ConsentFlags, MeetingId, UserId};
//! # async fn run(
//! #     api: Arc<dyn MeetingApi>,
//! #     signal: Arc<dyn SignalChannel>,
//! #     relay: Arc<dyn MediaRelay>,
//! #     devices: Arc<dyn MediaDevices>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let config = MeetingConfig::new(MeetingId::new("mtg-1"), UserId::new("u-1"), "Alice");
//! let session = MeetingSession::new(config, api, signal, relay, devices);
//!
//! session.start_preview().await?;
//! session.join(ConsentFlags { recording: true, transcription: true }).await?;
//! session.send_chat("hello everyone").await?;
//! session.leave().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use omnimeet_meeting_core::binding::{self, RenderPlan};
use omnimeet_meeting_core::media::{ConsumerId, MediaConsumer, MediaProducer, MediaSource};
use omnimeet_meeting_core::types::{
    ChatMessage, ConsentFlags, MeetingDetails, MeetingStatus, Participant, SessionPhase,
    SummaryDocument, UserId,
};
use omnimeet_meeting_core::wire::{SignalCommand, SignalEvent};

use crate::config::MeetingConfig;
use crate::devices::MediaDevices;
use crate::error::{JoinStage, MeetingError, MeetingResult};
use crate::events::{EventStream, MeetingEvent};
use crate::relay::{MediaRelay, RelayNotification};
use crate::service::MeetingApi;
use crate::signal::{SignalChannel, SignalSubscription};
use crate::state::{LocalMediaState, RoomState};

// ===== SESSION STATISTICS =====

/// Point-in-time snapshot of session counters
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// Current lifecycle phase
    pub phase: SessionPhase,
    /// Number of live participants (including the local user once synced)
    pub participant_count: usize,
    /// Messages in the chat log
    pub chat_message_count: usize,
    /// Active local producers
    pub producer_count: usize,
    /// Active remote consumers
    pub consumer_count: usize,
}

// ===== SHARED SESSION STATE =====

/// State shared between the controller API and the event pump task
struct Shared {
    config: MeetingConfig,
    api: Arc<dyn MeetingApi>,
    signal: Arc<dyn SignalChannel>,
    relay: Arc<dyn MediaRelay>,
    devices: Arc<dyn MediaDevices>,
    phase: parking_lot::RwLock<SessionPhase>,
    cancel_join: AtomicBool,
    room: tokio::sync::RwLock<RoomState>,
    local: tokio::sync::RwLock<LocalMediaState>,
    producers: DashMap<MediaSource, MediaProducer>,
    consumers: DashMap<ConsumerId, MediaConsumer>,
    details: parking_lot::RwLock<Option<MeetingDetails>>,
    event_tx: broadcast::Sender<MeetingEvent>,
}

impl Shared {
    fn emit(&self, event: MeetingEvent) {
        // Send fails only when no subscriber exists, which is fine
        let _ = self.event_tx.send(event);
    }

    fn set_phase(&self, phase: SessionPhase) {
        {
            let mut current = self.phase.write();
            if *current == phase {
                return;
            }
            *current = phase;
        }
        debug!(phase = %phase, "session phase changed");
        self.emit(MeetingEvent::PhaseChanged { phase });
    }

    fn phase(&self) -> SessionPhase {
        *self.phase.read()
    }

    /// Push the local participant state to the room, wholesale
    async fn announce_local_state(&self) -> MeetingResult<()> {
        let state = self.local.read().await.participant_state();
        self.signal
            .emit(SignalCommand::UpdateState {
                meeting_id: self.config.meeting_id.clone(),
                state,
            })
            .await
    }

    /// Stop every active producer on the relay
    async fn stop_all_producers(&self) {
        let sources: Vec<MediaSource> = self.producers.iter().map(|e| *e.key()).collect();
        for source in sources {
            if let Err(e) = self.relay.stop_producer(source).await {
                warn!(source = %source, error = %e, "failed to stop producer during teardown");
            }
        }
        self.producers.clear();
    }

    /// Tear down media resources
    ///
    /// Producers and the relay session always go; local track handles are
    /// stopped only when `stop_tracks` is set, because a failed join keeps
    /// the preview alive for a retry.
    async fn release_media(&self, stop_tracks: bool) {
        self.stop_all_producers().await;
        self.consumers.clear();

        if let Err(e) = self.relay.close().await {
            warn!(error = %e, "failed to close relay session");
        }

        if stop_tracks {
            let tracks = {
                let mut local = self.local.write().await;
                let tracks = local.tracks();
                local.audio_track = None;
                local.video_track = None;
                local.screen_track = None;
                local.mic_enabled = false;
                local.camera_enabled = false;
                local.screen_sharing = false;
                tracks
            };
            for track in tracks {
                if let Err(e) = self.devices.stop(&track).await {
                    warn!(track = %track.id, error = %e, "failed to stop local track");
                }
            }
        }
    }
}

// ===== MEETING SESSION =====

/// Controller for one meeting attempt
///
/// Construct one per meeting; after the session reaches
/// [`SessionPhase::Ended`] it cannot be reused. All methods take `&self`
/// and are safe to call from multiple tasks.
pub struct MeetingSession {
    shared: Arc<Shared>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl MeetingSession {
    /// Create a session in the pre-join phase
    pub fn new(
        config: MeetingConfig,
        api: Arc<dyn MeetingApi>,
        signal: Arc<dyn SignalChannel>,
        relay: Arc<dyn MediaRelay>,
        devices: Arc<dyn MediaDevices>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_capacity);
        Self {
            shared: Arc::new(Shared {
                config,
                api,
                signal,
                relay,
                devices,
                phase: parking_lot::RwLock::new(SessionPhase::PreJoin),
                cancel_join: AtomicBool::new(false),
                room: tokio::sync::RwLock::new(RoomState::new()),
                local: tokio::sync::RwLock::new(LocalMediaState::new()),
                producers: DashMap::new(),
                consumers: DashMap::new(),
                details: parking_lot::RwLock::new(None),
                event_tx,
            }),
            pump: Mutex::new(None),
        }
    }

    // ===== META AND OBSERVATION =====

    /// Current lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        self.shared.phase()
    }

    /// Fetch and cache the meeting's metadata and invited roster
    ///
    /// A meeting that already ended short-circuits the session to the
    /// terminal phase; the caller can then fetch the summary instead of
    /// offering a join.
    pub async fn load_meeting(&self) -> MeetingResult<MeetingDetails> {
        let details = self.shared.api.get_meeting(&self.shared.config.meeting_id).await?;
        *self.shared.details.write() = Some(details.clone());
        if details.status == MeetingStatus::Ended && self.shared.phase() == SessionPhase::PreJoin {
            self.shared.set_phase(SessionPhase::Ended);
        }
        Ok(details)
    }

    /// Cached meeting metadata, if [`MeetingSession::load_meeting`] ran
    pub fn meeting(&self) -> Option<MeetingDetails> {
        self.shared.details.read().clone()
    }

    /// Start a scheduled meeting on the service (organizer action)
    pub async fn start_meeting(&self) -> MeetingResult<()> {
        self.shared.api.start_meeting(&self.shared.config.meeting_id).await
    }

    /// End the meeting for everyone (host action)
    ///
    /// The service broadcasts `meeting:ended`; the local teardown happens
    /// when that event arrives, the same as for every other participant.
    pub async fn end_meeting(&self) -> MeetingResult<()> {
        if self.shared.phase() != SessionPhase::InMeeting {
            return Err(MeetingError::NotInMeeting);
        }
        self.shared.api.end_meeting(&self.shared.config.meeting_id).await
    }

    /// Fetch the AI summary document for this meeting, once generated
    pub async fn summary(&self) -> MeetingResult<SummaryDocument> {
        let document_id = self
            .shared
            .details
            .read()
            .as_ref()
            .and_then(|d| d.ai_summary_id.clone())
            .ok_or_else(|| MeetingError::invalid_state("no summary document available"))?;
        self.shared.api.get_summary_document(&document_id).await
    }

    /// Live participant roster in arrival order
    pub async fn participants(&self) -> Vec<Participant> {
        self.shared.room.read().await.presence.participants().to_vec()
    }

    /// Chat log in arrival order
    pub async fn chat_messages(&self) -> Vec<ChatMessage> {
        self.shared.room.read().await.chat.messages().to_vec()
    }

    /// Current active speaker, if any
    pub async fn active_speaker(&self) -> Option<UserId> {
        self.shared.room.read().await.speaker.current().cloned()
    }

    /// Resolve the current participant-to-track render plan
    pub async fn render_plan(&self) -> RenderPlan {
        let producers: Vec<MediaProducer> =
            self.shared.producers.iter().map(|e| e.value().clone()).collect();
        let consumers: Vec<MediaConsumer> =
            self.shared.consumers.iter().map(|e| e.value().clone()).collect();
        let room = self.shared.room.read().await;
        binding::resolve(
            &self.shared.config.user_id,
            room.presence.participants(),
            &producers,
            &consumers,
        )
    }

    /// Snapshot session counters
    pub async fn stats(&self) -> SessionStats {
        let room = self.shared.room.read().await;
        SessionStats {
            phase: self.shared.phase(),
            participant_count: room.presence.len(),
            chat_message_count: room.chat.len(),
            producer_count: self.shared.producers.len(),
            consumer_count: self.shared.consumers.len(),
        }
    }

    /// Subscribe to session events
    pub fn subscribe_events(&self) -> broadcast::Receiver<MeetingEvent> {
        self.shared.event_tx.subscribe()
    }

    /// Session events as a `Stream`
    pub fn event_stream(&self) -> EventStream {
        EventStream::new(self.shared.event_tx.subscribe())
    }

    // ===== PRE-JOIN PREVIEW =====

    /// Acquire local devices for the pre-join preview
    ///
    /// Device denial is a non-fatal degradation: the affected flags stay
    /// off, a [`MeetingEvent::Warning`] is emitted, and the call still
    /// succeeds. The user can join with media off and retry the toggles.
    pub async fn start_preview(&self) -> MeetingResult<()> {
        if self.shared.phase() != SessionPhase::PreJoin {
            return Err(MeetingError::invalid_state(
                "preview can only start before joining",
            ));
        }

        let want_mic = self.shared.config.start_with_mic;
        let want_camera = self.shared.config.start_with_camera;
        if !want_mic && !want_camera {
            return Ok(());
        }

        match self.shared.devices.acquire(want_mic, want_camera).await {
            Ok(media) => {
                let mut local = self.shared.local.write().await;
                local.mic_enabled = want_mic && media.audio.is_some();
                local.camera_enabled = want_camera && media.video.is_some();
                local.audio_track = media.audio;
                local.video_track = media.video;
                info!(
                    mic = local.mic_enabled,
                    camera = local.camera_enabled,
                    "preview started"
                );
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "device acquisition failed, continuing with media off");
                self.shared.emit(MeetingEvent::Warning {
                    message: format!("media devices unavailable: {}", e),
                });
                Ok(())
            }
        }
    }

    // ===== JOIN SEQUENCE =====

    /// Join the meeting
    ///
    /// Runs the ordered sequence: service handshake, relay connect, local
    /// producer setup, signaling subscribe, presence announce. On success
    /// the phase is `InMeeting` and the event pump is running. On failure
    /// everything acquired so far is released, the phase returns to
    /// `PreJoin` (preview tracks are kept for a retry), and exactly one
    /// error is returned. A concurrent [`MeetingSession::leave`] cancels
    /// the attempt and resolves the session to `Ended`.
    pub async fn join(&self, consents: ConsentFlags) -> MeetingResult<()> {
        {
            let mut phase = self.shared.phase.write();
            match *phase {
                SessionPhase::PreJoin => *phase = SessionPhase::Joining,
                SessionPhase::Joining => {
                    return Err(MeetingError::invalid_state("join already in progress"))
                }
                SessionPhase::InMeeting => {
                    return Err(MeetingError::invalid_state("already in the meeting"))
                }
                SessionPhase::Ended => {
                    return Err(MeetingError::invalid_state("session has ended"))
                }
            }
        }
        self.shared.cancel_join.store(false, Ordering::SeqCst);
        self.shared.emit(MeetingEvent::PhaseChanged {
            phase: SessionPhase::Joining,
        });
        self.shared.local.write().await.consents = consents;

        match self.run_join_sequence(consents).await {
            Ok((subscription, notifications)) => {
                self.shared.local.write().await.joined_at = Utc::now();

                // Final cancellation gate, atomic with the phase flip: a
                // leave issued at any point during the sequence must win
                // over the promotion
                let promoted = {
                    let mut phase = self.shared.phase.write();
                    if *phase == SessionPhase::Joining
                        && !self.shared.cancel_join.load(Ordering::SeqCst)
                    {
                        *phase = SessionPhase::InMeeting;
                        true
                    } else {
                        false
                    }
                };
                if !promoted {
                    drop(subscription);
                    drop(notifications);
                    return Err(self.unwind_join(MeetingError::JoinCancelled).await);
                }

                let pump = EventPump {
                    shared: Arc::clone(&self.shared),
                };
                let handle = tokio::spawn(pump.run(subscription, notifications));
                *self.pump.lock().await = Some(handle);

                self.shared.emit(MeetingEvent::PhaseChanged {
                    phase: SessionPhase::InMeeting,
                });
                info!(meeting_id = %self.shared.config.meeting_id, "joined meeting");
                Ok(())
            }
            Err(e) => Err(self.unwind_join(e).await),
        }
    }

    /// The fallible body of the join sequence
    ///
    /// Cancellation is checked between stages so a concurrent leave takes
    /// effect at the next boundary rather than mid-operation.
    async fn run_join_sequence(
        &self,
        consents: ConsentFlags,
    ) -> MeetingResult<(SignalSubscription, mpsc::Receiver<RelayNotification>)> {
        let meeting_id = self.shared.config.meeting_id.clone();

        // Stage 1: service handshake
        let credentials = self
            .shared
            .api
            .join_meeting(&meeting_id, consents)
            .await
            .map_err(|e| MeetingError::join_failed(JoinStage::Handshake, e.to_string()))?;
        self.check_cancelled()?;

        // Stage 2: relay session
        self.shared
            .relay
            .join_room(&meeting_id, &credentials)
            .await
            .map_err(|e| MeetingError::join_failed(JoinStage::RelayConnect, e.to_string()))?;
        self.check_cancelled()?;

        // Stage 3: offer the preview tracks as producers
        self.create_initial_producers()
            .await
            .map_err(|e| MeetingError::join_failed(JoinStage::Produce, e.to_string()))?;
        self.check_cancelled()?;

        // Stage 4: subscribe to the signaling room
        let subscription = self
            .shared
            .signal
            .subscribe(&meeting_id)
            .await
            .map_err(|e| MeetingError::join_failed(JoinStage::Subscribe, e.to_string()))?;
        let notifications = self
            .shared
            .relay
            .take_notifications()
            .await
            .map_err(|e| MeetingError::join_failed(JoinStage::Subscribe, e.to_string()))?;
        self.check_cancelled()?;

        // Stage 5: announce presence, then push the initial state
        self.shared
            .signal
            .emit(SignalCommand::Join {
                meeting_id: meeting_id.clone(),
            })
            .await
            .map_err(|e| MeetingError::join_failed(JoinStage::Announce, e.to_string()))?;
        self.shared
            .announce_local_state()
            .await
            .map_err(|e| MeetingError::join_failed(JoinStage::Announce, e.to_string()))?;

        Ok((subscription, notifications))
    }

    async fn create_initial_producers(&self) -> MeetingResult<()> {
        let (audio, video) = {
            let local = self.shared.local.read().await;
            (
                local.mic_enabled.then(|| local.audio_track.clone()).flatten(),
                local
                    .camera_enabled
                    .then(|| local.video_track.clone())
                    .flatten(),
            )
        };

        if let Some(track) = audio {
            let producer = self
                .shared
                .relay
                .create_producer(track, MediaSource::Microphone.kind(), MediaSource::Microphone)
                .await?;
            self.shared.producers.insert(MediaSource::Microphone, producer);
        }
        if let Some(track) = video {
            let producer = self
                .shared
                .relay
                .create_producer(track, MediaSource::Camera.kind(), MediaSource::Camera)
                .await?;
            self.shared.producers.insert(MediaSource::Camera, producer);
        }
        Ok(())
    }

    fn check_cancelled(&self) -> MeetingResult<()> {
        if self.shared.cancel_join.load(Ordering::SeqCst) {
            Err(MeetingError::JoinCancelled)
        } else {
            Ok(())
        }
    }

    /// Resolve a failed or cancelled join attempt
    async fn unwind_join(&self, error: MeetingError) -> MeetingError {
        if matches!(error, MeetingError::JoinCancelled)
            || self.shared.cancel_join.load(Ordering::SeqCst)
        {
            // A leave overtook the join: release everything, terminal phase
            self.shared.release_media(true).await;
            self.shared.set_phase(SessionPhase::Ended);
            info!("join attempt cancelled by leave");
            return MeetingError::JoinCancelled;
        }

        // Ordinary failure: keep the preview alive, allow a retry
        self.shared.release_media(false).await;
        self.shared.set_phase(SessionPhase::PreJoin);
        warn!(error = %error, "join attempt failed");
        error
    }

    // ===== LEAVE AND TEARDOWN =====

    /// Leave the meeting and release every resource
    ///
    /// Valid in any phase: during a join it cancels the attempt, in the
    /// meeting it tears the session down, in pre-join it stops the preview.
    /// Calling it after the session ended is a no-op.
    pub async fn leave(&self) -> MeetingResult<()> {
        // The cancel flag is stored while holding the phase lock so it
        // cannot slip past the join task's promotion gate
        let phase = {
            let phase = self.shared.phase.read();
            if *phase == SessionPhase::Joining {
                self.shared.cancel_join.store(true, Ordering::SeqCst);
            }
            *phase
        };
        match phase {
            SessionPhase::Joining => {
                debug!("leave requested during join, cancelling the attempt");
                Ok(())
            }
            SessionPhase::InMeeting => {
                self.stop_pump().await;
                self.shared.release_media(true).await;
                if let Err(e) = self
                    .shared
                    .api
                    .leave_meeting(&self.shared.config.meeting_id)
                    .await
                {
                    warn!(error = %e, "failed to report leave to the meeting service");
                }
                self.shared.set_phase(SessionPhase::Ended);
                self.shared.emit(MeetingEvent::MeetingEnded { by_host: false });
                info!(meeting_id = %self.shared.config.meeting_id, "left meeting");
                Ok(())
            }
            SessionPhase::PreJoin => {
                self.shared.release_media(true).await;
                self.shared.set_phase(SessionPhase::Ended);
                Ok(())
            }
            SessionPhase::Ended => Ok(()),
        }
    }

    async fn stop_pump(&self) {
        if let Some(handle) = self.pump.lock().await.take() {
            handle.abort();
        }
    }

    // ===== LOCAL MEDIA CONTROLS =====

    /// Enable or disable the microphone
    ///
    /// Idempotent. Enabling acquires the device if no track exists yet;
    /// in-meeting, the change is announced to the room.
    pub async fn set_mic_enabled(&self, enabled: bool) -> MeetingResult<()> {
        self.set_device_enabled(MediaSource::Microphone, enabled).await
    }

    /// Enable or disable the camera
    ///
    /// Same contract as [`MeetingSession::set_mic_enabled`].
    pub async fn set_camera_enabled(&self, enabled: bool) -> MeetingResult<()> {
        self.set_device_enabled(MediaSource::Camera, enabled).await
    }

    async fn set_device_enabled(&self, source: MediaSource, enabled: bool) -> MeetingResult<()> {
        if self.shared.phase() == SessionPhase::Ended {
            return Err(MeetingError::invalid_state("session has ended"));
        }

        let current = {
            let local = self.shared.local.read().await;
            match source {
                MediaSource::Microphone => local.mic_enabled,
                MediaSource::Camera => local.camera_enabled,
                MediaSource::Screen => unreachable!("screen uses the share controls"),
            }
        };
        if current == enabled {
            return Ok(());
        }

        if enabled {
            self.ensure_track(source).await?;
        }

        let track = {
            let mut local = self.shared.local.write().await;
            match source {
                MediaSource::Microphone => {
                    local.mic_enabled = enabled;
                    local.audio_track.clone()
                }
                MediaSource::Camera => {
                    local.camera_enabled = enabled;
                    local.video_track.clone()
                }
                MediaSource::Screen => unreachable!(),
            }
        };

        if let Some(track) = &track {
            self.shared.devices.set_enabled(track, enabled).await?;
        }

        if self.shared.phase() == SessionPhase::InMeeting {
            // A track acquired after joining has no producer yet
            if enabled && !self.shared.producers.contains_key(&source) {
                if let Some(track) = track {
                    let producer = self
                        .shared
                        .relay
                        .create_producer(track, source.kind(), source)
                        .await?;
                    self.shared.producers.insert(source, producer);
                    self.shared.emit(MeetingEvent::MediaBindingsChanged);
                }
            }
            self.shared.announce_local_state().await?;
        }
        Ok(())
    }

    async fn ensure_track(&self, source: MediaSource) -> MeetingResult<()> {
        let missing = {
            let local = self.shared.local.read().await;
            match source {
                MediaSource::Microphone => local.audio_track.is_none(),
                MediaSource::Camera => local.video_track.is_none(),
                MediaSource::Screen => unreachable!(),
            }
        };
        if !missing {
            return Ok(());
        }

        let want_mic = source == MediaSource::Microphone;
        let media = self.shared.devices.acquire(want_mic, !want_mic).await?;
        let mut local = self.shared.local.write().await;
        match source {
            MediaSource::Microphone => local.audio_track = media.audio,
            MediaSource::Camera => local.video_track = media.video,
            MediaSource::Screen => unreachable!(),
        }
        Ok(())
    }

    /// Raise or lower the local hand
    pub async fn set_hand_raised(&self, raised: bool) -> MeetingResult<()> {
        {
            let mut local = self.shared.local.write().await;
            if local.hand_raised == raised {
                return Ok(());
            }
            local.hand_raised = raised;
        }
        if self.shared.phase() == SessionPhase::InMeeting {
            self.shared.announce_local_state().await?;
        }
        Ok(())
    }

    // ===== SCREEN SHARING =====

    /// Start sharing the screen
    ///
    /// At most one local share exists at a time: starting a new one first
    /// stops the previous one. Requires an active meeting.
    pub async fn start_screen_share(&self) -> MeetingResult<()> {
        if self.shared.phase() != SessionPhase::InMeeting {
            return Err(MeetingError::NotInMeeting);
        }

        // Replace, not stack
        if self.shared.local.read().await.screen_sharing {
            self.teardown_screen_share().await;
        }

        let track = self.shared.devices.acquire_screen().await?;
        let producer = self
            .shared
            .relay
            .create_producer(track.clone(), MediaSource::Screen.kind(), MediaSource::Screen)
            .await?;
        self.shared.producers.insert(MediaSource::Screen, producer);

        {
            let mut local = self.shared.local.write().await;
            local.screen_track = Some(track);
            local.screen_sharing = true;
        }
        self.shared.announce_local_state().await?;
        self.shared.emit(MeetingEvent::ScreenShareStarted);
        self.shared.emit(MeetingEvent::MediaBindingsChanged);
        info!("screen share started");
        Ok(())
    }

    /// Stop sharing the screen
    ///
    /// A no-op when nothing is being shared.
    pub async fn stop_screen_share(&self) -> MeetingResult<()> {
        if !self.shared.local.read().await.screen_sharing {
            return Ok(());
        }

        self.teardown_screen_share().await;
        if self.shared.phase() == SessionPhase::InMeeting {
            self.shared.announce_local_state().await?;
        }
        self.shared.emit(MeetingEvent::ScreenShareStopped);
        self.shared.emit(MeetingEvent::MediaBindingsChanged);
        info!("screen share stopped");
        Ok(())
    }

    async fn teardown_screen_share(&self) {
        if self.shared.producers.remove(&MediaSource::Screen).is_some() {
            if let Err(e) = self.shared.relay.stop_producer(MediaSource::Screen).await {
                warn!(error = %e, "failed to stop screen producer");
            }
        }
        let track = {
            let mut local = self.shared.local.write().await;
            local.screen_sharing = false;
            local.screen_track.take()
        };
        if let Some(track) = track {
            if let Err(e) = self.shared.devices.stop(&track).await {
                warn!(track = %track.id, error = %e, "failed to stop screen track");
            }
        }
    }

    // ===== CHAT =====

    /// Send a chat message to the room
    ///
    /// The message is not inserted locally; it lands in the log when the
    /// server echoes it back, so everyone (sender included) sees the same
    /// arrival order and the echo deduplicates by id.
    pub async fn send_chat(&self, text: impl Into<String>) -> MeetingResult<()> {
        if self.shared.phase() != SessionPhase::InMeeting {
            return Err(MeetingError::NotInMeeting);
        }
        self.shared
            .signal
            .emit(SignalCommand::ChatSend {
                meeting_id: self.shared.config.meeting_id.clone(),
                text: text.into(),
            })
            .await
    }
}

impl Drop for MeetingSession {
    fn drop(&mut self) {
        if let Ok(mut pump) = self.pump.try_lock() {
            if let Some(handle) = pump.take() {
                handle.abort();
            }
        }
    }
}

// ===== EVENT PUMP =====

/// Background task applying inbound signaling events and relay
/// notifications to the session state
struct EventPump {
    shared: Arc<Shared>,
}

impl EventPump {
    async fn run(
        self,
        mut subscription: SignalSubscription,
        mut notifications: mpsc::Receiver<RelayNotification>,
    ) {
        let mut notifications_open = true;
        loop {
            tokio::select! {
                event = subscription.recv() => match event {
                    Some(event) => {
                        if self.handle_signal(event).await {
                            break;
                        }
                    }
                    None => {
                        debug!("signaling subscription closed, stopping event pump");
                        break;
                    }
                },
                notification = notifications.recv(), if notifications_open => {
                    match notification {
                        Some(notification) => self.handle_notification(notification).await,
                        None => notifications_open = false,
                    }
                }
            }
        }
    }

    /// Apply one signaling event; returns `true` when the pump should stop
    async fn handle_signal(&self, event: SignalEvent) -> bool {
        match event {
            SignalEvent::SyncParticipants { participants } => {
                let count = participants.len();
                self.shared.room.write().await.presence.full_sync(participants);
                self.shared.emit(MeetingEvent::ParticipantsSynced { count });
                self.shared.emit(MeetingEvent::MediaBindingsChanged);
            }
            SignalEvent::ParticipantJoined { participant } => {
                let added = self
                    .shared
                    .room
                    .write()
                    .await
                    .presence
                    .apply_joined(participant.clone());
                if added {
                    self.shared.emit(MeetingEvent::ParticipantJoined { participant });
                }
            }
            SignalEvent::ParticipantLeft { user_id } => {
                let removed = self.shared.room.write().await.presence.apply_left(&user_id);
                if removed {
                    // Their media goes with them
                    self.shared
                        .consumers
                        .retain(|_, consumer| consumer.participant_id != user_id);
                    self.shared.emit(MeetingEvent::ParticipantLeft { user_id });
                    self.shared.emit(MeetingEvent::MediaBindingsChanged);
                }
            }
            SignalEvent::ParticipantUpdated { user_id, state } => {
                let applied = self
                    .shared
                    .room
                    .write()
                    .await
                    .presence
                    .apply_state(&user_id, state.clone());
                if applied {
                    self.shared.emit(MeetingEvent::ParticipantUpdated { user_id, state });
                }
            }
            SignalEvent::ActiveSpeaker { user_id } => {
                let changed = self
                    .shared
                    .room
                    .write()
                    .await
                    .speaker
                    .observe(user_id.clone());
                if changed {
                    self.shared.emit(MeetingEvent::ActiveSpeakerChanged { user_id });
                }
            }
            SignalEvent::ChatMessage(message) => {
                let inserted = self.shared.room.write().await.chat.insert(message.clone());
                if inserted {
                    self.shared.emit(MeetingEvent::ChatMessageReceived { message });
                }
            }
            SignalEvent::MeetingEnded => {
                info!("meeting ended by host");
                self.shared.release_media(true).await;
                self.shared.set_phase(SessionPhase::Ended);
                self.shared.emit(MeetingEvent::MeetingEnded { by_host: true });
                return true;
            }
        }
        false
    }

    async fn handle_notification(&self, notification: RelayNotification) {
        match notification {
            RelayNotification::ConsumerAdded(consumer) => {
                debug!(
                    consumer_id = %consumer.id,
                    participant = %consumer.participant_id,
                    source = %consumer.source,
                    "remote consumer added"
                );
                self.shared.consumers.insert(consumer.id.clone(), consumer);
                self.shared.emit(MeetingEvent::MediaBindingsChanged);
            }
            RelayNotification::ConsumerClosed { consumer_id } => {
                if self.shared.consumers.remove(&consumer_id).is_some() {
                    self.shared.emit(MeetingEvent::MediaBindingsChanged);
                }
            }
            RelayNotification::ProducerClosed { source } => {
                // The platform's own "stop sharing" control ends the track
                // without going through the session API
                if source == MediaSource::Screen {
                    self.shared.producers.remove(&MediaSource::Screen);
                    let track = {
                        let mut local = self.shared.local.write().await;
                        if !local.screen_sharing {
                            return;
                        }
                        local.screen_sharing = false;
                        local.screen_track.take()
                    };
                    if let Some(track) = track {
                        if let Err(e) = self.shared.devices.stop(&track).await {
                            warn!(track = %track.id, error = %e, "failed to stop ended screen track");
                        }
                    }
                    if let Err(e) = self.shared.announce_local_state().await {
                        warn!(error = %e, "failed to announce screen share stop");
                    }
                    self.shared.emit(MeetingEvent::ScreenShareStopped);
                    self.shared.emit(MeetingEvent::MediaBindingsChanged);
                    info!("screen share ended by the platform");
                } else {
                    warn!(source = %source, "producer closed out-of-band");
                    self.shared.producers.remove(&source);
                    self.shared.emit(MeetingEvent::MediaBindingsChanged);
                }
            }
        }
    }
}
