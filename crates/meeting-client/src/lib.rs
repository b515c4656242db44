//! # Meeting Session Client
//!
//! High-level coordinator for joining and participating in meetings. The
//! crate composes four externally provided capabilities (meeting service,
//! signaling channel, media relay, local devices) with the pure state
//! machines from [`omnimeet_meeting_core`] and exposes one controller,
//! [`MeetingSession`], that drives a meeting attempt from pre-join preview
//! through teardown.
//!
//! ## Architecture
//!
//! ```text
//! +------------------------------------------------------+
//! |                   MeetingSession                     |
//! |  phase machine / join sequence / media controls      |
//! +------+----------+-----------+------------+-----------+
//!        |          |           |            |
//!   MeetingApi  SignalChannel  MediaRelay  MediaDevices
//!   (service)   (socket)       (SFU)       (capture)
//! +------------------------------------------------------+
//! |  omnimeet-meeting-core: presence / chat / speaker /  |
//! |  binding / wire                                      |
//! +------------------------------------------------------+
//! ```
//!
//! Inbound signaling events and relay notifications are applied by a
//! background pump task; UI layers observe the session through a broadcast
//! [`MeetingEvent`] stream and read current state from the session.
//!
//! ## Quick Start
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
//! session.join(ConsentFlags::default()).await?;
//!
//! let mut events = session.subscribe_events();
//! while let Ok(event) = events.recv().await {
//!     println!("event: {:?}", event);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod controller;
pub mod devices;
pub mod error;
pub mod events;
pub mod relay;
pub mod service;
pub mod signal;
pub mod state;

pub use config::MeetingConfig;
pub use controller::{MeetingSession, SessionStats};
pub use error::{JoinStage, MeetingError, MeetingResult};
pub use events::{EventStream, MeetingEvent};

// Collaborator contracts, re-exported for implementors
pub use devices::{LocalMedia, MediaDevices};
pub use relay::{MediaRelay, RelayNotification};
pub use service::MeetingApi;
pub use signal::{SignalChannel, SignalSubscription};

/// Client library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
