//! Active speaker tracking
//!
//! Consumes the `active-speaker` event stream and exposes the single
//! participant currently considered to be speaking. Each event fully
//! replaces the previous value (last-write-wins); there is no averaging or
//! windowing, and the default is no active speaker.

use crate::types::UserId;

/// Last-write-wins holder for the current active speaker
#[derive(Debug, Default)]
pub struct ActiveSpeakerTracker {
    current: Option<UserId>,
}

impl ActiveSpeakerTracker {
    /// Create a tracker with no active speaker
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Observe a speaker-change event
    ///
    /// `None` clears the highlight. Returns `true` if the value changed.
    pub fn observe(&mut self, speaker: Option<UserId>) -> bool {
        if self.current == speaker {
            return false;
        }
        self.current = speaker;
        true
    }

    /// Participant currently highlighted as speaking, if any
    pub fn current(&self) -> Option<&UserId> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_none() {
        assert!(ActiveSpeakerTracker::new().current().is_none());
    }

    #[test]
    fn last_write_wins() {
        let mut tracker = ActiveSpeakerTracker::new();
        assert!(tracker.observe(Some(UserId::new("a"))));
        assert!(tracker.observe(Some(UserId::new("b"))));
        assert_eq!(tracker.current(), Some(&UserId::new("b")));
    }

    #[test]
    fn repeated_value_reports_no_change() {
        let mut tracker = ActiveSpeakerTracker::new();
        tracker.observe(Some(UserId::new("a")));
        assert!(!tracker.observe(Some(UserId::new("a"))));
    }

    #[test]
    fn none_clears_the_highlight() {
        let mut tracker = ActiveSpeakerTracker::new();
        tracker.observe(Some(UserId::new("a")));
        assert!(tracker.observe(None));
        assert!(tracker.current().is_none());
    }
}
