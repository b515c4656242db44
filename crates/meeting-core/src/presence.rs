//! Presence reconciliation
//!
//! Maintains the authoritative live-participant list by merging full-sync
//! snapshots with incremental join/leave/update events. Two rules make the
//! merge safe against the races a presence channel allows:
//!
//! - A full sync **replaces** the entire list. It is not merged additively,
//!   because it is the only way to recover from missed incremental events
//!   after a reconnect.
//! - Incremental events are applied in arrival order by a single caller and
//!   are idempotent: duplicate joins, leaves for absent ids, and updates
//!   for unknown ids are all no-ops.
//!
//! Arrival order of the list is preserved so that tiles do not reshuffle
//! when unrelated participants change state.

use crate::types::{Participant, ParticipantState, UserId};

/// Authoritative live-participant list for one meeting attempt
///
/// Owned by the session controller; all mutation goes through the
/// `apply_*` reducer functions below, never through shared references.
///
/// # Examples
///
/// ```rust
/// use omnimeet_meeting_core::presence::PresenceReconciler;
/// use omnimeet_meeting_core::types::{Participant, Role, UserId};
///
/// let mut presence = PresenceReconciler::new();
/// presence.full_sync(vec![Participant::new(UserId::new("a"), "Alice", Role::Crew)]);
/// assert!(presence.apply_joined(Participant::new(UserId::new("b"), "Bob", Role::Crew)));
/// assert_eq!(presence.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct PresenceReconciler {
    participants: Vec<Participant>,
}

impl PresenceReconciler {
    /// Create an empty reconciler
    pub fn new() -> Self {
        Self {
            participants: Vec::new(),
        }
    }

    /// Replace the entire list with a full-sync snapshot
    ///
    /// Duplicate ids inside the snapshot itself are collapsed to the first
    /// occurrence, preserving the invariant of at most one entry per user.
    pub fn full_sync(&mut self, snapshot: Vec<Participant>) {
        self.participants.clear();
        for participant in snapshot {
            if !self.contains(&participant.user_id) {
                self.participants.push(participant);
            }
        }
        tracing::debug!(count = self.participants.len(), "applied presence full sync");
    }

    /// Apply an incremental join
    ///
    /// Returns `true` if the participant was added; a duplicate join for an
    /// id already present is a no-op and returns `false`.
    pub fn apply_joined(&mut self, participant: Participant) -> bool {
        if self.contains(&participant.user_id) {
            tracing::debug!(user_id = %participant.user_id, "ignoring duplicate join");
            return false;
        }
        self.participants.push(participant);
        true
    }

    /// Apply an incremental leave
    ///
    /// Returns `true` if a participant was removed; a leave for an absent id
    /// is a no-op and returns `false`.
    pub fn apply_left(&mut self, user_id: &UserId) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| &p.user_id != user_id);
        before != self.participants.len()
    }

    /// Apply an incremental state update, replacing the participant's state
    /// record wholesale
    ///
    /// An update for an unknown participant is discarded, not queued: the
    /// matching join was either missed (the next full sync recovers it) or
    /// the participant already left.
    pub fn apply_state(&mut self, user_id: &UserId, state: ParticipantState) -> bool {
        match self.participants.iter_mut().find(|p| &p.user_id == user_id) {
            Some(participant) => {
                participant.state = state;
                true
            }
            None => {
                tracing::debug!(user_id = %user_id, "discarding state update for unknown participant");
                false
            }
        }
    }

    /// Current list in arrival order
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Look up a participant by id
    pub fn get(&self, user_id: &UserId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.user_id == user_id)
    }

    /// Whether a participant with this id is present
    pub fn contains(&self, user_id: &UserId) -> bool {
        self.get(user_id).is_some()
    }

    /// Number of live participants
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn participant(id: &str, mic_on: bool) -> Participant {
        let mut p = Participant::new(UserId::new(id), id.to_uppercase(), Role::Crew);
        p.state.mic_on = mic_on;
        p
    }

    #[test]
    fn full_sync_replaces_rather_than_merges() {
        let mut presence = PresenceReconciler::new();
        presence.full_sync(vec![participant("a", true), participant("b", false)]);
        presence.full_sync(vec![participant("c", false)]);

        assert_eq!(presence.len(), 1);
        assert!(presence.contains(&UserId::new("c")));
        assert!(!presence.contains(&UserId::new("a")));
    }

    #[test]
    fn full_sync_collapses_duplicate_ids() {
        let mut presence = PresenceReconciler::new();
        presence.full_sync(vec![participant("a", true), participant("a", false)]);

        assert_eq!(presence.len(), 1);
        assert!(presence.get(&UserId::new("a")).unwrap().state.mic_on);
    }

    #[test]
    fn duplicate_join_is_idempotent() {
        let mut presence = PresenceReconciler::new();
        assert!(presence.apply_joined(participant("a", true)));
        assert!(!presence.apply_joined(participant("a", false)));

        assert_eq!(presence.len(), 1);
        // First join wins; the duplicate does not overwrite state
        assert!(presence.get(&UserId::new("a")).unwrap().state.mic_on);
    }

    #[test]
    fn leave_for_absent_id_is_noop() {
        let mut presence = PresenceReconciler::new();
        presence.full_sync(vec![participant("a", true)]);

        assert!(!presence.apply_left(&UserId::new("ghost")));
        assert_eq!(presence.len(), 1);
    }

    #[test]
    fn update_replaces_state_wholesale() {
        let mut presence = PresenceReconciler::new();
        presence.full_sync(vec![participant("a", true)]);

        let mut new_state = ParticipantState::new();
        new_state.hand_raised = true;
        assert!(presence.apply_state(&UserId::new("a"), new_state.clone()));

        let p = presence.get(&UserId::new("a")).unwrap();
        assert!(!p.state.mic_on);
        assert!(p.state.hand_raised);

        // Applying the identical update again changes nothing
        assert!(presence.apply_state(&UserId::new("a"), new_state.clone()));
        assert_eq!(presence.get(&UserId::new("a")).unwrap().state, new_state);
    }

    #[test]
    fn update_for_unknown_participant_is_discarded() {
        let mut presence = PresenceReconciler::new();
        assert!(!presence.apply_state(&UserId::new("ghost"), ParticipantState::new()));
        assert!(presence.is_empty());
    }

    #[test]
    fn fold_of_incremental_events_over_snapshot() {
        // Full sync [{A, mic:on}], joined {B, mic:off}, updated {B, mic:on},
        // left {A} => final list is [{B, mic:on}]
        let mut presence = PresenceReconciler::new();
        presence.full_sync(vec![participant("a", true)]);
        presence.apply_joined(participant("b", false));

        let mut b_state = presence.get(&UserId::new("b")).unwrap().state.clone();
        b_state.mic_on = true;
        presence.apply_state(&UserId::new("b"), b_state);
        presence.apply_left(&UserId::new("a"));

        assert_eq!(presence.len(), 1);
        let b = presence.get(&UserId::new("b")).unwrap();
        assert!(b.state.mic_on);
    }

    #[test]
    fn arrival_order_is_preserved() {
        let mut presence = PresenceReconciler::new();
        presence.apply_joined(participant("a", false));
        presence.apply_joined(participant("b", false));
        presence.apply_joined(participant("c", false));
        presence.apply_left(&UserId::new("b"));
        presence.apply_joined(participant("d", false));

        let order: Vec<&str> = presence
            .participants()
            .iter()
            .map(|p| p.user_id.as_str())
            .collect();
        assert_eq!(order, vec!["a", "c", "d"]);
    }
}
