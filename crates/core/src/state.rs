// Handle and session state machines

use crate::error::{AudioError, Result};
use parking_lot::RwLock;
use std::sync::Arc;

/// State of a player handle, modelled on a platform media player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// No data source attached
    Idle,
    /// Data source attached, not yet prepared
    Initialized,
    /// Asynchronous preparation in flight
    Preparing,
    /// Prepared and ready to start
    Prepared,
    /// Playing
    Started,
    /// Paused
    Paused,
    /// Stopped; must be prepared again before it can start
    Stopped,
    /// Resources released; the handle is unusable
    Released,
}

impl HandleState {
    /// Whether a transition from `self` to `to` is permitted
    pub fn can_transition_to(self, to: HandleState) -> bool {
        use HandleState::*;

        match (self, to) {
            (Released, _) => false,
            (_, Released) => true,

            (Idle, Initialized) => true,

            (Initialized, Preparing) => true,
            (Stopped, Preparing) => true,

            (Preparing, Prepared) => true,

            (Prepared, Started) => true,
            (Paused, Started) => true,
            (Started, Started) => true,

            (Started, Paused) => true,
            (Paused, Paused) => true,

            (Prepared, Stopped) => true,
            (Started, Stopped) => true,
            (Paused, Stopped) => true,
            (Stopped, Stopped) => true,

            _ => false,
        }
    }

    /// Whether the handle has a decoded track to seek within
    pub fn is_seekable(self) -> bool {
        matches!(
            self,
            HandleState::Prepared | HandleState::Started | HandleState::Paused
        )
    }
}

/// Thread-safe handle state shared between the owner and the preparation worker
#[derive(Clone)]
pub struct HandleStateContainer {
    state: Arc<RwLock<HandleState>>,
}

impl HandleStateContainer {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(HandleState::Idle)),
        }
    }

    pub fn get(&self) -> HandleState {
        *self.state.read()
    }

    /// Move to `to`, rejecting transitions the handle does not support
    pub fn transition(&self, to: HandleState) -> Result<HandleState> {
        let mut state = self.state.write();
        let from = *state;
        if !from.can_transition_to(to) {
            return Err(AudioError::InvalidState(format!(
                "Invalid state transition from {:?} to {:?}",
                from, to
            )));
        }
        *state = to;
        log::debug!("Handle state changed: {:?} -> {:?}", from, to);
        Ok(from)
    }

    /// Move to `to` only if the current state is `expected`
    pub fn transition_from(&self, expected: HandleState, to: HandleState) -> Result<()> {
        let mut state = self.state.write();
        if *state != expected {
            return Err(AudioError::InvalidState(format!(
                "Expected state {:?}, but current state is {:?}",
                expected, *state
            )));
        }
        *state = to;
        log::debug!("Handle state changed: {:?} -> {:?}", expected, to);
        Ok(())
    }
}

impl Default for HandleStateContainer {
    fn default() -> Self {
        Self::new()
    }
}

/// Playback session state as seen by the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Source not attached
    Uninitialized,
    /// Waiting for the first prepared signal
    Preparing,
    /// Prepared and paused
    Paused,
    /// Prepared and playing
    Playing,
    /// Hard stop issued; waiting for re-preparation
    Stopped,
}

impl SessionState {
    pub fn is_prepared(self) -> bool {
        matches!(self, SessionState::Paused | SessionState::Playing)
    }

    pub fn is_playing(self) -> bool {
        self == SessionState::Playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_cycle() {
        let state = HandleStateContainer::new();
        state.transition(HandleState::Initialized).unwrap();
        state.transition(HandleState::Preparing).unwrap();
        state.transition(HandleState::Prepared).unwrap();
        state.transition(HandleState::Started).unwrap();
        state.transition(HandleState::Stopped).unwrap();
        state.transition(HandleState::Preparing).unwrap();
        assert_eq!(state.get(), HandleState::Preparing);
    }

    #[test]
    fn test_start_before_prepared_is_rejected() {
        let state = HandleStateContainer::new();
        state.transition(HandleState::Initialized).unwrap();
        state.transition(HandleState::Preparing).unwrap();
        assert!(state.transition(HandleState::Started).is_err());
        assert_eq!(state.get(), HandleState::Preparing);
    }

    #[test]
    fn test_start_after_stop_requires_prepare() {
        assert!(!HandleState::Stopped.can_transition_to(HandleState::Started));
    }

    #[test]
    fn test_released_is_terminal() {
        let state = HandleStateContainer::new();
        state.transition(HandleState::Released).unwrap();
        assert!(state.transition(HandleState::Initialized).is_err());
        assert!(state.transition(HandleState::Released).is_err());
    }

    #[test]
    fn test_transition_from_checks_expected_state() {
        let state = HandleStateContainer::new();
        assert!(state
            .transition_from(HandleState::Preparing, HandleState::Prepared)
            .is_err());
        assert_eq!(state.get(), HandleState::Idle);
    }

    #[test]
    fn test_session_flags() {
        assert!(!SessionState::Preparing.is_prepared());
        assert!(!SessionState::Stopped.is_prepared());
        assert!(SessionState::Paused.is_prepared());
        assert!(SessionState::Playing.is_playing());
        assert!(!SessionState::Paused.is_playing());
    }
}
