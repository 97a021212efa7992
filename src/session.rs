//! Per-identity conversation state.
//!
//! Each user identity owns exactly one `Session` in the keyed map. Scratch
//! fields are only meaningful in the states that stage them and are cleared
//! when the dialog leaves that part of the flow.

use std::collections::HashMap;

use tokio::sync::{Mutex, MutexGuard};

/// The states of the conversation machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    AuthChoice,
    AuthLoginInput,
    AuthPasswordInput,
    RegisterLoginInput,
    RegisterPasswordInput,
    RegisterPasswordConfirm,
    MainMenu,
    DirectionSelect,
    GroupSelect,
    SearchFioInput,
    /// Unrecoverable — the schedule source is gone.
    End,
}

impl DialogState {
    /// Fixed predecessor a literal "back" routes to from this state.
    pub fn back_target(self) -> DialogState {
        use DialogState::*;
        match self {
            AuthChoice
            | AuthLoginInput
            | AuthPasswordInput
            | RegisterLoginInput
            | RegisterPasswordInput
            | RegisterPasswordConfirm => AuthChoice,
            MainMenu | DirectionSelect | GroupSelect | SearchFioInput => MainMenu,
            End => End,
        }
    }

    /// States only reachable after a successful login or registration.
    pub fn requires_auth(self) -> bool {
        use DialogState::*;
        matches!(self, MainMenu | DirectionSelect | GroupSelect | SearchFioInput)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DialogState::End)
    }
}

/// One user's conversation state plus staged scratch fields.
///
/// Never persisted; lives only for the process lifetime.
#[derive(Debug, Clone)]
pub struct Session {
    pub state: DialogState,
    pub authorized: bool,
    pub pending_login: Option<String>,
    pub pending_password: Option<String>,
    pub selected_direction: Option<String>,
}

impl Session {
    pub fn new(state: DialogState, authorized: bool) -> Self {
        Self {
            state,
            authorized,
            pending_login: None,
            pending_password: None,
            selected_direction: None,
        }
    }

    /// Move to a new state, dropping scratch that the target flow does not
    /// read. Auth scratch survives only inside the auth/registration steps;
    /// the selected direction survives only between direction and group
    /// selection.
    pub fn enter(&mut self, state: DialogState) {
        use DialogState::*;
        match state {
            AuthChoice | MainMenu | End => {
                self.pending_login = None;
                self.pending_password = None;
                self.selected_direction = None;
            }
            AuthLoginInput | RegisterLoginInput => {
                self.pending_login = None;
                self.pending_password = None;
            }
            RegisterPasswordInput => {
                self.pending_password = None;
            }
            AuthPasswordInput | RegisterPasswordConfirm | DirectionSelect | GroupSelect
            | SearchFioInput => {}
        }
        self.state = state;
    }
}

/// Keyed arena of sessions, one per user identity.
///
/// The single lock is the mutual-exclusion discipline for session mutation:
/// an inbound event holds it for its whole handling, so two events for the
/// same identity can never interleave Session updates. Coarser than a
/// per-identity lock, and deliberately so — handling is short and CPU-bound
/// apart from whole-table file reads.
#[derive(Default)]
pub struct SessionMap {
    inner: Mutex<HashMap<String, Session>>,
}

impl SessionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the whole map for the duration of one event.
    pub async fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.inner.lock().await
    }
}
