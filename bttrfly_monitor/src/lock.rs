use serde::Serialize;

/// Lock screen progression. Moves forward only; once `Unlocked` it stays
/// there for the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    #[default]
    Locked,
    Unlocking,
    Unlocked,
}

impl LockState {
    /// `Locked → Unlocking`. Returns false (and changes nothing) from any
    /// other state.
    pub fn begin_unlock(&mut self) -> bool {
        if *self != LockState::Locked {
            return false;
        }
        *self = LockState::Unlocking;
        true
    }

    /// `Unlocking → Unlocked`.
    pub fn finish_unlock(&mut self) -> bool {
        if *self != LockState::Unlocking {
            return false;
        }
        *self = LockState::Unlocked;
        true
    }

    /// Whether the lock screen text is still on screen.
    pub fn shows_lock_screen(self) -> bool {
        matches!(self, LockState::Locked | LockState::Unlocking)
    }
}
