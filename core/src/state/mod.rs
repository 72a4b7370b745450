mod run_state;

pub use run_state::{ActionResult, RunState, ANIMATION_FRAMES};

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Lock helpers shared by the engine tasks. A poisoned lock only means a
/// worker panicked mid-write; the aggregate stays usable for the poller.
pub(crate) fn read_state(state: &RwLock<RunState>) -> RwLockReadGuard<'_, RunState> {
    state.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_state(state: &RwLock<RunState>) -> RwLockWriteGuard<'_, RunState> {
    state.write().unwrap_or_else(PoisonError::into_inner)
}
