use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;

use crate::state::{write_state, RunState, ANIMATION_FRAMES};

/// Advances the animation counter at a fixed cadence until the finalize task
/// sends the stop signal. Also exits on its own if `done` is already set.
pub(super) async fn tick(
    state: Arc<RwLock<RunState>>,
    period: Duration,
    mut stop: oneshot::Receiver<()>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = interval.tick() => {
                let mut st = write_state(&state);
                if st.done {
                    break;
                }
                st.frame = (st.frame + 1) % ANIMATION_FRAMES;
            }
        }
    }
}
