//! Frame-loop boundary. A bad frame is logged and the aircraft put back on
//! its spawn pose; the next frame runs normally.

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use engine_core::Time;
use input::ControlSource;

use crate::error::SimError;
use crate::sim::{FrameReport, SimContext};

pub struct FrameLoop {
    pub context: SimContext,
    time: Time,
    faults: u64,
}

impl FrameLoop {
    pub fn new(context: SimContext) -> Self {
        Self {
            context,
            time: Time::new(),
            faults: 0,
        }
    }

    /// Advance the clock by `dt` and run one tick. Returns `None` when the
    /// frame faulted.
    pub fn run_frame(&mut self, controls: &impl ControlSource, dt: Duration) -> Option<FrameReport> {
        self.time.advance(dt);
        let now = self.time.now_seconds();
        let dt = self.time.delta_seconds();

        let context = &mut self.context;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| context.tick(controls, now, dt)));
        match outcome {
            Ok(Ok(report)) => Some(report),
            Ok(Err(e)) => {
                log::warn!("Frame {} faulted: {}", self.time.frame_count(), e);
                if matches!(e, SimError::NonFiniteState(_)) {
                    self.context.flight.reset_state();
                }
                self.faults += 1;
                None
            }
            Err(payload) => {
                log::error!(
                    "Frame {} panicked: {}",
                    self.time.frame_count(),
                    panic_message(payload.as_ref())
                );
                self.context.flight.reset_state();
                self.faults += 1;
                None
            }
        }
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    /// Frames that faulted since creation.
    pub fn faults(&self) -> u64 {
        self.faults
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
