use crate::constants::{GHOST_MODE_TIMER_COUNT, MODE_SCHEDULE_STEPS};
use crate::types::GhostMode;

pub type ModeChange = (GhostMode, GhostMode);

/// Position inside the level's scatter/chase curve.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ModeSchedule {
    step: usize,
    elapsed: f32,
}

impl ModeSchedule {
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    fn is_terminal(&self) -> bool {
        self.step + 1 >= MODE_SCHEDULE_STEPS
    }
}

/// Per-ghost mode machine: the scheduled scatter/chase cycle plus the
/// frightened and eaten interrupts layered over it.
#[derive(Clone, Debug, PartialEq)]
pub struct GhostModeState {
    mode: GhostMode,
    resume_mode: GhostMode,
    schedule: ModeSchedule,
    /// Energized window this ghost has already reacted to.
    window: Option<u32>,
}

impl Default for GhostModeState {
    fn default() -> Self {
        Self::new()
    }
}

impl GhostModeState {
    pub fn new() -> Self {
        Self {
            mode: GhostMode::Scatter,
            resume_mode: GhostMode::Scatter,
            schedule: ModeSchedule::default(),
            window: None,
        }
    }

    pub fn mode(&self) -> GhostMode {
        self.mode
    }

    /// Mode restored once the current interrupt ends.
    pub fn resume_mode(&self) -> GhostMode {
        self.resume_mode
    }

    pub fn schedule(&self) -> ModeSchedule {
        self.schedule
    }

    /// Advances the scatter/chase timer. Frightened and eaten ghosts keep
    /// their schedule paused.
    pub fn tick_schedule(
        &mut self,
        dt_sec: f32,
        timers: &[f32; GHOST_MODE_TIMER_COUNT],
    ) -> Option<ModeChange> {
        if !matches!(self.mode, GhostMode::Scatter | GhostMode::Chase) {
            return None;
        }
        self.schedule.elapsed += dt_sec;

        let step = self.schedule.step;
        let from = self.mode;
        if self.schedule.is_terminal() {
            if from == GhostMode::Scatter && self.schedule.elapsed > timers[step * 2] {
                self.schedule.elapsed = 0.0;
                self.mode = GhostMode::Chase;
            }
        } else if from == GhostMode::Scatter {
            if self.schedule.elapsed > timers[step * 2] {
                self.schedule.elapsed = 0.0;
                self.mode = GhostMode::Chase;
            }
        } else if self.schedule.elapsed > timers[step * 2 + 1] {
            self.schedule.elapsed = 0.0;
            self.schedule.step += 1;
            self.mode = GhostMode::Scatter;
        }

        (self.mode != from).then_some((from, self.mode))
    }

    /// Applies the global frightened flag. `window` identifies the running
    /// energized window, `None` when no window is active.
    pub fn sync_frightened(&mut self, window: Option<u32>) -> Option<ModeChange> {
        if self.mode == GhostMode::Eaten {
            return None;
        }
        match window {
            Some(id) if self.mode == GhostMode::Frightened => {
                self.window = Some(id);
                None
            }
            Some(id) if self.window == Some(id) => None,
            Some(id) => {
                self.window = Some(id);
                self.resume_mode = self.mode;
                self.mode = GhostMode::Frightened;
                Some((self.resume_mode, GhostMode::Frightened))
            }
            None if self.mode == GhostMode::Frightened => {
                self.mode = self.resume_mode;
                Some((GhostMode::Frightened, self.mode))
            }
            None => None,
        }
    }

    pub fn mark_eaten(&mut self) -> Option<ModeChange> {
        if self.mode != GhostMode::Frightened {
            return None;
        }
        self.mode = GhostMode::Eaten;
        Some((GhostMode::Frightened, GhostMode::Eaten))
    }

    /// Back at the pen entrance: restore the mode held before the interrupt.
    pub fn revive(&mut self) -> Option<ModeChange> {
        if self.mode != GhostMode::Eaten {
            return None;
        }
        self.mode = self.resume_mode;
        Some((GhostMode::Eaten, self.mode))
    }
}
