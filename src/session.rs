use crate::constants::GHOST_EAT_POINTS;

/// Points for the `streak`-th ghost eaten inside one energized window.
pub fn ghost_score(streak: u32) -> u32 {
    let idx = (streak.max(1) - 1) as usize;
    GHOST_EAT_POINTS[idx.min(GHOST_EAT_POINTS.len() - 1)]
}

/// Per-session counters and the win/defeat latches.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionStats {
    pub pellets_eaten: u32,
    pub energizers_eaten: u32,
    pub ghosts_eaten_in_window: u32,
    pub lives: u32,
    pub frightened: bool,
    pub frightened_ending: bool,
    total_pellets: u32,
    total_energizers: u32,
    win_latched: bool,
    defeat_latched: bool,
}

impl SessionStats {
    pub fn new(total_pellets: u32, total_energizers: u32, lives: u32) -> Self {
        Self {
            pellets_eaten: 0,
            energizers_eaten: 0,
            ghosts_eaten_in_window: 0,
            lives,
            frightened: false,
            frightened_ending: false,
            total_pellets,
            total_energizers,
            win_latched: false,
            defeat_latched: false,
        }
    }

    /// Pellets and energizers together; drives the fruit thresholds.
    pub fn consumed(&self) -> u32 {
        self.pellets_eaten + self.energizers_eaten
    }

    pub fn remaining(&self) -> u32 {
        (self.total_pellets + self.total_energizers).saturating_sub(self.consumed())
    }

    pub fn is_cleared(&self) -> bool {
        self.pellets_eaten >= self.total_pellets && self.energizers_eaten >= self.total_energizers
    }

    pub fn record_pellet(&mut self) {
        self.pellets_eaten += 1;
    }

    pub fn record_energizer(&mut self) {
        self.energizers_eaten += 1;
    }

    pub fn start_window(&mut self) {
        self.frightened = true;
        self.frightened_ending = false;
        self.ghosts_eaten_in_window = 0;
    }

    pub fn end_window(&mut self) {
        self.frightened = false;
        self.frightened_ending = false;
        self.ghosts_eaten_in_window = 0;
    }

    /// Bumps the streak and returns the points it is worth.
    pub fn record_ghost_eaten(&mut self) -> u32 {
        self.ghosts_eaten_in_window += 1;
        ghost_score(self.ghosts_eaten_in_window)
    }

    /// True only the first time the level is found cleared.
    pub fn try_latch_win(&mut self) -> bool {
        if self.win_latched || self.defeat_latched || !self.is_cleared() {
            return false;
        }
        self.win_latched = true;
        true
    }

    /// True only once per life; takes the life away.
    pub fn try_latch_defeat(&mut self) -> bool {
        if self.defeat_latched || self.win_latched {
            return false;
        }
        self.defeat_latched = true;
        self.lives = self.lives.saturating_sub(1);
        true
    }

    pub fn is_latched(&self) -> bool {
        self.win_latched || self.defeat_latched
    }

    /// Same layout again after a lost life: pellets stay eaten.
    pub fn restart_life(&mut self) {
        self.end_window();
        self.defeat_latched = false;
    }

    pub fn start_level(&mut self, total_pellets: u32, total_energizers: u32) {
        let lives = self.lives;
        *self = Self::new(total_pellets, total_energizers, lives);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streak_scores_double_per_ghost() {
        let mut stats = SessionStats::new(240, 4, 3);
        stats.start_window();
        let awarded: Vec<u32> = (0..4).map(|_| stats.record_ghost_eaten()).collect();
        assert_eq!(awarded, vec![200, 400, 800, 1600]);

        stats.end_window();
        stats.start_window();
        assert_eq!(stats.record_ghost_eaten(), 200);
    }

    #[test]
    fn win_fires_once_past_the_threshold() {
        let mut stats = SessionStats::new(2, 1, 3);
        stats.record_pellet();
        stats.record_energizer();
        assert!(!stats.try_latch_win());
        stats.record_pellet();
        let fired = (0..10).filter(|_| stats.try_latch_win()).count();
        assert_eq!(fired, 1);
        assert_eq!(stats.remaining(), 0);
    }

    #[test]
    fn win_needs_the_energizers_too() {
        let mut stats = SessionStats::new(1, 1, 3);
        stats.record_pellet();
        assert!(!stats.is_cleared());
        stats.record_energizer();
        assert!(stats.is_cleared());
    }

    #[test]
    fn defeat_takes_one_life_per_latch() {
        let mut stats = SessionStats::new(240, 4, 3);
        assert!(stats.try_latch_defeat());
        assert!(!stats.try_latch_defeat());
        assert_eq!(stats.lives, 2);

        stats.restart_life();
        assert!(stats.try_latch_defeat());
        assert_eq!(stats.lives, 1);
    }

    #[test]
    fn new_level_keeps_lives_and_clears_counts() {
        let mut stats = SessionStats::new(2, 0, 2);
        stats.record_pellet();
        stats.record_pellet();
        assert!(stats.try_latch_win());
        stats.start_level(3, 1);
        assert_eq!(stats.lives, 2);
        assert_eq!(stats.consumed(), 0);
        assert!(!stats.is_latched());
    }
}
