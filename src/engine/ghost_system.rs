use super::*;
use crate::mode::ModeChange;

impl<S: SaveStore> GameEngine<S> {
    /// Scatter/chase timers for released ghosts, then the frightened flag.
    pub(super) fn update_ghost_modes(&mut self, dt_sec: f32) {
        let timers = self.level_config().ghost_timers;
        let mut changes = Vec::new();
        for ghost in &mut self.ghosts {
            if ghost.is_held() {
                continue;
            }
            if let Some(change) = ghost.modes_mut().tick_schedule(dt_sec, &timers) {
                changes.push((ghost.kind(), change));
            }
        }
        self.record_mode_changes(changes);
        self.sync_frightened_all();
    }

    pub(super) fn sync_frightened_all(&mut self) {
        let window = self.window.map(|window| window.id);
        let mut changes = Vec::new();
        for ghost in &mut self.ghosts {
            if let Some(change) = ghost.modes_mut().sync_frightened(window) {
                changes.push((ghost.kind(), change));
            }
            ghost.refresh_speed();
        }
        self.record_mode_changes(changes);
    }

    pub(super) fn update_releases(&mut self, dt_ms: u64) {
        for idx in 0..self.ghosts.len() {
            if !self.ghosts[idx].tick_release(dt_ms) {
                continue;
            }
            let ghost = self.ghosts[idx].kind();
            self.events.push(GameEvent::GhostReleased { ghost });
            self.push_timeline(format!("{} released", ghost_name(ghost)));
        }
    }

    pub(super) fn update_ghosts(&mut self, dt_sec: f32) {
        let inputs = self.ghost_inputs();
        let mut changes = Vec::new();
        for ghost in &mut self.ghosts {
            if ghost.is_held() {
                continue;
            }
            ghost.advance(&self.maze, dt_sec, &inputs);
            if let Some(change) = ghost.take_mode_change() {
                changes.push((ghost.kind(), change));
            }
        }
        self.record_mode_changes(changes);
    }

    fn record_mode_changes(&mut self, changes: Vec<(GhostKind, ModeChange)>) {
        for (ghost, (from, to)) in changes {
            self.events.push(GameEvent::ModeChanged { ghost, from, to });
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::constants::TICK_MS;
    use crate::engine::{EngineOptions, GameEngine};
    use crate::types::{Direction, GameEvent, GhostKind, GhostMode};

    fn make_engine() -> GameEngine {
        GameEngine::classic(EngineOptions {
            seed: 17,
            ready_delay_ms: 0,
            ..EngineOptions::default()
        })
        .expect("classic engine")
    }

    #[test]
    fn ghosts_leave_the_pen_in_release_order() {
        let mut engine = make_engine();
        let mut released = Vec::new();
        for _ in 0..(1_200 / TICK_MS) {
            engine.step(TICK_MS, Direction::None);
            for event in engine.build_snapshot(true).events {
                if let GameEvent::GhostReleased { ghost } = event {
                    released.push((ghost, engine.elapsed_ms()));
                }
            }
        }
        let order: Vec<GhostKind> = released.iter().map(|(ghost, _)| *ghost).collect();
        assert_eq!(order, vec![GhostKind::Blinky, GhostKind::Pinky]);
        assert_eq!(released[0].1, TICK_MS);
        assert!(released[1].1 > 1_000);
    }

    #[test]
    fn held_ghosts_do_not_advance_their_schedule() {
        let mut engine = make_engine();
        for _ in 0..30 {
            engine.update_ghost_modes(1.0 / 60.0);
        }
        let clyde = &engine.ghosts[GhostKind::Clyde.index()];
        assert!(clyde.is_held());
        assert_eq!(clyde.modes().schedule().elapsed(), 0.0);
        assert_eq!(clyde.mode(), GhostMode::Scatter);
    }

    #[test]
    fn first_chase_starts_after_seven_seconds() {
        let mut engine = make_engine();
        engine.update_releases(60_000);
        for _ in 0..7 {
            engine.update_ghost_modes(1.0);
        }
        assert!(engine
            .ghosts
            .iter()
            .all(|ghost| ghost.mode() == GhostMode::Scatter));
        engine.update_ghost_modes(1.0);
        assert!(engine
            .ghosts
            .iter()
            .all(|ghost| ghost.mode() == GhostMode::Chase));
        let switches = engine
            .build_snapshot(true)
            .events
            .into_iter()
            .filter(|event| {
                matches!(
                    event,
                    GameEvent::ModeChanged {
                        to: GhostMode::Chase,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(switches, 4);
    }
}
