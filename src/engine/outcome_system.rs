use super::*;

impl<S: SaveStore> GameEngine<S> {
    /// Player/ghost contact. A hunting ghost ends the life; a frightened one is eaten.
    pub(super) fn resolve_collisions(&mut self, now_ms: u64) {
        if self.phase != Phase::Playing {
            return;
        }
        let player_position = self.player.motion().position;

        for idx in 0..self.ghosts.len() {
            let ghost = &self.ghosts[idx];
            if ghost.is_held() || ghost.distance_to(player_position) > COLLISION_RADIUS {
                continue;
            }
            match ghost.mode() {
                GhostMode::Frightened => self.eat_ghost(idx),
                GhostMode::Eaten => {}
                GhostMode::Scatter | GhostMode::Chase => {
                    self.trigger_defeat(now_ms);
                    return;
                }
            }
        }
    }

    fn eat_ghost(&mut self, idx: usize) {
        let ghost = &mut self.ghosts[idx];
        let kind = ghost.kind();
        let change = ghost.modes_mut().mark_eaten();
        ghost.refresh_speed();
        if let Some((from, to)) = change {
            self.events.push(GameEvent::ModeChanged {
                ghost: kind,
                from,
                to,
            });
        }

        let points = self.stats.record_ghost_eaten();
        let streak = self.stats.ghosts_eaten_in_window;
        self.ghosts_eaten += 1;
        self.add_score(points);
        self.events.push(GameEvent::GhostEaten {
            ghost: kind,
            points,
            streak,
        });
        self.push_timeline(format!("{} eaten for {points}", ghost_name(kind)));
    }

    fn trigger_defeat(&mut self, now_ms: u64) {
        if !self.stats.try_latch_defeat() {
            return;
        }
        self.defeats += 1;
        let lives_left = self.stats.lives;
        self.events.push(GameEvent::PlayerDefeated { lives_left });
        self.push_timeline(format!("player defeated, {lives_left} left"));

        self.store.set(SaveKey::Lives, lives_left);
        self.store.set(SaveKey::CurrentScore, self.score);
        self.store.flush();
        self.phase = Phase::Dying {
            until_ms: now_ms.saturating_add(DEATH_SEQUENCE_MS),
        };
    }

    pub(super) fn finish_defeat_sequence(&mut self) {
        if self.stats.lives == 0 {
            self.finish_game();
            return;
        }
        self.stats.restart_life();
        self.reset_agents();
        self.push_timeline("respawn".to_string());
    }

    fn finish_game(&mut self) {
        let stored = self.store.get(SaveKey::HighScore).unwrap_or(0);
        self.high_score = self.high_score.max(stored);
        self.store.set(SaveKey::HighScore, self.high_score);
        self.store.set(SaveKey::Lives, 0);
        self.store.flush();

        self.window = None;
        self.phase = Phase::GameOver;
        self.events.push(GameEvent::GameOver {
            score: self.score,
            high_score: self.high_score,
        });
        self.push_timeline(format!("game over at {}", self.score));
    }

    pub(super) fn check_level_cleared(&mut self, now_ms: u64) {
        if self.phase != Phase::Playing || !self.stats.try_latch_win() {
            return;
        }
        self.levels_cleared += 1;
        self.window = None;
        self.stats.end_window();
        self.sync_frightened_all();
        self.fruit = None;
        self.events.push(GameEvent::LevelWon { level: self.level });
        self.push_timeline(format!("level {} cleared", self.level));
        self.phase = Phase::LevelComplete {
            until_ms: now_ms.saturating_add(LEVEL_CLEAR_SEQUENCE_MS),
        };
    }

    pub(super) fn advance_level(&mut self) {
        self.level = self.level.saturating_add(1);
        self.store.set(SaveKey::CurrentLevel, self.level);
        self.store.set(SaveKey::CurrentScore, self.score);
        self.store.set(SaveKey::Lives, self.stats.lives);
        self.store.flush();
        self.start_level();
    }
}

#[cfg(test)]
mod tests {
    use crate::agent::MazeAgent;
    use crate::constants::TICK_MS;
    use crate::engine::{EngineOptions, GameEngine, Phase};
    use crate::layouts::SMALL_MAZE_ROWS;
    use crate::level::LevelTable;
    use crate::maze::MazeGraph;
    use crate::save_store::{MemoryStore, SaveKey, SaveStore};
    use crate::types::{Direction, GameEvent, GhostKind, GhostMode};

    fn playing_engine() -> GameEngine {
        let maze = MazeGraph::from_rows(SMALL_MAZE_ROWS).expect("small maze should build");
        let mut engine = GameEngine::with_parts(
            maze,
            LevelTable::classic(),
            MemoryStore::new(),
            EngineOptions {
                seed: 9,
                ready_delay_ms: 0,
                ..EngineOptions::default()
            },
        );
        engine.step(TICK_MS, Direction::None);
        engine
    }

    fn release_onto_player(engine: &mut GameEngine, kind: GhostKind) {
        let position = engine.player.motion().position;
        let ghost = &mut engine.ghosts[kind.index()];
        ghost.tick_release(60_000);
        ghost.motion_mut().position = position;
    }

    #[test]
    fn held_ghost_cannot_touch_the_player() {
        let mut engine = playing_engine();
        let position = engine.player.motion().position;
        engine.ghosts[GhostKind::Clyde.index()]
            .motion_mut()
            .position = position;
        engine.resolve_collisions(engine.elapsed_ms);
        assert_eq!(engine.phase(), Phase::Playing);
        assert_eq!(engine.lives(), 3);
    }

    #[test]
    fn eating_a_ghost_reports_its_streak() {
        let mut engine = playing_engine();
        engine.begin_energized_window(engine.elapsed_ms);
        release_onto_player(&mut engine, GhostKind::Pinky);
        engine.resolve_collisions(engine.elapsed_ms);

        let pinky = &engine.ghosts[GhostKind::Pinky.index()];
        assert_eq!(pinky.mode(), GhostMode::Eaten);
        assert_eq!(engine.ghosts_eaten, 1);
        let events = engine.build_snapshot(true).events;
        assert!(events.contains(&GameEvent::GhostEaten {
            ghost: GhostKind::Pinky,
            points: 200,
            streak: 1
        }));
        assert!(events.contains(&GameEvent::ModeChanged {
            ghost: GhostKind::Pinky,
            from: GhostMode::Frightened,
            to: GhostMode::Eaten
        }));
    }

    #[test]
    fn win_and_defeat_latches_exclude_each_other() {
        let mut engine = playing_engine();
        engine.stats.pellets_eaten = engine.maze.total_pellets();
        engine.stats.energizers_eaten = engine.maze.total_energizers();
        engine.check_level_cleared(engine.elapsed_ms);
        assert!(matches!(engine.phase(), Phase::LevelComplete { .. }));

        // Contact during the clear sequence is ignored.
        release_onto_player(&mut engine, GhostKind::Blinky);
        engine.resolve_collisions(engine.elapsed_ms);
        assert_eq!(engine.lives(), 3);
        assert_eq!(engine.defeats, 0);
    }

    #[test]
    fn advancing_persists_progress() {
        let mut engine = playing_engine();
        engine.add_score(730);
        engine.advance_level();
        assert_eq!(engine.level(), 2);
        assert_eq!(engine.store().get(SaveKey::CurrentLevel), Some(2));
        assert_eq!(engine.store().get(SaveKey::CurrentScore), Some(730));
        assert_eq!(engine.store().get(SaveKey::Lives), Some(3));
        assert_eq!(engine.phase().kind(), crate::types::PhaseKind::Ready);
    }
}
