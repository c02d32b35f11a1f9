use super::*;

impl<S: SaveStore> GameEngine<S> {
    pub(super) fn update_player(&mut self, dt_sec: f32, now_ms: u64) {
        self.player.advance(&self.maze, dt_sec, &());
        let tile = Tile::from_position(self.player.motion().position);
        self.consume_at(tile, now_ms);
    }

    fn consume_at(&mut self, tile: Tile, now_ms: u64) {
        if self.pellets.remove(&tile) {
            self.stats.record_pellet();
            self.add_score(PELLET_POINTS);
            self.events.push(GameEvent::PelletConsumed {
                tier: PelletTier::Normal,
                x: tile.x,
                y: tile.y,
                points: PELLET_POINTS,
            });
            self.maybe_spawn_fruit(now_ms);
        } else if self.energizers.remove(&tile) {
            self.stats.record_energizer();
            self.add_score(ENERGIZER_POINTS);
            self.events.push(GameEvent::PelletConsumed {
                tier: PelletTier::Energizer,
                x: tile.x,
                y: tile.y,
                points: ENERGIZER_POINTS,
            });
            self.maybe_spawn_fruit(now_ms);
            self.begin_energized_window(now_ms);
        }

        if self.fruit.as_ref().is_some_and(|fruit| fruit.tile == tile) {
            if let Some(fruit) = self.fruit.take() {
                self.add_score(fruit.points);
                self.events.push(GameEvent::PelletConsumed {
                    tier: PelletTier::Fruit,
                    x: tile.x,
                    y: tile.y,
                    points: fruit.points,
                });
                self.push_timeline(format!("fruit eaten for {}", fruit.points));
            }
        }
    }

    pub(super) fn maybe_spawn_fruit(&mut self, now_ms: u64) {
        let Some(&threshold) = FRUIT_PELLET_THRESHOLDS.get(self.fruits_spawned) else {
            return;
        };
        if self.stats.consumed() < threshold {
            return;
        }
        self.fruits_spawned += 1;

        let Some(spot) = self.maze.fruit_spot() else {
            return;
        };
        let config = self.level_config();
        let (kind, points) = (config.bonus_fruit, config.fruit_points);
        if kind == FruitKind::None {
            return;
        }
        let tile = self.maze.tile(spot);
        self.fruit = Some(FruitState {
            kind,
            tile,
            points,
            expires_at_ms: now_ms.saturating_add(FRUIT_LIFETIME_MS),
        });
        self.events.push(GameEvent::FruitSpawned {
            kind,
            x: tile.x,
            y: tile.y,
        });
    }

    pub(super) fn update_fruit(&mut self, now_ms: u64) {
        if !self
            .fruit
            .as_ref()
            .is_some_and(|fruit| now_ms >= fruit.expires_at_ms)
        {
            return;
        }
        if let Some(fruit) = self.fruit.take() {
            self.events
                .push(GameEvent::FruitExpired { kind: fruit.kind });
        }
    }

    /// Opens (or restarts) the energized window for the current level.
    pub(super) fn begin_energized_window(&mut self, now_ms: u64) {
        let config = self.level_config();
        let seconds = get_energizer_seconds(
            config.normal_energizer_time,
            config.hard_energizer_time,
            self.options.difficulty,
        );
        let duration_ms = seconds_to_ms(seconds);
        if duration_ms == 0 {
            return;
        }

        let id = self.next_window_id;
        self.next_window_id += 1;
        self.stats.start_window();
        self.window = Some(EnergizedWindow {
            id,
            ending_at_ms: now_ms
                .saturating_add(duration_ms.saturating_sub(ENERGIZED_ENDING_WARNING_MS)),
            ends_at_ms: now_ms.saturating_add(duration_ms),
        });
        self.events.push(GameEvent::EnergizedStarted { duration_ms });
        self.push_timeline(format!("energized for {duration_ms} ms"));
        if duration_ms <= ENERGIZED_ENDING_WARNING_MS {
            self.stats.frightened_ending = true;
            self.events.push(GameEvent::EnergizedEnding);
        }
        self.sync_frightened_all();
    }

    pub(super) fn update_energized_window(&mut self, now_ms: u64) {
        let Some(window) = self.window else {
            return;
        };
        if !self.stats.frightened_ending && now_ms >= window.ending_at_ms {
            self.stats.frightened_ending = true;
            self.events.push(GameEvent::EnergizedEnding);
        }
        if now_ms >= window.ends_at_ms {
            self.window = None;
            self.stats.end_window();
            self.events.push(GameEvent::EnergizedEnded);
            self.sync_frightened_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::constants::{ENERGIZER_POINTS, TICK_MS};
    use crate::engine::{EngineOptions, GameEngine};
    use crate::layouts::SMALL_MAZE_ROWS;
    use crate::level::LevelTable;
    use crate::maze::MazeGraph;
    use crate::save_store::MemoryStore;
    use crate::types::{Difficulty, Direction, GameEvent, GhostMode, PelletTier, Tile};

    fn make_engine(difficulty: Difficulty) -> GameEngine {
        let maze = MazeGraph::from_rows(SMALL_MAZE_ROWS).expect("small maze should build");
        let mut engine = GameEngine::with_parts(
            maze,
            LevelTable::classic(),
            MemoryStore::new(),
            EngineOptions {
                seed: 2,
                difficulty,
                ready_delay_ms: 0,
                ..EngineOptions::default()
            },
        );
        engine.step(TICK_MS, Direction::None);
        engine
    }

    #[test]
    fn energizer_scores_and_frightens() {
        let mut engine = make_engine(Difficulty::Normal);
        let before = engine.score();
        engine.consume_at(Tile::new(1, 9), engine.elapsed_ms);
        assert_eq!(engine.score() - before, ENERGIZER_POINTS);
        assert!(engine.stats.frightened);
        assert_eq!(engine.stats.energizers_eaten, 1);
        assert!(engine
            .ghosts
            .iter()
            .all(|ghost| ghost.mode() == GhostMode::Frightened));

        let events = engine.build_snapshot(true).events;
        assert!(events.contains(&GameEvent::PelletConsumed {
            tier: PelletTier::Energizer,
            x: 1,
            y: 9,
            points: ENERGIZER_POINTS
        }));
    }

    #[test]
    fn hard_difficulty_uses_the_shorter_window() {
        let mut engine = make_engine(Difficulty::Hard);
        engine.begin_energized_window(engine.elapsed_ms);
        let window = engine.window.expect("window should open");
        assert_eq!(window.ends_at_ms - engine.elapsed_ms, 3_000);
    }

    #[test]
    fn second_energizer_restarts_the_window_and_streak() {
        let mut engine = make_engine(Difficulty::Normal);
        let start = engine.elapsed_ms;
        engine.begin_energized_window(start);
        engine.stats.ghosts_eaten_in_window = 2;
        engine.begin_energized_window(start + 3_000);
        assert_eq!(engine.stats.ghosts_eaten_in_window, 0);

        engine.update_energized_window(start + 6_500);
        assert!(engine.stats.frightened);
        engine.update_energized_window(start + 9_000);
        assert!(!engine.stats.frightened);
    }

    #[test]
    fn consumed_tiles_only_score_once() {
        let mut engine = make_engine(Difficulty::Normal);
        let tile = Tile::new(4, 1);
        engine.consume_at(tile, engine.elapsed_ms);
        engine.consume_at(tile, engine.elapsed_ms);
        assert_eq!(engine.stats.pellets_eaten, 1);
        assert_eq!(engine.score(), 10);
    }

    #[test]
    fn fruit_is_eaten_when_the_player_reaches_it() {
        let mut engine = GameEngine::classic(EngineOptions {
            ready_delay_ms: 0,
            ..EngineOptions::default()
        })
        .expect("classic engine");
        engine.step(TICK_MS, Direction::None);
        engine.stats.pellets_eaten = 70;
        engine.maybe_spawn_fruit(engine.elapsed_ms);
        let before = engine.score();
        engine.consume_at(Tile::new(13, 13), engine.elapsed_ms);
        assert_eq!(engine.score() - before, 100);
        assert!(engine.fruit.is_none());
    }
}
