use std::collections::BTreeSet;

use crate::agent::{Ghost, MazeAgent, Player};
use crate::constants::{
    get_energizer_seconds, COLLISION_RADIUS, DEATH_SEQUENCE_MS, ENERGIZED_ENDING_WARNING_MS,
    ENERGIZER_POINTS, FRUIT_LIFETIME_MS, FRUIT_PELLET_THRESHOLDS, LEVEL_CLEAR_SEQUENCE_MS,
    PELLET_POINTS, READY_DELAY_MS, STARTING_LIVES, TIMELINE_SNAPSHOT_LIMIT,
};
use crate::error::EngineError;
use crate::layouts::classic_maze;
use crate::level::{LevelConfig, LevelRecord, LevelTable};
use crate::maze::{MazeGraph, MazeLayout};
use crate::save_store::{MemoryStore, SaveKey, SaveStore};
use crate::session::SessionStats;
use crate::targeting::TargetInputs;
use crate::types::{
    Difficulty, Direction, FruitKind, FruitView, GameEvent, GameOutcome, GameSummary, GhostKind,
    GhostMode, GhostView, PelletTier, PhaseKind, PlayerView, Snapshot, Tile, TickOrder,
    TimelineEvent,
};

mod autopilot;
mod ghost_system;
mod outcome_system;
mod player_system;
mod utils;

use self::utils::{exits, ghost_name, recent, seconds_to_ms};

#[derive(Clone, Debug)]
pub struct EngineOptions {
    /// Seeds the frightened ghosts' random targets.
    pub seed: u64,
    pub difficulty: Difficulty,
    pub tick_order: TickOrder,
    pub ready_delay_ms: u64,
    pub starting_lives: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            difficulty: Difficulty::Normal,
            tick_order: TickOrder::PlayerFirst,
            ready_delay_ms: READY_DELAY_MS,
            starting_lives: STARTING_LIVES,
        }
    }
}

/// Session phase. Timed phases carry the elapsed time at which they end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Ready { until_ms: u64 },
    Playing,
    Dying { until_ms: u64 },
    LevelComplete { until_ms: u64 },
    GameOver,
}

impl Phase {
    pub fn kind(self) -> PhaseKind {
        match self {
            Self::Ready { .. } => PhaseKind::Ready,
            Self::Playing => PhaseKind::Playing,
            Self::Dying { .. } => PhaseKind::Dying,
            Self::LevelComplete { .. } => PhaseKind::LevelComplete,
            Self::GameOver => PhaseKind::GameOver,
        }
    }
}

#[derive(Clone, Debug)]
struct FruitState {
    kind: FruitKind,
    tile: Tile,
    points: u32,
    expires_at_ms: u64,
}

#[derive(Clone, Copy, Debug)]
struct EnergizedWindow {
    id: u32,
    ending_at_ms: u64,
    ends_at_ms: u64,
}

pub struct GameEngine<S: SaveStore = MemoryStore> {
    maze: MazeGraph,
    levels: LevelTable,
    store: S,
    options: EngineOptions,

    player: Player,
    /// Indexed by [`GhostKind::index`].
    ghosts: Vec<Ghost>,
    stats: SessionStats,
    pellets: BTreeSet<Tile>,
    energizers: BTreeSet<Tile>,
    fruit: Option<FruitState>,
    fruits_spawned: usize,
    window: Option<EnergizedWindow>,
    next_window_id: u32,

    phase: Phase,
    level: u32,
    score: u32,
    high_score: u32,
    levels_cleared: u32,
    ghosts_eaten: u32,
    defeats: u32,

    events: Vec<GameEvent>,
    timeline: Vec<TimelineEvent>,
    elapsed_ms: u64,
    tick_counter: u64,
}

impl GameEngine<MemoryStore> {
    /// The arcade maze and level table with an in-memory store.
    pub fn classic(options: EngineOptions) -> Result<Self, EngineError> {
        Ok(Self::with_parts(
            classic_maze()?,
            LevelTable::classic(),
            MemoryStore::new(),
            options,
        ))
    }
}

impl<S: SaveStore> GameEngine<S> {
    /// Validates the raw maze and level data, then starts a session.
    pub fn new(
        layout: &MazeLayout,
        levels: Vec<LevelRecord>,
        store: S,
        options: EngineOptions,
    ) -> Result<Self, EngineError> {
        let maze = MazeGraph::build(layout)?;
        let levels = LevelTable::new(levels)?;
        Ok(Self::with_parts(maze, levels, store, options))
    }

    pub fn with_parts(
        maze: MazeGraph,
        levels: LevelTable,
        store: S,
        options: EngineOptions,
    ) -> Self {
        let high_score = store.get(SaveKey::HighScore).unwrap_or(0);
        let (lives, level, score) = match store.get(SaveKey::Lives) {
            Some(lives) if lives > 0 => (
                lives,
                store.get(SaveKey::CurrentLevel).unwrap_or(1).max(1),
                store.get(SaveKey::CurrentScore).unwrap_or(0),
            ),
            _ => (options.starting_lives, 1, 0),
        };

        let player = Player::new(&maze, maze.player_spawn());
        let ghosts = GhostKind::ALL
            .iter()
            .map(|kind| Ghost::new(&maze, *kind, options.seed))
            .collect();
        let stats = SessionStats::new(maze.total_pellets(), maze.total_energizers(), lives);

        let mut engine = Self {
            pellets: maze.pellet_tiles().clone(),
            energizers: maze.energizer_tiles().clone(),
            maze,
            levels,
            store,
            options,
            player,
            ghosts,
            stats,
            fruit: None,
            fruits_spawned: 0,
            window: None,
            next_window_id: 1,
            phase: Phase::GameOver,
            level,
            score,
            high_score: high_score.max(score),
            levels_cleared: 0,
            ghosts_eaten: 0,
            defeats: 0,
            events: Vec::new(),
            timeline: vec![TimelineEvent {
                at_ms: 0,
                label: "session start".to_string(),
            }],
            elapsed_ms: 0,
            tick_counter: 0,
        };
        engine.start_level();
        engine
    }

    pub fn is_ended(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn maze(&self) -> &MazeGraph {
        &self.maze
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.stats.lives
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// One simulation tick. `requested` is the polled input for this tick.
    pub fn step(&mut self, dt_ms: u64, requested: Direction) {
        if self.phase == Phase::GameOver {
            return;
        }
        self.tick_counter += 1;
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        let now_ms = self.elapsed_ms;
        self.player.request_direction(requested);

        match self.phase {
            Phase::Ready { until_ms } => {
                if now_ms < until_ms {
                    return;
                }
                self.phase = Phase::Playing;
            }
            Phase::Dying { until_ms } => {
                if now_ms >= until_ms {
                    self.finish_defeat_sequence();
                }
                return;
            }
            Phase::LevelComplete { until_ms } => {
                if now_ms >= until_ms {
                    self.advance_level();
                }
                return;
            }
            Phase::Playing => {}
            Phase::GameOver => return,
        }

        let dt_sec = dt_ms as f32 / 1000.0;
        self.update_energized_window(now_ms);
        self.update_fruit(now_ms);
        self.update_ghost_modes(dt_sec);
        self.update_releases(dt_ms);
        match self.options.tick_order {
            TickOrder::PlayerFirst => {
                self.update_player(dt_sec, now_ms);
                self.update_ghosts(dt_sec);
            }
            TickOrder::GhostsFirst => {
                self.update_ghosts(dt_sec);
                self.update_player(dt_sec, now_ms);
            }
        }
        self.resolve_collisions(now_ms);
        self.check_level_cleared(now_ms);
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let motion = self.player.motion();
        Snapshot {
            tick: self.tick_counter,
            elapsed_ms: self.elapsed_ms,
            phase: self.phase.kind(),
            level: self.level,
            score: self.score,
            high_score: self.high_score,
            lives: self.stats.lives,
            energized: self.stats.frightened,
            energized_ending: self.stats.frightened_ending,
            pellets_remaining: self.pellets.len() + self.energizers.len(),
            player: PlayerView {
                x: motion.position.x,
                y: motion.position.y,
                dir: self.player.facing(),
                stale: motion.is_stale(),
            },
            ghosts: self
                .ghosts
                .iter()
                .map(|ghost| GhostView {
                    kind: ghost.kind(),
                    x: ghost.motion().position.x,
                    y: ghost.motion().position.y,
                    dir: ghost.motion().direction,
                    mode: ghost.mode(),
                    in_pen: ghost.in_pen(&self.maze),
                })
                .collect(),
            fruit: self.fruit.as_ref().map(|fruit| FruitView {
                kind: fruit.kind,
                x: fruit.tile.x,
                y: fruit.tile.y,
                points: fruit.points,
                expires_at_ms: fruit.expires_at_ms,
            }),
            events: if include_events {
                std::mem::take(&mut self.events)
            } else {
                Vec::new()
            },
            timeline: recent(&self.timeline, TIMELINE_SNAPSHOT_LIMIT),
        }
    }

    pub fn build_summary(&self) -> GameSummary {
        GameSummary {
            outcome: if self.is_ended() {
                GameOutcome::GameOver
            } else {
                GameOutcome::InProgress
            },
            duration_ms: self.elapsed_ms,
            level: self.level,
            levels_cleared: self.levels_cleared,
            score: self.score,
            high_score: self.high_score,
            lives: self.stats.lives,
            ghosts_eaten: self.ghosts_eaten,
            defeats: self.defeats,
            timeline: self.timeline.clone(),
        }
    }

    fn level_config(&self) -> &LevelConfig {
        self.levels.get(self.level)
    }

    /// Fresh layout for the current level.
    fn start_level(&mut self) {
        self.pellets = self.maze.pellet_tiles().clone();
        self.energizers = self.maze.energizer_tiles().clone();
        self.stats
            .start_level(self.maze.total_pellets(), self.maze.total_energizers());
        self.fruits_spawned = 0;
        self.reset_agents();
        self.events.push(GameEvent::LevelStarted { level: self.level });
        self.push_timeline(format!("level {} start", self.level));
    }

    /// Agents back on their spawns and the ready countdown armed.
    fn reset_agents(&mut self) {
        self.window = None;
        self.fruit = None;
        self.player = Player::new(&self.maze, self.maze.player_spawn());
        for ghost in &mut self.ghosts {
            ghost.reset(&self.maze);
        }
        self.phase = Phase::Ready {
            until_ms: self.elapsed_ms.saturating_add(self.options.ready_delay_ms),
        };
    }

    fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
        self.high_score = self.high_score.max(self.score);
    }

    fn push_timeline(&mut self, label: String) {
        self.timeline.push(TimelineEvent {
            at_ms: self.elapsed_ms,
            label,
        });
    }

    fn ghost_inputs(&self) -> TargetInputs {
        let mut peers = [self.player.motion().position; 4];
        for ghost in &self.ghosts {
            peers[ghost.kind().index()] = ghost.motion().position;
        }
        TargetInputs {
            player_position: self.player.motion().position,
            player_facing: self.player.facing(),
            peers,
        }
    }
}
