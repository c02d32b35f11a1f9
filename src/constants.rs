use crate::types::{Difficulty, GhostKind, GhostMode};

pub const TICK_RATE: u32 = 60;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const GHOST_MODE_TIMER_COUNT: usize = 7;
pub const MODE_SCHEDULE_STEPS: usize = 4;

/// Tiles per second.
pub const PLAYER_SPEED: f32 = 7.5;
pub const GHOST_SPEED: f32 = 7.0;
pub const GHOST_FRIGHTENED_SPEED: f32 = 4.0;
pub const GHOST_EATEN_SPEED: f32 = 14.0;

pub const COLLISION_RADIUS: f32 = 0.5;

pub const PELLET_POINTS: u32 = 10;
pub const ENERGIZER_POINTS: u32 = 50;
pub const GHOST_EAT_POINTS: [u32; 4] = [200, 400, 800, 1600];

pub const STARTING_LIVES: u32 = 3;

pub const READY_DELAY_MS: u64 = 2_000;
pub const DEATH_SEQUENCE_MS: u64 = 3_000;
pub const LEVEL_CLEAR_SEQUENCE_MS: u64 = 2_000;
pub const ENERGIZED_ENDING_WARNING_MS: u64 = 2_000;

/// Longest energizer time a level table may ask for, in seconds.
pub const MAX_ENERGIZER_SECONDS: f32 = 600.0;

pub const FRUIT_PELLET_THRESHOLDS: [u32; 2] = [70, 170];
pub const FRUIT_LIFETIME_MS: u64 = 9_500;

pub const PINKY_LOOKAHEAD_TILES: f32 = 4.0;
pub const INKY_LOOKAHEAD_TILES: f32 = 2.0;
pub const CLYDE_SHY_DISTANCE: f32 = 8.0;

pub const TIMELINE_SNAPSHOT_LIMIT: usize = 24;

pub fn get_release_delay_ms(kind: GhostKind) -> u64 {
    match kind {
        GhostKind::Blinky => 0,
        GhostKind::Pinky => 1_000,
        GhostKind::Inky => 4_000,
        GhostKind::Clyde => 8_000,
    }
}

pub fn get_ghost_speed(mode: GhostMode) -> f32 {
    match mode {
        GhostMode::Scatter | GhostMode::Chase => GHOST_SPEED,
        GhostMode::Frightened => GHOST_FRIGHTENED_SPEED,
        GhostMode::Eaten => GHOST_EATEN_SPEED,
    }
}

pub fn get_energizer_seconds(normal: f32, hard: f32, difficulty: Difficulty) -> f32 {
    match difficulty {
        Difficulty::Normal => normal,
        Difficulty::Hard => hard,
    }
}
