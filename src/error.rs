use thiserror::Error;

/// Corrupt or incomplete maze data. Always fatal at load.
#[derive(Debug, Error, PartialEq)]
pub enum MazeError {
    #[error("maze has no rows")]
    Empty,
    #[error("maze row {row} is {width} tiles wide, expected {expected}")]
    RaggedRow {
        row: usize,
        width: usize,
        expected: usize,
    },
    #[error("unknown tile tag {tag:?} at ({x}, {y})")]
    UnknownTile { tag: char, x: i32, y: i32 },
    #[error("tile ({x}, {y}) is declared more than once")]
    DuplicateTile { x: i32, y: i32 },
    #[error("maze has no {0}")]
    MissingMarker(&'static str),
    #[error("maze declares more than one {0}")]
    DuplicateMarker(&'static str),
    #[error("portal at ({x}, {y}) has no partner on the opposite edge")]
    UnpairedPortal { x: i32, y: i32 },
}

/// Malformed level table. Always fatal at load.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("level table is empty")]
    EmptyTable,
    #[error("level {level} has {len} ghost mode timers, expected {expected}")]
    WrongTimerCount {
        level: u32,
        len: usize,
        expected: usize,
    },
    #[error("level {level} ghost mode timer {index} is invalid ({value})")]
    InvalidTimer { level: u32, index: usize, value: f32 },
    #[error("level {level} energizer time is invalid ({value})")]
    InvalidEnergizerTime { level: u32, value: f32 },
    #[error("level numbers start at 1, found level 0")]
    ZeroLevel,
    #[error("level table is missing level {0}")]
    MissingLevel(u32),
    #[error("level {0} is defined more than once")]
    DuplicateLevel(u32),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid maze: {0}")]
    Maze(#[from] MazeError),
    #[error("invalid level configuration: {0}")]
    Config(#[from] ConfigError),
}
