use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
    None,
}

impl Direction {
    /// Decision priority used whenever two exits score the same.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    /// Index into per-direction neighbor arrays.
    pub fn slot(self) -> Option<usize> {
        match self {
            Self::Up => Some(0),
            Self::Left => Some(1),
            Self::Down => Some(2),
            Self::Right => Some(3),
            Self::None => None,
        }
    }

    pub fn unit_vector(self) -> Vec2 {
        match self {
            Self::Up => Vec2::new(0.0, 1.0),
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Down => Vec2::new(0.0, -1.0),
            Self::Right => Vec2::new(1.0, 0.0),
            Self::None => Vec2::ZERO,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Left => Self::Right,
            Self::Down => Self::Up,
            Self::Right => Self::Left,
            Self::None => Self::None,
        }
    }

    /// Inverse of [`Direction::unit_vector`]; anything that is not an exact
    /// axis unit vector maps to `None`.
    pub fn from_vector(vector: Vec2) -> Self {
        Self::ALL
            .into_iter()
            .find(|dir| dir.unit_vector() == vector)
            .unwrap_or(Self::None)
    }

    pub fn tile_offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, 1),
            Self::Left => (-1, 0),
            Self::Down => (0, -1),
            Self::Right => (1, 0),
            Self::None => (0, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len <= f32::EPSILON {
            return Vec2::ZERO;
        }
        Vec2::new(self.x / len, self.y / len)
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Integer grid coordinate. `y` grows upward.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
}

impl Tile {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn position(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    pub fn from_position(position: Vec2) -> Self {
        Self::new(position.x.round() as i32, position.y.round() as i32)
    }

    pub fn offset(self, dir: Direction) -> Self {
        let (dx, dy) = dir.tile_offset();
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostKind {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

impl GhostKind {
    pub const ALL: [GhostKind; 4] = [
        GhostKind::Blinky,
        GhostKind::Pinky,
        GhostKind::Inky,
        GhostKind::Clyde,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Blinky => 0,
            Self::Pinky => 1,
            Self::Inky => 2,
            Self::Clyde => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostMode {
    Scatter,
    Chase,
    Frightened,
    Eaten,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Wall,
    Pellet,
    Energizer,
    OutOfBound,
    Empty,
    GhostHouse,
    GhostHouseDoor,
    Tunnel,
    Fruit,
}

impl TileKind {
    pub fn is_traversable(self) -> bool {
        !matches!(self, Self::Wall | Self::OutOfBound)
    }

    pub fn is_pen(self) -> bool {
        matches!(self, Self::GhostHouse | Self::GhostHouseDoor)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PelletTier {
    Normal,
    Energizer,
    Fruit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FruitKind {
    Cherry,
    Strawberry,
    Orange,
    Apple,
    Melon,
    Ship,
    Bell,
    Key,
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Normal,
    Hard,
}

impl Difficulty {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "normal" => Some(Self::Normal),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

/// Which side moves first inside a tick. Ghost targeting reads the player's
/// position as it stands when the ghosts move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TickOrder {
    PlayerFirst,
    GhostsFirst,
}

impl TickOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "player_first" | "player-first" => Some(Self::PlayerFirst),
            "ghosts_first" | "ghosts-first" => Some(Self::GhostsFirst),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Ready,
    Playing,
    Dying,
    LevelComplete,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    InProgress,
    GameOver,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub stale: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub kind: GhostKind,
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub mode: GhostMode,
    #[serde(rename = "inPen")]
    pub in_pen: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct FruitView {
    pub kind: FruitKind,
    pub x: i32,
    pub y: i32,
    pub points: u32,
    #[serde(rename = "expiresAtMs")]
    pub expires_at_ms: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct TimelineEvent {
    #[serde(rename = "atMs")]
    pub at_ms: u64,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    LevelStarted {
        level: u32,
    },
    PelletConsumed {
        tier: PelletTier,
        x: i32,
        y: i32,
        points: u32,
    },
    EnergizedStarted {
        #[serde(rename = "durationMs")]
        duration_ms: u64,
    },
    EnergizedEnding,
    EnergizedEnded,
    FruitSpawned {
        kind: FruitKind,
        x: i32,
        y: i32,
    },
    FruitExpired {
        kind: FruitKind,
    },
    GhostReleased {
        ghost: GhostKind,
    },
    ModeChanged {
        ghost: GhostKind,
        from: GhostMode,
        to: GhostMode,
    },
    GhostEaten {
        ghost: GhostKind,
        points: u32,
        streak: u32,
    },
    PlayerDefeated {
        #[serde(rename = "livesLeft")]
        lives_left: u32,
    },
    LevelWon {
        level: u32,
    },
    GameOver {
        score: u32,
        #[serde(rename = "highScore")]
        high_score: u32,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    pub phase: PhaseKind,
    pub level: u32,
    pub score: u32,
    #[serde(rename = "highScore")]
    pub high_score: u32,
    pub lives: u32,
    pub energized: bool,
    #[serde(rename = "energizedEnding")]
    pub energized_ending: bool,
    #[serde(rename = "pelletsRemaining")]
    pub pellets_remaining: usize,
    pub player: PlayerView,
    pub ghosts: Vec<GhostView>,
    pub fruit: Option<FruitView>,
    pub events: Vec<GameEvent>,
    pub timeline: Vec<TimelineEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub outcome: GameOutcome,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    pub level: u32,
    #[serde(rename = "levelsCleared")]
    pub levels_cleared: u32,
    pub score: u32,
    #[serde(rename = "highScore")]
    pub high_score: u32,
    pub lives: u32,
    #[serde(rename = "ghostsEaten")]
    pub ghosts_eaten: u32,
    pub defeats: u32,
    pub timeline: Vec<TimelineEvent>,
}
