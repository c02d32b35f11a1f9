use serde::Deserialize;

use crate::constants::{GHOST_MODE_TIMER_COUNT, MAX_ENERGIZER_SECONDS};
use crate::error::ConfigError;
use crate::types::FruitKind;

/// Unvalidated level record as supplied by the configuration side.
#[derive(Clone, Debug, Deserialize)]
pub struct LevelRecord {
    #[serde(rename = "levelNumber", alias = "level_number")]
    pub level_number: u32,
    #[serde(rename = "ghostTimers", alias = "ghost_timers")]
    pub ghost_timers: Vec<f32>,
    #[serde(rename = "normalEnergizerTime", alias = "normal_energizer_time")]
    pub normal_energizer_time: f32,
    #[serde(rename = "hardEnergizerTime", alias = "hard_energizer_time")]
    pub hard_energizer_time: f32,
    #[serde(rename = "bonusFruit", alias = "bonus_fruit")]
    pub bonus_fruit: FruitKind,
    #[serde(rename = "fruitPoints", alias = "fruit_points")]
    pub fruit_points: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LevelConfig {
    pub level_number: u32,
    /// Scatter/chase thresholds in seconds; the last entry is a final
    /// scatter after which chase never ends.
    pub ghost_timers: [f32; GHOST_MODE_TIMER_COUNT],
    pub normal_energizer_time: f32,
    pub hard_energizer_time: f32,
    pub bonus_fruit: FruitKind,
    pub fruit_points: u32,
}

impl TryFrom<LevelRecord> for LevelConfig {
    type Error = ConfigError;

    fn try_from(record: LevelRecord) -> Result<Self, Self::Error> {
        let level = record.level_number;
        let ghost_timers: [f32; GHOST_MODE_TIMER_COUNT] = record
            .ghost_timers
            .as_slice()
            .try_into()
            .map_err(|_| ConfigError::WrongTimerCount {
                level,
                len: record.ghost_timers.len(),
                expected: GHOST_MODE_TIMER_COUNT,
            })?;
        for (index, value) in ghost_timers.iter().copied().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTimer {
                    level,
                    index,
                    value,
                });
            }
        }
        for value in [record.normal_energizer_time, record.hard_energizer_time] {
            if !value.is_finite() || !(0.0..=MAX_ENERGIZER_SECONDS).contains(&value) {
                return Err(ConfigError::InvalidEnergizerTime { level, value });
            }
        }

        Ok(Self {
            level_number: level,
            ghost_timers,
            normal_energizer_time: record.normal_energizer_time,
            hard_energizer_time: record.hard_energizer_time,
            bonus_fruit: record.bonus_fruit,
            fruit_points: record.fruit_points,
        })
    }
}

/// Validated table covering levels `1..=len` in order.
#[derive(Clone, Debug)]
pub struct LevelTable {
    levels: Vec<LevelConfig>,
}

impl LevelTable {
    pub fn new(records: Vec<LevelRecord>) -> Result<Self, ConfigError> {
        if records.is_empty() {
            return Err(ConfigError::EmptyTable);
        }
        let mut levels = records
            .into_iter()
            .map(LevelConfig::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        levels.sort_by_key(|level| level.level_number);
        if levels[0].level_number == 0 {
            return Err(ConfigError::ZeroLevel);
        }

        for (idx, level) in levels.iter().enumerate() {
            let expected = idx as u32 + 1;
            if level.level_number < expected {
                return Err(ConfigError::DuplicateLevel(level.level_number));
            }
            if level.level_number > expected {
                return Err(ConfigError::MissingLevel(expected));
            }
        }

        Ok(Self { levels })
    }

    /// Arcade tuning for levels 1 through 21.
    pub fn classic() -> Self {
        let levels = (1..=21u32).map(classic_level).collect();
        Self { levels }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Levels past the end of the table reuse the last entry.
    pub fn get(&self, level_number: u32) -> &LevelConfig {
        let idx = (level_number.max(1) as usize - 1).min(self.levels.len() - 1);
        &self.levels[idx]
    }
}

fn classic_level(level_number: u32) -> LevelConfig {
    const FRAME: f32 = 1.0 / 60.0;
    let ghost_timers = match level_number {
        1 => [7.0, 20.0, 7.0, 20.0, 5.0, 20.0, 5.0],
        2..=4 => [7.0, 20.0, 7.0, 20.0, 5.0, 1033.0, FRAME],
        _ => [5.0, 20.0, 5.0, 20.0, 5.0, 1037.0, FRAME],
    };
    let normal_energizer_time = match level_number {
        1 => 6.0,
        2 | 6 | 10 => 5.0,
        3 => 4.0,
        4 | 14 => 3.0,
        5 | 7 | 8 | 11 => 2.0,
        9 | 12 | 13 | 15 | 16 | 18 => 1.0,
        _ => 0.0,
    };
    let (bonus_fruit, fruit_points) = match level_number {
        1 => (FruitKind::Cherry, 100),
        2 => (FruitKind::Strawberry, 300),
        3 | 4 => (FruitKind::Orange, 500),
        5 | 6 => (FruitKind::Apple, 700),
        7 | 8 => (FruitKind::Melon, 1000),
        9 | 10 => (FruitKind::Ship, 2000),
        11 | 12 => (FruitKind::Bell, 3000),
        _ => (FruitKind::Key, 5000),
    };
    LevelConfig {
        level_number,
        ghost_timers,
        normal_energizer_time,
        hard_energizer_time: (normal_energizer_time * 0.5_f32).floor(),
        bonus_fruit,
        fruit_points,
    }
}
