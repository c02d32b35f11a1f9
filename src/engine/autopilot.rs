use std::collections::{HashSet, VecDeque};

use super::*;
use crate::maze::NodeId;
use crate::types::Vec2;

impl<S: SaveStore> GameEngine<S> {
    /// A simple input source for headless runs: walk the shortest safe path
    /// to the nearest edible tile, or back away from the closest hunter.
    pub fn autopilot_direction(&self) -> Direction {
        let start = self.player.motion().heading_node();
        let hunters = self.hunter_positions();
        let danger = self.danger_nodes();

        if let Some(dir) = self.direction_to_food(start, &danger) {
            return dir;
        }
        self.choose_escape_direction(start, &hunters)
    }

    fn hunter_positions(&self) -> Vec<Vec2> {
        self.ghosts
            .iter()
            .filter(|ghost| {
                !ghost.is_held() && matches!(ghost.mode(), GhostMode::Scatter | GhostMode::Chase)
            })
            .map(|ghost| ghost.motion().position)
            .collect()
    }

    /// Nodes a hunting ghost occupies or heads to, plus one step beyond.
    fn danger_nodes(&self) -> HashSet<NodeId> {
        let mut out = HashSet::new();
        for ghost in &self.ghosts {
            if ghost.is_held() || !matches!(ghost.mode(), GhostMode::Scatter | GhostMode::Chase) {
                continue;
            }
            let motion = ghost.motion();
            let rounded = self.maze.node_at(Tile::from_position(motion.position));
            for node in [Some(motion.heading_node()), rounded].into_iter().flatten() {
                out.insert(node);
                out.extend(exits(&self.maze, node).map(|(_, next)| next));
            }
        }
        out
    }

    fn is_food(&self, node: NodeId) -> bool {
        let tile = self.maze.tile(node);
        self.pellets.contains(&tile)
            || self.energizers.contains(&tile)
            || self.fruit.as_ref().is_some_and(|fruit| fruit.tile == tile)
    }

    fn direction_to_food(&self, start: NodeId, danger: &HashSet<NodeId>) -> Option<Direction> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(start);
        for (dir, next) in exits(&self.maze, start) {
            if danger.contains(&next) || !seen.insert(next) {
                continue;
            }
            queue.push_back((next, dir));
        }

        while let Some((node, first)) = queue.pop_front() {
            if self.is_food(node) {
                return Some(first);
            }
            for (_, next) in exits(&self.maze, node) {
                if danger.contains(&next) || !seen.insert(next) {
                    continue;
                }
                queue.push_back((next, first));
            }
        }
        None
    }

    fn choose_escape_direction(&self, start: NodeId, hunters: &[Vec2]) -> Direction {
        if hunters.is_empty() {
            return Direction::None;
        }
        let mut best = Direction::None;
        let mut best_dist = f32::NEG_INFINITY;
        for (dir, next) in exits(&self.maze, start) {
            let position = self.maze.position(next);
            let dist = hunters
                .iter()
                .map(|hunter| hunter.distance(position))
                .fold(f32::INFINITY, f32::min);
            if dist > best_dist {
                best_dist = dist;
                best = dir;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use crate::agent::{MazeAgent, MotionState};
    use crate::constants::TICK_MS;
    use crate::engine::{EngineOptions, GameEngine};
    use crate::layouts::SMALL_MAZE_ROWS;
    use crate::level::LevelTable;
    use crate::maze::MazeGraph;
    use crate::save_store::MemoryStore;
    use crate::types::{Direction, GhostKind, Tile};

    fn playing_engine() -> GameEngine {
        let maze = MazeGraph::from_rows(SMALL_MAZE_ROWS).expect("small maze should build");
        let mut engine = GameEngine::with_parts(
            maze,
            LevelTable::classic(),
            MemoryStore::new(),
            EngineOptions {
                seed: 1,
                ready_delay_ms: 0,
                ..EngineOptions::default()
            },
        );
        engine.step(TICK_MS, Direction::None);
        engine
    }

    #[test]
    fn cornered_player_backs_away_from_the_hunter() {
        let mut engine = playing_engine();
        engine.pellets.clear();
        engine.energizers.clear();
        let node = engine.maze.node_at(Tile::new(2, 1)).expect("node");
        let ghost = &mut engine.ghosts[GhostKind::Inky.index()];
        ghost.tick_release(60_000);
        ghost.motion_mut().position = engine.maze.position(node);
        ghost.motion_mut().state = MotionState::AtNode { node };

        assert_eq!(engine.autopilot_direction(), Direction::Right);
    }

    #[test]
    fn nothing_to_eat_and_no_hunters_means_no_input() {
        let mut engine = playing_engine();
        engine.pellets.clear();
        engine.energizers.clear();
        for ghost in &mut engine.ghosts {
            ghost.reset(&engine.maze);
        }
        assert_eq!(engine.autopilot_direction(), Direction::None);
    }
}
