use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::constants::{get_ghost_speed, get_release_delay_ms, PLAYER_SPEED};
use crate::maze::{MazeGraph, NodeId};
use crate::mode::{GhostModeState, ModeChange};
use crate::targeting::{target_tile, TargetInputs};
use crate::types::{Direction, GhostKind, GhostMode, Tile, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionState {
    /// Resting on a node. Stale when no exit was chosen.
    AtNode { node: NodeId },
    Transiting { previous: NodeId, target: NodeId },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Motion {
    pub position: Vec2,
    pub direction: Direction,
    /// Tiles per second.
    pub speed: f32,
    pub state: MotionState,
}

impl Motion {
    pub fn at_node(maze: &MazeGraph, node: NodeId, speed: f32) -> Self {
        Self {
            position: maze.position(node),
            direction: Direction::None,
            speed,
            state: MotionState::AtNode { node },
        }
    }

    pub fn current_node(&self) -> Option<NodeId> {
        match self.state {
            MotionState::AtNode { node } => Some(node),
            MotionState::Transiting { .. } => None,
        }
    }

    /// The node the agent rests on or is heading to.
    pub fn heading_node(&self) -> NodeId {
        match self.state {
            MotionState::AtNode { node } => node,
            MotionState::Transiting { target, .. } => target,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self.state, MotionState::AtNode { .. })
    }
}

/// Arrival test along a segment: the agent has reached `target` once it is at
/// least as far from `previous` as the target is.
pub fn has_overshot(position: Vec2, previous: Vec2, target: Vec2) -> bool {
    (position - previous).length_squared() >= (target - previous).length_squared()
}

/// Node-to-node movement shared by the player and the ghosts.
pub trait MazeAgent {
    /// Per-tick input the agent consults when choosing an exit.
    type Steering;

    fn motion(&self) -> &Motion;

    fn motion_mut(&mut self) -> &mut Motion;

    /// Picks the exit to take from `node`. `None` leaves the agent stale.
    fn choose_next(
        &mut self,
        maze: &MazeGraph,
        node: NodeId,
        steering: &Self::Steering,
    ) -> Option<Direction>;

    /// Called on every arrival, after portal resolution and before the next
    /// exit is chosen.
    fn arrive(&mut self, _maze: &MazeGraph, _node: NodeId) {}

    fn distance_to(&self, position: Vec2) -> f32 {
        self.motion().position.distance(position)
    }

    /// Moves the agent for one tick. Returns the node it arrived at, if any.
    fn advance(
        &mut self,
        maze: &MazeGraph,
        dt_sec: f32,
        steering: &Self::Steering,
    ) -> Option<NodeId> {
        if let MotionState::AtNode { node } = self.motion().state {
            self.depart(maze, node, steering);
        }
        let MotionState::Transiting { previous, target } = self.motion().state else {
            return None;
        };

        let from = maze.position(previous);
        let to = maze.position(target);
        let motion = self.motion_mut();
        motion.position += (to - from).normalized() * (motion.speed * dt_sec);
        if !has_overshot(motion.position, from, to) {
            return None;
        }

        let node = maze.resolve_portal(target);
        motion.position = maze.position(node);
        motion.state = MotionState::AtNode { node };
        self.arrive(maze, node);
        self.depart(maze, node, steering);
        Some(node)
    }

    fn depart(&mut self, maze: &MazeGraph, node: NodeId, steering: &Self::Steering) {
        let exit = self
            .choose_next(maze, node, steering)
            .and_then(|dir| maze.neighbor(node, dir).map(|next| (dir, next)));
        let motion = self.motion_mut();
        match exit {
            Some((dir, next)) => {
                motion.direction = dir;
                motion.state = MotionState::Transiting {
                    previous: node,
                    target: next,
                };
            }
            None => motion.state = MotionState::AtNode { node },
        }
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    motion: Motion,
    desired: Direction,
}

impl Player {
    pub fn new(maze: &MazeGraph, spawn: NodeId) -> Self {
        Self {
            motion: Motion::at_node(maze, spawn, PLAYER_SPEED),
            desired: Direction::None,
        }
    }

    pub fn desired_direction(&self) -> Direction {
        self.desired
    }

    /// Facing used by the ghosts' look-ahead targeting.
    pub fn facing(&self) -> Direction {
        self.motion.direction
    }

    /// Records the polled input. Asking for the exact reverse of the current
    /// travel turns the agent around on the spot.
    pub fn request_direction(&mut self, dir: Direction) {
        if dir == Direction::None {
            return;
        }
        self.desired = dir;
        let MotionState::Transiting { previous, target } = self.motion.state else {
            return;
        };
        if self.motion.direction != Direction::None && dir == self.motion.direction.opposite() {
            self.motion.direction = dir;
            self.motion.state = MotionState::Transiting {
                previous: target,
                target: previous,
            };
        }
    }
}

impl MazeAgent for Player {
    type Steering = ();

    fn motion(&self) -> &Motion {
        &self.motion
    }

    fn motion_mut(&mut self) -> &mut Motion {
        &mut self.motion
    }

    fn choose_next(&mut self, maze: &MazeGraph, node: NodeId, _steering: &()) -> Option<Direction> {
        [self.desired, self.motion.direction]
            .into_iter()
            .find(|dir| *dir != Direction::None && maze.neighbor(node, *dir).is_some())
    }
}

#[derive(Clone, Debug)]
pub struct Ghost {
    kind: GhostKind,
    spawn: NodeId,
    motion: Motion,
    modes: GhostModeState,
    held: bool,
    release_elapsed_ms: u64,
    pending_change: Option<ModeChange>,
    rng: StdRng,
}

impl Ghost {
    pub fn new(maze: &MazeGraph, kind: GhostKind, seed: u64) -> Self {
        let spawn = maze.ghost_spawn(kind);
        Self {
            kind,
            spawn,
            motion: Motion::at_node(maze, spawn, get_ghost_speed(GhostMode::Scatter)),
            modes: GhostModeState::new(),
            held: true,
            release_elapsed_ms: 0,
            pending_change: None,
            rng: StdRng::seed_from_u64(seed.wrapping_add(kind.index() as u64)),
        }
    }

    pub fn kind(&self) -> GhostKind {
        self.kind
    }

    pub fn mode(&self) -> GhostMode {
        self.modes.mode()
    }

    pub fn modes(&self) -> &GhostModeState {
        &self.modes
    }

    pub fn modes_mut(&mut self) -> &mut GhostModeState {
        &mut self.modes
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Held ghosts, and released ones still inside the pen or on its door.
    pub fn in_pen(&self, maze: &MazeGraph) -> bool {
        self.held
            || maze
                .node_at(Tile::from_position(self.motion.position))
                .is_some_and(|node| maze.is_pen(node))
    }

    /// Puts the ghost back on its spawn node, held, with a fresh schedule.
    pub fn reset(&mut self, maze: &MazeGraph) {
        self.motion = Motion::at_node(maze, self.spawn, get_ghost_speed(GhostMode::Scatter));
        self.modes = GhostModeState::new();
        self.held = true;
        self.release_elapsed_ms = 0;
        self.pending_change = None;
    }

    /// Counts pen time. Returns true on the tick the ghost is let out.
    pub fn tick_release(&mut self, dt_ms: u64) -> bool {
        if !self.held {
            return false;
        }
        self.release_elapsed_ms = self.release_elapsed_ms.saturating_add(dt_ms);
        if self.release_elapsed_ms > get_release_delay_ms(self.kind) {
            self.held = false;
            return true;
        }
        false
    }

    pub fn refresh_speed(&mut self) {
        self.motion.speed = get_ghost_speed(self.modes.mode());
    }

    /// Mode change made during movement (revival at the pen entrance).
    pub fn take_mode_change(&mut self) -> Option<ModeChange> {
        self.pending_change.take()
    }
}

impl MazeAgent for Ghost {
    type Steering = TargetInputs;

    fn motion(&self) -> &Motion {
        &self.motion
    }

    fn motion_mut(&mut self) -> &mut Motion {
        &mut self.motion
    }

    fn arrive(&mut self, maze: &MazeGraph, node: NodeId) {
        if node == maze.pen_entrance() {
            if let Some(change) = self.modes.revive() {
                self.pending_change = Some(change);
                self.refresh_speed();
            }
        }
    }

    fn choose_next(
        &mut self,
        maze: &MazeGraph,
        node: NodeId,
        inputs: &TargetInputs,
    ) -> Option<Direction> {
        let entrance = maze.position(maze.pen_entrance());
        let target = if maze.is_pen(node) {
            entrance
        } else {
            target_tile(
                self.kind,
                self.modes.mode(),
                maze.position(node),
                inputs,
                maze.bounds(),
                entrance,
                &mut self.rng,
            )
        };

        let reverse = self.motion.direction.opposite();
        let mut best: Option<(Direction, f32)> = None;
        for dir in Direction::ALL {
            if dir == reverse || maze.direction_vector(node, dir).is_zero() {
                continue;
            }
            let Some(next) = maze.neighbor(node, dir) else {
                continue;
            };
            let distance = maze.position(next).distance(target);
            if best.is_none_or(|(_, least)| distance < least) {
                best = Some((dir, distance));
            }
        }

        if best.is_none() {
            self.motion.direction = Direction::None;
        }
        best.map(|(dir, _)| dir)
    }
}
