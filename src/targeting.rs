use rand::rngs::StdRng;
use rand::Rng;

use crate::constants::{CLYDE_SHY_DISTANCE, INKY_LOOKAHEAD_TILES, PINKY_LOOKAHEAD_TILES};
use crate::types::{Direction, GhostKind, GhostMode, Tile, Vec2};

/// What a ghost may look at when picking its target: the player and the
/// other ghosts, indexed by [`GhostKind::index`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetInputs {
    pub player_position: Vec2,
    pub player_facing: Direction,
    pub peers: [Vec2; 4],
}

/// Home corner just outside the maze bounds, one per ghost.
pub fn scatter_corner(kind: GhostKind, bounds: (Tile, Tile)) -> Tile {
    let (min, max) = bounds;
    match kind {
        GhostKind::Blinky => Tile::new(max.x - 2, max.y + 1),
        GhostKind::Pinky => Tile::new(min.x + 2, max.y + 1),
        GhostKind::Inky => Tile::new(max.x - 2, min.y - 1),
        GhostKind::Clyde => Tile::new(min.x + 2, min.y - 1),
    }
}

pub fn chase_target(
    kind: GhostKind,
    own_position: Vec2,
    inputs: &TargetInputs,
    bounds: (Tile, Tile),
) -> Vec2 {
    let player = inputs.player_position;
    let facing = inputs.player_facing.unit_vector();
    match kind {
        GhostKind::Blinky => player,
        GhostKind::Pinky => player + facing * PINKY_LOOKAHEAD_TILES,
        GhostKind::Inky => {
            let blinky = inputs.peers[GhostKind::Blinky.index()];
            let pivot = player + facing * INKY_LOOKAHEAD_TILES;
            // Offset on both axes by the scalar distance, not a reflection.
            let reach = blinky.distance(pivot);
            Vec2::new(blinky.x + reach, blinky.y + reach)
        }
        GhostKind::Clyde => {
            if own_position.distance(player) > CLYDE_SHY_DISTANCE {
                player
            } else {
                scatter_corner(kind, bounds).position()
            }
        }
    }
}

/// Target for the next intersection decision. Frightened ghosts draw a new
/// random tile on every call.
pub fn target_tile(
    kind: GhostKind,
    mode: GhostMode,
    own_position: Vec2,
    inputs: &TargetInputs,
    bounds: (Tile, Tile),
    pen_entrance: Vec2,
    rng: &mut StdRng,
) -> Vec2 {
    match mode {
        GhostMode::Scatter => scatter_corner(kind, bounds).position(),
        GhostMode::Chase => chase_target(kind, own_position, inputs, bounds),
        GhostMode::Frightened => {
            let (min, max) = bounds;
            Tile::new(
                rng.random_range(min.x..=max.x),
                rng.random_range(min.y..=max.y),
            )
            .position()
        }
        GhostMode::Eaten => pen_entrance,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    const BOUNDS: (Tile, Tile) = (Tile::new(0, 0), Tile::new(27, 30));

    fn inputs(player: Vec2, facing: Direction, blinky: Vec2) -> TargetInputs {
        TargetInputs {
            player_position: player,
            player_facing: facing,
            peers: [blinky, Vec2::ZERO, Vec2::ZERO, Vec2::ZERO],
        }
    }

    #[test]
    fn corners_are_distinct_and_outside_the_maze() {
        let corners: Vec<Tile> = GhostKind::ALL
            .iter()
            .map(|kind| scatter_corner(*kind, BOUNDS))
            .collect();
        assert_eq!(corners[0], Tile::new(25, 31));
        assert_eq!(corners[1], Tile::new(2, 31));
        assert_eq!(corners[2], Tile::new(25, -1));
        assert_eq!(corners[3], Tile::new(2, -1));
    }

    #[test]
    fn pinky_leads_the_player_by_four_tiles() {
        let input = inputs(Vec2::new(10.0, 10.0), Direction::Left, Vec2::ZERO);
        let target = chase_target(GhostKind::Pinky, Vec2::ZERO, &input, BOUNDS);
        assert_eq!(target, Vec2::new(6.0, 10.0));
    }

    #[test]
    fn inky_uses_the_literal_offset_formula() {
        let input = inputs(Vec2::new(10.0, 10.0), Direction::Up, Vec2::new(4.0, 4.0));
        let target = chase_target(GhostKind::Inky, Vec2::ZERO, &input, BOUNDS);
        // Pivot (10, 12); distance from Blinky is 10; added to both axes.
        assert_eq!(target, Vec2::new(14.0, 14.0));
        // A reflection through the pivot would be (16, 20).
        assert_ne!(target, Vec2::new(16.0, 20.0));
    }

    #[test]
    fn clyde_retreats_when_close() {
        let input = inputs(Vec2::new(10.0, 10.0), Direction::Right, Vec2::ZERO);
        let far = chase_target(GhostKind::Clyde, Vec2::new(10.0, 19.0), &input, BOUNDS);
        assert_eq!(far, Vec2::new(10.0, 10.0));
        let near = chase_target(GhostKind::Clyde, Vec2::new(10.0, 18.0), &input, BOUNDS);
        assert_eq!(near, Vec2::new(2.0, -1.0));
    }

    #[test]
    fn frightened_targets_stay_in_bounds_and_vary() {
        let mut rng = StdRng::seed_from_u64(7);
        let input = inputs(Vec2::ZERO, Direction::None, Vec2::ZERO);
        let targets: Vec<Vec2> = (0..32)
            .map(|_| {
                target_tile(
                    GhostKind::Inky,
                    GhostMode::Frightened,
                    Vec2::ZERO,
                    &input,
                    BOUNDS,
                    Vec2::ZERO,
                    &mut rng,
                )
            })
            .collect();
        assert!(targets
            .iter()
            .all(|t| (0.0..=27.0).contains(&t.x) && (0.0..=30.0).contains(&t.y)));
        assert!(targets.windows(2).any(|pair| pair[0] != pair[1]));
    }

    #[test]
    fn eaten_heads_for_the_pen_entrance() {
        let mut rng = StdRng::seed_from_u64(1);
        let input = inputs(Vec2::ZERO, Direction::None, Vec2::ZERO);
        let entrance = Vec2::new(13.0, 19.0);
        let target = target_tile(
            GhostKind::Pinky,
            GhostMode::Eaten,
            Vec2::ZERO,
            &input,
            BOUNDS,
            entrance,
            &mut rng,
        );
        assert_eq!(target, entrance);
    }
}
