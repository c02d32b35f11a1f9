use std::collections::{BTreeSet, HashMap};

use crate::error::MazeError;
use crate::types::{Direction, GhostKind, Tile, TileKind, Vec2};

pub type NodeId = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    PlayerSpawn,
    PenEntrance,
    FruitSpot,
    GhostSpawn(GhostKind),
}

/// One tile as handed over by the layout source: a coordinate and its tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawTile {
    pub tile: Tile,
    pub tag: char,
}

#[derive(Clone, Debug, Default)]
pub struct MazeLayout {
    pub tiles: Vec<RawTile>,
}

impl MazeLayout {
    /// Row 0 is the top of the maze; `y` grows upward.
    pub fn from_rows(rows: &[&str]) -> Result<Self, MazeError> {
        let Some(first) = rows.first() else {
            return Err(MazeError::Empty);
        };
        let expected = first.chars().count();
        let height = rows.len() as i32;
        let mut tiles = Vec::with_capacity(expected * rows.len());

        for (row, line) in rows.iter().enumerate() {
            let width = line.chars().count();
            if width != expected {
                return Err(MazeError::RaggedRow {
                    row,
                    width,
                    expected,
                });
            }
            let y = height - 1 - row as i32;
            for (column, tag) in line.chars().enumerate() {
                tiles.push(RawTile {
                    tile: Tile::new(column as i32, y),
                    tag,
                });
            }
        }

        Ok(Self { tiles })
    }
}

pub fn classify_tag(tag: char) -> Option<(TileKind, Option<Marker>)> {
    let classified = match tag {
        '#' => (TileKind::Wall, None),
        '_' => (TileKind::OutOfBound, None),
        '.' => (TileKind::Pellet, None),
        'o' => (TileKind::Energizer, None),
        ' ' => (TileKind::Empty, None),
        'T' => (TileKind::Tunnel, None),
        'G' => (TileKind::GhostHouse, None),
        '-' => (TileKind::GhostHouseDoor, None),
        'F' => (TileKind::Fruit, Some(Marker::FruitSpot)),
        'P' => (TileKind::Empty, Some(Marker::PlayerSpawn)),
        'E' => (TileKind::Empty, Some(Marker::PenEntrance)),
        'b' => (TileKind::Empty, Some(Marker::GhostSpawn(GhostKind::Blinky))),
        'p' => (TileKind::GhostHouse, Some(Marker::GhostSpawn(GhostKind::Pinky))),
        'i' => (TileKind::GhostHouse, Some(Marker::GhostSpawn(GhostKind::Inky))),
        'c' => (TileKind::GhostHouse, Some(Marker::GhostSpawn(GhostKind::Clyde))),
        _ => return None,
    };
    Some(classified)
}

fn marker_name(marker: Marker) -> &'static str {
    match marker {
        Marker::PlayerSpawn => "player spawn",
        Marker::PenEntrance => "pen entrance",
        Marker::FruitSpot => "fruit spot",
        Marker::GhostSpawn(GhostKind::Blinky) => "blinky spawn",
        Marker::GhostSpawn(GhostKind::Pinky) => "pinky spawn",
        Marker::GhostSpawn(GhostKind::Inky) => "inky spawn",
        Marker::GhostSpawn(GhostKind::Clyde) => "clyde spawn",
    }
}

#[derive(Clone, Debug)]
pub struct IntersectionNode {
    pub tile: Tile,
    pub kind: TileKind,
    pub is_pen_entrance: bool,
    neighbors: [Option<NodeId>; 4],
    directions: [Vec2; 4],
    portal: Option<NodeId>,
}

impl IntersectionNode {
    pub fn neighbor(&self, dir: Direction) -> Option<NodeId> {
        dir.slot().and_then(|slot| self.neighbors[slot])
    }

    pub fn is_portal(&self) -> bool {
        self.portal.is_some()
    }

    pub fn opposite_portal(&self) -> Option<NodeId> {
        self.portal
    }
}

/// Read-only directed graph over every traversable tile.
#[derive(Clone, Debug)]
pub struct MazeGraph {
    nodes: Vec<IntersectionNode>,
    index: HashMap<Tile, NodeId>,
    min: Tile,
    max: Tile,
    pellets: BTreeSet<Tile>,
    energizers: BTreeSet<Tile>,
    player_spawn: NodeId,
    ghost_spawns: [NodeId; 4],
    pen_entrance: NodeId,
    fruit_spot: Option<NodeId>,
}

impl MazeGraph {
    pub fn from_rows(rows: &[&str]) -> Result<Self, MazeError> {
        Self::build(&MazeLayout::from_rows(rows)?)
    }

    pub fn build(layout: &MazeLayout) -> Result<Self, MazeError> {
        if layout.tiles.is_empty() {
            return Err(MazeError::Empty);
        }

        let mut classified: Vec<(Tile, TileKind)> = Vec::with_capacity(layout.tiles.len());
        let mut seen: BTreeSet<Tile> = BTreeSet::new();
        let mut markers: HashMap<&'static str, Tile> = HashMap::new();
        let mut min = Tile::new(i32::MAX, i32::MAX);
        let mut max = Tile::new(i32::MIN, i32::MIN);

        for raw in &layout.tiles {
            let (kind, marker) = classify_tag(raw.tag).ok_or(MazeError::UnknownTile {
                tag: raw.tag,
                x: raw.tile.x,
                y: raw.tile.y,
            })?;
            if !seen.insert(raw.tile) {
                return Err(MazeError::DuplicateTile {
                    x: raw.tile.x,
                    y: raw.tile.y,
                });
            }
            if let Some(marker) = marker {
                let name = marker_name(marker);
                if markers.insert(name, raw.tile).is_some() {
                    return Err(MazeError::DuplicateMarker(name));
                }
            }
            min = Tile::new(min.x.min(raw.tile.x), min.y.min(raw.tile.y));
            max = Tile::new(max.x.max(raw.tile.x), max.y.max(raw.tile.y));
            classified.push((raw.tile, kind));
        }

        let mut nodes: Vec<IntersectionNode> = Vec::new();
        let mut index: HashMap<Tile, NodeId> = HashMap::new();
        let mut pellets = BTreeSet::new();
        let mut energizers = BTreeSet::new();
        for (tile, kind) in classified {
            match kind {
                TileKind::Pellet => {
                    pellets.insert(tile);
                }
                TileKind::Energizer => {
                    energizers.insert(tile);
                }
                _ => {}
            }
            if !kind.is_traversable() {
                continue;
            }
            index.insert(tile, nodes.len());
            nodes.push(IntersectionNode {
                tile,
                kind,
                is_pen_entrance: false,
                neighbors: [None; 4],
                directions: [Vec2::ZERO; 4],
                portal: None,
            });
        }

        link_neighbors(&mut nodes, &index);
        link_portals(&mut nodes, &index, min, max)?;

        let lookup = |marker: Marker| -> Result<NodeId, MazeError> {
            let name = marker_name(marker);
            markers
                .get(name)
                .and_then(|tile| index.get(tile))
                .copied()
                .ok_or(MazeError::MissingMarker(name))
        };
        let player_spawn = lookup(Marker::PlayerSpawn)?;
        let pen_entrance = lookup(Marker::PenEntrance)?;
        let ghost_spawns = [
            lookup(Marker::GhostSpawn(GhostKind::Blinky))?,
            lookup(Marker::GhostSpawn(GhostKind::Pinky))?,
            lookup(Marker::GhostSpawn(GhostKind::Inky))?,
            lookup(Marker::GhostSpawn(GhostKind::Clyde))?,
        ];
        let fruit_spot = lookup(Marker::FruitSpot).ok();
        nodes[pen_entrance].is_pen_entrance = true;

        Ok(Self {
            nodes,
            index,
            min,
            max,
            pellets,
            energizers,
            player_spawn,
            ghost_spawns,
            pen_entrance,
            fruit_spot,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &IntersectionNode {
        &self.nodes[id]
    }

    pub fn node_at(&self, tile: Tile) -> Option<NodeId> {
        self.index.get(&tile).copied()
    }

    pub fn tile(&self, id: NodeId) -> Tile {
        self.nodes[id].tile
    }

    pub fn position(&self, id: NodeId) -> Vec2 {
        self.nodes[id].tile.position()
    }

    pub fn neighbor(&self, id: NodeId, dir: Direction) -> Option<NodeId> {
        self.nodes[id].neighbor(dir)
    }

    /// Unit vector toward the neighbor in `dir`, or zero when there is none.
    pub fn direction_vector(&self, id: NodeId, dir: Direction) -> Vec2 {
        dir.slot()
            .map(|slot| self.nodes[id].directions[slot])
            .unwrap_or(Vec2::ZERO)
    }

    /// The paired node for a portal, the node itself otherwise. One hop only.
    pub fn resolve_portal(&self, id: NodeId) -> NodeId {
        self.nodes[id].portal.unwrap_or(id)
    }

    pub fn is_pen(&self, id: NodeId) -> bool {
        self.nodes[id].kind.is_pen()
    }

    pub fn bounds(&self) -> (Tile, Tile) {
        (self.min, self.max)
    }

    pub fn pellet_tiles(&self) -> &BTreeSet<Tile> {
        &self.pellets
    }

    pub fn energizer_tiles(&self) -> &BTreeSet<Tile> {
        &self.energizers
    }

    pub fn total_pellets(&self) -> u32 {
        self.pellets.len() as u32
    }

    pub fn total_energizers(&self) -> u32 {
        self.energizers.len() as u32
    }

    pub fn player_spawn(&self) -> NodeId {
        self.player_spawn
    }

    pub fn ghost_spawn(&self, kind: GhostKind) -> NodeId {
        self.ghost_spawns[kind.index()]
    }

    pub fn pen_entrance(&self) -> NodeId {
        self.pen_entrance
    }

    pub fn fruit_spot(&self) -> Option<NodeId> {
        self.fruit_spot
    }
}

fn link_neighbors(nodes: &mut [IntersectionNode], index: &HashMap<Tile, NodeId>) {
    for id in 0..nodes.len() {
        let tile = nodes[id].tile;
        let from_pen = nodes[id].kind.is_pen();
        for dir in Direction::ALL {
            let Some(slot) = dir.slot() else {
                continue;
            };
            let Some(&neighbor) = index.get(&tile.offset(dir)) else {
                continue;
            };
            // The pen door only opens outward.
            if nodes[neighbor].kind == TileKind::GhostHouseDoor && !from_pen {
                continue;
            }
            nodes[id].neighbors[slot] = Some(neighbor);
            nodes[id].directions[slot] =
                (nodes[neighbor].tile.position() - tile.position()).normalized();
        }
    }
}

fn link_portals(
    nodes: &mut [IntersectionNode],
    index: &HashMap<Tile, NodeId>,
    min: Tile,
    max: Tile,
) -> Result<(), MazeError> {
    let mut pairs = Vec::new();
    for (id, node) in nodes.iter().enumerate() {
        if node.kind != TileKind::Tunnel {
            continue;
        }
        let tile = node.tile;
        let partner = if tile.x == min.x {
            Tile::new(max.x, tile.y)
        } else if tile.x == max.x {
            Tile::new(min.x, tile.y)
        } else if tile.y == min.y {
            Tile::new(tile.x, max.y)
        } else if tile.y == max.y {
            Tile::new(tile.x, min.y)
        } else {
            continue;
        };
        let paired = index
            .get(&partner)
            .copied()
            .filter(|&other| other != id && nodes[other].kind == TileKind::Tunnel);
        match paired {
            Some(other) => pairs.push((id, other)),
            None => {
                return Err(MazeError::UnpairedPortal {
                    x: tile.x,
                    y: tile.y,
                })
            }
        }
    }
    for (id, other) in pairs {
        nodes[id].portal = Some(other);
    }
    Ok(())
}
