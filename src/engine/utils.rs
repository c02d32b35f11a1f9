use crate::maze::{MazeGraph, NodeId};
use crate::types::{Direction, GhostKind, TimelineEvent};

pub(super) fn seconds_to_ms(seconds: f32) -> u64 {
    (seconds.max(0.0) * 1000.0).round() as u64
}

/// The last `limit` timeline entries, oldest first.
pub(super) fn recent(timeline: &[TimelineEvent], limit: usize) -> Vec<TimelineEvent> {
    timeline[timeline.len().saturating_sub(limit)..].to_vec()
}

pub(super) fn ghost_name(kind: GhostKind) -> &'static str {
    match kind {
        GhostKind::Blinky => "blinky",
        GhostKind::Pinky => "pinky",
        GhostKind::Inky => "inky",
        GhostKind::Clyde => "clyde",
    }
}

/// Exits from `node` as an agent would take them, portals already resolved.
pub(super) fn exits(maze: &MazeGraph, node: NodeId) -> impl Iterator<Item = (Direction, NodeId)> + '_ {
    Direction::ALL.into_iter().filter_map(move |dir| {
        maze.neighbor(node, dir)
            .map(|next| (dir, maze.resolve_portal(next)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_keeps_the_tail_in_order() {
        let timeline: Vec<TimelineEvent> = (0..30)
            .map(|idx| TimelineEvent {
                at_ms: idx,
                label: format!("e{idx}"),
            })
            .collect();
        let tail = recent(&timeline, 24);
        assert_eq!(tail.len(), 24);
        assert_eq!(tail[0].at_ms, 6);
        assert_eq!(tail[23].at_ms, 29);
        assert_eq!(recent(&timeline[..3], 24).len(), 3);
    }

    #[test]
    fn seconds_round_to_whole_milliseconds() {
        assert_eq!(seconds_to_ms(6.0), 6_000);
        assert_eq!(seconds_to_ms(1.0 / 60.0), 17);
        assert_eq!(seconds_to_ms(-1.0), 0);
    }
}
