use crate::error::MazeError;
use crate::maze::MazeGraph;

/// The 28x31 arcade maze: 240 pellets, 4 energizers, a pen with a one-way
/// door under the entrance tile, and a wrap-around tunnel on the middle row.
pub const CLASSIC_MAZE_ROWS: &[&str] = &[
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.##### ## #####.######",
    "_____#.##### ## #####.#_____",
    "_____#.##    Eb    ##.#_____",
    "_____#.## ###--### ##.#_____",
    "######.## #GGGGGG# ##.######",
    "TTTTTT.   #iGpGGc#   .TTTTTT",
    "######.## #GGGGGG# ##.######",
    "_____#.## ######## ##.#_____",
    "_____#.##    F     ##.#_____",
    "_____#.## ######## ##.#_____",
    "######.## ######## ##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#.####.#####.##.#####.####.#",
    "#o..##.......P .......##..o#",
    "###.##.##.########.##.##.###",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
];

/// Compact 11x11 maze with every marker the engine needs.
pub const SMALL_MAZE_ROWS: &[&str] = &[
    "###########",
    "#o...b...o#",
    "#.##.#.##.#",
    "T....E....T",
    "###.#-#.###",
    "###.#p#.###",
    "###.#i#.###",
    "#...#c#...#",
    "#.#######.#",
    "#....P....#",
    "###########",
];

pub fn classic_maze() -> Result<MazeGraph, MazeError> {
    MazeGraph::from_rows(CLASSIC_MAZE_ROWS)
}
