//! Walk a walled grid from entry to exit.

use rand::RngCore;
use tracing::{debug, instrument};

use super::{
    CellAccent, Direction, GameView, GridCell, InputMode, InputResult, Minigame, PlayerInput,
    ViewBody, roll,
};
use crate::lifecycle::AttemptOutcome;

/// Grid side length.
const SIZE: usize = 5;

/// Navigate from the top-left corner to the bottom-right exit. Walls are
/// placed after a guaranteed route is carved, so every instance is
/// solvable by construction.
#[derive(Debug)]
pub struct BlockExit {
    level: u32,
    walls: Vec<bool>,
    player: usize,
    moves: u32,
}

impl BlockExit {
    /// Creates an unmounted game; the arena calls `reset` before play.
    pub fn new() -> Self {
        Self {
            level: 1,
            walls: vec![false; SIZE * SIZE],
            player: 0,
            moves: 0,
        }
    }

    fn exit() -> usize {
        SIZE * SIZE - 1
    }

    /// Wall probability for non-route cells, capped well below saturation.
    fn wall_density(level: u32) -> f64 {
        (0.25 + 0.02 * level as f64).min(0.55)
    }

    fn step(&self, from: usize, direction: Direction) -> Option<usize> {
        let (row, col) = (from / SIZE, from % SIZE);
        let (row, col) = match direction {
            Direction::Up => (row.checked_sub(1)?, col),
            Direction::Down => {
                if row + 1 >= SIZE {
                    return None;
                }
                (row + 1, col)
            }
            Direction::Left => (row, col.checked_sub(1)?),
            Direction::Right => {
                if col + 1 >= SIZE {
                    return None;
                }
                (row, col + 1)
            }
        };
        Some(row * SIZE + col)
    }
}

impl Minigame for BlockExit {
    #[instrument(skip(self, rng))]
    fn reset(&mut self, level: u32, rng: &mut dyn RngCore) {
        // Carve a monotone route of down/right steps first; only cells off
        // that route may become walls.
        let mut route = vec![0usize];
        let (mut row, mut col) = (0usize, 0usize);
        while (row, col) != (SIZE - 1, SIZE - 1) {
            if row == SIZE - 1 {
                col += 1;
            } else if col == SIZE - 1 {
                row += 1;
            } else if roll(rng, 0, 1) == 0 {
                row += 1;
            } else {
                col += 1;
            }
            route.push(row * SIZE + col);
        }
        let density = Self::wall_density(level);
        let threshold = (density * 100.0) as i64;
        let walls = (0..SIZE * SIZE)
            .map(|cell| !route.contains(&cell) && roll(rng, 0, 99) < threshold)
            .collect();
        debug!(level, density, "Generated maze");
        self.level = level;
        self.walls = walls;
        self.player = 0;
        self.moves = 0;
    }

    fn briefing(&self) -> &'static str {
        "Steer from the top-left corner to the exit at the bottom-right with the arrow keys. \
         Walls block movement; a route always exists."
    }

    fn view(&self) -> GameView {
        let cells = (0..SIZE * SIZE)
            .map(|i| {
                if i == self.player {
                    GridCell::new("@", CellAccent::Active)
                } else if i == Self::exit() {
                    GridCell::new("X", CellAccent::Good)
                } else if self.walls[i] {
                    GridCell::new("#", CellAccent::Dim)
                } else {
                    GridCell::blank()
                }
            })
            .collect();
        GameView {
            status: format!("{} moves", self.moves),
            body: ViewBody::Grid {
                width: SIZE,
                cells,
            },
            choices: Vec::new(),
            input: InputMode::Moves,
        }
    }

    fn solution(&self) -> Option<String> {
        Some(
            "A clear route of only down and right steps always connects the corner to the exit; \
             trace it by hugging whichever open side continues toward the exit."
                .to_string(),
        )
    }

    #[instrument(skip(self, _rng))]
    fn handle(&mut self, input: PlayerInput, _rng: &mut dyn RngCore) -> InputResult {
        let PlayerInput::Move(direction) = input else {
            return InputResult::Continue;
        };
        let Some(next) = self.step(self.player, direction) else {
            return InputResult::Rejected("Edge of the grid".to_string());
        };
        if self.walls[next] {
            return InputResult::Rejected("A wall blocks the way".to_string());
        }
        self.player = next;
        self.moves += 1;
        if self.player == Self::exit() {
            InputResult::Finished(AttemptOutcome::win(self.level * 200))
        } else {
            InputResult::Continue
        }
    }
}
