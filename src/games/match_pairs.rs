//! Concentration with equations: pair each expression with its value.

use rand::RngCore;
use tracing::{debug, instrument};

use super::{
    CellAccent, GameView, GridCell, InputMode, InputResult, Minigame, PlayerInput, ViewBody, roll,
    shuffle,
};
use crate::lifecycle::AttemptOutcome;

/// Ticks a matched pair stays highlighted before settling.
const MATCH_TICKS: u64 = 5;
/// Ticks a mismatch stays face-up before flipping back.
const MISMATCH_TICKS: u64 = 10;
/// Most pairs on the board regardless of level.
const MAX_PAIRS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Hidden,
    Flipped,
    Matched,
}

#[derive(Debug, Clone)]
struct Card {
    label: String,
    pair: usize,
    face: Face,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lock {
    Open,
    /// Two cards are face-up; resolve after the countdown.
    Settling { ticks_left: u64, matched: bool },
}

/// Memory pairing: each expression card matches exactly one value card.
/// There is no failure state short of giving up.
#[derive(Debug)]
pub struct MatchPairs {
    level: u32,
    cards: Vec<Card>,
    flipped: Vec<usize>,
    lock: Lock,
}

impl MatchPairs {
    /// Creates an unmounted game; the arena calls `reset` before play.
    pub fn new() -> Self {
        Self {
            level: 1,
            cards: Vec::new(),
            flipped: Vec::new(),
            lock: Lock::Open,
        }
    }

    fn pair_count(level: u32) -> usize {
        (2 + (level as usize * 2) / 5).min(MAX_PAIRS)
    }

    fn width(&self) -> usize {
        4
    }

    fn all_matched(&self) -> bool {
        self.cards.iter().all(|c| c.face == Face::Matched)
    }

    fn settle(&mut self, matched: bool) {
        for &i in &self.flipped {
            self.cards[i].face = if matched { Face::Matched } else { Face::Hidden };
        }
        self.flipped.clear();
        self.lock = Lock::Open;
    }
}

impl Minigame for MatchPairs {
    #[instrument(skip(self, rng))]
    fn reset(&mut self, level: u32, rng: &mut dyn RngCore) {
        let pairs = Self::pair_count(level);
        let hi = 10 + 4 * level as i64;
        let mut cards = Vec::with_capacity(pairs * 2);
        let mut seen = Vec::new();
        for pair in 0..pairs {
            // Distinct values keep every pairing unambiguous.
            let (a, b, value) = loop {
                let a = roll(rng, 2, hi);
                let b = roll(rng, 1, hi);
                let value = a + b;
                if !seen.contains(&value) {
                    seen.push(value);
                    break (a, b, value);
                }
            };
            cards.push(Card {
                label: format!("{a}+{b}"),
                pair,
                face: Face::Hidden,
            });
            cards.push(Card {
                label: value.to_string(),
                pair,
                face: Face::Hidden,
            });
        }
        shuffle(rng, &mut cards);
        debug!(pairs, "Dealt board");
        self.level = level;
        self.cards = cards;
        self.flipped = Vec::new();
        self.lock = Lock::Open;
    }

    fn briefing(&self) -> &'static str {
        "Flip two cards at a time. Each expression card matches the card holding its value. Clear \
         the whole board to win; mismatches just flip back."
    }

    fn view(&self) -> GameView {
        let width = self.width();
        let height = self.cards.len().div_ceil(width);
        let cells = self
            .cards
            .iter()
            .map(|card| match card.face {
                Face::Hidden => GridCell::new("??", CellAccent::Normal),
                Face::Flipped => {
                    let accent = match self.lock {
                        Lock::Settling { matched: false, .. } => CellAccent::Bad,
                        _ => CellAccent::Active,
                    };
                    GridCell::new(card.label.clone(), accent)
                }
                Face::Matched => GridCell::new(card.label.clone(), CellAccent::Good),
            })
            .collect();
        let remaining = self
            .cards
            .iter()
            .filter(|c| c.face != Face::Matched)
            .count()
            / 2;
        GameView {
            status: format!("{remaining} pairs remaining"),
            body: ViewBody::Grid {
                width,
                cells,
            },
            choices: Vec::new(),
            input: match self.lock {
                Lock::Open => InputMode::Grid { width, height },
                Lock::Settling { .. } => InputMode::Locked,
            },
        }
    }

    #[instrument(skip(self, _rng))]
    fn handle(&mut self, input: PlayerInput, _rng: &mut dyn RngCore) -> InputResult {
        match input {
            PlayerInput::Tick => {
                if let Lock::Settling { ticks_left, matched } = &mut self.lock {
                    *ticks_left = ticks_left.saturating_sub(1);
                    if *ticks_left == 0 {
                        let matched = *matched;
                        self.settle(matched);
                        if self.all_matched() {
                            return InputResult::Finished(AttemptOutcome::win(self.level * 450));
                        }
                    }
                }
                InputResult::Continue
            }
            PlayerInput::Choose(index) => {
                if self.lock != Lock::Open {
                    return InputResult::Continue;
                }
                let Some(card) = self.cards.get(index) else {
                    return InputResult::Rejected("No card there".to_string());
                };
                if card.face != Face::Hidden {
                    return InputResult::Rejected("Card already face-up".to_string());
                }
                self.cards[index].face = Face::Flipped;
                self.flipped.push(index);
                if self.flipped.len() == 2 {
                    let matched = self.cards[self.flipped[0]].pair == self.cards[self.flipped[1]].pair;
                    self.lock = Lock::Settling {
                        ticks_left: if matched { MATCH_TICKS } else { MISMATCH_TICKS },
                        matched,
                    };
                }
                InputResult::Continue
            }
            _ => InputResult::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn settle(game: &mut MatchPairs, rng: &mut StdRng) -> InputResult {
        let mut last = InputResult::Continue;
        for _ in 0..MISMATCH_TICKS {
            last = game.handle(PlayerInput::Tick, rng);
            if game.lock == Lock::Open {
                break;
            }
        }
        last
    }

    #[test]
    fn pair_count_scales_and_caps() {
        assert_eq!(MatchPairs::pair_count(1), 2);
        assert_eq!(MatchPairs::pair_count(10), 6);
        assert_eq!(MatchPairs::pair_count(20), 10);
        assert_eq!(MatchPairs::pair_count(100), MAX_PAIRS);
    }

    #[test]
    fn every_card_has_exactly_one_partner() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut game = MatchPairs::new();
        game.reset(20, &mut rng);
        for pair in 0..MatchPairs::pair_count(20) {
            let count = game.cards.iter().filter(|c| c.pair == pair).count();
            assert_eq!(count, 2);
        }
    }

    #[test]
    fn clearing_the_board_wins() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut game = MatchPairs::new();
        game.reset(1, &mut rng);
        let mut last = InputResult::Continue;
        for pair in 0..MatchPairs::pair_count(1) {
            let indices: Vec<usize> = game
                .cards
                .iter()
                .enumerate()
                .filter(|(_, c)| c.pair == pair)
                .map(|(i, _)| i)
                .collect();
            game.handle(PlayerInput::Choose(indices[0]), &mut rng);
            game.handle(PlayerInput::Choose(indices[1]), &mut rng);
            last = settle(&mut game, &mut rng);
        }
        assert_eq!(last, InputResult::Finished(AttemptOutcome::win(450)));
    }

    #[test]
    fn mismatch_flips_back() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut game = MatchPairs::new();
        game.reset(1, &mut rng);
        let a = 0;
        let b = game
            .cards
            .iter()
            .position(|c| c.pair != game.cards[a].pair)
            .unwrap();
        game.handle(PlayerInput::Choose(a), &mut rng);
        game.handle(PlayerInput::Choose(b), &mut rng);
        settle(&mut game, &mut rng);
        assert!(game.cards.iter().all(|c| c.face == Face::Hidden));
    }

    #[test]
    fn third_flip_is_locked_out() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut game = MatchPairs::new();
        game.reset(1, &mut rng);
        let a = 0;
        let b = game
            .cards
            .iter()
            .position(|c| c.pair != game.cards[a].pair)
            .unwrap();
        game.handle(PlayerInput::Choose(a), &mut rng);
        game.handle(PlayerInput::Choose(b), &mut rng);
        let c = game.cards.iter().position(|c| c.face == Face::Hidden).unwrap();
        game.handle(PlayerInput::Choose(c), &mut rng);
        assert_eq!(game.cards[c].face, Face::Hidden);
    }
}
