//! Sealed-bid auction duel against a budgeted opponent.

use rand::RngCore;
use tracing::{debug, instrument};

use super::{GameView, InputResult, Minigame, PlayerInput, roll};
use crate::lifecycle::AttemptOutcome;

/// Rounds per duel.
const ROUNDS: u32 = 5;
/// Player's starting resource pool.
const PLAYER_POOL: u32 = 100;

/// Five sealed-bid rounds. Both sides spend what they bid; the higher bid
/// takes the round and ties take nothing. Win more rounds than the
/// opponent, whose pool grows with level.
#[derive(Debug)]
pub struct BidDuel {
    level: u32,
    round: u32,
    player_pool: u32,
    rival_pool: u32,
    player_wins: u32,
    rival_wins: u32,
    log: Vec<String>,
}

impl BidDuel {
    /// Creates an unmounted game; the arena calls `reset` before play.
    pub fn new() -> Self {
        Self {
            level: 1,
            round: 1,
            player_pool: PLAYER_POOL,
            rival_pool: PLAYER_POOL,
            player_wins: 0,
            rival_wins: 0,
            log: Vec::new(),
        }
    }

    /// Rival bids its fair share of the remaining rounds, jittered by up
    /// to 40% either way.
    fn rival_bid(&self, rng: &mut dyn RngCore) -> u32 {
        let rounds_left = (ROUNDS + 1 - self.round).max(1);
        let fair = self.rival_pool / rounds_left;
        let jitter = roll(rng, -40, 40);
        let bid = fair as i64 + fair as i64 * jitter / 100;
        bid.clamp(0, self.rival_pool as i64) as u32
    }
}

impl Minigame for BidDuel {
    #[instrument(skip(self, _rng))]
    fn reset(&mut self, level: u32, _rng: &mut dyn RngCore) {
        self.level = level;
        self.round = 1;
        self.player_pool = PLAYER_POOL;
        self.rival_pool = PLAYER_POOL + 5 * level;
        self.player_wins = 0;
        self.rival_wins = 0;
        self.log = Vec::new();
        debug!(rival_pool = self.rival_pool, "Duel reset");
    }

    fn briefing(&self) -> &'static str {
        "Five sealed-bid rounds. Both sides spend their bids; the higher bid takes the round. \
         Take more rounds than the rival to win. Unspent resources become bonus points."
    }

    fn view(&self) -> GameView {
        let mut lines = vec![
            format!("Your pool:  {:>4}", self.player_pool),
            format!("Rival pool: {:>4}", self.rival_pool),
            format!("Rounds: you {} - {} rival", self.player_wins, self.rival_wins),
            String::new(),
        ];
        lines.extend(self.log.iter().cloned());
        GameView::text_entry(
            format!("Round {}/{ROUNDS}: enter your bid", self.round.min(ROUNDS)),
            lines,
        )
    }

    fn solution(&self) -> Option<String> {
        Some(format!(
            "The rival splits its pool evenly over the remaining rounds, about {} per round, \
             with up to 40% swing. Overbid slightly on three rounds and concede the rest.",
            self.rival_pool / ROUNDS.max(1)
        ))
    }

    #[instrument(skip(self, rng))]
    fn handle(&mut self, input: PlayerInput, rng: &mut dyn RngCore) -> InputResult {
        let PlayerInput::Submit(text) = input else {
            return InputResult::Continue;
        };
        let Ok(bid) = text.trim().parse::<u32>() else {
            return InputResult::Rejected("Enter a whole number".to_string());
        };
        if bid > self.player_pool {
            return InputResult::Rejected(format!("You only have {}", self.player_pool));
        }
        let rival = self.rival_bid(rng);
        self.player_pool -= bid;
        self.rival_pool -= rival;
        let verdict = match bid.cmp(&rival) {
            std::cmp::Ordering::Greater => {
                self.player_wins += 1;
                "you take it"
            }
            std::cmp::Ordering::Less => {
                self.rival_wins += 1;
                "rival takes it"
            }
            std::cmp::Ordering::Equal => "tied, no one scores",
        };
        self.log
            .push(format!("R{}: you {bid} vs rival {rival} - {verdict}", self.round));
        debug!(round = self.round, bid, rival, "Round resolved");
        if self.round == ROUNDS {
            return if self.player_wins > self.rival_wins {
                InputResult::Finished(AttemptOutcome::win(self.level * 300 + self.player_pool))
            } else {
                InputResult::Finished(AttemptOutcome::loss(0))
            };
        }
        self.round += 1;
        InputResult::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn overbidding_the_pool_is_rejected() {
        let mut rng = StdRng::seed_from_u64(47);
        let mut game = BidDuel::new();
        game.reset(1, &mut rng);
        assert!(matches!(
            game.handle(PlayerInput::Submit("101".to_string()), &mut rng),
            InputResult::Rejected(_)
        ));
        assert_eq!(game.player_pool, PLAYER_POOL);
    }

    #[test]
    fn all_in_first_round_then_folding_loses() {
        let mut rng = StdRng::seed_from_u64(47);
        let mut game = BidDuel::new();
        game.reset(1, &mut rng);
        game.handle(PlayerInput::Submit("100".to_string()), &mut rng);
        let mut last = InputResult::Continue;
        for _ in 1..ROUNDS {
            last = game.handle(PlayerInput::Submit("0".to_string()), &mut rng);
        }
        // One round taken at most; the rival's zero-cost wins decide it.
        assert_eq!(last, InputResult::Finished(AttemptOutcome::loss(0)));
    }

    #[test]
    fn duel_runs_exactly_five_rounds() {
        let mut rng = StdRng::seed_from_u64(47);
        let mut game = BidDuel::new();
        game.reset(1, &mut rng);
        let mut finished = 0;
        for _ in 0..ROUNDS {
            if matches!(
                game.handle(PlayerInput::Submit("20".to_string()), &mut rng),
                InputResult::Finished(_)
            ) {
                finished += 1;
            }
        }
        assert_eq!(finished, 1);
    }

    #[test]
    fn rival_bid_never_exceeds_its_pool() {
        let mut rng = StdRng::seed_from_u64(47);
        let mut game = BidDuel::new();
        game.reset(20, &mut rng);
        for _ in 0..100 {
            let bid = game.rival_bid(&mut rng);
            assert!(bid <= game.rival_pool);
        }
    }
}
