//! Module that focuses on driving a single table of blackjack. Provides the
//! functionality needed to play complete automated rounds against the round
//! engine with a chosen decision policy and record the results.

pub mod strategy;

pub mod prelude {
    pub use super::strategy::{
        BasicStrategy, DealerMimic, PlayPolicy, PlayerDecision, StandOn, TableState,
    };
    pub use super::BlackjackGameSim;
    pub use blackjack_lib::{BlackjackGameError, BlackjackTable, Outcome, Player, Settlement};
}

pub use prelude::*;

/// Struct that plays complete rounds of blackjack at one table, every seat
/// following the same decision policy, and accumulates the results for
/// reporting. Seats that cannot post the table minimum sit rounds out; the
/// game ends early once no seat can post it.
pub struct BlackjackGameSim<P: PlayPolicy> {
    table: BlackjackTable,
    policy: P,
    min_bet: u32,
    num_rounds: u32,
    pub total_wins: i32,
    pub total_pushes: i32,
    pub total_losses: i32,
    pub total_winnings: i64,
    pub num_player_naturals: i32,
    pub ended_early: bool,
}

impl<P: PlayPolicy> BlackjackGameSim<P> {
    /// Associated method for building a new game. `table` should already have
    /// its players seated; `num_rounds` caps how many rounds a single call to
    /// `run` plays, and `min_bet` is the flat wager posted by every seat that
    /// can afford it.
    pub fn new(
        table: BlackjackTable,
        policy: P,
        num_rounds: u32,
        min_bet: u32,
    ) -> BlackjackGameSim<P> {
        BlackjackGameSim {
            table,
            policy,
            min_bet,
            num_rounds,
            total_wins: 0,
            total_pushes: 0,
            total_losses: 0,
            total_winnings: 0,
            num_player_naturals: 0,
            ended_early: false,
        }
    }

    /// Method that plays rounds until the configured count is reached or
    /// every seat is too broke to post the minimum.
    pub fn run(&mut self) -> Result<(), BlackjackGameError> {
        for _ in 0..self.num_rounds {
            self.table.new_round();

            // Seats that cannot post the minimum sit this round out.
            let mut any_bet = false;
            for seat in 0..self.table.player_count() {
                if self.table.player(seat).balance() >= self.min_bet {
                    self.table.place_bet(seat, self.min_bet)?;
                    any_bet = true;
                }
            }
            if !any_bet {
                self.ended_early = true;
                break;
            }

            self.table.deal_initial();
            let dealers_up_card = self.table.dealer_up_card().unwrap();

            for seat in 0..self.table.player_count() {
                if self.table.player(seat).bet() == 0 {
                    continue;
                }
                if self.table.player(seat).hand().is_natural() {
                    self.num_player_naturals += 1;
                }
                while !self.table.turn_is_over(seat) {
                    let player = self.table.player(seat);
                    let state = TableState {
                        hand_value: player.hand_value(),
                        soft: player.hand().is_soft(),
                        dealers_up_card,
                        bet: player.bet(),
                        balance: player.balance(),
                    };
                    match self.policy.decide(&state) {
                        PlayerDecision::Hit => {
                            self.table.offer_card(seat);
                        }
                        PlayerDecision::Stand => self.table.player_stands(seat),
                    }
                }
            }

            self.table.run_dealer();

            for settlement in self.table.settle() {
                match settlement.outcome {
                    Outcome::Win => self.total_wins += 1,
                    Outcome::Loss => self.total_losses += 1,
                    Outcome::Push => self.total_pushes += 1,
                }
                self.total_winnings += settlement.delta;
            }
        }
        Ok(())
    }

    pub fn table(&self) -> &BlackjackTable {
        &self.table
    }

    /// Method to get a string describing the policy the table is playing.
    pub fn label(&self) -> String {
        self.policy.label()
    }

    /// Writes the stats currently recorded to stdout.
    pub fn display_stats(&self) {
        const WIDTH: usize = 80;
        const TEXT_WIDTH: usize = "number of player naturals:".len() + 20;
        const NUMERIC_WIDTH: usize = WIDTH - TEXT_WIDTH;

        println!("{}", "-".repeat(WIDTH));
        println!("{:-^WIDTH$}", "stats");
        println!(
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}",
            "total wins:", self.total_wins
        );
        println!(
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}",
            "total pushes:", self.total_pushes
        );
        println!(
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}",
            "total losses:", self.total_losses
        );
        println!(
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}",
            "total winnings:", self.total_winnings
        );
        println!(
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}",
            "number of player naturals:", self.num_player_naturals
        );
        println!(
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}",
            "ended early:", self.ended_early
        );
        for player in self.table.players() {
            println!(
                "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}",
                format!("{} final balance:", player.name()),
                player.balance()
            );
        }
        println!("{}", "-".repeat(WIDTH));
    }

    /// Method for resetting the game so it can be run again: every seat back
    /// to the given bankroll, counters zeroed.
    pub fn reset(&mut self, player_balance: u32) {
        for seat in 0..self.table.player_count() {
            self.table.player_mut(seat).reset(player_balance);
        }
        self.table.new_round();
        self.total_wins = 0;
        self.total_pushes = 0;
        self.total_losses = 0;
        self.total_winnings = 0;
        self.num_player_naturals = 0;
        self.ended_early = false;
    }
}
