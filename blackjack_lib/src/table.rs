use crate::dealer::{Dealer, DealerState};
use crate::errors::BlackjackGameError;
use crate::player::Player;
use crate::shoe::Shoe;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Phase of the round currently in progress. `deal_initial` moves the table
/// from `Betting` straight into `PlayerTurns` (the deal itself has no
/// externally observable intermediate state), `run_dealer` covers
/// `DealerTurn`, and `settle` performs the cleanup on its way back to
/// `Betting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Betting,
    PlayerTurns,
    DealerTurn,
    Settlement,
}

/// How one wager settled against the dealer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Push,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Win => write!(f, "WIN"),
            Outcome::Loss => write!(f, "LOSS"),
            Outcome::Push => write!(f, "PUSH"),
        }
    }
}

/// Record of one seat's settlement: the outcome and the signed amount the
/// bankroll moved by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub seat: usize,
    pub name: String,
    pub outcome: Outcome,
    pub delta: i64,
}

/// The round engine. Owns the shoe, the dealer and the seated players, and
/// drives one round at a time through its phases: wagers are placed, the
/// opening cards go out in seating order, each seat draws or stands until
/// finished, the dealer plays out its fixed policy, and every live wager is
/// settled against the dealer's final value.
///
/// Participants never touch the shoe themselves; every card flows through the
/// table. Seat indexes are assigned by `add_player` and a bad index (or a call
/// made in the wrong phase) is a caller bug and panics rather than being
/// silently ignored.
pub struct BlackjackTable {
    shoe: Shoe,
    dealer: Dealer,
    players: Vec<Player>,
    finished: Vec<bool>,
    phase: RoundPhase,
}

impl BlackjackTable {
    /// Associated function to create a new table with the given dealer soft
    /// seventeen rule and no seated players.
    pub fn new(hit_soft_seventeen: bool) -> BlackjackTable {
        BlackjackTable {
            shoe: Shoe::new(),
            dealer: Dealer::new(hit_soft_seventeen),
            players: Vec::new(),
            finished: Vec::new(),
            phase: RoundPhase::Betting,
        }
    }

    /// Method for seating a player. Returns the seat index; seating order is
    /// join order and fixes the deal order for every round.
    pub fn add_player(&mut self, player: Player) -> usize {
        assert_eq!(
            self.phase,
            RoundPhase::Betting,
            "players can only join between rounds"
        );
        self.players.push(player);
        self.finished.push(false);
        self.players.len() - 1
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, seat: usize) -> &Player {
        &self.players[seat]
    }

    pub fn player_mut(&mut self, seat: usize) -> &mut Player {
        &mut self.players[seat]
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Method that opens a new round: every hand and wager is cleared and the
    /// table returns to the betting phase. The shoe carries over from the
    /// previous round.
    pub fn new_round(&mut self) {
        for player in &mut self.players {
            player.clear_hand();
            player.clear_bet();
        }
        self.dealer.clear_hand();
        for flag in &mut self.finished {
            *flag = false;
        }
        self.phase = RoundPhase::Betting;
    }

    /// Method for placing a wager for the given seat. A rejected bet leaves
    /// the seat's wager and bankroll untouched; a seat that never bets simply
    /// sits the round out.
    pub fn place_bet(&mut self, seat: usize, bet: u32) -> Result<(), BlackjackGameError> {
        assert_eq!(
            self.phase,
            RoundPhase::Betting,
            "bets are only accepted during the betting phase"
        );
        self.players[seat].place_bet(bet)
    }

    /// Deals the opening hands: one card to each wagering seat in seating
    /// order, one to the dealer, then a second card to each in the same
    /// order. Seats without a wager are skipped but keep their chairs.
    pub fn deal_initial(&mut self) {
        assert_eq!(
            self.phase,
            RoundPhase::Betting,
            "the opening deal follows the betting phase"
        );
        for seat in 0..self.players.len() {
            self.finished[seat] = self.players[seat].bet() == 0;
        }
        for _ in 0..2 {
            for seat in 0..self.players.len() {
                if self.players[seat].bet() == 0 {
                    continue;
                }
                let card = self.shoe.draw();
                self.players[seat].receive_card(card);
            }
            let card = self.shoe.draw();
            self.dealer.receive_card(card);
        }
        self.phase = RoundPhase::PlayerTurns;
    }

    /// Method for dealing one more card to a seat during the player turns.
    /// Returns the dealt rank. A seat that busts is finished immediately and
    /// may not draw again; offering a card to a finished seat is a caller bug.
    pub fn offer_card(&mut self, seat: usize) -> u8 {
        assert_eq!(
            self.phase,
            RoundPhase::PlayerTurns,
            "cards are only offered during the player turns"
        );
        assert!(
            !self.finished[seat],
            "seat {} is finished for this round",
            seat
        );
        let card = self.shoe.draw();
        self.players[seat].receive_card(card);
        if self.players[seat].is_busted() {
            self.finished[seat] = true;
        }
        card
    }

    /// Method for a seat to stand on its current hand.
    pub fn player_stands(&mut self, seat: usize) {
        assert_eq!(
            self.phase,
            RoundPhase::PlayerTurns,
            "stands are only taken during the player turns"
        );
        self.finished[seat] = true;
    }

    /// True once the seat has stood, busted, or sat the round out.
    pub fn turn_is_over(&self, seat: usize) -> bool {
        self.finished[seat]
    }

    /// Method that plays the dealer's hand out against the shoe: draw on 16
    /// or less, draw on soft 17 when configured to, stand otherwise. Each
    /// draw raises the total by at least one, so the loop always terminates.
    pub fn run_dealer(&mut self) {
        assert_eq!(
            self.phase,
            RoundPhase::PlayerTurns,
            "the dealer plays after the player turns"
        );
        self.phase = RoundPhase::DealerTurn;
        while self.dealer.state() == DealerState::Drawing {
            let card = self.shoe.draw();
            self.dealer.receive_card(card);
        }
        self.phase = RoundPhase::Settlement;
    }

    /// Method that settles every live wager against the dealer's final value
    /// and returns the per-seat results in seating order.
    ///
    /// Evaluation order per seat: a busted player loses outright, even when
    /// the dealer busted too; then a dealer bust pays every surviving seat;
    /// then the totals are compared, equal totals pushing with no money
    /// moved. Each settled seat's hand and wager are cleared as it is paid,
    /// the dealer's hand is cleared once at the end, and the table returns to
    /// the betting phase.
    pub fn settle(&mut self) -> Vec<Settlement> {
        assert_eq!(
            self.phase,
            RoundPhase::Settlement,
            "settlement follows the dealer's turn"
        );
        let dealer_value = self.dealer.hand_value();
        let dealer_busted = self.dealer.is_busted();

        let mut results = Vec::new();
        for (seat, player) in self.players.iter_mut().enumerate() {
            let bet = player.bet();
            if bet == 0 {
                continue;
            }
            let value = player.hand_value();
            let outcome = if value > 21 {
                Outcome::Loss
            } else if dealer_busted {
                Outcome::Win
            } else if value > dealer_value {
                Outcome::Win
            } else if value < dealer_value {
                Outcome::Loss
            } else {
                Outcome::Push
            };
            let delta = match outcome {
                Outcome::Win => {
                    player.hand_won(bet);
                    i64::from(bet)
                }
                Outcome::Loss => {
                    player.hand_lost(bet);
                    -i64::from(bet)
                }
                Outcome::Push => {
                    player.hand_push();
                    0
                }
            };
            player.clear_bet();
            results.push(Settlement {
                seat,
                name: player.name().to_string(),
                outcome,
                delta,
            });
        }
        self.dealer.clear_hand();
        self.phase = RoundPhase::Betting;
        results
    }

    /// Method for clearing the table completely: hands, wagers and turn flags
    /// reset, shoe rebuilt and reshuffled. Idempotent.
    pub fn reset_table(&mut self) {
        self.new_round();
        self.shoe.reset();
    }

    pub fn hand_value(&self, seat: usize) -> u8 {
        self.players[seat].hand_value()
    }

    pub fn is_busted(&self, seat: usize) -> bool {
        self.players[seat].is_busted()
    }

    /// The dealer's face up card, once the opening deal has happened.
    pub fn dealer_up_card(&self) -> Option<u8> {
        self.dealer.up_card()
    }

    /// The dealer's full hand after it has played out.
    pub fn dealer_final_hand(&self) -> &[u8] {
        assert_eq!(
            self.phase,
            RoundPhase::Settlement,
            "the dealer's hand is revealed once it has played out"
        );
        self.dealer.hand().cards()
    }

    pub fn dealer_hand_value(&self) -> u8 {
        self.dealer.hand_value()
    }

    pub fn dealer_busted(&self) -> bool {
        self.dealer.is_busted()
    }

    pub fn shoe_remaining(&self) -> usize {
        self.shoe.remaining()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a table in the settlement phase with the given player and
    /// dealer hands injected directly, bypassing the shoe.
    fn rigged_table(players: &[(&str, u32, u32, &[u8])], dealer_cards: &[u8]) -> BlackjackTable {
        let mut table = BlackjackTable::new(false);
        for &(name, balance, bet, cards) in players {
            let seat = table.add_player(Player::new(name, balance));
            table.place_bet(seat, bet).unwrap();
            for &card in cards {
                table.players[seat].receive_card(card);
            }
        }
        for &card in dealer_cards {
            table.dealer.receive_card(card);
        }
        table.phase = RoundPhase::Settlement;
        table
    }

    #[test]
    fn player_over_standing_dealer_wins() {
        let mut table = rigged_table(&[("Alice", 1000, 100, &[10, 9])], &[10, 7]);
        let results = table.settle();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].outcome, Outcome::Win);
        assert_eq!(results[0].delta, 100);
        assert_eq!(table.player(0).balance(), 1100);
        assert_eq!(table.player(0).wins(), 1);
    }

    #[test]
    fn dealer_bust_pays_a_lower_surviving_hand() {
        let mut table = rigged_table(&[("Alice", 1000, 50, &[10, 7])], &[10, 6, 8]);
        let results = table.settle();
        assert_eq!(results[0].outcome, Outcome::Win);
        assert_eq!(table.player(0).balance(), 1050);
    }

    #[test]
    fn equal_totals_push_with_no_money_moved() {
        let mut table = rigged_table(&[("Alice", 1000, 25, &[10, 7])], &[9, 8]);
        let results = table.settle();
        assert_eq!(results[0].outcome, Outcome::Push);
        assert_eq!(results[0].delta, 0);
        assert_eq!(table.player(0).balance(), 1000);
        assert_eq!(table.player(0).pushes(), 1);
    }

    #[test]
    fn busted_player_loses_to_a_standing_dealer() {
        let mut table = rigged_table(&[("Alice", 1000, 100, &[10, 6, 6])], &[10, 10]);
        let results = table.settle();
        assert_eq!(results[0].outcome, Outcome::Loss);
        assert_eq!(table.player(0).balance(), 900);
        assert_eq!(table.player(0).losses(), 1);
    }

    #[test]
    fn player_bust_outranks_dealer_bust() {
        let mut table = rigged_table(&[("Alice", 1000, 100, &[10, 6, 6])], &[10, 6, 8]);
        let results = table.settle();
        assert_eq!(results[0].outcome, Outcome::Loss);
        assert_eq!(results[0].delta, -100);
        assert_eq!(table.player(0).balance(), 900);
    }

    #[test]
    fn settlement_covers_the_whole_table_and_clears_hands() {
        let mut table = rigged_table(
            &[
                ("Alice", 1000, 100, &[10, 9]),
                ("Bob", 1000, 100, &[8, 8]),
            ],
            &[10, 7],
        );
        let results = table.settle();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].outcome, Outcome::Win);
        assert_eq!(results[1].outcome, Outcome::Loss);
        assert_eq!(table.player(0).balance(), 1100);
        assert_eq!(table.player(1).balance(), 900);
        // Cleanup: every hand cleared, wagers zeroed, back to betting.
        assert!(table.player(0).hand().is_empty());
        assert!(table.player(1).hand().is_empty());
        assert!(table.dealer.hand().is_empty());
        assert_eq!(table.player(0).bet(), 0);
        assert_eq!(table.phase(), RoundPhase::Betting);
    }

    #[test]
    fn seat_without_a_wager_is_left_out_of_settlement() {
        let mut table = BlackjackTable::new(false);
        let alice = table.add_player(Player::new("Alice", 1000));
        let broke = table.add_player(Player::new("Bob", 0));
        table.place_bet(alice, 100).unwrap();
        table.players[alice].receive_card(10);
        table.players[alice].receive_card(9);
        table.dealer.receive_card(10);
        table.dealer.receive_card(7);
        table.phase = RoundPhase::Settlement;
        let results = table.settle();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].seat, alice);
        assert_eq!(table.player(broke).balance(), 0);
        assert_eq!(table.player(broke).wins() + table.player(broke).losses(), 0);
    }

    #[test]
    fn opening_deal_gives_two_cards_each_and_skips_non_bettors() {
        let mut table = BlackjackTable::new(false);
        let alice = table.add_player(Player::new("Alice", 500));
        let broke = table.add_player(Player::new("Bob", 0));
        table.new_round();
        table.place_bet(alice, 10).unwrap();
        table.deal_initial();

        assert_eq!(table.player(alice).hand().len(), 2);
        assert_eq!(table.player(broke).hand().len(), 0);
        assert_eq!(table.dealer.hand().len(), 2);
        // One betting seat plus the dealer consumed four cards.
        assert_eq!(table.shoe_remaining(), 48);
        assert!(table.dealer_up_card().is_some());
        assert!(!table.turn_is_over(alice));
        assert!(table.turn_is_over(broke));
    }

    #[test]
    fn dealer_plays_to_seventeen_or_better() {
        let mut table = BlackjackTable::new(false);
        let seat = table.add_player(Player::new("Alice", 500));
        table.new_round();
        table.place_bet(seat, 10).unwrap();
        table.deal_initial();
        table.player_stands(seat);
        table.run_dealer();

        let final_value = table.dealer_hand_value();
        assert!(final_value >= 17);
        assert!(table.dealer_final_hand().len() >= 2);
        // Every card before the last left the dealer still drawing.
        let cards = table.dealer_final_hand().to_vec();
        let mut replay = Dealer::new(false);
        for &card in &cards[..cards.len() - 1] {
            replay.receive_card(card);
            if replay.hand().len() >= 2 {
                assert_eq!(replay.state(), DealerState::Drawing);
            }
        }
    }

    #[test]
    fn full_round_accounting_balances() {
        let mut table = BlackjackTable::new(false);
        let alice = table.add_player(Player::new("Alice", 500));
        let bob = table.add_player(Player::new("Bob", 300));
        for _ in 0..20 {
            table.new_round();
            table.place_bet(alice, 5).unwrap();
            table.place_bet(bob, 5).unwrap();
            table.deal_initial();
            for seat in [alice, bob] {
                while !table.turn_is_over(seat) {
                    if table.hand_value(seat) < 17 {
                        table.offer_card(seat);
                    } else {
                        table.player_stands(seat);
                    }
                }
            }
            table.run_dealer();
            let results = table.settle();
            assert_eq!(results.len(), 2);
        }
        let net: i64 = table.player(alice).net() + table.player(bob).net();
        let counted: i64 = table
            .players()
            .iter()
            .map(|p| i64::from(p.wins()) + i64::from(p.losses()) + i64::from(p.pushes()))
            .sum();
        assert_eq!(counted, 40);
        // Flat even money settlements: the combined net is a whole multiple
        // of the flat bet.
        assert_eq!(net % 5, 0);
    }

    #[test]
    fn busted_seat_is_finished_immediately() {
        let mut table = BlackjackTable::new(false);
        let seat = table.add_player(Player::new("Alice", 500));
        table.new_round();
        table.place_bet(seat, 10).unwrap();
        table.deal_initial();
        while !table.turn_is_over(seat) {
            table.offer_card(seat);
        }
        assert!(table.is_busted(seat));
    }

    #[test]
    #[should_panic]
    fn offering_a_card_to_a_finished_seat_panics() {
        let mut table = BlackjackTable::new(false);
        let seat = table.add_player(Player::new("Alice", 500));
        table.new_round();
        table.place_bet(seat, 10).unwrap();
        table.deal_initial();
        table.player_stands(seat);
        table.offer_card(seat);
    }

    #[test]
    #[should_panic]
    fn betting_outside_the_betting_phase_panics() {
        let mut table = BlackjackTable::new(false);
        let seat = table.add_player(Player::new("Alice", 500));
        table.new_round();
        table.place_bet(seat, 10).unwrap();
        table.deal_initial();
        let _ = table.place_bet(seat, 10);
    }

    #[test]
    #[should_panic]
    fn unknown_seat_panics() {
        let table = BlackjackTable::new(false);
        let _ = table.player(3);
    }

    #[test]
    fn rejected_bet_leaves_the_seat_playable() {
        let mut table = BlackjackTable::new(false);
        let seat = table.add_player(Player::new("Alice", 50));
        table.new_round();
        assert!(table.place_bet(seat, 100).is_err());
        assert_eq!(table.player(seat).bet(), 0);
        assert!(table.place_bet(seat, 50).is_ok());
    }

    #[test]
    fn reset_table_rebuilds_the_shoe() {
        let mut table = BlackjackTable::new(false);
        let seat = table.add_player(Player::new("Alice", 500));
        table.new_round();
        table.place_bet(seat, 10).unwrap();
        table.deal_initial();
        table.reset_table();
        assert_eq!(table.shoe_remaining(), crate::shoe::SHOE_SIZE);
        assert!(table.player(seat).hand().is_empty());
        assert_eq!(table.player(seat).bet(), 0);
        assert_eq!(table.phase(), RoundPhase::Betting);
        // Idempotent.
        table.reset_table();
        assert_eq!(table.phase(), RoundPhase::Betting);
    }
}
