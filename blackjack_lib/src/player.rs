use crate::errors::BlackjackGameError;
use crate::hand::Hand;
use std::fmt::Display;

/// A seated participant: a named hand with a bankroll and a wager. The
/// bankroll and wager are whole currency units; a wager is only ever set by
/// `place_bet`, which enforces `1 <= bet <= balance`, and only ever paid out
/// by the table's settlement. Cumulative win/loss/push counters and the
/// starting bankroll are kept for end of session reporting.
#[derive(Debug, Clone)]
pub struct Player {
    name: String,
    hand: Hand,
    balance: u32,
    starting_balance: u32,
    bet: u32,
    wins: u32,
    losses: u32,
    pushes: u32,
}

impl Player {
    /// Associated function to create a new `Player` with the given bankroll.
    pub fn new<S: Into<String>>(name: S, balance: u32) -> Player {
        Player {
            name: name.into(),
            hand: Hand::new(),
            balance,
            starting_balance: balance,
            bet: 0,
            wins: 0,
            losses: 0,
            pushes: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn balance(&self) -> u32 {
        self.balance
    }

    pub fn starting_balance(&self) -> u32 {
        self.starting_balance
    }

    /// Net result for the session so far, positive for a gain.
    pub fn net(&self) -> i64 {
        i64::from(self.balance) - i64::from(self.starting_balance)
    }

    /// Method for placing a wager on the coming round. Rejects a bet of zero
    /// or a bet above the current bankroll, leaving balance and wager
    /// untouched so the caller can retry.
    pub fn place_bet(&mut self, bet: u32) -> Result<(), BlackjackGameError> {
        if bet == 0 {
            return Err(BlackjackGameError::new(
                "bet must be a positive amount".to_string(),
            ));
        }
        if bet > self.balance {
            return Err(BlackjackGameError::new(format!(
                "bet of {} exceeds current balance of {}",
                bet, self.balance
            )));
        }
        self.bet = bet;
        Ok(())
    }

    pub fn bet(&self) -> u32 {
        self.bet
    }

    /// Method for clearing the wager between rounds.
    pub fn clear_bet(&mut self) {
        self.bet = 0;
    }

    /// Method to receive a dealt card.
    pub fn receive_card(&mut self, card: u8) {
        self.hand.receive_card(card);
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn hand_value(&self) -> u8 {
        self.hand.value()
    }

    pub fn is_busted(&self) -> bool {
        self.hand.is_busted()
    }

    pub fn clear_hand(&mut self) {
        self.hand.clear();
    }

    /// Method for collecting a won wager; clears the hand for the next round.
    pub fn hand_won(&mut self, amount: u32) {
        self.balance += amount;
        self.wins += 1;
        self.hand.clear();
    }

    /// Method for paying a lost wager; clears the hand for the next round.
    pub fn hand_lost(&mut self, amount: u32) {
        self.balance = self.balance.saturating_sub(amount);
        self.losses += 1;
        self.hand.clear();
    }

    /// Method for recording a push. No money moves; the hand is still cleared.
    pub fn hand_push(&mut self) {
        self.pushes += 1;
        self.hand.clear();
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    pub fn losses(&self) -> u32 {
        self.losses
    }

    pub fn pushes(&self) -> u32 {
        self.pushes
    }

    /// Method for restoring the player to a fresh session with the given
    /// bankroll: counters zeroed, hand and wager cleared.
    pub fn reset(&mut self, balance: u32) {
        self.balance = balance;
        self.starting_balance = balance;
        self.bet = 0;
        self.wins = 0;
        self.losses = 0;
        self.pushes = 0;
        self.hand.clear();
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} hand={} value={} | bet=${} | balance=${}",
            self.name,
            self.hand,
            self.hand.value(),
            self.bet,
            self.balance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bet_within_balance_is_accepted() {
        let mut player = Player::new("Alice", 500);
        assert!(player.place_bet(100).is_ok());
        assert_eq!(player.bet(), 100);
        assert_eq!(player.balance(), 500);
    }

    #[test]
    fn bet_above_balance_is_rejected_without_side_effects() {
        let mut player = Player::new("Alice", 50);
        player.place_bet(25).unwrap();
        let err = player.place_bet(100).unwrap_err();
        assert!(err.message.contains("exceeds"));
        // Balance untouched and the previous wager still stands.
        assert_eq!(player.balance(), 50);
        assert_eq!(player.bet(), 25);
    }

    #[test]
    fn zero_bet_is_rejected() {
        let mut player = Player::new("Alice", 50);
        assert!(player.place_bet(0).is_err());
        assert_eq!(player.bet(), 0);
    }

    #[test]
    fn outcomes_move_money_and_counters() {
        let mut player = Player::new("Alice", 500);
        player.receive_card(10);
        player.hand_won(100);
        assert_eq!(player.balance(), 600);
        assert_eq!(player.wins(), 1);
        assert!(player.hand().is_empty());

        player.hand_lost(50);
        assert_eq!(player.balance(), 550);
        assert_eq!(player.losses(), 1);

        let before = player.balance();
        player.hand_push();
        assert_eq!(player.balance(), before);
        assert_eq!(player.pushes(), 1);

        assert_eq!(player.net(), 50);
    }

    #[test]
    fn reset_starts_a_fresh_session() {
        let mut player = Player::new("Alice", 500);
        player.place_bet(100).unwrap();
        player.receive_card(10);
        player.hand_won(100);
        player.reset(250);
        assert_eq!(player.balance(), 250);
        assert_eq!(player.starting_balance(), 250);
        assert_eq!(player.net(), 0);
        assert_eq!(player.wins(), 0);
        assert_eq!(player.bet(), 0);
        assert!(player.hand().is_empty());
    }
}
