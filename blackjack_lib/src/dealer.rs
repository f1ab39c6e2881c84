use crate::hand::Hand;

/// State of the dealer's fixed drawing policy. `Standing` is terminal for the
/// round, whether the dealer stopped on a made hand or busted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealerState {
    Drawing,
    Standing,
}

/// The house side of the table: a hand plus the configured soft seventeen
/// rule. The dealer has no bankroll and no wager; it is only the comparison
/// baseline for settlement. By default the dealer stands on all 17s; with
/// `hit_soft_seventeen` set it keeps drawing on a soft 17.
#[derive(Debug, Clone)]
pub struct Dealer {
    hand: Hand,
    hit_soft_seventeen: bool,
}

impl Dealer {
    /// Associated function to create a new `Dealer` with the given soft
    /// seventeen rule.
    pub fn new(hit_soft_seventeen: bool) -> Dealer {
        Dealer {
            hand: Hand::new(),
            hit_soft_seventeen,
        }
    }

    pub fn hits_soft_seventeen(&self) -> bool {
        self.hit_soft_seventeen
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

    /// The dealer's face up card, the first card dealt. The second card stays
    /// hidden from the query surface until the dealer plays out.
    pub fn up_card(&self) -> Option<u8> {
        self.hand.cards().first().copied()
    }

    /// Transition rule of the drawing policy, evaluated after every draw:
    /// draw on 16 or less, draw on soft 17 when configured to, stand on
    /// everything else (a bust stands terminally).
    pub fn state(&self) -> DealerState {
        let value = self.hand.value();
        if value > 21 {
            DealerState::Standing
        } else if value <= 16 {
            DealerState::Drawing
        } else if value == 17 && self.hit_soft_seventeen && self.hand.is_soft() {
            DealerState::Drawing
        } else {
            DealerState::Standing
        }
    }

    pub fn clear_hand(&mut self) {
        self.hand.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dealer_with(cards: &[u8], hit_soft_seventeen: bool) -> Dealer {
        let mut dealer = Dealer::new(hit_soft_seventeen);
        for &card in cards {
            dealer.receive_card(card);
        }
        dealer
    }

    #[test]
    fn dealer_draws_below_seventeen() {
        assert_eq!(dealer_with(&[10, 6], false).state(), DealerState::Drawing);
        assert_eq!(dealer_with(&[2, 3], false).state(), DealerState::Drawing);
        assert_eq!(dealer_with(&[10, 2, 4], false).state(), DealerState::Drawing);
    }

    #[test]
    fn dealer_stands_on_hard_seventeen_and_up() {
        assert_eq!(dealer_with(&[10, 7], false).state(), DealerState::Standing);
        assert_eq!(dealer_with(&[10, 7], true).state(), DealerState::Standing);
        assert_eq!(dealer_with(&[10, 9], false).state(), DealerState::Standing);
    }

    #[test]
    fn soft_seventeen_follows_the_configured_rule() {
        // Ace and six: stands by default, draws when the flag is set.
        assert_eq!(dealer_with(&[11, 6], false).state(), DealerState::Standing);
        assert_eq!(dealer_with(&[11, 6], true).state(), DealerState::Drawing);
        // Soft 18 stands under both rules.
        assert_eq!(dealer_with(&[11, 7], true).state(), DealerState::Standing);
    }

    #[test]
    fn bust_is_terminal() {
        assert_eq!(
            dealer_with(&[10, 6, 8], false).state(),
            DealerState::Standing
        );
        assert_eq!(dealer_with(&[10, 6, 8], true).state(), DealerState::Standing);
    }

    #[test]
    fn up_card_is_the_first_card_only() {
        let dealer = dealer_with(&[10, 7], false);
        assert_eq!(dealer.up_card(), Some(10));
        assert_eq!(Dealer::new(false).up_card(), None);
    }
}
