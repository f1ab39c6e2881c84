use rand::seq::SliceRandom;
use rand::thread_rng;

/// Number of cards in a freshly built shoe.
pub const SHOE_SIZE: usize = 52;

/// The pool of undealt card ranks for a table. A rank is an integer from 2
/// through 11, where 10 stands for any ten valued card (10, J, Q, K) and 11 is
/// an ace counted high; suits are never tracked.
///
/// The shoe can never be observed in an invalid state: a draw from an empty
/// shoe rebuilds and reshuffles it first, so the table always has a gapless
/// supply of cards.
pub struct Shoe {
    cards: Vec<u8>,
}

impl Shoe {
    /// Associated function to create a new `Shoe`, built to the full 52 card
    /// composition and shuffled.
    pub fn new() -> Shoe {
        let mut shoe = Shoe {
            cards: Vec::with_capacity(SHOE_SIZE),
        };
        shoe.reset();
        shoe
    }

    /// Method for rebuilding the shoe to the canonical composition, four each
    /// of the ranks 2 through 9, sixteen tens and four aces, then shuffling.
    /// The thread local rng is reused across calls, so repeated resets within
    /// one process produce different orders.
    pub fn reset(&mut self) {
        self.cards.clear();
        for rank in 2u8..=9 {
            for _ in 0..4 {
                self.cards.push(rank);
            }
        }
        for _ in 0..16 {
            self.cards.push(10);
        }
        for _ in 0..4 {
            self.cards.push(11);
        }
        self.cards.shuffle(&mut thread_rng());
    }

    /// Method for dealing one card off the top of the shoe. An empty shoe is
    /// rebuilt and reshuffled before the deal, so this never fails.
    pub fn draw(&mut self) -> u8 {
        if self.cards.is_empty() {
            self.reset();
        }
        self.cards.pop().unwrap()
    }

    /// Read only view of the undealt cards; the next card dealt comes from the
    /// end of the slice. Peeking never replenishes an empty shoe, only `draw`
    /// does.
    pub fn peek(&self) -> &[u8] {
        &self.cards
    }

    /// Number of undealt cards remaining.
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

impl Default for Shoe {
    fn default() -> Shoe {
        Shoe::new()
    }
}
