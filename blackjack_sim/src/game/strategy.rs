use lazy_static::lazy_static;
use std::collections::HashMap;

/// Snapshot of everything a policy may look at when playing the current
/// hand. Built by the round driver from the table's query surface; policies
/// never touch the table directly.
#[derive(Debug, Clone, Copy)]
pub struct TableState {
    pub hand_value: u8,
    pub soft: bool,
    pub dealers_up_card: u8,
    pub bet: u32,
    pub balance: u32,
}

/// The decision a policy hands back to the round driver for the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerDecision {
    Hit,
    Stand,
}

/// Trait for a player decision policy. The round engine treats the player
/// turn as an external collaborator; implementers of this trait are those
/// collaborators. The driver keeps asking until the policy stands or the
/// hand busts.
pub trait PlayPolicy {
    /// Required method, returns the play for the current hand.
    fn decide(&self, state: &TableState) -> PlayerDecision;
    /// Required method, a short human readable name for reporting.
    fn label(&self) -> String;
}

impl<P: PlayPolicy + ?Sized> PlayPolicy for Box<P> {
    fn decide(&self, state: &TableState) -> PlayerDecision {
        (**self).decide(state)
    }

    fn label(&self) -> String {
        (**self).label()
    }
}

/// Policy that plays exactly like the house: hit on 16 or less, stand on 17
/// and up, soft or hard.
pub struct DealerMimic;

impl PlayPolicy for DealerMimic {
    fn decide(&self, state: &TableState) -> PlayerDecision {
        if state.hand_value <= 16 {
            PlayerDecision::Hit
        } else {
            PlayerDecision::Stand
        }
    }

    fn label(&self) -> String {
        String::from("dealer mimic")
    }
}

/// Policy that stands once the hand reaches a fixed total.
pub struct StandOn {
    threshold: u8,
}

impl StandOn {
    /// Associated method for returning a new `StandOn` policy.
    pub fn new(threshold: u8) -> StandOn {
        StandOn { threshold }
    }
}

impl PlayPolicy for StandOn {
    fn decide(&self, state: &TableState) -> PlayerDecision {
        if state.hand_value < self.threshold {
            PlayerDecision::Hit
        } else {
            PlayerDecision::Stand
        }
    }

    fn label(&self) -> String {
        format!("stand on {}", self.threshold)
    }
}

lazy_static! {
    /// Hit or stand chart for hard totals, keyed by (player total, dealer up
    /// card). Up cards run 2 through 11 with 11 the ace.
    static ref HARD_TOTALS: HashMap<(u8, u8), PlayerDecision> = {
        let mut chart = HashMap::new();
        for total in 4u8..=21 {
            for up_card in 2u8..=11 {
                let decision = match total {
                    12 => match up_card {
                        4..=6 => PlayerDecision::Stand,
                        _ => PlayerDecision::Hit,
                    },
                    13..=16 => match up_card {
                        2..=6 => PlayerDecision::Stand,
                        _ => PlayerDecision::Hit,
                    },
                    17..=21 => PlayerDecision::Stand,
                    _ => PlayerDecision::Hit,
                };
                chart.insert((total, up_card), decision);
            }
        }
        chart
    };

    /// Hit or stand chart for soft totals (an ace still counted as 11).
    static ref SOFT_TOTALS: HashMap<(u8, u8), PlayerDecision> = {
        let mut chart = HashMap::new();
        for total in 12u8..=21 {
            for up_card in 2u8..=11 {
                let decision = match total {
                    18 => match up_card {
                        2..=8 => PlayerDecision::Stand,
                        _ => PlayerDecision::Hit,
                    },
                    19..=21 => PlayerDecision::Stand,
                    _ => PlayerDecision::Hit,
                };
                chart.insert((total, up_card), decision);
            }
        }
        chart
    };
}

/// Chart based hit or stand policy against the dealer's up card. The double
/// down and split columns of the usual charts are collapsed to hit or stand,
/// since the table offers neither play.
pub struct BasicStrategy;

impl PlayPolicy for BasicStrategy {
    fn decide(&self, state: &TableState) -> PlayerDecision {
        let chart = if state.soft {
            &*SOFT_TOTALS
        } else {
            &*HARD_TOTALS
        };
        chart
            .get(&(state.hand_value, state.dealers_up_card))
            .copied()
            .unwrap_or(PlayerDecision::Stand)
    }

    fn label(&self) -> String {
        String::from("basic strategy")
    }
}
