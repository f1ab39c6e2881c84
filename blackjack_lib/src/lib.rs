//! Core library for a multi player game of blackjack against a house dealer.
//! Provides the card shoe, hand valuation under the ace rules, the player and
//! dealer participant types, and the `BlackjackTable` round engine that deals,
//! drives the dealer and settles wagers.
//!
//! The library performs no I/O of its own; a presentation layer (the
//! `blackjack_sim` crate, a CLI, or a test harness) drives a table through the
//! round phases and consumes the settlement records it produces.

pub mod dealer;
pub mod errors;
pub mod hand;
pub mod player;
pub mod shoe;
pub mod table;

pub use dealer::{Dealer, DealerState};
pub use errors::BlackjackGameError;
pub use hand::Hand;
pub use player::Player;
pub use shoe::Shoe;
pub use table::{BlackjackTable, Outcome, RoundPhase, Settlement};
