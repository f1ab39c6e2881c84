use blackjack_lib::{BlackjackTable, Player};
use blackjack_sim::game::strategy::{BasicStrategy, DealerMimic, PlayPolicy, StandOn};
use blackjack_sim::game::BlackjackGameSim;
use clap::Parser;

/// Play a number of automated blackjack rounds at one table and print the
/// results.
#[derive(Parser)]
#[command(name = "play_rounds")]
struct Cli {
    /// Number of rounds to play
    #[arg(long, default_value_t = 100)]
    rounds: u32,

    /// Number of seats at the table
    #[arg(long, default_value_t = 2)]
    players: usize,

    /// Starting bankroll per seat
    #[arg(long, default_value_t = 500)]
    balance: u32,

    /// Flat wager posted each round
    #[arg(long, default_value_t = 5)]
    bet: u32,

    /// Decision policy: "basic", "mimic", or "stand-on-N"
    #[arg(long, default_value = "basic")]
    policy: String,

    /// Dealer hits soft seventeen
    #[arg(long)]
    soft_seventeen: bool,
}

fn parse_policy(name: &str) -> Option<Box<dyn PlayPolicy + Send>> {
    match name {
        "basic" => Some(Box::new(BasicStrategy)),
        "mimic" => Some(Box::new(DealerMimic)),
        _ => {
            let threshold = name.strip_prefix("stand-on-")?.parse::<u8>().ok()?;
            Some(Box::new(StandOn::new(threshold)))
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let policy = match parse_policy(&cli.policy) {
        Some(p) => p,
        None => {
            eprintln!("error: unrecognized policy '{}'", cli.policy);
            std::process::exit(1);
        }
    };

    let mut table = BlackjackTable::new(cli.soft_seventeen);
    for seat in 0..cli.players {
        table.add_player(Player::new(format!("seat {}", seat + 1), cli.balance));
    }

    let mut game = BlackjackGameSim::new(table, policy, cli.rounds, cli.bet);
    if let Err(e) = game.run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }

    println!("policy: {}", game.label());
    game.display_stats();
}
