//! Simulation harness for the blackjack round engine. Seats automated
//! players at `blackjack_lib` tables, plays complete rounds with pluggable
//! decision policies, and compares policies side by side, each one running in
//! its own thread with the results funneled to a single writer.

pub mod game;
pub mod write;

pub use game::prelude::*;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;
use std::io::Write;
use std::sync::mpsc::{self, Receiver};
use std::thread;

pub mod prelude {
    pub use super::{
        MulPolicySimulator, MulPolicySimulatorBuilder, PolicySimulator, SimulationError,
        SimulationSummary, SimulatorConfig, SimulatorConfigBuilder, TableSimulation,
    };
    pub use crate::game::prelude::*;
}

/// Simple struct for recording all of the interesting data points accumulated
/// during a simulation.
pub struct SimulationSummary {
    pub wins: i32,
    pub pushes: i32,
    pub losses: i32,
    pub early_endings: i32,
    pub winnings: i64,
    pub num_rounds: u32,
    pub player_naturals: i32,
    pub label: String,
}

impl Display for SimulationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const WIDTH: usize = 80;
        const TEXT_WIDTH: usize = "number of player naturals".len() + 20;
        const NUM_WIDTH: usize = WIDTH - TEXT_WIDTH;
        let total_hands = self.wins + self.losses + self.pushes;
        let denom = i32::max(total_hands, 1) as f32;
        let body = format!(
            "{}{}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.3}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.3}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.3}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.3}\n",
            "policy: ",
            self.label,
            "hands won",
            self.wins,
            "hands pushed",
            self.pushes,
            "hands lost",
            self.losses,
            "winnings",
            self.winnings,
            "number of player naturals",
            self.player_naturals,
            "number of early endings",
            self.early_endings,
            "total hands played",
            total_hands,
            "win percentage",
            (self.wins as f32) / denom,
            "push percentage",
            (self.pushes as f32) / denom,
            "loss percentage",
            (self.losses as f32) / denom,
            "average winnings per hand",
            (self.winnings as f32) / denom
        );
        write!(f, "{}", body)
    }
}

#[derive(Debug)]
pub enum SimulationError {
    GameError(String),
    SendingError(String),
    WriteError(String),
}

impl Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::GameError(s)
            | SimulationError::SendingError(s)
            | SimulationError::WriteError(s) => write!(f, "{}", s),
        }
    }
}

impl Error for SimulationError {}

/// Trait for anything that can be run as one simulation by the parallel
/// simulator, erasing the concrete policy type.
pub trait TableSimulation: Send {
    /// Required method, runs every configured simulation back to back.
    fn run(&mut self) -> Result<(), BlackjackGameError>;
    /// Required method, runs a single simulation without resetting afterwards
    /// and without console output.
    fn run_single_simulation(&mut self) -> Result<(), BlackjackGameError>;
    /// Required method, displays the stats recorded so far.
    fn display_stats(&self);
    /// Required method, resets the simulation so it can run again.
    fn reset(&mut self);
    /// Required method, produces the summary of everything recorded so far.
    fn summary(&self) -> SimulationSummary;
}

/// Struct for running a number of simulations of one decision policy. Wraps a
/// `BlackjackGameSim` and replays it `num_simulations` times with fresh
/// bankrolls, accumulating the results across runs.
pub struct PolicySimulator<P: PlayPolicy> {
    game: BlackjackGameSim<P>,
    player_starting_balance: u32,
    num_simulations: u32,
    rounds_per_simulation: u32,
    accumulated_wins: i32,
    accumulated_pushes: i32,
    accumulated_losses: i32,
    accumulated_winnings: i64,
    num_early_endings: i32,
    num_player_naturals: i32,
    silent: bool,
}

impl<P: PlayPolicy> PolicySimulator<P> {
    /// Associated method for building a simulator from a policy and the
    /// shared configuration: seats the configured number of players, each
    /// with the starting bankroll, at a table with the configured dealer
    /// rule.
    pub fn new(policy: P, config: &SimulatorConfig) -> PolicySimulator<P> {
        let mut table = BlackjackTable::new(config.soft_seventeen);
        for seat in 0..config.num_players {
            table.add_player(Player::new(
                format!("seat {}", seat + 1),
                config.player_starting_balance,
            ));
        }
        let game = BlackjackGameSim::new(table, policy, config.rounds_per_simulation, config.min_bet);
        PolicySimulator {
            game,
            player_starting_balance: config.player_starting_balance,
            num_simulations: config.num_simulations,
            rounds_per_simulation: config.rounds_per_simulation,
            accumulated_wins: 0,
            accumulated_pushes: 0,
            accumulated_losses: 0,
            accumulated_winnings: 0,
            num_early_endings: 0,
            num_player_naturals: 0,
            silent: config.silent,
        }
    }

    fn record_game_stats(&mut self) {
        self.accumulated_wins += self.game.total_wins;
        self.accumulated_pushes += self.game.total_pushes;
        self.accumulated_losses += self.game.total_losses;
        self.accumulated_winnings += self.game.total_winnings;
        self.num_player_naturals += self.game.num_player_naturals;
        if self.game.ended_early {
            self.num_early_endings += 1;
        }
    }
}

impl<P: PlayPolicy + Send> TableSimulation for PolicySimulator<P> {
    /// Method that runs all configured simulations, recording the data from
    /// each and resetting bankrolls in between.
    fn run(&mut self) -> Result<(), BlackjackGameError> {
        for i in 0..self.num_simulations {
            self.game.run()?;
            self.record_game_stats();
            if !self.silent {
                println!("simulation #{}", i + 1);
                self.game.display_stats();
            }
            self.game.reset(self.player_starting_balance);
        }
        Ok(())
    }

    /// Method to run a single simulation. The state of the simulation is not
    /// reset afterwards.
    fn run_single_simulation(&mut self) -> Result<(), BlackjackGameError> {
        self.game.run()?;
        self.record_game_stats();
        if !self.silent {
            self.game.display_stats();
        }
        Ok(())
    }

    /// Method that displays the accumulated data recorded from all
    /// simulations run so far.
    fn display_stats(&self) {
        const WIDTH: usize = 80;
        const TEXT_WIDTH: usize = "number of player naturals:".len() + 20;
        const NUMERIC_WIDTH: usize = WIDTH - TEXT_WIDTH;

        println!("{}", "-".repeat(WIDTH));
        println!(
            "{:-^WIDTH$}",
            format!("running {} simulations", self.num_simulations)
        );
        println!(
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}",
            "total wins:", self.accumulated_wins
        );
        println!(
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}",
            "total pushes:", self.accumulated_pushes
        );
        println!(
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}",
            "total losses:", self.accumulated_losses
        );
        println!(
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}",
            "total winnings:", self.accumulated_winnings
        );
        println!(
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}",
            "number of player naturals:", self.num_player_naturals
        );
        println!(
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}",
            "number of early endings:", self.num_early_endings
        );
        println!("{}", "-".repeat(WIDTH));
    }

    /// Method for resetting the underlying game so another simulation can
    /// run. Accumulated stats are kept.
    fn reset(&mut self) {
        self.game.reset(self.player_starting_balance);
    }

    /// Method to get a `SimulationSummary` derived from the data recorded so
    /// far.
    fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            wins: self.accumulated_wins,
            pushes: self.accumulated_pushes,
            losses: self.accumulated_losses,
            early_endings: self.num_early_endings,
            winnings: self.accumulated_winnings,
            num_rounds: self.num_simulations * self.rounds_per_simulation,
            player_naturals: self.num_player_naturals,
            label: self.game.label(),
        }
    }
}

/// Struct for comparing multiple decision policies at once under one shared
/// configuration. Each policy runs in its own thread; summaries flow over a
/// channel to a writer that reports once every policy finishes.
pub struct MulPolicySimulator {
    simulations: Vec<Box<dyn TableSimulation>>,
    pub config: SimulatorConfig,
}

impl MulPolicySimulator {
    /// Method that returns a new `MulPolicySimulatorBuilder` object.
    pub fn new(config: SimulatorConfig) -> MulPolicySimulatorBuilder {
        MulPolicySimulatorBuilder {
            simulations: None,
            config,
        }
    }

    pub fn simulations(&self) -> &[Box<dyn TableSimulation>] {
        &self.simulations
    }

    /// Method for adding a simulation for `policy` under the shared
    /// configuration.
    pub fn add_simulation<P: PlayPolicy + Send + 'static>(&mut self, policy: P) {
        let simulation: Box<dyn TableSimulation> =
            Box::new(PolicySimulator::new(policy, &self.config));
        self.simulations.push(simulation);
    }

    /// Method that runs every added policy in parallel and writes the final
    /// formatted summaries to `file_out`.
    pub fn run(&mut self, file_out: Box<dyn Write + Send + 'static>) -> Result<(), SimulationError> {
        let mut file_out = file_out;
        self.run_collect(move |receiver, ids| {
            write::write_summaries(receiver, ids, &mut file_out)
                .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)
        })
    }

    /// Method that runs every added policy in parallel and hands the summary
    /// channel to `collector`, returning whatever output it produces. Used by
    /// callers that want the results in a custom format, for example as JSON.
    pub fn run_return_out<T, F>(&mut self, collector: F) -> Result<T, SimulationError>
    where
        T: Send + 'static,
        F: FnOnce(
                Receiver<(Option<SimulationSummary>, usize)>,
                HashSet<usize>,
            ) -> Result<T, Box<dyn Error + Send + 'static>>
            + Send
            + 'static,
    {
        self.run_collect(collector)
    }

    fn run_collect<T, F>(&mut self, collector: F) -> Result<T, SimulationError>
    where
        T: Send + 'static,
        F: FnOnce(
                Receiver<(Option<SimulationSummary>, usize)>,
                HashSet<usize>,
            ) -> Result<T, Box<dyn Error + Send + 'static>>
            + Send
            + 'static,
    {
        let (sender, receiver) = mpsc::channel::<(Option<SimulationSummary>, usize)>();

        // Unique ids per simulation so the collector knows when each one is
        // done.
        let ids: HashSet<usize> = HashSet::from_iter(1..=self.simulations.len());
        let collector_handle = thread::spawn(move || collector(receiver, ids));

        let mut handles = vec![];
        self.simulations.reverse();
        let mut id = 1usize;
        let num_simulations = self.config.num_simulations;

        while let Some(mut simulation) = self.simulations.pop() {
            let sender_clone = sender.clone();

            let handle = thread::spawn(move || {
                for _ in 0..num_simulations {
                    if let Err(e) = simulation.run_single_simulation() {
                        return Err(SimulationError::GameError(e.message));
                    }
                    // Send the running totals; the collector keeps the latest
                    // summary per id.
                    let summary = simulation.summary();
                    if let Err(e) = sender_clone.send((Some(summary), id)) {
                        return Err(SimulationError::SendingError(format!("{}", e)));
                    }
                    simulation.reset();
                }
                // Tell the collector this simulation is finished.
                if let Err(e) = sender_clone.send((None, id)) {
                    return Err(SimulationError::SendingError(format!("{}", e)));
                }
                Ok(())
            });

            handles.push(handle);
            id += 1;
        }
        drop(sender);

        for (i, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.join().unwrap() {
                eprintln!("error occurred for simulation #{}", i + 1);
                return Err(e);
            }
        }

        match collector_handle.join().unwrap() {
            Ok(out) => Ok(out),
            Err(e) => Err(SimulationError::WriteError(format!("{}", e))),
        }
    }
}

/// Struct for building a `MulPolicySimulator` object.
pub struct MulPolicySimulatorBuilder {
    simulations: Option<Vec<Box<dyn TableSimulation>>>,
    config: SimulatorConfig,
}

impl MulPolicySimulatorBuilder {
    /// Method for adding a policy to the comparison; the rest of the
    /// simulation parameters come from the shared config passed at creation.
    pub fn simulation<P: PlayPolicy + Send + 'static>(&mut self, policy: P) -> &mut Self {
        let simulation: Box<dyn TableSimulation> =
            Box::new(PolicySimulator::new(policy, &self.config));
        if let Some(ref mut sim_vec) = self.simulations {
            sim_vec.push(simulation);
        } else {
            self.simulations = Some(vec![simulation]);
        }
        self
    }

    /// Method that builds the `MulPolicySimulator` object.
    pub fn build(&mut self) -> MulPolicySimulator {
        MulPolicySimulator {
            simulations: self.simulations.take().unwrap_or_default(),
            config: self.config,
        }
    }
}

/// Struct for configuring the simulations run by a `PolicySimulator`.
#[derive(Clone, Copy)]
pub struct SimulatorConfig {
    pub player_starting_balance: u32,
    pub num_players: usize,
    pub num_simulations: u32,
    pub rounds_per_simulation: u32,
    pub min_bet: u32,
    pub soft_seventeen: bool,
    pub silent: bool,
}

impl SimulatorConfig {
    /// Associated method for returning a new `SimulatorConfigBuilder` object,
    /// allowing the caller to pick the table parameters: seats, bankrolls,
    /// rounds, the dealer's soft seventeen rule, and so on.
    pub fn new() -> SimulatorConfigBuilder {
        SimulatorConfigBuilder {
            player_starting_balance: None,
            num_players: None,
            num_simulations: None,
            rounds_per_simulation: None,
            min_bet: None,
            soft_seventeen: None,
            silent: None,
        }
    }
}

impl Default for SimulatorConfig {
    /// Returns the standard configuration for a table.
    fn default() -> Self {
        SimulatorConfig::new().build()
    }
}

/// Struct to implement the builder pattern for `SimulatorConfig`.
#[derive(Clone, Copy)]
pub struct SimulatorConfigBuilder {
    player_starting_balance: Option<u32>,
    num_players: Option<usize>,
    num_simulations: Option<u32>,
    rounds_per_simulation: Option<u32>,
    min_bet: Option<u32>,
    soft_seventeen: Option<bool>,
    silent: Option<bool>,
}

impl SimulatorConfigBuilder {
    /// Method for setting the starting bankroll of every seat.
    pub fn player_starting_balance(&mut self, balance: u32) -> &mut Self {
        self.player_starting_balance = Some(balance);
        self
    }

    /// Method for setting the number of seats at each table.
    pub fn num_players(&mut self, players: usize) -> &mut Self {
        self.num_players = Some(players);
        self
    }

    /// Method for setting the number of simulations run per policy.
    pub fn num_simulations(&mut self, n: u32) -> &mut Self {
        self.num_simulations = Some(n);
        self
    }

    /// Method for setting how many rounds each simulation plays.
    pub fn rounds_per_simulation(&mut self, rounds: u32) -> &mut Self {
        self.rounds_per_simulation = Some(rounds);
        self
    }

    /// Method for setting the flat wager posted each round.
    pub fn min_bet(&mut self, bet: u32) -> &mut Self {
        self.min_bet = Some(bet);
        self
    }

    /// Method for setting the flag that makes the dealer hit soft seventeens,
    /// default is false.
    pub fn soft_seventeen(&mut self, seventeen: bool) -> &mut Self {
        self.soft_seventeen = Some(seventeen);
        self
    }

    /// Method for setting the silent flag; when false each simulation prints
    /// its stats as it completes.
    pub fn silent(&mut self, silent: bool) -> &mut Self {
        self.silent = Some(silent);
        self
    }

    /// Method for building a `SimulatorConfig` object from the builder.
    pub fn build(&mut self) -> SimulatorConfig {
        SimulatorConfig {
            player_starting_balance: self.player_starting_balance.unwrap_or(500),
            num_players: self.num_players.unwrap_or(2),
            num_simulations: self.num_simulations.unwrap_or(100),
            rounds_per_simulation: self.rounds_per_simulation.unwrap_or(50),
            min_bet: self.min_bet.unwrap_or(5),
            soft_seventeen: self.soft_seventeen.unwrap_or(false),
            silent: self.silent.unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::strategy::{BasicStrategy, DealerMimic, StandOn};

    #[test]
    fn simple_simulation_test() {
        let config = SimulatorConfig::new()
            .num_simulations(5)
            .rounds_per_simulation(40)
            .num_players(3)
            .build();
        let mut simulator = PolicySimulator::new(BasicStrategy, &config);

        if let Err(e) = simulator.run() {
            panic!("error: {}", e);
        }

        simulator.display_stats();
        let summary = simulator.summary();
        assert_eq!(summary.label, "basic strategy");
        assert!(summary.wins + summary.losses + summary.pushes > 0);
    }

    #[test]
    fn run_multiple_simulations() {
        let config = SimulatorConfig::new()
            .num_simulations(3)
            .rounds_per_simulation(25)
            .build();
        let mut simulator = MulPolicySimulator::new(config)
            .simulation(DealerMimic)
            .simulation(StandOn::new(15))
            .simulation(BasicStrategy)
            .build();

        if let Err(e) = simulator.run(Box::new(std::io::sink())) {
            eprintln!("{}", e);
            panic!();
        }
    }

    #[test]
    fn config_defaults_are_stable() {
        let config = SimulatorConfig::default();
        assert_eq!(config.player_starting_balance, 500);
        assert_eq!(config.num_players, 2);
        assert_eq!(config.min_bet, 5);
        assert!(!config.soft_seventeen);
        assert!(config.silent);
    }
}
