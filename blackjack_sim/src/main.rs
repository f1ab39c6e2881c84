use blackjack_sim::game::strategy::{BasicStrategy, DealerMimic, StandOn};
use blackjack_sim::{MulPolicySimulator, SimulatorConfig};

fn main() {
    let mut simulator = MulPolicySimulator::new(SimulatorConfig::default())
        .simulation(DealerMimic)
        .simulation(StandOn::new(15))
        .simulation(StandOn::new(17))
        .simulation(BasicStrategy)
        .build();
    if let Err(e) = simulator.run(Box::new(std::io::stdout())) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
