use actix_web::{
    body::BoxBody,
    error, get,
    http::{header::ContentType, StatusCode},
    post, web, App, HttpResponse, HttpServer,
};
use blackjack_sim::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::sync::mpsc::Receiver;
use std::sync::Mutex;

/// A struct for handling the configurations of the table. Meant to be
/// deserialized from JSON.
#[derive(Debug, Deserialize)]
struct GameConfig {
    player_starting_balance: u32,
    num_players: Option<usize>,
    num_simulations: u32,
    rounds_per_simulation: u32,
    min_bet: u32,
    soft_seventeen: Option<bool>,
}

impl From<GameConfig> for SimulatorConfig {
    fn from(value: GameConfig) -> Self {
        SimulatorConfig::new()
            .player_starting_balance(value.player_starting_balance)
            .num_players(value.num_players.unwrap_or(2))
            .num_simulations(value.num_simulations)
            .rounds_per_simulation(value.rounds_per_simulation)
            .min_bet(value.min_bet)
            .soft_seventeen(value.soft_seventeen.unwrap_or(false))
            .build()
    }
}

/// A struct for deserializing a policy choice from JSON.
#[derive(Deserialize)]
struct SimConfig {
    policy: String,
    stand_threshold: Option<u8>,
}

/// An enum that will handle user facing errors.
#[derive(Debug)]
enum UserError {
    InternalError,
    SimulationCreationError(String),
    SimulatorNotCreated,
    BadInput(String),
}

impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserError::InternalError => write!(f, "an internal error occurred"),
            UserError::SimulationCreationError(ref s) => write!(f, "{}", s),
            UserError::SimulatorNotCreated => write!(
                f,
                "unable to add simulation, a simulator has not been created"
            ),
            UserError::BadInput(s) => write!(f, "{}", s),
        }
    }
}

impl std::error::Error for UserError {}

impl error::ResponseError for UserError {
    fn error_response(&self) -> HttpResponse<BoxBody> {
        HttpResponse::build(self.status_code())
            .content_type(ContentType::html())
            .body(self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            UserError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            UserError::SimulationCreationError(_) => StatusCode::BAD_REQUEST,
            UserError::SimulatorNotCreated => StatusCode::BAD_REQUEST,
            UserError::BadInput(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// A struct for collecting `SimulationSummary` data into something that can
/// serialize into JSON.
#[derive(Serialize)]
struct SimulationSummaryJson {
    pub policy: String,
    pub wins: i32,
    pub pushes: i32,
    pub losses: i32,
    pub early_endings: i32,
    pub winnings: i64,
    pub num_rounds: u32,
    pub player_naturals: i32,
    pub total_hands_played: i32,
    pub win_pct: f32,
    pub push_pct: f32,
    pub lose_pct: f32,
    pub avg_winnings_per_hand: f32,
}

impl From<SimulationSummary> for SimulationSummaryJson {
    fn from(summary: SimulationSummary) -> Self {
        let total_hands_played = summary.wins + summary.pushes + summary.losses;
        let denom = i32::max(total_hands_played, 1) as f32;
        SimulationSummaryJson {
            policy: summary.label,
            wins: summary.wins,
            pushes: summary.pushes,
            losses: summary.losses,
            early_endings: summary.early_endings,
            winnings: summary.winnings,
            num_rounds: summary.num_rounds,
            player_naturals: summary.player_naturals,
            total_hands_played,
            win_pct: (summary.wins as f32) / denom,
            push_pct: (summary.pushes as f32) / denom,
            lose_pct: (summary.losses as f32) / denom,
            avg_winnings_per_hand: (summary.winnings as f32) / denom,
        }
    }
}

/// A struct for collecting all of the simulation summaries keyed by id.
#[derive(Serialize)]
struct SimulationSummaryMap {
    summaries: HashMap<usize, SimulationSummaryJson>,
}

/// A collector that can be passed to `MulPolicySimulator::run_return_out`,
/// producing the final summaries as a JSON string. Each summary received
/// carries the running totals for its id, so only the latest is kept.
fn write_simulation_summary_as_json(
    receiver: Receiver<(Option<SimulationSummary>, usize)>,
    mut ids: HashSet<usize>,
) -> Result<String, Box<dyn Error + Send + 'static>> {
    let mut summaries_map = SimulationSummaryMap {
        summaries: HashMap::new(),
    };

    while let Ok(message) = receiver.recv() {
        match message {
            (Some(cur_summary), id) => {
                summaries_map
                    .summaries
                    .insert(id, SimulationSummaryJson::from(cur_summary));
            }
            (None, id) => {
                ids.remove(&id);
                if ids.is_empty() {
                    break;
                }
            }
        }
    }

    match serde_json::to_string(&summaries_map) {
        Ok(res) => Ok(res),
        Err(_) => Err(Box::new(UserError::InternalError)),
    }
}

/// Helper function to create a decision policy trait object at runtime.
fn create_policy(
    name: &str,
    stand_threshold: Option<u8>,
) -> Result<Box<dyn PlayPolicy + Send + 'static>, &'static str> {
    match name {
        "basic" => Ok(Box::new(BasicStrategy)),
        "mimic" => Ok(Box::new(DealerMimic)),
        "stand-on" => match stand_threshold {
            Some(threshold) => Ok(Box::new(StandOn::new(threshold))),
            None => Err("stand-on policy requires a stand_threshold"),
        },
        _ => Err("policy not recognized"),
    }
}

/// A handler that will configure and build a new `MulPolicySimulator` using
/// the parameters in the body of the request.
#[post("/config-game-params")]
async fn configure_simulation_parameters(
    params: web::Json<GameConfig>,
    app_sim: web::Data<Mutex<Option<MulPolicySimulator>>>,
) -> Result<HttpResponse, UserError> {
    let config = SimulatorConfig::from(params.into_inner());
    let mut guard = if let Ok(g) = app_sim.lock() {
        g
    } else {
        return Err(UserError::InternalError);
    };

    *guard = Some(MulPolicySimulator::new(config).build());
    Ok(HttpResponse::Ok().body("simulator created successfully"))
}

/// A handler that will add a simulation for the named policy to the
/// simulator.
#[post("/add-sim")]
async fn add_simulation(
    sim_params: web::Json<SimConfig>,
    app_sim: web::Data<Mutex<Option<MulPolicySimulator>>>,
) -> Result<HttpResponse, UserError> {
    let mut guard = if let Ok(g) = app_sim.lock() {
        g
    } else {
        return Err(UserError::InternalError);
    };

    if let Some(simulator) = guard.as_mut() {
        match create_policy(sim_params.policy.as_str(), sim_params.stand_threshold) {
            Ok(policy) => {
                simulator.add_simulation(policy);
                return Ok(HttpResponse::Ok().body("simulation added successfully"));
            }
            Err(msg) => return Err(UserError::SimulationCreationError(msg.to_owned())),
        }
    }

    Err(UserError::SimulatorNotCreated)
}

/// A handler that will run the configured simulations. Returns an error
/// response if the simulator has not been configured or no simulations have
/// been added.
#[get("/run-sim")]
async fn run_simulation(
    app_sim: web::Data<Mutex<Option<MulPolicySimulator>>>,
) -> Result<HttpResponse, UserError> {
    if let Ok(mut guard) = app_sim.lock() {
        if let Some(simulator) = guard.as_mut() {
            if simulator.simulations().is_empty() {
                return Err(UserError::BadInput(String::from(
                    "no simulations have been added, unable to run.",
                )));
            }
            match simulator.run_return_out(write_simulation_summary_as_json) {
                Ok(res_as_json) => {
                    return Ok(HttpResponse::Ok()
                        .content_type(ContentType::json())
                        .body(res_as_json));
                }
                Err(_e) => return Err(UserError::InternalError),
            }
        }
    }

    Err(UserError::SimulatorNotCreated)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let address = "127.0.0.1";
    let port = 8080;
    println!("Listening at {}:{}...", address, port);

    let app_sim: web::Data<Mutex<Option<MulPolicySimulator>>> = web::Data::new(Mutex::new(None));

    HttpServer::new(move || {
        App::new()
            .app_data(app_sim.clone())
            .service(configure_simulation_parameters)
            .service(add_simulation)
            .service(run_simulation)
    })
    .bind((address, port))?
    .run()
    .await
}
