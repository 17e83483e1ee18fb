mod basic;
mod fake_linux_input;
mod log;
mod manual_ctrl;
mod msg_define;
mod param;
mod scheduler;
mod ship_control;
mod sim;
mod sim_body;
mod utils;

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, PoisonError,
    },
};

use clap::{Args, Parser, Subcommand};

use crate::{
    manual_ctrl::AxisInput, param::PilotParams, scheduler::FixedStepScheduler, sim::ShipSim,
    utils::udp_scope::UdpScope,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None, arg_required_else_help(true))]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the ship loop lock-step and report where it ends up.
    Simulate(SimulateArgs),
    /// Fly the ship from the keyboard in real time.
    Fly {
        #[arg(short, long, value_name = "params.toml")]
        config: Option<PathBuf>,
    },
    /// Print the default parameters as TOML.
    Params,
}

#[derive(Args)]
struct SimulateArgs {
    #[arg(short, long, value_name = "params.toml")]
    config: Option<PathBuf>,

    /// target angle in degree, defaults to holding the start orientation
    #[arg(short, long, allow_hyphen_values = true, value_parser = parse_finite)]
    target: Option<f32>,

    #[arg(short = 'n', long, default_value_t = 500)]
    ticks: u64,

    /// constant turn input for the whole run
    #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true, value_parser = parse_finite)]
    input: f32,

    /// write every tick as json
    #[arg(long, value_name = "trace.json")]
    trace: Option<PathBuf>,

    /// stream angle, target, rate and torque to a udp scope
    #[arg(long, value_name = "host:port")]
    scope: Option<String>,
}

fn parse_finite(s: &str) -> Result<f32, String> {
    let val: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if val.is_finite() {
        Ok(val)
    } else {
        Err(format!("{s} is not a finite number"))
    }
}

fn load_params(config: Option<&PathBuf>) -> Result<PilotParams, param::ParamError> {
    match config {
        Some(path) => PilotParams::load(path),
        None => Ok(PilotParams::default()),
    }
}

fn simulate(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let params = load_params(args.config.as_ref())?;
    let input = Arc::new(AxisInput::new(args.input));

    let mut sim = ShipSim::new(&params, input);
    if args.trace.is_some() {
        sim = sim.with_recorder();
    }
    if let Some(addr) = &args.scope {
        sim = sim.with_scope(UdpScope::new(addr.as_str())?);
    }

    let mut sched = FixedStepScheduler::new(params.sim.step_hz).realtime(params.sim.realtime);
    sched.init(&mut sim);
    if let Some(target) = args.target {
        sim.ship_mut().set_target_angle(target);
    }
    sched.run_for(&mut sim, args.ticks);

    let ship = sim.ship();
    tracing::debug!(
        angle_gains = ?ship.angle_controller().gains(),
        angle_error = ship.angle_controller().last_error(),
        angle_integral = ship.angle_controller().integral(),
        velocity_gains = ?ship.velocity_controller().gains(),
        velocity_integral = ship.velocity_controller().integral(),
        "controller state"
    );

    let last = *sim.telemetry().lock().unwrap_or_else(PoisonError::into_inner);
    tracing::info!(
        ticks = sched.ticks(),
        time = last.time,
        angle = last.angle,
        target_angle = last.target_angle,
        angular_velocity = last.angular_velocity,
        "simulation finished"
    );
    println!(
        "t={:.2}s angle={:.3} target={:.3} rate={:.4}",
        last.time, last.angle, last.target_angle, last.angular_velocity
    );

    if let (Some(path), Some(recorder)) = (&args.trace, sim.recorder()) {
        recorder.write_json(path)?;
        tracing::info!("trace of {} ticks written to {}", recorder.samples().len(), path.display());
    }
    Ok(())
}

fn fly(config: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let params = load_params(config.as_ref())?;
    let input = Arc::new(AxisInput::default());
    let mut sim = ShipSim::new(&params, input.clone());
    let telemetry = sim.telemetry();
    let stop = Arc::new(AtomicBool::new(false));

    let sim_stop = stop.clone();
    let step_hz = params.sim.step_hz;
    let handle = std::thread::spawn(move || {
        FixedStepScheduler::new(step_hz)
            .realtime(true)
            .run_until(&mut sim, &sim_stop);
    });

    let ret = fake_linux_input::run_keyboard(&input, &telemetry, &params.input);
    stop.store(true, Ordering::Relaxed);
    handle.join().map_err(|_| "simulation thread panicked")?;
    Ok(ret?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    log::init();

    match cli.command {
        Command::Simulate(args) => simulate(args),
        Command::Fly { config } => fly(config),
        Command::Params => {
            print!("{}", PilotParams::default().to_toml_string()?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_reject_non_finite_args() {
        for bad in [["-t", "nan"], ["-i", "inf"], ["-i", "-inf"]] {
            let args = ["ship_pilot", "simulate", bad[0], bad[1]];
            assert!(Cli::try_parse_from(args).is_err(), "{:?} accepted", bad);
        }
        assert!(parse_finite("1.5").is_ok());
    }

    #[test]
    fn test_parse_simulate() {
        let cli = Cli::try_parse_from(["ship_pilot", "simulate", "-t", "-45", "-n", "100"]).unwrap();
        match cli.command {
            Command::Simulate(args) => {
                assert_eq!(args.target, Some(-45.0));
                assert_eq!(args.ticks, 100);
                assert_eq!(args.input, 0.0);
            }
            _ => panic!("wrong subcommand"),
        }
    }
}
