//! Command line front end: load a chip topology, plan a request, print the actuation sequence.

mod logging;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use valveroute::config::ChipConfig;
use valveroute::request::{normalize_name, parse_avoid, parse_inputs, parse_wait};
use valveroute::{Chip, Router, RoutingRequest, Session};

#[derive(Parser)]
#[command(name = "planner", version, about = "Plan valve actuation sequences for microfluidic chips")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Route fluid from one or more reservoirs to an output and print the sequence.
    Route {
        /// Chip topology (TOML).
        #[arg(long)]
        chip: PathBuf,

        /// Destination reservoir or perimeter valve.
        #[arg(short, long, default_value = "")]
        output: String,

        /// Inputs as `NAME:COUNT`, separated by `,` or `;`.
        #[arg(short, long, default_value = "")]
        inputs: String,

        /// Valve numbers to keep closed.
        #[arg(short, long, default_value = "")]
        avoid: String,

        /// Wait after every actuation, in milliseconds.
        #[arg(short, long, default_value = "")]
        wait: String,

        /// Free text carried into the plan.
        #[arg(short, long, default_value = "")]
        description: String,

        /// Print the plan as JSON instead of tokens.
        #[arg(long)]
        json: bool,

        /// Also draw the chip with the claimed valves.
        #[arg(long)]
        show: bool,
    },
    /// Draw a chip, optionally with valves blocked.
    Show {
        /// Chip topology (TOML).
        #[arg(long)]
        chip: PathBuf,

        /// Valve numbers to mark as blocked.
        #[arg(short, long, default_value = "")]
        avoid: String,
    },
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Route { chip, output, inputs, avoid, wait, description, json, show } => {
            let chip = load_chip(&chip)?;
            let mut request = RoutingRequest::new(normalize_name(&output))
                .avoid(parse_avoid(&avoid).context("parse --avoid")?)
                .wait(parse_wait(&wait))
                .describe(description);
            for demand in parse_inputs(&inputs).context("parse --inputs")? {
                request = request.input(demand.name, demand.valves);
            }
            cmd_route(&chip, &request, json, show)
        }
        Command::Show { chip, avoid } => {
            let chip = load_chip(&chip)?;
            let mut session = Session::default();
            session.block_valves(&chip, parse_avoid(&avoid).context("parse --avoid")?);
            print!("{}", chip.render(&session));
            Ok(())
        }
    }
}

fn load_chip(path: &Path) -> Result<Chip> {
    ChipConfig::load(path)
        .and_then(|config| config.build())
        .with_context(|| format!("load chip {}", path.display()))
}

fn cmd_route(chip: &Chip, request: &RoutingRequest, json: bool, show: bool) -> Result<()> {
    let mut session = Session::default();
    let plan = match Router::new(chip).plan(&mut session, request) {
        Ok(plan) => plan,
        Err(err) => {
            if show {
                eprint!("{}", chip.render(&session));
            }
            bail!("routing to {:?} failed: {err}", request.output);
        }
    };
    info!(ops = plan.ops.len(), wait_ms = plan.total_wait_ms(), "routed");

    if json {
        println!("{}", serde_json::to_string_pretty(&plan).context("serialize plan")?);
    } else {
        if !plan.description.is_empty() {
            println!("# {}", plan.description);
        }
        println!("{}", plan);
    }

    if show {
        print!("{}", chip.render(&session));
    }
    Ok(())
}
