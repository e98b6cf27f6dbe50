//! TTP negotiation CLI binary.
//!
//! # Commands
//!
//! - `negotiate` - Run a negotiation against the built-in demo switches
//! - `ttps` - List the TTPs the demo switches advertise
//! - `constraints` - Show the controller's IPv4 constraint profile

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ttpneg::{
    simple_ipv4_switch, variable_ipv4_switch, CapabilityProvider, Config, Controller, Switch,
    TtpSwitch, VERSION,
};

#[derive(Parser)]
#[command(name = "ttpneg")]
#[command(version = VERSION)]
#[command(about = "TTP negotiation - controller/switch capability negotiation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a negotiation against the built-in demo switches
    Negotiate {
        /// Switch to negotiate with (simple, variable, all)
        #[arg(short, long, default_value = "all")]
        switch: String,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output outcomes as JSON
        #[arg(long)]
        json: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the TTPs the demo switches advertise
    Ttps {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the controller's IPv4 constraint profile
    Constraints {
        /// TTP version of the profile (1.0, 2.0)
        #[arg(short, long, default_value = "1.0")]
        ttp_version: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Negotiate { switch, config, json, verbose } => {
            cmd_negotiate(&switch, config, json, verbose)
        },
        Commands::Ttps { json } => cmd_ttps(json),
        Commands::Constraints { ttp_version, json } => cmd_constraints(&ttp_version, json),
    }
}

fn cmd_negotiate(
    switch: &str,
    config: Option<PathBuf>,
    json: bool,
    verbose: bool,
) -> anyhow::Result<()> {
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    if !matches!(switch, "simple" | "variable" | "all") {
        anyhow::bail!("unknown switch '{switch}' (expected simple, variable or all)");
    }

    let config = match config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let controller = config.controller.build();

    let mut reports = Vec::new();
    if matches!(switch, "simple" | "all") {
        let mut simple = simple_ipv4_switch();
        reports.push(run_negotiation(&controller, &mut simple, json)?);
    }
    if matches!(switch, "variable" | "all") {
        let mut variable = TtpSwitch::new("variable-ipv4", config.search.build());
        reports.push(run_negotiation(&controller, &mut variable, json)?);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(())
}

fn run_negotiation<S: Switch>(
    controller: &Controller,
    switch: &mut S,
    json: bool,
) -> anyhow::Result<serde_json::Value> {
    let name = switch.name().to_string();
    let outcome = controller.negotiate(switch)?;

    if !json {
        println!("{name}: {outcome}");
    }
    Ok(serde_json::json!({
        "switch": name,
        "version": outcome.version,
        "ttp": outcome.ttp,
        "params": outcome.params,
    }))
}

fn cmd_ttps(json: bool) -> anyhow::Result<()> {
    let simple = simple_ipv4_switch();
    let variable = variable_ipv4_switch();
    let switches = [
        (simple.name().to_string(), simple.provider().ttps()),
        (variable.name().to_string(), variable.provider().ttps()),
    ];

    if json {
        let report: serde_json::Value = switches
            .iter()
            .map(|(name, ttps)| (name.clone(), serde_json::json!(ttps)))
            .collect::<serde_json::Map<_, _>>()
            .into();
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (name, ttps) in &switches {
            println!("{name}:");
            for ttp in *ttps {
                println!("  {ttp}");
            }
        }
    }
    Ok(())
}

fn cmd_constraints(ttp_version: &str, json: bool) -> anyhow::Result<()> {
    let constraints = Controller::ipv4_constraints(ttp_version);

    if json {
        println!("{}", serde_json::to_string_pretty(&constraints)?);
    } else {
        for constraint in &constraints {
            println!("{constraint:?}");
        }
    }
    Ok(())
}
