use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use homebar::bridge::{DeviceSource, HelperBridge};
use homebar::config;

#[derive(Parser, Debug)]
#[command(name = "homebar", version, about = "Smart-home power toggles from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prints device groups and single devices reported by the helper.
    List {
        /// Show the raw helper output too.
        #[arg(long)]
        raw: bool,
    },
    /// Reads the current power state of one characteristic.
    Get {
        /// Characteristic identifier (UUID from `list`).
        id: Uuid,
    },
    /// Forces a specific power state.
    Set {
        /// Characteristic identifier (UUID from `list`).
        id: Uuid,
        /// "on", "off", or a raw 0/1 value.
        state: String,
    },
    /// Flips the current power state.
    Toggle {
        /// Characteristic identifier (UUID from `list`).
        id: Uuid,
    },
    /// Checks local prerequisites and prints guidance.
    Doctor,
    /// Prints the config path that would be used (if any).
    ConfigPath,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::List { raw } => {
            let bridge = make_bridge()?;
            let report = bridge.devices().context("list devices")?;
            if raw {
                if let Some(raw) = report.raw {
                    println!("{raw}");
                }
            }
            for g in &report.groups {
                println!("group: {}", g.name);
                for s in &g.services {
                    print_service(s, "  ");
                }
            }
            for s in &report.services {
                print_service(s, "");
            }
        }
        Command::Get { id } => {
            let bridge = make_bridge()?;
            let on = bridge
                .read_state(id)
                .with_context(|| format!("read power state of {id}"))?;
            println!("{}", if on { "on" } else { "off" });
        }
        Command::Set { id, state } => {
            let on = parse_state_arg(&state)?;
            let bridge = make_bridge()?;
            bridge
                .write_state(id, on)
                .with_context(|| format!("set power state of {id}"))?;
            println!("{}", if on { "on" } else { "off" });
        }
        Command::Toggle { id } => {
            let bridge = make_bridge()?;
            bridge
                .toggle(id)
                .with_context(|| format!("toggle power state of {id}"))?;
        }
        Command::Doctor => {
            let bridge = make_bridge()?;
            let notes = bridge.doctor().context("doctor")?;
            if !notes.ok {
                bail!(notes.message);
            }
            println!("{}", notes.message);
        }
        Command::ConfigPath => {
            if let Some(path) = config::resolve_config_path() {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

fn make_bridge() -> Result<HelperBridge> {
    let cfg = config::load_optional()?;
    Ok(HelperBridge::new(cfg.as_ref().and_then(|c| c.helper.clone())))
}

fn print_service(service: &homebar::device::ServiceDescriptor, indent: &str) {
    println!("{indent}{} ({:?})", service.name, service.kind);
    for c in &service.characteristics {
        println!("{indent}  {:?} {}", c.kind, c.id);
    }
}

fn parse_state_arg(state: &str) -> Result<bool> {
    match state {
        "on" | "1" => Ok(true),
        "off" | "0" => Ok(false),
        other => Err(anyhow!(
            "Invalid state '{other}'. Expected on, off, 1 or 0."
        )),
    }
}
