// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! airlink-station - scripted ground-control endpoint
//!
//! Runs the two-phase rescue/scan mission against a pub/sub broker:
//! navigate the vehicle to the rescue site, then task its camera. Exits 0
//! when every phase was attempted, 1 on any fatal initialization or send
//! failure.

mod sim;

use airlink::codec::MessageCodec;
use airlink::exchange::{Criticality, StepContext};
use airlink::mission::{MissionScript, RunPolicy, ScriptReport, ScriptStatus, StepResult};
use airlink::msg::cmasi::{
    AirVehicleState, CameraAction, CameraConfiguration, CameraState, GoToWaypointAction,
    Location3D, MissionCommand, Waypoint,
};
use airlink::msg::MessageFactory;
use airlink::routing::TopicRouter;
use airlink::transport::{
    ChannelOption, Direction, LoopbackBus, LoopbackChannel, TcpChannel, Transport,
};
use airlink::StationConfig;
use clap::Parser;
use colored::*;
use std::time::Duration;

/// Scripted ground-control endpoint
#[derive(Parser, Debug)]
#[command(name = "airlink-station")]
#[command(version)]
#[command(about = "Run the scripted rescue/scan mission over pub/sub")]
struct Args {
    /// Broker address (overrides AIRLINK_TRANSPORT_HOSTNAME)
    address: Option<String>,

    /// Broker subscribe port (overrides AIRLINK_TRANSPORT_PORTS)
    sub_port: Option<u16>,

    /// Broker publish port (overrides AIRLINK_TRANSPORT_PORTS)
    pub_port: Option<u16>,

    /// Receive timeout in milliseconds
    #[arg(long)]
    recv_timeout_ms: Option<u64>,

    /// Topic namespace prefix
    #[arg(long)]
    namespace: Option<String>,

    /// Run against an in-process simulated vehicle instead of a broker
    #[arg(long)]
    loopback: bool,

    /// Treat missing telemetry as fatal instead of logging and continuing
    #[arg(long)]
    strict_telemetry: bool,

    /// Replay subscriptions after a failed receive
    #[arg(long)]
    resubscribe: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Quiet mode - only log output, no operator summary
    #[arg(short = 'q', long)]
    quiet: bool,
}

fn main() {
    // Initialize logger for RUST_LOG-based debug output
    env_logger::init();

    let args = Args::parse();

    if args.no_color || !is_tty() {
        colored::control::set_override(false);
    }

    // The script is linear and blocking (with bounded receives), so a
    // Ctrl+C simply ends the process rather than unwinding mid-step.
    if let Err(e) = ctrlc::set_handler(|| {
        eprintln!("\ninterrupted");
        std::process::exit(130);
    }) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }

    match run(&args) {
        Ok(report) if report.succeeded() => std::process::exit(0),
        Ok(_) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// CLI arguments override environment, environment overrides defaults.
fn resolve_config(args: &Args) -> StationConfig {
    let mut config = StationConfig::from_env();
    if let Some(address) = &args.address {
        config.address = address.clone();
    }
    if let Some(port) = args.sub_port {
        config.subscribe_port = port;
    }
    if let Some(port) = args.pub_port {
        config.publish_port = port;
    }
    if let Some(ms) = args.recv_timeout_ms {
        config.recv_timeout = Duration::from_millis(ms);
    }
    if let Some(namespace) = &args.namespace {
        config.namespace = namespace.clone();
    }
    config
}

fn run(args: &Args) -> Result<ScriptReport, Box<dyn std::error::Error>> {
    let config = resolve_config(args);
    let factory = MessageFactory::cmasi();
    let codec = MessageCodec::new(&factory);
    let router = TopicRouter::new(config.namespace.clone());

    if !args.quiet {
        print_header(&config, args.loopback);
    }

    let report = if args.loopback {
        let bus = LoopbackBus::new();
        let vehicle = sim::spawn_vehicle(&bus, &router)?;
        let (tx, rx) = open_loopback(&bus, &router, &config)?;
        let report = drive(tx, rx, &codec, &router, &config, args);
        vehicle.join().map_err(|_| "simulated vehicle panicked")?;
        report
    } else {
        let (tx, rx) = open_tcp(&config, &router)?;
        drive(tx, rx, &codec, &router, &config, args)
    };

    if !args.quiet {
        print_summary(&report);
    }
    Ok(report)
}

fn open_tcp(
    config: &StationConfig,
    router: &TopicRouter,
) -> Result<(TcpChannel, TcpChannel), airlink::Error> {
    let mut tx = TcpChannel::new();
    tx.configure(ChannelOption::PublishAddress, &config.address)?;
    tx.configure(ChannelOption::PublishPort, &config.publish_port.to_string())?;
    tx.open(Direction::Write)?;

    let mut rx = TcpChannel::new();
    rx.configure(ChannelOption::SubscribeAddress, &config.address)?;
    rx.configure(
        ChannelOption::SubscribePort,
        &config.subscribe_port.to_string(),
    )?;
    rx.open(Direction::Read)?;
    subscribe_telemetry(&mut rx, router)?;

    tx.ready(config.ready_wait)?;
    rx.ready(config.ready_wait)?;
    Ok((tx, rx))
}

fn open_loopback(
    bus: &LoopbackBus,
    router: &TopicRouter,
    config: &StationConfig,
) -> Result<(LoopbackChannel, LoopbackChannel), airlink::Error> {
    let mut tx = bus.channel();
    tx.open(Direction::Write)?;
    let mut rx = bus.channel();
    rx.open(Direction::Read)?;
    subscribe_telemetry(&mut rx, router)?;
    tx.ready(config.ready_wait)?;
    rx.ready(config.ready_wait)?;
    Ok((tx, rx))
}

/// Subscribe the read channel to every message type the script awaits.
fn subscribe_telemetry(rx: &mut dyn Transport, router: &TopicRouter) -> Result<(), airlink::Error> {
    rx.subscribe(&router.topic_for_type::<AirVehicleState>())?;
    rx.subscribe(&router.topic_for_type::<CameraConfiguration>())?;
    rx.subscribe(&router.topic_for_type::<CameraState>())?;
    Ok(())
}

fn drive(
    mut tx: impl Transport,
    mut rx: impl Transport,
    codec: &MessageCodec<'_>,
    router: &TopicRouter,
    config: &StationConfig,
    args: &Args,
) -> ScriptReport {
    let mut scratch = Vec::new();
    let mut ctx =
        StepContext::new(codec, router, &mut scratch).with_recv_timeout(config.recv_timeout);
    let policy = RunPolicy {
        resubscribe_on_recv_failure: args.resubscribe,
    };
    let mut script = build_script(args.strict_telemetry);
    script.run(&mut ctx, &mut tx, &mut rx, &policy)
}

/// The rescue-and-scan playbook: fly the route, hold at the site, then
/// survey with the camera wide and narrow.
fn build_script(strict_telemetry: bool) -> MissionScript {
    let telemetry = if strict_telemetry {
        Criticality::Fatal
    } else {
        Criticality::Recoverable
    };

    let route = MissionCommand {
        command_id: 1,
        vehicle_id: 400,
        waypoint_list: vec![
            Waypoint {
                location: Location3D {
                    latitude: 35.027,
                    longitude: -120.581,
                    altitude: 450.0,
                    ..Default::default()
                },
                number: 1,
                next_waypoint: 2,
                speed: 27.5,
                climb_rate: 2.0,
            },
            Waypoint {
                location: Location3D {
                    latitude: 35.031,
                    longitude: -120.577,
                    altitude: 500.0,
                    ..Default::default()
                },
                number: 2,
                next_waypoint: 0,
                speed: 25.0,
                climb_rate: 0.0,
            },
        ],
        first_waypoint: 1,
        ..Default::default()
    };

    MissionScript::builder()
        .phase("navigate to rescue site")
        .send(route)
        .expect_with::<AirVehicleState>(telemetry)
        .send(GoToWaypointAction { waypoint_number: 2 })
        .expect_with::<AirVehicleState>(telemetry)
        .phase("task camera sensor")
        .send(CameraAction {
            payload_id: 1,
            horizontal_field_of_view: 45.0,
        })
        .expect_with::<CameraConfiguration>(telemetry)
        .send(CameraAction {
            payload_id: 1,
            horizontal_field_of_view: 30.0,
        })
        .expect_with::<CameraState>(telemetry)
        .build()
}

fn print_header(config: &StationConfig, loopback: bool) {
    let endpoint = if loopback {
        "in-process loopback".to_string()
    } else {
        format!(
            "{} (pub {}, sub {})",
            config.address, config.publish_port, config.subscribe_port
        )
    };
    eprintln!(
        "{} {} {}",
        ">>>".green().bold(),
        "Mission link to".bold(),
        endpoint.cyan()
    );
    eprintln!(
        "{}",
        format!(
            "namespace={} recv_timeout={}ms",
            config.namespace,
            config.recv_timeout.as_millis()
        )
        .dimmed()
    );
    eprintln!();
}

fn print_summary(report: &ScriptReport) {
    let mut current_phase = "";
    for outcome in &report.outcomes {
        if outcome.phase != current_phase {
            eprintln!("{}", outcome.phase.bold());
            current_phase = &outcome.phase;
        }
        match &outcome.result {
            StepResult::Sent { bytes } => eprintln!(
                "  {} {} {} {}",
                "ok".green(),
                outcome.kind,
                outcome.type_name,
                format!("({} bytes)", bytes).dimmed()
            ),
            StepResult::Received { bytes } => eprintln!(
                "  {} {} {} {}",
                "ok".green(),
                outcome.kind,
                outcome.type_name,
                format!("({} bytes)", bytes).dimmed()
            ),
            StepResult::Failed { reason } => eprintln!(
                "  {} {} {} {}",
                "fail".red(),
                outcome.kind,
                outcome.type_name,
                format!("({})", reason).dimmed()
            ),
        }
    }
    eprintln!();
    match &report.status {
        ScriptStatus::Completed => {
            eprintln!("{} {}", "---".dimmed(), "mission script complete".green())
        }
        ScriptStatus::Aborted { phase, type_name } => eprintln!(
            "{} {}",
            "---".dimmed(),
            format!("mission aborted in '{}' at {}", phase, type_name)
                .red()
                .bold()
        ),
    }
}

fn is_tty() -> bool {
    #[cfg(unix)]
    unsafe {
        libc::isatty(libc::STDERR_FILENO) != 0
    }
    #[cfg(not(unix))]
    true
}
