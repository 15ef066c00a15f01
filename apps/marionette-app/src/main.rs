//! Marionette skeletal animation CLI.
//!
//! Provides four modes of operation:
//! - `forward`: Build a chain rig and pose it with scripted joint rotations
//! - `inverse`: Build a chain rig and drag the end effector toward a target
//! - `spider`: Build the four legged spider rig and print its geometry
//! - `info`: Print workspace crate versions and configuration defaults

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use nalgebra::Vector3;

use marionette_control::{AxisPlane, Frame, Mode, Rig};
use marionette_core::config::RigConfig;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Skeletal animation rig with forward and inverse kinematics.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to a TOML rig configuration file.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Pose a chain rig with scripted rotations of one joint.
    Forward {
        /// Number of links in the chain (defaults to the config value).
        #[arg(short, long)]
        links: Option<u32>,

        /// Joint to rotate, by name (defaults to the root).
        #[arg(short, long)]
        joint: Option<String>,

        /// Rotation plane.
        #[arg(short, long, default_value = "xy", value_parser = ["xy", "yz", "xz"])]
        plane: String,

        /// Rotation per step, in radians.
        #[arg(short, long, default_value_t = 0.1)]
        angle: f32,

        /// Number of rotation steps.
        #[arg(short, long, default_value_t = 16)]
        steps: u32,
    },

    /// Drag a chain rig's end effector toward a world target.
    Inverse {
        /// Number of links in the chain (defaults to the config value).
        #[arg(short, long)]
        links: Option<u32>,

        /// Target point as x,y,z (defaults to a point at half reach above
        /// the root).
        #[arg(short, long, value_delimiter = ',', num_args = 3, allow_hyphen_values = true)]
        target: Option<Vec<f32>>,

        /// Maximum number of solver steps.
        #[arg(short, long, default_value_t = 25)]
        steps: u32,
    },

    /// Build the spider rig and print its rest geometry.
    Spider,

    /// Print crate information.
    Info,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn log_level(verbose: u8) -> tracing::Level {
    match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<RigConfig, marionette_core::error::ConfigError> {
    match path {
        Some(path) => RigConfig::from_file(path),
        None => Ok(RigConfig::default()),
    }
}

fn parse_plane(raw: &str) -> AxisPlane {
    match raw {
        "yz" => AxisPlane::YZ,
        "xz" => AxisPlane::XZ,
        _ => AxisPlane::XY,
    }
}

fn print_frame(frame: &Frame) {
    println!("mode={:?}, joints={}, bones={}", frame.mode, frame.joints.len(), frame.bones.len());
    for joint in &frame.joints {
        let tag = if joint.is_root {
            " [root]"
        } else if joint.selected {
            " [selected]"
        } else {
            ""
        };
        println!(
            "  {} {}: pos=({:+.3}, {:+.3}, {:+.3}), marker={:.2}{tag}",
            joint.id, joint.name, joint.position.x, joint.position.y, joint.position.z,
            joint.marker_radius
        );
    }
    for bone in &frame.bones {
        println!(
            "  bone {} -> {}: {:?}, len={:.3}, at=({:+.3}, {:+.3}, {:+.3})",
            bone.parent,
            bone.child,
            bone.shape.variant,
            bone.shape.length,
            bone.shape.placement.x,
            bone.shape.placement.y,
            bone.shape.placement.z
        );
    }
    for warning in &frame.warnings {
        eprintln!("  warning: {warning}");
    }
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn run_forward(
    mut config: RigConfig,
    links: Option<u32>,
    joint: Option<String>,
    plane: &str,
    angle: f32,
    steps: u32,
) -> ExitCode {
    if let Some(links) = links {
        config.chain_links = links;
    }
    let mut rig = match Rig::new(config) {
        Ok(rig) => rig,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    println!("chain rig: {} joints, reach={:.3}", rig.tree().len(), rig.total_length());

    let name = joint.unwrap_or_else(|| "Root".to_string());
    let Some(id) = rig.tree().joint_by_name(&name) else {
        eprintln!("error: no joint named '{name}'");
        return ExitCode::FAILURE;
    };
    if let Err(err) = rig.select(id) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    let plane = parse_plane(plane);
    let end = rig.end_effector();
    for step in 1..=steps {
        if let Err(err) = rig.rotate(plane, angle) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
        if let Some(end) = end {
            if let Ok(position) = rig.tree().position(end) {
                println!(
                    "step {step}: end=({:+.3}, {:+.3}, {:+.3})",
                    position.x, position.y, position.z
                );
            }
        }
    }

    if let Some(frame) = rig.frame_if_changed() {
        print_frame(&frame);
    }
    ExitCode::SUCCESS
}

fn run_inverse(
    mut config: RigConfig,
    links: Option<u32>,
    target: Option<Vec<f32>>,
    steps: u32,
) -> ExitCode {
    if let Some(links) = links {
        config.chain_links = links;
    }
    let mut rig = match Rig::new(config) {
        Ok(rig) => rig,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    println!("chain rig: {} joints, reach={:.3}", rig.tree().len(), rig.total_length());

    if rig.toggle_mode() != Mode::Inverse {
        eprintln!("error: rig cannot enter inverse mode");
        return ExitCode::FAILURE;
    }

    let target = match target {
        Some(values) if values.len() == 3 => Vector3::new(values[0], values[1], values[2]),
        Some(_) => {
            eprintln!("error: target needs exactly three components");
            return ExitCode::FAILURE;
        }
        None => {
            let root = match rig.tree().position(rig.tree().root()) {
                Ok(root) => root,
                Err(err) => {
                    eprintln!("error: {err}");
                    return ExitCode::FAILURE;
                }
            };
            root + Vector3::new(0.0, rig.total_length() * 0.5, 0.0)
        }
    };
    println!("target: ({:+.3}, {:+.3}, {:+.3})", target.x, target.y, target.z);

    for step in 1..=steps {
        match rig.solve_toward(target) {
            Ok(Some(solve)) => {
                println!(
                    "step {step}: error={:.4} -> {:.4}",
                    solve.error_before, solve.error_after
                );
                if solve.error_after < 1e-3 {
                    println!("converged after {step} steps");
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    if let Some(frame) = rig.frame_if_changed() {
        print_frame(&frame);
    }
    ExitCode::SUCCESS
}

fn run_spider(config: RigConfig) -> ExitCode {
    let mut rig = match Rig::spider(config) {
        Ok(rig) => rig,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    println!("spider rig: {} joints", rig.tree().len());
    print_frame(&rig.frame());
    ExitCode::SUCCESS
}

fn run_info() -> ExitCode {
    println!("marionette v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  marionette-core     {}", env!("CARGO_PKG_VERSION"));
    println!("  marionette-skeleton {}", env!("CARGO_PKG_VERSION"));
    println!("  marionette-ik       {}", env!("CARGO_PKG_VERSION"));
    println!("  marionette-control  {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("default config:");
    let defaults = RigConfig::default();
    println!("  damping        {}", defaults.damping);
    println!("  bone_thickness {}", defaults.bone_thickness);
    println!("  chain_links    {}", defaults.chain_links);
    println!("  link_length    [{}, {}]", defaults.link_length[0], defaults.link_length[1]);
    ExitCode::SUCCESS
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(log_level(cli.verbose))
        .init();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Some(Commands::Forward {
            links,
            joint,
            plane,
            angle,
            steps,
        }) => run_forward(config, links, joint, &plane, angle, steps),
        Some(Commands::Inverse {
            links,
            target,
            steps,
        }) => run_inverse(config, links, target, steps),
        Some(Commands::Spider) => run_spider(config),
        Some(Commands::Info) => run_info(),
        None => {
            // Default: pose the configured chain with a quarter turn at the
            // root.
            run_forward(config, None, None, "xy", 0.1, 16)
        }
    }
}
