//! rigidsync CLI - headless physics runs
//!
//! Drops a stack of cubes onto a ground slab and reports where they land.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rigidsync_physics::{
    AssetInfo, CollisionMesh, MotionType, ObjectKey, ObjectLibrary, ObjectTemplate,
    PhysicsManager, PhysicsManagerAttributes, PhysicsObjectAttributes, PhysicsSceneAttributes,
    SceneNode, SimulatorKind, Vector3,
};

const CUBE_CONFIG: &str = "cube.phys.json";

#[derive(Parser)]
#[command(name = "rigidsync")]
#[command(about = "Headless rigid-body simulation runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop cubes onto a ground slab and print their final poses
    Drop {
        /// Manager attributes (JSON). Defaults to Rapier with standard gravity.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Object attributes for the cubes (JSON)
        #[arg(long)]
        object: Option<PathBuf>,
        /// Number of frames to simulate
        #[arg(short, long, default_value_t = 240)]
        frames: u32,
        /// Frame time in seconds
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f64,
        /// Number of stacked cubes
        #[arg(short = 'n', long, default_value_t = 3)]
        cubes: u32,
    },
    /// Print default attribute documents
    Defaults,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Drop {
            config,
            object,
            frames,
            dt,
            cubes,
        } => run_drop(config, object, frames, dt, cubes),
        Commands::Defaults => print_defaults(),
    }
}

fn load_manager_attributes(path: Option<PathBuf>) -> Result<PhysicsManagerAttributes> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok(PhysicsManagerAttributes::from_json(&json)?)
        }
        None => Ok(PhysicsManagerAttributes {
            simulator: SimulatorKind::Rapier,
            ..Default::default()
        }),
    }
}

fn load_object_attributes(path: Option<PathBuf>) -> Result<PhysicsObjectAttributes> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok(PhysicsObjectAttributes::from_json(&json)?)
        }
        None => Ok(PhysicsObjectAttributes {
            mass: Some(1.0),
            ..Default::default()
        }),
    }
}

fn run_drop(
    config: Option<PathBuf>,
    object: Option<PathBuf>,
    frames: u32,
    dt: f64,
    cubes: u32,
) -> Result<()> {
    let attributes = load_manager_attributes(config)?;

    let mut library = ObjectLibrary::new();
    library.register(
        CUBE_CONFIG,
        ObjectTemplate {
            attributes: load_object_attributes(object)?,
            mesh_group: vec![CollisionMesh::cuboid(0.5, 0.5, 0.5)],
        },
    );

    let root = SceneNode::new_root("root");
    let mut physics = PhysicsManager::new(library);
    physics.init_physics(&root, &attributes)?;

    let ground = AssetInfo {
        filepath: "ground".to_string(),
        ..Default::default()
    };
    physics.add_scene(
        &ground,
        &PhysicsSceneAttributes::default(),
        &[CollisionMesh::cuboid(20.0, 0.5, 20.0)],
    )?;

    let mut ids = Vec::new();
    for i in 0..cubes {
        let id = physics.add_object(ObjectKey::ConfigFile(CUBE_CONFIG), MotionType::Dynamic)?;
        physics.set_translation(id, Vector3::new(0.0, 2.0 + 1.5 * i as f32, 0.0))?;
        ids.push(id);
    }

    for _ in 0..frames {
        physics.step_physics(dt)?;
    }

    let report = physics.check_active_objects()?;
    info!(
        world_time = physics.world_time(),
        active = report.active,
        total = report.total,
        "simulation finished"
    );

    for id in ids {
        let t = physics.translation(id)?;
        let v = physics.linear_velocity(id)?;
        println!(
            "object {}: position ({:.3}, {:.3}, {:.3}) speed {:.3}",
            id,
            t.x,
            t.y,
            t.z,
            v.norm()
        );
    }
    println!("{} of {} objects active", report.active, report.total);

    let profiler = physics.profiler();
    if let Some(fps) = profiler.average_steps_per_second() {
        println!(
            "{} step calls in {:.3} ms ({:.1} calls/s)",
            profiler.total_frames(),
            profiler.total_elapsed().as_secs_f64() * 1000.0,
            fps
        );
    }

    Ok(())
}

fn print_defaults() -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&PhysicsManagerAttributes::default())?
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&PhysicsObjectAttributes::default())?
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&PhysicsSceneAttributes::default())?
    );
    Ok(())
}
