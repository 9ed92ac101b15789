use anyhow::{Context, Result};
use aviator_input::Action;
use aviator_kernel::{SimConfig, World};
use aviator_render::{DebugTextRenderer, RenderView, Renderer};
use aviator_tools::SceneInspector;
use clap::{Parser, Subcommand};
use glam::Vec2;
use std::fmt::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Viewport assumed by headless runs.
const VIEWPORT: (u32, u32) = (1280, 720);

#[derive(Parser)]
#[command(name = "aviator-cli", about = "Headless driver for the aviator scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML simulation config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the version, scene size and the effective config
    Info,
    /// Run the animation for a number of frames and print the result
    Simulate {
        /// Number of frames to step
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// RNG seed (overrides the config file)
        #[arg(short, long)]
        seed: Option<u64>,
        /// Normalized pointer held for the whole run, as `X,Y`
        #[arg(short, long, value_parser = parse_pointer, allow_hyphen_values = true)]
        pointer: Option<Vec2>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Dump the scene graph after an optional number of frames
    Tree {
        /// Hide nodes deeper than this
        #[arg(short, long)]
        depth: Option<usize>,
        #[arg(short, long, default_value = "0")]
        frames: u64,
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Show one node by name
    Node {
        name: String,
        #[arg(short, long, default_value = "0")]
        frames: u64,
        #[arg(long)]
        json: bool,
    },
}

fn parse_pointer(s: &str) -> Result<Vec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f32>()
            .map_err(|e| format!("bad coordinate {v:?}: {e}"))
    };
    Ok(Vec2::new(parse(x)?, parse(y)?))
}

fn build_world(config: Option<&PathBuf>, seed: Option<u64>) -> Result<World> {
    let mut config = match config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    let mut world = World::new(config)?;
    world.apply(Action::Resized {
        width: VIEWPORT.0,
        height: VIEWPORT.1,
    });
    Ok(world)
}

fn run_frames(world: &mut World, frames: u64) -> Result<()> {
    for _ in 0..frames {
        world.step().context("step failed")?;
    }
    tracing::debug!(frames, tick = world.tick(), "simulation finished");
    Ok(())
}

fn run(cli: Cli) -> Result<String> {
    let mut out = String::new();
    let config = cli.config.as_ref();

    match cli.command {
        Commands::Info => {
            let world = build_world(config, None)?;
            let summary = SceneInspector::summary(&world);
            writeln!(out, "aviator-cli v{}", env!("CARGO_PKG_VERSION"))?;
            writeln!(
                out,
                "scene: nodes={} meshes={} lights={}",
                summary.node_count,
                summary.mesh_nodes,
                world.scene().lights.len()
            )?;
            writeln!(out, "config:")?;
            out.push_str(&serde_yaml::to_string(world.config())?);
        }
        Commands::Simulate {
            frames,
            seed,
            pointer,
            json,
        } => {
            let mut world = build_world(config, seed)?;
            if let Some(p) = pointer {
                world.apply(Action::PointerMoved(p));
            }
            run_frames(&mut world, frames)?;
            let summary = SceneInspector::summary(&world);
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
            } else {
                writeln!(out, "{summary}")?;
            }
        }
        Commands::Tree {
            depth,
            frames,
            seed,
        } => {
            let mut world = build_world(config, seed)?;
            run_frames(&mut world, frames)?;
            let renderer = DebugTextRenderer { max_depth: depth };
            let view = RenderView::new(*world.camera(), VIEWPORT.0, VIEWPORT.1);
            out.push_str(&renderer.render(world.scene(), &view));
        }
        Commands::Node { name, frames, json } => {
            let mut world = build_world(config, None)?;
            run_frames(&mut world, frames)?;
            let info = SceneInspector::find_node(&world, &name)
                .with_context(|| format!("no node named {name:?}"))?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&info)?)?;
            } else {
                writeln!(out, "{info}")?;
            }
        }
    }

    Ok(out)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let out = run(cli).inspect_err(|e| tracing::error!("command failed: {e:#}"))?;
    print!("{out}");
    Ok(())
}
