use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for aviator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fmt, clippy, tests and doc in sequence
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
    /// Time World::step in release mode
    Bench,
    /// Headless smoke run: step the scene and print the summary
    Smoke {
        #[arg(long, default_value = "600")]
        frames: u64,
    },
}

const STEPS: &[(&str, &[&str])] = &[
    ("fmt", &["fmt", "--all", "--", "--check"]),
    (
        "clippy",
        &[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ],
    ),
    ("test", &["test", "--workspace"]),
    ("doc", &["doc", "--workspace", "--no-deps"]),
];

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            for (name, args) in STEPS {
                cargo(name, args)?;
            }
        }
        Commands::Fmt => cargo("fmt", STEPS[0].1)?,
        Commands::Clippy => cargo("clippy", STEPS[1].1)?,
        Commands::Test => cargo("test", STEPS[2].1)?,
        Commands::Doc => cargo("doc", STEPS[3].1)?,
        Commands::Build => cargo("build", &["build", "--workspace"])?,
        Commands::Bench => cargo(
            "bench",
            &["bench", "-p", "aviator-kernel", "--bench", "bench_step"],
        )?,
        Commands::Smoke { frames } => {
            let frames = frames.to_string();
            cargo(
                "smoke",
                &[
                    "run",
                    "-p",
                    "aviator-cli",
                    "--",
                    "simulate",
                    "--frames",
                    &frames,
                    "--pointer",
                    "0.5,0.5",
                ],
            )?
        }
    }

    Ok(())
}

fn cargo(name: &str, args: &[&str]) -> Result<()> {
    println!("==> Running cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {name} failed");
    }
    Ok(())
}
