//! meshqa CLI - triangle mesh quality analysis and cleaning.
//!
//! Usage: meshqa <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `meshqa --help` for available commands. Set `RUST_LOG=debug` for
//! build and filter details and the per-component report.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};

use meshqa::algo::{build_metrics, clean_mesh, CleanOptions, DedupOptions};
use meshqa::io;
use meshqa::mesh::{build_topology, Topology};

#[derive(Parser)]
#[command(name = "meshqa")]
#[command(author, version, about = "Triangle mesh quality CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the topology and print the metrics report
    Info {
        /// Input mesh file (.off, .coff, .obj, .ply)
        input: PathBuf,

        /// Also write the report to this file
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Remove near-duplicate and high-aspect triangles
    Clean {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Centroid distance tolerance for duplicates
        #[arg(long, default_value_t = 0.1)]
        eps_centroid: f64,

        /// Normal angle tolerance for duplicates, in degrees
        #[arg(long, default_value_t = 15.0)]
        eps_normal: f64,

        /// Area difference tolerance for duplicates
        #[arg(long, default_value_t = 0.1)]
        eps_area: f64,

        /// Remove triangles whose longest/shortest edge ratio reaches this
        #[arg(long, default_value_t = 20.0)]
        max_aspect: f64,

        /// Skip near-duplicate removal
        #[arg(long)]
        skip_dedup: bool,

        /// Skip high-aspect culling
        #[arg(long)]
        skip_aspect: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input, report } => {
            cmd_info(&input, report.as_deref())?;
        }

        Commands::Clean {
            input,
            output,
            eps_centroid,
            eps_normal,
            eps_area,
            max_aspect,
            skip_dedup,
            skip_aspect,
        } => {
            let dedup = DedupOptions::default()
                .with_eps_centroid(eps_centroid)
                .with_eps_normal_deg(eps_normal)
                .with_eps_area(eps_area);

            let mut options = CleanOptions::default()
                .with_dedup(dedup)
                .with_max_aspect_ratio(max_aspect);
            if skip_dedup {
                options = options.skip_duplicates();
            }
            if skip_aspect {
                options = options.skip_high_aspect();
            }

            cmd_clean(&input, &output, &options)?;
        }
    }

    Ok(())
}

fn cmd_info(input: &Path, report: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let record = io::load(input)?;
    println!("File: {}", input.display());

    let start = Instant::now();
    let topology: Topology = build_topology(record.num_vertices(), &record.faces)?;
    let analysis = build_metrics(&topology, &record.positions)?;
    let elapsed = start.elapsed();

    print!("{}", analysis.metrics);
    log::debug!("{}", analysis.components);
    println!("Analysis time: {:.2?}", elapsed);

    if let Some(path) = report {
        analysis.metrics.save_report(path)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

fn cmd_clean(
    input: &Path,
    output: &Path,
    options: &CleanOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let record = io::load(input)?;
    println!(
        "Loaded: {} vertices, {} faces",
        record.num_vertices(),
        record.num_faces()
    );

    let start = Instant::now();
    let cleaned = clean_mesh(&record, options)?;
    let elapsed = start.elapsed();

    println!(
        "Result: {} faces ({} removed) in {:.2?}",
        cleaned.num_faces(),
        record.num_faces() - cleaned.num_faces(),
        elapsed
    );

    io::save(&cleaned, output)?;
    println!("Saved to: {}", output.display());

    Ok(())
}
