use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use env_logger::Builder;
use log::LevelFilter;

use pcd_clipper::{
    clip_file, BatchProgressBar, ClipConfigBuilder, ClipSummary, NoProgress, DEFAULT_CHUNK_SIZE,
};
use pcd_core::ClipError;

#[derive(Parser, Debug)]
#[command(
    name = "lasman",
    about = "LAS manipulation tools",
    author = "MIERUNE Inc.",
    version = "0.0.1"
)]
struct Cli {
    /// Log debug messages
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clips a las file according to polygons
    Clip(ClipArgs),
}

#[derive(Args, Debug)]
struct ClipArgs {
    /// The input las/laz file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// The output las/laz file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// The shapefile (or GeoJSON) that contains the polygons
    #[arg(short, long, value_name = "FILE")]
    shapefile: PathBuf,

    /// The number of points read per chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Keep the points outside the polygons
    #[arg(long)]
    external: bool,

    /// Keep the points in the intersection of all polygons
    #[arg(long)]
    intersection: bool,

    /// Do not draw a progress bar
    #[arg(long)]
    no_progress: bool,
}

fn init_logger(verbose: bool) {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(
            None,
            if verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
        )
        .init();
}

fn clip(args: ClipArgs) -> Result<ClipSummary, ClipError> {
    log::info!("input file: {:?}", args.input);
    log::info!("output file: {:?}", args.output);
    log::info!("polygon file: {:?}", args.shapefile);
    log::info!("chunk size: {}", args.chunk_size);

    let config = ClipConfigBuilder::new(args.input, args.output, args.shapefile)
        .chunk_size(args.chunk_size)
        .external(args.external)
        .intersection(args.intersection)
        .build()?;

    if args.no_progress {
        clip_file(&config, NoProgress)
    } else {
        clip_file(&config, BatchProgressBar::new())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let start = std::time::Instant::now();
    let result = match cli.command {
        Command::Clip(args) => clip(args),
    };

    match result {
        Ok(_) => {
            log::info!("Elapsed: {:?}", start.elapsed());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
