use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use trajectory_composite::core::config::TrajectoryConfig;
use trajectory_composite::{build_trajectory_image, logging};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter when RUST_LOG is unset (e.g. "info", "debug")
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit structured JSON logs
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Composite the moving regions of a video into one image
    Build(BuildArgs),
    /// Print stream properties of a video as JSON
    #[cfg(feature = "video")]
    Probe {
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// JSON config file; flags given on the command line override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Video file, or a directory of still frames
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Output image; the extension picks the format
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Process every Nth frame
    #[arg(short, long)]
    sample_interval: Option<u32>,
    /// Grayscale delta above which a pixel counts as moving (0-255)
    #[arg(short = 't', long)]
    diff_threshold: Option<u8>,
    /// Gain applied to moving pixels
    #[arg(short, long)]
    enhance_factor: Option<f64>,
    /// Print the run summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl BuildArgs {
    fn resolve(&self) -> Result<TrajectoryConfig> {
        let mut config = match &self.config {
            Some(path) => TrajectoryConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => TrajectoryConfig::default(),
        };

        if let Some(input) = &self.input {
            config.input = input.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(n) = self.sample_interval {
            config.sample_interval = n;
        }
        if let Some(t) = self.diff_threshold {
            config.diff_threshold = t;
        }
        if let Some(f) = self.enhance_factor {
            config.enhance_factor = f;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.log_json);

    match &cli.command {
        Commands::Build(args) => {
            let config = args.resolve()?;
            let summary = build_trajectory_image(&config).with_context(|| {
                format!("Failed to build trajectory image from {}", config.input.display())
            })?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Trajectory image saved to: {}", summary.output.display());
            }
        }
        #[cfg(feature = "video")]
        Commands::Probe { input } => {
            let decoder = trajectory_composite::decoder::VideoDecoder::open(input)
                .with_context(|| format!("Failed to open {}", input.display()))?;
            println!("{}", serde_json::to_string_pretty(&decoder.info())?);
        }
    }

    Ok(())
}
