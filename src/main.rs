use clap::{Parser, Subcommand};
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use std::path::{Path, PathBuf};
use trez::imaging::RustBackend;
use trez::{Algo, Background, Format, Gravity, Options, batch, config, output};

/// Sizing and encoding flags shared by commands that resize.
///
/// Every flag is optional; unset flags keep the value from the config file.
#[derive(clap::Args, Clone, Default)]
struct ResizeArgs {
    /// Output width in pixels (0 = source width)
    #[arg(long)]
    width: Option<u32>,
    /// Output height in pixels (0 = source height)
    #[arg(long)]
    height: Option<u32>,
    /// Bound on the longer side; wins over --max-height and --max-width
    #[arg(long)]
    max_side: Option<u32>,
    #[arg(long)]
    max_width: Option<u32>,
    /// Wins over --max-width
    #[arg(long)]
    max_height: Option<u32>,
    /// fit (letterbox) or fill (crop)
    #[arg(long)]
    algo: Option<Algo>,
    /// Anchor: center, north, south, west, east, north_west, ...
    #[arg(long)]
    gravity: Option<Gravity>,
    /// Letterbox colour as R,G,B or #rrggbb
    #[arg(long)]
    background: Option<Background>,
    /// jpeg, webp or png
    #[arg(long)]
    format: Option<Format>,
    /// 1-100, or 0 for the format default
    #[arg(long, value_parser = clap::value_parser!(i32).range(0..=100))]
    quality: Option<i32>,
    /// Progressive JPEG scans
    #[arg(long)]
    progressive: bool,
}

impl ResizeArgs {
    /// Config-file options with these flags applied on top.
    fn options(&self, config: &config::Config) -> Options {
        let mut options = config.options();
        if let Some(v) = self.width {
            options.width = v;
        }
        if let Some(v) = self.height {
            options.height = v;
        }
        if let Some(v) = self.max_side {
            options.max_side = v;
        }
        if let Some(v) = self.max_width {
            options.max_width = v;
        }
        if let Some(v) = self.max_height {
            options.max_height = v;
        }
        if let Some(v) = self.algo {
            options.algo = v;
        }
        if let Some(v) = self.gravity {
            options.gravity = v;
        }
        if let Some(v) = self.background {
            options.background = v;
        }
        if let Some(v) = self.format {
            options.format = v;
        }
        if let Some(v) = self.quality {
            options.quality = v;
        }
        options.progressive |= self.progressive;
        options
    }
}

fn version_string() -> &'static str {
    let on_tag = env!("TREZ_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("TREZ_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "trez")]
#[command(about = "Resize images with fit/fill geometry and gravity anchors")]
#[command(long_about = "\
Resize images with fit/fill geometry and gravity anchors

Sizing, in order:
  1. --width / --height set the target (0 keeps the source side)
  2. the first non-zero of --max-side, --max-height, --max-width
     shrinks the target further, keeping its aspect ratio

Placement:
  fit   whole image visible, padded with --background
  fill  canvas fully covered, overflow cropped
  --gravity picks the anchor for both (default: center)

Settings come from stock defaults, then ./trez.toml (or --config FILE),
then command-line flags.

Run 'trez gen-config' to generate a documented trez.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: ./trez.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log resize decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize a single image
    Resize {
        input: PathBuf,
        /// Output file (default: <input stem>.<format extension> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        args: ResizeArgs,
    },
    /// Resize files and directories in parallel
    Batch {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Directory for resized files
        #[arg(long)]
        out_dir: PathBuf,
        #[command(flatten)]
        args: ResizeArgs,
    },
    /// Print the size, geometry and encoder parameters as JSON without resizing
    Plan {
        input: PathBuf,
        #[command(flatten)]
        args: ResizeArgs,
    },
    /// Print a stock trez.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(Path::new("."))?,
    };

    match cli.command {
        Command::Resize {
            input,
            output: out,
            args,
        } => {
            let options = args.options(&config);
            let out = out.unwrap_or_else(|| {
                let dir = input.parent().unwrap_or_else(|| Path::new(""));
                batch::output_path_for(&input, dir, options.format)
            });
            if batch::same_file(&out, &input) {
                return Err(format!(
                    "output would overwrite {}; pass --output",
                    input.display()
                )
                .into());
            }
            let result = batch::resize_file(&RustBackend::new(), &input, &out, &options)?;
            output::print_resize_result(&input, &out, &result);
        }
        Command::Batch {
            inputs,
            out_dir,
            args,
        } => {
            let options = args.options(&config);
            init_thread_pool(&config.processing);
            let files = batch::collect_inputs(&inputs)?;
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let summary = batch::run_batch(&files, &out_dir, &options, Some(tx))?;
            printer
                .join()
                .map_err(|_| "progress printer panicked")?;
            output::print_batch_summary(&summary);
            if !summary.failed.is_empty() {
                return Err(format!(
                    "{} of {} images failed",
                    summary.failed.len(),
                    summary.total()
                )
                .into());
            }
        }
        Command::Plan { input, args } => {
            let data = std::fs::read(&input)?;
            let plan = trez::plan(&data, &args.options(&config))?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays clean for `plan` JSON.
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .ok();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; users can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let mut config = config::Config::default();
        config.resize.width = 640;
        config.output.quality = 50;
        let args = ResizeArgs {
            quality: Some(90),
            algo: Some(Algo::Fill),
            ..ResizeArgs::default()
        };

        let options = args.options(&config);
        assert_eq!(options.width, 640);
        assert_eq!(options.quality, 90);
        assert_eq!(options.algo, Algo::Fill);
    }

    #[test]
    fn parse_batch_command() {
        let cli = Cli::parse_from([
            "trez",
            "-v",
            "batch",
            "a.png",
            "photos",
            "--out-dir",
            "out",
            "--gravity",
            "north-east",
            "--background",
            "255,255,255",
        ]);
        assert!(cli.verbose);
        let Command::Batch {
            inputs,
            out_dir,
            args,
        } = cli.command
        else {
            panic!("expected batch command");
        };
        assert_eq!(inputs, vec![PathBuf::from("a.png"), PathBuf::from("photos")]);
        assert_eq!(out_dir, PathBuf::from("out"));
        assert_eq!(args.gravity, Some(Gravity::NorthEast));
        assert_eq!(args.background, Some(Background::rgb(255, 255, 255)));
    }

    #[test]
    fn quality_flag_out_of_range_rejected() {
        let result = Cli::try_parse_from(["trez", "plan", "a.png", "--quality", "101"]);
        assert!(result.is_err());
    }
}
