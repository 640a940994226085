//! huetone - color melodies in the terminal
//!
//! Run with: cargo run -- play song.txt

mod app;
mod ui;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;

use huetone::color::nearest::nearest_note_rgb;
use huetone::io::svg::{export_file_name, render_svg};
use huetone::layout::BarLayout;
use huetone::palette::{extract_palette, Algorithm};
use huetone::sequencing::{number_lines, parse, Composition};
use huetone::{Config, Instrument, Sequence};

use app::Player;

#[derive(Parser)]
#[command(name = "huetone", version, about = "Compose, see and hear color melodies")]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse notation and print its tokens line by line
    Parse {
        /// Notation file, or - for stdin
        input: String,
    },

    /// Re-number every line with a {n}| tag
    Number {
        /// Notation file, or - for stdin
        input: String,
    },

    /// Export the compact bar rendering as SVG
    Svg {
        /// Notation file, or - for stdin
        input: String,

        /// Output path (default: <title>_<artist>.svg)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, default_value = "")]
        title: String,

        #[arg(long, default_value = "")]
        artist: String,
    },

    /// Extract a palette from an image and map it to notes
    Scan {
        image: PathBuf,

        /// Number of colors
        #[arg(short = 'k', long)]
        colors: Option<usize>,

        /// dominant, kmeans or medianCut
        #[arg(short, long)]
        algorithm: Option<String>,

        /// Play the resulting notes
        #[arg(long)]
        play: bool,

        /// piano, guitar or organ
        #[arg(short, long)]
        instrument: Option<Instrument>,
    },

    /// Play notation with a live view
    Play {
        /// Notation file, or - for stdin
        input: String,

        /// piano, guitar or organ
        #[arg(short, long)]
        instrument: Option<Instrument>,
    },
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Parse { input } => {
            let composition = parse(&read_input(&input)?);
            report_problems(&composition);
            for (i, line) in composition.lines.iter().enumerate() {
                let tokens: Vec<String> = line
                    .iter()
                    .map(|t| format!("{}({})", t.name, t.duration_seconds))
                    .collect();
                println!("{:>3}| {}", i + 1, tokens.join(" "));
            }
            println!("total: {:.2}s", composition.total_seconds());
        }

        Commands::Number { input } => {
            print!("{}", number_lines(&read_input(&input)?));
        }

        Commands::Svg {
            input,
            output,
            title,
            artist,
        } => {
            let composition = parse(&read_input(&input)?);
            report_problems(&composition);
            if composition.is_empty() {
                return Err(eyre!("nothing to export: no notes found"));
            }

            let layout = BarLayout::compact(&composition, &config.layout);
            let path = output
                .unwrap_or_else(|| PathBuf::from(format!("{}.svg", export_file_name(&title, &artist))));
            fs::write(&path, render_svg(&layout))
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "svg exported");
            println!("{}", path.display());
        }

        Commands::Scan {
            image,
            colors,
            algorithm,
            play,
            instrument,
        } => {
            let k = colors.unwrap_or(config.scan.colors);
            let algorithm = algorithm
                .as_deref()
                .map_or(config.scan.algorithm, Algorithm::from_selector);

            let rgba = image::open(&image)
                .wrap_err_with(|| format!("failed to decode {}", image.display()))?
                .to_rgba8();
            let palette = extract_palette(rgba.as_raw(), k, algorithm, &mut rand::thread_rng())
                .wrap_err("palette extraction failed")?;

            for color in palette.iter() {
                println!("{color}  {}", nearest_note_rgb(*color));
            }

            let sequence = Sequence::from_palette(&palette.colors, config.engine.palette_note_seconds);
            let notation = sequence.to_notation();
            println!("{notation}");

            if play {
                if let Some(instrument) = instrument {
                    config.engine.instrument = instrument;
                }
                Player::new(parse(&notation), config)?.run()?;
            }
        }

        Commands::Play { input, instrument } => {
            if let Some(instrument) = instrument {
                config.engine.instrument = instrument;
            }
            let composition = parse(&read_input(&input)?);
            report_problems(&composition);
            if composition.is_empty() {
                return Err(eyre!("nothing to play: no notes found"));
            }
            Player::new(composition, config)?.run()?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::ERROR,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, 2) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> EyreResult<Config> {
    let text =
        fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))?;
    Config::from_toml_str(&text).wrap_err_with(|| format!("invalid config {}", path.display()))
}

fn read_input(input: &str) -> EyreResult<String> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .wrap_err("failed to read stdin")?;
        return Ok(buffer);
    }
    fs::read_to_string(input).wrap_err_with(|| format!("failed to read {input}"))
}

fn report_problems(composition: &Composition) {
    for name in &composition.unmapped {
        warn!(note = %name, "note has no color mapping");
    }
    for err in &composition.rejected {
        warn!("line skipped: {err}");
    }
}
