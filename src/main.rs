use anyhow::Context;
use clap::{Parser, Subcommand};
use eink_dither::DitherAlgorithm;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xtcpress::format::ContainerLayout;
use xtcpress::models::{ConvertConfig, Orientation, OutputFormat, SplitMode, CONFIG_ENV};
use xtcpress::rendering::Artifact;
use xtcpress::services::{self, ConversionContext};

#[derive(Parser)]
#[command(name = "xtcpress")]
#[command(about = "Convert comics and page images into XTC containers for e-ink readers")]
struct Cli {
    /// Config file (YAML); defaults to $XTCPRESS_CONFIG
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert image folders, images or containers, one output per input
    Convert {
        /// Inputs to convert
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },
    /// Merge inputs of the same kind into one output
    Merge {
        /// Inputs, in reading order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (a directory for PNG output)
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },
    /// Split one input by page ranges
    Split {
        input: PathBuf,

        /// Page ranges, e.g. "1-3,4-10"
        #[arg(short, long)]
        ranges: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },
    /// Show the header, metadata and page index of a container
    Info {
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Command line overrides of config file values
#[derive(clap::Args)]
struct Overrides {
    /// Dithering algorithm: none, ordered, floyd-steinberg, atkinson, sierra-lite
    #[arg(long)]
    dither: Option<DitherAlgorithm>,

    /// Contrast stretch level 0-8
    #[arg(long)]
    contrast: Option<u8>,

    /// portrait or landscape
    #[arg(long)]
    orientation: Option<Orientation>,

    /// Landscape handling of tall pages: nosplit, split or overlap
    #[arg(long)]
    split_mode: Option<SplitMode>,

    /// Output format: xtc or png
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Horizontal crop margin in percent
    #[arg(long)]
    margin_x: Option<f32>,

    /// Vertical crop margin in percent
    #[arg(long)]
    margin_y: Option<f32>,

    /// Title written to container metadata
    #[arg(long)]
    title: Option<String>,

    /// Author written to container metadata
    #[arg(long)]
    author: Option<String>,
}

impl Overrides {
    fn apply(self, mut config: ConvertConfig) -> ConvertConfig {
        if let Some(dither) = self.dither {
            config.dither = dither;
        }
        if let Some(contrast) = self.contrast {
            config.contrast = contrast;
        }
        if let Some(orientation) = self.orientation {
            config.orientation = orientation;
        }
        if let Some(split_mode) = self.split_mode {
            config.split_mode = split_mode;
        }
        if let Some(format) = self.format {
            config.output_format = format;
        }
        if let Some(margin) = self.margin_x {
            config.margin_x = margin;
        }
        if let Some(margin) = self.margin_y {
            config.margin_y = margin;
        }
        if self.title.is_some() {
            config.title = self.title;
        }
        if self.author.is_some() {
            config.author = self.author;
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "xtcpress=debug"
    } else {
        "xtcpress=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config = ConvertConfig::load(cli.config.as_deref());

    match cli.command {
        Some(Commands::Convert {
            inputs,
            output,
            overrides,
        }) => run_convert(overrides.apply(config), &inputs, &output),
        Some(Commands::Merge {
            inputs,
            output,
            overrides,
        }) => run_merge(overrides.apply(config), &inputs, &output),
        Some(Commands::Split {
            input,
            ranges,
            output,
            overrides,
        }) => run_split(overrides.apply(config), &input, &ranges, &output),
        Some(Commands::Info { file, json }) => run_info(&file, json),
        None => {
            run_status_command(&config);
            Ok(())
        }
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

/// `<dir>/<name>.xtc` for containers, `<dir>/<name>/` for page sets
fn output_path(dir: &Path, name: &str, artifact: &Artifact) -> PathBuf {
    match artifact {
        Artifact::Container(_) => dir.join(format!("{name}.xtc")),
        Artifact::Pages(_) => dir.join(name),
    }
}

fn describe(artifact: &Artifact) -> String {
    match artifact {
        Artifact::Container(bytes) => format!("{} bytes", bytes.len()),
        Artifact::Pages(pages) => format!("{} pages", pages.len()),
    }
}

fn log_progress(label: &str) -> impl FnMut(f32) + '_ {
    move |fraction| tracing::debug!(label, percent = (fraction * 100.0).round(), "Progress")
}

fn run_convert(config: ConvertConfig, inputs: &[PathBuf], output: &Path) -> anyhow::Result<()> {
    let format = config.output_format;
    let mut ctx = ConversionContext::open(config).context("Invalid configuration")?;

    let items = services::convert_batch(&ctx, inputs, format);
    ctx.close();

    let mut failed = 0;
    for item in &items {
        match &item.outcome {
            Ok(artifact) => {
                let path = output_path(output, &stem(&item.input), artifact);
                artifact
                    .write_to(&path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!(
                    "{} -> {} ({})",
                    item.input.display(),
                    path.display(),
                    describe(artifact)
                );
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}: {e}", item.input.display());
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} inputs failed", items.len());
    }
    Ok(())
}

fn run_merge(config: ConvertConfig, inputs: &[PathBuf], output: &Path) -> anyhow::Result<()> {
    let format = config.output_format;
    let mut ctx = ConversionContext::open(config).context("Invalid configuration")?;

    let artifact = services::merge(&ctx, inputs, format, &mut log_progress("merge"))
        .context("Merge failed")?;
    ctx.close();

    artifact
        .write_to(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "Merged {} inputs -> {} ({})",
        inputs.len(),
        output.display(),
        describe(&artifact)
    );
    Ok(())
}

fn run_split(
    config: ConvertConfig,
    input: &Path,
    ranges: &str,
    output: &Path,
) -> anyhow::Result<()> {
    let format = config.output_format;
    let mut ctx = ConversionContext::open(config).context("Invalid configuration")?;

    let artifacts = services::split(&ctx, input, ranges, format, &mut log_progress("split"))
        .with_context(|| format!("Failed to split {}", input.display()))?;
    ctx.close();

    let name = stem(input);
    for (i, artifact) in artifacts.iter().enumerate() {
        let path = output_path(output, &format!("{name}_part{:02}", i + 1), artifact);
        artifact
            .write_to(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{} ({})", path.display(), describe(artifact));
    }
    Ok(())
}

fn run_info(file: &Path, json: bool) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let layout = ContainerLayout::parse(&bytes)
        .with_context(|| format!("{} is not a valid container", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&layout)?);
        return Ok(());
    }

    println!("{}", file.display());
    println!("  Version: {}", layout.header.version);
    println!("  Pages:   {}", layout.page_count());
    if let Some(meta) = &layout.metadata {
        println!("  Title:   {}", meta.title.as_deref().unwrap_or("(none)"));
        println!("  Author:  {}", meta.author.as_deref().unwrap_or("(none)"));
        if let Some(created) = chrono::DateTime::from_timestamp(meta.timestamp as i64, 0) {
            println!("  Created: {}", created.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        if !meta.toc.is_empty() {
            println!("\nChapters:");
            for chapter in &meta.toc {
                println!(
                    "  {:>5}-{:<5} {}",
                    chapter.start_page, chapter.end_page, chapter.title
                );
            }
        }
    }
    if let Some(first) = layout.index.first() {
        println!("\nPage size: {}x{}", first.width, first.height);
    }
    Ok(())
}

fn run_status_command(config: &ConvertConfig) {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    println!("xtcpress v{VERSION}");
    println!("Comics and page images for 1-bit e-ink readers\n");

    println!("Environment Variables:");
    println!(
        "  {CONFIG_ENV} = {}",
        std::env::var(CONFIG_ENV).as_deref().unwrap_or("(not set)")
    );

    println!("\nEffective Settings:");
    println!(
        "  Display:     {}x{}",
        config.display.width, config.display.height
    );
    println!("  Orientation: {:?}", config.orientation);
    println!("  Split mode:  {:?}", config.split_mode);
    println!("  Dither:      {}", config.dither);
    println!("  Contrast:    {}", config.contrast);
    println!("  Format:      {}", config.output_format);

    println!("\nRun 'xtcpress --help' for available commands.");
}
