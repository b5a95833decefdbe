use crate::cluster::depth;
use crate::config::{Config, load_config};
use crate::interact::Interaction;
use crate::render::{render_folded, write_output_png, write_output_svg};
use crate::style::{PrepareOptions, prepare};
use crate::tree::SvgTree;
use crate::visibility::cluster_members;
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cfold", version, about = "Collapse and expand clusters in Graphviz SVG output")]
pub struct Args {
    /// Config file (.json or .json5)
    #[arg(short = 'c', long = "configFile", global = true)]
    pub config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Make a rendered SVG interactive: stamp clusters, hide placeholder edges, add styles
    Prepare {
        /// Input file (.svg) or '-' for stdin
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,

        /// Output file. Defaults to stdout if omitted.
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Reference an external script from the SVG (e.g. graphstyle.js)
        #[arg(long = "script")]
        script: Option<String>,

        /// Do not embed the stylesheet
        #[arg(long = "no-style")]
        no_style: bool,
    },
    /// Write a static snapshot with the given clusters clicked, in order
    Fold {
        /// Input file (.svg) or '-' for stdin
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,

        /// Output file (svg/png). Defaults to stdout for SVG if omitted.
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
        output_format: OutputFormat,

        /// Cluster whose header to click; repeatable
        #[arg(long = "click", required = true)]
        click: Vec<String>,

        /// Width
        #[arg(short = 'w', long = "width")]
        width: Option<f32>,

        /// Height
        #[arg(short = 'H', long = "height")]
        height: Option<f32>,
    },
    /// List clickable clusters
    Clusters {
        /// Input file (.svg) or '-' for stdin
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let mut config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Prepare {
            input,
            output,
            script,
            no_style,
        } => {
            let source = read_input(input.as_deref())?;
            let mut tree = SvgTree::parse(&source)?;
            let options = PrepareOptions {
                inline_style: !no_style,
                script_href: script,
            };
            prepare(&mut tree, &config.fold, &config.style, &options)?;
            write_output_svg(&tree.to_svg_string(), output.as_deref())?;
        }
        Command::Fold {
            input,
            output,
            output_format,
            click,
            width,
            height,
        } => {
            if let Some(width) = width {
                config.render.width = width;
            }
            if let Some(height) = height {
                config.render.height = height;
            }
            let source = read_input(input.as_deref())?;
            let folded = render_folded(&source, &config, &click)?;
            for cluster in &folded.unknown {
                tracing::warn!(cluster = %cluster, "no header link for cluster, skipped");
            }
            match output_format {
                OutputFormat::Svg => {
                    write_output_svg(&folded.svg, output.as_deref())?;
                }
                OutputFormat::Png => {
                    let output = ensure_output(&output, "png")?;
                    write_output_png(&folded.svg, &output, &config.render)?;
                }
            }
        }
        Command::Clusters { input } => {
            let source = read_input(input.as_deref())?;
            print!("{}", cluster_listing(&source, &config)?);
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn cluster_listing(source: &str, config: &Config) -> Result<String> {
    let mut tree = SvgTree::parse(source)?;
    let interaction = Interaction::initialize(&mut tree, &config.fold);
    let mut out = String::new();
    for cluster in interaction.clusters(&tree, &config.fold) {
        let members = cluster_members(&tree, &config.fold, &cluster).len();
        let placeholders =
            cluster_members(&tree, &config.fold, &config.fold.placeholder_for(&cluster)).len();
        out.push_str(&format!(
            "{}{}\tmembers={}\tplaceholders={}\n",
            "  ".repeat(depth(&cluster, &config.fold.separator)),
            cluster,
            members,
            placeholders
        ));
    }
    Ok(out)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
