use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args as ClapArgs, Parser as ClapParser, Subcommand};
use confique::Config as _;
use tracing::*;
use vegabuild::charts::{ChartKind, ChartOptions};
use vegabuild::colors::PALETTES;
use vegabuild::output::render_html;
use vegabuild::{
    lints, ColorScheme, Data, GrammarValue, JsonOptions, LoadOptions, Severity, SplitOptions,
    Visualization,
};

use crate::config::Config;

mod config;
mod logging;

/// Config file read from the working directory when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "vegabuild.toml";

#[derive(Debug, ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log more. Repeat for even more.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build a chart from a JSON data file.
    Chart(ChartArgs),
    /// Validate and lint a Vega grammar JSON file.
    Check {
        /// The path to a Vega grammar JSON file.
        input: PathBuf,

        /// Print lints to stdout as a JSON array.
        #[arg(long)]
        json: bool,
    },
    /// List the available color palettes.
    Palettes,
}

#[derive(Debug, ClapArgs)]
struct ChartArgs {
    /// Chart type: bar, line, scatter, area, stacked-bar, stacked-area, grouped-bar, pie or word.
    kind: ChartKind,

    /// JSON data: an array of values, pairs or records, or an object of columns or values.
    input: PathBuf,

    /// Write the grammar here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the values of the data set to a separate file, referenced by url.
    #[arg(long, num_args = 0..=1, require_equals = true, requires = "output")]
    split_data: Option<Option<PathBuf>>,

    /// Also write an HTML page rendering the grammar.
    #[arg(long, num_args = 0..=1, require_equals = true, requires = "output")]
    html: Option<Option<PathBuf>>,

    #[arg(long)]
    width: Option<i64>,

    #[arg(long)]
    height: Option<i64>,

    /// ColorBrewer palette for the color scale.
    #[arg(long)]
    palette: Option<String>,

    #[arg(long)]
    x_title: Option<String>,

    #[arg(long)]
    y_title: Option<String>,

    /// Add a legend for the color scale, with this title.
    #[arg(long)]
    legend: Option<String>,

    /// Name of the data set.
    #[arg(long)]
    name: Option<String>,

    /// Only chart these columns of tabular input.
    #[arg(long, value_delimiter = ',')]
    columns: Option<Vec<String>>,

    /// Index tabular input on this column.
    #[arg(long)]
    key_on: Option<String>,

    /// Write JSON on a single line.
    #[arg(long)]
    compact: bool,

    /// Validate the chart before writing it.
    #[arg(long)]
    validate: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Args::parse();
    logging::setup_logging(cli.verbose);

    debug!(?cli);

    let config = load_config(cli.config.as_deref())?;
    debug!(?config);

    match cli.command {
        Command::Chart(args) => chart(&config, args),
        Command::Check { input, json } => check(&input, json),
        Command::Palettes => {
            for palette in PALETTES {
                println!("{:<10} {:?}", palette.name, palette.kind);
            }
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match path {
        Some(path) if !path.exists() => {
            bail!("config file `{}` does not exist", path.display());
        }
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(DEFAULT_CONFIG_FILE),
    };

    Config::builder()
        .env()
        .file(&path)
        .load()
        .with_context(|| format!("failed to load config from `{}`", path.display()))
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let json_string = match std::fs::read_to_string(path) {
        Ok(file) => file,
        Err(e) => {
            error!(?path, "failed to read input");
            return Err(e).with_context(|| format!("failed to read file `{}`", path.display()));
        }
    };

    serde_json::from_str(&json_string)
        .with_context(|| format!("`{}` is not valid JSON", path.display()))
}

fn chart(config: &Config, args: ChartArgs) -> anyhow::Result<()> {
    let load = LoadOptions {
        name: args.name.clone(),
        columns: args.columns.clone(),
        key_on: args.key_on.clone(),
        ..LoadOptions::default()
    };
    let data = Data::from_json_input(read_json(&args.input)?, &load)
        .with_context(|| format!("failed to load data from `{}`", args.input.display()))?;

    let options = ChartOptions {
        width: args.width.unwrap_or(config.width),
        height: args.height.unwrap_or(config.height),
    };
    let mut vis = args
        .kind
        .build(data, &options)
        .with_context(|| format!("failed to build {} chart", args.kind))?;

    style(&mut vis, config, &args)?;

    let json = JsonOptions {
        pretty: config.pretty && !args.compact,
        validate: args.validate,
    };

    let Some(output) = args.output else {
        println!("{}", vis.to_json(&json)?);
        return Ok(());
    };

    match args.split_data {
        Some(data_path) => {
            let mut split = SplitOptions::new(
                &output,
                data_path.unwrap_or_else(|| config.data_path.clone()),
            );
            split.html_path = args
                .html
                .map(|html| html.unwrap_or_else(|| config.html_path.clone()));
            split.json = json;
            vis.write_split(&split)?;
        }
        None => {
            vis.write_json(&output, &json)?;
            if let Some(html) = args.html {
                let html_path = html.unwrap_or_else(|| config.html_path.clone());
                std::fs::write(&html_path, render_html(&output.to_string_lossy()))
                    .with_context(|| format!("failed to write `{}`", html_path.display()))?;
            }
        }
    }

    info!(output = %output.display(), "wrote {} chart", args.kind);
    Ok(())
}

fn style(vis: &mut Visualization, config: &Config, args: &ChartArgs) -> anyhow::Result<()> {
    if args.x_title.is_some() || args.y_title.is_some() {
        vis.axis_titles(args.x_title.as_deref(), args.y_title.as_deref())?;
    }

    let has_color_scale = vis.has_scale("color")?;

    if let Some(palette) = args.palette.as_ref().or(config.palette.as_ref()) {
        if has_color_scale {
            vis.colors(ColorScheme::Brew(palette.to_owned()))?;
        } else {
            warn!(%palette, "{} charts have no color scale, ignoring palette", args.kind);
        }
    }

    if let Some(title) = &args.legend {
        if !has_color_scale {
            bail!("{} charts have no color scale to add a legend for", args.kind);
        }
        vis.legend(Some(title), "color", None)?;
    }

    Ok(())
}

fn check(input: &Path, json: bool) -> anyhow::Result<()> {
    let vis = Visualization::from_json(read_json(input)?)
        .with_context(|| format!("`{}` is not a Vega grammar", input.display()))?;
    GrammarValue::validate(&vis).context("validation failed")?;

    let lints = lints::check(&vis);
    if json {
        println!("{}", serde_json::to_string_pretty(&lints)?);
    } else {
        for lint in &lints {
            eprintln!("{lint}");
        }
    }

    let errors = lints
        .iter()
        .filter(|lint| lint.severity == Severity::Error)
        .count();
    if errors > 0 {
        bail!("{} failed with {errors} error(s)", input.display());
    }

    info!(warnings = lints.len(), "{} is valid", input.display());
    Ok(())
}
