use anyhow::{Context, Result};
use breakdown_plot::palette::Palette;
use breakdown_plot::{preprocess, storage, viz};
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "breakdown-plot",
    version,
    about = "Render a hierarchical breakdown bar chart from a JSON description"
)]
struct Cli {
    /// Chart description (JSON, may use $ref)
    #[arg(required_unless_present = "palette")]
    data: Option<PathBuf>,
    /// Output file; the extension picks the format (.pdf, .png or .svg)
    #[arg(short, long, default_value = "./breakdown_plot.pdf")]
    output: PathBuf,
    /// Open the figure in a window instead of writing it
    #[arg(short, long, default_value_t = false)]
    show: bool,
    /// Print the effective palette (built-in plus the chart's overrides) and exit
    #[arg(long, default_value_t = false)]
    palette: bool,
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let spec = cli
        .data
        .as_deref()
        .map(storage::load_chart)
        .transpose()?;
    let palette = match &spec {
        Some(spec) => Palette::pulp()
            .with_overrides(&spec.palette)
            .context("applying palette overrides")?,
        None => Palette::pulp(),
    };

    if cli.palette {
        for (name, color) in palette.iter() {
            println!("{name:<16} {}", color.to_hex());
        }
        return Ok(());
    }

    // `data` is required unless --palette was given.
    let Some(spec) = spec else {
        anyhow::bail!("no chart description given");
    };
    let chart = preprocess(&spec, &palette).context("preparing chart")?;

    if cli.show {
        let svg = viz::render_svg(&chart)?;
        let title = cli
            .data
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "breakdown-plot".to_string());
        show(&svg, &title)
    } else {
        viz::plot_chart(&chart, &cli.output)
            .with_context(|| format!("writing {}", cli.output.display()))?;
        println!("Saved chart to {}", cli.output.display());
        Ok(())
    }
}

#[cfg(feature = "viewer")]
fn show(svg: &str, title: &str) -> Result<()> {
    breakdown_plot::viewer::show(svg, title)
}

#[cfg(not(feature = "viewer"))]
fn show(_svg: &str, _title: &str) -> Result<()> {
    anyhow::bail!("--show needs the `viewer` feature; rebuild with default features")
}
