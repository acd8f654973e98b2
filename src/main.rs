use std::io::IsTerminal;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use scalargrad::{config::FitConfig, data::load_csv, regression::LinearModel};

const USAGE: &str = "usage: scalargrad <data.csv>";

/// The CSV path from the command line, skipping the program name.
fn data_path(args: impl IntoIterator<Item = String>) -> Result<String> {
    let mut args = args.into_iter().skip(1);
    let Some(path) = args.next() else {
        bail!(USAGE);
    };
    if args.next().is_some() {
        bail!(USAGE);
    }
    Ok(path)
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();

    let path = data_path(std::env::args())?;

    let config = FitConfig::from_env().context("invalid fit configuration")?;
    let samples = load_csv(&path).with_context(|| format!("failed to load {path}"))?;
    let model = LinearModel::from_config(&config);

    println!("Loss: {}", model.loss(&samples).value());
    let report = model
        .fit(&samples, &config)
        .context("gradient descent failed")?;

    println!(
        "intercept: {}, slope: {}",
        model.intercept.value(),
        model.slope.value()
    );
    println!(
        "Loss: {} after {} iterations ({:?})",
        report.final_loss().unwrap_or(f64::NAN),
        report.iterations,
        report.stop
    );
    Ok(())
}
