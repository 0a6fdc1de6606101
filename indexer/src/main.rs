use anyhow::{bail, Result};
use clap::Parser;
use sift::{format_elapsed, run, Args, RunConfig};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let config = RunConfig::from_args(Args::parse());

    let report = run(&config);
    println!("{}", format_elapsed(report.elapsed));
    if !report.is_ok() {
        bail!("{} stage(s) failed", report.failures.len());
    }
    Ok(())
}
