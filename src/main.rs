//! Launches a program and logs its resource usage to `<program>_log.tsv`
//! until it exits.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::info;

use procmon_lib::{monitor, MonitorOptions, ProviderKind, SamplerConfig};

/// Log CPU, memory and open descriptors of a process until it exits
#[derive(Parser, Debug, Clone)]
#[command(name = "procmon")]
#[command(about = "Launch a process and log its resource usage until it exits")]
struct Args {
    /// Path or name of the program to launch
    process: String,

    /// Seconds between samples
    #[arg(value_parser = parse_interval)]
    interval: f64,

    /// Where CPU and memory figures come from: native or top
    #[arg(long, default_value = "native")]
    provider: ProviderKind,

    /// Directory for the log file
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Window between the two CPU readings of one sample, in milliseconds
    #[arg(long, default_value = "200")]
    cpu_window_ms: u64,

    /// Arguments passed to the program
    #[arg(last = true)]
    args: Vec<String>,
}

fn parse_interval(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("`{}` is not a number", raw))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("interval must be positive, got {}", raw));
    }
    Ok(value)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = SamplerConfig::new(args.interval)?
        .with_provider(args.provider)
        .with_cpu_window(Duration::from_millis(args.cpu_window_ms));

    let options = MonitorOptions {
        program: args.process,
        args: args.args,
        output_dir: args.output_dir,
        config,
    };

    let report = monitor(&options)
        .await
        .with_context(|| format!("monitoring `{}` failed", options.program))?;

    info!(
        "`{}` exited ({}); {} samples in {}",
        options.program,
        report
            .exit_status
            .map(|code| format!("code {}", code))
            .unwrap_or_else(|| "by signal".to_string()),
        report.summary.samples_written,
        report.log_path.display()
    );
    Ok(())
}
