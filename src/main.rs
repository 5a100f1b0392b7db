use std::io::{self, Write};

use log::LevelFilter;
use xor_freeze::{run_experiment, ExperimentConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .target(env_logger::Target::Stderr)
        .init();

    let config = ExperimentConfig::default();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let report = run_experiment(&config, &mut out)?;
    out.flush()?;

    log::info!(
        "final loss {:.6}, frozen graph written to {}",
        report.final_loss,
        report.export_path.display()
    );
    Ok(())
}
