use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use rand::{rngs::StdRng, SeedableRng};

use crate::error::Result;
use crate::graph::freeze::convert_variables_to_constants;
use crate::graph::io::write_graph;
use crate::network::network::XorNetwork;
use crate::train::dataset::{xor_inputs, xor_labels};
use crate::train::train_config::ExperimentConfig;

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct ExperimentReport {
    /// Loss reported by the last training step.
    pub final_loss: f64,
    /// Predictions of the trained network on the XOR inputs.
    pub outputs: Vec<f64>,
    pub export_path: PathBuf,
}

/// Trains a fresh `XorNetwork` on XOR, predicts once, and writes the frozen
/// graph.
///
/// Writes `Iteration <i>: <loss>` for every step and a final
/// `Outputs: [...]` line to `out`. There is no early stopping and no
/// divergence check; every step runs.
pub fn run_experiment<W: Write>(config: &ExperimentConfig, out: &mut W) -> Result<ExperimentReport> {
    let inputs = xor_inputs();
    let labels = xor_labels();

    let mut network = match config.seed {
        Some(seed) => XorNetwork::with_rng(&mut StdRng::seed_from_u64(seed))?,
        None => XorNetwork::new(None)?,
    };

    let t_start = Instant::now();
    let mut final_loss = f64::NAN;
    for i in 0..config.iterations {
        let (_, loss) = network.train(&inputs, &labels)?;
        writeln!(out, "Iteration {i}: {loss}")?;
        final_loss = loss;
    }
    log::info!(
        "trained {} iterations in {} ms",
        config.iterations,
        t_start.elapsed().as_millis()
    );

    let outputs = network.predict(&inputs)?;
    writeln!(out, "Outputs: {outputs:?}")?;

    let frozen = convert_variables_to_constants(
        network.session(),
        network.graph(),
        &[config.output_node.as_str()],
    )?;
    let export_path = write_graph(&frozen, &config.export_dir, &config.export_file, config.as_text)?;

    Ok(ExperimentReport { final_loss, outputs, export_path })
}
