use std::path::PathBuf;

use crate::network::network::OUTPUT_NODE;

/// Settings for one `run_experiment` call.
///
/// # Fields
/// - `iterations`: training steps, each over the full dataset
/// - `export_dir`: directory the frozen graph is written into; must exist
/// - `export_file`: file name inside `export_dir`
/// - `output_node`: node the frozen graph is restricted to
/// - `as_text`: write JSON instead of the binary artifact
/// - `seed`: seeds parameter initialization; `None` draws from entropy
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    pub iterations: usize,
    pub export_dir: PathBuf,
    pub export_file: String,
    pub output_node: String,
    pub as_text: bool,
    pub seed: Option<u64>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        ExperimentConfig {
            iterations: 2000,
            export_dir: PathBuf::from("models/"),
            export_file: "graph.pb".to_string(),
            output_node: OUTPUT_NODE.to_string(),
            as_text: false,
            seed: None,
        }
    }
}
