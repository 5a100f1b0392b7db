pub mod dataset;
pub mod train_config;
pub mod loop_fn;

pub use dataset::{xor_inputs, xor_labels, XOR_INPUTS, XOR_LABELS};
pub use train_config::ExperimentConfig;
pub use loop_fn::{run_experiment, ExperimentReport};
