pub mod network;

pub use network::{XorNetwork, INPUTS, LABELS, LOSS, OUTPUT_NODE};
