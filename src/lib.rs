pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod graph;
pub mod session;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use error::{Result, XorError};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use graph::{GraphDef, GraphRunner};
pub use session::Session;
pub use network::network::XorNetwork;
pub use loss::mae::MaeLoss;
pub use optim::rmsprop::RmsProp;
pub use train::{run_experiment, ExperimentConfig};
