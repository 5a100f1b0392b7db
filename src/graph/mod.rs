pub mod node;
pub mod graph;
pub mod gradients;
pub mod freeze;
pub mod io;
pub mod runner;

pub use node::{Initializer, NodeDef, Op};
pub use graph::GraphDef;
pub use freeze::convert_variables_to_constants;
pub use io::{read_graph, write_graph};
pub use runner::{parse_opstring, GraphRunner};
