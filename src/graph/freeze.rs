use crate::error::Result;
use crate::graph::graph::GraphDef;
use crate::graph::node::{NodeDef, Op};
use crate::session::session::Session;

/// Freezes `graph` for deployment.
///
/// Keeps only the nodes needed to compute `output_names` and swaps every
/// variable among them for a constant holding its current value in `session`.
pub fn convert_variables_to_constants(
    session: &Session,
    graph: &GraphDef,
    output_names: &[&str],
) -> Result<GraphDef> {
    let sub = graph.extract_sub_graph(output_names)?;
    let mut converted = 0;
    let mut nodes = Vec::with_capacity(sub.nodes.len());
    for node in sub.nodes {
        if node.op.is_variable() {
            let value = session.variable(&node.name)?.clone();
            log::debug!("freezing {} ({}x{})", node.name, value.rows, value.cols);
            nodes.push(NodeDef::new(node.name, Op::Const { value }, Vec::new()));
            converted += 1;
        } else {
            nodes.push(node);
        }
    }
    log::info!("Converted {converted} variables to const ops.");
    Ok(GraphDef { nodes })
}
