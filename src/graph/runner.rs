use std::collections::HashMap;
use std::path::Path;

use crate::error::{Result, XorError};
use crate::graph::graph::GraphDef;
use crate::graph::io::read_graph;
use crate::graph::node::Op;
use crate::math::matrix::Matrix;
use crate::session::session::Session;

#[derive(Debug, Clone)]
struct InputInfo {
    node: String,
    shape: Vec<usize>,
}

/// Runs a frozen graph: register the inputs to feed and the outputs to fetch,
/// then call `run` as many times as needed.
///
/// Op strings may carry a tensor index (`"output/BiasAdd:0"`). Every op here
/// has a single output, so only index 0 exists.
#[derive(Debug)]
pub struct GraphRunner {
    graph: GraphDef,
    session: Session,
    inputs: HashMap<String, InputInfo>,
    outputs: HashMap<String, String>,
}

impl GraphRunner {
    /// Imports a frozen graph artifact from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<GraphRunner> {
        let graph = read_graph(path.as_ref())?;
        log::info!("Successfully imported graph from {}", path.as_ref().display());
        Ok(GraphRunner::from_graph(graph))
    }

    pub fn from_graph(graph: GraphDef) -> GraphRunner {
        GraphRunner {
            graph,
            session: Session::new(),
            inputs: HashMap::new(),
            outputs: HashMap::new(),
        }
    }

    pub fn graph(&self) -> &GraphDef {
        &self.graph
    }

    pub fn op_names(&self) -> Vec<&str> {
        self.graph.op_names()
    }

    /// Registers `opname` as a feedable input of the given fixed shape.
    ///
    /// The rank must match the node's declared shape, and every dimension the
    /// graph fixes must match too. Unknown (batch) dimensions accept anything.
    pub fn add_input(&mut self, opname: &str, shape: &[usize]) -> Result<()> {
        let (name, _) = parse_opstring(opname)?;
        let node = self.graph.require(&name)?;
        let declared: Vec<Option<usize>> = match &node.op {
            Op::Placeholder { shape } => shape.clone(),
            Op::Const { value } => vec![Some(value.rows), Some(value.cols)],
            Op::Variable { shape: (rows, cols), .. } => vec![Some(*rows), Some(*cols)],
            _ => vec![None, None],
        };
        if declared.len() != shape.len() {
            return Err(XorError::RankMismatch {
                name,
                expected: declared.len(),
                got: shape.len(),
            });
        }
        if declared.iter().zip(shape).any(|(d, s)| d.is_some_and(|d| d != *s)) {
            return Err(XorError::ShapeMismatch {
                op: "register input",
                left_rows: declared[0].unwrap_or(shape[0]),
                left_cols: declared.get(1).copied().flatten().unwrap_or(shape.get(1).copied().unwrap_or(1)),
                right_rows: shape[0],
                right_cols: shape.get(1).copied().unwrap_or(1),
            });
        }
        self.inputs.insert(opname.to_string(), InputInfo { node: name, shape: shape.to_vec() });
        Ok(())
    }

    /// Registers `opname` as a fetchable output.
    pub fn add_output(&mut self, opname: &str) -> Result<()> {
        let (name, _) = parse_opstring(opname)?;
        self.graph.require(&name)?;
        self.outputs.insert(opname.to_string(), name);
        Ok(())
    }

    /// Feeds each registered input its flat row-major data and returns one
    /// tensor per requested output, in request order.
    pub fn run(&self, outputs: &[&str], inputs: &[(&str, &[f64])]) -> Result<Vec<Matrix>> {
        let fetches = outputs.iter()
            .map(|o| {
                self.outputs.get(*o)
                    .map(String::as_str)
                    .ok_or_else(|| XorError::NotRegistered(o.to_string()))
            })
            .collect::<Result<Vec<&str>>>()?;

        let mut fed = Vec::with_capacity(inputs.len());
        for (opname, data) in inputs {
            let info = self.inputs.get(*opname)
                .ok_or_else(|| XorError::NotRegistered(opname.to_string()))?;
            let (rows, cols) = match info.shape.as_slice() {
                [rows, cols] => (*rows, *cols),
                [len] => (1, *len),
                other => {
                    return Err(XorError::RankMismatch {
                        name: info.node.clone(),
                        expected: 2,
                        got: other.len(),
                    })
                }
            };
            fed.push((info.node.as_str(), Matrix::from_flat(rows, cols, data)?));
        }
        let feeds: Vec<(&str, &Matrix)> = fed.iter().map(|(n, m)| (*n, m)).collect();
        self.session.run(&self.graph, &fetches, &feeds)
    }
}

/// Splits `"name"` or `"name:index"` into its parts.
pub fn parse_opstring(opstring: &str) -> Result<(String, usize)> {
    let (name, index) = match opstring.rsplit_once(':') {
        Some((name, index)) => {
            let index = index.parse::<usize>()
                .map_err(|_| XorError::InvalidOpString(opstring.to_string()))?;
            (name, index)
        }
        None => (opstring, 0),
    };
    if name.is_empty() || index != 0 {
        return Err(XorError::InvalidOpString(opstring.to_string()));
    }
    Ok((name.to_string(), index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> GraphRunner {
        let mut g = GraphDef::new();
        g.add("inputs", Op::Placeholder { shape: vec![None, Some(2)] }, &[]).unwrap();
        g.add("w", Op::Const { value: Matrix::column(&[1.0, 10.0]) }, &[]).unwrap();
        g.add("out", Op::MatMul, &["inputs", "w"]).unwrap();
        GraphRunner::from_graph(g)
    }

    #[test]
    fn parses_op_strings() {
        assert_eq!(parse_opstring("output/BiasAdd").unwrap(), ("output/BiasAdd".to_string(), 0));
        assert_eq!(parse_opstring("output/BiasAdd:0").unwrap(), ("output/BiasAdd".to_string(), 0));
        assert!(matches!(parse_opstring("out:x"), Err(XorError::InvalidOpString(_))));
        assert!(matches!(parse_opstring("out:1"), Err(XorError::InvalidOpString(_))));
        assert!(matches!(parse_opstring(":0"), Err(XorError::InvalidOpString(_))));
    }

    #[test]
    fn runs_registered_ops() {
        let mut r = runner();
        r.add_input("inputs", &[3, 2]).unwrap();
        r.add_output("out:0").unwrap();
        let data = [1.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let out = r.run(&["out:0"], &[("inputs", &data[..])]).unwrap();
        assert_eq!(out[0].flatten(), vec![1.0, 10.0, 11.0]);
    }

    #[test]
    fn add_input_checks_rank_and_fixed_dims() {
        let mut r = runner();
        assert!(matches!(r.add_input("inputs", &[4]), Err(XorError::RankMismatch { .. })));
        assert!(matches!(r.add_input("inputs", &[4, 3]), Err(XorError::ShapeMismatch { .. })));
        assert!(matches!(r.add_input("missing", &[4, 2]), Err(XorError::NodeNotFound(_))));
        assert!(r.add_input("inputs", &[4, 2]).is_ok());
    }

    #[test]
    fn unregistered_names_are_rejected() {
        let mut r = runner();
        let data = [0.0, 1.0];
        r.add_input("inputs", &[1, 2]).unwrap();
        assert!(matches!(r.run(&["out"], &[("inputs", &data[..])]), Err(XorError::NotRegistered(_))));
        r.add_output("out").unwrap();
        assert!(matches!(r.run(&["out"], &[("x", &data[..])]), Err(XorError::NotRegistered(_))));
    }

    #[test]
    fn wrong_data_length_is_rejected() {
        let mut r = runner();
        r.add_input("inputs", &[2, 2]).unwrap();
        r.add_output("out").unwrap();
        let data = [0.0, 1.0];
        assert!(matches!(r.run(&["out"], &[("inputs", &data[..])]), Err(XorError::ShapeMismatch { .. })));
    }
}
