use std::collections::{BTreeMap, HashMap};

use rand::Rng;

use crate::error::{Result, XorError};
use crate::graph::graph::GraphDef;
use crate::graph::node::{Initializer, NodeDef, Op};
use crate::loss::mae::MaeLoss;
use crate::math::matrix::Matrix;

/// Variable name -> value, ordered by name.
pub type Params = BTreeMap<String, Matrix>;

/// Every node value computed during one evaluation, keyed by node name.
pub type Values = HashMap<String, Matrix>;

/// Execution context: holds the live values of a graph's variables and
/// evaluates nodes against them.
///
/// A session is created explicitly and handed to whoever owns it; dropping it
/// releases every value it holds.
#[derive(Debug, Clone, Default)]
pub struct Session {
    variables: Params,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    /// Gives every variable in `graph` its starting value.
    pub fn initialize<R: Rng + ?Sized>(&mut self, graph: &GraphDef, rng: &mut R) {
        for node in graph.variables() {
            if let Op::Variable { shape: (rows, cols), init } = node.op {
                let value = match init {
                    Initializer::GlorotUniform => Matrix::glorot_uniform(rows, cols, rng),
                    Initializer::Zeros => Matrix::zeros(rows, cols),
                };
                log::debug!("initialized {} with shape {}x{}", node.name, rows, cols);
                self.variables.insert(node.name.clone(), value);
            }
        }
    }

    pub fn variable(&self, name: &str) -> Result<&Matrix> {
        self.variables.get(name)
            .ok_or_else(|| XorError::UninitializedVariable(name.to_string()))
    }

    pub fn variables(&self) -> &Params {
        &self.variables
    }

    /// Replaces variable values. Every name must already hold a value of the
    /// same shape; nothing is written unless all of them do.
    pub fn commit(&mut self, params: Params) -> Result<()> {
        for (name, value) in &params {
            let current = self.variable(name)?;
            if current.shape() != value.shape() {
                return Err(XorError::VariableShape {
                    name: name.clone(),
                    expected: current.shape(),
                    got: value.shape(),
                });
            }
        }
        self.variables.extend(params);
        Ok(())
    }

    /// Evaluates `fetches` and returns their values in the same order.
    pub fn run(&self, graph: &GraphDef, fetches: &[&str], feeds: &[(&str, &Matrix)]) -> Result<Vec<Matrix>> {
        let mut values = self.evaluate(graph, fetches, feeds)?;
        fetches.iter()
            .map(|name| values.remove(*name).ok_or_else(|| XorError::NodeNotFound(name.to_string())))
            .collect()
    }

    /// Evaluates `fetches` and everything they depend on, returning all the
    /// intermediate values as well.
    pub fn evaluate(&self, graph: &GraphDef, fetches: &[&str], feeds: &[(&str, &Matrix)]) -> Result<Values> {
        let mut values = Values::new();
        for (name, value) in feeds {
            let node = graph.require(name)?;
            if let Op::Placeholder { shape } = &node.op {
                check_feed(name, shape, value)?;
            }
            values.insert(name.to_string(), (*value).clone());
        }
        for fetch in fetches {
            self.eval_node(graph, graph.require(fetch)?, &mut values)?;
        }
        Ok(values)
    }

    fn eval_node(&self, graph: &GraphDef, node: &NodeDef, values: &mut Values) -> Result<()> {
        if values.contains_key(&node.name) {
            return Ok(());
        }
        for input in &node.inputs {
            self.eval_node(graph, graph.require(input)?, values)?;
        }
        let value = match &node.op {
            Op::Placeholder { .. } => return Err(XorError::MissingFeed(node.name.clone())),
            Op::Variable { .. } => self.variable(&node.name)?.clone(),
            Op::Const { value } => value.clone(),
            Op::MatMul => operand(node, values, 0)?.matmul(operand(node, values, 1)?)?,
            Op::BiasAdd => operand(node, values, 0)?.add_row(operand(node, values, 1)?)?,
            Op::Activation(f) => operand(node, values, 0)?.map(|x| f.function(x)),
            Op::AbsoluteDifference => {
                Matrix::filled(1, 1, MaeLoss::loss(operand(node, values, 0)?, operand(node, values, 1)?)?)
            }
        };
        values.insert(node.name.clone(), value);
        Ok(())
    }
}

fn operand<'a>(node: &NodeDef, values: &'a Values, i: usize) -> Result<&'a Matrix> {
    let name = node.inputs.get(i).ok_or_else(|| XorError::Arity {
        node: node.name.clone(),
        op: node.op.type_name(),
        expected: i + 1,
        got: node.inputs.len(),
    })?;
    values.get(name).ok_or_else(|| XorError::NodeNotFound(name.clone()))
}

fn check_feed(name: &str, shape: &[Option<usize>], value: &Matrix) -> Result<()> {
    if shape.len() != 2 {
        return Err(XorError::RankMismatch { name: name.to_string(), expected: shape.len(), got: 2 });
    }
    let fits = |dim: Option<usize>, got: usize| dim.map_or(true, |d| d == got);
    if !fits(shape[0], value.rows) || !fits(shape[1], value.cols) {
        return Err(XorError::ShapeMismatch {
            op: "feed placeholder",
            left_rows: shape[0].unwrap_or(value.rows),
            left_cols: shape[1].unwrap_or(value.cols),
            right_rows: value.rows,
            right_cols: value.cols,
        });
    }
    Ok(())
}
