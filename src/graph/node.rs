use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::math::matrix::Matrix;

/// How a variable gets its starting value when a session is initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Initializer {
    GlorotUniform,
    Zeros,
}

/// The operation a node performs. Every op produces exactly one tensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Op {
    /// Fed at run time. `None` dimensions accept any size.
    Placeholder { shape: Vec<Option<usize>> },
    /// Trainable state living in a session.
    Variable { shape: (usize, usize), init: Initializer },
    Const { value: Matrix },
    /// inputs: `[a, b]`, computes `a · b`.
    MatMul,
    /// inputs: `[x, bias]`, adds the `1 x n` bias to every row of `x`.
    BiasAdd,
    /// inputs: `[x]`.
    Activation(ActivationFunction),
    /// inputs: `[labels, predictions]`, produces `1 x 1` mean(|labels - predictions|).
    AbsoluteDifference,
}

impl Op {
    pub fn type_name(&self) -> &'static str {
        match self {
            Op::Placeholder { .. } => "Placeholder",
            Op::Variable { .. } => "VariableV2",
            Op::Const { .. } => "Const",
            Op::MatMul => "MatMul",
            Op::BiasAdd => "BiasAdd",
            Op::Activation(f) => f.op_name(),
            Op::AbsoluteDifference => "AbsoluteDifference",
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Op::Variable { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    pub name: String,
    pub op: Op,
    /// Names of the nodes whose outputs feed this one, in operand order.
    pub inputs: Vec<String>,
}

impl NodeDef {
    pub fn new(name: impl Into<String>, op: Op, inputs: Vec<String>) -> NodeDef {
        NodeDef { name: name.into(), op, inputs }
    }
}
