use crate::{activation::activation::ActivationFunction, error::Result, graph::graph::GraphDef};
use crate::graph::node::{Initializer, Op};

/// Node names of one fully-connected layer added to a graph.
#[derive(Debug, Clone)]
pub struct Layer {
    pub size: usize,
    pub weights: String,
    pub biases: String,
    /// The node downstream layers should consume.
    pub output: String,
}

impl Layer {
    /// Adds `scope/weights (input_size, size)`, `scope/biases (1, size)`,
    /// `scope/MatMul`, `scope/BiasAdd` and, unless the activation is the
    /// identity, `scope/<Activation>` on top of `input`.
    ///
    /// Weights start Glorot-uniform, biases at zero.
    pub fn fully_connected(
        graph: &mut GraphDef,
        input: &str,
        input_size: usize,
        size: usize,
        activation: ActivationFunction,
        scope: &str,
    ) -> Result<Layer> {
        let weights = graph.add(
            format!("{scope}/weights"),
            Op::Variable { shape: (input_size, size), init: Initializer::GlorotUniform },
            &[],
        )?;
        let biases = graph.add(
            format!("{scope}/biases"),
            Op::Variable { shape: (1, size), init: Initializer::Zeros },
            &[],
        )?;
        let matmul = graph.add(format!("{scope}/MatMul"), Op::MatMul, &[input, weights.as_str()])?;
        let mut output = graph.add(format!("{scope}/BiasAdd"), Op::BiasAdd, &[matmul.as_str(), biases.as_str()])?;
        if activation != ActivationFunction::Identity {
            output = graph.add(
                format!("{scope}/{}", activation.op_name()),
                Op::Activation(activation),
                &[output.as_str()],
            )?;
        }

        Ok(Layer { size, weights, biases, output })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_layer_names_follow_scope() {
        let mut g = GraphDef::new();
        g.add("inputs", Op::Placeholder { shape: vec![None, Some(2)] }, &[]).unwrap();
        let layer = Layer::fully_connected(&mut g, "inputs", 2, 8, ActivationFunction::ReLU, "layer1").unwrap();
        assert_eq!(layer.output, "layer1/Relu");
        assert_eq!(
            g.op_names(),
            vec!["inputs", "layer1/weights", "layer1/biases", "layer1/MatMul", "layer1/BiasAdd", "layer1/Relu"]
        );
        assert_eq!(
            g.node("layer1/weights").unwrap().op,
            Op::Variable { shape: (2, 8), init: Initializer::GlorotUniform }
        );
    }

    #[test]
    fn identity_layer_ends_at_bias_add() {
        let mut g = GraphDef::new();
        g.add("h", Op::Placeholder { shape: vec![None, Some(4)] }, &[]).unwrap();
        let layer = Layer::fully_connected(&mut g, "h", 4, 1, ActivationFunction::Identity, "output").unwrap();
        assert_eq!(layer.output, "output/BiasAdd");
        assert!(g.node("output/Identity").is_none());
    }

    #[test]
    fn reusing_a_scope_fails() {
        let mut g = GraphDef::new();
        g.add("h", Op::Placeholder { shape: vec![None, Some(4)] }, &[]).unwrap();
        Layer::fully_connected(&mut g, "h", 4, 1, ActivationFunction::ReLU, "dup").unwrap();
        assert!(Layer::fully_connected(&mut g, "h", 4, 1, ActivationFunction::ReLU, "dup").is_err());
    }
}
