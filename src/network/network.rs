use rand::Rng;

use crate::activation::activation::ActivationFunction;
use crate::error::{Result, XorError};
use crate::graph::freeze::convert_variables_to_constants;
use crate::graph::gradients::gradients;
use crate::graph::graph::GraphDef;
use crate::graph::node::Op;
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;
use crate::optim::rmsprop::{RmsProp, RmsPropSlots};
use crate::session::session::Session;

pub const INPUTS: &str = "inputs";
pub const LABELS: &str = "labels";
/// The tensor a frozen graph exposes: the output layer's bias add.
pub const OUTPUT_NODE: &str = "output/BiasAdd";
pub const LOSS: &str = "absolute_difference/value";

pub const LEARNING_RATE: f64 = 1e-3;
pub const DECAY: f64 = 0.9;

/// 2 → 8 (ReLU) → 4 (ReLU) → 1 network trained with mean absolute error and
/// RMSProp.
///
/// The network owns its graph, the session holding its parameters, and the
/// optimizer's slots.
#[derive(Debug)]
pub struct XorNetwork {
    graph: GraphDef,
    session: Session,
    layers: Vec<Layer>,
    optimizer: RmsProp,
    slots: RmsPropSlots,
}

impl XorNetwork {
    /// Builds the network on `session`, or on a fresh session with every
    /// parameter initialized when none is given. A supplied session is used
    /// as-is.
    pub fn new(session: Option<Session>) -> Result<XorNetwork> {
        match session {
            Some(session) => XorNetwork::build(session),
            None => XorNetwork::with_rng(&mut rand::thread_rng()),
        }
    }

    /// Builds the network on a fresh session initialized from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(rng: &mut R) -> Result<XorNetwork> {
        let mut network = XorNetwork::build(Session::new())?;
        network.session.initialize(&network.graph, rng);
        Ok(network)
    }

    fn build(session: Session) -> Result<XorNetwork> {
        let mut graph = GraphDef::new();
        graph.add(INPUTS, Op::Placeholder { shape: vec![None, Some(2)] }, &[])?;

        let layer1 = Layer::fully_connected(&mut graph, INPUTS, 2, 8, ActivationFunction::ReLU, "layer1")?;
        let layer2 = Layer::fully_connected(&mut graph, &layer1.output, 8, 4, ActivationFunction::ReLU, "layer2")?;
        let output = Layer::fully_connected(&mut graph, &layer2.output, 4, 1, ActivationFunction::Identity, "output")?;

        graph.add(LABELS, Op::Placeholder { shape: vec![None, Some(1)] }, &[])?;
        graph.add(LOSS, Op::AbsoluteDifference, &[LABELS, output.output.as_str()])?;
        log::info!(
            "built network with {} nodes and {} variables",
            graph.nodes.len(),
            graph.variables().count()
        );

        Ok(XorNetwork {
            graph,
            session,
            layers: vec![layer1, layer2, output],
            optimizer: RmsProp::new(LEARNING_RATE, DECAY),
            slots: RmsPropSlots::default(),
        })
    }

    /// Runs one optimization step on the whole batch.
    ///
    /// Returns the outputs and loss computed with the parameters as they were
    /// before the step. Batch size and input width are checked before anything
    /// is computed.
    pub fn train(&mut self, inputs: &[Vec<f64>], labels: &[f64]) -> Result<(Vec<f64>, f64)> {
        if inputs.len() != labels.len() {
            return Err(XorError::BatchMismatch { inputs: inputs.len(), labels: labels.len() });
        }
        let x = input_matrix(inputs)?;
        let y = Matrix::column(labels);

        let values = self.session.evaluate(&self.graph, &[OUTPUT_NODE, LOSS], &[(INPUTS, &x), (LABELS, &y)])?;
        let grads = gradients(&self.graph, &values, LOSS)?;
        let update = self.optimizer.step(self.session.variables(), &grads, &self.slots)?;
        self.session.commit(update.params)?;
        self.slots = update.slots;

        let outputs = values.get(OUTPUT_NODE)
            .ok_or_else(|| XorError::NodeNotFound(OUTPUT_NODE.to_string()))?
            .flatten();
        let loss = values.get(LOSS)
            .ok_or_else(|| XorError::NodeNotFound(LOSS.to_string()))?
            .data[0][0];
        Ok((outputs, loss))
    }

    /// Forward pass only; parameters are untouched.
    pub fn predict(&self, inputs: &[Vec<f64>]) -> Result<Vec<f64>> {
        let x = input_matrix(inputs)?;
        let mut out = self.session.run(&self.graph, &[OUTPUT_NODE], &[(INPUTS, &x)])?;
        Ok(out.remove(0).flatten())
    }

    /// The inference subgraph with every parameter folded into a constant.
    pub fn freeze(&self) -> Result<GraphDef> {
        convert_variables_to_constants(&self.session, &self.graph, &[OUTPUT_NODE])
    }

    /// Current `(rows, cols)` of each layer's weight matrix, input to output.
    pub fn weight_shapes(&self) -> Result<Vec<(usize, usize)>> {
        self.layers.iter()
            .map(|layer| self.session.variable(&layer.weights).map(|w| w.shape()))
            .collect()
    }

    pub fn graph(&self) -> &GraphDef {
        &self.graph
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Hands back the session, e.g. to build another network on it.
    pub fn into_session(self) -> Session {
        self.session
    }
}

fn input_matrix(inputs: &[Vec<f64>]) -> Result<Matrix> {
    let x = Matrix::from_rows(inputs.to_vec())?;
    if x.cols != 2 {
        return Err(XorError::FeatureMismatch { row: 0, expected: 2, got: x.cols });
    }
    Ok(x)
}
