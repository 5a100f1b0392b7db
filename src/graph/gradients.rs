use std::collections::HashMap;

use crate::error::{Result, XorError};
use crate::graph::graph::GraphDef;
use crate::graph::node::{NodeDef, Op};
use crate::loss::mae::MaeLoss;
use crate::math::matrix::Matrix;
use crate::session::session::{Params, Values};

/// Reverse-mode differentiation of the scalar node `loss` with respect to
/// every variable it depends on.
///
/// `values` must hold the forward values of `loss` and all its ancestors, as
/// returned by `Session::evaluate`.
pub fn gradients(graph: &GraphDef, values: &Values, loss: &str) -> Result<Params> {
    let end = graph.position(loss).ok_or_else(|| XorError::NodeNotFound(loss.to_string()))?;
    let mut upstream: HashMap<&str, Matrix> = HashMap::new();
    upstream.insert(loss, Matrix::filled(1, 1, 1.0));
    let mut grads = Params::new();

    // Node order is topological, so walking it backwards visits every
    // consumer before its producers.
    for node in graph.nodes[..=end].iter().rev() {
        let Some(grad) = upstream.remove(node.name.as_str()) else {
            continue;
        };
        let contributions: Vec<(&str, Matrix)> = match &node.op {
            Op::Variable { .. } => {
                grads.insert(node.name.clone(), grad);
                continue;
            }
            Op::Placeholder { .. } | Op::Const { .. } => continue,
            Op::MatMul => {
                let (a_name, a) = input(node, values, 0)?;
                let (b_name, b) = input(node, values, 1)?;
                vec![
                    (a_name, grad.matmul(&b.transpose())?),
                    (b_name, a.transpose().matmul(&grad)?),
                ]
            }
            Op::BiasAdd => {
                let (x_name, _) = input(node, values, 0)?;
                let (b_name, _) = input(node, values, 1)?;
                vec![(b_name, grad.column_sums()), (x_name, grad)]
            }
            Op::Activation(f) => {
                let (x_name, x) = input(node, values, 0)?;
                vec![(x_name, grad.hadamard(&x.map(|v| f.derivative(v)))?)]
            }
            Op::AbsoluteDifference => {
                let (_, labels) = input(node, values, 0)?;
                let (p_name, predictions) = input(node, values, 1)?;
                let scale = grad.data[0][0];
                let d = MaeLoss::derivative(labels, predictions)?.map(|v| v * scale);
                vec![(p_name, d)]
            }
        };
        for (name, contribution) in contributions {
            let summed = match upstream.remove(name) {
                Some(existing) => existing.add(&contribution)?,
                None => contribution,
            };
            upstream.insert(name, summed);
        }
    }
    Ok(grads)
}

fn input<'a>(node: &'a NodeDef, values: &'a Values, i: usize) -> Result<(&'a str, &'a Matrix)> {
    let name = node.inputs.get(i).ok_or_else(|| XorError::Arity {
        node: node.name.clone(),
        op: node.op.type_name(),
        expected: i + 1,
        got: node.inputs.len(),
    })?;
    let value = values.get(name).ok_or_else(|| XorError::NodeNotFound(name.clone()))?;
    Ok((name.as_str(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::graph::node::Initializer;
    use crate::session::session::Session;
    use approx::assert_abs_diff_eq;

    fn two_layer() -> (GraphDef, Session) {
        let mut g = GraphDef::new();
        g.add("x", Op::Placeholder { shape: vec![None, Some(2)] }, &[]).unwrap();
        g.add("y", Op::Placeholder { shape: vec![None, Some(1)] }, &[]).unwrap();
        g.add("w1", Op::Variable { shape: (2, 3), init: Initializer::Zeros }, &[]).unwrap();
        g.add("b1", Op::Variable { shape: (1, 3), init: Initializer::Zeros }, &[]).unwrap();
        g.add("w2", Op::Variable { shape: (3, 1), init: Initializer::Zeros }, &[]).unwrap();
        g.add("b2", Op::Variable { shape: (1, 1), init: Initializer::Zeros }, &[]).unwrap();
        g.add("mm1", Op::MatMul, &["x", "w1"]).unwrap();
        g.add("z1", Op::BiasAdd, &["mm1", "b1"]).unwrap();
        g.add("h1", Op::Activation(ActivationFunction::ReLU), &["z1"]).unwrap();
        g.add("mm2", Op::MatMul, &["h1", "w2"]).unwrap();
        g.add("out", Op::BiasAdd, &["mm2", "b2"]).unwrap();
        g.add("loss", Op::AbsoluteDifference, &["y", "out"]).unwrap();

        let mut session = Session::new();
        session.initialize(&g, &mut rand::thread_rng());
        let mut params = Params::new();
        params.insert("w1".into(), Matrix::from_flat(2, 3, &[0.5, -0.3, 0.8, 0.2, 0.7, -0.4]).unwrap());
        params.insert("b1".into(), Matrix::from_flat(1, 3, &[0.1, 0.05, 0.3]).unwrap());
        params.insert("w2".into(), Matrix::column(&[0.6, -0.9, 0.4]));
        params.insert("b2".into(), Matrix::filled(1, 1, 0.05));
        session.commit(params).unwrap();
        (g, session)
    }

    fn loss_at(g: &GraphDef, session: &Session, x: &Matrix, y: &Matrix) -> f64 {
        session.run(g, &["loss"], &[("x", x), ("y", y)]).unwrap()[0].data[0][0]
    }

    #[test]
    fn matches_finite_differences() {
        let (g, session) = two_layer();
        let x = Matrix::from_rows(vec![vec![1.0, 0.0], vec![0.5, 1.0], vec![1.0, 1.0]]).unwrap();
        let y = Matrix::column(&[2.0, -1.0, 3.0]);
        let values = session.evaluate(&g, &["loss"], &[("x", &x), ("y", &y)]).unwrap();
        let grads = gradients(&g, &values, "loss").unwrap();
        assert_eq!(grads.len(), 4);

        let eps = 1e-6;
        for (name, grad) in &grads {
            let base = session.variable(name).unwrap().clone();
            assert_eq!(grad.shape(), base.shape());
            for i in 0..base.rows {
                for j in 0..base.cols {
                    let mut bumped = session.clone();
                    let mut plus = base.clone();
                    plus.data[i][j] += eps;
                    bumped.commit(Params::from([(name.clone(), plus)])).unwrap();
                    let up = loss_at(&g, &bumped, &x, &y);
                    let mut minus = base.clone();
                    minus.data[i][j] -= eps;
                    bumped.commit(Params::from([(name.clone(), minus)])).unwrap();
                    let down = loss_at(&g, &bumped, &x, &y);
                    assert_abs_diff_eq!(grad.data[i][j], (up - down) / (2.0 * eps), epsilon = 1e-5);
                }
            }
        }
    }

    #[test]
    fn dead_units_get_zero_gradient() {
        let (g, mut session) = two_layer();
        session.commit(Params::from([("b1".to_string(), Matrix::filled(1, 3, -10.0))])).unwrap();
        let x = Matrix::from_rows(vec![vec![1.0, 1.0]]).unwrap();
        let y = Matrix::column(&[1.0]);
        let values = session.evaluate(&g, &["loss"], &[("x", &x), ("y", &y)]).unwrap();
        let grads = gradients(&g, &values, "loss").unwrap();
        assert!(grads["w1"].flatten().iter().all(|v| *v == 0.0));
        assert_eq!(grads["b2"].flatten(), vec![-1.0]);
    }

    #[test]
    fn unknown_loss_node_fails() {
        let (g, _) = two_layer();
        assert!(matches!(gradients(&g, &Values::new(), "nope"), Err(XorError::NodeNotFound(_))));
    }
}
