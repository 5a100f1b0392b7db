use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationFunction {
    ReLU,
    /// No nonlinearity; a layer with this activation ends at its bias add.
    Identity,
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Identity => x,
        }
    }

    /// Element-wise derivative, taken at the pre-activation value.
    /// The ReLU kink at zero has derivative 0.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Identity => 1.0,
        }
    }

    /// Suffix used for the node this activation adds under a layer scope.
    pub fn op_name(&self) -> &'static str {
        match self {
            ActivationFunction::ReLU => "Relu",
            ActivationFunction::Identity => "Identity",
        }
    }
}
