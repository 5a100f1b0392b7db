use crate::error::Result;
use crate::math::matrix::Matrix;
use crate::session::session::Params;

/// RMSProp with optional momentum.
///
/// Per parameter:
///   ms  = ms + (g² - ms) · (1 - decay)
///   mom = momentum · mom + lr · g / sqrt(ms + epsilon)
///   θ   = θ - mom
///
/// The mean-square slot starts at one, the momentum slot at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct RmsProp {
    pub learning_rate: f64,
    pub decay: f64,
    pub momentum: f64,
    pub epsilon: f64,
}

/// Per-parameter accumulators carried between steps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RmsPropSlots {
    pub ms: Params,
    pub mom: Params,
}

/// The outcome of one step. Nothing changes until the caller commits it.
#[derive(Debug, Clone)]
pub struct Update {
    pub params: Params,
    pub slots: RmsPropSlots,
}

impl RmsProp {
    pub fn new(learning_rate: f64, decay: f64) -> RmsProp {
        RmsProp { learning_rate, decay, momentum: 0.0, epsilon: 1e-10 }
    }

    /// Computes the next parameter values from the current ones.
    ///
    /// Only parameters with a gradient move; the rest are left out of the
    /// returned `params`.
    pub fn step(&self, params: &Params, grads: &Params, slots: &RmsPropSlots) -> Result<Update> {
        let mut next = Update { params: Params::new(), slots: slots.clone() };
        for (name, grad) in grads {
            let Some(param) = params.get(name) else {
                continue;
            };
            let ms = match slots.ms.get(name) {
                Some(ms) => ms.clone(),
                None => Matrix::filled(param.rows, param.cols, 1.0),
            };
            let mom = match slots.mom.get(name) {
                Some(mom) => mom.clone(),
                None => Matrix::zeros(param.rows, param.cols),
            };

            let ms = ms.zip_map(grad, "accumulate mean square", |m, g| m + (g * g - m) * (1.0 - self.decay))?;
            let scaled = grad.zip_map(&ms, "scale gradient", |g, m| self.learning_rate * g / (m + self.epsilon).sqrt())?;
            let mom = mom.zip_map(&scaled, "accumulate momentum", |v, s| self.momentum * v + s)?;
            let updated = param.sub(&mom)?;

            next.params.insert(name.clone(), updated);
            next.slots.ms.insert(name.clone(), ms);
            next.slots.mom.insert(name.clone(), mom);
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn single(name: &str, value: Matrix) -> Params {
        Params::from([(name.to_string(), value)])
    }

    #[test]
    fn first_step_uses_unit_mean_square() {
        let opt = RmsProp::new(0.001, 0.9);
        let params = single("w", Matrix::filled(1, 1, 0.5));
        let grads = single("w", Matrix::filled(1, 1, 2.0));
        let update = opt.step(&params, &grads, &RmsPropSlots::default()).unwrap();

        // ms = 1 + (4 - 1) * 0.1 = 1.3
        let ms = update.slots.ms["w"].data[0][0];
        assert_abs_diff_eq!(ms, 1.3, epsilon = 1e-12);
        let expected = 0.5 - 0.001 * 2.0 / 1.3f64.sqrt();
        assert_abs_diff_eq!(update.params["w"].data[0][0], expected, epsilon = 1e-12);
    }

    #[test]
    fn step_is_pure() {
        let opt = RmsProp::new(0.001, 0.9);
        let params = single("w", Matrix::filled(2, 2, 1.0));
        let grads = single("w", Matrix::filled(2, 2, -1.0));
        let slots = RmsPropSlots::default();
        let a = opt.step(&params, &grads, &slots).unwrap();
        let b = opt.step(&params, &grads, &slots).unwrap();
        assert_eq!(a.params, b.params);
        assert_eq!(params["w"], Matrix::filled(2, 2, 1.0));
        assert!(slots.ms.is_empty());
    }

    #[test]
    fn steps_approach_learning_rate_for_steady_gradient() {
        let opt = RmsProp::new(0.001, 0.9);
        let mut params = single("w", Matrix::filled(1, 1, 0.0));
        let grads = single("w", Matrix::filled(1, 1, 0.25));
        let mut slots = RmsPropSlots::default();
        let mut last = 0.0;
        for _ in 0..200 {
            let update = opt.step(&params, &grads, &slots).unwrap();
            last = params["w"].data[0][0] - update.params["w"].data[0][0];
            params = update.params;
            slots = update.slots;
        }
        assert_abs_diff_eq!(last, 0.001, epsilon = 1e-6);
    }

    #[test]
    fn mismatched_gradient_shape_fails() {
        let opt = RmsProp::new(0.001, 0.9);
        let params = single("w", Matrix::zeros(2, 1));
        let grads = single("w", Matrix::zeros(1, 2));
        assert!(opt.step(&params, &grads, &RmsPropSlots::default()).is_err());
    }
}
