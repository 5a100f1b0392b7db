/// The XOR truth table, in training order.
pub const XOR_INPUTS: [[f64; 2]; 4] = [[0.0, 0.0], [1.0, 1.0], [0.0, 1.0], [1.0, 0.0]];
pub const XOR_LABELS: [f64; 4] = [0.0, 0.0, 1.0, 1.0];

pub fn xor_inputs() -> Vec<Vec<f64>> {
    XOR_INPUTS.iter().map(|pair| pair.to_vec()).collect()
}

pub fn xor_labels() -> Vec<f64> {
    XOR_LABELS.to_vec()
}
