use thiserror::Error;

/// Errors raised while building, running, freezing or loading a graph.
#[derive(Error, Debug)]
pub enum XorError {
    #[error("cannot {op}: left operand is {left_rows}x{left_cols}, right operand is {right_rows}x{right_cols}")]
    ShapeMismatch {
        op: &'static str,
        left_rows: usize,
        left_cols: usize,
        right_rows: usize,
        right_cols: usize,
    },
    #[error("batch size mismatch: {inputs} input rows but {labels} labels")]
    BatchMismatch { inputs: usize, labels: usize },
    #[error("row {row} has {got} features, expected {expected}")]
    FeatureMismatch { row: usize, expected: usize, got: usize },
    #[error("empty batch")]
    EmptyBatch,
    #[error("node `{0}` not found in graph")]
    NodeNotFound(String),
    #[error("node `{0}` already exists in graph")]
    DuplicateNode(String),
    #[error("node `{node}` ({op}) expects {expected} inputs, has {got}")]
    Arity {
        node: String,
        op: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("placeholder `{0}` must be fed a value")]
    MissingFeed(String),
    #[error("attempting to use uninitialized variable `{0}`")]
    UninitializedVariable(String),
    #[error("variable `{name}` has shape {expected:?}, cannot assign value of shape {got:?}")]
    VariableShape {
        name: String,
        expected: (usize, usize),
        got: (usize, usize),
    },
    #[error("invalid op string `{0}`")]
    InvalidOpString(String),
    #[error("`{0}` has not been registered with the runner")]
    NotRegistered(String),
    #[error("number of dimensions is wrong for `{name}`: graph has {expected}, got {got}")]
    RankMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("invalid graph artifact: {0}")]
    InvalidArtifact(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Encode(#[from] bincode::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, XorError>;
