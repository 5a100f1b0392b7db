pub mod session;

pub use session::{Params, Session, Values};
