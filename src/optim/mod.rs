pub mod rmsprop;

pub use rmsprop::{RmsProp, RmsPropSlots, Update};
