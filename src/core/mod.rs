mod projection;
mod types;

pub use projection::run_projection;
pub use types::{Inputs, InvalidInputError, Projection};
