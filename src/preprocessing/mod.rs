//! Data preprocessing module
//!
//! Feature scaling fitted at training time and replayed at prediction time.

mod scaler;

pub use scaler::Scaler;
