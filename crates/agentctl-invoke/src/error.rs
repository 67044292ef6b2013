//! Error types for agentctl-invoke
//!
//! Translation itself never fails. These errors cover parsing abstract
//! option values from user input.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Unknown {field} value '{value}' (expected one of: {expected})")]
    UnknownValue {
        field: &'static str,
        value: String,
        expected: String,
    },

    #[error("Invalid flag mapping: {message}")]
    InvalidFlagArgs { message: String },
}
