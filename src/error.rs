//! Error type for the catalog, configuration and scene boundary.
//!
//! The numeric core in [`crate::physics`] and [`crate::sampling`] never fails;
//! these variants only describe bad input arriving from callers.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// No catalog entry with this id.
    #[error("Unknown orbital: {0}")]
    UnknownOrbital(String),

    /// Color string is not `#RRGGBB`.
    #[error("Invalid color: {0}. Expected #RRGGBB")]
    InvalidColor(String),

    #[error("Point count {count} out of range {min}..={max}")]
    PointCountOutOfRange { count: usize, min: usize, max: usize },

    #[error("Opacity {opacity} out of range {min}..={max}")]
    OpacityOutOfRange { opacity: f32, min: f32, max: f32 },

    #[error("Invalid port number: {0}. Must be between 1 and 65535")]
    InvalidPort(String),

    /// An environment variable was set but could not be parsed.
    #[error("Environment variable {name} has invalid value {value:?}")]
    InvalidEnv { name: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = Error::UnknownOrbital("5g".to_string());
        assert!(err.to_string().contains("5g"));

        let err = Error::PointCountOutOfRange { count: 10, min: 5000, max: 80000 };
        assert_eq!(err.to_string(), "Point count 10 out of range 5000..=80000");
    }
}
