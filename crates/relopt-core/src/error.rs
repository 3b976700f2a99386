use thiserror::Error;

/// Canonical result for every relopt crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or inconsistent setup (trait kinds, conventions, config values).
    /// Fatal at session start; never retried.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A trait kind was looked up that the registry does not know about, or a
    /// trait set does not match the registry's arity.
    #[error("Trait registry error: {0}")]
    Registry(String),

    /// An unconfigured convention was asked to enforce traits. Distinct from a
    /// configured convention that simply has no enforcement path (`Ok(None)`).
    #[error("{convention}#enforce() is not implemented")]
    Unsupported { convention: String },

    /// Operand/type mismatch while building a scalar expression.
    #[error("Malformed expression: {0}")]
    Expr(String),

    /// A converter was constructed that changes more (or other) than the one
    /// trait slot it claims to change.
    #[error("Invalid converter: {0}")]
    Converter(String),

    #[error("No implementable plan found: {0}")]
    NotImplementable(String),

    /// JSON encoding of plan snapshots, configs or fingerprint inputs.
    #[error("Serialization error: {0}")]
    Serde(String),

    #[error("Internal invariant failed: {0}")]
    Invariant(String),
}

impl Error {
    /// True for the "fail loudly" family: programmer or configuration mistakes
    /// that must not be treated as a normal negative search outcome.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::Registry(_) | Error::Unsupported { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serde(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Config(e.to_string())
    }
}
