// src/error.rs
//! Error handling for the whole crate.
//!
//! The simulation core degrades instead of failing: overflow variants are
//! produced internally, logged, and counted in the step statistics. Only the
//! setup boundary (config loading, spawning) hands a `Result` to the caller.

use thiserror::Error;

/// Main error type.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A contact manifold already holds its maximum number of points.
    #[error("contact manifold full ({capacity} points), dropping point")]
    ManifoldOverflow { capacity: usize },

    /// The per-step manifold pool is full.
    #[error("manifold pool full ({capacity} manifolds), dropping manifold")]
    PoolOverflow { capacity: usize },

    /// The body store cannot take another body.
    #[error("body store full ({capacity} bodies)")]
    BodyCapacity { capacity: usize },

    /// A handle that does not name a spawned body.
    #[error("unknown body index {0}")]
    UnknownBody(usize),

    /// A configuration value outside its valid range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// I/O errors while reading config files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config (de)serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Context chaining.
    #[error("{message}: {source}")]
    WithContext {
        message: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Add context to any error (chainable, like `.context()` in anyhow).
    #[inline]
    pub fn context<C: Into<String>>(self, context: C) -> Self {
        Self::WithContext {
            message: context.into(),
            source: Box::new(self),
        }
    }

    #[inline]
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    // === kind checks ===
    #[inline]
    pub fn is_overflow(&self) -> bool {
        matches!(self, Error::ManifoldOverflow { .. } | Error::PoolOverflow { .. })
    }

    #[inline]
    pub fn is_config(&self) -> bool {
        match self {
            Error::InvalidConfig(_) | Error::Json(_) => true,
            Error::WithContext { source, .. } => source.is_config(),
            _ => false,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, Error>;
