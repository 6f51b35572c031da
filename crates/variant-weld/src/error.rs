//! Error type shared by every stage of the pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration, extracting schemas or
/// synthesizing bindings.
///
/// Every variant is fatal for the current run: generation is all-or-nothing.
#[derive(Debug, Error)]
pub enum WeldError {
    /// A configured class has no documentation record
    #[error("no documentation record for configured class `{0}`")]
    MissingRecord(String),

    /// A type name is not present in the type mapping table
    #[error("unmapped type `{ty}` in {class}.{context}")]
    UnmappedType {
        class: String,
        context: String,
        ty: String,
    },

    /// A scripting tag referenced by a schema has no mapping entry
    #[error("unknown type tag `{tag}` referenced by {class}.{context}")]
    UnknownTag {
        class: String,
        context: String,
        tag: String,
    },

    /// The override configuration is inconsistent
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Two constructor overloads cannot be told apart at call time
    #[error("ambiguous constructors for `{class}` with {argc} argument(s): {detail}")]
    AmbiguousConstructor {
        class: String,
        argc: usize,
        detail: String,
    },

    /// Environment variable not set
    #[error("environment variable not set: {0}")]
    EnvVarMissing(String),

    /// A documentation record could not be parsed
    #[error("failed to parse documentation record {path}: {source}")]
    Record {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl WeldError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn unmapped(
        class: impl Into<String>,
        context: impl Into<String>,
        ty: impl Into<String>,
    ) -> Self {
        Self::UnmappedType {
            class: class.into(),
            context: context.into(),
            ty: ty.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type WeldResult<T> = Result<T, WeldError>;
