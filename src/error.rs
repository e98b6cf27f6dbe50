//! TTP negotiation error types.
//!
//! Every fatal condition aborts the current negotiation attempt cleanly;
//! none are retried by this crate. The only error that crosses the
//! controller/switch boundary as data rather than as an `Err` is
//! [`Error::NoMatch`], which a switch reports inside a structured
//! `ttp_query_resp_err` response.

use thiserror::Error;

/// TTP negotiation errors.
#[derive(Error, Debug)]
pub enum Error {
    /// The version intersection between controller and switch is empty.
    #[error("No shared protocol version")]
    NoSharedVersion,

    /// No TTP in the controller's preference list is advertised by the switch.
    #[error("No shared TTP between controller and switch")]
    NoSharedTtp,

    /// Negotiation was requested for a TTP family this controller cannot
    /// negotiate yet.
    #[error("Negotiation not implemented for {0}")]
    NotImplemented(String),

    /// A parameter query found no feasible parameter set.
    #[error("No parameter match: {0}")]
    NoMatch(String),

    /// A switch was handed a message kind it does not recognize.
    #[error("Unknown message kind: {0}")]
    UnknownMessage(String),

    /// A payload field was missing or had the wrong shape.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// A peer answered a phase with an unexpected message kind.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for negotiation operations
pub type Result<T> = std::result::Result<T, Error>;
