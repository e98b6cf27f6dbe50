//! TTP negotiation protocol: messages, payload values, version ordering.
//!
//! A controller and a switch agree on a table type pattern in three phases,
//! each a single request/response pair.
//!
//! # Message Flow
//!
//! ```text
//! Controller                         Switch
//!    |                                |
//!    |------ ttp_begin (versions) -->|  Offer protocol versions
//!    |<----- ttp_version_resp -------|  Highest shared version
//!    |                                |
//!    |------ list_ttps ------------->|  Ask for supported TTPs
//!    |<----- list_ttps_resp (ttps) --|  Advertised (name, version) pairs
//!    |                                |
//!    |------ ttp_query (constraints)>|  Ask for parameters of one TTP
//!    |<----- ttp_query_resp (params)-|  Feasible parameter set
//!    |    or ttp_query_resp_err      |  No satisfying parameters
//! ```
//!
//! # Payload Vocabulary
//!
//! | Kind                 | Payload fields                                |
//! |----------------------|-----------------------------------------------|
//! | `ttp_begin`          | `versions`: offered protocol versions         |
//! | `ttp_version_resp`   | `version`: agreed protocol version            |
//! | `list_ttps`          | (empty)                                       |
//! | `list_ttps_resp`     | `ttps`: advertised TTP identities             |
//! | `ttp_query`          | `ttp_name`, `ttp_version`, `param_constraints`|
//! | `ttp_query_resp`     | `params`: negotiated parameter set            |
//! | `ttp_query_resp_err` | `error`: failure description                  |
//!
//! Protocol versions are dotted labels ordered component-wise by [`Version`];
//! TTP versions are opaque and matched by equality.

mod message;
mod version;

pub use message::{kind, Message, Payload, TtpId, Value};
pub use version::{Component, Version};

/// Negotiation protocol versions this crate can drive, oldest first.
pub const PROTOCOL_VERSIONS: &[&str] = &["1.0", "2.0"];
