//! # ttpneg: table type pattern negotiation for SDN switches
//!
//! Capability negotiation between an SDN controller and a switch: agree on
//! a protocol version, pick a table type pattern (TTP) both sides support,
//! then settle the table parameters under the controller's constraints.
//!
//! ## Features
//!
//! - **Version negotiation**: dotted version labels with numeric-aware ordering
//! - **TTP selection**: controller preference order against the switch's advertisement
//! - **Parameter negotiation**: hard bounds plus weighted scoring over named parameters
//! - **Two switch models**: a fixed catalog of builds, and a budgeted table search
//! - **JSON projection**: every message survives a serialization round trip
//!
//! ## Protocol Overview
//!
//! A negotiation is three request/response phases, driven by the controller:
//!
//! ```text
//! Controller                         Switch
//!    |                                |
//!    |------ ttp_begin (versions) -->|   Phase 1: protocol version
//!    |<----- ttp_version_resp -------|
//!    |                                |
//!    |------ list_ttps ------------->|   Phase 2: TTP selection
//!    |<----- list_ttps_resp (ttps) --|
//!    |                                |
//!    |------ ttp_query (constraints)>|   Phase 3: parameters
//!    |<----- ttp_query_resp (params)-|
//!    |    or ttp_query_resp_err      |
//! ```
//!
//! ### Outcomes
//!
//! | Condition                                  | Result                   |
//! |--------------------------------------------|--------------------------|
//! | Empty version intersection                 | [`Error::NoSharedVersion`] |
//! | No preferred TTP advertised                | [`Error::NoSharedTtp`]   |
//! | Selected TTP family has no profile         | [`Error::NotImplemented`] |
//! | No parameter set satisfies the constraints | [`Error::NoMatch`]       |
//! | All phases succeed                         | [`NegotiatedTtp`]        |
//!
//! ## Quick Start
//!
//! ### Against the catalog switch
//!
//! ```rust,ignore
//! use ttpneg::{simple_ipv4_switch, Controller};
//!
//! let controller = Controller::new();
//! let mut switch = simple_ipv4_switch();
//!
//! let outcome = controller.negotiate(&mut switch).unwrap();
//! println!("agreed on {outcome}");
//! ```
//!
//! ### A custom switch
//!
//! ```rust,ignore
//! use ttpneg::{CatalogProvider, Controller, ParamSet, TtpId, TtpSwitch};
//!
//! let provider = CatalogProvider::new().with_catalog(
//!     TtpId::new("org.opennetworking/ttps/IPV4", "1.0"),
//!     vec![ParamSet::new()
//!         .with("IPV4 table size", 4096)
//!         .with("MAC table size", 4096)],
//! );
//! let mut switch = TtpSwitch::new("bench-top", provider).with_versions(&["1.0", "2.0"]);
//!
//! let outcome = Controller::new().negotiate(&mut switch).unwrap();
//! ```
//!
//! ### Constraints by hand
//!
//! ```rust,ignore
//! use ttpneg::{feasible, score, BoundConstraint, BoundKind, Constraint, ParamSet};
//!
//! let constraints: Vec<Constraint> =
//!     vec![BoundConstraint::new(BoundKind::Max, "IPV4 table size", 11.0)
//!         .with_min(3000)
//!         .with_max(10000)
//!         .into()];
//! let candidate = ParamSet::new().with("IPV4 table size", 5000);
//!
//! assert!(feasible(&constraints, &candidate));
//! println!("score {}", score(&constraints, &candidate));
//! ```
//!
//! ## Modules
//!
//! - [`protocol`]: message envelope, payload values, version ordering
//! - [`constraint`]: constraint model plus the feasibility/scoring evaluator
//! - [`switch`]: switch-side dispatch and the capability providers
//! - [`controller`]: controller-side phase driver
//! - [`config`]: TOML configuration
//! - [`error`]: error types and result alias

pub mod config;
pub mod constraint;
pub mod controller;
pub mod error;
pub mod protocol;
pub mod switch;

// Re-exports for convenience
pub use config::Config;
pub use constraint::{
    feasible, score, BoundConstraint, BoundKind, Constraint, ParamSet, ParamValue, RatioConstraint,
};
pub use controller::{Controller, NegotiatedTtp};
pub use error::{Error, Result};
pub use protocol::{kind, Message, Payload, TtpId, Value, Version, PROTOCOL_VERSIONS};
pub use switch::{
    simple_ipv4_switch, variable_ipv4_switch, BudgetedSearchProvider, CapabilityProvider,
    CatalogProvider, Switch, TtpSwitch,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
