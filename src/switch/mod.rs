//! Switch-side negotiation: message dispatch plus capability providers.
//!
//! [`TtpSwitch`] implements the protocol surface of a switch. It owns the
//! supported protocol versions and delegates capability questions (which
//! TTPs exist, which parameters satisfy a query) to a [`CapabilityProvider`].
//! Two providers ship with the crate:
//!
//! - [`CatalogProvider`]: a fixed menu of pre-built parameter sets per TTP
//! - [`BudgetedSearchProvider`]: synthesizes parameter sets by splitting a
//!   shared resource budget between two tables

mod budget;
mod catalog;

pub use budget::{variable_ipv4_switch, BudgetedSearchProvider, DEFAULT_BUDGET, DEFAULT_STEP};
pub use catalog::{simple_ipv4_switch, CatalogProvider, IPV4_TTP};

use crate::constraint::{Constraint, ParamSet};
use crate::error::{Error, Result};
use crate::protocol::{kind, Message, Payload, TtpId, Version};

/// Protocol versions a switch supports unless overridden, oldest first.
pub const DEFAULT_VERSIONS: &[&str] = &["1.0"];

/// Anything that can play the switch role of the negotiation.
pub trait Switch {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Handle one request message and produce the response.
    fn handle(&mut self, message: &Message) -> Result<Message>;
}

/// Answers the capability questions behind a [`TtpSwitch`].
pub trait CapabilityProvider {
    /// TTPs the switch advertises, in preference order.
    fn ttps(&self) -> &[TtpId];

    /// Parameters satisfying `constraints` for one advertised TTP.
    ///
    /// Fails with [`Error::NoMatch`] when the TTP has no parameters under
    /// the constraints; the dispatcher turns that into the protocol's error
    /// response rather than failing the exchange.
    fn query(&self, ttp: &TtpId, constraints: &[Constraint]) -> Result<ParamSet>;
}

/// Protocol dispatcher for the switch role.
///
/// # Example
///
/// ```rust,ignore
/// let mut switch = TtpSwitch::new("lab-switch", CatalogProvider::simple_ipv4())
///     .with_versions(&["1.0", "2.0"]);
/// let resp = switch.handle(&Message::list_ttps())?;
/// ```
pub struct TtpSwitch<P> {
    name: String,
    versions: Vec<String>,
    negotiated: Option<String>,
    provider: P,
}

impl<P: CapabilityProvider> TtpSwitch<P> {
    /// Create a switch speaking [`DEFAULT_VERSIONS`]
    pub fn new(name: &str, provider: P) -> Self {
        Self {
            name: name.to_string(),
            versions: DEFAULT_VERSIONS.iter().map(ToString::to_string).collect(),
            negotiated: None,
            provider,
        }
    }

    /// Replace the supported protocol versions
    pub fn with_versions(mut self, versions: &[&str]) -> Self {
        self.versions = versions.iter().map(ToString::to_string).collect();
        self
    }

    /// Protocol version agreed in the last `ttp_begin` exchange, if any
    pub fn negotiated_version(&self) -> Option<&str> {
        self.negotiated.as_deref()
    }

    /// Borrow the capability provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn on_ttp_begin(&mut self, payload: &Payload) -> Result<Message> {
        let offered: Vec<Version> =
            payload.get_strings("versions")?.iter().map(|v| Version::parse(v)).collect();
        // The intersection compares parsed versions, so "01.0" on offer
        // still matches "1.0"; the reply keeps our spelling of the winner.
        let agreed = self
            .versions
            .iter()
            .filter(|ours| offered.contains(&Version::parse(ours.as_str())))
            .max_by_key(|v| Version::parse(v.as_str()))
            .ok_or(Error::NoSharedVersion)?
            .clone();

        tracing::info!("{}: agreed on protocol version {agreed}", self.name);
        self.negotiated = Some(agreed.clone());
        Ok(Message::ttp_version_resp(&agreed))
    }

    fn on_list_ttps(&self) -> Result<Message> {
        let ttps = self.provider.ttps().to_vec();
        tracing::debug!("{}: advertising {} TTPs", self.name, ttps.len());
        Ok(Message::list_ttps_resp(ttps))
    }

    fn on_ttp_query(&self, payload: &Payload) -> Result<Message> {
        let ttp = TtpId::new(payload.get_str("ttp_name")?, payload.get_str("ttp_version")?);
        let constraints = payload.get_constraints("param_constraints")?;
        tracing::debug!("{}: parameter query for {ttp}", self.name);

        match self.provider.query(&ttp, constraints) {
            Ok(params) => Ok(Message::ttp_query_resp(params)),
            Err(Error::NoMatch(reason)) => {
                tracing::info!("{}: {reason}", self.name);
                Ok(Message::ttp_query_resp_err(&reason))
            },
            Err(err) => Err(err),
        }
    }
}

impl<P: CapabilityProvider> Switch for TtpSwitch<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&mut self, message: &Message) -> Result<Message> {
        tracing::debug!("{}: received {}", self.name, message.kind);
        match message.kind.as_str() {
            kind::TTP_BEGIN => self.on_ttp_begin(&message.payload),
            kind::LIST_TTPS => self.on_list_ttps(),
            kind::TTP_QUERY => self.on_ttp_query(&message.payload),
            other => Err(Error::UnknownMessage(other.to_string())),
        }
    }
}
