//! Controller-side negotiation: drives the three phases against a switch.
//!
//! The controller owns the protocol versions it offers, an ordered TTP
//! preference list, and the constraint profile for each TTP family it knows
//! how to configure. One call to [`Controller::negotiate`] runs version
//! negotiation, TTP selection and parameter negotiation, and returns the
//! agreed [`NegotiatedTtp`].
//!
//! ```rust,ignore
//! let controller = Controller::new();
//! let mut switch = simple_ipv4_switch();
//! let outcome = controller.negotiate(&mut switch)?;
//! println!("negotiated {outcome}");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constraint::{BoundConstraint, BoundKind, Constraint, ParamSet, RatioConstraint};
use crate::error::{Error, Result};
use crate::protocol::{kind, Message, TtpId, Version, PROTOCOL_VERSIONS};
use crate::switch::{Switch, IPV4_TTP};

/// Everything agreed during one successful negotiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiatedTtp {
    /// Agreed protocol version.
    pub version: String,
    /// Selected table type pattern.
    pub ttp: TtpId,
    /// Parameters the switch will configure its tables with.
    pub params: ParamSet,
}

impl fmt::Display for NegotiatedTtp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} via protocol {}: {}", self.ttp, self.version, self.params)
    }
}

/// The controller role of the negotiation.
pub struct Controller {
    versions: Vec<String>,
    preferences: Vec<TtpId>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    /// Create a controller offering [`PROTOCOL_VERSIONS`] and preferring
    /// combined v4/v6 forwarding, then IPv4 (newest TTP first), then IPv6
    pub fn new() -> Self {
        Self {
            versions: PROTOCOL_VERSIONS.iter().map(ToString::to_string).collect(),
            preferences: vec![
                TtpId::new("org.opennetworking/ttps/IPV4+IPV6", "2.0"),
                TtpId::new(IPV4_TTP, "2.0"),
                TtpId::new(IPV4_TTP, "1.0"),
                TtpId::new("org.opennetworking/ttps/IPV6", "1.0"),
            ],
        }
    }

    /// Replace the offered protocol versions
    pub fn with_versions(mut self, versions: &[&str]) -> Self {
        self.versions = versions.iter().map(ToString::to_string).collect();
        self
    }

    /// Replace the TTP preference list, most preferred first
    pub fn with_preferences(mut self, preferences: Vec<TtpId>) -> Self {
        self.preferences = preferences;
        self
    }

    /// Protocol versions this controller offers
    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    /// TTP preference list, most preferred first
    pub fn preferences(&self) -> &[TtpId] {
        &self.preferences
    }

    /// Run the full negotiation against one switch.
    ///
    /// Fails with [`Error::NoSharedVersion`] or [`Error::NoSharedTtp`] when
    /// the parties have nothing in common, [`Error::NotImplemented`] when
    /// the selected TTP has no constraint profile, and [`Error::NoMatch`]
    /// when the switch cannot satisfy the constraints.
    pub fn negotiate(&self, switch: &mut dyn Switch) -> Result<NegotiatedTtp> {
        let session = uuid::Uuid::new_v4();
        tracing::info!("negotiation {session} with {} starting", switch.name());

        let version = self.negotiate_version(switch)?;
        let ttp = self.select_ttp(switch)?;
        let params = self.negotiate_params(switch, &ttp)?;

        let outcome = NegotiatedTtp { version, ttp, params };
        tracing::info!("negotiation {session} agreed on {outcome}");
        Ok(outcome)
    }

    /// Phase 1: offer our versions, accept the highest shared one.
    fn negotiate_version(&self, switch: &mut dyn Switch) -> Result<String> {
        let resp = switch.handle(&Message::ttp_begin(&self.versions))?;
        let version = resp.expect_kind(kind::TTP_VERSION_RESP)?.get_str("version")?;
        // The switch may spell the agreed version its own way; compare parsed.
        let picked = Version::parse(version);
        if !self.versions.iter().any(|offered| Version::parse(offered) == picked) {
            return Err(Error::Protocol(format!("switch picked unoffered version {version}")));
        }

        tracing::info!("negotiation will use protocol version {version}");
        Ok(version.to_string())
    }

    /// Phase 2: ask for the advertised TTPs, pick our most preferred.
    fn select_ttp(&self, switch: &mut dyn Switch) -> Result<TtpId> {
        let resp = switch.handle(&Message::list_ttps())?;
        let advertised = resp.expect_kind(kind::LIST_TTPS_RESP)?.get_ttps("ttps")?;
        tracing::debug!("switch advertises {} TTPs", advertised.len());

        let Some(choice) = self.preferences.iter().find(|want| advertised.contains(want)) else {
            tracing::warn!("none of the preferred TTPs are advertised");
            return Err(Error::NoSharedTtp);
        };
        tracing::info!("preferred TTP is {choice}");
        Ok(choice.clone())
    }

    /// Phase 3: query the selected TTP under its constraint profile.
    fn negotiate_params(&self, switch: &mut dyn Switch, ttp: &TtpId) -> Result<ParamSet> {
        let constraints = Self::constraints_for(ttp)?;
        let resp = switch.handle(&Message::ttp_query(ttp, constraints))?;

        match resp.kind.as_str() {
            kind::TTP_QUERY_RESP => Ok(resp.payload.get_params("params")?.clone()),
            kind::TTP_QUERY_RESP_ERR => {
                let reason = resp.payload.get_str("error").unwrap_or("unspecified").to_string();
                Err(Error::NoMatch(reason))
            },
            other => Err(Error::Protocol(format!("unexpected reply to ttp_query: {other}"))),
        }
    }

    /// The constraint profile for one TTP family.
    fn constraints_for(ttp: &TtpId) -> Result<Vec<Constraint>> {
        if ttp.name.contains("IPV4+IPV6") {
            Err(Error::NotImplemented(format!("combined v4/v6 profile for {}", ttp.name)))
        } else if ttp.name.contains("IPV4") {
            Ok(Self::ipv4_constraints(&ttp.version))
        } else if ttp.name.contains("IPV6") {
            Err(Error::NotImplemented(format!("v6 profile for {}", ttp.name)))
        } else {
            Err(Error::NotImplemented(format!("no constraint profile for {}", ttp.name)))
        }
    }

    /// The IPv4 forwarding constraint profile.
    ///
    /// Wants the largest IPv4 table within hard bounds, a MAC table near
    /// 6000 entries, and a MAC/IPv4 ratio close to 1.1. TTP version 2.0
    /// additionally prefers Feature X.
    pub fn ipv4_constraints(ttp_version: &str) -> Vec<Constraint> {
        let mut constraints: Vec<Constraint> = vec![
            BoundConstraint::new(BoundKind::Max, "IPV4 table size", 11.0)
                .with_min(3000)
                .with_max(10000)
                .into(),
            BoundConstraint::new(BoundKind::Best, "MAC table size", 10.0)
                .with_target(6000)
                .with_min(3000)
                .with_max(7000)
                .into(),
            RatioConstraint::new("IPV4 table size", "MAC table size", 1.1, 9000.0)
                .with_min(0.8)
                .with_max(1.2)
                .into(),
        ];
        if ttp_version == "2.0" {
            constraints.push(
                BoundConstraint::new(BoundKind::Best, "Feature X", 1001.0)
                    .with_target(true)
                    .into(),
            );
        }
        constraints
    }
}
