//! Catalog-backed capability provider: a fixed menu of parameter sets.

use std::collections::HashMap;

use crate::constraint::{feasible, score, Constraint, ParamSet};
use crate::error::{Error, Result};
use crate::protocol::TtpId;
use crate::switch::{CapabilityProvider, TtpSwitch};

/// Fully qualified name of the IPv4 forwarding TTP used by the built-in
/// providers and the controller's default preferences.
pub const IPV4_TTP: &str = "org.opennetworking/ttps/IPV4";

/// Capability provider that picks from pre-built parameter sets.
///
/// Each cataloged TTP maps to the candidate configurations its tables can
/// actually be built in. A query filters the candidates with [`feasible`]
/// and returns the highest-[`score`] survivor; the earliest candidate wins
/// a tied score.
///
/// A TTP can also be advertised without a catalog entry. It then shows up
/// in `list_ttps_resp` but any query for it fails, mirroring hardware whose
/// tables are not externally configurable.
#[derive(Debug, Clone, Default)]
pub struct CatalogProvider {
    advertised: Vec<TtpId>,
    catalog: HashMap<TtpId, Vec<ParamSet>>,
}

impl CatalogProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Advertise a TTP and register its candidate parameter sets
    pub fn with_catalog(mut self, ttp: TtpId, candidates: Vec<ParamSet>) -> Self {
        self.advertised.push(ttp.clone());
        self.catalog.insert(ttp, candidates);
        self
    }

    /// Advertise a TTP without any candidates
    pub fn advertise(mut self, ttp: TtpId) -> Self {
        self.advertised.push(ttp);
        self
    }

    /// The fixed-table IPv4 demo catalog.
    ///
    /// Advertises IPv4 forwarding at TTP versions 2.0 and 1.0 plus a vendor
    /// TTP that cannot be queried.
    pub fn simple_ipv4() -> Self {
        Self::new()
            .with_catalog(
                TtpId::new(IPV4_TTP, "2.0"),
                vec![
                    ParamSet::new()
                        .with("IPV4 table size", 1000)
                        .with("MAC table size", 10000)
                        .with("Feature X", true),
                    ParamSet::new()
                        .with("IPV4 table size", 5000)
                        .with("MAC table size", 5000)
                        .with("Feature X", false),
                    ParamSet::new()
                        .with("IPV4 table size", 4000)
                        .with("MAC table size", 4000)
                        .with("Feature X", true),
                    ParamSet::new()
                        .with("IPV4 table size", 10000)
                        .with("MAC table size", 2000)
                        .with("Feature X", true),
                ],
            )
            .with_catalog(
                TtpId::new(IPV4_TTP, "1.0"),
                vec![
                    ParamSet::new()
                        .with("IPV4 table size", 1000)
                        .with("MAC table size", 10000),
                    ParamSet::new()
                        .with("IPV4 table size", 5000)
                        .with("MAC table size", 5000),
                    ParamSet::new()
                        .with("IPV4 table size", 10000)
                        .with("MAC table size", 2000),
                ],
            )
            .advertise(TtpId::new("com.metaswitch/ttps/PrivateSwitch", "2.0"))
    }
}

impl CapabilityProvider for CatalogProvider {
    fn ttps(&self) -> &[TtpId] {
        &self.advertised
    }

    fn query(&self, ttp: &TtpId, constraints: &[Constraint]) -> Result<ParamSet> {
        let candidates = self
            .catalog
            .get(ttp)
            .ok_or_else(|| Error::NoMatch(format!("{ttp} is not in the catalog")))?;

        let mut best: Option<(&ParamSet, f64)> = None;
        for candidate in candidates {
            if !feasible(constraints, candidate) {
                continue;
            }
            let quality = score(constraints, candidate);
            tracing::debug!("candidate {candidate} scores {quality}");
            if best.map_or(true, |(_, top)| quality > top) {
                best = Some((candidate, quality));
            }
        }

        match best {
            Some((params, quality)) => {
                tracing::info!("selected {params} for {ttp} (score {quality})");
                Ok(params.clone())
            },
            None => Err(Error::NoMatch(format!("no feasible parameters for {ttp}"))),
        }
    }
}

/// The catalog-backed IPv4 demo switch
pub fn simple_ipv4_switch() -> TtpSwitch<CatalogProvider> {
    TtpSwitch::new("simple-ipv4", CatalogProvider::simple_ipv4())
}
