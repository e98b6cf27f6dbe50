//! Budget-splitting capability provider: synthesizes parameter sets.
//!
//! Models hardware whose two tables share one memory pool. The provider
//! walks every split of the budget at a fixed granularity, lowers each
//! candidate into the constraints' upper bounds (capacity can be left
//! unused but never invented), and keeps the feasible candidate with the
//! highest score.

use crate::constraint::{feasible, score, BoundKind, Constraint, ParamSet, ParamValue};
use crate::error::{Error, Result};
use crate::protocol::TtpId;
use crate::switch::catalog::IPV4_TTP;
use crate::switch::{CapabilityProvider, TtpSwitch};

/// Default shared capacity split across the two tables.
pub const DEFAULT_BUDGET: i64 = 10_000;

/// Default search granularity.
pub const DEFAULT_STEP: i64 = 100;

/// Capability provider that searches splits of a shared table budget.
///
/// One parameter (`stepped`) walks the budget from zero in [`DEFAULT_STEP`]
/// increments; the other (`remainder`) takes whatever is left. Candidates
/// are adjusted downward into the constraints before feasibility is judged.
#[derive(Debug, Clone)]
pub struct BudgetedSearchProvider {
    advertised: Vec<TtpId>,
    stepped: String,
    remainder: String,
    budget: i64,
    step: i64,
}

impl BudgetedSearchProvider {
    /// Create a provider advertising one TTP over two budgeted parameters
    pub fn new(ttp: TtpId, stepped: &str, remainder: &str) -> Self {
        Self {
            advertised: vec![ttp],
            stepped: stepped.to_string(),
            remainder: remainder.to_string(),
            budget: DEFAULT_BUDGET,
            step: DEFAULT_STEP,
        }
    }

    /// Replace the table budget
    pub fn with_budget(mut self, budget: i64) -> Self {
        self.budget = budget;
        self
    }

    /// Replace the search granularity; values below 1 are clamped to 1
    pub fn with_step(mut self, step: i64) -> Self {
        self.step = step.max(1);
        self
    }

    /// The budget-searching IPv4 demo provider: MAC and IPv4 tables share
    /// one pool.
    pub fn variable_ipv4() -> Self {
        Self::new(TtpId::new(IPV4_TTP, "1.0"), "MAC table size", "IPV4 table size")
    }
}

impl CapabilityProvider for BudgetedSearchProvider {
    fn ttps(&self) -> &[TtpId] {
        &self.advertised
    }

    fn query(&self, ttp: &TtpId, constraints: &[Constraint]) -> Result<ParamSet> {
        if !self.advertised.contains(ttp) {
            return Err(Error::NoMatch(format!("{ttp} is not supported")));
        }

        let mut best: Option<(ParamSet, f64)> = None;
        let mut alloc = 0;
        while alloc < self.budget {
            let mut candidate = ParamSet::new()
                .with(&self.stepped, alloc)
                .with(&self.remainder, self.budget - alloc);
            lower_into_bounds(constraints, &mut candidate);

            if feasible(constraints, &candidate) {
                let quality = score(constraints, &candidate);
                tracing::trace!("candidate {candidate} scores {quality}");
                if best.as_ref().map_or(true, |(_, top)| quality > *top) {
                    best = Some((candidate, quality));
                }
            }
            alloc += self.step;
        }

        match best {
            Some((params, quality)) => {
                tracing::info!("search selected {params} for {ttp} (score {quality})");
                Ok(params)
            },
            None => Err(Error::NoMatch(format!("no feasible parameters for {ttp}"))),
        }
    }
}

/// Lower parameter values until every upper bound holds.
///
/// Values are only ever reduced; a parameter below a lower bound stays
/// there and the candidate fails the later feasibility check instead. An
/// integer `best` target acts as a ceiling alongside any `max` bound. For
/// a ratio `param2 / param1`, the numerator is lowered to meet `max` and
/// the denominator to meet `min`.
fn lower_into_bounds(constraints: &[Constraint], params: &mut ParamSet) {
    for constraint in constraints {
        match constraint {
            Constraint::Bound(bound) => {
                if let (Some(max), Some(value)) = (bound.max, params.get(&bound.param)) {
                    if value.as_i64() > max {
                        tracing::trace!("lowering {} from {value} to {max}", bound.param);
                        params.set(&bound.param, max);
                    }
                }
                if bound.kind == BoundKind::Best {
                    if let (Some(ParamValue::Int(target)), Some(value)) =
                        (bound.target, params.get(&bound.param))
                    {
                        if value.as_i64() > target {
                            tracing::trace!("lowering {} from {value} to {target}", bound.param);
                            params.set(&bound.param, target);
                        }
                    }
                }
            },
            Constraint::Ratio(ratio) => {
                if let Some(max) = ratio.max {
                    if let (Some(v1), Some(v2)) =
                        (params.get(&ratio.param1), params.get(&ratio.param2))
                    {
                        let ceiling = (v1.as_f64() * max).floor() as i64;
                        if v2.as_i64() > ceiling {
                            tracing::trace!("lowering {} to {ceiling} for ratio max", ratio.param2);
                            params.set(&ratio.param2, ceiling);
                        }
                    }
                }
                if let Some(min) = ratio.min {
                    if min > 0.0 {
                        if let (Some(v1), Some(v2)) =
                            (params.get(&ratio.param1), params.get(&ratio.param2))
                        {
                            let ceiling = (v2.as_f64() / min).floor() as i64;
                            if v1.as_i64() > ceiling {
                                tracing::trace!(
                                    "lowering {} to {ceiling} for ratio min",
                                    ratio.param1
                                );
                                params.set(&ratio.param1, ceiling);
                            }
                        }
                    }
                }
            },
        }
    }
}

/// The budget-searching IPv4 demo switch
pub fn variable_ipv4_switch() -> TtpSwitch<BudgetedSearchProvider> {
    TtpSwitch::new("variable-ipv4", BudgetedSearchProvider::variable_ipv4())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{BoundConstraint, BoundKind, ParamValue, RatioConstraint};
    use crate::controller::Controller;

    #[test]
    fn test_search_selects_best_feasible_split() {
        let provider = BudgetedSearchProvider::variable_ipv4();
        let params = provider
            .query(&TtpId::new(IPV4_TTP, "1.0"), &Controller::ipv4_constraints("1.0"))
            .unwrap();

        // A 4400 MAC split leaves 5600 for IPv4, lowered to 5500 so the
        // MAC/IPv4 ratio reaches the 0.8 floor; the IPv4 weight makes this
        // the highest scoring feasible candidate.
        assert_eq!(params.get("MAC table size"), Some(ParamValue::Int(4400)));
        assert_eq!(params.get("IPV4 table size"), Some(ParamValue::Int(5500)));
    }

    #[test]
    fn test_search_result_is_feasible() {
        let provider = BudgetedSearchProvider::variable_ipv4();
        let constraints = Controller::ipv4_constraints("1.0");
        let params = provider.query(&TtpId::new(IPV4_TTP, "1.0"), &constraints).unwrap();

        assert!(feasible(&constraints, &params));
    }

    #[test]
    fn test_unadvertised_ttp_is_no_match() {
        let provider = BudgetedSearchProvider::variable_ipv4();
        let err = provider.query(&TtpId::new(IPV4_TTP, "2.0"), &[]).unwrap_err();

        assert!(matches!(err, Error::NoMatch(_)));
    }

    #[test]
    fn test_overcommitted_budget_is_no_match() {
        // Two minimums that cannot both fit in the 10000 pool.
        let provider = BudgetedSearchProvider::variable_ipv4();
        let constraints: Vec<Constraint> = vec![
            BoundConstraint::new(BoundKind::Max, "IPV4 table size", 1.0).with_min(8000).into(),
            BoundConstraint::new(BoundKind::Max, "MAC table size", 1.0).with_min(8000).into(),
        ];

        let err = provider.query(&TtpId::new(IPV4_TTP, "1.0"), &constraints).unwrap_err();
        assert!(matches!(err, Error::NoMatch(_)));
    }

    #[test]
    fn test_custom_budget_is_honored() {
        let ttp = TtpId::new("org.example/ttps/Small", "1.0");
        let provider = BudgetedSearchProvider::new(ttp.clone(), "a", "b").with_budget(2000);
        let params = provider.query(&ttp, &[]).unwrap();

        let total = params.get("a").unwrap().as_i64() + params.get("b").unwrap().as_i64();
        assert_eq!(total, 2000);
    }

    #[test]
    fn test_lowering_respects_bound_max() {
        let constraints: Vec<Constraint> =
            vec![BoundConstraint::new(BoundKind::Best, "MAC table size", 1.0)
                .with_max(7000)
                .into()];
        let mut params = ParamSet::new().with("MAC table size", 9000);

        lower_into_bounds(&constraints, &mut params);
        assert_eq!(params.get("MAC table size"), Some(ParamValue::Int(7000)));
    }

    #[test]
    fn test_lowering_clamps_to_best_target() {
        let constraints: Vec<Constraint> =
            vec![BoundConstraint::new(BoundKind::Best, "MAC table size", 1.0)
                .with_target(6000)
                .with_max(7000)
                .into()];

        let mut above = ParamSet::new().with("MAC table size", 6500);
        lower_into_bounds(&constraints, &mut above);
        assert_eq!(above.get("MAC table size"), Some(ParamValue::Int(6000)));

        // A value already at or below the target is left alone.
        let mut below = ParamSet::new().with("MAC table size", 5000);
        lower_into_bounds(&constraints, &mut below);
        assert_eq!(below.get("MAC table size"), Some(ParamValue::Int(5000)));
    }

    #[test]
    fn test_lowering_caps_ratio_numerator() {
        let constraints: Vec<Constraint> =
            vec![RatioConstraint::new("IPV4 table size", "MAC table size", 1.0, 1.0)
                .with_max(1.2)
                .into()];
        let mut params = ParamSet::new()
            .with("IPV4 table size", 1000)
            .with("MAC table size", 10000);

        lower_into_bounds(&constraints, &mut params);
        assert_eq!(params.get("MAC table size"), Some(ParamValue::Int(1200)));
        assert_eq!(params.get("IPV4 table size"), Some(ParamValue::Int(1000)));
    }

    #[test]
    fn test_lowering_caps_ratio_denominator() {
        let constraints: Vec<Constraint> =
            vec![RatioConstraint::new("IPV4 table size", "MAC table size", 1.0, 1.0)
                .with_min(0.8)
                .into()];
        let mut params = ParamSet::new()
            .with("IPV4 table size", 5600)
            .with("MAC table size", 4400);

        lower_into_bounds(&constraints, &mut params);
        assert_eq!(params.get("IPV4 table size"), Some(ParamValue::Int(5500)));
        assert_eq!(params.get("MAC table size"), Some(ParamValue::Int(4400)));
    }

    #[test]
    fn test_lowering_never_raises() {
        // A value under the lower bound is left alone; feasibility filtering
        // rejects it later.
        let constraints: Vec<Constraint> =
            vec![BoundConstraint::new(BoundKind::Max, "MAC table size", 1.0)
                .with_min(3000)
                .into()];
        let mut params = ParamSet::new().with("MAC table size", 1000);

        lower_into_bounds(&constraints, &mut params);
        assert_eq!(params.get("MAC table size"), Some(ParamValue::Int(1000)));
        assert!(!feasible(&constraints, &params));
    }
}
