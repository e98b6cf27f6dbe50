//! Negotiation constraints and the feasibility/scoring evaluator.
//!
//! A controller expresses what it wants from a forwarding pipeline as a list
//! of [`Constraint`]s over named parameters. A switch answers a parameter
//! query by filtering candidate [`ParamSet`]s with [`feasible`] and ranking
//! the survivors with [`score`]. Both evaluators are pure functions; identical
//! inputs always produce identical results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single named-parameter value.
///
/// Pipelines negotiate integer resource counts and boolean feature flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Feature flag.
    Bool(bool),
    /// Resource count.
    Int(i64),
}

impl ParamValue {
    /// Numeric view used by the evaluator; booleans count as 0/1.
    pub fn as_f64(self) -> f64 {
        match self {
            ParamValue::Bool(flag) => {
                if flag {
                    1.0
                } else {
                    0.0
                }
            },
            ParamValue::Int(n) => n as f64,
        }
    }

    /// Integer view; booleans count as 0/1.
    pub fn as_i64(self) -> i64 {
        match self {
            ParamValue::Bool(flag) => i64::from(flag),
            ParamValue::Int(n) => n,
        }
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Int(n)
    }
}

impl From<bool> for ParamValue {
    fn from(flag: bool) -> Self {
        ParamValue::Bool(flag)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(flag) => write!(f, "{flag}"),
            ParamValue::Int(n) => write!(f, "{n}"),
        }
    }
}

/// One candidate configuration of the negotiated pipeline: parameter name
/// to value.
///
/// Backed by an ordered map so iteration, serialization and log output are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamSet(BTreeMap<String, ParamValue>);

impl ParamSet {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter (builder form)
    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Insert or replace a parameter
    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) {
        self.0.insert(name.to_string(), value.into());
    }

    /// Look up a parameter by name
    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.0.get(name).copied()
    }

    /// Number of parameters in the set
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the set holds no parameters
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate parameters in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, ParamValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}

/// What a bound constraint wants from its parameter within the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundKind {
    /// Prefer the largest value.
    Max,
    /// Prefer the smallest value.
    Min,
    /// Prefer a specific target value.
    Best,
}

/// Bounds and/or a preference on a single named parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundConstraint {
    /// Preference direction.
    pub kind: BoundKind,
    /// Parameter name.
    pub param: String,
    /// Inclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    /// Inclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    /// Preferred value, for [`BoundKind::Best`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ParamValue>,
    /// Scoring weight.
    pub weight: f64,
}

impl BoundConstraint {
    /// Create a bound constraint with no bounds and no target.
    ///
    /// Negative weights are clamped to zero.
    pub fn new(kind: BoundKind, param: &str, weight: f64) -> Self {
        Self {
            kind,
            param: param.to_string(),
            min: None,
            max: None,
            target: None,
            weight: weight.max(0.0),
        }
    }

    /// Set the inclusive lower bound
    pub fn with_min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the inclusive upper bound
    pub fn with_max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    /// Set the preferred value
    pub fn with_target(mut self, target: impl Into<ParamValue>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// True when neither bound is present; such a constraint never rejects.
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Bounds and a preference on the quotient of two named parameters,
/// interpreted as `value(param2) / value(param1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioConstraint {
    /// Denominator parameter.
    pub param1: String,
    /// Numerator parameter.
    pub param2: String,
    /// Inclusive lower bound on the ratio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound on the ratio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Preferred ratio.
    pub target: f64,
    /// Scoring weight.
    pub weight: f64,
}

impl RatioConstraint {
    /// Create a ratio constraint with no bounds.
    ///
    /// Negative weights are clamped to zero.
    pub fn new(param1: &str, param2: &str, target: f64, weight: f64) -> Self {
        Self {
            param1: param1.to_string(),
            param2: param2.to_string(),
            min: None,
            max: None,
            target,
            weight: weight.max(0.0),
        }
    }

    /// Set the inclusive lower bound
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the inclusive upper bound
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// The ratio this constraint observes in `params`, or `None` when either
    /// parameter is absent or the denominator is zero.
    pub fn of(&self, params: &ParamSet) -> Option<f64> {
        let v1 = params.get(&self.param1)?.as_f64();
        let v2 = params.get(&self.param2)?.as_f64();
        if v1 == 0.0 {
            return None;
        }
        Some(v2 / v1)
    }
}

/// A rule limiting or scoring acceptable values of one or two named
/// parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Constraint {
    /// Single-parameter bounds and preference.
    Bound(BoundConstraint),
    /// Two-parameter ratio bounds and preference.
    Ratio(RatioConstraint),
}

impl From<BoundConstraint> for Constraint {
    fn from(bound: BoundConstraint) -> Self {
        Constraint::Bound(bound)
    }
}

impl From<RatioConstraint> for Constraint {
    fn from(ratio: RatioConstraint) -> Self {
        Constraint::Ratio(ratio)
    }
}

/// Hard-filter pass: does `params` satisfy every explicit bound in
/// `constraints`?
///
/// A constraint without explicit bounds imposes no hard filter (a bare
/// `best` preference only affects [`score`]). A bounded constraint whose
/// parameter is absent from the set rejects it, as does a bounded ratio
/// whose denominator is zero: feasibility cannot be established either way.
pub fn feasible(constraints: &[Constraint], params: &ParamSet) -> bool {
    for constraint in constraints {
        match constraint {
            Constraint::Bound(bound) => {
                if bound.is_unbounded() {
                    continue;
                }
                let Some(value) = params.get(&bound.param) else {
                    tracing::trace!("{} absent from {params}", bound.param);
                    return false;
                };
                let value = value.as_f64();
                if let Some(min) = bound.min {
                    if value < min as f64 {
                        tracing::trace!("min violated for {}: {value} < {min}", bound.param);
                        return false;
                    }
                }
                if let Some(max) = bound.max {
                    if value > max as f64 {
                        tracing::trace!("max violated for {}: {value} > {max}", bound.param);
                        return false;
                    }
                }
            },
            Constraint::Ratio(ratio) => {
                if ratio.min.is_none() && ratio.max.is_none() {
                    continue;
                }
                let Some(observed) = ratio.of(params) else {
                    tracing::trace!("ratio {}/{} undefined in {params}", ratio.param2, ratio.param1);
                    return false;
                };
                if let Some(min) = ratio.min {
                    if observed < min {
                        tracing::trace!("ratio violated: {observed} < {min}");
                        return false;
                    }
                }
                if let Some(max) = ratio.max {
                    if observed > max {
                        tracing::trace!("ratio violated: {observed} > {max}");
                        return false;
                    }
                }
            },
        }
    }
    true
}

/// Match-quality signal for an already-feasible parameter set; greater is a
/// better match.
///
/// Contributions per constraint:
/// - `max`: `+ value * weight`
/// - `min`: `- value * weight`
/// - `best` with a boolean target: `+ weight` when the value equals it
/// - `best` with an integer target: `+ |value - target| * weight`
/// - ratio: `- |ratio - target| * weight`
///
/// Constraints whose parameters are absent, or whose ratio is undefined,
/// contribute nothing. Scoring has no side effects.
pub fn score(constraints: &[Constraint], params: &ParamSet) -> f64 {
    let mut total = 0.0;
    for constraint in constraints {
        match constraint {
            Constraint::Bound(bound) => {
                let Some(value) = params.get(&bound.param) else {
                    continue;
                };
                match bound.kind {
                    BoundKind::Max => total += value.as_f64() * bound.weight,
                    BoundKind::Min => total -= value.as_f64() * bound.weight,
                    BoundKind::Best => match bound.target {
                        Some(ParamValue::Bool(want)) => {
                            if value == ParamValue::Bool(want) {
                                total += bound.weight;
                            }
                        },
                        Some(ParamValue::Int(want)) => {
                            total += (value.as_f64() - want as f64).abs() * bound.weight;
                        },
                        None => {},
                    },
                }
            },
            Constraint::Ratio(ratio) => {
                if let Some(observed) = ratio.of(params) {
                    total -= (observed - ratio.target).abs() * ratio.weight;
                }
            },
        }
    }
    tracing::trace!("parameter score {total}: {params}");
    total
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn table(ipv4: i64, mac: i64) -> ParamSet {
        ParamSet::new()
            .with("IPV4 table size", ipv4)
            .with("MAC table size", mac)
    }

    #[test]
    fn test_bound_min_max_filtering() {
        let constraints = vec![BoundConstraint::new(BoundKind::Max, "IPV4 table size", 1.0)
            .with_min(3000)
            .with_max(10000)
            .into()];

        assert!(feasible(&constraints, &table(3000, 0)));
        assert!(feasible(&constraints, &table(10000, 0)));
        assert!(!feasible(&constraints, &table(2999, 0)));
        assert!(!feasible(&constraints, &table(10001, 0)));
    }

    #[test]
    fn test_ratio_filtering() {
        let constraints = vec![RatioConstraint::new("IPV4 table size", "MAC table size", 1.1, 1.0)
            .with_min(0.8)
            .with_max(1.2)
            .into()];

        assert!(feasible(&constraints, &table(5000, 5000))); // ratio 1.0
        assert!(!feasible(&constraints, &table(1000, 10000))); // ratio 10.0
        assert!(!feasible(&constraints, &table(10000, 2000))); // ratio 0.2
    }

    #[test]
    fn test_unbounded_best_imposes_no_filter() {
        let constraints = vec![BoundConstraint::new(BoundKind::Best, "Feature X", 1.0)
            .with_target(true)
            .into()];

        // No bounds, and the parameter is not even present.
        assert!(feasible(&constraints, &table(1, 1)));
    }

    #[test]
    fn test_bounded_constraint_rejects_missing_param() {
        let constraints =
            vec![BoundConstraint::new(BoundKind::Max, "TCAM entries", 1.0).with_max(512).into()];

        assert!(!feasible(&constraints, &table(5000, 5000)));
    }

    #[test]
    fn test_bounded_ratio_rejects_zero_denominator() {
        let constraints = vec![RatioConstraint::new("IPV4 table size", "MAC table size", 1.0, 1.0)
            .with_max(1.2)
            .into()];

        // 0/0 must not slip through as NaN.
        assert!(!feasible(&constraints, &table(0, 0)));
    }

    #[test]
    fn test_score_max_and_min_directions() {
        let params = table(100, 40);
        let max: Constraint = BoundConstraint::new(BoundKind::Max, "IPV4 table size", 2.0).into();
        let min: Constraint = BoundConstraint::new(BoundKind::Min, "MAC table size", 3.0).into();

        assert_eq!(score(&[max], &params), 200.0);
        assert_eq!(score(&[min], &params), -120.0);
    }

    #[test]
    fn test_score_boolean_target_matches_exactly() {
        let constraint: Constraint = BoundConstraint::new(BoundKind::Best, "Feature X", 7.0)
            .with_target(true)
            .into();

        let with_feature = ParamSet::new().with("Feature X", true);
        let without = ParamSet::new().with("Feature X", false);
        assert_eq!(score(&[constraint.clone()], &with_feature), 7.0);
        assert_eq!(score(&[constraint], &without), 0.0);
    }

    #[test]
    fn test_score_integer_target_adds_absolute_deviation() {
        // Deployed behavior: deviation from the target raises the score.
        let constraint: Constraint = BoundConstraint::new(BoundKind::Best, "MAC table size", 10.0)
            .with_target(6000)
            .into();

        let exact = score(&[constraint.clone()], &table(0, 6000));
        let off_by_2000 = score(&[constraint], &table(0, 4000));
        assert_eq!(exact, 0.0);
        assert_eq!(off_by_2000, 20000.0);
        assert!(off_by_2000 > exact);
    }

    #[test]
    fn test_score_ratio_prefers_target() {
        let constraint: Constraint =
            RatioConstraint::new("IPV4 table size", "MAC table size", 1.1, 9000.0).into();

        let near = score(&[constraint.clone()], &table(5000, 5500)); // ratio 1.1
        let far = score(&[constraint], &table(5000, 4000)); // ratio 0.8
        assert_eq!(near, 0.0);
        assert!(far < near);
    }

    #[test]
    fn test_score_is_deterministic() {
        let constraints: Vec<Constraint> = vec![
            BoundConstraint::new(BoundKind::Max, "IPV4 table size", 11.0).into(),
            BoundConstraint::new(BoundKind::Best, "MAC table size", 10.0)
                .with_target(6000)
                .into(),
            RatioConstraint::new("IPV4 table size", "MAC table size", 1.1, 9000.0).into(),
        ];
        let params = table(5000, 5000);

        let first = score(&constraints, &params);
        for _ in 0..10 {
            assert_eq!(score(&constraints, &params), first);
        }
    }

    #[test]
    fn test_negative_weight_clamped() {
        let bound = BoundConstraint::new(BoundKind::Max, "IPV4 table size", -5.0);
        assert_eq!(bound.weight, 0.0);
        let ratio = RatioConstraint::new("a", "b", 1.0, -1.0);
        assert_eq!(ratio.weight, 0.0);
    }

    proptest! {
        /// Tightening a bound never turns an infeasible set feasible.
        #[test]
        fn tightened_bound_never_admits(value in -10_000i64..10_000, min in -10_000i64..10_000, delta in 0i64..5_000) {
            let loose: Constraint = BoundConstraint::new(BoundKind::Max, "p", 1.0).with_min(min).into();
            let tight: Constraint = BoundConstraint::new(BoundKind::Max, "p", 1.0).with_min(min + delta).into();
            let params = ParamSet::new().with("p", value);

            if !feasible(&[loose], &params) {
                prop_assert!(!feasible(&[tight], &params));
            }
        }

        /// Tightening a ratio's upper bound never admits a rejected set.
        #[test]
        fn tightened_ratio_never_admits(v1 in 1i64..10_000, v2 in 0i64..10_000, max in 0.1f64..5.0, shrink in 0.0f64..0.9) {
            let loose: Constraint = RatioConstraint::new("p1", "p2", 1.0, 1.0).with_max(max).into();
            let tight: Constraint = RatioConstraint::new("p1", "p2", 1.0, 1.0).with_max(max * (1.0 - shrink)).into();
            let params = ParamSet::new().with("p1", v1).with("p2", v2);

            if !feasible(&[loose], &params) {
                prop_assert!(!feasible(&[tight], &params));
            }
        }

        /// Scoring is a pure function of its inputs.
        #[test]
        fn score_deterministic(v1 in 0i64..10_000, v2 in 0i64..10_000, weight in 0.0f64..100.0) {
            let constraints: Vec<Constraint> = vec![
                BoundConstraint::new(BoundKind::Max, "p1", weight).into(),
                RatioConstraint::new("p1", "p2", 1.1, weight).into(),
            ];
            let params = ParamSet::new().with("p1", v1).with("p2", v2);
            prop_assert_eq!(score(&constraints, &params), score(&constraints, &params));
        }
    }
}
