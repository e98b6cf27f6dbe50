//! Dotted protocol version identifiers.
//!
//! Versions such as `1.0` or `1.2.3.beta` are split on `.` into components,
//! each either numeric or textual, and compared component-wise in sequence
//! order. Both negotiating peers parse the other side's offered versions with
//! this model before intersecting them.

use std::fmt;

/// One dot-separated component of a [`Version`].
///
/// Variant order matters: the derived ordering places any numeric component
/// before any textual component at the same position, which keeps the
/// comparison of mixed versions such as `1.2` and `1.beta` total.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Component {
    /// A non-empty run of ASCII digits that fits in a `u64`.
    Number(u64),
    /// Any other part, kept verbatim.
    Text(String),
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Number(n) => write!(f, "{n}"),
            Component::Text(t) => f.write_str(t),
        }
    }
}

/// A parsed dotted version identifier.
///
/// Ordering is lexicographic over components: numeric components compare
/// numerically (`1.10 > 1.9`), textual components compare as strings, and a
/// shorter version orders before its extensions (`1.0 < 1.0.0`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    components: Vec<Component>,
}

impl Version {
    /// Parse a dot-separated version string.
    ///
    /// Parsing never fails. A part becomes [`Component::Number`] only when it
    /// is a non-empty run of ASCII digits narrow enough for `u64`; empty
    /// parts, signed parts and over-wide digit runs stay textual.
    ///
    /// ```rust,ignore
    /// let v = Version::parse("1.2.3.beta");
    /// assert_eq!(v.to_string(), "1.2.3.beta");
    /// ```
    pub fn parse(text: &str) -> Self {
        let components = text.split('.').map(parse_component).collect();
        Self { components }
    }

    /// The individual components, in order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

impl From<&str> for Version {
    fn from(text: &str) -> Self {
        Version::parse(text)
    }
}

fn parse_component(part: &str) -> Component {
    if !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = part.parse::<u64>() {
            return Component::Number(n);
        }
    }
    Component::Text(part.to_string())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_parse_mixed_components() {
        let v = Version::parse("1.2.3.beta");
        assert_eq!(
            v.components(),
            &[
                Component::Number(1),
                Component::Number(2),
                Component::Number(3),
                Component::Text("beta".to_string()),
            ]
        );
    }

    #[test]
    fn test_format_round_trip() {
        for s in ["1.0", "2.0", "1.2.3.beta", "10.0.1", "rc.1"] {
            assert_eq!(Version::parse(s).to_string(), s);
        }
    }

    #[test]
    fn test_malformed_parts_stay_textual() {
        let v = Version::parse("1..x.-2.+3");
        assert_eq!(
            v.components(),
            &[
                Component::Number(1),
                Component::Text(String::new()),
                Component::Text("x".to_string()),
                Component::Text("-2".to_string()),
                Component::Text("+3".to_string()),
            ]
        );
        assert_eq!(v.to_string(), "1..x.-2.+3");
    }

    #[test]
    fn test_numeric_ordering() {
        assert!(Version::parse("2.0") > Version::parse("1.0"));
        assert!(Version::parse("1.10") > Version::parse("1.9"));
        assert!(Version::parse("1.0.0") > Version::parse("1.0"));
    }

    #[test]
    fn test_numbers_order_before_text() {
        // Mixed comparison is defined: numeric parts sort first.
        assert!(Version::parse("1.2") < Version::parse("1.beta"));
        assert!(Version::parse("1.beta") < Version::parse("1.rc"));
    }

    #[test]
    fn test_overflow_stays_textual() {
        let wide = "99999999999999999999999";
        let v = Version::parse(wide);
        assert_eq!(v.components(), &[Component::Text(wide.to_string())]);
        assert_eq!(v.to_string(), wide);
    }

    proptest! {
        /// `format(parse(s)) == s` for dot-separated canonical integer or
        /// alphanumeric tokens.
        #[test]
        fn roundtrip_canonical_versions(
            parts in prop::collection::vec("(0|[1-9][0-9]{0,8}|[a-z][a-z0-9]{0,7})", 1..6)
        ) {
            let text = parts.join(".");
            prop_assert_eq!(Version::parse(&text).to_string(), text);
        }
    }
}
