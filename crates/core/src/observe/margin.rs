use std::fmt;
use std::str::FromStr;

use reveal_protocol::{EdgeInsets, Rect};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarginParseError {
    #[error("root margin is empty")]
    Empty,
    #[error("root margin takes 1 to 4 values, got {0}")]
    TooManyValues(usize),
    #[error("invalid length `{0}`: expected a px or % value")]
    InvalidUnit(String),
    #[error("invalid number in `{0}`")]
    InvalidNumber(String),
}

/// One edge of a root margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f64),
    /// Percentage of the root's width (left/right) or height (top/bottom).
    Percent(f64),
}

impl Length {
    pub const ZERO: Length = Length::Px(0.0);

    pub fn resolve(self, basis: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => basis * pct / 100.0,
        }
    }
}

impl FromStr for Length {
    type Err = MarginParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if token == "0" {
            return Ok(Self::ZERO);
        }
        let (number, make): (&str, fn(f64) -> Length) = if let Some(n) = token.strip_suffix("px")
        {
            (n, Length::Px)
        } else if let Some(n) = token.strip_suffix('%') {
            (n, Length::Percent)
        } else {
            return Err(MarginParseError::InvalidUnit(token.to_string()));
        };
        match number.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(make(value)),
            _ => Err(MarginParseError::InvalidNumber(token.to_string())),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(px) => write!(f, "{px}px"),
            Self::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

/// Bias applied to the viewport boundary before intersection is measured.
///
/// Positive edges grow the effective viewport, negative edges shrink it.
/// Written and parsed in CSS margin shorthand (`"0px 0px -50px 0px"`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl RootMargin {
    /// No bias: the literal viewport edge.
    pub const ZERO: RootMargin = RootMargin::uniform(Length::ZERO);

    /// The reveal default: the bottom edge is pulled in by 50px, so an
    /// element scrolling up from below must clear the last 50px of the
    /// viewport before it counts as visible, and is hidden again as soon as
    /// it drops back into that band.
    pub const EARLY_TRIGGER: RootMargin = RootMargin {
        top: Length::ZERO,
        right: Length::ZERO,
        bottom: Length::Px(-50.0),
        left: Length::ZERO,
    };

    pub const fn uniform(length: Length) -> Self {
        Self {
            top: length,
            right: length,
            bottom: length,
            left: length,
        }
    }

    /// Resolve percentages against the root rectangle.
    pub fn resolve(&self, root: &Rect) -> EdgeInsets {
        EdgeInsets::new(
            self.top.resolve(root.h),
            self.right.resolve(root.w),
            self.bottom.resolve(root.h),
            self.left.resolve(root.w),
        )
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::EARLY_TRIGGER
    }
}

impl FromStr for RootMargin {
    type Err = MarginParseError;

    /// Parse CSS margin shorthand: one value applies to every edge, two are
    /// vertical/horizontal, three are top/horizontal/bottom, four are
    /// top/right/bottom/left.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split_whitespace()
            .map(str::parse::<Length>)
            .collect::<Result<Vec<_>, _>>()?;

        let (top, right, bottom, left) = match values.as_slice() {
            [] => return Err(MarginParseError::Empty),
            [all] => (*all, *all, *all, *all),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l] => (*t, *r, *b, *l),
            more => return Err(MarginParseError::TooManyValues(more.len())),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

// Serialized as the CSS shorthand string, the same form a host passes to
// its own intersection primitive.

impl Serialize for RootMargin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RootMargin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_four_value_shorthand() {
        let margin: RootMargin = "0px 0px -50px 0px".parse().unwrap();
        assert_eq!(margin, RootMargin::EARLY_TRIGGER);
        assert_eq!(margin, RootMargin::default());
    }

    #[test]
    fn expands_short_forms_like_css() {
        let one: RootMargin = "10px".parse().unwrap();
        assert_eq!(one, RootMargin::uniform(Length::Px(10.0)));

        let two: RootMargin = "10px 5%".parse().unwrap();
        assert_eq!(two.top, Length::Px(10.0));
        assert_eq!(two.bottom, Length::Px(10.0));
        assert_eq!(two.left, Length::Percent(5.0));
        assert_eq!(two.right, Length::Percent(5.0));

        let three: RootMargin = "1px 2px 3px".parse().unwrap();
        assert_eq!(three.top, Length::Px(1.0));
        assert_eq!(three.right, Length::Px(2.0));
        assert_eq!(three.bottom, Length::Px(3.0));
        assert_eq!(three.left, Length::Px(2.0));
    }

    #[test]
    fn bare_zero_is_accepted() {
        let margin: RootMargin = "0 0 -50px 0".parse().unwrap();
        assert_eq!(margin, RootMargin::EARLY_TRIGGER);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!("".parse::<RootMargin>(), Err(MarginParseError::Empty));
        assert_eq!("   ".parse::<RootMargin>(), Err(MarginParseError::Empty));
        assert_eq!(
            "1px 2px 3px 4px 5px".parse::<RootMargin>(),
            Err(MarginParseError::TooManyValues(5))
        );
        assert_eq!(
            "10em".parse::<RootMargin>(),
            Err(MarginParseError::InvalidUnit("10em".into()))
        );
        assert_eq!(
            "abcpx".parse::<RootMargin>(),
            Err(MarginParseError::InvalidNumber("abcpx".into()))
        );
        assert!("5".parse::<RootMargin>().is_err());
    }

    #[test]
    fn display_is_canonical_four_values() {
        let margin: RootMargin = "-50px 10%".parse().unwrap();
        assert_eq!(margin.to_string(), "-50px 10% -50px 10%");
        assert_eq!(RootMargin::EARLY_TRIGGER.to_string(), "0px 0px -50px 0px");
    }

    #[test]
    fn percentages_resolve_against_root_axes() {
        let margin: RootMargin = "10% 25%".parse().unwrap();
        let insets = margin.resolve(&Rect::new(0.0, 0.0, 400.0, 200.0));
        assert_eq!(insets, EdgeInsets::new(20.0, 100.0, 20.0, 100.0));
    }

    #[test]
    fn serde_uses_shorthand_string() {
        let json = serde_json::to_string(&RootMargin::EARLY_TRIGGER).unwrap();
        assert_eq!(json, "\"0px 0px -50px 0px\"");
        let back: RootMargin = serde_json::from_str("\"20px\"").unwrap();
        assert_eq!(back, RootMargin::uniform(Length::Px(20.0)));
        assert!(serde_json::from_str::<RootMargin>("\"20\"").is_err());
    }
}
