use serde::{Deserialize, Serialize};

use crate::types::Point;

/// The two values a renderer needs for one revealable item.
///
/// Every child of a section shares the section's `visible` flag; only
/// `delay_ms` differs between siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reveal {
    pub visible: bool,
    pub delay_ms: u32,
}

impl Reveal {
    pub fn new(visible: bool, delay_ms: u32) -> Self {
        Self { visible, delay_ms }
    }
}

/// Where a child is in its cascade at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChildPhase {
    /// The section is hidden.
    Hidden,
    /// The section is visible but this child's delay has not elapsed yet.
    Scheduled,
    /// The child's transition has begun.
    Started,
}

/// Resolved presentation for one item: target opacity and offset plus the
/// transition timing that gets there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevealStyle {
    pub opacity: f32,
    pub translate: Point,
    pub duration_ms: u32,
    pub delay_ms: u32,
}

impl RevealStyle {
    /// Inline CSS declarations for this style.
    ///
    /// ```
    /// # use reveal_protocol::{Point, RevealStyle};
    /// let style = RevealStyle {
    ///     opacity: 0.0,
    ///     translate: Point::new(0.0, 32.0),
    ///     duration_ms: 700,
    ///     delay_ms: 100,
    /// };
    /// assert_eq!(
    ///     style.to_css(),
    ///     "opacity: 0; transform: translate(0px, 32px); transition: opacity 700ms ease-out 100ms, transform 700ms ease-out 100ms;"
    /// );
    /// ```
    pub fn to_css(&self) -> String {
        let d = self.duration_ms;
        let delay = self.delay_ms;
        format!(
            "opacity: {}; transform: translate({}px, {}px); \
             transition: opacity {d}ms ease-out {delay}ms, transform {d}ms ease-out {delay}ms;",
            self.opacity, self.translate.x, self.translate.y,
        )
    }

    /// Declarations as `(property, value)` pairs for hosts that set style
    /// properties one at a time.
    pub fn declarations(&self) -> [(&'static str, String); 3] {
        let d = self.duration_ms;
        let delay = self.delay_ms;
        [
            ("opacity", self.opacity.to_string()),
            (
                "transform",
                format!("translate({}px, {}px)", self.translate.x, self.translate.y),
            ),
            (
                "transition",
                format!("opacity {d}ms ease-out {delay}ms, transform {d}ms ease-out {delay}ms"),
            ),
        ]
    }
}
