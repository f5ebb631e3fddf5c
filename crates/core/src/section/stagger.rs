use serde::{Deserialize, Serialize};

/// Step between consecutive children when nothing else is configured.
pub const DEFAULT_STEP_MS: u32 = 50;

/// Start delay of the child at `index`: `base_ms + index * step_ms`.
///
/// Pure; saturates instead of overflowing.
pub fn delay_for(index: usize, step_ms: u32, base_ms: u32) -> u32 {
    let index = u32::try_from(index).unwrap_or(u32::MAX);
    base_ms.saturating_add(index.saturating_mul(step_ms))
}

/// Per-child time offsets for a section's cascade.
///
/// Children do not detect visibility themselves. They inherit the
/// section's single transition, shifted by a fixed step per ordinal, so a
/// fast scroll past a section still reveals every child in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaggerPlan {
    pub step_ms: u32,
    pub base_ms: u32,
}

impl StaggerPlan {
    pub fn new(step_ms: u32, base_ms: u32) -> Self {
        Self { step_ms, base_ms }
    }

    pub fn delay(&self, index: usize) -> u32 {
        delay_for(index, self.step_ms, self.base_ms)
    }

    /// Delay for a hide cascade over `count` children: last child first.
    pub fn exit_delay(&self, index: usize, count: usize) -> u32 {
        let reversed = count.saturating_sub(index).saturating_sub(1);
        self.delay(reversed)
    }

    /// A plan whose ordinals continue after the first `count` children of
    /// this one, for a second group that should pick up where the first
    /// stops.
    pub fn then(&self, count: usize) -> StaggerPlan {
        StaggerPlan {
            step_ms: self.step_ms,
            base_ms: self.delay(count),
        }
    }

    /// Delays of the first `count` children.
    pub fn schedule(self, count: usize) -> impl Iterator<Item = u32> {
        (0..count).map(move |index| self.delay(index))
    }

    /// When the last of `count` children starts, relative to the reveal.
    pub fn span_ms(&self, count: usize) -> u32 {
        match count {
            0 => 0,
            n => self.delay(n - 1),
        }
    }
}

impl Default for StaggerPlan {
    fn default() -> Self {
        Self {
            step_ms: DEFAULT_STEP_MS,
            base_ms: 0,
        }
    }
}
