use serde::{Deserialize, Serialize};

use super::geometry::Intersection;
use super::margin::RootMargin;
use super::options::{ObserverOptions, Threshold};

/// Identifies one live watch inside a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WatchId(pub u64);

/// What the host needs to know to watch a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchParams {
    pub threshold: Threshold,
    pub root_margin: RootMargin,
}

impl From<&ObserverOptions> for WatchParams {
    fn from(options: &ObserverOptions) -> Self {
        Self {
            threshold: options.threshold,
            root_margin: options.root_margin,
        }
    }
}

/// One observation reported by a host for one watch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub watch: WatchId,
    pub intersection: Intersection,
    /// Host timestamp of the observation (ms).
    pub time_ms: f64,
}

/// The viewport-intersection primitive a host environment provides.
///
/// Hosts are handles: cloning one yields another reference to the same
/// underlying state, and every method takes `&self`. They are single
/// threaded; entries are queued by the host as it sees crossings and
/// handed out in the order they happened by [`drain`](Self::drain), at
/// whatever cadence the host runs (per scroll step, per frame).
pub trait IntersectionHost {
    type Target: ?Sized;

    /// Start watching `target`. Returns `None` when the target is not
    /// mounted yet; nothing is queued in that case.
    fn watch(&self, target: &Self::Target, params: &WatchParams) -> Option<WatchId>;

    /// Stop watching. Unknown or already-released ids are ignored.
    fn unwatch(&self, watch: WatchId);

    /// Take every queued entry, oldest first.
    fn drain(&self) -> Vec<IntersectionEntry>;

    /// Whether the host can measure visibility at all. Observers on an
    /// unsupported host fail open and report visible.
    fn is_supported(&self) -> bool {
        true
    }
}
