use reveal_protocol::{ChildFrame, ChildPhase, MotionPreset, Reveal};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::presentation::present;
use super::stagger::StaggerPlan;
use crate::observe::{
    IntersectionEntry, IntersectionHost, ObserverControl, ObserverOptions, ObserverStatus,
    OptionsError, Threshold, VisibilityObserver, WatchId,
};

/// Everything a section controller is configured with.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerOptions {
    pub observer: ObserverOptions,
    pub stagger: StaggerPlan,
}

impl ControllerOptions {
    pub fn new(threshold: Threshold, trigger_once: bool) -> Self {
        Self {
            observer: ObserverOptions {
                threshold,
                trigger_once,
                ..Default::default()
            },
            stagger: StaggerPlan::default(),
        }
    }
}

/// Reveal state for one page section and its children.
///
/// Owns a single [`VisibilityObserver`] for the section root and derives
/// the per-child delays from a [`StaggerPlan`]. States:
///
/// ```text
/// bidirectional:  HIDDEN ──enter──▶ VISIBLE ──leave──▶ HIDDEN ...
/// trigger-once:   HIDDEN ──enter──▶ VISIBLE (terminal, watch released)
/// ```
///
/// The controller holds a clone of the host handle and detaches its watch
/// when dropped.
#[derive(Debug)]
pub struct SectionAnimationController<H: IntersectionHost> {
    host: H,
    observer: VisibilityObserver,
    stagger: StaggerPlan,
    /// Host time of the latest hidden -> visible transition, while visible.
    revealed_at: Option<f64>,
}

impl<H: IntersectionHost> SectionAnimationController<H> {
    pub fn new(host: H, options: ControllerOptions) -> Self {
        Self {
            host,
            observer: VisibilityObserver::new(options.observer),
            stagger: options.stagger,
            revealed_at: None,
        }
    }

    /// Controller with the default root margin and stagger.
    ///
    /// `SectionAnimationController::create(host, 0.1, false)` is the
    /// reveal-on-every-pass default.
    pub fn create(host: H, threshold: f64, trigger_once: bool) -> Result<Self, OptionsError> {
        let threshold = Threshold::new(threshold)?;
        Ok(Self::new(host, ControllerOptions::new(threshold, trigger_once)))
    }

    /// Watch `root`. A second call replaces the first binding and drops the
    /// old watch.
    pub fn bind_root(&mut self, root: &H::Target) -> ObserverStatus {
        self.revealed_at = None;
        let status = self.observer.attach(&self.host, root);
        if status == ObserverStatus::Unsupported {
            self.revealed_at = Some(0.0);
        }
        status
    }

    /// Register a listener for transitions; see
    /// [`VisibilityObserver::on_change`].
    pub fn on_change(&mut self, listener: impl FnMut(bool, &mut ObserverControl) + 'static) {
        self.observer.on_change(listener);
    }

    /// Feed one host entry. Returns the new state when it changed.
    pub fn deliver(&mut self, entry: &IntersectionEntry) -> Option<bool> {
        let changed = self.observer.deliver(&self.host, entry)?;
        self.revealed_at = changed.then_some(entry.time_ms);
        debug!(
            watch = entry.watch.0,
            visible = changed,
            time_ms = entry.time_ms,
            "section transition"
        );
        Some(changed)
    }

    /// Drain the host and deliver whatever belongs to this controller.
    ///
    /// Only for a controller that has the host to itself: entries for other
    /// watches are dropped. Pages with several sections route through
    /// [`Page::pump`](crate::page::Page::pump) instead.
    pub fn pump(&mut self) -> Option<bool> {
        let mut last = None;
        for entry in self.host.drain() {
            if let Some(state) = self.deliver(&entry) {
                last = Some(state);
            }
        }
        last
    }

    /// Release the watch. Idempotent; also runs on drop.
    pub fn teardown(&mut self) {
        self.observer.detach(&self.host);
    }

    /// `false` until bound and revealed. `true` on a host that cannot
    /// measure visibility.
    pub fn visible(&self) -> bool {
        self.observer.visible()
    }

    pub fn status(&self) -> ObserverStatus {
        self.observer.status()
    }

    pub fn watch_id(&self) -> Option<WatchId> {
        self.observer.watch_id()
    }

    pub fn options(&self) -> ControllerOptions {
        ControllerOptions {
            observer: *self.observer.options(),
            stagger: self.stagger,
        }
    }

    pub fn stagger(&self) -> StaggerPlan {
        self.stagger
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn revealed_at(&self) -> Option<f64> {
        self.revealed_at
    }

    pub fn delay_for(&self, index: usize) -> u32 {
        self.stagger.delay(index)
    }

    /// The `(visible, delay_ms)` pair for child `index`.
    pub fn reveal(&self, index: usize) -> Reveal {
        Reveal::new(self.visible(), self.delay_for(index))
    }

    /// Host time at which child `index` starts its entrance, while visible.
    pub fn child_start(&self, index: usize) -> Option<f64> {
        self.revealed_at
            .map(|at| at + f64::from(self.delay_for(index)))
    }

    pub fn child_phase(&self, index: usize, now_ms: f64) -> ChildPhase {
        match self.child_start(index) {
            None => ChildPhase::Hidden,
            Some(start) if now_ms < start => ChildPhase::Scheduled,
            Some(_) => ChildPhase::Started,
        }
    }

    /// Snapshot of the first `child_count` children at `now_ms`.
    pub fn child_frames(
        &self,
        child_count: usize,
        now_ms: f64,
        preset: MotionPreset,
        duration_ms: u32,
    ) -> Vec<ChildFrame> {
        (0..child_count)
            .map(|index| {
                let reveal = self.reveal(index);
                ChildFrame {
                    index,
                    reveal,
                    phase: self.child_phase(index, now_ms),
                    style: present(preset, reveal, duration_ms),
                }
            })
            .collect()
    }
}

/// Deliver `entries` to whichever controller owns each entry's watch, in
/// order. Entries for released or unknown watches are dropped. Returns the
/// number of transitions.
pub fn route<H: IntersectionHost>(
    controllers: &mut [&mut SectionAnimationController<H>],
    entries: impl IntoIterator<Item = IntersectionEntry>,
) -> usize {
    let mut transitions = 0;
    for entry in entries {
        let owner = controllers
            .iter_mut()
            .find(|c| c.watch_id() == Some(entry.watch));
        if let Some(controller) = owner
            && controller.deliver(&entry).is_some()
        {
            transitions += 1;
        }
    }
    transitions
}

impl<H: IntersectionHost> Drop for SectionAnimationController<H> {
    fn drop(&mut self) {
        self.observer.detach(&self.host);
    }
}
