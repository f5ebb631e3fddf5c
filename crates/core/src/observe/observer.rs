use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::host::{IntersectionEntry, IntersectionHost, WatchId, WatchParams};
use super::options::ObserverOptions;

/// Lifecycle of an observer's watch.
///
/// `Pending` and `Observing` both read as not visible until an entry says
/// otherwise; the status keeps them apart for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObserverStatus {
    /// Never attached.
    Unbound,
    /// Attached before the target was mounted; nothing is being watched.
    Pending,
    Observing,
    /// Trigger-once observer that has fired and dropped its watch.
    Released,
    Detached,
    /// The host cannot measure visibility; the observer reports visible.
    Unsupported,
}

/// Handed to change listeners so they can tear the observer down from
/// inside the callback. The detach runs after the listeners return.
#[derive(Debug, Default)]
pub struct ObserverControl {
    detach: bool,
}

impl ObserverControl {
    pub fn detach(&mut self) {
        self.detach = true;
    }

    pub fn detach_requested(&self) -> bool {
        self.detach
    }
}

type Listener = Box<dyn FnMut(bool, &mut ObserverControl)>;

/// Watches one element and turns host entries into visibility transitions.
///
/// The observer does not own the host; every operation that touches the
/// host borrows it, so one host handle can serve many observers.
pub struct VisibilityObserver {
    options: ObserverOptions,
    visible: bool,
    status: ObserverStatus,
    watch: Option<WatchId>,
    listeners: Vec<Listener>,
}

impl VisibilityObserver {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            visible: false,
            status: ObserverStatus::Unbound,
            watch: None,
            listeners: Vec::new(),
        }
    }

    pub fn options(&self) -> &ObserverOptions {
        &self.options
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn status(&self) -> ObserverStatus {
        self.status
    }

    /// The live watch, if any.
    pub fn watch_id(&self) -> Option<WatchId> {
        self.watch
    }

    /// Begin watching `target`, replacing any previous watch.
    ///
    /// Visibility restarts at `false`. An unmounted target leaves the
    /// observer `Pending`: not an error, and nothing is retried.
    pub fn attach<H>(&mut self, host: &H, target: &H::Target) -> ObserverStatus
    where
        H: IntersectionHost + ?Sized,
    {
        self.detach(host);
        self.visible = false;

        if !host.is_supported() {
            return self.fail_open();
        }

        match host.watch(target, &WatchParams::from(&self.options)) {
            Some(watch) => {
                debug!(
                    watch = watch.0,
                    threshold = self.options.threshold.get(),
                    root_margin = %self.options.root_margin,
                    trigger_once = self.options.trigger_once,
                    "observing"
                );
                self.watch = Some(watch);
                self.status = ObserverStatus::Observing;
            }
            // The host may discover it cannot observe only when asked to.
            None if !host.is_supported() => return self.fail_open(),
            None => {
                debug!("target not mounted; observer pending");
                self.status = ObserverStatus::Pending;
            }
        }
        self.status
    }

    fn fail_open(&mut self) -> ObserverStatus {
        debug!("intersection host unsupported; failing open");
        self.visible = true;
        self.status = ObserverStatus::Unsupported;
        self.status
    }

    /// Register a listener called with the new state on every transition.
    pub fn on_change(&mut self, listener: impl FnMut(bool, &mut ObserverControl) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Feed one host entry through the observer.
    ///
    /// Entries for other watches, entries that arrive after the watch was
    /// released, and entries that do not change the state are absorbed.
    /// Returns the new state when it changed.
    pub fn deliver<H>(&mut self, host: &H, entry: &IntersectionEntry) -> Option<bool>
    where
        H: IntersectionHost + ?Sized,
    {
        if self.watch != Some(entry.watch) {
            return None;
        }
        let next = entry.intersection.meets(self.options.threshold);
        if next == self.visible {
            return None;
        }

        self.visible = next;
        trace!(
            watch = entry.watch.0,
            visible = next,
            ratio = entry.intersection.ratio,
            time_ms = entry.time_ms,
            "visibility changed"
        );

        // A one-shot observer only ever moves hidden -> visible, and lets
        // go of its watch before anyone hears about it.
        if self.options.trigger_once {
            if let Some(watch) = self.watch.take() {
                host.unwatch(watch);
            }
            self.status = ObserverStatus::Released;
            debug!(watch = entry.watch.0, "trigger-once observer released");
        }

        self.notify(host, next);
        Some(next)
    }

    /// Release the watch. Safe to call any number of times.
    pub fn detach<H>(&mut self, host: &H)
    where
        H: IntersectionHost + ?Sized,
    {
        if let Some(watch) = self.watch.take() {
            host.unwatch(watch);
            debug!(watch = watch.0, "observer detached");
        }
        if matches!(
            self.status,
            ObserverStatus::Observing | ObserverStatus::Pending | ObserverStatus::Unsupported
        ) {
            self.status = ObserverStatus::Detached;
        }
    }

    fn notify<H>(&mut self, host: &H, visible: bool)
    where
        H: IntersectionHost + ?Sized,
    {
        let mut control = ObserverControl::default();
        for listener in &mut self.listeners {
            listener(visible, &mut control);
        }
        if control.detach_requested() {
            self.detach(host);
        }
    }
}

impl fmt::Debug for VisibilityObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityObserver")
            .field("options", &self.options)
            .field("visible", &self.visible)
            .field("status", &self.status)
            .field("watch", &self.watch)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
