use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use reveal_protocol::Rect;

use super::geometry::{Intersection, intersect};
use super::host::{IntersectionEntry, IntersectionHost, WatchId, WatchParams};

/// An element registered with a [`SimulatedViewport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

#[derive(Debug)]
struct SimElement {
    rect: Rect,
    mounted: bool,
}

#[derive(Debug)]
struct SimWatch {
    element: ElementId,
    params: WatchParams,
    /// `(is_intersecting, meets threshold)` as of the last queued entry.
    last: (bool, bool),
}

#[derive(Debug)]
struct SimState {
    width: f64,
    height: f64,
    scroll_y: f64,
    now_ms: f64,
    elements: BTreeMap<ElementId, SimElement>,
    watches: BTreeMap<WatchId, SimWatch>,
    queue: VecDeque<IntersectionEntry>,
    next_element: u64,
    next_watch: u64,
}

impl SimState {
    fn root(&self) -> Rect {
        Rect::new(0.0, self.scroll_y, self.width, self.height)
    }

    fn measure(&self, element: ElementId, params: &WatchParams) -> Intersection {
        match self.elements.get(&element) {
            Some(el) if el.mounted => intersect(&el.rect, &self.root(), &params.root_margin),
            _ => Intersection::NONE,
        }
    }

    /// Queue an entry for every watch whose side of its threshold changed.
    fn refresh(&mut self) {
        let now_ms = self.now_ms;
        let mut changed = Vec::new();
        for (&id, watch) in &self.watches {
            let intersection = self.measure(watch.element, &watch.params);
            let key = (
                intersection.is_intersecting,
                intersection.meets(watch.params.threshold),
            );
            if key != watch.last {
                changed.push((id, key, intersection));
            }
        }
        for (id, key, intersection) in changed {
            if let Some(watch) = self.watches.get_mut(&id) {
                watch.last = key;
            }
            self.queue.push_back(IntersectionEntry {
                watch: id,
                intersection,
                time_ms: now_ms,
            });
        }
    }
}

/// Software intersection host: a page of rectangles under a scrollable
/// viewport.
///
/// Coordinates are page pixels. Like a browser, the host queues one entry
/// as soon as a watch starts, then one per change of side of the watch's
/// threshold. Used by the terminal preview and by tests.
#[derive(Debug, Clone)]
pub struct SimulatedViewport {
    state: Rc<RefCell<SimState>>,
}

impl SimulatedViewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            state: Rc::new(RefCell::new(SimState {
                width,
                height,
                scroll_y: 0.0,
                now_ms: 0.0,
                elements: BTreeMap::new(),
                watches: BTreeMap::new(),
                queue: VecDeque::new(),
                next_element: 0,
                next_watch: 0,
            })),
        }
    }

    /// Add a mounted element.
    pub fn add_element(&self, rect: Rect) -> ElementId {
        self.insert(rect, true)
    }

    /// Add an element that exists in the layout but is not mounted yet.
    pub fn add_unmounted(&self, rect: Rect) -> ElementId {
        self.insert(rect, false)
    }

    fn insert(&self, rect: Rect, mounted: bool) -> ElementId {
        let mut state = self.state.borrow_mut();
        let id = ElementId(state.next_element);
        state.next_element += 1;
        state.elements.insert(id, SimElement { rect, mounted });
        id
    }

    pub fn mount(&self, element: ElementId) {
        self.set_mounted(element, true);
    }

    /// Unmounted elements report no intersection to existing watches.
    pub fn unmount(&self, element: ElementId) {
        self.set_mounted(element, false);
    }

    fn set_mounted(&self, element: ElementId, mounted: bool) {
        let mut state = self.state.borrow_mut();
        if let Some(el) = state.elements.get_mut(&element) {
            el.mounted = mounted;
        }
        state.refresh();
    }

    pub fn move_element(&self, element: ElementId, rect: Rect) {
        let mut state = self.state.borrow_mut();
        if let Some(el) = state.elements.get_mut(&element) {
            el.rect = rect;
        }
        state.refresh();
    }

    /// Scroll so the viewport's top edge sits at page offset `y`.
    pub fn scroll_to(&self, y: f64, time_ms: f64) {
        let mut state = self.state.borrow_mut();
        state.scroll_y = y;
        state.now_ms = time_ms;
        state.refresh();
    }

    pub fn scroll_by(&self, dy: f64, time_ms: f64) {
        let y = self.scroll_y() + dy;
        self.scroll_to(y, time_ms);
    }

    /// Scroll from the current position to `y` in steps of at most `step`
    /// px, advancing the clock by `step_ms` per step. Each intermediate
    /// position is measured, as a browser would while scrolling.
    /// A non-finite `y` is ignored.
    pub fn scroll_smoothly(&self, y: f64, step: f64, step_ms: f64) {
        if !y.is_finite() {
            return;
        }
        let step = step.abs().max(1.0);
        loop {
            let (current, now) = {
                let state = self.state.borrow();
                (state.scroll_y, state.now_ms)
            };
            let remaining = y - current;
            if remaining.abs() <= f64::EPSILON {
                break;
            }
            let delta = remaining.clamp(-step, step);
            self.scroll_to(current + delta, now + step_ms);
        }
    }

    pub fn resize(&self, width: f64, height: f64, time_ms: f64) {
        let mut state = self.state.borrow_mut();
        state.width = width;
        state.height = height;
        state.now_ms = time_ms;
        state.refresh();
    }

    pub fn scroll_y(&self) -> f64 {
        self.state.borrow().scroll_y
    }

    pub fn now_ms(&self) -> f64 {
        self.state.borrow().now_ms
    }

    /// The viewport in page coordinates.
    pub fn viewport(&self) -> Rect {
        self.state.borrow().root()
    }

    /// Number of live watches. Each bound controller holds exactly one.
    pub fn active_watches(&self) -> usize {
        self.state.borrow().watches.len()
    }

    pub fn pending_entries(&self) -> usize {
        self.state.borrow().queue.len()
    }
}

impl IntersectionHost for SimulatedViewport {
    type Target = ElementId;

    fn watch(&self, target: &ElementId, params: &WatchParams) -> Option<WatchId> {
        let mut state = self.state.borrow_mut();
        let mounted = state.elements.get(target).is_some_and(|el| el.mounted);
        if !mounted {
            return None;
        }

        let id = WatchId(state.next_watch);
        state.next_watch += 1;
        let intersection = state.measure(*target, params);
        let last = (
            intersection.is_intersecting,
            intersection.meets(params.threshold),
        );
        state.watches.insert(
            id,
            SimWatch {
                element: *target,
                params: *params,
                last,
            },
        );
        let time_ms = state.now_ms;
        state.queue.push_back(IntersectionEntry {
            watch: id,
            intersection,
            time_ms,
        });
        Some(id)
    }

    fn unwatch(&self, watch: WatchId) {
        let mut state = self.state.borrow_mut();
        if state.watches.remove(&watch).is_some() {
            state.queue.retain(|entry| entry.watch != watch);
        }
    }

    fn drain(&self) -> Vec<IntersectionEntry> {
        self.state.borrow_mut().queue.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::margin::RootMargin;
    use crate::observe::options::Threshold;

    fn params(threshold: f64) -> WatchParams {
        WatchParams {
            threshold: Threshold::new(threshold).unwrap(),
            root_margin: RootMargin::ZERO,
        }
    }

    #[test]
    fn watch_queues_initial_entry() {
        let host = SimulatedViewport::new(800.0, 600.0);
        let el = host.add_element(Rect::new(0.0, 100.0, 800.0, 100.0));
        let watch = host.watch(&el, &params(0.1)).unwrap();
        let entries = host.drain();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].watch, watch);
        assert_eq!(entries[0].intersection, Intersection::FULL);
        assert!(host.drain().is_empty());
    }

    #[test]
    fn unmounted_target_is_not_watched() {
        let host = SimulatedViewport::new(800.0, 600.0);
        let el = host.add_unmounted(Rect::new(0.0, 0.0, 800.0, 100.0));
        assert!(host.watch(&el, &params(0.1)).is_none());
        assert_eq!(host.active_watches(), 0);
        assert_eq!(host.pending_entries(), 0);
    }

    #[test]
    fn scrolling_within_one_side_queues_nothing() {
        let host = SimulatedViewport::new(800.0, 600.0);
        let el = host.add_element(Rect::new(0.0, 1000.0, 800.0, 200.0));
        host.watch(&el, &params(0.5)).unwrap();
        host.drain();

        host.scroll_to(100.0, 16.0);
        host.scroll_to(200.0, 32.0);
        assert!(host.drain().is_empty());

        // 100 of 200 rows visible: crosses 0.5.
        host.scroll_to(500.0, 48.0);
        let entries = host.drain();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].time_ms, 48.0);
        assert!(entries[0].intersection.meets(Threshold::new(0.5).unwrap()));
    }

    #[test]
    fn unwatch_discards_queued_entries() {
        let host = SimulatedViewport::new(800.0, 600.0);
        let el = host.add_element(Rect::new(0.0, 0.0, 800.0, 100.0));
        let watch = host.watch(&el, &params(0.1)).unwrap();
        host.unwatch(watch);
        host.unwatch(watch);
        assert!(host.drain().is_empty());
        assert_eq!(host.active_watches(), 0);
    }

    #[test]
    fn smooth_scroll_visits_intermediate_positions() {
        let host = SimulatedViewport::new(800.0, 600.0);
        let el = host.add_element(Rect::new(0.0, 700.0, 800.0, 100.0));
        host.watch(&el, &params(0.1)).unwrap();
        host.drain();

        // Scroll past the element and back out the top in one call.
        host.scroll_smoothly(1400.0, 50.0, 10.0);
        let entries = host.drain();
        let states: Vec<bool> = entries
            .iter()
            .map(|e| e.intersection.meets(Threshold::DEFAULT))
            .collect();
        // Touching the bottom edge, crossing 0.1, touching the top edge,
        // then gone.
        assert_eq!(states, vec![false, true, false, false]);
        assert_eq!(entries[0].intersection.ratio, 0.0);
        assert_eq!(host.scroll_y(), 1400.0);
        assert_eq!(host.now_ms(), 280.0);
    }

    #[test]
    fn shrinking_the_viewport_hides_a_section_near_the_bottom() {
        let host = SimulatedViewport::new(800.0, 600.0);
        let el = host.add_element(Rect::new(0.0, 500.0, 800.0, 100.0));
        let watch = host.watch(&el, &params(0.1)).unwrap();
        assert!(host.drain()[0].intersection.meets(Threshold::DEFAULT));

        host.resize(800.0, 300.0, 10.0);
        let entries = host.drain();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].watch, watch);
        assert_eq!(entries[0].intersection, Intersection::NONE);
        assert_eq!(entries[0].time_ms, 10.0);
        assert_eq!(host.viewport(), Rect::new(0.0, 0.0, 800.0, 300.0));
    }

    #[test]
    fn moving_an_element_into_view_reveals_it() {
        let host = SimulatedViewport::new(800.0, 600.0);
        let el = host.add_element(Rect::new(0.0, 2_000.0, 800.0, 100.0));
        host.watch(&el, &params(0.1)).unwrap();
        assert!(!host.drain()[0].intersection.meets(Threshold::DEFAULT));

        host.move_element(el, Rect::new(0.0, 100.0, 800.0, 100.0));
        let entries = host.drain();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].intersection, Intersection::FULL);
    }

    #[test]
    fn smooth_scroll_to_a_non_finite_offset_does_nothing() {
        let host = SimulatedViewport::new(800.0, 600.0);
        let el = host.add_element(Rect::new(0.0, 0.0, 800.0, 100.0));
        host.watch(&el, &params(0.1)).unwrap();
        host.drain();

        host.scroll_smoothly(f64::INFINITY, 50.0, 1.0);
        host.scroll_smoothly(f64::NAN, 50.0, 1.0);
        assert_eq!(host.scroll_y(), 0.0);
        assert_eq!(host.now_ms(), 0.0);
        assert!(host.drain().is_empty());
    }
}
