use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use js_sys::Array;
use reveal_core::IntersectionHost;
use reveal_core::observe::{Intersection, IntersectionEntry, WatchId, WatchParams};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

type EntryCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

struct DomWatch {
    observer: IntersectionObserver,
    target: Element,
    // Kept alive for as long as the observer can call it.
    _callback: EntryCallback,
}

struct DomHostInner {
    supported: Cell<bool>,
    queue: Rc<RefCell<VecDeque<IntersectionEntry>>>,
    watches: RefCell<HashMap<WatchId, DomWatch>>,
    next_watch: Cell<u64>,
}

/// Intersection host backed by the browser's `IntersectionObserver`.
///
/// One observer per watch. The browser invokes the callbacks between
/// frames; they only append to a queue, which [`drain`](IntersectionHost::drain)
/// hands to the core on the next pump. If the observer constructor throws,
/// the host reports itself unsupported from then on.
#[derive(Clone)]
pub struct DomHost {
    inner: Rc<DomHostInner>,
}

impl DomHost {
    pub fn new() -> Self {
        let supported = web_sys::window().is_some_and(|window| {
            js_sys::Reflect::has(&window, &JsValue::from_str("IntersectionObserver"))
                .unwrap_or(false)
        });
        if !supported {
            web_sys::console::warn_1(
                &"reveal: IntersectionObserver unavailable; sections stay visible".into(),
            );
        }
        Self {
            inner: Rc::new(DomHostInner {
                supported: Cell::new(supported),
                queue: Rc::new(RefCell::new(VecDeque::new())),
                watches: RefCell::new(HashMap::new()),
                next_watch: Cell::new(0),
            }),
        }
    }
}

impl Default for DomHost {
    fn default() -> Self {
        Self::new()
    }
}

impl IntersectionHost for DomHost {
    type Target = Element;

    fn watch(&self, target: &Element, params: &WatchParams) -> Option<WatchId> {
        if !target.is_connected() {
            return None;
        }

        let id = WatchId(self.inner.next_watch.get());
        self.inner.next_watch.set(id.0 + 1);

        let queue = Rc::clone(&self.inner.queue);
        let callback: EntryCallback = Closure::new(move |entries: Array, _: IntersectionObserver| {
            let mut queue = queue.borrow_mut();
            for value in entries.iter() {
                let entry: IntersectionObserverEntry = value.unchecked_into();
                queue.push_back(IntersectionEntry {
                    watch: id,
                    intersection: Intersection {
                        ratio: entry.intersection_ratio(),
                        is_intersecting: entry.is_intersecting(),
                    },
                    time_ms: entry.time(),
                });
            }
        });

        let init = IntersectionObserverInit::new();
        init.set_root_margin(&params.root_margin.to_string());
        init.set_threshold(&JsValue::from_f64(params.threshold.get()));

        let observer =
            match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
            {
                Ok(observer) => observer,
                Err(err) => {
                    web_sys::console::warn_2(&"reveal: could not create observer".into(), &err);
                    self.inner.supported.set(false);
                    return None;
                }
            };
        observer.observe(target);

        self.inner.watches.borrow_mut().insert(
            id,
            DomWatch {
                observer,
                target: target.clone(),
                _callback: callback,
            },
        );
        Some(id)
    }

    fn unwatch(&self, watch: WatchId) {
        let Some(dom) = self.inner.watches.borrow_mut().remove(&watch) else {
            return;
        };
        dom.observer.unobserve(&dom.target);
        dom.observer.disconnect();
        self.inner
            .queue
            .borrow_mut()
            .retain(|entry| entry.watch != watch);
    }

    fn drain(&self) -> Vec<IntersectionEntry> {
        self.inner.queue.borrow_mut().drain(..).collect()
    }

    fn is_supported(&self) -> bool {
        self.inner.supported.get()
    }
}
