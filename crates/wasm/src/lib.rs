//! Browser bindings. Sections are addressed by handle (an index into a
//! thread-local table); structured results cross the boundary as JSON.

mod handles;
mod host;

use std::cell::RefCell;

use reveal_core::section::route;
use reveal_core::{IntersectionHost, RevealConfig, RootMargin, SectionAnimationController};
use reveal_protocol::{ChildFrame, MotionPreset};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement};

use crate::handles::HandleTable;

pub use host::DomHost;

struct Slot {
    controller: SectionAnimationController<DomHost>,
    root: Option<Element>,
    preset: MotionPreset,
    duration_ms: u32,
}

impl Slot {
    fn children(&self, child_count: usize, now_ms: f64) -> Vec<ChildFrame> {
        self.controller
            .child_frames(child_count, now_ms, self.preset, self.duration_ms)
    }
}

#[derive(Default)]
struct Registry {
    host: DomHost,
    slots: HandleTable<Slot>,
}

thread_local! {
    static REGISTRY: RefCell<Option<Registry>> = const { RefCell::new(None) };
}

fn with_registry<R>(f: impl FnOnce(&mut Registry) -> R) -> R {
    REGISTRY.with(|cell| {
        let mut registry = cell.borrow_mut();
        f(registry.get_or_insert_with(Registry::default))
    })
}

fn with_slot<R>(handle: usize, f: impl FnOnce(&mut Slot) -> R) -> Result<R, JsError> {
    with_registry(|registry| {
        let slot = registry
            .slots
            .get_mut(handle)
            .ok_or_else(|| JsError::new("invalid section handle"))?;
        Ok(f(slot))
    })
}

fn js_err(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// Create a section controller from a JSON `RevealConfig` (empty string for
/// the defaults). Returns a handle for later calls.
#[wasm_bindgen]
pub fn create_section(config_json: &str) -> Result<usize, JsError> {
    let config: RevealConfig = if config_json.trim().is_empty() {
        RevealConfig::default()
    } else {
        serde_json::from_str(config_json).map_err(js_err)?
    };
    let options = config.controller_options().map_err(js_err)?;

    Ok(with_registry(|registry| {
        let slot = Slot {
            controller: SectionAnimationController::new(registry.host.clone(), options),
            root: None,
            preset: config.preset,
            duration_ms: config.duration_ms,
        };
        registry.slots.insert(slot)
    }))
}

/// Observe `root` for the section. Returns the observer status as JSON
/// (`"observing"`, `"pending"`, `"unsupported"`).
#[wasm_bindgen]
pub fn bind_section(handle: usize, root: Element) -> Result<String, JsError> {
    let status = with_slot(handle, |slot| {
        let status = slot.controller.bind_root(&root);
        slot.root = Some(root);
        status
    })?;
    serde_json::to_string(&status).map_err(js_err)
}

/// Release the section's observer and free its handle for reuse.
#[wasm_bindgen]
pub fn destroy_section(handle: usize) -> Result<(), JsError> {
    // Dropping the controller detaches its watch.
    with_registry(|registry| registry.slots.remove(handle))
        .map(drop)
        .ok_or_else(|| JsError::new("invalid section handle"))
}

/// Deliver queued intersection entries to their sections. Call once per
/// animation frame. Returns the number of visibility transitions.
#[wasm_bindgen]
pub fn pump() -> usize {
    with_registry(|registry| {
        let entries = registry.host.drain();
        let mut controllers: Vec<_> = registry
            .slots
            .values_mut()
            .map(|slot| &mut slot.controller)
            .collect();
        route(&mut controllers, entries)
    })
}

#[wasm_bindgen]
pub fn section_visible(handle: usize) -> Result<bool, JsError> {
    with_slot(handle, |slot| slot.controller.visible())
}

/// Per-child reveal state for `child_count` children, as a JSON array.
#[wasm_bindgen]
pub fn section_reveals(handle: usize, child_count: usize, now_ms: f64) -> Result<String, JsError> {
    let children = with_slot(handle, |slot| slot.children(child_count, now_ms))?;
    serde_json::to_string(&children).map_err(js_err)
}

/// Write the reveal style onto each element child of the bound root.
/// Returns how many children were styled.
#[wasm_bindgen]
pub fn apply_styles(handle: usize, now_ms: f64) -> Result<usize, JsError> {
    with_slot(handle, |slot| {
        let Some(root) = slot.root.as_ref() else {
            return Ok(0);
        };
        let elements = root.children();
        let frames = slot.children(elements.length() as usize, now_ms);
        let mut styled = 0;
        for frame in &frames {
            let Some(child) = elements
                .item(frame.index as u32)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            else {
                continue;
            };
            let style = child.style();
            for (name, value) in frame.style.declarations() {
                style
                    .set_property(name, &value)
                    .map_err(|_| JsError::new("could not set style property"))?;
            }
            styled += 1;
        }
        Ok(styled)
    })?
}

/// Entrance delay for the child at `index`.
#[wasm_bindgen]
pub fn delay_for(index: usize, step_ms: u32, base_ms: u32) -> u32 {
    reveal_core::delay_for(index, step_ms, base_ms)
}

/// Parse a CSS root margin and return its four-value form.
#[wasm_bindgen]
pub fn parse_root_margin(value: &str) -> Result<String, JsError> {
    let margin: RootMargin = value.parse().map_err(js_err)?;
    Ok(margin.to_string())
}
