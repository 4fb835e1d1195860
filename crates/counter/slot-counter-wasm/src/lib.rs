use js_sys::Function;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use slot_counter_core::{Config, CounterOrchestrator, Frame, LayoutHost, ProbeId, SlotKey};

#[wasm_bindgen]
pub struct SlotCounter {
    core: CounterOrchestrator,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Layout host backed by a JS callback:
/// `measure(slotIndex: number, kind: "height" | "width", text?: string) -> number`.
/// Probes stay on the Rust side; the callback renders `text` off-screen and reports its width.
struct JsLayout {
    f: Function,
    probes: Vec<(ProbeId, SlotKey, String)>,
    next_probe: u32,
}

impl JsLayout {
    fn new(f: Function) -> Self {
        Self {
            f,
            probes: Vec::new(),
            next_probe: 0,
        }
    }

    fn call(&self, slot: SlotKey, kind: &str, text: Option<&str>) -> f32 {
        let slot_arg = JsValue::from_f64(slot.0 as f64);
        let kind_arg = JsValue::from_str(kind);
        let result = match text {
            Some(t) => {
                let text_arg = JsValue::from_str(t);
                self.f
                    .call3(&JsValue::UNDEFINED, &slot_arg, &kind_arg, &text_arg)
            }
            None => self.f.call2(&JsValue::UNDEFINED, &slot_arg, &kind_arg),
        };
        // A throwing or non-numeric callback reads as "not measurable yet".
        result.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
    }
}

impl LayoutHost for JsLayout {
    fn cell_height(&mut self, slot: SlotKey) -> f32 {
        self.call(slot, "height", None)
    }

    fn insert_probe(&mut self, slot: SlotKey, text: &str) -> ProbeId {
        let id = ProbeId(self.next_probe);
        self.next_probe = self.next_probe.wrapping_add(1);
        self.probes.push((id, slot, text.to_string()));
        id
    }

    fn probe_width(&mut self, probe: ProbeId) -> f32 {
        match self.probes.iter().find(|(id, _, _)| *id == probe) {
            Some((_, slot, text)) => self.call(*slot, "width", Some(text)),
            None => 0.0,
        }
    }

    fn remove_probe(&mut self, probe: ProbeId) {
        self.probes.retain(|(id, _, _)| *id != probe);
    }
}

#[wasm_bindgen]
impl SlotCounter {
    /// Create a counter showing `value`. Pass a JSON config object or undefined/null for defaults.
    /// Example:
    ///   new SlotCounter("123", { duration: 1.2, use_monospace_width: true })
    #[wasm_bindgen(constructor)]
    pub fn new(value: String, config: JsValue) -> Result<SlotCounter, JsError> {
        console_error_panic_hook::set_once();

        let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
            Config::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        cfg.validate().map_err(|e| JsError::new(&e.to_string()))?;

        Ok(SlotCounter {
            core: CounterOrchestrator::new(cfg, &value),
        })
    }

    /// Start a transition to `value`.
    #[wasm_bindgen(js_name = set_value)]
    pub fn set_value(&mut self, value: String) {
        self.core.set_value(&value);
    }

    /// Replay the transition into the current value.
    #[wasm_bindgen(js_name = start_animation)]
    pub fn start_animation(&mut self) {
        self.core.start_animation();
    }

    #[wasm_bindgen(js_name = set_active)]
    pub fn set_active(&mut self, active: bool) {
        self.core.set_active(active);
    }

    /// Run one paint frame of `dt` seconds. `measure` is the layout callback described on
    /// `JsLayout`. Returns the Frame (events) as a JS object.
    #[wasm_bindgen]
    pub fn tick(&mut self, dt: f32, measure: Function) -> Result<JsValue, JsError> {
        let mut layout = JsLayout::new(measure);
        let frame: &Frame = self.core.tick(dt, &mut layout);
        swb::to_value(frame).map_err(|e| JsError::new(&format!("frame error: {e}")))
    }

    /// Re-read all measurements after a font or layout change.
    #[wasm_bindgen]
    pub fn remeasure(&mut self, measure: Function) {
        let mut layout = JsLayout::new(measure);
        self.core.remeasure(&mut layout);
    }

    /// Current render tree (CounterView) as a JS object.
    #[wasm_bindgen]
    pub fn view(&self) -> Result<JsValue, JsError> {
        swb::to_value(&self.core.view()).map_err(|e| JsError::new(&format!("view error: {e}")))
    }

    #[wasm_bindgen(js_name = displayed_text)]
    pub fn displayed_text(&self) -> String {
        self.core.displayed_text()
    }

    #[wasm_bindgen(js_name = is_settled)]
    pub fn is_settled(&self) -> bool {
        self.core.is_settled()
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
