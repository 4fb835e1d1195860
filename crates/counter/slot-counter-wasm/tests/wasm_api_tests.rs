#![cfg(target_arch = "wasm32")]
use js_sys::Function;
use serde_json::json;
use serde_wasm_bindgen as swb;
use slot_counter_wasm::{abi_version, SlotCounter};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn measure() -> Function {
    Function::new_with_args("slot, kind, text", "return kind === 'height' ? 20 : (text === '8' ? 12 : 9);")
}

#[wasm_bindgen_test]
fn abi_is_1() {
    assert_eq!(abi_version(), 1);
}

#[wasm_bindgen_test]
fn construct_with_defaults() {
    assert!(SlotCounter::new("42".into(), JsValue::UNDEFINED).is_ok());
}

#[wasm_bindgen_test]
fn invalid_config_is_rejected() {
    let cfg = swb::to_value(&json!({ "duration": -2.0 })).unwrap();
    assert!(SlotCounter::new("1".into(), cfg).is_err());
}

#[wasm_bindgen_test]
fn transitions_and_settles() {
    let cfg = swb::to_value(&json!({ "use_monospace_width": true })).unwrap();
    let mut counter = SlotCounter::new("321".into(), cfg).unwrap();
    let f = measure();
    counter.tick(0.016, f.clone()).unwrap();
    counter.set_value("123".into());
    for _ in 0..200 {
        counter.tick(0.016, f.clone()).unwrap();
    }
    assert_eq!(counter.displayed_text(), "123");
    assert!(counter.is_settled());

    let view: serde_json::Value = swb::from_value(counter.view().unwrap()).unwrap();
    assert_eq!(view["slots"][0]["width"].as_f64(), Some(12.0));
    assert_eq!(view["slots"][0]["height"].as_f64(), Some(20.0));
}
