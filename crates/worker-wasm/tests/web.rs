//! Browser tests for the JavaScript bindings. Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use rsvp_core::PairedText;
use rsvp_wasm::{interval_ms, pair_words};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn js_words(words: &[&str]) -> JsValue {
    serde_wasm_bindgen::to_value(words).unwrap()
}

#[wasm_bindgen_test]
fn test_interval_ms_clamps() {
    assert_eq!(interval_ms(300), 200);
    assert_eq!(interval_ms(0), 1000);
}

#[wasm_bindgen_test]
fn test_pair_words_two_scripts() {
    let value = pair_words(js_words(&["cat", "猫", "dog", "狗"])).unwrap();

    let paired: Option<PairedText> = serde_wasm_bindgen::from_value(value).unwrap();
    let paired = paired.unwrap();
    assert_eq!(paired.primary_stream(), vec!["cat", "dog"]);
    assert_eq!(paired.secondary_stream(), vec!["猫", "狗"]);
}

#[wasm_bindgen_test]
fn test_pair_words_single_script_is_empty() {
    let value = pair_words(js_words(&["just", "english"])).unwrap();
    let paired: Option<PairedText> = serde_wasm_bindgen::from_value(value).unwrap();
    assert!(paired.is_none());
}

#[wasm_bindgen_test]
fn test_pair_words_rejects_non_array() {
    assert!(pair_words(JsValue::from_f64(3.0)).is_err());
}
