/// Link Sorter - save links into categories, learning keywords from corrections
/// Built with Rust + WASM + Yew

mod categorizer;
mod collection;
mod config;
mod domain;
mod error;
mod keywords;
mod learner;
mod link_data;
mod session;
mod storage;
pub mod ui;

pub use categorizer::Categorization;
pub use collection::{AddOutcome, LinkCollection, UndoSlot};
pub use config::Settings;
pub use error::{LinkError, Result};
pub use link_data::{CategorySet, KeywordMap, LinkRecord};
pub use session::Session;
pub use storage::{ExportOptions, KeyValueStore, LocalStore, MemoryStore};

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

/// Context-menu capture: saves the page as "Other" without classifying it.
/// Returns true if the link was new.
#[wasm_bindgen]
pub fn save_link(title: &str, url: &str) -> std::result::Result<bool, JsValue> {
    let store = LocalStore::open().map_err(|e| JsValue::from_str(&e.to_string()))?;
    let mut session = Session::load(store);
    Ok(session.save_unclassified(title, url) == AddOutcome::Added)
}

/// Best guess for a page, as `{ category, matched }`
#[wasm_bindgen]
pub fn categorize_link(title: &str, url: &str) -> std::result::Result<JsValue, JsValue> {
    let store = LocalStore::open().map_err(|e| JsValue::from_str(&e.to_string()))?;
    let result = categorizer::categorize(&store, title, url)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&result).map_err(Into::into)
}
