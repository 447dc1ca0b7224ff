/// Key-value persistence, plus JSON import/export of the persisted state

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use wasm_bindgen::JsValue;

use crate::error::{LinkError, Result};

pub const VISITED_URLS: &str = "visitedUrls";
pub const KEYWORD_TO_CATEGORY: &str = "keywordToCategory";
pub const USER_CATEGORIES: &str = "userCategories";
pub const SETTINGS: &str = "settings";

/// Named JSON values. Access is synchronous and not transactional.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;

    fn set(&mut self, key: &str, value: Value) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Read and deserialize `key`. Absent keys yield `Ok(None)`.
pub fn load<T, S>(store: &S, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key)? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

pub fn save<T, S>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let value = serde_json::to_value(value)?;
    store.set(key, value)
}

/// In-process store, used by tests and as a fallback when the browser denies storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            values: HashMap::new(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// `window.localStorage`, one JSON document per key
pub struct LocalStore {
    storage: web_sys::Storage,
}

impl LocalStore {
    pub fn open() -> Result<Self> {
        let window =
            web_sys::window().ok_or_else(|| LinkError::Persistence("no window".to_string()))?;

        let storage = window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| LinkError::Persistence("localStorage disabled".to_string()))?;

        Ok(LocalStore { storage })
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        match self.storage.get_item(key).map_err(js_error)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let text = serde_json::to_string(&value)?;
        self.storage.set_item(key, &text).map_err(js_error)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.storage.remove_item(key).map_err(js_error)
    }
}

fn js_error(e: JsValue) -> LinkError {
    LinkError::Persistence(format!("{:?}", e))
}

/// Which optional keys go into an export. `visitedUrls` always does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    pub user_categories: bool,
    pub keywords: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            user_categories: true,
            keywords: true,
        }
    }
}

/// Serialize the chosen keys into a pretty-printed JSON document
pub fn export_document<S>(store: &S, options: ExportOptions) -> Result<String>
where
    S: KeyValueStore + ?Sized,
{
    let mut document = Map::new();

    let links = store.get(VISITED_URLS)?.unwrap_or_else(|| Value::Array(Vec::new()));
    document.insert(VISITED_URLS.to_string(), links);

    let mut optional = Vec::new();
    if options.user_categories {
        optional.push(USER_CATEGORIES);
    }
    if options.keywords {
        optional.push(KEYWORD_TO_CATEGORY);
    }

    for key in optional {
        if let Some(value) = store.get(key)? {
            document.insert(key.to_string(), value);
        }
    }

    log::info!("Exporting {} keys", document.len());
    Ok(serde_json::to_string_pretty(&Value::Object(document))?)
}

/// Validate an exported document and write each top-level field under its own key
///
/// The document must be a JSON object whose `visitedUrls` is an array;
/// anything else is rejected before the store is touched. Returns the keys written.
pub fn import_document<S>(store: &mut S, json: &str) -> Result<Vec<String>>
where
    S: KeyValueStore + ?Sized,
{
    let document: Value = serde_json::from_str(json)
        .map_err(|e| LinkError::MalformedImport(format!("invalid JSON: {}", e)))?;

    let Value::Object(fields) = document else {
        return Err(LinkError::MalformedImport(
            "expected a JSON object".to_string(),
        ));
    };

    if !fields.get(VISITED_URLS).is_some_and(Value::is_array) {
        return Err(LinkError::MalformedImport(format!(
            "missing `{}` list",
            VISITED_URLS
        )));
    }

    let mut written = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        store.set(&key, value)?;
        written.push(key);
    }

    log::info!("Imported keys: {}", written.join(", "));
    Ok(written)
}

/// Store whose every call fails, for exercising the best-effort paths
#[cfg(test)]
pub(crate) struct FailingStore;

#[cfg(test)]
impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<Value>> {
        Err(LinkError::Persistence("store offline".to_string()))
    }

    fn set(&mut self, _key: &str, _value: Value) -> Result<()> {
        Err(LinkError::Persistence("quota exceeded".to_string()))
    }

    fn remove(&mut self, _key: &str) -> Result<()> {
        Err(LinkError::Persistence("store offline".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link_data::LinkRecord;
    use serde_json::json;

    fn create_test_link(url: &str) -> LinkRecord {
        LinkRecord::new(url.to_string(), "Title".to_string(), "Other".to_string())
    }

    #[test]
    fn test_memory_store_get_set_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", json!([1, 2])).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(json!([1, 2])));

        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_typed_load_and_save() {
        let mut store = MemoryStore::new();
        let links = vec![create_test_link("https://google.com")];

        save(&mut store, VISITED_URLS, &links).unwrap();
        let loaded: Option<Vec<LinkRecord>> = load(&store, VISITED_URLS).unwrap();

        assert_eq!(loaded, Some(links));
    }

    #[test]
    fn test_load_wrong_shape_is_error() {
        let mut store = MemoryStore::new();
        store.set(VISITED_URLS, json!("not a list")).unwrap();

        let loaded: Result<Option<Vec<LinkRecord>>> = load(&store, VISITED_URLS);
        assert!(matches!(loaded, Err(LinkError::Serialization(_))));
    }

    #[test]
    fn test_import_writes_every_field() {
        let mut store = MemoryStore::new();
        let doc = r#"{
            "visitedUrls": [{"url":"https://a.com","title":"A","category":"News"}],
            "userCategories": ["Hobbies"],
            "theme": "dark"
        }"#;

        let mut written = import_document(&mut store, doc).unwrap();
        written.sort();

        assert_eq!(written, vec!["theme", "userCategories", "visitedUrls"]);
        assert_eq!(store.get("theme").unwrap(), Some(json!("dark")));
        assert_eq!(store.get(USER_CATEGORIES).unwrap(), Some(json!(["Hobbies"])));
    }

    #[test]
    fn test_import_rejects_bad_json() {
        let mut store = MemoryStore::new();
        store.set(USER_CATEGORIES, json!(["Keep"])).unwrap();

        let result = import_document(&mut store, "{ not json");

        assert!(matches!(result, Err(LinkError::MalformedImport(_))));
        assert_eq!(store.get(USER_CATEGORIES).unwrap(), Some(json!(["Keep"])));
    }

    #[test]
    fn test_import_requires_visited_urls_list() {
        let mut store = MemoryStore::new();

        for doc in [
            r#"{"userCategories": ["Hobbies"]}"#,
            r#"{"visitedUrls": {"url": "https://a.com"}, "userCategories": ["Hobbies"]}"#,
            r#"[1, 2, 3]"#,
        ] {
            let result = import_document(&mut store, doc);
            assert!(matches!(result, Err(LinkError::MalformedImport(_))));
        }

        assert_eq!(store.get(USER_CATEGORIES).unwrap(), None);
    }

    #[test]
    fn test_export_selected_keys() {
        let mut store = MemoryStore::new();
        save(&mut store, VISITED_URLS, &vec![create_test_link("https://a.com")]).unwrap();
        store.set(USER_CATEGORIES, json!(["Hobbies"])).unwrap();
        store.set(KEYWORD_TO_CATEGORY, json!({"rust": "Work"})).unwrap();

        let options = ExportOptions {
            user_categories: true,
            keywords: false,
        };
        let json = export_document(&store, options).unwrap();
        let doc: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(doc[VISITED_URLS].as_array().map(Vec::len), Some(1));
        assert_eq!(doc[USER_CATEGORIES], json!(["Hobbies"]));
        assert!(doc.get(KEYWORD_TO_CATEGORY).is_none());
    }

    #[test]
    fn test_export_empty_store_has_empty_list() {
        let store = MemoryStore::new();
        let json = export_document(&store, ExportOptions::default()).unwrap();
        let doc: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(doc, json!({ "visitedUrls": [] }));
    }

    #[test]
    fn test_export_then_import_restores_state() {
        let mut source = MemoryStore::new();
        save(&mut source, VISITED_URLS, &vec![create_test_link("https://a.com")]).unwrap();
        source.set(KEYWORD_TO_CATEGORY, json!({"rust": "Work"})).unwrap();

        let json = export_document(&source, ExportOptions::default()).unwrap();
        let mut target = MemoryStore::new();
        import_document(&mut target, &json).unwrap();

        assert_eq!(target.get(VISITED_URLS).unwrap(), source.get(VISITED_URLS).unwrap());
        assert_eq!(
            target.get(KEYWORD_TO_CATEGORY).unwrap(),
            Some(json!({"rust": "Work"}))
        );
    }

    #[test]
    fn test_failing_store_surfaces_persistence_error() {
        let mut store = FailingStore;
        let result = save(&mut store, VISITED_URLS, &Vec::<LinkRecord>::new());
        assert!(matches!(result, Err(LinkError::Persistence(_))));
    }
}
