/// Popup UI for Link Sorter

use std::cell::RefCell;
use std::rc::Rc;

use patternfly_yew::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::functional::UseForceUpdateHandle;
use yew::prelude::*;

use crate::collection::AddOutcome;
use crate::session::Session;
use crate::storage::{ExportOptions, KeyValueStore, LocalStore, MemoryStore};

type PopupSession = Session<Box<dyn KeyValueStore>>;

#[derive(Clone, PartialEq)]
enum Notice {
    Info(String),
    Error(String),
}

struct PopupState {
    session: PopupSession,
    storage_warning: Option<String>,
}

/// Open the session on localStorage, or on a throwaway store if the browser refuses
fn open_session() -> PopupState {
    match LocalStore::open() {
        Ok(store) => PopupState {
            session: Session::load(Box::new(store) as Box<dyn KeyValueStore>),
            storage_warning: None,
        },
        Err(e) => {
            log::warn!("localStorage unavailable, links will not persist: {}", e);
            PopupState {
                session: Session::load(Box::new(MemoryStore::new()) as Box<dyn KeyValueStore>),
                storage_warning: Some(format!("Links will not be kept after closing: {}", e)),
            }
        }
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_mut_ref(open_session);
    let notice = use_state(|| None::<Notice>);
    let highlight = use_state(|| None::<String>);
    let new_title = use_state(String::new);
    let new_url = use_state(String::new);
    let new_category = use_state(String::new);
    let undo_timer = use_mut_ref(|| None::<i32>);
    let refresh = use_force_update();

    // Add link handler
    let on_add = {
        let state = state.clone();
        let notice = notice.clone();
        let highlight = highlight.clone();
        let new_title = new_title.clone();
        let new_url = new_url.clone();
        let refresh = refresh.clone();

        Callback::from(move |_: MouseEvent| {
            let url = new_url.trim().to_string();
            if url.is_empty() {
                return;
            }
            let title = match new_title.trim() {
                "" => url.clone(),
                title => title.to_string(),
            };

            let outcome = state.borrow_mut().session.add_or_touch(&title, &url);
            match outcome {
                AddOutcome::Added => {
                    highlight.set(Some(url));
                    notice.set(None);
                }
                AddOutcome::AlreadyPresent => {
                    notice.set(Some(Notice::Info("Already saved".to_string())));
                }
            }
            new_title.set(String::new());
            new_url.set(String::new());
            refresh.force_update();
        })
    };

    let on_title_input = {
        let new_title = new_title.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            new_title.set(input.value());
        })
    };

    let on_url_input = {
        let new_url = new_url.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            new_url.set(input.value());
        })
    };

    // Open link handler (marks it visited)
    let on_open = {
        let state = state.clone();
        let refresh = refresh.clone();
        move |url: String| {
            let state = state.clone();
            let refresh = refresh.clone();
            Callback::from(move |_: MouseEvent| {
                state.borrow_mut().session.mark_visited(&url);
                if let Some(window) = web_sys::window() {
                    if let Err(e) = window.open_with_url_and_target(&url, "_blank") {
                        log::warn!("Failed to open {}: {:?}", url, e);
                    }
                }
                refresh.force_update();
            })
        }
    };

    // Delete link handler
    let on_delete = {
        let state = state.clone();
        let undo_timer = undo_timer.clone();
        let refresh = refresh.clone();
        move |url: String| {
            let state = state.clone();
            let undo_timer = undo_timer.clone();
            let refresh = refresh.clone();
            Callback::from(move |_: MouseEvent| {
                let removed = state.borrow_mut().session.remove(&url, js_sys::Date::now());
                if removed {
                    let window_ms = state.borrow().session.settings().undo_window_ms;
                    arm_undo_timer(state.clone(), undo_timer.clone(), refresh.clone(), window_ms);
                    refresh.force_update();
                }
            })
        }
    };

    // Undo handler
    let on_undo = {
        let state = state.clone();
        let undo_timer = undo_timer.clone();
        let refresh = refresh.clone();
        Callback::from(move |_: MouseEvent| {
            cancel_undo_timer(&undo_timer);
            state.borrow_mut().session.undo(js_sys::Date::now());
            refresh.force_update();
        })
    };

    // Category change handler
    let on_category_change = {
        let state = state.clone();
        let refresh = refresh.clone();
        move |url: String| {
            let state = state.clone();
            let refresh = refresh.clone();
            Callback::from(move |e: Event| {
                let select: HtmlSelectElement = e.target_unchecked_into();
                state.borrow_mut().session.reassign_category(&url, &select.value());
                refresh.force_update();
            })
        }
    };

    let on_category_input = {
        let new_category = new_category.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            new_category.set(input.value());
        })
    };

    let on_add_category = {
        let state = state.clone();
        let new_category = new_category.clone();
        let notice = notice.clone();
        let refresh = refresh.clone();
        Callback::from(move |_: MouseEvent| {
            if state.borrow_mut().session.add_user_category(&new_category) {
                new_category.set(String::new());
                refresh.force_update();
            } else {
                notice.set(Some(Notice::Info(format!(
                    "\"{}\" is blank or already a category",
                    new_category.trim()
                ))));
            }
        })
    };

    let on_delete_category = {
        let state = state.clone();
        let refresh = refresh.clone();
        move |name: String| {
            let state = state.clone();
            let refresh = refresh.clone();
            Callback::from(move |_: MouseEvent| {
                state.borrow_mut().session.delete_user_category(&name);
                refresh.force_update();
            })
        }
    };

    let on_forget_keyword = {
        let state = state.clone();
        let refresh = refresh.clone();
        move |keyword: String| {
            let state = state.clone();
            let refresh = refresh.clone();
            Callback::from(move |_: MouseEvent| {
                state.borrow_mut().session.forget_keyword(&keyword);
                refresh.force_update();
            })
        }
    };

    // Export everything
    let on_export = {
        let state = state.clone();
        let notice = notice.clone();
        Callback::from(move |_: MouseEvent| {
            let exported = state.borrow().session.export(ExportOptions::default());
            let result = exported.map_err(|e| e.to_string()).and_then(|json| {
                let filename = format!("link-sorter-export-{}.json", js_sys::Date::now() as i64);
                download_json(&json, &filename).map_err(|e| format!("{:?}", e))
            });
            if let Err(e) = result {
                log::error!("Export failed: {}", e);
                notice.set(Some(Notice::Error(format!("Export failed: {}", e))));
            }
        })
    };

    // Import from a previously exported file
    let on_import = {
        let state = state.clone();
        let notice = notice.clone();
        let undo_timer = undo_timer.clone();
        let refresh = refresh.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                return;
            };
            input.set_value("");

            let state = state.clone();
            let notice = notice.clone();
            let undo_timer = undo_timer.clone();
            let refresh = refresh.clone();
            spawn_local(async move {
                let imported = match read_file(file).await {
                    Ok(text) => state.borrow_mut().session.import(&text).map_err(|e| e.to_string()),
                    Err(e) => Err(e),
                };
                match imported {
                    Ok(keys) => {
                        cancel_undo_timer(&undo_timer);
                        notice.set(Some(Notice::Info(format!("Imported {}", keys.join(", ")))));
                    }
                    Err(e) => {
                        log::error!("Import failed: {}", e);
                        notice.set(Some(Notice::Error(format!("Import failed: {}", e))));
                    }
                }
                refresh.force_update();
            });
        })
    };

    let now = js_sys::Date::now();
    let (storage_warning, links, categories, user_categories, keywords, pending_title) = {
        let state = state.borrow();
        let session = &state.session;
        (
            state.storage_warning.clone(),
            session.links().links().to_vec(),
            session.categories().all(),
            session.categories().user().to_vec(),
            session
                .keywords()
                .iter()
                .map(|(k, c)| (k.to_string(), c.to_string()))
                .collect::<Vec<_>>(),
            session.pending_undo(now).map(|slot| slot.record.title.clone()),
        )
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Link Sorter"}</h1>

            if let Some(warning) = storage_warning {
                <Alert r#type={AlertType::Warning} title={warning} inline={true}>
                </Alert>
            }

            {match &*notice {
                Some(Notice::Info(msg)) => html! {
                    <Alert r#type={AlertType::Info} title={msg.clone()} inline={true}></Alert>
                },
                Some(Notice::Error(msg)) => html! {
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {msg.clone()}
                    </Alert>
                },
                None => html! {}
            }}

            if let Some(title) = pending_title {
                <div class="undo-bar">
                    <span class="message-text">{format!("Deleted \"{}\"", title)}</span>
                    <Button onclick={on_undo} variant={ButtonVariant::Link}>{"Undo"}</Button>
                </div>
            }

            <div class="flex-column-gap">
                <input class="pf-v5-c-form-control" placeholder="Title"
                    value={(*new_title).clone()} oninput={on_title_input} />
                <input class="pf-v5-c-form-control" placeholder="https://..."
                    value={(*new_url).clone()} oninput={on_url_input} />
                <Button onclick={on_add} variant={ButtonVariant::Primary} block={true}>
                    {"Save Link"}
                </Button>
            </div>

            <ul class="link-list">
                {for links.iter().map(|link| {
                    let mut options = categories.clone();
                    if !options.contains(&link.category) {
                        options.push(link.category.clone());
                    }
                    let is_new = highlight.as_deref() == Some(link.url.as_str());
                    let class = classes!(
                        "link-item",
                        is_new.then_some("link-new"),
                        link.visited.then_some("link-visited"),
                    );

                    html! {
                        <li class={class} key={link.url.clone()}>
                            <a class="link-title" onclick={on_open(link.url.clone())}>
                                {&link.title}
                            </a>
                            <select onchange={on_category_change(link.url.clone())}>
                                {for options.iter().map(|c| html! {
                                    <option value={c.clone()} selected={*c == link.category}>
                                        {c}
                                    </option>
                                })}
                            </select>
                            <Button onclick={on_delete(link.url.clone())} variant={ButtonVariant::Plain}>
                                {"✕"}
                            </Button>
                        </li>
                    }
                })}
            </ul>

            <div class="stats-container">
                <h2 class="stats-title">{"Categories"}</h2>
                <div class="flex-row-gap">
                    <input class="pf-v5-c-form-control" placeholder="New category"
                        value={(*new_category).clone()} oninput={on_category_input} />
                    <Button onclick={on_add_category} variant={ButtonVariant::Secondary}>{"Add"}</Button>
                </div>
                {for user_categories.iter().map(|name| html! {
                    <div class="stat-item">
                        <span class="stat-domain">{name}</span>
                        <Button onclick={on_delete_category(name.clone())} variant={ButtonVariant::Plain}>
                            {"✕"}
                        </Button>
                    </div>
                })}
            </div>

            if !keywords.is_empty() {
                <div class="stats-container">
                    <h2 class="stats-title">{"Learned Keywords"}</h2>
                    <div class="stats-box">
                        {for keywords.iter().map(|(keyword, category)| html! {
                            <div class="stat-item">
                                <span class="stat-domain">{keyword}</span>
                                <span class="stat-count">{category}</span>
                                <Button onclick={on_forget_keyword(keyword.clone())} variant={ButtonVariant::Plain}>
                                    {"✕"}
                                </Button>
                            </div>
                        })}
                    </div>
                </div>
            }

            <div class="flex-row-gap">
                <Button onclick={on_export} variant={ButtonVariant::Secondary}>{"Export"}</Button>
                <label class="pf-v5-c-button pf-m-secondary">
                    {"Import"}
                    <input type="file" accept="application/json" hidden={true} onchange={on_import} />
                </label>
            </div>

            <p class="footer-popup">
                {"Link Sorter v0.1.0"}
            </p>
        </div>
    }
}

// Helper functions

/// Schedule the undo slot to be cleared once its window passes, replacing any earlier timer
fn arm_undo_timer(
    state: Rc<RefCell<PopupState>>,
    undo_timer: Rc<RefCell<Option<i32>>>,
    refresh: UseForceUpdateHandle,
    window_ms: f64,
) {
    cancel_undo_timer(&undo_timer);
    let Some(window) = web_sys::window() else {
        return;
    };

    let timer = undo_timer.clone();
    let expire = Closure::once_into_js(move || {
        timer.borrow_mut().take();
        if state.borrow_mut().session.expire_undo(js_sys::Date::now()) {
            refresh.force_update();
        }
    });

    // One past the deadline so expire_undo sees it as passed
    let delay = window_ms.ceil() as i32 + 1;
    match window.set_timeout_with_callback_and_timeout_and_arguments_0(expire.unchecked_ref(), delay) {
        Ok(handle) => *undo_timer.borrow_mut() = Some(handle),
        Err(e) => log::warn!("Failed to schedule undo expiry: {:?}", e),
    }
}

fn cancel_undo_timer(undo_timer: &Rc<RefCell<Option<i32>>>) {
    if let Some(handle) = undo_timer.borrow_mut().take() {
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(handle);
        }
    }
}

async fn read_file(file: web_sys::File) -> Result<String, String> {
    let text = JsFuture::from(file.text())
        .await
        .map_err(|e| format!("Failed to read file: {:?}", e))?;

    text.as_string()
        .ok_or_else(|| "File is not text".to_string())
}

fn download_json(json: &str, filename: &str) -> Result<(), JsValue> {
    let parts = js_sys::Array::of1(&JsValue::from_str(json));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type("application/json");
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let href = web_sys::Url::create_object_url_with_blob(&blob)?;

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let anchor: web_sys::HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&href);
    anchor.set_download(filename);
    anchor.click();

    web_sys::Url::revoke_object_url(&href)
}
