//! devbar background service worker.
//!
//! Binds the `chrome.*` extension APIs and answers popup requests with the
//! shared `devbar-protocol` types. Tab and icon plumbing lives here; all
//! URL rewriting is delegated to the protocol crate so the WASM shell stays
//! a thin adapter.

use js_sys::{Array, Function, Object, Promise, Reflect};
use serde_json::json;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use devbar_protocol::predicates;
use devbar_protocol::settings::SETTINGS_STORAGE_KEY;
use devbar_protocol::{
    ContentRequest, DevSettings, QueryTransform, SettingsScope, UtilsRequest, UtilsResponse,
    mobile_view_enabled,
};

const POLL_INTERVAL_MS: i32 = 100;
const PRIVILEGED_SCHEME_PREFIX: &str = "chrome";
const LOGIN_URL: &str = "https://users.wix.com/wix-users/login/form";
const EDITOR_BASE_URL: &str = "http://editor.wix.com/html/editor/web/renderer/edit/";
const OPTIONS_PAGE: &str = "options.html";

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    // Repaint the toolbar icon whenever the active tab changes or loads.
    {
        let on_activated = Closure::<dyn FnMut(JsValue)>::new(|_: JsValue| {
            wasm_bindgen_futures::spawn_local(async {
                let _ = refresh_action_icon().await;
            });
        });
        tabs_on_activated_add_listener(&on_activated);
        on_activated.forget();
    }
    {
        let on_updated = Closure::<dyn FnMut(JsValue, JsValue, JsValue)>::new(
            |_: JsValue, _: JsValue, _: JsValue| {
                wasm_bindgen_futures::spawn_local(async {
                    let _ = refresh_action_icon().await;
                });
            },
        );
        tabs_on_updated_add_listener(&on_updated);
        on_updated.forget();
    }

    // Answer popup and options-page requests. Returning true keeps the
    // message channel open for the asynchronous reply.
    {
        let on_message = Closure::<dyn FnMut(JsValue, JsValue, Function) -> JsValue>::new(
            |message: JsValue, _sender: JsValue, send_response: Function| {
                match serde_wasm_bindgen::from_value::<UtilsRequest>(message) {
                    Ok(request) => {
                        wasm_bindgen_futures::spawn_local(async move {
                            let response = handle_request(request).await;
                            let payload =
                                serde_wasm_bindgen::to_value(&response).unwrap_or(JsValue::NULL);
                            let _ = send_response.call1(&JsValue::NULL, &payload);
                        });
                        JsValue::TRUE
                    }
                    Err(_) => JsValue::FALSE,
                }
            },
        );
        runtime_on_message_add_listener(&on_message);
        on_message.forget();
    }

    wasm_bindgen_futures::spawn_local(async {
        let _ = refresh_action_icon().await;
    });
}

async fn handle_request(request: UtilsRequest) -> UtilsResponse {
    match run_request(request).await {
        Ok(response) => response,
        Err(err) => UtilsResponse::Error {
            message: stringify_js_error(err),
        },
    }
}

async fn run_request(request: UtilsRequest) -> Result<UtilsResponse, JsValue> {
    Ok(match request {
        UtilsRequest::ApplySettings { option } => {
            apply_settings(&option).await?;
            UtilsResponse::Ack
        }
        UtilsRequest::LogBackIn => {
            let props = Object::new();
            Reflect::set(
                &props,
                &JsValue::from_str("url"),
                &JsValue::from_str(LOGIN_URL),
            )?;
            JsFuture::from(tabs_create(&props)).await?;
            UtilsResponse::Ack
        }
        UtilsRequest::GetCurrentUsername => {
            let (id, _) = active_tab().await?;
            let payload = serde_wasm_bindgen::to_value(&ContentRequest::GetCurrentUsername)?;
            let reply = JsFuture::from(tabs_send_message(id, &payload)).await.ok();
            UtilsResponse::Username {
                value: reply.and_then(|value| value.as_string()),
            }
        }
        UtilsRequest::IsViewer => UtilsResponse::Flag {
            value: page_has_meta(predicates::VIEWER_META).await?,
        },
        UtilsRequest::IsEditor => UtilsResponse::Flag {
            value: page_has_meta(predicates::EDITOR_META).await?,
        },
        UtilsRequest::IsMobileView => {
            let (_, url) = active_tab().await?;
            UtilsResponse::Flag {
                value: mobile_view_enabled(&url),
            }
        }
        UtilsRequest::SetMobileView { enabled } => {
            rewrite_active_tab(QueryTransform::ToggleMobileView { enabled }).await?;
            UtilsResponse::Ack
        }
        UtilsRequest::AddExperiment { name } => {
            rewrite_active_tab(QueryTransform::AppendExperiment { name }).await?;
            UtilsResponse::Ack
        }
        UtilsRequest::DebugPackage { package, .. } => {
            rewrite_active_tab(QueryTransform::AppendDebugPackage { package }).await?;
            UtilsResponse::Ack
        }
        UtilsRequest::DebugAll => {
            rewrite_active_tab(QueryTransform::SetDebugAll).await?;
            UtilsResponse::Ack
        }
        UtilsRequest::OpenOptionsPage => {
            open_options_page().await?;
            UtilsResponse::Ack
        }
        UtilsRequest::OpenEditor => {
            open_editor().await?;
            UtilsResponse::Ack
        }
    })
}

/// Resolves the active tab, polling until the host reports one.
async fn active_tab() -> Result<(i32, String), JsValue> {
    loop {
        let query = serde_wasm_bindgen::to_value(&json!({"active": true, "currentWindow": true}))?;
        let tabs_val = JsFuture::from(tabs_query(&query)).await?;
        let tabs = Array::from(&tabs_val);
        if tabs.length() > 0 {
            let tab = tabs.get(0);
            let id = Reflect::get(&tab, &JsValue::from_str("id"))?
                .as_f64()
                .ok_or("no tab id")? as i32;
            let url = Reflect::get(&tab, &JsValue::from_str("url"))?
                .as_string()
                .unwrap_or_default();
            return Ok((id, url));
        }
        sleep_ms(POLL_INTERVAL_MS).await;
    }
}

async fn rewrite_active_tab(transform: QueryTransform) -> Result<(), JsValue> {
    let (id, url) = active_tab().await?;
    let rewritten = transform
        .apply(&url)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    if rewritten == url {
        return Ok(());
    }
    navigate_tab(id, &rewritten).await
}

async fn apply_settings(option: &str) -> Result<(), JsValue> {
    let scope = SettingsScope::parse(option)
        .ok_or_else(|| JsValue::from_str(&format!("unknown settings option '{option}'")))?;
    let settings = load_settings().await?;
    let (id, url) = active_tab().await?;
    let rewritten = settings
        .apply_to_url(&url, scope)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    if rewritten == url {
        return Ok(());
    }
    navigate_tab(id, &rewritten).await
}

async fn load_settings() -> Result<DevSettings, JsValue> {
    let items = JsFuture::from(storage_local_get(SETTINGS_STORAGE_KEY)).await?;
    let stored = Reflect::get(&items, &JsValue::from_str(SETTINGS_STORAGE_KEY))?;
    if stored.is_undefined() || stored.is_null() {
        return Ok(DevSettings::default());
    }
    serde_wasm_bindgen::from_value(stored).map_err(JsValue::from)
}

async fn navigate_tab(tab_id: i32, url: &str) -> Result<(), JsValue> {
    let props = Object::new();
    Reflect::set(&props, &JsValue::from_str("url"), &JsValue::from_str(url))?;
    JsFuture::from(tabs_update(tab_id, &props)).await?;
    Ok(())
}

async fn select_tab(tab_id: i32) -> Result<(), JsValue> {
    let props = Object::new();
    Reflect::set(&props, &JsValue::from_str("selected"), &JsValue::TRUE)?;
    JsFuture::from(tabs_update(tab_id, &props)).await?;
    Ok(())
}

/// Evaluates `code` in the active tab's document, `None` on privileged
/// pages or when the page produced no result.
async fn execute_in_active_tab(code: &str) -> Result<Option<JsValue>, JsValue> {
    let (id, url) = active_tab().await?;
    if url.starts_with(PRIVILEGED_SCHEME_PREFIX) {
        return Ok(None);
    }
    let details = Object::new();
    Reflect::set(&details, &JsValue::from_str("code"), &JsValue::from_str(code))?;
    // Pages that refuse injection reject the call; that reads as no result.
    let Ok(results) = JsFuture::from(tabs_execute_script(id, &details)).await else {
        return Ok(None);
    };
    let array = Array::from(&results);
    if array.length() == 0 {
        return Ok(None);
    }
    Ok(Some(array.get(0)))
}

async fn page_has_meta(http_equiv: &str) -> Result<bool, JsValue> {
    let result = execute_in_active_tab(&predicates::has_meta_js(http_equiv)).await?;
    Ok(result.and_then(|value| value.as_bool()).unwrap_or(false))
}

async fn page_meta_content(http_equiv: &str) -> Result<Option<String>, JsValue> {
    let result = execute_in_active_tab(&predicates::meta_content_js(http_equiv)).await?;
    Ok(result.and_then(|value| value.as_string()))
}

async fn refresh_action_icon() -> Result<(), JsValue> {
    let editor = page_has_meta(predicates::EDITOR_META).await.unwrap_or(false);
    let viewer = page_has_meta(predicates::VIEWER_META).await.unwrap_or(false);
    let suffix = if editor || viewer { "" } else { "-disabled" };

    let path = Object::new();
    for size in [19, 38] {
        Reflect::set(
            &path,
            &JsValue::from_str(&size.to_string()),
            &JsValue::from_str(&format!("assets/images/icon-{size}{suffix}.png")),
        )?;
    }
    let details = Object::new();
    Reflect::set(&details, &JsValue::from_str("path"), &path)?;
    JsFuture::from(action_set_icon(&details)).await?;
    Ok(())
}

async fn open_options_page() -> Result<(), JsValue> {
    let url = runtime_get_url(OPTIONS_PAGE);
    let query = serde_wasm_bindgen::to_value(&json!({"url": url, "currentWindow": true}))?;
    let tabs_val = JsFuture::from(tabs_query(&query)).await?;
    let tabs = Array::from(&tabs_val);
    if tabs.length() > 0 {
        let id = Reflect::get(&tabs.get(0), &JsValue::from_str("id"))?
            .as_f64()
            .ok_or("no tab id")? as i32;
        return select_tab(id).await;
    }
    let props = Object::new();
    Reflect::set(&props, &JsValue::from_str("url"), &JsValue::from_str(&url))?;
    JsFuture::from(tabs_create(&props)).await?;
    Ok(())
}

async fn open_editor() -> Result<(), JsValue> {
    let meta_site_id = page_meta_content(predicates::META_SITE_ID_META).await?;
    let Some(site_id) = page_meta_content(predicates::APP_INSTANCE_ID_META).await? else {
        return Ok(());
    };

    let base = format!("{EDITOR_BASE_URL}{site_id}");
    let query = serde_wasm_bindgen::to_value(&json!({"currentWindow": true}))?;
    let tabs_val = JsFuture::from(tabs_query(&query)).await?;
    let tabs = Array::from(&tabs_val);
    for i in 0..tabs.length() {
        let tab = tabs.get(i);
        let url = Reflect::get(&tab, &JsValue::from_str("url"))?
            .as_string()
            .unwrap_or_default();
        if url.starts_with(&base) {
            let id = Reflect::get(&tab, &JsValue::from_str("id"))?
                .as_f64()
                .ok_or("no tab id")? as i32;
            return select_tab(id).await;
        }
    }

    let mut url = base;
    if let Some(meta_site_id) = meta_site_id {
        url = format!("{url}?metaSiteId={meta_site_id}");
    }
    let settings = load_settings().await?;
    let url = settings
        .apply_to_url(&url, SettingsScope::All)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let props = Object::new();
    Reflect::set(&props, &JsValue::from_str("url"), &JsValue::from_str(&url))?;
    JsFuture::from(tabs_create(&props)).await?;
    Ok(())
}

async fn sleep_ms(ms: i32) {
    let promise = Promise::new(&mut |resolve, _reject| {
        set_timeout(&resolve, ms);
    });
    let _ = JsFuture::from(promise).await;
}

fn stringify_js_error(err: JsValue) -> String {
    err.as_string()
        .or_else(|| js_sys::JSON::stringify(&err).ok()?.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = query)]
    fn tabs_query(query: &JsValue) -> Promise;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = update)]
    fn tabs_update(tab_id: i32, props: &JsValue) -> Promise;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = create)]
    fn tabs_create(props: &JsValue) -> Promise;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = sendMessage)]
    fn tabs_send_message(tab_id: i32, message: &JsValue) -> Promise;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = executeScript)]
    fn tabs_execute_script(tab_id: i32, details: &JsValue) -> Promise;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs", "onActivated"], js_name = addListener)]
    fn tabs_on_activated_add_listener(cb: &Closure<dyn FnMut(JsValue)>);

    #[wasm_bindgen(js_namespace = ["chrome", "tabs", "onUpdated"], js_name = addListener)]
    fn tabs_on_updated_add_listener(cb: &Closure<dyn FnMut(JsValue, JsValue, JsValue)>);

    #[wasm_bindgen(js_namespace = ["chrome", "action"], js_name = setIcon)]
    fn action_set_icon(details: &JsValue) -> Promise;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime"], js_name = getURL)]
    fn runtime_get_url(path: &str) -> String;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    fn runtime_on_message_add_listener(
        cb: &Closure<dyn FnMut(JsValue, JsValue, Function) -> JsValue>,
    );

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = get)]
    fn storage_local_get(key: &str) -> Promise;

    #[wasm_bindgen(js_name = setTimeout)]
    fn set_timeout(handler: &Function, timeout: i32) -> i32;
}
