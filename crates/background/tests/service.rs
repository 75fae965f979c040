//! Operation-surface tests driven through the mock host browser.

use std::sync::Arc;
use std::sync::Once;

use devbar::service::{Background, EDITOR_BASE_URL, LOGIN_URL};
use devbar::{dispatch, predicates, settings};
use devbar_host::{HostBrowser, MockAction, MockBrowser, TabUpdate};
use devbar_protocol::{DebugSelector, DevSettings, UtilsRequest, UtilsResponse};
use serde_json::json;

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_test_writer()
            .compact()
            .try_init();
    });
}

fn background() -> (Arc<MockBrowser>, Background) {
    init_tracing();
    let mock = Arc::new(MockBrowser::new());
    let bg = Background::new(mock.clone());
    (mock, bg)
}

fn navigations(mock: &MockBrowser) -> Vec<String> {
    mock.actions()
        .into_iter()
        .filter_map(|action| match action {
            MockAction::UpdateTab {
                update: TabUpdate { url: Some(url), .. },
                ..
            } => Some(url),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn debug_package_appends_to_the_active_tab() {
    let (mock, bg) = background();
    mock.set_active_tab("https://editor.wix.com/html/editor/web/renderer/edit/123?debug=foo");

    bg.debug_package("santa", "bar").await.unwrap();

    assert_eq!(
        navigations(&mock),
        vec!["https://editor.wix.com/html/editor/web/renderer/edit/123?debug=foo,bar"]
    );
}

#[tokio::test]
async fn debug_package_already_present_does_not_navigate() {
    let (mock, bg) = background();
    mock.set_active_tab("https://x.com/page?debug=foo,bar");

    bg.debug_package("santa", "bar").await.unwrap();

    assert!(navigations(&mock).is_empty());
}

#[tokio::test]
async fn debug_all_is_absorbing() {
    let (mock, bg) = background();
    let id = mock.set_active_tab("https://x.com/page?a=1");

    bg.debug_all().await.unwrap();
    assert_eq!(mock.tab(id).unwrap().url, "https://x.com/page?a=1&debug=all");

    bg.debug_all().await.unwrap();
    bg.debug_package("santa", "foo").await.unwrap();
    assert_eq!(navigations(&mock).len(), 1);
}

#[tokio::test]
async fn add_experiment_does_not_deduplicate() {
    let (mock, bg) = background();
    let id = mock.set_active_tab("https://x.com/page");

    bg.add_experiment("NewNav").await.unwrap();
    bg.add_experiment("NewNav").await.unwrap();

    assert_eq!(
        mock.tab(id).unwrap().url,
        "https://x.com/page?experiments=NewNav,NewNav"
    );
}

#[tokio::test]
async fn mobile_view_round_trips_through_the_url() {
    let (mock, bg) = background();
    mock.set_active_tab("https://x.com/site?a=1");

    assert!(!bg.is_mobile_view().await.unwrap());
    bg.set_mobile_view(true).await.unwrap();
    assert!(bg.is_mobile_view().await.unwrap());
    bg.set_mobile_view(false).await.unwrap();
    assert!(!bg.is_mobile_view().await.unwrap());
}

#[tokio::test]
async fn log_back_in_opens_the_login_form() {
    let (mock, bg) = background();
    mock.set_active_tab("https://x.com/page");

    bg.log_back_in().await.unwrap();

    assert_eq!(
        mock.actions(),
        vec![MockAction::CreateTab {
            url: LOGIN_URL.to_string()
        }]
    );
}

#[tokio::test]
async fn username_relay_uses_the_content_wire_shape() {
    let (mock, bg) = background();
    let id = mock.set_active_tab("https://x.com/page");
    mock.set_message_response(Some(json!("dev@wix.com")));

    let username = bg.get_current_username().await.unwrap();

    assert_eq!(username.as_deref(), Some("dev@wix.com"));
    assert_eq!(
        mock.actions(),
        vec![MockAction::SendMessage {
            id,
            payload: json!({"type": "getCurrentUsername"})
        }]
    );
}

#[tokio::test]
async fn silent_content_script_yields_no_username() {
    let (mock, bg) = background();
    mock.set_active_tab("https://x.com/page");

    assert_eq!(bg.get_current_username().await.unwrap(), None);
}

#[tokio::test]
async fn editor_predicate_reads_the_meta_tag() {
    let (mock, bg) = background();
    mock.set_active_tab("https://editor.wix.com/html/editor/web/renderer/edit/123");
    mock.set_script_result(&predicates::has_meta_js(predicates::EDITOR_META), json!(true));

    assert!(bg.is_editor().await.unwrap());
    assert!(!bg.is_viewer().await.unwrap());
}

#[tokio::test]
async fn privileged_pages_are_never_injected() {
    let (mock, bg) = background();
    mock.set_active_tab("chrome://extensions");

    assert!(!bg.is_editor().await.unwrap());
    assert!(!bg.is_viewer().await.unwrap());
    assert!(mock.actions().is_empty());
}

#[tokio::test]
async fn icon_refresh_disables_on_plain_pages_and_enables_on_viewer_pages() {
    let (mock, bg) = background();
    mock.set_active_tab("chrome://extensions");

    bg.refresh_action_icon().await.unwrap();
    let MockAction::SetIcon { icon } = mock.actions().pop().unwrap() else {
        panic!("expected a SetIcon action");
    };
    assert_eq!(icon.path[&19], "assets/images/icon-19-disabled.png");

    let (mock, bg) = background();
    mock.set_active_tab("https://mysite.wixsite.com/home");
    mock.set_script_result(&predicates::has_meta_js(predicates::VIEWER_META), json!(true));

    bg.refresh_action_icon().await.unwrap();
    let MockAction::SetIcon { icon } = mock.actions().pop().unwrap() else {
        panic!("expected a SetIcon action");
    };
    assert_eq!(icon.path[&38], "assets/images/icon-38.png");
}

#[tokio::test]
async fn open_options_page_opens_then_focuses() {
    let (mock, bg) = background();
    mock.set_active_tab("https://x.com/page");
    let options_url = mock.extension_url("options.html");

    bg.open_options_page().await.unwrap();
    assert_eq!(
        mock.actions(),
        vec![MockAction::CreateTab {
            url: options_url.clone()
        }]
    );

    mock.clear_actions();
    bg.open_options_page().await.unwrap();
    let actions = mock.actions();
    assert!(matches!(
        &actions[..],
        [MockAction::UpdateTab { update, .. }] if update.selected == Some(true)
    ));
}

#[tokio::test]
async fn open_editor_is_a_noop_without_a_site_id() {
    let (mock, bg) = background();
    mock.set_active_tab("https://x.com/not-a-wix-page");

    bg.open_editor().await.unwrap();

    assert!(navigations(&mock).is_empty());
    assert!(!mock
        .actions()
        .iter()
        .any(|a| matches!(a, MockAction::CreateTab { .. })));
}

#[tokio::test]
async fn open_editor_focuses_an_existing_editor_tab() {
    let (mock, bg) = background();
    mock.set_active_tab("https://mysite.wixsite.com/home");
    let editor_tab = mock.add_tab(&format!("{EDITOR_BASE_URL}site-1?debug=all"));
    mock.set_script_result(
        &predicates::meta_content_js(predicates::APP_INSTANCE_ID_META),
        json!("site-1"),
    );

    bg.open_editor().await.unwrap();

    assert!(mock.tab(editor_tab).unwrap().active);
    assert!(!mock
        .actions()
        .iter()
        .any(|a| matches!(a, MockAction::CreateTab { .. })));
}

#[tokio::test]
async fn open_editor_creates_a_tab_with_saved_settings_applied() {
    let (mock, bg) = background();
    mock.set_active_tab("https://mysite.wixsite.com/home");
    mock.set_script_result(
        &predicates::meta_content_js(predicates::APP_INSTANCE_ID_META),
        json!("site-1"),
    );
    mock.set_script_result(
        &predicates::meta_content_js(predicates::META_SITE_ID_META),
        json!("meta-9"),
    );
    settings::save(
        mock.as_ref(),
        &DevSettings {
            debug: DebugSelector::All,
            ..DevSettings::default()
        },
    )
    .await
    .unwrap();

    bg.open_editor().await.unwrap();

    let created: Vec<String> = mock
        .actions()
        .into_iter()
        .filter_map(|a| match a {
            MockAction::CreateTab { url } => Some(url),
            _ => None,
        })
        .collect();
    assert_eq!(
        created,
        vec![format!("{EDITOR_BASE_URL}site-1?metaSiteId=meta-9&debug=all")]
    );
}

#[tokio::test]
async fn apply_settings_navigates_once_and_settles() {
    let (mock, bg) = background();
    mock.set_active_tab("https://x.com/page?a=1");
    settings::save(
        mock.as_ref(),
        &DevSettings {
            debug: DebugSelector::Packages(vec!["core".to_string()]),
            ..DevSettings::default()
        },
    )
    .await
    .unwrap();

    bg.apply_settings("All").await.unwrap();
    assert_eq!(navigations(&mock), vec!["https://x.com/page?a=1&debug=core"]);

    // Already applied; the rewrite is a no-op and must not navigate again.
    bg.apply_settings("All").await.unwrap();
    assert_eq!(navigations(&mock).len(), 1);
}

#[tokio::test]
async fn dispatch_maps_results_and_errors() {
    let (mock, bg) = background();
    mock.set_active_tab("https://x.com/page");

    let response = dispatch(&bg, UtilsRequest::IsViewer).await;
    assert_eq!(response, UtilsResponse::Flag { value: false });

    let response = dispatch(&bg, UtilsRequest::GetCurrentUsername).await;
    assert_eq!(response, UtilsResponse::Username { value: None });

    let response = dispatch(
        &bg,
        UtilsRequest::ApplySettings {
            option: "bogus".to_string(),
        },
    )
    .await;
    assert!(matches!(response, UtilsResponse::Error { .. }));
}

#[tokio::test]
async fn dispatch_surfaces_invalid_urls_as_errors() {
    let (mock, bg) = background();
    // about:blank parses but has no host, so it cannot be rewritten.
    mock.set_active_tab("about:blank");

    let response = dispatch(&bg, UtilsRequest::DebugAll).await;
    assert!(matches!(response, UtilsResponse::Error { .. }));
}
