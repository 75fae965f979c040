//! Injected page predicates.
//!
//! The editor and viewer surfaces identify themselves through `http-equiv`
//! meta tags stamped by their serving infrastructure; these snippets read
//! them out of the live document.

/// Meta tag present on published-site (viewer) pages.
pub const VIEWER_META: &str = "X-Wix-Renderer-Server";
/// Meta tag present on editor pages.
pub const EDITOR_META: &str = "X-Wix-Editor-Server";
/// Meta tag carrying the meta-site id.
pub const META_SITE_ID_META: &str = "X-Wix-Meta-Site-Id";
/// Meta tag carrying the application instance (site) id.
pub const APP_INSTANCE_ID_META: &str = "X-Wix-Application-Instance-Id";

/// `true` iff the document carries the given `http-equiv` meta tag.
pub fn has_meta_js(http_equiv: &str) -> String {
    format!(
        "!!Array.from(document.getElementsByTagName('meta')).find(e => e.httpEquiv === '{http_equiv}')"
    )
}

/// The `content` of the given `http-equiv` meta tag, or a nullish value.
pub fn meta_content_js(http_equiv: &str) -> String {
    format!(
        "(function() {{\n  const e = Array.from(document.getElementsByTagName('meta')).find(e => e.httpEquiv === '{http_equiv}');\n  return e && e.content;\n}}());"
    )
}
