//! URL query transforms.
//!
//! Each transform maps an existing absolute URL to a new URL by touching
//! exactly one semantic query concern, leaving scheme, host, path, fragment
//! and every unrelated query pair byte-for-byte intact.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::debug::DebugSelector;
use crate::query::QueryPairs;

/// Query key selecting instrumentation packages.
pub const DEBUG_PARAM: &str = "debug";
/// Query key carrying the experiment list.
pub const EXPERIMENTS_PARAM: &str = "experiments";
/// Query key toggling the mobile rendering of a page.
pub const MOBILE_VIEW_PARAM: &str = "showMobileView";

/// The input string was not a well-formed absolute URL.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid URL '{url}': {reason}")]
pub struct InvalidUrl {
    /// The offending input.
    pub url: String,
    /// Parser or structural complaint.
    pub reason: String,
}

/// A named, parameterized rewrite of one query concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum QueryTransform {
    /// Unconditionally sets `key = value`.
    SetFlag { key: String, value: String },
    /// Adds `package` to the `debug` selector, deduplicated; `debug=all`
    /// absorbs the append.
    AppendDebugPackage { package: String },
    /// Forces `debug=all`, discarding any package list.
    SetDebugAll,
    /// Appends `name` to the `experiments` list. Deliberately not
    /// deduplicated, unlike debug packages.
    AppendExperiment { name: String },
    /// Sets `showMobileView` to the stringified boolean.
    ToggleMobileView { enabled: bool },
}

impl QueryTransform {
    /// Applies the transform to `url`, returning the rewritten URL string.
    ///
    /// Semantic no-ops (appending a package already selected, forcing
    /// `debug=all` twice) return the input verbatim, so callers can compare
    /// strings to decide whether a navigation is needed.
    pub fn apply(&self, url: &str) -> Result<String, InvalidUrl> {
        let parsed = parse_absolute(url)?;
        let mut pairs = QueryPairs::parse(parsed.query().unwrap_or(""));
        if !self.apply_to(&mut pairs) {
            return Ok(url.to_string());
        }
        let mut rewritten = parsed;
        let query = pairs.serialize();
        rewritten.set_query(if query.is_empty() {
            None
        } else {
            Some(&query)
        });
        Ok(String::from(rewritten))
    }

    /// Applies the transform to an already-parsed pair set. Returns whether
    /// anything changed.
    pub fn apply_to(&self, pairs: &mut QueryPairs) -> bool {
        match self {
            QueryTransform::SetFlag { key, value } => {
                pairs.set(key, value.clone());
                true
            }
            QueryTransform::AppendDebugPackage { package } => {
                match pairs.get(DEBUG_PARAM) {
                    None | Some("") => {
                        pairs.set(DEBUG_PARAM, package.clone());
                        true
                    }
                    Some(existing) => {
                        let mut selector = DebugSelector::parse(existing);
                        if selector.insert(package) {
                            pairs.set(DEBUG_PARAM, selector.to_string());
                            true
                        } else {
                            false
                        }
                    }
                }
            }
            QueryTransform::SetDebugAll => {
                if pairs.get(DEBUG_PARAM) == Some("all") {
                    false
                } else {
                    pairs.set(DEBUG_PARAM, "all");
                    true
                }
            }
            QueryTransform::AppendExperiment { name } => {
                match pairs.get(EXPERIMENTS_PARAM) {
                    None | Some("") => pairs.set(EXPERIMENTS_PARAM, name.clone()),
                    Some(existing) => {
                        let joined = format!("{existing},{name}");
                        pairs.set(EXPERIMENTS_PARAM, joined);
                    }
                }
                true
            }
            QueryTransform::ToggleMobileView { enabled } => {
                pairs.set(MOBILE_VIEW_PARAM, enabled.to_string());
                true
            }
        }
    }
}

/// True when `url` carries `showMobileView=true`. Malformed URLs read as
/// `false`.
pub fn mobile_view_enabled(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    QueryPairs::parse(parsed.query().unwrap_or("")).get(MOBILE_VIEW_PARAM) == Some("true")
}

fn parse_absolute(url: &str) -> Result<Url, InvalidUrl> {
    let parsed = Url::parse(url).map_err(|e| InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !parsed.has_host() {
        return Err(InvalidUrl {
            url: url.to_string(),
            reason: "URL has no host".to_string(),
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_debug_package_extends_an_existing_selector() {
        let url = "https://editor.wix.com/html/editor/web/renderer/edit/123?debug=foo";
        let out = QueryTransform::AppendDebugPackage {
            package: "bar".to_string(),
        }
        .apply(url)
        .unwrap();
        assert_eq!(
            out,
            "https://editor.wix.com/html/editor/web/renderer/edit/123?debug=foo,bar"
        );
    }

    #[test]
    fn append_debug_package_sets_when_absent() {
        let out = QueryTransform::AppendDebugPackage {
            package: "foo".to_string(),
        }
        .apply("https://x.com/page?a=1")
        .unwrap();
        assert_eq!(out, "https://x.com/page?a=1&debug=foo");
    }

    #[test]
    fn append_debug_package_is_idempotent() {
        let transform = QueryTransform::AppendDebugPackage {
            package: "bar".to_string(),
        };
        let once = transform.apply("https://x.com/page?debug=foo").unwrap();
        let twice = transform.apply(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn debug_all_absorbs_package_appends() {
        let url = "https://x.com/page?debug=all";
        let appended = QueryTransform::AppendDebugPackage {
            package: "foo".to_string(),
        }
        .apply(url)
        .unwrap();
        assert_eq!(appended, url);
        assert_eq!(QueryTransform::SetDebugAll.apply(url).unwrap(), url);
    }

    #[test]
    fn set_debug_all_appends_at_the_end() {
        let out = QueryTransform::SetDebugAll
            .apply("https://x.com/page?a=1")
            .unwrap();
        assert_eq!(out, "https://x.com/page?a=1&debug=all");
    }

    #[test]
    fn set_debug_all_discards_a_package_list() {
        let out = QueryTransform::SetDebugAll
            .apply("https://x.com/page?debug=foo,bar&b=2")
            .unwrap();
        assert_eq!(out, "https://x.com/page?debug=all&b=2");
    }

    #[test]
    fn append_experiment_is_not_idempotent() {
        let transform = QueryTransform::AppendExperiment {
            name: "NewNav".to_string(),
        };
        let once = transform.apply("https://x.com/page").unwrap();
        assert_eq!(once, "https://x.com/page?experiments=NewNav");
        let twice = transform.apply(&once).unwrap();
        assert_eq!(twice, "https://x.com/page?experiments=NewNav,NewNav");
    }

    #[test]
    fn toggle_mobile_view_round_trips_both_booleans() {
        for enabled in [true, false] {
            let out = QueryTransform::ToggleMobileView { enabled }
                .apply("https://x.com/site?a=1")
                .unwrap();
            assert_eq!(mobile_view_enabled(&out), enabled);
        }
    }

    #[test]
    fn toggle_mobile_view_overwrites_in_place() {
        let out = QueryTransform::ToggleMobileView { enabled: false }
            .apply("https://x.com/site?showMobileView=true&a=1")
            .unwrap();
        assert_eq!(out, "https://x.com/site?showMobileView=false&a=1");
    }

    #[test]
    fn set_flag_overwrites_unconditionally() {
        let out = QueryTransform::SetFlag {
            key: "petri_ovr".to_string(),
            value: "specs.Enabled".to_string(),
        }
        .apply("https://x.com/page?petri_ovr=old")
        .unwrap();
        assert_eq!(out, "https://x.com/page?petri_ovr=specs.Enabled");
    }

    #[test]
    fn unrelated_pairs_and_fragment_survive_untouched() {
        let out = QueryTransform::SetDebugAll
            .apply("https://x.com/p?z=26&y=b%20c&flag#section-2")
            .unwrap();
        assert_eq!(out, "https://x.com/p?z=26&y=b%20c&flag&debug=all#section-2");
    }

    #[test]
    fn relative_and_hostless_urls_are_rejected() {
        let transform = QueryTransform::SetDebugAll;
        assert!(transform.apply("/html/editor?debug=foo").is_err());
        assert!(transform.apply("not a url").is_err());
        assert!(transform.apply("mailto:dev@wix.com").is_err());
    }

    #[test]
    fn mobile_view_enabled_reads_false_from_malformed_urls() {
        assert!(!mobile_view_enabled("not a url"));
        assert!(!mobile_view_enabled("https://x.com/?showMobileView=false"));
        assert!(mobile_view_enabled("https://x.com/?showMobileView=true"));
    }
}
