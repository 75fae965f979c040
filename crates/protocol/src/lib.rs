//! devbar-protocol: wire types and URL query transforms.
//!
//! Everything in this crate is pure data: the query-pair model, the query
//! transforms applied to tab URLs, the debug selector, persisted developer
//! settings, and the message types exchanged with the popup and content
//! pages. Both the native background service and the WASM deployment shell
//! depend on this crate, so it stays free of async and host concerns.

pub mod debug;
pub mod messages;
pub mod predicates;
pub mod query;
pub mod settings;
pub mod transform;

pub use debug::DebugSelector;
pub use messages::{ContentRequest, UtilsRequest, UtilsResponse};
pub use query::QueryPairs;
pub use settings::{DevSettings, SettingsScope};
pub use transform::{
    DEBUG_PARAM, EXPERIMENTS_PARAM, InvalidUrl, MOBILE_VIEW_PARAM, QueryTransform,
    mobile_view_enabled,
};
