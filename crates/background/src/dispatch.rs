//! Popup request dispatch.
//!
//! Total mapping from [`UtilsRequest`] to [`UtilsResponse`]: service errors
//! come back as `UtilsResponse::Error`, never as a Rust error, so the
//! message channel to the popup always gets an answer it can render.

use devbar_host::Result;
use devbar_protocol::{UtilsRequest, UtilsResponse};
use tracing::warn;

use crate::service::Background;

/// Runs `request` against the service and folds the outcome into a
/// response.
pub async fn dispatch(background: &Background, request: UtilsRequest) -> UtilsResponse {
    match run(background, request).await {
        Ok(response) => response,
        Err(err) => {
            warn!(target: "devbar", error = %err, "request failed");
            UtilsResponse::Error {
                message: err.to_string(),
            }
        }
    }
}

async fn run(background: &Background, request: UtilsRequest) -> Result<UtilsResponse> {
    Ok(match request {
        UtilsRequest::ApplySettings { option } => {
            background.apply_settings(&option).await?;
            UtilsResponse::Ack
        }
        UtilsRequest::LogBackIn => {
            background.log_back_in().await?;
            UtilsResponse::Ack
        }
        UtilsRequest::GetCurrentUsername => UtilsResponse::Username {
            value: background.get_current_username().await?,
        },
        UtilsRequest::IsViewer => UtilsResponse::Flag {
            value: background.is_viewer().await?,
        },
        UtilsRequest::IsEditor => UtilsResponse::Flag {
            value: background.is_editor().await?,
        },
        UtilsRequest::IsMobileView => UtilsResponse::Flag {
            value: background.is_mobile_view().await?,
        },
        UtilsRequest::SetMobileView { enabled } => {
            background.set_mobile_view(enabled).await?;
            UtilsResponse::Ack
        }
        UtilsRequest::AddExperiment { name } => {
            background.add_experiment(&name).await?;
            UtilsResponse::Ack
        }
        UtilsRequest::DebugPackage { project, package } => {
            background.debug_package(&project, &package).await?;
            UtilsResponse::Ack
        }
        UtilsRequest::DebugAll => {
            background.debug_all().await?;
            UtilsResponse::Ack
        }
        UtilsRequest::OpenOptionsPage => {
            background.open_options_page().await?;
            UtilsResponse::Ack
        }
        UtilsRequest::OpenEditor => {
            background.open_editor().await?;
            UtilsResponse::Ack
        }
    })
}
