//! Turning what a system activity left behind into a [`PickerResponse`].

use fieldsnap_engine::{Asset, PickerResponse};

pub const RESULT_OK: i32 = -1; // Activity.RESULT_OK

/// Camera capture into a pre-allocated media entry. The entry only has
/// content once the camera app saved a photo into it.
pub fn capture_response(uri: String, captured: bool) -> PickerResponse {
    if !captured {
        return PickerResponse::Cancelled;
    }
    PickerResponse::Picked {
        assets: vec![Asset {
            mime_type: Some("image/jpeg".to_string()),
            ..Asset::from_uri(uri)
        }],
    }
}

/// Library pick delivered as an activity result.
///
/// An OK result without data is passed on as an empty pick.
pub fn pick_response(
    result_code: i32,
    uri: Option<String>,
    mime_type: Option<String>,
) -> PickerResponse {
    if result_code != RESULT_OK {
        return PickerResponse::Cancelled;
    }
    let assets = uri
        .map(|uri| Asset {
            mime_type,
            ..Asset::from_uri(uri)
        })
        .into_iter()
        .collect();
    PickerResponse::Picked { assets }
}
