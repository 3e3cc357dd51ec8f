use crate::models::{ImageRef, ImageSource, PickerOptions, PickerResponse};
use crate::platform::ImagePicker;

/// Open the picker for `source` with the fixed photo options.
pub async fn launch_picker<P>(picker: &P, source: ImageSource) -> PickerResponse
where
    P: ImagePicker + ?Sized,
{
    let response = picker.launch(source, &PickerOptions::default()).await;
    log::debug!("Camera Response: {response:?}");
    response
}

/// Reduce a picker response to the image it selected, if any.
///
/// Only the first asset counts; any others are dropped.
pub fn selected_image(response: &PickerResponse) -> Option<ImageRef> {
    match response {
        PickerResponse::Cancelled => {
            log::info!("User cancelled image picker");
            None
        }
        PickerResponse::Failed { code, message } => {
            log::info!("Image picker error ({code}): {message}");
            None
        }
        PickerResponse::Picked { assets } => match assets.first() {
            Some(asset) => {
                log::info!("Image URI: {}", asset.uri);
                Some(ImageRef::new(asset.uri.clone()))
            }
            None => {
                log::info!("No assets found in the response");
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Asset, PickerErrorCode};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_asset_wins() {
        let response = PickerResponse::Picked {
            assets: vec![
                Asset::from_uri("file:///cache/first.jpg"),
                Asset::from_uri("file:///cache/second.jpg"),
                Asset::from_uri("file:///cache/third.jpg"),
            ],
        };

        assert_eq!(
            selected_image(&response),
            Some(ImageRef::new("file:///cache/first.jpg"))
        );
    }

    #[test]
    fn test_cancel_selects_nothing() {
        assert_eq!(selected_image(&PickerResponse::Cancelled), None);
    }

    #[test]
    fn test_error_selects_nothing() {
        let response = PickerResponse::Failed {
            code: PickerErrorCode::Others,
            message: "boom".to_string(),
        };
        assert_eq!(selected_image(&response), None);
    }

    #[test]
    fn test_empty_assets_selects_nothing() {
        let response = PickerResponse::Picked { assets: vec![] };
        assert_eq!(selected_image(&response), None);
    }
}
