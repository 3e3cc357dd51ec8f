use dioxus::prelude::*;
use fieldsnap_engine::ImageRef;

/// What the webview can load for `image`. Local files go by absolute path,
/// which the desktop asset handler serves from disk; the webview refuses
/// `file://` from the app origin.
fn preview_src(image: &ImageRef) -> &str {
    let uri = image.as_str();
    uri.strip_prefix("file://").unwrap_or(uri)
}

#[component]
pub fn PhotoPreview(image: ImageRef) -> Element {
    let src = preview_src(&image);
    rsx! {
        img {
            class: "photo-preview",
            src: "{src}",
            alt: "Selected photo",
        }
    }
}
