use dioxus::prelude::*;

/// Shown instead of the screen when startup fails (for example a broken
/// config file), since there is no terminal to read on Android.
#[component]
pub fn ErrorScreen(title: String, message: String, config_path: Option<String>) -> Element {
    rsx! {
        div {
            class: "container",
            h1 { style: "color: #dc322f;", "{title}" }
            p { "{message}" }
            if let Some(ref path) = config_path {
                p {
                    "Fix or remove "
                    code { "{path}" }
                    " and restart."
                }
            }
        }
    }
}
