use dioxus::prelude::*;

/// The three buttons, in screen order
#[component]
pub fn ActionButtons(
    on_camera: EventHandler<()>,
    on_gallery: EventHandler<()>,
    on_location: EventHandler<()>,
) -> Element {
    rsx! {
        div {
            class: "actions",
            button { onclick: move |_| on_camera.call(()), "Open Camera" }
            button { onclick: move |_| on_gallery.call(()), "Open Gallery" }
            button { onclick: move |_| on_location.call(()), "Get Geo Location" }
        }
    }
}
