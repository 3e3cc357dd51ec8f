use dioxus::prelude::*;
use fieldsnap_engine::Coordinates;

/// The last fix, one line per axis
#[component]
pub fn CoordinatesView(position: Coordinates) -> Element {
    rsx! {
        div {
            class: "coordinates",
            p { "Longitude: {position.longitude}" }
            p { "Latitude: {position.latitude}" }
        }
    }
}
