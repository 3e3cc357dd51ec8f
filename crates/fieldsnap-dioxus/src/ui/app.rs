use crate::platform::{self, HostSettings};
use crate::ui::components::{ActionButtons, CoordinatesView, PhotoPreview};
use dioxus::prelude::*;
use fieldsnap_engine::{Screen, ScreenState};
use std::rc::Rc;

const FIELDSNAP_CSS: &str = include_str!("../../assets/fieldsnap.css");

/// The whole app: title, last fix, three buttons, last photo.
///
/// Every press spawns its own task on the UI executor. Nothing stops a second
/// press while the first is still waiting on the platform.
#[component]
pub fn App(settings: HostSettings) -> Element {
    let state = use_signal(ScreenState::default);
    let screen = use_hook(|| {
        let platform = platform::host_platform(&settings);
        Rc::new(Screen::new(platform).with_observer(move |next: &ScreenState| {
            let mut state = state;
            state.set(next.clone());
        }))
    });

    let on_camera = {
        let screen = screen.clone();
        move |_: ()| {
            let screen = screen.clone();
            spawn(async move {
                let outcome = screen.open_camera().await;
                log::debug!("Camera flow finished: {outcome:?}");
            });
        }
    };

    let on_gallery = {
        let screen = screen.clone();
        move |_: ()| {
            let screen = screen.clone();
            spawn(async move {
                let outcome = screen.open_gallery().await;
                log::debug!("Gallery flow finished: {outcome:?}");
            });
        }
    };

    let on_location = {
        let screen = screen.clone();
        move |_: ()| {
            let screen = screen.clone();
            spawn(async move {
                let outcome = screen.get_location().await;
                log::debug!("Location flow finished: {outcome:?}");
            });
        }
    };

    let current = state.read().clone();

    rsx! {
        style { {FIELDSNAP_CSS} }
        div {
            class: "container",
            h2 { "fieldsnap" }
            if let Some(position) = current.position {
                CoordinatesView { position }
            }
            ActionButtons { on_camera, on_gallery, on_location }
            if let Some(image) = current.image {
                PhotoPreview { image }
            }
        }
    }
}

#[cfg(all(test, not(target_os = "android")))]
mod tests {
    use super::*;
    use dioxus::dioxus_core::VirtualDom;
    use dioxus_ssr::render;
    use fieldsnap_engine::Coordinates;
    use tempfile::TempDir;

    #[test]
    fn test_initial_screen_has_buttons_only() {
        let temp_dir = TempDir::new().unwrap();
        let settings = HostSettings {
            pictures_dir: temp_dir.path().join("Pictures"),
            downloads_dir: temp_dir.path().join("Download"),
            fixed_position: Some(Coordinates::new(12.34, 56.78)),
        };

        let mut dom = VirtualDom::new_with_props(App, AppProps { settings });
        dom.rebuild_in_place();
        let html = render(&dom);

        assert!(html.contains("fieldsnap"));
        assert!(html.contains("Open Camera"));
        assert!(html.contains("Open Gallery"));
        assert!(html.contains("Get Geo Location"));
        assert!(!html.contains("Longitude:"));
        assert!(!html.contains("<img"));
    }
}
