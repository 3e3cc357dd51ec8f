use dioxus::prelude::*;
use fieldsnap_config::{Config, ConfigError};
use std::path::Path;

mod platform;
mod ui;

use platform::HostSettings;
use ui::App;
use ui::components::ErrorScreen;

fn main() {
    // Initialize logging
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag("FieldSnap"),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .init();
    }

    log::info!("fieldsnap starting up!");
    log::info!("Config path: {}", Config::config_path().display());

    #[cfg(not(target_os = "android"))]
    {
        dioxus::LaunchBuilder::desktop()
            .with_cfg(make_window_config())
            .launch(app_root);
    }

    #[cfg(target_os = "android")]
    {
        log::info!("Launching Dioxus app for Android");
        dioxus::launch(app_root);
    }
}

fn app_root() -> Element {
    let loaded =
        use_hook(|| load_or_create_config(&Config::config_path()).map_err(|e| e.to_string()));

    match loaded {
        Ok(config) => {
            let settings = HostSettings::from_config(&config);
            log::info!(
                "Saving pictures to {} and locations to {}",
                settings.pictures_dir.display(),
                settings.downloads_dir.display()
            );
            rsx! {
                App { settings }
            }
        }
        Err(message) => {
            log::error!("Failed to load config: {message}");
            rsx! {
                ErrorScreen {
                    title: "Config Error",
                    message,
                    config_path: Config::config_path().display().to_string(),
                }
            }
        }
    }
}

/// Read the config file. On first run write one holding the resolved default
/// folders, so there is something to edit.
fn load_or_create_config(config_path: &Path) -> Result<Config, ConfigError> {
    if let Some(config) = Config::load_from_path(config_path)? {
        return Ok(config);
    }

    let defaults = HostSettings::from_config(&Config::default());
    let config = Config {
        pictures_path: Some(defaults.pictures_dir),
        downloads_path: Some(defaults.downloads_dir),
        position: None,
    };

    match config.save_to_path(config_path) {
        Ok(()) => log::info!(
            "Created default config file at {}",
            config_path.display()
        ),
        Err(e) => {
            log::warn!("Failed to create default config file: {e}");
            log::warn!("Will use default folders without persisting config");
        }
    }

    Ok(config)
}

#[cfg(not(target_os = "android"))]
fn make_window_config() -> dioxus::desktop::Config {
    use dioxus::desktop::{Config, WindowBuilder};

    let window = WindowBuilder::new()
        .with_title("fieldsnap")
        .with_always_on_top(false);

    Config::default().with_window(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_first_run_writes_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("fieldsnap/config.toml");

        let config = load_or_create_config(&config_path).unwrap();

        assert!(config.pictures_path.is_some());
        assert!(config.downloads_path.is_some());
        let written = Config::load_from_path(&config_path).unwrap().unwrap();
        assert_eq!(written, config);
    }

    #[test]
    fn test_existing_config_is_left_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let content = "pictures_path = \"/data/pics\"\n";
        std::fs::write(&config_path, content).unwrap();

        let config = load_or_create_config(&config_path).unwrap();

        assert_eq!(config.pictures_path, Some(PathBuf::from("/data/pics")));
        assert_eq!(config.downloads_path, None);
        assert_eq!(std::fs::read_to_string(&config_path).unwrap(), content);
    }

    #[test]
    fn test_malformed_config_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "position = [").unwrap();

        let result = load_or_create_config(&config_path);

        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }
}
