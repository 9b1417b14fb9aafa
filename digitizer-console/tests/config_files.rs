use std::fs;
use std::time::Duration;

use digitizer_console::config::{
    ConfigLoadError, ConfigLoader, ConfigOverrides, EnvConfig,
};
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"
[server]
url = "digitizer.lan:8000/"
request_timeout_secs = 12

[channel]
reconnect_floor_ms = 500
reconnect_ceiling_ms = 8000

[jobs]
page_size = 25
"#;

fn write_config(dir: &TempDir, relative: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("config dir");
    }
    fs::write(&path, contents).expect("write config");
    path
}

fn isolated() -> ConfigLoader {
    ConfigLoader::new().with_env(EnvConfig::default())
}

#[test]
fn file_values_fill_in_the_defaults() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(&dir, "console.toml", FULL_CONFIG);

    let load = isolated().with_config_path(&path).load().expect("load");

    assert_eq!(load.source.as_deref(), Some(path.as_path()));
    let config = load.config;
    assert_eq!(config.server_url, "http://digitizer.lan:8000");
    assert_eq!(config.request_timeout, Duration::from_secs(12));
    assert_eq!(config.reconnect_floor, Duration::from_millis(500));
    assert_eq!(config.reconnect_ceiling, Duration::from_millis(8000));
    assert_eq!(config.default_page_size, 25);

    let channel = config.channel_config().expect("channel config");
    assert_eq!(channel.url, "ws://digitizer.lan:8000/api/ws");
    assert_eq!(channel.reconnect_floor, Duration::from_millis(500));
}

#[test]
fn environment_beats_file_and_flags_beat_environment() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(&dir, "console.toml", FULL_CONFIG);
    let env = EnvConfig::from_lookup(|key| match key {
        "DIGITIZER_SERVER_URL" => Some("https://env.lan".into()),
        "DIGITIZER_PAGE_SIZE" => Some("40".into()),
        "DIGITIZER_RECONNECT_CEILING_MS" => Some("16000".into()),
        _ => None,
    })
    .expect("env");

    let config = ConfigLoader::new()
        .with_env(env)
        .with_config_path(&path)
        .with_overrides(ConfigOverrides {
            page_size: Some(5),
            ..ConfigOverrides::default()
        })
        .load()
        .expect("load")
        .config;

    assert_eq!(config.server_url, "https://env.lan");
    assert_eq!(config.default_page_size, 5);
    assert_eq!(config.reconnect_ceiling, Duration::from_millis(16000));
    assert_eq!(config.reconnect_floor, Duration::from_millis(500));
    assert_eq!(
        config.channel_config().expect("channel").url,
        "wss://env.lan/api/ws"
    );
}

#[test]
fn default_location_is_found_under_the_search_root() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(
        &dir,
        "config/digitizer.toml",
        "[server]\nurl = \"http://nested.lan\"\n",
    );

    let load = isolated()
        .with_search_root(dir.path())
        .load()
        .expect("load");

    assert_eq!(load.source, Some(path));
    assert_eq!(load.config.server_url, "http://nested.lan");
}

#[test]
fn env_config_path_is_honoured() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(&dir, "elsewhere.toml", "[jobs]\npage_size = 3\n");
    let env = EnvConfig {
        config_path: Some(path.clone()),
        ..EnvConfig::default()
    };

    let load = ConfigLoader::new()
        .with_env(env)
        .with_search_root(dir.path())
        .load()
        .expect("load");

    assert_eq!(load.source, Some(path));
    assert_eq!(load.config.default_page_size, 3);
}

#[test]
fn unknown_keys_are_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(
        &dir,
        "console.toml",
        "[server]\nurl = \"http://a.lan\"\nretries = 3\n",
    );

    let err = isolated()
        .with_config_path(&path)
        .load()
        .expect_err("unknown key");
    assert!(matches!(err, ConfigLoadError::Parse { .. }));
}

#[test]
fn zero_page_size_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(&dir, "console.toml", "[jobs]\npage_size = 0\n");

    let err = isolated()
        .with_config_path(&path)
        .load()
        .expect_err("zero page size");
    assert!(matches!(
        err,
        ConfigLoadError::InvalidValue {
            field: "page_size",
            ..
        }
    ));
}
