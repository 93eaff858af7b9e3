use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_settings_file(contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("bem_cli_config_test_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("bem.toml");
    fs::write(&path, contents).expect("write settings");
    path
}

#[test]
fn missing_file_yields_defaults() {
    let settings =
        load_settings_from(Path::new("/nonexistent/bem.toml"), |_| None).expect("settings");
    assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
    assert_eq!(settings.client.search_debounce, Duration::from_millis(500));
    assert_eq!(settings.client.endpoints.login, "/login");
}

#[test]
fn file_values_are_overridden_by_environment() {
    let path = temp_settings_file(
        r#"
base_url = "https://events.example"
client_id = "from-file"
search_debounce_ms = 250
locale = "vi"
"#,
    );

    let settings = load_settings_from(&path, |key| match key {
        "BEM__CLIENT_ID" => Some("from-env".into()),
        "BEM__DATABASE_URL" => Some("./state/session.db".into()),
        _ => None,
    })
    .expect("settings");

    assert_eq!(settings.client.base_url, "https://events.example");
    assert_eq!(settings.client.client_id, "from-env");
    assert_eq!(settings.client.search_debounce, Duration::from_millis(250));
    assert_eq!(settings.client.locale, Locale::Vietnamese);
    assert_eq!(settings.database_url, "sqlite://./state/session.db");

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn rejects_invalid_numbers_and_urls() {
    let err = load_settings_from(Path::new("/nonexistent/bem.toml"), |key| {
        (key == "BEM__NAVIGATION_DELAY_MS").then(|| "soon".to_string())
    })
    .expect_err("must fail");
    assert!(err.to_string().contains("navigation_delay_ms"), "{err}");

    let err = load_settings_from(Path::new("/nonexistent/bem.toml"), |key| {
        (key == "BEM__BASE_URL").then(|| "not a url".to_string())
    })
    .expect_err("must fail");
    assert!(err.to_string().contains("invalid base url"), "{err}");
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
    assert_eq!(normalize_database_url("  "), DEFAULT_DATABASE_URL);
}
