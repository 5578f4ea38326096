use taskpad_core::{AppConfig, AppContext, BackendKind, ConfigError, ThemeMode};
use tempfile::TempDir;

#[test]
fn local_backend_round_trips_across_restarts() {
    let dir = TempDir::new().unwrap();
    let config = AppConfig::new(dir.path().join("data"), BackendKind::Local);

    {
        let mut ctx = AppContext::init(&config).unwrap();
        assert!(!ctx.tasks().is_loading());
        ctx.tasks_mut().add_task("buy milk");
        ctx.theme_mut().set_theme_mode(ThemeMode::Dark);
        ctx.shutdown();
    }

    let ctx = AppContext::init(&config).unwrap();
    assert_eq!(ctx.tasks().todos().len(), 1);
    assert_eq!(ctx.tasks().todos()[0].text, "buy milk");
    assert_eq!(ctx.theme().theme_mode(), ThemeMode::Dark);
}

#[test]
fn table_backend_round_trips_across_restarts() {
    let dir = TempDir::new().unwrap();
    let config = AppConfig::new(dir.path().join("data"), BackendKind::Table);

    {
        let mut ctx = AppContext::init(&config).unwrap();
        ctx.tasks_mut().add_task("remote milk");
        // Table mutations converge through the change feed.
        assert!(ctx.tasks().todos().is_empty());
        ctx.tasks_mut().pump();
        assert_eq!(ctx.tasks().todos().len(), 1);
        ctx.shutdown();
    }

    let ctx = AppContext::init(&config).unwrap();
    assert_eq!(ctx.tasks().todos().len(), 1);
    assert_eq!(ctx.tasks().todos()[0].text, "remote milk");
}

#[test]
fn theme_persists_locally_regardless_of_task_backend() {
    let dir = TempDir::new().unwrap();
    let table = AppConfig::new(dir.path().join("data"), BackendKind::Table);
    let local = AppConfig::new(dir.path().join("data"), BackendKind::Local);

    {
        let mut ctx = AppContext::init(&table).unwrap();
        ctx.theme_mut().set_theme_mode(ThemeMode::Light);
        ctx.shutdown();
    }

    let ctx = AppContext::init(&local).unwrap();
    assert_eq!(ctx.theme().theme_mode(), ThemeMode::Light);
}

#[test]
fn config_parses_from_json_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("taskpad.json");
    std::fs::write(
        &config_path,
        format!(
            r#"{{"data_dir": "{}", "backend": "table"}}"#,
            dir.path().join("data").display()
        ),
    )
    .unwrap();

    let config = AppConfig::from_json_file(&config_path).unwrap();
    assert_eq!(config.backend, BackendKind::Table);
    assert!(config.data_dir.ends_with("data"));
}

#[test]
fn config_rejects_unknown_backend() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("taskpad.json");
    std::fs::write(
        &config_path,
        r#"{"data_dir": "/tmp/x", "backend": "cloud"}"#,
    )
    .unwrap();

    let err = AppConfig::from_json_file(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn config_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = AppConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
