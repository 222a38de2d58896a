//! Settings files on disk and the `Config` binding initializer.

use std::fs;
use std::sync::Arc;

use naily_config::{Config, ConfigError, ConfigLocation};
use naily_core::{BindingState, LoadContext, LoggerHandle, Namespace, ResolutionError};
use tempfile::TempDir;

fn quiet() -> LoggerHandle {
    LoggerHandle::from_dispatch(tracing::Dispatch::none())
}

fn namespace_at(location: ConfigLocation) -> Namespace {
    Namespace::builder()
        .logger(quiet())
        .bind(naily_config::BINDING, naily_config::loader_at(location))
        .build()
}

// ---------------------------------------------------------------------------
// 1. Loading
// ---------------------------------------------------------------------------

#[test]
fn load_at_reads_mapping() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("config.yaml");
    fs::write(&path, "broker_host: 127.0.0.1\nbroker_port: 5672\n").expect("write");

    let config = Config::load_at(&path).expect("load");
    assert_eq!(config.source(), Some(path.as_path()));
    assert_eq!(config.get::<u16>("broker_port").unwrap(), Some(5672));
    assert_eq!(config.len(), 2);
}

#[test]
fn load_at_missing_file_returns_not_found() {
    let dir = TempDir::new().expect("tempdir");
    let err = Config::load_at(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("absent.yaml"));
}

#[test]
fn missing_default_file_yields_empty_settings() {
    let dir = TempDir::new().expect("tempdir");
    let config = Config::load_at_or_empty(&naily_config::default_path_at(dir.path())).expect("load");
    assert!(config.is_empty());
    assert_eq!(config.source(), None);
}

#[test]
fn corrupt_yaml_returns_parse_error_with_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("config.yaml");
    fs::write(&path, b": : corrupt : yaml : !!!\n  - broken: [unclosed").expect("write");

    let err = Config::load_at(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
fn list_document_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("config.yaml");
    fs::write(&path, b"- this is a list, not a mapping\n").expect("write");

    let err = Config::load_at(&path).unwrap_err();
    assert!(matches!(err, ConfigError::NotAMapping { .. }), "got: {err}");
}

#[test]
fn location_applies_required_and_optional_rules() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("missing.yaml");

    let err = ConfigLocation::Explicit(missing.clone()).load().unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }), "got: {err}");

    let config = ConfigLocation::Default(missing).load().expect("optional default");
    assert!(config.is_empty());

    let present = dir.path().join("config.yaml");
    fs::write(&present, "log_level: info\n").expect("write");
    let config = ConfigLocation::Default(present.clone()).load().expect("load default");
    assert_eq!(config.source(), Some(present.as_path()));
}

// ---------------------------------------------------------------------------
// 2. Binding
// ---------------------------------------------------------------------------

#[test]
fn binding_resolves_config_once() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("config.yaml");
    fs::write(&path, "log_level: debug\n").expect("write");
    let ns = namespace_at(ConfigLocation::Explicit(path.clone()));

    let first = ns.resolve_as::<Config>("Config").expect("resolve");
    // Changing the file after resolution has no effect: the binding is cached.
    fs::write(&path, "log_level: trace\n").expect("rewrite");
    let second = ns.resolve_as::<Config>("Config").expect("resolve again");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.get::<String>("log_level").unwrap().as_deref(), Some("debug"));
}

#[test]
fn binding_surfaces_missing_explicit_file() {
    let dir = TempDir::new().expect("tempdir");
    let ns = namespace_at(ConfigLocation::Explicit(dir.path().join("nope.yaml")));

    let err = ns.resolve("Config").unwrap_err();
    assert!(matches!(err, ResolutionError::LoadFailed { name: "Config", .. }));
    assert!(err.to_string().contains("config file not found"), "got: {err}");
    assert_eq!(ns.state("Config"), Some(BindingState::Failed));
}

#[test]
fn loader_can_be_called_directly() {
    let dir = TempDir::new().expect("tempdir");
    let loader = naily_config::loader_at(ConfigLocation::Default(naily_config::default_path_at(
        dir.path(),
    )));
    let ns = Namespace::builder()
        .logger(quiet())
        .bind("Probe", move |ctx: &LoadContext| loader(ctx))
        .build();

    let config = ns.resolve_as::<Config>("Probe").expect("resolve");
    assert!(config.is_empty());
}
