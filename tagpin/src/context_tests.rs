use super::*;
use libtagpin::Strategy;

#[test]
fn test_verbosity_from_count() {
    assert_eq!(VerbosityLevel::from_count(0), VerbosityLevel::Normal);
    assert_eq!(VerbosityLevel::from_count(1), VerbosityLevel::Verbose);
    assert_eq!(VerbosityLevel::from_count(2), VerbosityLevel::Debug);
    assert_eq!(VerbosityLevel::from_count(9), VerbosityLevel::Trace);
}

#[test]
fn test_log_directive() {
    assert_eq!(VerbosityLevel::Normal.log_directive(), "warn");
    assert_eq!(VerbosityLevel::Trace.log_directive(), "trace");
}

#[test]
fn test_default_config_path_ends_with_tagpin() {
    if let Some(path) = default_config_path() {
        assert!(path.ends_with("tagpin/config.yaml"));
    }
}

#[test]
fn test_build_with_explicit_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "resolver:\n  strategy: most-recent\nnetwork:\n  timeout: 7\n").unwrap();

    let ctx = AppContext::build(
        Some(path.as_path()),
        ColorChoice::Never,
        VerbosityLevel::Normal,
    )
    .unwrap();

    assert_eq!(ctx.config.resolver.strategy, Strategy::MostRecent);
    assert_eq!(ctx.config.network.timeout, 7);
    assert_eq!(ctx.color, ColorChoice::Never);
}

#[test]
fn test_build_with_missing_explicit_config_fails() {
    let dir = tempfile::tempdir().unwrap();

    let result = AppContext::build(
        Some(dir.path().join("absent.yaml").as_path()),
        ColorChoice::Auto,
        VerbosityLevel::Normal,
    );

    assert!(matches!(result, Err(libtagpin::TagpinError::Config { .. })));
}
