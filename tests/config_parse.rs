use docx_bridge::config::Config;

#[test]
fn parse_example_config() {
    let raw = include_str!("../docx-bridge.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.conversion.start_page, 0);
    assert!(cfg.conversion.end_page.is_none());
    assert!(cfg.conversion.keep_format);
    assert!(!cfg.conversion.multi_processing);
    assert_eq!(cfg.engine.scripts_dir, "scripts");
}

#[test]
fn defaults_match_upstream_call() {
    let cfg = Config::default();
    assert_eq!(cfg.conversion.start_page, 0);
    assert!(cfg.conversion.end_page.is_none());
    assert!(!cfg.conversion.multi_processing);
    assert!(!cfg.conversion.debug);
    assert!(cfg.conversion.keep_format);
    assert_eq!(cfg.conversion.min_vertical_gap, 5.0);
    assert_eq!(cfg.conversion.min_horizontal_gap, 5.0);
}

#[test]
fn empty_toml_uses_defaults() {
    let cfg: Config = toml::from_str("").expect("parse empty TOML");
    assert!(cfg.security.reject_url_inputs);
    assert!(!cfg.logging.write_to_file);
}
