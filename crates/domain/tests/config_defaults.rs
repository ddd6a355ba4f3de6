use docent_domain::config::{Config, ConfigSeverity};

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
}

#[test]
fn explicit_host_parses() {
    let toml_str = r#"
[server]
host = "0.0.0.0"
port = 9000
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
}

#[test]
fn default_retrieval_floor_and_cap() {
    let config = Config::default();
    assert_eq!(config.retrieval.top_k, 5);
    assert!((config.retrieval.min_similarity - 0.3).abs() < f32::EPSILON);
}

#[test]
fn default_history_keeps_four_turns() {
    let config = Config::default();
    assert_eq!(config.conversation.max_history_turns, 4);
}

#[test]
fn action_backends_default_to_unconfigured() {
    let config = Config::default();
    assert!(config.actions.delivery.is_none());
    assert!(config.actions.notify.is_none());
    assert!(config.actions.submissions.is_none());
}

#[test]
fn default_config_validates_without_errors() {
    let issues = Config::default().validate();
    assert!(
        issues
            .iter()
            .all(|i| i.severity != ConfigSeverity::Error),
        "default config should have no hard errors: {issues:?}"
    );
    // Unconfigured optional backends surface as warnings.
    assert!(issues.iter().any(|i| i.field == "actions.delivery"));
}

#[test]
fn out_of_range_similarity_floor_is_an_error() {
    let toml_str = r#"
[retrieval]
min_similarity = 1.5
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|i| i.severity == ConfigSeverity::Error && i.field == "retrieval.min_similarity"));
}

#[test]
fn delivery_section_parses_with_defaults() {
    let toml_str = r#"
[actions.delivery]
base_url = "http://127.0.0.1:8200"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let delivery = config.actions.delivery.expect("delivery configured");
    assert_eq!(delivery.document_id, "profile-dossier");
    assert_eq!(delivery.api_key_env, "DOCENT_DELIVERY_KEY");
}
