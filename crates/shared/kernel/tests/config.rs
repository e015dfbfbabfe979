use brite_kernel::config::load_config;
use brite_kernel::domain::config::ApiConfig;
use std::io::Write;

const SAMPLE: &str = r#"
[server]
port = 8081

[payment]
secret_key = "sk_test_file"
default_price_id = "price_file"

[relay]
webhook_url = "https://script.example/exec"
max_attempts = 3
"#;

#[test]
fn loads_file_values() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();

    let cfg: ApiConfig = load_config(Some(file.path())).unwrap();
    assert_eq!(cfg.server.port, 8081);
    assert_eq!(cfg.payment.secret_key, "sk_test_file");
    assert_eq!(cfg.relay.max_attempts, 3);
    assert_eq!(cfg.relay.base_delay_ms, 1000);
    assert!(cfg.missing_required().is_empty());
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result: Result<ApiConfig, _> = load_config(Some(dir.path().join("absent.toml")));
    assert!(result.is_err());
}
