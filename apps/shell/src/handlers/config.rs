use anyhow::{Result, bail};
use brite::domain::config::ApiConfig;

/// Prints the effective settings with the Stripe key masked.
pub fn check(config: &ApiConfig) -> Result<()> {
    let secret = &config.payment.secret_key;
    let masked = if secret.is_empty() {
        "<unset>".to_owned()
    } else {
        format!("{}…", secret.chars().take(8).collect::<String>())
    };

    println!("server.address        {}:{}", config.server.address, config.server.port);
    println!("server.ssl            {}", config.server.ssl.is_some());
    println!("cors.allowed_origin   {}", config.cors.allowed_origin);
    println!("payment.secret_key    {masked}");
    println!("payment.api_base      {}", config.payment.api_base);
    println!("payment.default_price {}", config.payment.default_price_id.as_deref().unwrap_or("<unset>"));
    println!("relay.webhook_url     {}", config.relay.webhook_url);
    println!("relay.max_attempts    {}", config.relay.max_attempts);
    println!("relay.failed_dir      {}", config.relay.failed_dir.display());
    println!(
        "contract.counter_sig  {}",
        config.contract.counter_signature.as_ref().map_or_else(|| "<unset>".to_owned(), |p| p.display().to_string())
    );

    let missing = config.missing_required();
    if !missing.is_empty() {
        bail!("Missing required configuration: {}", missing.join(", "));
    }
    println!("Configuration OK");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_missing_settings() {
        let err = check(&ApiConfig::default()).unwrap_err();
        assert!(err.to_string().contains("payment.secret_key"));
    }

    #[test]
    fn accepts_a_complete_config() {
        let mut config = ApiConfig::default();
        config.payment.secret_key = "sk_test_123456789".to_owned();
        config.relay.webhook_url = "https://hooks.example.com/brite".to_owned();
        check(&config).unwrap();
    }
}
