use anyhow::{Context, Result, bail};
use brite::domain::config::RelayConfig;
use brite::features::relay::{DeadLetterStore, Delivery, Forwarder};
use tracing::{info, warn};

async fn store(config: &RelayConfig) -> Result<DeadLetterStore> {
    DeadLetterStore::open_existing(&config.failed_dir)
        .await
        .with_context(|| format!("No dead letters in {}", config.failed_dir.display()))
}

pub async fn list(config: &RelayConfig) -> Result<()> {
    let store = store(config).await?;
    let names = store.list().await?;

    if names.is_empty() {
        println!("No dead letters in {}", store.root().display());
        return Ok(());
    }

    for name in &names {
        match store.load(name).await {
            Ok(letter) => println!("{name}  {}  {} error(s)", letter.timestamp, letter.errors.len()),
            Err(e) => println!("{name}  unreadable: {e}"),
        }
    }
    println!("{} dead letter(s)", names.len());
    Ok(())
}

pub async fn show(config: &RelayConfig, file: &str) -> Result<()> {
    let letter = store(config).await?.load(file).await?;
    println!("{}", serde_json::to_string_pretty(&letter)?);
    Ok(())
}

pub async fn replay(config: &RelayConfig, file: &str, keep: bool) -> Result<()> {
    if config.webhook_url.trim().is_empty() {
        bail!("relay.webhook_url is not configured");
    }

    let forwarder = Forwarder::new(config, store(config).await?)?;
    match forwarder.replay(file, keep).await? {
        Delivery::Delivered { .. } => {
            info!(file, keep, "Dead letter replayed");
            if keep {
                println!("Delivered {file} (kept)");
            } else {
                println!("Delivered and removed {file}");
            }
        },
        Delivery::DeadLettered { .. } => {
            warn!(file, "Webhook rejected replayed dead letter");
            bail!("Webhook rejected {file}; the file is unchanged");
        },
    }
    Ok(())
}

pub async fn purge(config: &RelayConfig, file: &str) -> Result<()> {
    store(config).await?.remove(file).await?;
    info!(file, "Dead letter purged");
    println!("Removed {file}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(dir: &tempfile::TempDir) -> RelayConfig {
        RelayConfig { failed_dir: dir.path().to_path_buf(), ..RelayConfig::default() }
    }

    #[tokio::test]
    async fn purge_removes_a_letter() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let store = DeadLetterStore::open(&config.failed_dir).await.unwrap();
        let name = store.record(&json!({ "practiceName": "Glow" }), &[]).await.unwrap();

        show(&config, &name).await.unwrap();
        purge(&config, &name).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert!(purge(&config, &name).await.is_err());
    }

    #[tokio::test]
    async fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = RelayConfig { failed_dir: dir.path().join("absent"), ..RelayConfig::default() };
        assert!(list(&config).await.is_err());
        assert!(!config.failed_dir.exists());
    }

    #[tokio::test]
    async fn replay_delivers_and_removes() {
        let webhook = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&webhook)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = RelayConfig { webhook_url: format!("{}/hook", webhook.uri()), ..config(&dir) };
        let store = DeadLetterStore::open(&config.failed_dir).await.unwrap();
        let name = store.record(&json!({ "practiceName": "Glow" }), &[]).await.unwrap();

        replay(&config, &name, false).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_replay_keeps_the_letter() {
        let webhook = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(503)).mount(&webhook).await;

        let dir = tempfile::tempdir().unwrap();
        let config = RelayConfig { webhook_url: format!("{}/hook", webhook.uri()), ..config(&dir) };
        let store = DeadLetterStore::open(&config.failed_dir).await.unwrap();
        let name = store.record(&json!({ "practiceName": "Glow" }), &[]).await.unwrap();

        let err = replay(&config, &name, false).await.unwrap_err();
        assert!(err.to_string().contains("unchanged"), "{err}");
        assert_eq!(store.list().await.unwrap(), vec![name]);
    }

    #[tokio::test]
    async fn replay_needs_a_webhook() {
        let dir = tempfile::tempdir().unwrap();
        let err = replay(&config(&dir), "failed-x.json", false).await.unwrap_err();
        assert!(err.to_string().contains("webhook_url"));
    }
}
