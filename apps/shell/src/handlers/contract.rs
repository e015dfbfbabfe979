use anyhow::{Context, Result};
use brite::domain::config::ContractConfig;
use brite::domain::submission::FormData;
use brite::features::contract::{Contract, ContractData, SignatureImage};
use std::path::Path;

/// Renders the agreement for the answers in `form` and writes it to `out`.
pub async fn render(config: &ContractConfig, form: &Path, signature: Option<&Path>, out: &Path) -> Result<()> {
    let raw = tokio::fs::read(form).await.with_context(|| format!("Failed to read {}", form.display()))?;
    let form: FormData = serde_json::from_slice(&raw).context("Form file is not a JSON object")?;

    let mut data = ContractData::from_form(&form, None)?;
    if let Some(path) = signature {
        let bytes = tokio::fs::read(path).await.with_context(|| format!("Failed to read {}", path.display()))?;
        data.signature = Some(SignatureImage::from_bytes(&bytes)?);
    }

    let pdf = Contract::build(config)?.render(&data)?;
    tokio::fs::write(out, &pdf).await.with_context(|| format!("Failed to write {}", out.display()))?;

    println!("Wrote {} ({} bytes)", out.display(), pdf.len());
    Ok(())
}
