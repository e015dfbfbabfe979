use brite_domain::constants::fields;
use brite_domain::submission::{FormData, Kit};
use serde_json::Value;
use tracing::debug;

/// Aligns `kits` with the provider list after the provider step.
///
/// Kits of removed providers are dropped unless they were entered by hand or have no
/// recipient yet. Every provider without a kit gets an empty one to fill in.
pub fn sync_kits(form: &mut FormData) {
    let names: Vec<String> = form
        .providers()
        .into_iter()
        .map(|p| p.provider_full_name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .collect();

    // Kept entries stay as sent; the typed view only decides which ones survive.
    let raw = form.get(fields::KITS).and_then(Value::as_array).cloned().unwrap_or_default();
    let before = raw.len();
    let (mut kits, mut entries): (Vec<Kit>, Vec<Value>) = form
        .kits()
        .into_iter()
        .zip(raw)
        .filter(|(kit, _)| {
            let recipient = kit.shipping_provider.trim();
            kit.is_custom() || recipient.is_empty() || names.iter().any(|n| n == recipient)
        })
        .unzip();
    let dropped = before - entries.len();

    let mut added = 0_usize;
    for name in &names {
        let covered =
            kits.iter().any(|kit| !kit.is_custom() && kit.shipping_provider.trim() == name);
        if !covered {
            let kit = Kit::for_provider(name.as_str());
            entries.push(serde_json::to_value(&kit).unwrap_or(Value::Null));
            kits.push(kit);
            added += 1;
        }
    }

    debug!(providers = names.len(), dropped, added, "Kits synchronized with providers");
    form.insert(fields::KITS, Value::Array(entries));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn drops_stale_and_adds_missing() {
        let mut form: FormData = serde_json::from_value(json!({
            "providers": [
                { "providerFullName": "Dr Kim", "email": "k@x.com", "selectedLocations": ["a"] },
                { "providerFullName": "Dr Roe", "email": "r@x.com", "selectedLocations": ["a"] }
            ],
            "kits": [
                { "shippingProvider": "Dr Kim", "shippingLocation": "1 Main St" },
                { "shippingProvider": "Dr Gone", "shippingLocation": "1 Main St" },
                { "shippingProvider": "Front Desk", "shippingLocation": "2 Side St", "isCustomRecipient": true },
                { "shippingProvider": "", "shippingLocation": "" }
            ]
        }))
        .unwrap();

        sync_kits(&mut form);

        let recipients: Vec<String> =
            form.kits().into_iter().map(|k| k.shipping_provider).collect();
        assert_eq!(recipients, vec!["Dr Kim", "Front Desk", "", "Dr Roe"]);
        assert_eq!(form.kits()[0].shipping_location, "1 Main St");
    }

    #[test]
    fn kept_kits_are_not_rewritten() {
        let custom = json!({
            "shippingProvider": "Front Desk",
            "shippingLocation": null,
            "isCustomRecipient": true,
            "quantity": 3
        });
        let mut form: FormData = serde_json::from_value(json!({
            "providers": [{ "providerFullName": "Dr Kim", "email": "k@x.com", "selectedLocations": ["a"] }],
            "kits": [custom.clone(), "not a kit"]
        }))
        .unwrap();

        sync_kits(&mut form);

        let kits = form.get("kits").and_then(Value::as_array).unwrap();
        assert_eq!(kits.len(), 3);
        assert_eq!(kits[0], custom);
        assert_eq!(kits[1], json!("not a kit"));
        assert_eq!(kits[2]["shippingProvider"], "Dr Kim");
    }

    #[test]
    fn custom_kit_does_not_cover_provider() {
        let mut form: FormData = serde_json::from_value(json!({
            "providers": [{ "providerFullName": "Dr Kim", "email": "k@x.com", "selectedLocations": ["a"] }],
            "kits": [{ "shippingProvider": "Dr Kim", "shippingLocation": "x", "isCustomRecipient": true }]
        }))
        .unwrap();

        sync_kits(&mut form);
        assert_eq!(form.kits().len(), 2);
    }
}
