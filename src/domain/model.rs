use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `POST /register_product` 的請求內容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRegistration {
    pub product_id: String,
}

/// `POST /transfer_ownership` 的請求內容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransfer {
    pub product_id: String,
    pub current_owner_public_key: String,
    pub new_owner_public_key: String,
}

/// 合約回傳的產品資料，只由 CLI 輸出解析而來
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub product_id: String,
    pub manufacturer: String,
    pub current_owner: String,
    pub registered_at: u64,
}

impl ProductDetails {
    pub fn registered_at_utc(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.registered_at)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteReceipt {
    pub status: String,
    pub message: String,
    pub cli_output: String,
}

impl WriteReceipt {
    pub fn success(message: &str, cli_output: String) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            cli_output,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_at_renders_as_utc() {
        let details = ProductDetails {
            product_id: "P1".to_string(),
            manufacturer: "M".to_string(),
            current_owner: "C".to_string(),
            registered_at: 1_700_000_000,
        };
        let ts = details.registered_at_utc().unwrap();
        assert_eq!(ts.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn test_transfer_requires_all_fields() {
        let partial = serde_json::json!({
            "product_id": "P1",
            "new_owner_public_key": "GNEW"
        });
        assert!(serde_json::from_value::<OwnershipTransfer>(partial).is_err());
    }
}
