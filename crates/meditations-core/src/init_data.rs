//! Telegram WebApp `initData` verification.
//!
//! Telegram signs the launch parameters it hands to a Mini-App. The check:
//!
//! 1. parse `initData` as a URL query string and take out `hash`
//! 2. data-check string = remaining `key=value` pairs sorted by key, joined by `\n`
//! 3. `secret = HMAC_SHA256(key = "WebAppData", msg = bot_token)`
//! 4. valid iff `hex(HMAC_SHA256(key = secret, msg = data_check_string)) == hash`

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use meditations_models::TelegramUser;
use sha2::Sha256;
use url::form_urlencoded;

use crate::error::{Result, ServiceError};

type HmacSha256 = Hmac<Sha256>;

fn mac_for(key: &[u8]) -> HmacSha256 {
    HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length")
}

/// Fields of a verified `initData` string.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedInitData {
    /// The signed user object, if present.
    pub user: Option<TelegramUser>,
    /// When Telegram issued the data.
    pub auth_date: Option<DateTime<Utc>>,
    /// Every signed field, raw.
    pub fields: BTreeMap<String, String>,
}

/// Verifies `initData` strings against one bot's token.
#[derive(Clone)]
pub struct InitDataVerifier {
    secret_key: Vec<u8>,
    max_age: Option<Duration>,
}

impl std::fmt::Debug for InitDataVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitDataVerifier")
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}

impl InitDataVerifier {
    /// Creates a verifier for the bot owning `bot_token`.
    pub fn new(bot_token: &str) -> Self {
        let mut mac = mac_for(b"WebAppData");
        mac.update(bot_token.as_bytes());
        Self {
            secret_key: mac.finalize().into_bytes().to_vec(),
            max_age: None,
        }
    }

    /// Rejects data whose `auth_date` is older than `max_age`.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    fn data_check_string(fields: &BTreeMap<String, String>) -> String {
        fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Verifies `init_data` as of now.
    pub fn verify(&self, init_data: &str) -> Result<VerifiedInitData> {
        self.verify_at(init_data, Utc::now())
    }

    /// Verifies `init_data` as of `now`.
    pub fn verify_at(&self, init_data: &str, now: DateTime<Utc>) -> Result<VerifiedInitData> {
        let mut fields: BTreeMap<String, String> = form_urlencoded::parse(init_data.as_bytes())
            .into_owned()
            .collect();

        let hash = fields
            .remove("hash")
            .ok_or_else(|| ServiceError::InvalidInitData("missing hash".to_string()))?;
        let expected = hex::decode(hash.trim())
            .map_err(|_| ServiceError::InvalidInitData("malformed hash".to_string()))?;

        let mut mac = mac_for(&self.secret_key);
        mac.update(Self::data_check_string(&fields).as_bytes());
        mac.verify_slice(&expected)
            .map_err(|_| ServiceError::InvalidInitData("signature mismatch".to_string()))?;

        let auth_date = fields
            .get("auth_date")
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0));

        if let Some(max_age) = self.max_age {
            match auth_date {
                Some(issued) if now - issued <= max_age => {}
                _ => return Err(ServiceError::InitDataExpired),
            }
        }

        let user = match fields.get("user") {
            Some(raw) => Some(serde_json::from_str::<TelegramUser>(raw).map_err(|e| {
                ServiceError::InvalidInitData(format!("malformed user: {}", e))
            })?),
            None => None,
        };

        Ok(VerifiedInitData {
            user,
            auth_date,
            fields,
        })
    }

    /// Produces a signed `initData` query string for the given fields.
    ///
    /// This is what Telegram does on its side; useful for fakes and tooling.
    pub fn sign(&self, fields: &[(&str, &str)]) -> String {
        let sorted: BTreeMap<String, String> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let mut mac = mac_for(&self.secret_key);
        mac.update(Self::data_check_string(&sorted).as_bytes());
        let hash = hex::encode(mac.finalize().into_bytes());

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in &sorted {
            serializer.append_pair(k, v);
        }
        serializer.append_pair("hash", &hash);
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "123456:TEST-token";
    const USER: &str = r#"{"id":42,"first_name":"Ann","username":"ann"}"#;

    // Signed independently of this module.
    const SIGNED: &str = "auth_date=1756900000&query_id=AAH&user=%7B%22id%22%3A42%2C%22first_name%22%3A%22Ann%22%2C%22username%22%3A%22ann%22%7D&hash=9c1405be9e9586f3fb7aab042ea98ab1b0605d9387c2f8a1a1ba6aa049c1938d";

    fn issued() -> DateTime<Utc> {
        DateTime::from_timestamp(1_756_900_000, 0).unwrap()
    }

    #[test]
    fn test_verify_known_vector() {
        let verifier = InitDataVerifier::new(TOKEN);
        let data = verifier.verify_at(SIGNED, issued()).unwrap();

        let user = data.user.unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.first_name, "Ann");
        assert_eq!(user.username.as_deref(), Some("ann"));
        assert_eq!(data.auth_date, Some(issued()));
        assert_eq!(data.fields.get("query_id").map(String::as_str), Some("AAH"));
    }

    #[test]
    fn test_wrong_token_rejected() {
        let verifier = InitDataVerifier::new("654321:other");
        let result = verifier.verify_at(SIGNED, issued());
        assert!(matches!(result, Err(ServiceError::InvalidInitData(_))));
    }

    #[test]
    fn test_tampered_field_rejected() {
        let verifier = InitDataVerifier::new(TOKEN);
        let tampered = SIGNED.replace("%3A42", "%3A43");
        assert!(verifier.verify_at(&tampered, issued()).is_err());
    }

    #[test]
    fn test_missing_hash_rejected() {
        let verifier = InitDataVerifier::new(TOKEN);
        let result = verifier.verify_at("auth_date=1&user=%7B%7D", issued());
        assert!(matches!(result, Err(ServiceError::InvalidInitData(msg)) if msg == "missing hash"));
    }

    #[test]
    fn test_malformed_hash_rejected() {
        let verifier = InitDataVerifier::new(TOKEN);
        let result = verifier.verify_at("auth_date=1&hash=zz", issued());
        assert!(matches!(result, Err(ServiceError::InvalidInitData(msg)) if msg == "malformed hash"));
    }

    #[test]
    fn test_sign_matches_known_vector() {
        let verifier = InitDataVerifier::new(TOKEN);
        let signed = verifier.sign(&[
            ("user", USER),
            ("query_id", "AAH"),
            ("auth_date", "1756900000"),
        ]);
        assert_eq!(signed, SIGNED);
    }

    #[test]
    fn test_max_age() {
        let verifier = InitDataVerifier::new(TOKEN).with_max_age(Duration::hours(1));

        assert!(verifier
            .verify_at(SIGNED, issued() + Duration::minutes(30))
            .is_ok());
        assert!(matches!(
            verifier.verify_at(SIGNED, issued() + Duration::hours(2)),
            Err(ServiceError::InitDataExpired)
        ));
    }

    #[test]
    fn test_max_age_requires_auth_date() {
        let verifier = InitDataVerifier::new(TOKEN).with_max_age(Duration::hours(1));
        let signed = verifier.sign(&[("user", USER)]);
        assert!(matches!(
            verifier.verify_at(&signed, issued()),
            Err(ServiceError::InitDataExpired)
        ));
    }
}
