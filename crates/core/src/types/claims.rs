//! Identity claims of the signed-in user.
//!
//! The identity service issues tokens carrying profile claims (name, postal
//! address, contact details). Consumers look them up through [`ClaimKey`]
//! instead of scanning claim sets by string.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Profile claims the web front-end knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClaimKey {
    Name,
    LastName,
    Street,
    City,
    State,
    ZipCode,
    Country,
    Email,
    PhoneNumber,
}

impl ClaimKey {
    /// Every known key, in profile order.
    pub const ALL: [Self; 9] = [
        Self::Name,
        Self::LastName,
        Self::Street,
        Self::City,
        Self::State,
        Self::ZipCode,
        Self::Country,
        Self::Email,
        Self::PhoneNumber,
    ];

    /// Claim type as it appears in the token.
    #[must_use]
    pub const fn claim_type(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::LastName => "last_name",
            Self::Street => "address_street",
            Self::City => "address_city",
            Self::State => "address_state",
            Self::ZipCode => "address_zip_code",
            Self::Country => "address_country",
            Self::Email => "email",
            Self::PhoneNumber => "phone_number",
        }
    }

    /// Look up a key by its claim type.
    #[must_use]
    pub fn from_claim_type(claim_type: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.claim_type() == claim_type)
    }
}

/// Snapshot of the user's profile claims.
///
/// Built once from the credential's claim set; absent claims stay absent and
/// read back as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfileClaims {
    values: BTreeMap<ClaimKey, String>,
}

impl UserProfileClaims {
    /// Resolve profile claims from `(claim_type, value)` pairs.
    ///
    /// Unknown claim types are ignored. When a claim type repeats, the first
    /// value wins.
    pub fn from_pairs<'a, I>(claims: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut values = BTreeMap::new();
        for (claim_type, value) in claims {
            if let Some(key) = ClaimKey::from_claim_type(claim_type) {
                values.entry(key).or_insert_with(|| value.to_owned());
            }
        }
        Self { values }
    }

    /// Resolve profile claims from a decoded token payload.
    ///
    /// String claims are taken verbatim; numbers and booleans use their JSON
    /// text. Arrays take their first string element.
    #[must_use]
    pub fn from_json(claims: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut values = BTreeMap::new();
        for key in ClaimKey::ALL {
            let value = match claims.get(key.claim_type()) {
                Some(serde_json::Value::String(s)) => Some(s.clone()),
                Some(serde_json::Value::Array(items)) => items
                    .iter()
                    .find_map(serde_json::Value::as_str)
                    .map(str::to_owned),
                Some(v @ (serde_json::Value::Number(_) | serde_json::Value::Bool(_))) => {
                    Some(v.to_string())
                }
                _ => None,
            };
            if let Some(value) = value {
                values.insert(key, value);
            }
        }
        Self { values }
    }

    /// Returns the claim value, if present.
    #[must_use]
    pub fn get(&self, key: ClaimKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    /// Returns the claim value, or `""` when absent.
    #[must_use]
    pub fn value_or_empty(&self, key: ClaimKey) -> &str {
        self.get(key).unwrap_or("")
    }

    /// Profile view with every field populated.
    #[must_use]
    pub fn user_info(&self) -> UserInfo<'_> {
        UserInfo {
            name: self.value_or_empty(ClaimKey::Name),
            last_name: self.value_or_empty(ClaimKey::LastName),
            street: self.value_or_empty(ClaimKey::Street),
            city: self.value_or_empty(ClaimKey::City),
            state: self.value_or_empty(ClaimKey::State),
            zip_code: self.value_or_empty(ClaimKey::ZipCode),
            country: self.value_or_empty(ClaimKey::Country),
            email: self.value_or_empty(ClaimKey::Email),
            phone_number: self.value_or_empty(ClaimKey::PhoneNumber),
        }
    }
}

/// Serialized shape of the user's profile, as handed to the chat model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserInfo<'a> {
    pub name: &'a str,
    pub last_name: &'a str,
    pub street: &'a str,
    pub city: &'a str,
    pub state: &'a str,
    pub zip_code: &'a str,
    pub country: &'a str,
    pub email: &'a str,
    pub phone_number: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_key_round_trip() {
        for key in ClaimKey::ALL {
            assert_eq!(ClaimKey::from_claim_type(key.claim_type()), Some(key));
        }
        assert_eq!(ClaimKey::from_claim_type("sub"), None);
    }

    #[test]
    fn test_from_pairs_first_value_wins() {
        let claims = UserProfileClaims::from_pairs([
            ("email", "first@example.com"),
            ("email", "second@example.com"),
            ("sub", "ignored"),
        ]);
        assert_eq!(claims.get(ClaimKey::Email), Some("first@example.com"));
        assert_eq!(claims.get(ClaimKey::Name), None);
    }

    #[test]
    fn test_missing_claims_read_as_empty() {
        let claims = UserProfileClaims::default();
        for key in ClaimKey::ALL {
            assert_eq!(claims.value_or_empty(key), "");
        }
    }

    #[test]
    fn test_from_json_handles_non_string_values() {
        let payload = serde_json::json!({
            "name": "Ada",
            "address_zip_code": 98052,
            "email": ["ada@example.com", "other@example.com"],
            "phone_number": null,
        });
        let map = payload.as_object().expect("object");
        let claims = UserProfileClaims::from_json(map);
        assert_eq!(claims.get(ClaimKey::Name), Some("Ada"));
        assert_eq!(claims.get(ClaimKey::ZipCode), Some("98052"));
        assert_eq!(claims.get(ClaimKey::Email), Some("ada@example.com"));
        assert_eq!(claims.get(ClaimKey::PhoneNumber), None);
    }

    #[test]
    fn test_user_info_uses_pascal_case_keys() {
        let claims = UserProfileClaims::from_pairs([("last_name", "Lovelace")]);
        let json = serde_json::to_value(claims.user_info()).expect("serialize");
        assert_eq!(json["LastName"], "Lovelace");
        assert_eq!(json["ZipCode"], "");
        assert_eq!(json["PhoneNumber"], "");
        assert_eq!(json.as_object().map(serde_json::Map::len), Some(9));
    }
}
