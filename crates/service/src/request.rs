//! Typed request payloads.
//!
//! Each write operation has its own struct, deserialized from the request's
//! JSON data and validated before anything reaches the core. Unknown fields
//! are ignored. Numbers may arrive as JSON numbers or numeric strings, and
//! prefix lists as arrays or comma separated strings.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Result, ServiceError};

/// Fields accepted by a group create/update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GroupWriteRequest {
    /// Required when the group does not exist yet.
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub persistent_keepalive: Option<u32>,
    /// Lease TTL in seconds; 0 or unset means the default.
    #[serde(default, deserialize_with = "lenient::duration_secs")]
    pub ttl: Option<u64>,
    #[serde(default, deserialize_with = "lenient::duration_secs")]
    pub max_ttl: Option<u64>,
}

/// Fields accepted by a peer create/update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PeerWriteRequest {
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub allowed_ips: Option<Vec<String>>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub port: Option<u16>,
    #[serde(default)]
    pub private_key: Option<String>,
    #[serde(default)]
    pub public_key: Option<String>,
}

impl GroupWriteRequest {
    pub fn from_data(data: Value) -> Result<Self> {
        from_data(data)
    }
}

impl PeerWriteRequest {
    pub fn from_data(data: Value) -> Result<Self> {
        from_data(data)
    }
}

fn from_data<T: serde::de::DeserializeOwned + Default>(data: Value) -> Result<T> {
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data)
        .map_err(|e| ServiceError::validation(format!("invalid request: {e}")))
}

/// Lowercase a group or peer name and check it is usable as a path segment.
///
/// Names are one or more ASCII word characters, `-` or `.`, starting and ending with
/// a word character.
pub fn normalize_name(kind: &str, name: &str) -> Result<String> {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return Err(ServiceError::validation(format!("missing {kind} name")));
    }

    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let valid_inner = name.chars().all(|c| is_word(c) || c == '-' || c == '.');
    let valid_ends = name.starts_with(is_word) && name.ends_with(is_word);
    if !valid_inner || !valid_ends {
        return Err(ServiceError::validation(format!("invalid {kind} name {name:?}")));
    }
    Ok(name)
}

/// Treat an empty string the same as an absent field.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) mod lenient {
    use super::*;
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrString {
        List(Vec<String>),
        String(String),
    }

    pub fn number<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<u64> + FromStr,
    {
        use serde::de::Error;

        match Option::<NumberOrString>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberOrString::Number(n)) => T::try_from(n)
                .map(Some)
                .map_err(|_| D::Error::custom(format!("number {n} out of range"))),
            Some(NumberOrString::String(s)) if s.trim().is_empty() => Ok(None),
            Some(NumberOrString::String(s)) => s
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid number {s:?}"))),
        }
    }

    /// Seconds as a number, or a string like `90`, `90s`, `15m`, `2h`.
    pub fn duration_secs<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        match Option::<NumberOrString>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberOrString::Number(n)) => Ok(Some(n)),
            Some(NumberOrString::String(s)) => parse_duration(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid duration {s:?}"))),
        }
    }

    pub fn string_list<'de, D>(
        deserializer: D,
    ) -> std::result::Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let list = match Option::<ListOrString>::deserialize(deserializer)? {
            None => return Ok(None),
            Some(ListOrString::List(items)) => items,
            Some(ListOrString::String(s)) => s.split(',').map(str::to_string).collect(),
        };
        Ok(Some(
            list.into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        ))
    }

    pub(crate) fn parse_duration(input: &str) -> Option<u64> {
        let input = input.trim();
        let (digits, scale) = match input.char_indices().last()? {
            (i, 's') => (&input[..i], 1),
            (i, 'm') => (&input[..i], 60),
            (i, 'h') => (&input[..i], 3600),
            _ => (input, 1),
        };
        digits.parse::<u64>().ok()?.checked_mul(scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_group_request_fields() {
        let req = GroupWriteRequest::from_data(json!({
            "network": "10.0.0.0/24",
            "persistent_keepalive": 30,
            "ttl": "2m",
            "max_ttl": 600
        }))
        .unwrap();

        assert_eq!(req.network.as_deref(), Some("10.0.0.0/24"));
        assert_eq!(req.persistent_keepalive, Some(30));
        assert_eq!(req.ttl, Some(120));
        assert_eq!(req.max_ttl, Some(600));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let req = PeerWriteRequest::from_data(json!({"persistent_keepalive": 30})).unwrap();
        assert_eq!(req, PeerWriteRequest::default());
    }

    #[test]
    fn test_malformed_field_rejected() {
        let err = GroupWriteRequest::from_data(json!({"ttl": [1, 2]})).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn test_peer_request_lenient_forms() {
        let req = PeerWriteRequest::from_data(json!({
            "allowed_ips": "10.20.0.0/24, 10.30.0.0/24",
            "port": "51820"
        }))
        .unwrap();
        assert_eq!(
            req.allowed_ips,
            Some(vec!["10.20.0.0/24".to_string(), "10.30.0.0/24".to_string()])
        );
        assert_eq!(req.port, Some(51820));

        let req = PeerWriteRequest::from_data(json!({"allowed_ips": ["10.1.0.0/16"]})).unwrap();
        assert_eq!(req.allowed_ips, Some(vec!["10.1.0.0/16".to_string()]));
    }

    #[test]
    fn test_port_out_of_range() {
        assert!(PeerWriteRequest::from_data(json!({"port": 70000})).is_err());
        assert!(PeerWriteRequest::from_data(json!({"port": "http"})).is_err());
    }

    #[test]
    fn test_empty_data() {
        assert_eq!(PeerWriteRequest::from_data(Value::Null).unwrap(), PeerWriteRequest::default());
        assert_eq!(PeerWriteRequest::from_data(json!({})).unwrap(), PeerWriteRequest::default());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(lenient::parse_duration("45"), Some(45));
        assert_eq!(lenient::parse_duration("45s"), Some(45));
        assert_eq!(lenient::parse_duration("3m"), Some(180));
        assert_eq!(lenient::parse_duration("1h"), Some(3600));
        assert_eq!(lenient::parse_duration("soon"), None);
        assert_eq!(lenient::parse_duration(""), None);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("group", "MyGroup").unwrap(), "mygroup");
        assert_eq!(normalize_name("peer", "edge-01.lan").unwrap(), "edge-01.lan");
        assert!(normalize_name("peer", "").is_err());
        assert!(normalize_name("peer", "-edge").is_err());
        assert!(normalize_name("peer", "a/b").is_err());
        assert!(normalize_name("peer", "config.").is_err());
    }

    #[test]
    fn test_normalize_name_ascii_only() {
        assert!(normalize_name("group", "grüppe").is_err());
        assert!(normalize_name("peer", "пир").is_err());
        assert!(normalize_name("peer", "peer٣").is_err());
        assert_eq!(normalize_name("peer", "Peer_3").unwrap(), "peer_3");
    }
}
