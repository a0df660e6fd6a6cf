//! Deterministic identifiers derived from coordinates.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};
use stratum_common::constants::EXTERNAL_ID_PREFIX;
use stratum_common::types::Coordinate;
use uuid::Uuid;

/// Returns the external id used to find a settings object or segment
/// again on later deployments.
#[must_use]
pub fn external_id(coordinate: &Coordinate) -> String {
    let digest = Sha256::digest(coordinate.to_string().as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("{EXTERNAL_ID_PREFIX}{hex}")
}

/// Returns the stable automation object id of a coordinate.
#[must_use]
pub fn automation_id(coordinate: &Coordinate) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, coordinate.to_string().as_bytes()).to_string()
}

/// Returns the bucket name of a coordinate: `<project>_<configId>`,
/// lowercased, with every character outside `[a-z0-9_-]` replaced by `_`.
#[must_use]
pub fn bucket_name(coordinate: &Coordinate) -> String {
    format!("{}_{}", coordinate.project, coordinate.config_id)
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Decodes the legacy numeric id carried by a settings object id: the last
/// eight bytes of the URL-safe base64 payload, big-endian.
#[must_use]
pub fn decode_legacy_id(object_id: &str) -> Option<i64> {
    let bytes = URL_SAFE_NO_PAD
        .decode(object_id.trim_end_matches('='))
        .ok()?;
    let tail: [u8; 8] = bytes.get(bytes.len().checked_sub(8)?..)?.try_into().ok()?;
    Some(i64::from_be_bytes(tail))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord() -> Coordinate {
        Coordinate::new("Infra", "builtin:tags.auto-tagging", "My Tag.v2")
    }

    #[test]
    fn external_id_is_prefixed_and_stable() {
        let a = external_id(&coord());
        let b = external_id(&coord());
        assert_eq!(a, b);
        assert!(a.starts_with("stratum:"));
        assert_eq!(a.len(), "stratum:".len() + 64);
        assert_ne!(a, external_id(&Coordinate::new("Infra", "x", "y")));
    }

    #[test]
    fn automation_id_is_a_stable_uuid() {
        let id = automation_id(&coord());
        assert_eq!(id, automation_id(&coord()));
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn bucket_name_is_sanitized() {
        assert_eq!(bucket_name(&coord()), "infra_my_tag_v2");
    }

    #[test]
    fn legacy_id_decodes_trailing_bytes() {
        let mut raw = vec![1, 2, 3];
        raw.extend_from_slice(&(-5_i64).to_be_bytes());
        let encoded = URL_SAFE_NO_PAD.encode(raw);
        assert_eq!(decode_legacy_id(&encoded), Some(-5));
    }

    #[test]
    fn legacy_id_rejects_short_or_invalid_input() {
        assert_eq!(decode_legacy_id(&URL_SAFE_NO_PAD.encode([1, 2])), None);
        assert_eq!(decode_legacy_id("%%%"), None);
    }
}
