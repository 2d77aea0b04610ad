use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use chrobry_core::Snapshot;

const SNAPSHOT_DOMAIN: &str = "chrobry";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "chrobry:v1";
/// Delimiter used to separate the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a session snapshot into a single-line transfer string.
pub(crate) fn encode(snapshot: &Snapshot) -> Result<String, TransferError> {
    let json = serde_json::to_vec(snapshot).map_err(TransferError::Serialize)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!("{SNAPSHOT_HEADER}{FIELD_DELIMITER}{encoded}"))
}

/// Decodes a session snapshot from its transfer string.
pub(crate) fn decode(value: &str) -> Result<Snapshot, TransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().ok_or(TransferError::MissingPrefix)?;
    let version = parts.next().ok_or(TransferError::MissingVersion)?;
    let payload = parts.next().ok_or(TransferError::MissingPayload)?;

    if domain != SNAPSHOT_DOMAIN {
        return Err(TransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != SNAPSHOT_VERSION {
        return Err(TransferError::UnsupportedVersion(version.to_owned()));
    }

    let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
    serde_json::from_slice(&bytes).map_err(TransferError::InvalidPayload)
}

/// Errors that can occur while encoding or decoding transfer strings.
#[derive(Debug, thiserror::Error)]
pub(crate) enum TransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("transfer string was empty")]
    EmptyPayload,
    /// The prefix segment was missing.
    #[error("transfer string is missing the prefix")]
    MissingPrefix,
    /// The version segment was missing.
    #[error("transfer string is missing the version")]
    MissingVersion,
    /// The payload segment was missing.
    #[error("transfer string is missing the payload")]
    MissingPayload,
    /// The prefix segment named another application.
    #[error("transfer prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The version segment is not understood by this build.
    #[error("transfer version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode snapshot payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The decoded payload is not a snapshot.
    #[error("could not parse snapshot payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The snapshot could not be serialised.
    #[error("could not serialise snapshot: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrobry_core::SpeciesId;
    use chrobry_world::{self as world, query, World};
    use glam::Vec2;

    fn populated_snapshot() -> Snapshot {
        let mut world = World::new();
        let mut events = Vec::new();
        world::apply(
            &mut world,
            chrobry_core::Command::SpawnNest {
                species: SpeciesId::VIPER,
                position: Vec2::new(120.0, 340.0),
                spawn_interval: std::time::Duration::from_secs(9),
            },
            &mut events,
        );
        let mut snapshot = query::snapshot(&world);
        let _ = snapshot
            .progression
            .nests_destroyed_by_species
            .insert(SpeciesId::WOLF, 2);
        snapshot
    }

    #[test]
    fn encoded_snapshot_uses_single_line_format() {
        let encoded = encode(&populated_snapshot()).expect("encodes");

        assert!(encoded.starts_with("chrobry:v1:"));
        assert!(!encoded.contains('\n'));
        assert_eq!(decode(&encoded).expect("decodes"), populated_snapshot());
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let encoded = format!("  {}\n", encode(&populated_snapshot()).expect("encodes"));

        assert!(decode(&encoded).is_ok());
    }

    #[test]
    fn decoding_rejects_malformed_strings() {
        assert!(matches!(decode("   "), Err(TransferError::EmptyPayload)));
        assert!(matches!(decode("chrobry"), Err(TransferError::MissingVersion)));
        assert!(matches!(
            decode("chrobry:v1"),
            Err(TransferError::MissingPayload)
        ));
        assert!(matches!(
            decode("arena:v1:abc"),
            Err(TransferError::InvalidPrefix(prefix)) if prefix == "arena"
        ));
        assert!(matches!(
            decode("chrobry:v2:abc"),
            Err(TransferError::UnsupportedVersion(version)) if version == "v2"
        ));
        assert!(matches!(
            decode("chrobry:v1:%%%"),
            Err(TransferError::InvalidEncoding(_))
        ));
        let not_json = STANDARD_NO_PAD.encode("not json");
        assert!(matches!(
            decode(&format!("chrobry:v1:{not_json}")),
            Err(TransferError::InvalidPayload(_))
        ));
    }

    #[test]
    fn legacy_payload_with_missing_fields_loads() {
        let payload = STANDARD_NO_PAD.encode(r#"{"player":{"hp":40}}"#);

        let snapshot = decode(&format!("{SNAPSHOT_HEADER}:{payload}")).expect("decodes");

        assert_eq!(snapshot.player.hp, 40);
        assert!(snapshot.nests.is_empty());
    }
}
