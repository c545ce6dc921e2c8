//! Manifest grammar: the structured document describing a composite stream.
//!
//! A manifest (stream descriptor) lists the content blobs that make up one
//! logical stream, in order. Manifests are themselves stored as blobs, named
//! by the hash of their serialized bytes like any other blob.

use serde::{Deserialize, Serialize};

/// Reference to one content blob within a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChunkRef {
    /// Hex-encoded hash of the referenced content blob.
    pub blob_hash: String,
    /// Position of this blob within the stream.
    pub index: u32,
    /// Length of the blob in bytes.
    pub length: u64,
}

/// A stream descriptor: the manifest document for one composite object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Hex-encoded hash identifying the stream as a whole.
    pub stream_hash: String,
    /// Suggested filename for the reassembled stream, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Ordered references to the stream's content blobs.
    pub chunks: Vec<ChunkRef>,
}

impl Manifest {
    /// Strictly parse manifest bytes. Unknown fields and missing required
    /// fields are rejected; this is the single grammar used both here and
    /// when manifests are created elsewhere in the system.
    pub fn parse(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }

    /// Serialize to the canonical JSON encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Manifest {
        Manifest {
            stream_hash: "ab".repeat(32),
            filename: Some("video.mp4".to_string()),
            chunks: vec![
                ChunkRef {
                    blob_hash: "cd".repeat(32),
                    index: 0,
                    length: 2_097_152,
                },
                ChunkRef {
                    blob_hash: "ef".repeat(32),
                    index: 1,
                    length: 1_048_576,
                },
            ],
        }
    }

    #[test]
    fn parse_round_trip() {
        let m = sample();
        let parsed = Manifest::parse(&m.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed, m);
    }

    #[test]
    fn filename_is_optional() {
        let json = format!(r#"{{"stream_hash":"{}","chunks":[]}}"#, "00".repeat(32));
        let m = Manifest::parse(json.as_bytes()).unwrap();
        assert!(m.filename.is_none());
        assert!(m.chunks.is_empty());
    }

    #[test]
    fn rejects_unknown_fields() {
        let json = format!(
            r#"{{"stream_hash":"{}","chunks":[],"extra":true}}"#,
            "00".repeat(32)
        );
        assert!(Manifest::parse(json.as_bytes()).is_err());
    }

    #[test]
    fn rejects_missing_required_fields() {
        assert!(Manifest::parse(br#"{"chunks":[]}"#).is_err());
    }

    #[test]
    fn rejects_arbitrary_json() {
        assert!(Manifest::parse(br#"{"some":"document"}"#).is_err());
        assert!(Manifest::parse(b"[1,2,3]").is_err());
        assert!(Manifest::parse(b"42").is_err());
    }

    #[test]
    fn rejects_binary_garbage() {
        assert!(Manifest::parse(&[0x00, 0xff, 0x13, 0x37]).is_err());
    }
}
