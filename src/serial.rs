//! Persisted form of a compiled [`FilterChain`](crate::FilterChain).
//!
//! Compiling a large allow list is cheap but not free; a service that starts
//! often can cache the compiled chain on disk and reload it. A blob is a
//! 32-byte header followed by a bincode payload.
//!
//! ```text
//! bytes   field
//! 0..4    magic, b"UMFL"
//! 4..6    layout version, u16 LE; must equal the reader's
//! 6..8    writer crate version, u16 LE; informational
//! 8..12   reserved, zero
//! 12..16  payload length, u32 LE
//! 16..32  first 16 bytes of the payload's BLAKE3 hash
//! 32..    payload
//! ```
//!
//! Decoded chains are validated against the same invariants the compiler
//! guarantees, so a blob cannot smuggle in a rule the grammar would refuse.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{FilterChain, Limit, Polarity, Rule};

const MAGIC: &[u8; 4] = b"UMFL";
const LAYOUT_VERSION: u16 = 1;
const WRITER_VERSION: u16 = 1;
const HEADER_LEN: usize = 32;
const DIGEST_LEN: usize = 16;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure to produce a filter blob.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("cannot encode filter chain: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("cannot write filter blob: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to load a filter blob.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not a filter blob: magic bytes differ")]
    BadMagic,

    #[error("filter blob layout v{blob} is not readable by this build (expects v{supported})")]
    IncompatibleVersion { blob: u16, supported: u16 },

    #[error("filter blob is corrupt: payload digest differs")]
    ChecksumMismatch,

    #[error("filter blob is truncated: need {expected} bytes, have {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("cannot decode filter payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("filter blob holds an invalid chain: {0}")]
    Validation(String),

    #[error("cannot read filter blob: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Payload model
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct StoredChain {
    metadata: StoredMeta,
    rules: Vec<StoredRule>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredMeta {
    rule_count: usize,
    source_digest: Option<[u8; 32]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum StoredRule {
    Limit {
        limit: StoredLimit,
        max: u64,
    },
    Exact {
        deny: bool,
        classes: Vec<String>,
    },
    Package {
        deny: bool,
        package: String,
    },
    Hierarchy {
        deny: bool,
        prefix: String,
    },
    Prefix {
        deny: bool,
        prefix: String,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum StoredLimit {
    MaxDepth,
    MaxArray,
    MaxRefs,
    MaxBytes,
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

fn serialize_limit(limit: Limit) -> StoredLimit {
    match limit {
        Limit::MaxDepth => StoredLimit::MaxDepth,
        Limit::MaxArray => StoredLimit::MaxArray,
        Limit::MaxRefs => StoredLimit::MaxRefs,
        Limit::MaxBytes => StoredLimit::MaxBytes,
    }
}

fn deserialize_limit(limit: StoredLimit) -> Limit {
    match limit {
        StoredLimit::MaxDepth => Limit::MaxDepth,
        StoredLimit::MaxArray => Limit::MaxArray,
        StoredLimit::MaxRefs => Limit::MaxRefs,
        StoredLimit::MaxBytes => Limit::MaxBytes,
    }
}

fn is_deny(polarity: Polarity) -> bool {
    polarity == Polarity::Deny
}

fn polarity_of(deny: bool) -> Polarity {
    if deny {
        Polarity::Deny
    } else {
        Polarity::Allow
    }
}

// ---------------------------------------------------------------------------
// Rule conversion
// ---------------------------------------------------------------------------

fn serialize_rule(rule: &Rule) -> StoredRule {
    match rule {
        Rule::Limit { limit, max } => StoredRule::Limit {
            limit: serialize_limit(*limit),
            max: *max,
        },
        Rule::Exact { polarity, classes } => {
            // Sorted for deterministic output
            let mut classes: Vec<String> = classes.iter().cloned().collect();
            classes.sort_unstable();
            StoredRule::Exact {
                deny: is_deny(*polarity),
                classes,
            }
        }
        Rule::Package { polarity, package } => StoredRule::Package {
            deny: is_deny(*polarity),
            package: package.clone(),
        },
        Rule::Hierarchy { polarity, prefix } => StoredRule::Hierarchy {
            deny: is_deny(*polarity),
            prefix: prefix.clone(),
        },
        Rule::Prefix { polarity, prefix } => StoredRule::Prefix {
            deny: is_deny(*polarity),
            prefix: prefix.clone(),
        },
    }
}

fn deserialize_rule(rule: StoredRule) -> Rule {
    match rule {
        StoredRule::Limit { limit, max } => Rule::Limit {
            limit: deserialize_limit(limit),
            max,
        },
        StoredRule::Exact { deny, classes } => Rule::Exact {
            polarity: polarity_of(deny),
            classes: classes.into_iter().collect::<HashSet<_>>(),
        },
        StoredRule::Package { deny, package } => Rule::Package {
            polarity: polarity_of(deny),
            package,
        },
        StoredRule::Hierarchy { deny, prefix } => Rule::Hierarchy {
            polarity: polarity_of(deny),
            prefix,
        },
        StoredRule::Prefix { deny, prefix } => Rule::Prefix {
            polarity: polarity_of(deny),
            prefix,
        },
    }
}

fn chain_to_serialized(chain: &FilterChain, source_text: Option<&str>) -> StoredChain {
    let source_digest = source_text.map(|s| *blake3::hash(s.as_bytes()).as_bytes());

    StoredChain {
        metadata: StoredMeta {
            rule_count: chain.rules.len(),
            source_digest,
        },
        rules: chain.rules.iter().map(serialize_rule).collect(),
    }
}

fn serialized_to_chain(ser: StoredChain) -> Result<FilterChain, DeserializeError> {
    validate(&ser)?;

    Ok(FilterChain {
        rules: ser.rules.into_iter().map(deserialize_rule).collect(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(ser: &StoredChain) -> Result<(), DeserializeError> {
    let rule_count = ser.rules.len();

    if ser.metadata.rule_count != rule_count {
        return Err(DeserializeError::Validation(format!(
            "metadata counts {} rules, payload carries {}",
            ser.metadata.rule_count, rule_count
        )));
    }

    if rule_count == 0 {
        return Err(DeserializeError::Validation(
            "chain is empty".to_owned(),
        ));
    }

    let mut exact_sets = [false; 2];
    for (idx, rule) in ser.rules.iter().enumerate() {
        if let StoredRule::Exact { deny, .. } = rule {
            let seen = &mut exact_sets[usize::from(*deny)];
            if *seen {
                return Err(DeserializeError::Validation(format!(
                    "rule {idx} is a second exact-match set of the same polarity"
                )));
            }
            *seen = true;
        }
        validate_rule(rule, idx)?;
    }

    // A final allow set of only "" has no specification text unless a
    // denied class can be repeated after it.
    if let Some(StoredRule::Exact {
        deny: false,
        classes,
    }) = ser.rules.last()
    {
        if classes.len() == 1 && classes[0].is_empty() && !exact_sets[1] {
            return Err(DeserializeError::Validation(format!(
                "rule {} is a final empty-name allow set with no deny set before it",
                rule_count - 1
            )));
        }
    }

    Ok(())
}

fn validate_rule(rule: &StoredRule, idx: usize) -> Result<(), DeserializeError> {
    match rule {
        StoredRule::Limit { .. } => Ok(()),
        StoredRule::Exact { classes, .. } => {
            if classes.is_empty() {
                return Err(DeserializeError::Validation(format!(
                    "rule {idx} is an empty exact-match set"
                )));
            }
            for class in classes {
                check_wildcard_free(class, idx)?;
            }
            Ok(())
        }
        StoredRule::Package { package: text, .. }
        | StoredRule::Hierarchy { prefix: text, .. } => {
            check_wildcard_free(text, idx)?;
            if text.len() < 2 || !text.ends_with('.') {
                return Err(DeserializeError::Validation(format!(
                    "rule {idx} has package '{text}' that is empty or lacks a trailing '.'"
                )));
            }
            Ok(())
        }
        StoredRule::Prefix { prefix, .. } => check_wildcard_free(prefix, idx),
    }
}

fn check_wildcard_free(text: &str, idx: usize) -> Result<(), DeserializeError> {
    if text.contains(['*', ';', '/']) {
        return Err(DeserializeError::Validation(format!(
            "rule {idx} pattern '{text}' contains a reserved character"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    layout: u16,
    payload_len: u32,
    digest: [u8; DIGEST_LEN],
}

fn payload_digest(payload: &[u8]) -> [u8; DIGEST_LEN] {
    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&blake3::hash(payload).as_bytes()[..DIGEST_LEN]);
    digest
}

impl Header {
    fn describe(payload: &[u8]) -> Result<Self, SerializeError> {
        let payload_len = u32::try_from(payload.len()).map_err(|_| {
            SerializeError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "filter payload exceeds 4 GiB",
            ))
        })?;
        Ok(Self {
            layout: LAYOUT_VERSION,
            payload_len,
            digest: payload_digest(payload),
        })
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&self.layout.to_le_bytes());
        out.extend_from_slice(&WRITER_VERSION.to_le_bytes());
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&self.payload_len.to_le_bytes());
        out.extend_from_slice(&self.digest);
    }

    fn read(bytes: &[u8]) -> Result<Self, DeserializeError> {
        let Some(head) = bytes.get(..HEADER_LEN) else {
            return Err(DeserializeError::LengthMismatch {
                expected: HEADER_LEN as u32,
                actual: bytes.len(),
            });
        };
        if &head[..4] != MAGIC {
            return Err(DeserializeError::BadMagic);
        }

        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(&head[16..]);
        Ok(Self {
            layout: u16::from_le_bytes([head[4], head[5]]),
            payload_len: u32::from_le_bytes([head[12], head[13], head[14], head[15]]),
            digest,
        })
    }
}

/// Check the header and hand back the payload it vouches for.
fn open(bytes: &[u8]) -> Result<&[u8], DeserializeError> {
    let header = Header::read(bytes)?;
    if header.layout != LAYOUT_VERSION {
        return Err(DeserializeError::IncompatibleVersion {
            blob: header.layout,
            supported: LAYOUT_VERSION,
        });
    }

    let body = &bytes[HEADER_LEN..];
    let payload = body
        .get(..header.payload_len as usize)
        .ok_or(DeserializeError::LengthMismatch {
            expected: header.payload_len,
            actual: body.len(),
        })?;
    if payload_digest(payload) != header.digest {
        return Err(DeserializeError::ChecksumMismatch);
    }
    Ok(payload)
}

fn decode_payload(payload: &[u8]) -> Result<StoredChain, DeserializeError> {
    let (chain, _) = bincode::serde::decode_from_slice(payload, bincode::config::standard())?;
    Ok(chain)
}

pub(crate) fn encode(
    chain: &FilterChain,
    source_text: Option<&str>,
) -> Result<Vec<u8>, SerializeError> {
    let payload = bincode::serde::encode_to_vec(
        chain_to_serialized(chain, source_text),
        bincode::config::standard(),
    )?;

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    Header::describe(&payload)?.write_to(&mut out);
    out.extend_from_slice(&payload);
    Ok(out)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<FilterChain, DeserializeError> {
    serialized_to_chain(decode_payload(open(bytes)?)?)
}

impl FilterChain {
    /// Serialize this compiled chain to a byte vector.
    ///
    /// The optional `source_text` is hashed (BLAKE3) and embedded in the
    /// payload metadata, so callers can tell when the specification changed
    /// and the cache should be rebuilt.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`] if encoding fails.
    pub fn to_bytes(&self, source_text: Option<&str>) -> Result<Vec<u8>, SerializeError> {
        encode(self, source_text)
    }

    /// Deserialize a compiled chain previously produced by
    /// [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`] on format, integrity, or validation failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DeserializeError> {
        decode(bytes)
    }

    /// Whether `bytes` was produced from exactly `source_text`.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`] if the blob header or payload is unreadable.
    pub fn matches_source(bytes: &[u8], source_text: &str) -> Result<bool, DeserializeError> {
        let recorded = decode_payload(open(bytes)?)?.metadata.source_digest;
        Ok(recorded == Some(*blake3::hash(source_text.as_bytes()).as_bytes()))
    }

    /// Serialize this compiled chain and write it to a file.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`] on encoding or I/O failure.
    pub fn to_binary_file(
        &self,
        path: impl AsRef<std::path::Path>,
        source_text: Option<&str>,
    ) -> Result<(), SerializeError> {
        let bytes = self.to_bytes(source_text)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read a file and deserialize the compiled chain it contains.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`] on I/O, format, integrity, or validation failure.
    pub fn from_binary_file(path: impl AsRef<std::path::Path>) -> Result<Self, DeserializeError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
