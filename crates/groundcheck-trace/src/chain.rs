//! Hash-chain primitives for sealed traces.
//!
//! Digest input layout (bytes, in order):
//!   1. response id as its hyphenated UUID string
//!   2. sequence as 8-byte little-endian
//!   3. prev_digest as UTF-8 bytes (64 ASCII hex chars)
//!   4. canonical JSON of the record (serde_json, no pretty-printing)

use sha2::{Digest, Sha256};

use groundcheck_contracts::{
    error::{GroundcheckError, GroundcheckResult},
    trace::{ResponseId, ToolCallRecord},
};

use crate::sealed::{SealedRecord, SealedTrace};

/// Compute the digest committing one record to the chain.
///
/// Returns a lowercase 64-character hex string.
pub fn hash_record(
    response_id: &ResponseId,
    sequence: u64,
    record: &ToolCallRecord,
    prev_digest: &str,
) -> GroundcheckResult<String> {
    let record_json = serde_json::to_vec(record).map_err(|e| GroundcheckError::TraceWriteFailed {
        reason: format!("record {sequence} cannot be serialized: {e}"),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(response_id.0.to_string().as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_digest.as_bytes());
    hasher.update(&record_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Verify linkage and digests of a chain of sealed records.
///
/// Every entry must link to its predecessor (or the genesis digest), carry a
/// sequence equal to its position and its record's sequence, and hold the
/// digest recomputed from its own fields. An empty chain is valid.
pub fn verify_chain(response_id: &ResponseId, records: &[SealedRecord]) -> bool {
    let mut expected_prev = SealedRecord::GENESIS_DIGEST.to_string();

    for (position, entry) in records.iter().enumerate() {
        if entry.prev_digest != expected_prev
            || entry.sequence != position as u64
            || entry.record.sequence != entry.sequence
        {
            return false;
        }
        match hash_record(response_id, entry.sequence, &entry.record, &entry.prev_digest) {
            Ok(recomputed) if recomputed == entry.digest => {}
            _ => return false,
        }
        expected_prev = entry.digest.clone();
    }

    true
}

/// Verify a sealed trace: its chain and its terminal digest.
pub fn verify_sealed(sealed: &SealedTrace) -> bool {
    let terminal = sealed.records.last().map(|r| r.digest.as_str()).unwrap_or_default();
    sealed.terminal_digest == terminal && verify_chain(&sealed.response_id, &sealed.records)
}
