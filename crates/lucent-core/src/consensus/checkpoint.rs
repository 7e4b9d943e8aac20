use alloy_primitives::B256;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while resolving the trusted checkpoint.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckpointError {
    #[error("Insufficient checkpoint source agreement: {agreeing}/{total} sources agree (need {required})")]
    InsufficientAgreement {
        agreeing: usize,
        total: usize,
        required: usize,
    },

    #[error("No checkpoint sources available")]
    NoSources,

    #[error("Checkpoint root format invalid: {reason}")]
    InvalidFormat { reason: String },
}

/// A block root enough independent sources agree on. Its header is what a
/// bootstrap snapshot must hash to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedCheckpoint {
    pub block_root: B256,
    /// How many sources reported this root.
    pub source_agreement: usize,
    pub total_sources: usize,
    pub slot: u64,
}

/// Pick the checkpoint root reported by the most sources, requiring at least
/// `required_agreement` of them to agree.
///
/// Each source contributes one `(block_root, slot)` pair. Among equally
/// popular roots the first reported wins.
pub fn select_trusted_checkpoint(
    reports: &[(B256, u64)],
    required_agreement: usize,
) -> Result<VerifiedCheckpoint, CheckpointError> {
    let mut tally: Vec<((B256, u64), usize)> = Vec::new();
    for &(root, slot) in reports {
        match tally.iter_mut().find(|((r, _), _)| *r == root) {
            Some((_, count)) => *count += 1,
            None => tally.push(((root, slot), 1)),
        }
    }

    let ((block_root, slot), agreeing) = tally
        .iter()
        .copied()
        .reduce(|best, entry| if entry.1 > best.1 { entry } else { best })
        .ok_or(CheckpointError::NoSources)?;

    if agreeing < required_agreement.max(1) {
        return Err(CheckpointError::InsufficientAgreement {
            agreeing,
            total: reports.len(),
            required: required_agreement,
        });
    }

    debug!(%block_root, slot, agreeing, total = reports.len(), "Trusted checkpoint selected");
    Ok(VerifiedCheckpoint {
        block_root,
        source_agreement: agreeing,
        total_sources: reports.len(),
        slot,
    })
}

/// Parse a hex-encoded checkpoint root, with or without `0x`.
pub fn parse_checkpoint_root(hex_str: &str) -> Result<B256, CheckpointError> {
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);

    if hex_str.len() != 64 {
        return Err(CheckpointError::InvalidFormat {
            reason: format!("Expected 64 hex characters, got {}", hex_str.len()),
        });
    }

    let bytes = hex::decode(hex_str).map_err(|e| CheckpointError::InvalidFormat {
        reason: format!("Invalid hex: {}", e),
    })?;
    Ok(B256::from_slice(&bytes))
}
