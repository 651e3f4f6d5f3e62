use super::types::{CasPair, CasRequest, PairOutcome, PayloadUpdate, RowAccess};
use crate::error::CasError;

/// Version-fenced conditional update over the rows visible through `access`.
///
/// Pairs are processed in input order against live state, so a repeated key sees the version
/// written by its earlier occurrence. The first mismatch returns `Conflict`; the caller's
/// transaction boundary is expected to discard everything applied before it.
///
/// The count adds the affected-row figure the store reports for each applied pair, which is
/// exactly one under key uniqueness.
pub fn check_and_update<A>(access: &mut A, request: &CasRequest) -> Result<u64, CasError>
where
    A: RowAccess + ?Sized,
{
    let pairs = request.pairs()?;

    let mut updated_count = 0u64;
    for pair in &pairs {
        if let PairOutcome::Applied { affected } = check_pair(access, pair, &request.update)? {
            updated_count += affected;
        }
    }

    Ok(updated_count)
}

fn check_pair<A>(
    access: &mut A,
    pair: &CasPair,
    update: &PayloadUpdate,
) -> Result<PairOutcome, CasError>
where
    A: RowAccess + ?Sized,
{
    let Some(actual) = access.read_version(pair.key) else {
        tracing::trace!("Key {} not owned here, skipping", pair.key);
        return Ok(PairOutcome::NotFound);
    };

    if actual != pair.expected_version {
        return Err(conflict(pair, actual));
    }

    let Some(next) = actual.checked_add(1) else {
        tracing::warn!("Key {} is at the maximum version {}", pair.key, actual);
        return Err(CasError::invalid(format!(
            "version of key {} is exhausted",
            pair.key
        )));
    };

    let affected = access.conditional_update(pair.key, update);
    tracing::debug!(
        "Key {} advanced {} -> {} ({} row)",
        pair.key,
        actual,
        next,
        affected
    );
    Ok(PairOutcome::Applied { affected })
}

fn conflict(pair: &CasPair, actual: i64) -> CasError {
    tracing::warn!(
        "Version mismatch on key {}: expected {}, found {}",
        pair.key,
        pair.expected_version,
        actual
    );
    CasError::Conflict {
        key: pair.key,
        expected: pair.expected_version,
        actual,
    }
}
