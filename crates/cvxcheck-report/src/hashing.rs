use cvxcheck_instance::ProblemInstance;
use cvxcheck_types::Result;
use sha2::{Digest, Sha256};

/// Hash reference (hex-encoded SHA256)
pub type HashRef = String;

pub fn compute_hash(data: &[u8]) -> HashRef {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Hash of the JSON serialization of `data`
pub fn compute_json_hash<T: serde::Serialize>(data: &T) -> Result<HashRef> {
    let json = serde_json::to_vec(data)?;
    Ok(compute_hash(&json))
}

/// Fingerprint of an instance's coefficients.
///
/// Two runs with the same seed and dimensions produce the same fingerprint,
/// which makes a printed report comparable against an external run.
pub fn instance_fingerprint(instance: &ProblemInstance) -> HashRef {
    compute_hash(&instance.coefficient_bytes())
}
