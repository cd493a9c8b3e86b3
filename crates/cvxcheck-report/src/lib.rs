mod reporter;
mod hashing;

pub use reporter::{
    format_vector, CheckRecord, DualRecord, MemoryReporter, Reporter, RunReport, TextReporter,
};
pub use hashing::{compute_hash, compute_json_hash, instance_fingerprint, HashRef};
