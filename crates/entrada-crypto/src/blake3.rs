//! Domain-separated BLAKE3 hashing.
//!
//! BLAKE3 serves two purposes in Entrada: deriving account addresses from
//! verifying keys, and computing the signing digest of feeless
//! transactions. Cross-domain collisions are prevented by mandatory domain
//! separation through BLAKE3's key-derivation mode with registered context
//! strings.

/// Registered BLAKE3 context strings. Using an unregistered context string
/// is a protocol violation.
pub mod contexts {
    /// Account address derivation from an Ed25519 verifying key.
    pub const ACCOUNT_ADDRESS: &str = "Entrada v1 account-address";
    /// Signing digest of a feeless (relayed) transaction.
    pub const FEELESS_DIGEST: &str = "Entrada v1 feeless-digest";

    /// All registered context strings. Used for validation.
    pub const ALL_CONTEXTS: &[&str] = &[ACCOUNT_ADDRESS, FEELESS_DIGEST];
}

/// Compute BLAKE3 hash of the input data.
pub fn hash(data: &[u8]) -> [u8; 32] {
    *::blake3::hash(data).as_bytes()
}

/// Derive a key using BLAKE3's built-in key derivation mode.
///
/// The context string must be one of the registered context strings in
/// [`contexts`]. The key material can be any byte slice.
pub fn derive_key(context: &str, key_material: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut hasher = ::blake3::Hasher::new_derive_key(context);
    hasher.update(key_material);
    out.copy_from_slice(hasher.finalize().as_bytes());
    out
}

/// Verify that a context string is registered.
pub fn is_registered_context(context: &str) -> bool {
    contexts::ALL_CONTEXTS.contains(&context)
}

/// Encode multiple dynamic fields using length-prefixed encoding.
///
/// When hashing several variable-length fields together, inputs use
/// `BE32(len(field1)) || field1 || BE32(len(field2)) || field2 || ...`
/// so that field boundaries cannot be shifted between fields.
pub fn encode_multi_field(fields: &[&[u8]]) -> Vec<u8> {
    let total_len: usize = fields.iter().map(|f| 4 + f.len()).sum();
    let mut output = Vec::with_capacity(total_len);
    for field in fields {
        output.extend_from_slice(&(field.len() as u32).to_be_bytes());
        output.extend_from_slice(field);
    }
    output
}
