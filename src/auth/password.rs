use thiserror::Error;

/// Bcrypt work factor. Matches the original deployment's salt rounds.
pub const BCRYPT_COST: u32 = 12;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error(transparent)]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Hash a plaintext password with a fresh salt. Bcrypt at cost 12 is
/// deliberately slow, so the work runs on the blocking thread pool and
/// never stalls in-flight requests.
pub async fn hash(plaintext: &str) -> Result<String, PasswordError> {
    let plaintext = plaintext.to_owned();
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, BCRYPT_COST)).await??;
    Ok(hashed)
}

/// Check a plaintext against a stored hash. A mismatch is `Ok(false)`;
/// only a malformed stored hash is an error.
pub async fn verify(plaintext: &str, hashed: &str) -> Result<bool, PasswordError> {
    let plaintext = plaintext.to_owned();
    let hashed = hashed.to_owned();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &hashed)).await??;
    Ok(matches)
}
