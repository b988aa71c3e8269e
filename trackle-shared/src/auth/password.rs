/// Password hashing with Argon2id
///
/// Hashes are produced in PHC string format, so the parameters and salt
/// travel with the hash and verification needs no extra configuration.
///
/// # Example
///
/// ```
/// use trackle_shared::auth::password::{hash_password, verify_password};
///
/// let hash = hash_password("hunter2hunter2").unwrap();
/// assert!(verify_password("hunter2hunter2", &hash).unwrap());
/// assert!(!verify_password("wrong-password", &hash).unwrap());
/// ```
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, ParamsBuilder, Version,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    HashingFailed(String),
    #[error("failed to verify password: {0}")]
    VerificationFailed(String),
}

/// Hash a password with Argon2id (64 MiB memory, 3 iterations, 4 lanes).
///
/// A fresh random salt is generated per call, so hashing the same
/// password twice yields different strings.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(65536)
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored PHC-format hash.
///
/// Returns `Ok(false)` for a wrong password; `Err` is reserved for
/// malformed hashes and internal failures.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| PasswordError::VerificationFailed(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerificationFailed(e.to_string())),
    }
}
