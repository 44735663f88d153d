//! Account Model

use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MEMBER: &str = "member";

/// Authenticatable login entity, joined to a member by `email` (and by the
/// member's explicit `account_id` back-reference).
///
/// Administrator credentials are fixed out-of-band configuration, so every
/// stored account carries role `member`; the column exists so token claims
/// and future roles stay uniform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Account {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub membership_type: String,
    pub membership_status: String,
    pub role: String,
    pub created_at: i64,
}

/// Denormalized member fields mirrored onto the paired account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountMirror {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub membership_type: String,
    pub membership_status: String,
}

impl Account {
    /// Verify a candidate password against the stored argon2 hash.
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.password_hash)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password with argon2 (random salt). Plaintext never reaches
    /// storage; the hash is recomputed only when the password changes.
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }
}
