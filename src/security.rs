use base64::Engine;
use crypto::bcrypt::bcrypt;
use crypto::util::fixed_time_eq;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::error::HashError;
use crate::util::base64_engine;

const SCHEME: &str = "bcrypt-sha256";
const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

pub type Salt = [u8; 16];

#[derive(Debug, Error)]
#[error("malformed password hash")]
pub struct MalformedHash;

/// Hashes plaintext credentials with a fixed bcrypt cost.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<PasswordHasher, HashError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(HashError::Cost(cost));
        }
        Ok(PasswordHasher { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, password: impl AsRef<str>) -> Result<PasswordHash, HashError> {
        let mut salt: Salt = [0; 16];
        OsRng.try_fill_bytes(&mut salt)?;

        Ok(PasswordHash {
            cost: self.cost,
            salt,
            digest: bcrypt_sha256(self.cost, &salt, password.as_ref()),
        })
    }
}

fn bcrypt_sha256(cost: u32, salt: &Salt, password: &str) -> [u8; 24] {
    let mut pw_hash: [u8; 24] = [0; 24];

    // bcrypt only reads the first 72 bytes, SHA-256 keeps the whole password relevant
    let mut sha = Sha256::new();
    sha2::Digest::update(&mut sha, password.as_bytes());

    bcrypt(cost, salt, sha.finalize().as_slice(), &mut pw_hash);

    pw_hash
}

/// One-way password hash, stored as `bcrypt-sha256$<cost>$<salt>$<digest>`.
#[derive(Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PasswordHash {
    cost: u32,
    salt: Salt,
    digest: [u8; 24],
}

impl PasswordHash {
    pub fn verify(&self, password: impl AsRef<str>) -> bool {
        let candidate = bcrypt_sha256(self.cost, &self.salt, password.as_ref());
        fixed_time_eq(&candidate, &self.digest)
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PasswordHash:{}:{}", SCHEME, self.cost)
    }
}

impl From<PasswordHash> for String {
    fn from(hash: PasswordHash) -> Self {
        let engine = base64_engine();
        format!(
            "{}${}${}${}",
            SCHEME,
            hash.cost,
            engine.encode(hash.salt),
            engine.encode(hash.digest)
        )
    }
}

impl TryFrom<String> for PasswordHash {
    type Error = MalformedHash;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let engine = base64_engine();
        let mut parts = value.split('$');

        if parts.next() != Some(SCHEME) {
            return Err(MalformedHash);
        }
        let cost: u32 = parts
            .next()
            .and_then(|it| it.parse().ok())
            .filter(|it| (MIN_COST..=MAX_COST).contains(it))
            .ok_or(MalformedHash)?;
        let salt: Salt = parts
            .next()
            .and_then(|it| engine.decode(it).ok())
            .and_then(|it| it.try_into().ok())
            .ok_or(MalformedHash)?;
        let digest: [u8; 24] = parts
            .next()
            .and_then(|it| engine.decode(it).ok())
            .and_then(|it| it.try_into().ok())
            .ok_or(MalformedHash)?;

        if parts.next().is_some() {
            return Err(MalformedHash);
        }

        Ok(PasswordHash { cost, salt, digest })
    }
}
