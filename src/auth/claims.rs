use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a credential sits in its lifetime relative to a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    NotYetValid,
    Valid,
    Expired,
}

/// JWT payload used for authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user ID
    pub iat: i64,  // issued at (unix timestamp)
    pub nbf: i64,  // not before (unix timestamp)
    pub exp: i64,  // expires at (unix timestamp)
}

impl Claims {
    /// `None` when `now + ttl_secs` does not fit in an `i64`.
    pub fn new(sub: Uuid, now: i64, ttl_secs: i64) -> Option<Self> {
        Some(Self {
            sub,
            iat: now,
            nbf: now,
            exp: now.checked_add(ttl_secs)?,
        })
    }

    /// `exp` is exclusive, `nbf` inclusive.
    pub fn validity_at(&self, now: i64) -> Validity {
        if now < self.nbf {
            Validity::NotYetValid
        } else if now >= self.exp {
            Validity::Expired
        } else {
            Validity::Valid
        }
    }
}
