use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::temporal;
use crate::user::UserId;

/// A record of one book issued to one user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkout {
    user_id: UserId,
    isbn: String,
    recorded_at: NaiveDateTime,
}

impl Checkout {
    /// Validate a checkout request. Both fields must be non-empty after
    /// trimming; the user ID is reported first.
    pub fn new(user_id: &str, isbn: &str) -> Result<Self, RecordError> {
        let user_id = UserId::new(user_id);
        if user_id.is_empty() {
            return Err(RecordError::incomplete("checkout", "user ID"));
        }
        let isbn = isbn.trim();
        if isbn.is_empty() {
            return Err(RecordError::incomplete("checkout", "ISBN"));
        }
        Ok(Self {
            user_id,
            isbn: isbn.to_string(),
            recorded_at: temporal::now(),
        })
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn recorded_at(&self) -> NaiveDateTime {
        self.recorded_at
    }
}
