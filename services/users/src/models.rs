//! API models for request and response payloads

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User entity as stored and as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub date_of_birth: NaiveDate,
    pub email: String,
    pub phone_number: String,
    /// Photo location relative to the photo root directory
    pub path_to_photo: Option<String>,
}

impl User {
    /// Build a row from a payload; the photo path starts absent
    pub fn new(id: i64, payload: UserPayload) -> Self {
        Self {
            id,
            last_name: payload.last_name,
            first_name: payload.first_name,
            middle_name: payload.middle_name,
            date_of_birth: payload.date_of_birth,
            email: payload.email,
            phone_number: payload.phone_number,
            path_to_photo: None,
        }
    }

    /// Replace every client-editable field with the payload's values.
    ///
    /// This is a wholesale replacement: an absent `middle_name` in the
    /// payload clears the stored one. `id` and `path_to_photo` are kept.
    pub fn apply_payload(&mut self, payload: UserPayload) {
        self.last_name = payload.last_name;
        self.first_name = payload.first_name;
        self.middle_name = payload.middle_name;
        self.date_of_birth = payload.date_of_birth;
        self.email = payload.email;
        self.phone_number = payload.phone_number;
    }
}

/// Request body for user creation and full update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub date_of_birth: NaiveDate,
    pub email: String,
    pub phone_number: String,
}

/// Photo bytes read back from storage
#[derive(Debug, Clone)]
pub struct StoredPhoto {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
