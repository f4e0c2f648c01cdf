//! Contact directory types

use serde::{Deserialize, Serialize};

/// A contact known to the bridge, keyed by the raw phone number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub name: String,
    pub phone: String,
}

impl ContactRecord {
    pub fn new(phone: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }
}
