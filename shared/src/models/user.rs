//! Session user

use serde::{Deserialize, Serialize};

use crate::types::{EntityId, Language};

/// The signed-in user, resolved once per session and passed down explicitly
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: EntityId,
    pub display_name: String,
    #[serde(default)]
    pub language: Language,
}
