use serde::{Deserialize, Serialize};

use crate::models::share::ShareGrant;

/// The three values a redeeming user must present together. Handing all of
/// them out in one payload is what makes the link self-contained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLinkResponse {
    pub owner_id: String,
    pub test_id: i64,
    pub token: String,
}

impl From<ShareGrant> for ShareLinkResponse {
    fn from(grant: ShareGrant) -> Self {
        Self {
            owner_id: grant.owner_id,
            test_id: grant.test_id,
            token: grant.token,
        }
    }
}
