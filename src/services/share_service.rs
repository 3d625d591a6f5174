use std::sync::Arc;

use tracing::info;

use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::models::share::{ShareGrant, ShareRedemption};
use crate::models::test::Test;
use crate::store::ExamStore;
use crate::utils::{time, token};

/// Capability ledger: one grant per test, any number of redemptions per
/// grant. The ledger verifies test ownership through the store but never
/// mutates test content.
#[derive(Clone)]
pub struct ShareService {
    store: Arc<dyn ExamStore>,
}

impl ShareService {
    pub fn new(store: Arc<dyn ExamStore>) -> Self {
        Self { store }
    }

    /// Issues the grant for a test the caller owns, or returns the existing
    /// one. Repeated calls hand out the same token; a second grant for the
    /// same test is never minted.
    pub async fn create_share(&self, test_id: i64, caller_id: &str) -> Result<ShareGrant> {
        let test = super::owned_test(self.store.as_ref(), test_id, caller_id).await?;

        if let Some(existing) = self.store.find_grant_by_test(test.id).await? {
            return Ok(existing);
        }

        let grant = ShareGrant {
            token: token::generate_share_token(),
            owner_id: test.owner_id.clone(),
            test_id: test.id,
            enabled: true,
            created: time::now(),
        };
        self.store.insert_grant(grant.clone()).await?;
        info!(test_id = test.id, "share grant created");
        Ok(grant)
    }

    /// Three-factor capability check: the claimed owner, the test, and the
    /// token must all resolve to one grant record. Every failure is the
    /// same NotFound; the caller learns nothing about which factor missed.
    pub async fn redeem(
        &self,
        owner_id: &str,
        test_id: i64,
        share_token: &str,
        caller_id: &str,
    ) -> Result<()> {
        if owner_id.trim().is_empty() || test_id == 0 {
            return Err(Error::not_found());
        }
        let now = time::now();

        // the claimed owner must exist and not be locked out
        let Some(owner) = self.store.find_user(owner_id).await? else {
            return Err(Error::not_found());
        };
        if owner.is_locked_out(now) {
            return Err(Error::not_found());
        }

        // the test must exist and really belong to the claimed owner
        let Some(test) = self.store.find_test(test_id).await? else {
            return Err(Error::not_found());
        };
        if test.owner_id != owner.id {
            return Err(Error::not_found());
        }

        // the token must name an enabled grant bound to exactly this pair
        let Some(grant) = self.store.find_grant_by_token(share_token).await? else {
            return Err(Error::not_found());
        };
        if !grant.enabled || grant.owner_id != owner.id || grant.test_id != test.id {
            return Err(Error::not_found());
        }

        // a repeat redemption by the same user stays a single row
        if self
            .store
            .find_redemption(&grant.token, caller_id)
            .await?
            .is_some()
        {
            return Ok(());
        }
        self.store
            .insert_redemption(ShareRedemption::new(grant.token.clone(), caller_id, now))
            .await?;
        info!(test_id = test.id, "share redeemed");
        Ok(())
    }

    /// Every test reachable through an enabled grant the caller has
    /// redeemed, with its derived question list.
    pub async fn list_shared_with_me(&self, caller_id: &str) -> Result<Vec<(Test, Vec<Question>)>> {
        let mut shared = Vec::new();
        for redemption in self.store.redemptions_by_user(caller_id).await? {
            let Some(grant) = self.store.find_grant_by_token(&redemption.token).await? else {
                continue;
            };
            if !grant.enabled {
                continue;
            }
            let Some(test) = self.store.find_test(grant.test_id).await? else {
                continue;
            };
            let questions = self.store.questions_by_test(test.id).await?;
            shared.push((test, questions));
        }
        Ok(shared)
    }

    /// One shared test, readable only when the caller has redeemed its
    /// enabled grant. Used by the taker surface.
    pub async fn shared_test(
        &self,
        test_id: i64,
        caller_id: &str,
    ) -> Result<Option<(Test, Vec<Question>)>> {
        let Some(grant) = self.store.find_grant_by_test(test_id).await? else {
            return Ok(None);
        };
        if !grant.enabled {
            return Ok(None);
        }
        if self
            .store
            .find_redemption(&grant.token, caller_id)
            .await?
            .is_none()
        {
            return Ok(None);
        }
        let Some(test) = self.store.find_test(test_id).await? else {
            return Ok(None);
        };
        let questions = self.store.questions_by_test(test.id).await?;
        Ok(Some((test, questions)))
    }

    /// Cascade entry point for test deletion: the grant and every redemption
    /// under it go away as part of the same logical delete.
    pub async fn revoke_for_test(&self, test_id: i64) -> Result<()> {
        self.store.delete_grants_for_test(test_id).await?;
        Ok(())
    }
}
