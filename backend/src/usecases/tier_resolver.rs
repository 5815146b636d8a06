use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use emocare::domain::{
    repositories::users::UserRepository,
    value_objects::{enums::user_tiers::UserTier, users::effective_tier},
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Resolves the tier a user is entitled to right now: stored gold only while unexpired.
pub struct TierResolver<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
}

impl<U> TierResolver<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn resolve_effective_tier(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<UserTier> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| anyhow!("user {} not found", user_id))?;

        let stored = UserTier::from_str(&user.tier);
        let tier = effective_tier(stored, user.gold_expires_at, now);
        if stored != tier {
            debug!(%user_id, "tier_resolver: gold expired, treating as free");
        }

        Ok(tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::sample_user;
    use chrono::Duration;
    use emocare::domain::repositories::users::MockUserRepository;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn unexpired_gold_stays_gold() {
        let now = Utc::now();
        let mut user = sample_user();
        user.tier = "gold".to_string();
        user.gold_expires_at = Some(now + Duration::days(3));
        let user_id = user.id;

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_id()
            .with(eq(user_id))
            .returning(move |_| Ok(Some(user.clone())));

        let resolver = TierResolver::new(Arc::new(user_repo));
        let tier = resolver.resolve_effective_tier(user_id, now).await.unwrap();

        assert_eq!(tier, UserTier::Gold);
    }

    #[tokio::test]
    async fn expired_gold_falls_back_to_free() {
        let now = Utc::now();
        let mut user = sample_user();
        user.tier = "gold".to_string();
        user.gold_expires_at = Some(now - Duration::minutes(1));
        let user_id = user.id;

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));

        let resolver = TierResolver::new(Arc::new(user_repo));
        let tier = resolver.resolve_effective_tier(user_id, now).await.unwrap();

        assert_eq!(tier, UserTier::Free);
    }

    #[tokio::test]
    async fn missing_user_is_an_error() {
        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_id().returning(|_| Ok(None));

        let resolver = TierResolver::new(Arc::new(user_repo));

        assert!(
            resolver
                .resolve_effective_tier(Uuid::new_v4(), Utc::now())
                .await
                .is_err()
        );
    }
}
