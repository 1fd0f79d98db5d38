//! One-shot publish use case

use crate::{
    model::{Brand, PostContent, PublishResult, SocialPlatform},
    policy::{ContentPolicy, PolicyViolation},
    ports::{ConnectorFactory, PublishError},
};

/// Outcome of a publish request
#[derive(Debug)]
pub enum PublishOutcome {
    /// Content was published
    Published(PublishResult),
    /// Dry-run mode: content validated and routed, nothing sent
    DryRun,
}

/// Errors from the publish use case
#[derive(Debug, thiserror::Error)]
pub enum PublishUseCaseError {
    #[error("Policy violation: {0}")]
    Policy(#[from] PolicyViolation),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error("Connector for {0} is disabled")]
    Disabled(SocialPlatform),
}

/// Use case for publishing a single piece of content
///
/// Validates content against platform policy, resolves the connector, and
/// performs one publish attempt. Retry policy belongs to the caller.
pub struct PublishUseCase<F: ?Sized> {
    factory: std::sync::Arc<F>,
    policy: ContentPolicy,
    dry_run: bool,
}

impl<F: ConnectorFactory + ?Sized> PublishUseCase<F> {
    pub fn new(factory: std::sync::Arc<F>, policy: ContentPolicy, dry_run: bool) -> Self {
        Self {
            factory,
            policy,
            dry_run,
        }
    }

    /// Publish content to a platform on behalf of a brand
    pub async fn publish(
        &self,
        brand: &Brand,
        platform: SocialPlatform,
        content: &PostContent,
    ) -> Result<PublishOutcome, PublishUseCaseError> {
        self.policy.validate(platform, content)?;

        if self.dry_run {
            tracing::info!(
                platform = %platform,
                brand = %brand.name,
                caption_len = content.caption.chars().count(),
                "[DRY RUN] Would publish"
            );
            return Ok(PublishOutcome::DryRun);
        }

        let connector = self.factory.connector_for(platform);

        if !connector.is_enabled() {
            return Err(PublishUseCaseError::Disabled(platform));
        }

        let result = connector.publish(brand, content).await?;

        tracing::info!(
            platform = %platform,
            post_id = %result.id,
            "Published"
        );

        Ok(PublishOutcome::Published(result))
    }
}
