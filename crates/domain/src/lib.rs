//! brandcast domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `usecases`: Application use cases / business logic
//! - `policy`: Per-platform content constraints

pub mod model;
pub mod policy;
pub mod ports;
pub mod usecases;

pub use model::*;
pub use ports::*;

use sha2::{Digest, Sha256};

/// Compute a deterministic fingerprint of content bound for a platform
/// Used for idempotency checks
pub fn content_fingerprint(platform: SocialPlatform, content: &PostContent) -> String {
    let mut hasher = Sha256::new();
    hasher.update(platform.as_str().as_bytes());
    hasher.update(content.caption.as_bytes());
    for media in &content.media {
        hasher.update(media.url.as_bytes());
    }
    if let Some(link) = &content.link {
        hasher.update(link.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_varies_by_platform() {
        let content = PostContent::text("Same caption");

        let a = content_fingerprint(SocialPlatform::Facebook, &content);
        let b = content_fingerprint(SocialPlatform::Instagram, &content);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_stable() {
        let content = PostContent::text("Same caption");

        let a = content_fingerprint(SocialPlatform::Facebook, &content);
        let b = content_fingerprint(SocialPlatform::Facebook, &content);
        assert_eq!(a, b);
    }
}
