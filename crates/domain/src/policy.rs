//! Per-platform content constraints
//!
//! Content is validated before it ever reaches a connector; a rejected
//! payload is never sent over the wire.

use regex::Regex;

use crate::model::{MediaKind, PostContent, SocialPlatform};

/// Maximum caption length per platform
pub fn caption_limit(platform: SocialPlatform) -> usize {
    match platform {
        SocialPlatform::Linkedin => 3000,
        SocialPlatform::Instagram => 2200,
        SocialPlatform::Facebook => 63_206,
        SocialPlatform::Tiktok => 2200,
    }
}

/// Policy configuration
#[derive(Debug, Clone, Default)]
pub struct PolicyConfig {
    /// Regex patterns for captions that must not be published
    pub blocked_patterns: Vec<String>,
}

/// Content validator applied before dispatch
pub struct ContentPolicy {
    blocked: Vec<Regex>,
}

impl ContentPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self {
            blocked: compile_patterns(&config.blocked_patterns),
        }
    }

    /// Validate content against the target platform's constraints
    pub fn validate(
        &self,
        platform: SocialPlatform,
        content: &PostContent,
    ) -> Result<(), PolicyViolation> {
        if content.caption.trim().is_empty() && content.media.is_empty() {
            return Err(PolicyViolation::EmptyContent);
        }

        let limit = caption_limit(platform);
        if content.caption.chars().count() > limit {
            return Err(PolicyViolation::CaptionTooLong {
                len: content.caption.chars().count(),
                max: limit,
                platform,
            });
        }

        match platform {
            SocialPlatform::Instagram if content.media.is_empty() => {
                return Err(PolicyViolation::MediaRequired { platform });
            }
            SocialPlatform::Tiktok => {
                if !content.media.iter().any(|m| m.kind == MediaKind::Video) {
                    return Err(PolicyViolation::VideoRequired { platform });
                }
            }
            _ => {}
        }

        for pattern in &self.blocked {
            if pattern.is_match(&content.caption) {
                return Err(PolicyViolation::BlockedPattern {
                    pattern: pattern.as_str().to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Default for ContentPolicy {
    fn default() -> Self {
        Self::new(PolicyConfig::default())
    }
}

/// Policy violation errors
#[derive(Debug, thiserror::Error)]
pub enum PolicyViolation {
    #[error("Content is empty")]
    EmptyContent,
    #[error("Caption too long for {platform}: {len} > {max}")]
    CaptionTooLong {
        len: usize,
        max: usize,
        platform: SocialPlatform,
    },
    #[error("{platform} requires at least one media attachment")]
    MediaRequired { platform: SocialPlatform },
    #[error("{platform} requires a video attachment")]
    VideoRequired { platform: SocialPlatform },
    #[error("Caption matches blocked pattern '{pattern}'")]
    BlockedPattern { pattern: String },
}

fn compile_patterns(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(regex) => Some(regex),
            Err(error) => {
                tracing::warn!(pattern = %pattern, error = %error, "Invalid blocked pattern");
                None
            }
        })
        .collect()
}
