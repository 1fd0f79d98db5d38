//! Publish command - one-shot publish to a single platform

use anyhow::{Context, Result};
use brandcast_adapters::{FactoryConfig, HttpConnectorFactory, LinkedinConfig, UploadPostConfig};
use brandcast_domain::policy::{ContentPolicy, PolicyConfig};
use brandcast_domain::usecases::{PublishOutcome, PublishUseCase};
use brandcast_domain::{Brand, MediaAttachment, MediaKind, PostContent, SocialPlatform};
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::args::PublishArgs;
use crate::config::AppConfig;

pub async fn execute(args: PublishArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let platform: SocialPlatform = args
        .platform
        .parse()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let content = PostContent {
        caption: args.caption.clone(),
        media: parse_media(&args.media_urls),
        link: args.link.clone(),
    };

    let dry_run = args.dry_run || config.general.dry_run;

    let factory = Arc::new(build_factory(&config));
    let brand = build_brand(&config);
    let policy = build_policy(&config);

    let usecase = PublishUseCase::new(factory, policy, dry_run);

    let outcome = usecase
        .publish(&brand, platform, &content)
        .await
        .with_context(|| format!("Failed to publish to {}", platform))?;

    match outcome {
        PublishOutcome::Published(result) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "status": "published",
                        "platform": platform.as_str(),
                        "id": result.id,
                        "url": result.url,
                    })
                );
            } else {
                println!("Published to {}: {}", platform, result.id);
                if let Some(url) = result.url {
                    println!("{}", url);
                }
            }
        }
        PublishOutcome::DryRun => {
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "status": "dry_run",
                        "platform": platform.as_str(),
                    })
                );
            } else {
                println!("[DRY RUN] Content validated and routed to {}", platform);
            }
        }
    }

    Ok(())
}

/// Classify media URLs by extension; anything not obviously video is an image
pub(crate) fn parse_media(urls: &[String]) -> Vec<MediaAttachment> {
    urls.iter()
        .map(|url| {
            let lower = url.to_lowercase();
            let kind = if lower.ends_with(".mp4")
                || lower.ends_with(".mov")
                || lower.ends_with(".webm")
            {
                MediaKind::Video
            } else {
                MediaKind::Image
            };
            MediaAttachment {
                url: url.clone(),
                kind,
            }
        })
        .collect()
}

/// Build the brand from config, resolving credentials from the environment
///
/// Missing env vars leave the credential unset; the connector reports a
/// typed authentication error if it is actually needed.
pub(crate) fn build_brand(config: &AppConfig) -> Brand {
    Brand {
        id: Uuid::new_v4(),
        name: config.brand.name.clone(),
        linkedin_access_token: read_secret_env(&config.brand.linkedin_token_env),
        linkedin_author_urn: config.brand.linkedin_author_urn.clone(),
        upload_post_username: config.brand.upload_post_username.clone(),
    }
}

pub(crate) fn build_factory(config: &AppConfig) -> HttpConnectorFactory {
    let api_key = read_secret_env(&config.upload_post.api_key_env)
        .unwrap_or_else(|| SecretString::new("".into()));

    HttpConnectorFactory::new(FactoryConfig {
        linkedin: LinkedinConfig {
            enabled: config.linkedin.enabled,
            base_url: config.linkedin.base_url.clone(),
        },
        upload_post: UploadPostConfig {
            enabled: config.upload_post.enabled,
            base_url: config.upload_post.base_url.clone(),
            api_key,
        },
    })
}

pub(crate) fn build_policy(config: &AppConfig) -> ContentPolicy {
    ContentPolicy::new(PolicyConfig {
        blocked_patterns: config.dispatch.blocked_patterns.clone(),
    })
}

fn read_secret_env(env_var: &str) -> Option<SecretString> {
    if env_var.trim().is_empty() {
        return None;
    }

    match std::env::var(env_var) {
        Ok(value) if !value.trim().is_empty() => Some(SecretString::new(value.into())),
        _ => None,
    }
}
