//! Schedule command - queue and inspect scheduled posts

use anyhow::{Context, Result};
use brandcast_adapters::state::SqliteScheduleStore;
use brandcast_domain::{
    PostContent, ScheduleStatus, ScheduleStore, ScheduledPost, SocialPlatform,
};
use std::path::PathBuf;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::args::{ScheduleArgs, ScheduleCommands};
use crate::commands::publish::{build_policy, parse_media};
use crate::config::AppConfig;

pub async fn execute(args: ScheduleArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let store = SqliteScheduleStore::new(&config.general.state_db_path)
        .await
        .context("Failed to open schedule store")?;

    match args.command {
        ScheduleCommands::Add {
            platform,
            caption,
            media_urls,
            link,
            at,
        } => {
            let platform: SocialPlatform =
                platform.parse().map_err(|e| anyhow::anyhow!("{}", e))?;

            let scheduled_at = OffsetDateTime::parse(&at, &Rfc3339)
                .with_context(|| format!("Invalid --at timestamp: {}", at))?;

            let content = PostContent {
                caption,
                media: parse_media(&media_urls),
                link,
            };

            // Reject content the dispatcher would refuse anyway
            build_policy(&config)
                .validate(platform, &content)
                .map_err(|e| anyhow::anyhow!("{}", e))?;

            let post = ScheduledPost::new(platform, content, scheduled_at);

            store
                .add(&post)
                .await
                .context("Failed to store scheduled post")?;

            println!(
                "Scheduled {} post {} for {}",
                platform,
                post.id,
                at
            );
        }
        ScheduleCommands::List { pending, json } => {
            let mut posts = store.list().await.context("Failed to list posts")?;

            if pending {
                posts.retain(|p| p.status == ScheduleStatus::Pending);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&posts)?);
            } else if posts.is_empty() {
                println!("No scheduled posts");
            } else {
                for post in posts {
                    let when = post
                        .scheduled_at
                        .format(&Rfc3339)
                        .unwrap_or_else(|_| "?".to_string());
                    println!(
                        "{}  {:9}  {:9}  {}",
                        post.id,
                        post.platform.as_str(),
                        post.status.as_str(),
                        when
                    );
                    if let Some(error) = &post.last_error {
                        println!("    last error: {}", error);
                    }
                }
            }
        }
    }

    Ok(())
}
