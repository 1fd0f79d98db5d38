//! Doctor command - validate configuration and show status

use anyhow::Result;
use brandcast_adapters::state::SqliteScheduleStore;
use brandcast_domain::ScheduleStore;
use serde::Serialize;
use std::path::PathBuf;

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    brand: CheckResult,
    linkedin: CheckResult,
    upload_post: CheckResult,
    store: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        brand: CheckResult::error("Not checked"),
        linkedin: CheckResult::error("Not checked"),
        upload_post: CheckResult::error("Not checked"),
        store: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    // Check config
    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.brand = check_brand(config);
        report.linkedin = check_linkedin(config);
        report.upload_post = check_upload_post(config);
        report.store = check_store(config).await;
    }

    // Determine overall status
    let checks = [&report.config, &report.brand, &report.store];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    // Output report
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn check_brand(config: &AppConfig) -> CheckResult {
    let brand = &config.brand;

    if brand.name.trim().is_empty() {
        return CheckResult::error("Brand name is empty");
    }

    let mut platforms = vec![];
    if brand.linkedin_author_urn.is_some() {
        platforms.push("linkedin");
    }
    if brand.upload_post_username.is_some() {
        platforms.push("instagram/facebook/tiktok");
    }

    if platforms.is_empty() {
        return CheckResult::warn(format!(
            "Brand '{}' has no platform identities configured",
            brand.name
        ));
    }

    CheckResult::ok(format!(
        "Brand '{}', platforms: {}",
        brand.name,
        platforms.join(", ")
    ))
    .with_details(serde_json::json!({
        "linkedin_author_urn": brand.linkedin_author_urn,
        "upload_post_username": brand.upload_post_username,
    }))
}

fn check_linkedin(config: &AppConfig) -> CheckResult {
    if !config.linkedin.enabled {
        return CheckResult::ok("LinkedIn disabled");
    }

    if config.brand.linkedin_author_urn.is_none() {
        return CheckResult::error("LinkedIn enabled but brand has no author URN");
    }

    let env_var = &config.brand.linkedin_token_env;
    if env_var.is_empty() {
        return CheckResult::error("No LinkedIn token env var configured");
    }

    match std::env::var(env_var) {
        Ok(val) if !val.is_empty() => {
            CheckResult::ok(format!("Access token: {} (set)", env_var))
        }
        _ => CheckResult::warn(format!("Access token: {} (not set)", env_var)),
    }
}

fn check_upload_post(config: &AppConfig) -> CheckResult {
    if !config.upload_post.enabled {
        return CheckResult::ok("Upload-Post disabled");
    }

    if config.brand.upload_post_username.is_none() {
        return CheckResult::error("Upload-Post enabled but brand has no username");
    }

    let env_var = &config.upload_post.api_key_env;
    if env_var.is_empty() {
        return CheckResult::error("No Upload-Post API key env var configured");
    }

    match std::env::var(env_var) {
        Ok(val) if !val.is_empty() => CheckResult::ok(format!("API key: {} (set)", env_var)),
        _ => CheckResult::warn(format!("API key: {} (not set)", env_var)),
    }
}

async fn check_store(config: &AppConfig) -> CheckResult {
    match SqliteScheduleStore::new(&config.general.state_db_path).await {
        Ok(store) => match store.list().await {
            Ok(posts) => CheckResult::ok(format!(
                "Schedule store at {} ({} posts)",
                config.general.state_db_path.display(),
                posts.len()
            )),
            Err(e) => CheckResult::error(format!("Failed to read schedule store: {}", e)),
        },
        Err(e) => CheckResult::error(format!("Failed to open schedule store: {}", e)),
    }
}

fn print_report(report: &DoctorReport) {
    println!("brandcast Doctor Report");
    println!("=======================");
    println!();

    print_check("Config", &report.config);
    print_check("Brand", &report.brand);
    print_check("LinkedIn", &report.linkedin);
    print_check("Upload-Post", &report.upload_post);
    print_check("Schedule Store", &report.store);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready to run! Try: brandcast run --dry-run --once");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
