//! Doctor command - validate configuration and show which providers are usable

use anyhow::Result;
use instapost_adapters::Credential;
use instapost_domain::validate;
use secrecy::ExposeSecret;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    ayrshare: CheckResult,
    buffer: CheckResult,
    instagram: CheckResult,
    late: CheckResult,
    zapier: CheckResult,
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

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<ExitCode> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        ayrshare: CheckResult::error("Not checked"),
        buffer: CheckResult::error("Not checked"),
        instagram: CheckResult::error("Not checked"),
        late: CheckResult::error("Not checked"),
        zapier: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    // Check config
    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.ayrshare = check_env("API key", &config.ayrshare.api_key_env);
        report.buffer = check_buffer(config);
        report.instagram = check_env("Access token", &config.instagram.access_token_env);
        report.late = check_late(config);
        report.zapier = check_zapier(config);
    }

    let checks = [
        &report.config,
        &report.ayrshare,
        &report.buffer,
        &report.instagram,
        &report.late,
        &report.zapier,
    ];

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
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

/// Presence check for a credential env var, never revealing its value
fn check_env(label: &str, env_var: &str) -> CheckResult {
    if env_var.trim().is_empty() {
        return CheckResult::error(format!("No {} env var configured", label.to_lowercase()));
    }

    match Credential::env(env_var).lookup() {
        Some(_) => CheckResult::ok(format!("{}: {} (set)", label, env_var)),
        None => CheckResult::warn(format!("{}: {} (not set)", label, env_var)),
    }
}

fn check_buffer(config: &AppConfig) -> CheckResult {
    let spacing = config.buffer.min_spacing_ms;
    let check = check_env("API key", &config.buffer.api_key_env).with_details(serde_json::json!({
        "min_spacing_ms": spacing,
        "check_media": config.buffer.check_media,
    }));

    if check.is_ok() && spacing > 0 && spacing < 6000 {
        return CheckResult::warn(format!(
            "{}, but min_spacing_ms = {} would exceed Buffer's 10 requests per minute",
            check.message, spacing
        ));
    }
    check
}

fn check_late(config: &AppConfig) -> CheckResult {
    let key = check_env("API key", &config.late.api_key_env);
    if !key.is_ok() {
        return key;
    }

    let too_short = Credential::env(&config.late.api_key_env)
        .lookup()
        .is_some_and(|value| value.expose_secret().chars().count() < 10);
    if too_short {
        return CheckResult::error(format!(
            "API key: {} appears to be invalid (too short)",
            config.late.api_key_env
        ));
    }

    match Credential::env(&config.late.account_id_env).lookup() {
        Some(_) => CheckResult::ok(format!(
            "{}, Account ID: {} (set)",
            key.message, config.late.account_id_env
        )),
        None => CheckResult::warn(format!(
            "{}, Account ID: {} (not set; pass --account-id)",
            key.message, config.late.account_id_env
        )),
    }
}

fn check_zapier(config: &AppConfig) -> CheckResult {
    let url = config.zapier.webhook_url.trim();
    if url.is_empty() {
        return CheckResult::warn("Webhook URL not configured");
    }

    match validate::http_url("webhook_url", url) {
        Ok(_) => CheckResult::ok(format!(
            "Webhook URL configured, Account: {}",
            config.zapier_account().as_deref().unwrap_or("(none)")
        )),
        Err(e) => CheckResult::error(e.to_string()),
    }
}

fn print_report(report: &DoctorReport) {
    println!("instapost Doctor Report");
    println!("=======================");
    println!();

    print_check("Config", &report.config);
    print_check("Ayrshare", &report.ayrshare);
    print_check("Buffer", &report.buffer);
    print_check("Instagram Graph", &report.instagram);
    print_check("Late.io", &report.late);
    print_check("Zapier", &report.zapier);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
