//! Posting commands, one per provider

use anyhow::Result;
use instapost_adapters::{
    AyrsharePublisher, BufferPublisher, Credential, GraphPublisher, LatePublisher,
    WebhookPublisher,
};
use instapost_domain::report::{self, ReportContext};
use instapost_domain::{
    AyrshareRequest, BufferRequest, Clock, GraphRequest, LateRequest, PostResult, PostingAdapter,
    SystemClock, TokenBucket, WebhookRequest,
};
use secrecy::SecretString;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use crate::args::{AyrshareArgs, BufferArgs, GraphArgs, LateArgs, OutputArgs, ZapierArgs};
use crate::config::AppConfig;

pub async fn ayrshare(args: AyrshareArgs, config: &AppConfig) -> Result<ExitCode> {
    let mut publisher = AyrsharePublisher::with_base_url(
        Credential::env(&config.ayrshare.api_key_env),
        &config.ayrshare.base_url,
    );
    if let Some(account) = &config.general.account {
        publisher = publisher.with_account(account);
    }

    let request = AyrshareRequest {
        post_text: args.text,
        image_url: args.image_url,
        schedule_date: args.schedule_date,
        schedule_time: args.schedule_time,
    };
    let context = ReportContext {
        account: config.general.account.clone(),
        content_chars: request.post_text.chars().count(),
        media_count: usize::from(request.image_url.is_some()),
        ..Default::default()
    };

    run(&publisher, &request, context, &args.output, config).await
}

pub async fn buffer(args: BufferArgs, config: &AppConfig) -> Result<ExitCode> {
    let limiter = match config.buffer.min_spacing_ms {
        0 => TokenBucket::unlimited(),
        ms => TokenBucket::with_spacing(Duration::from_millis(ms)),
    };
    let publisher = BufferPublisher::with_base_url(
        Credential::env(&config.buffer.api_key_env),
        &config.buffer.base_url,
        Arc::new(limiter),
    )
    .with_media_check(config.buffer.check_media);

    let request = BufferRequest {
        profile_id: args.profile_id,
        text: args.text,
        media: args.media,
        scheduled_at: args.scheduled_at,
        top: args.top,
    };
    let context = ReportContext {
        account: config.general.account.clone(),
        content_chars: request.text.chars().count(),
        media_count: usize::from(request.media.is_some()),
        ..Default::default()
    };

    run(&publisher, &request, context, &args.output, config).await
}

pub async fn graph(args: GraphArgs, config: &AppConfig) -> Result<ExitCode> {
    let publisher = GraphPublisher::with_base_url(&config.instagram.base_url);

    // An absent token reaches validation as an empty one and is reported there.
    let access_token = args
        .access_token
        .or_else(|| std::env::var(&config.instagram.access_token_env).ok())
        .unwrap_or_default();

    let request = GraphRequest {
        post_type: args.post_type,
        caption: args.caption,
        image_url: args.image_url,
        schedule_time: args.schedule_time,
        access_token: SecretString::new(access_token.into()),
    };
    let context = ReportContext {
        account: config.general.account.clone(),
        content_chars: request.caption.chars().count(),
        media_count: usize::from(request.image_url.is_some()),
        ..Default::default()
    };

    run(&publisher, &request, context, &args.output, config).await
}

pub async fn late(args: LateArgs, config: &AppConfig) -> Result<ExitCode> {
    let publisher = LatePublisher::with_base_url(
        Credential::env(&config.late.api_key_env),
        Credential::env(&config.late.account_id_env),
        &config.late.base_url,
    );

    let request = LateRequest {
        account_id: args.account_id,
        content: args.content,
        media_urls: args.media_urls,
        schedule_time: args.schedule_time,
        post_type: args.post_type,
        hashtags: args.hashtags,
        mentions: args.mentions,
    };
    let context = ReportContext {
        account: config.general.account.clone(),
        content_chars: request.content.chars().count(),
        media_count: request.media_urls.len(),
        hashtag_count: request.hashtags.len(),
        ..Default::default()
    };

    run(&publisher, &request, context, &args.output, config).await
}

pub async fn zapier(args: ZapierArgs, config: &AppConfig) -> Result<ExitCode> {
    let publisher = WebhookPublisher::new(config.zapier.webhook_url.clone(), config.zapier_account());

    let request = WebhookRequest {
        content: args.content,
        media_urls: args.media_urls,
        preferred_posting_time: args.time,
        timezone: args.timezone,
        hashtags: args.hashtags,
        brand_name: args.brand_name,
    };

    if !args.output.report {
        return run(&publisher, &request, ReportContext::default(), &args.output, config).await;
    }

    let result = publisher
        .post_with_timeout(&request, deadline(&args.output, config))
        .await;
    println!("{}", publisher.render_report(&result, &request));

    Ok(exit_code(&result))
}

fn deadline(output: &OutputArgs, config: &AppConfig) -> Duration {
    Duration::from_secs(output.timeout_secs.unwrap_or(config.general.timeout_secs))
}

async fn run<A: PostingAdapter>(
    adapter: &A,
    request: &A::Request,
    context: ReportContext,
    output: &OutputArgs,
    config: &AppConfig,
) -> Result<ExitCode> {
    let limit = deadline(output, config);
    tracing::debug!(provider = %adapter.provider(), ?limit, "Posting");

    let result = adapter.post_with_timeout(request, limit).await;
    if let Some(kind) = result.error_kind() {
        tracing::warn!(provider = %result.provider, ?kind, "Post failed");
    }

    emit(&result, &context, output.report)
}

fn emit(result: &PostResult, context: &ReportContext, as_report: bool) -> Result<ExitCode> {
    if as_report {
        println!("{}", report::render(result, context, SystemClock.now()));
    } else {
        println!("{}", serde_json::to_string_pretty(result)?);
    }

    Ok(exit_code(result))
}

fn exit_code(result: &PostResult) -> ExitCode {
    if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
