//! Headless picture fetch

use anyhow::Result;
use clap::Args;

use crate::cli::output::{OutputFormat, print_error, print_formatted};
use crate::config::Config;
use crate::fetch::{FetchController, HttpFetcher, RetryPolicy, Settlement, View};
use crate::picture::Picture;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Endpoint to fetch instead of the configured source
    #[arg(long)]
    pub url: Option<String>,

    /// Retry this many times after a failed attempt
    #[arg(long, default_value = "0")]
    pub retries: u32,
}

pub async fn run(args: FetchArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let config = Config::load()?;
    let url = args.url.unwrap_or_else(|| config.source.url.clone());
    let policy = config.fetch.retry_policy();

    let fetcher = HttpFetcher::<Picture>::new(&config.fetch)?;
    let mut controller = FetchController::with_target(fetcher, url);
    fetch_with_retries(&mut controller, args.retries, policy, quiet).await;

    match policy.view_of(&controller) {
        View::Ready(picture) => {
            print_formatted(picture, format, format_picture);
            Ok(())
        }
        View::Unavailable => {
            anyhow::bail!("Sorry it seems this functionality is not available at the moment")
        }
        View::Retry { error_count } => {
            anyhow::bail!("Failed to fetch picture after {} attempt(s)", error_count)
        }
        View::Loading | View::Prompt => anyhow::bail!("Request was cancelled"),
    }
}

/// Wait for the armed controller, reloading after each failure until
/// `retries` are used up or the policy says to stop.
async fn fetch_with_retries<P: Send + 'static>(
    controller: &mut FetchController<P>,
    retries: u32,
    policy: RetryPolicy,
    quiet: bool,
) {
    while let Some(Settlement::Failed {
        error_count,
        message,
    }) = controller.settled().await
    {
        if !quiet {
            print_error(&message);
        }
        if error_count > retries || policy.is_exhausted(error_count) {
            break;
        }
        tracing::info!("Retrying ({} of {})", error_count, retries);
        controller.reload();
    }
}

fn format_picture(picture: &Picture) -> String {
    let mut lines = vec![
        picture.title.clone(),
        picture.date_display(),
    ];
    if let Some(credit) = picture.credit() {
        lines.push(format!("Credit: {}", credit));
    }
    lines.push(String::new());
    lines.push(picture.explanation.clone());
    lines.push(String::new());
    lines.push(picture.full_url().to_string());
    lines.join("\n")
}
