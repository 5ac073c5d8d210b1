//! Command-line interface for the transcription API.
//!
//! Thin wrapper over the library: submit a file or URL, fetch or list jobs,
//! cancel a job. Output is the job JSON on stdout.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use salad_transcribe::models::{TranscriptionInput, TranscriptionRequest};
use salad_transcribe::{Error, TranscriptionClient};

#[derive(Debug, Parser)]
#[command(name = "salad-transcribe", version, about)]
struct Cli {
    /// API key (falls back to the SALAD_API_KEY environment variable)
    #[arg(long, env = "SALAD_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Organization name
    #[arg(long)]
    organization: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit a file or URL for transcription
    Transcribe {
        /// Media to transcribe: http(s) URL or local file path
        source: String,

        /// Spoken language code (e.g. "en")
        #[arg(long)]
        language: Option<String>,

        /// Enable speaker diarization
        #[arg(long)]
        diarization: bool,

        /// Produce SRT captions
        #[arg(long)]
        srt: bool,

        /// Webhook URL notified on completion
        #[arg(long)]
        webhook: Option<String>,

        /// Poll until the job finishes instead of returning immediately
        #[arg(long)]
        wait: bool,
    },

    /// Fetch a job by ID
    Get {
        /// Job ID
        job_id: String,
    },

    /// List jobs
    List {
        /// Page number
        #[arg(long)]
        page: Option<u32>,

        /// Items per page
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Cancel a job
    Cancel {
        /// Job ID
        job_id: String,
    },
}

/// Sets up the tracing subscriber for logging.
fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => tracing::error!("Failed to render output: {e}"),
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let client = TranscriptionClient::new(cli.api_key)?;
    let organization = cli.organization.as_str();

    match cli.command {
        Command::Transcribe {
            source,
            language,
            diarization,
            srt,
            webhook,
            wait,
        } => {
            let mut request = TranscriptionRequest::new(TranscriptionInput {
                language_code: language,
                diarization: diarization.then_some(true),
                srt: srt.then_some(true),
                ..TranscriptionInput::default()
            });
            if let Some(webhook) = webhook {
                request = request.with_webhook(webhook);
            }

            let job = if wait {
                client
                    .transcribe_and_wait(source.as_str(), organization, &request)
                    .await?
            } else {
                client
                    .transcribe(source.as_str(), organization, &request)
                    .await?
            };
            print_json(&job);
        }
        Command::Get { job_id } => {
            let job = client.get_job(organization, &job_id).await?;
            print_json(&job);
        }
        Command::List { page, page_size } => {
            let jobs = client.list_jobs(organization, page, page_size).await?;
            print_json(&jobs);
        }
        Command::Cancel { job_id } => {
            client.delete_job(organization, &job_id).await?;
            tracing::info!("Job {job_id} cancelled");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
