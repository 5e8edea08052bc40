use serde::Serialize;
use serde_json::{Value, json};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::domain::errors::ApiError;
use crate::domain::ports::Clock;
use crate::frameworks::cli::{Cli, Commands};
use crate::frameworks::config::{ClientConfig, ConfigError};
use crate::interface_adapters::http::ReqwestTransport;
use crate::interface_adapters::protocol::{NewGig, ProfileUpdate};
use crate::interface_adapters::storage::FileSessionStore;
use crate::use_cases::booking_actions::BookingActionsUseCase;
use crate::use_cases::bookings::BookingsUseCase;
use crate::use_cases::credential_refresher::CredentialRefresher;
use crate::use_cases::gigs::GigsUseCase;
use crate::use_cases::login::LoginUseCase;
use crate::use_cases::logout::LogoutUseCase;
use crate::use_cases::profile::ProfileUseCase;
use crate::use_cases::register::{RegisterRequest, RegisterUseCase};
use crate::use_cases::request_pipeline::RequestPipeline;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

// Wall-clock time source for stamping new sessions.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0)
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Stdout carries command output, so logs go to stderr.
    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

// Wire the file-backed store and reqwest transport behind one pipeline.
pub fn build_pipeline(config: &ClientConfig) -> Result<RequestPipeline, AppError> {
    let store = Arc::new(FileSessionStore::new(config.session_file.clone()));
    let transport = Arc::new(ReqwestTransport::new(
        config.api_base_url.clone(),
        config.request_timeout,
    )?);
    let refresher = Arc::new(CredentialRefresher::new(
        store.clone(),
        transport.clone(),
        Arc::new(SystemClock),
    ));
    Ok(RequestPipeline::new(store, transport, refresher))
}

pub async fn run(cli: Cli) -> ExitCode {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = match ClientConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(api_base_url = %config.api_base_url, session_file = %config.session_file.display(), "client configured");

    let pipeline = match build_pipeline(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!(error = %e, "failed to start client");
            return ExitCode::FAILURE;
        }
    };

    match execute(&pipeline, cli.command).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(AppError::Api(ApiError::Validation(fields))) => {
            for (field, messages) in &fields {
                tracing::error!(field = %field, messages = ?messages, "rejected");
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}

// Run one command and render its result as pretty JSON.
pub async fn execute(pipeline: &RequestPipeline, command: Commands) -> Result<String, AppError> {
    let output = match command {
        Commands::Login { username, password } => {
            let session = LoginUseCase {
                pipeline,
                clock: SystemClock,
            }
            .execute(&username, &password)
            .await?;
            json!({ "logged_in": true, "issued_at": session.issued_at() })
        }
        Commands::Logout => {
            let response = LogoutUseCase {
                store: &**pipeline.store(),
            }
            .execute()
            .await?;
            json!({ "logged_out": true, "had_session": response.had_session })
        }
        Commands::Register {
            username,
            email,
            password,
        } => {
            let detail = RegisterUseCase { pipeline }
                .execute(RegisterRequest {
                    username,
                    email,
                    password,
                })
                .await?;
            json!({ "detail": detail })
        }
        Commands::Gigs => to_value(GigsUseCase { pipeline }.list().await?)?,
        Commands::Gig { id } => to_value(GigsUseCase { pipeline }.get(id).await?)?,
        Commands::CreateGig {
            title,
            description,
            price,
            delivery_time,
        } => to_value(
            GigsUseCase { pipeline }
                .create(NewGig {
                    title,
                    description,
                    price,
                    delivery_time,
                })
                .await?,
        )?,
        Commands::Book { gig_id } => to_value(BookingsUseCase { pipeline }.book(gig_id).await?)?,
        Commands::Bookings => to_value(BookingsUseCase { pipeline }.list().await?)?,
        Commands::Booking { id } => to_value(BookingsUseCase { pipeline }.get(id).await?)?,
        Commands::Pay { id } => to_value(
            BookingActionsUseCase { pipeline }
                .create_payment_order(id)
                .await?,
        )?,
        Commands::Dispute { id, description } => to_value(
            BookingActionsUseCase { pipeline }
                .open_dispute(id, &description)
                .await?,
        )?,
        Commands::Review {
            id,
            rating,
            comment,
        } => to_value(
            BookingActionsUseCase { pipeline }
                .submit_review(id, rating, comment.as_deref().unwrap_or_default())
                .await?,
        )?,
        Commands::Profile => to_value(ProfileUseCase { pipeline }.me().await?)?,
        Commands::UpdateProfile {
            bio,
            skills,
            portfolio_url,
            contact_email,
            contact_phone,
        } => to_value(
            ProfileUseCase { pipeline }
                .update(ProfileUpdate {
                    bio,
                    skills,
                    portfolio_url,
                    contact_email,
                    contact_phone,
                })
                .await?,
        )?,
    };

    Ok(serde_json::to_string_pretty(&output)?)
}

fn to_value<T: Serialize>(value: T) -> Result<Value, AppError> {
    Ok(serde_json::to_value(value)?)
}
