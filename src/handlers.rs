use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::export;
use crate::generation;
use crate::iban::IbanAllocator;
use crate::integrations::{self, MailProviders};
use crate::models::*;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Process-wide IBAN pool cursors.
    pub ibans: IbanAllocator,
    /// Mailbox provider dispatch table.
    pub providers: MailProviders,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let providers = MailProviders::from_config(&config)?;
        Ok(Self {
            config,
            ibans: IbanAllocator::new(),
            providers,
        })
    }
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "fake-profile-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /api/v1/providers
///
/// Lists the mailbox providers the form offers.
pub async fn list_providers() -> Json<Vec<ProviderInfo>> {
    Json(
        Provider::ALL
            .into_iter()
            .map(|p| ProviderInfo {
                slug: p.slug().to_string(),
                name: p.display_name().to_string(),
                has_inbox_api: integrations::has_inbox_api(p),
            })
            .collect(),
    )
}

/// GET /api/v1/providers/mailtm/domains
///
/// Domains for the mail.tm selector. A failure yields an empty list and a
/// warning so the form can still render.
pub async fn mailtm_domains(State(state): State<Arc<AppState>>) -> Json<DomainsResponse> {
    match state.providers.mailtm_domains().await {
        Ok(domains) => {
            let warning = domains
                .is_empty()
                .then(|| "No mail.tm domain available.".to_string());
            Json(DomainsResponse { domains, warning })
        }
        Err(e) => {
            tracing::warn!("Failed to load mail.tm domains: {}", e);
            Json(DomainsResponse {
                domains: Vec::new(),
                warning: Some(format!("No mail.tm domain available: {}", e)),
            })
        }
    }
}

/// GET /api/v1/iban/:country
///
/// Next IBAN from the country's pool; unknown codes get `N/A`.
pub async fn next_iban(
    State(state): State<Arc<AppState>>,
    Path(country): Path<String>,
) -> Json<IbanResponse> {
    let iban = state.ibans.next_iban(&country);
    Json(IbanResponse {
        country: country.to_uppercase(),
        iban,
    })
}

/// POST /api/v1/profiles
///
/// Generates profiles and, when requested, disposable mailboxes.
pub async fn generate_profiles(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    tracing::info!("POST /profiles - request: {:?}", request);
    let response = generation::generate_batch(&state, &request).await?;
    Ok(Json(response))
}

/// POST /api/v1/profiles/csv
///
/// Same as `generate_profiles`, returned as a CSV attachment.
pub async fn generate_profiles_csv(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Response, AppError> {
    tracing::info!("POST /profiles/csv - request: {:?}", request);
    let batch = generation::generate_batch(&state, &request).await?;
    for warning in &batch.warnings {
        tracing::warn!("Batch {}: {}", batch.batch_id, warning);
    }

    csv_attachment(&batch.profiles, &request.fields)
}

/// POST /api/v1/profiles/export
///
/// Exports rows the caller already holds, so the download matches the
/// table on screen. Nothing is generated and no mailbox is created.
pub async fn export_profiles(Json(request): Json<ExportRequest>) -> Result<Response, AppError> {
    tracing::info!(
        "POST /profiles/export - {} profiles, fields: {:?}",
        request.profiles.len(),
        request.fields
    );
    csv_attachment(&request.profiles, &request.fields)
}

fn csv_attachment(profiles: &[Profile], fields: &[ExtraField]) -> Result<Response, AppError> {
    let csv = export::to_csv(profiles, fields)?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, export::CSV_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export::CSV_FILENAME),
            ),
        ],
        csv,
    )
        .into_response())
}

/// POST /api/v1/inbox
///
/// Polls the inbox behind a credential returned by `generate_profiles`.
pub async fn check_inbox(
    State(state): State<Arc<AppState>>,
    Json(credential): Json<MailboxCredential>,
) -> Result<Json<Inbox>, AppError> {
    let inbox = state
        .providers
        .inbox(&credential)
        .await
        .with_context(|| format!("Reading {} inbox", credential.provider()))?;

    tracing::info!(
        "Inbox {} ({}): {} messages",
        inbox.address,
        inbox.provider,
        inbox.messages.len()
    );
    Ok(Json(inbox))
}
