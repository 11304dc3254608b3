/// Shared generation workflow for the HTTP handlers and the CSV export
///
/// 1. Validate the request (country, count, fields)
/// 2. Generate each profile from the locale faker and the IBAN pool
/// 3. Provision a mailbox per profile when `email` is selected
/// 4. Collect warnings instead of failing the batch
use crate::errors::AppError;
use crate::export;
use crate::generator::ProfileGenerator;
use crate::handlers::AppState;
use crate::models::{ExtraField, GenerateRequest, GenerateResponse, MailboxCredential};
use uuid::Uuid;

pub const MIN_PROFILES: u32 = 1;
pub const MAX_PROFILES: u32 = 25;

/// Written to the email column when mailbox creation fails.
pub const EMAIL_CREATION_FAILED: &str = "creation failed";

pub fn validate_request(request: &GenerateRequest) -> Result<(), AppError> {
    if !(MIN_PROFILES..=MAX_PROFILES).contains(&request.count) {
        return Err(AppError::BadRequest(format!(
            "count must be between {} and {}",
            MIN_PROFILES, MAX_PROFILES
        )));
    }
    Ok(())
}

/// Generates a batch of profiles.
///
/// Mailbox failures never abort the batch: the email cell gets
/// [`EMAIL_CREATION_FAILED`] and the error text is added to `warnings`.
pub async fn generate_batch(
    state: &AppState,
    request: &GenerateRequest,
) -> Result<GenerateResponse, AppError> {
    validate_request(request)?;

    let batch_id = Uuid::new_v4();
    let wants_email = request.fields.contains(&ExtraField::Email);
    tracing::info!(
        "Batch {}: generating {} profiles for {} (email: {}, provider: {})",
        batch_id,
        request.count,
        request.country.code(),
        wants_email,
        request.provider
    );

    let mut profiles = Vec::with_capacity(request.count as usize);
    let mut mailbox: Option<MailboxCredential> = None;
    let mut warnings: Vec<String> = Vec::new();

    for index in 0..request.count {
        let mut profile = ProfileGenerator::generate(request.country, &request.fields, &state.ibans);

        if wants_email {
            match state
                .providers
                .create(request.provider, request.domain.as_deref())
                .await
            {
                Ok(provisioned) => {
                    profile.email = Some(provisioned.credential.address().to_string());
                    if let Some(warning) = provisioned.warning {
                        if !warnings.contains(&warning) {
                            warnings.push(warning);
                        }
                    }
                    mailbox = Some(provisioned.credential);
                }
                Err(e) => {
                    tracing::warn!(
                        "Batch {}: {} mailbox creation failed for profile {}: {}",
                        batch_id,
                        request.provider,
                        index + 1,
                        e
                    );
                    warnings.push(format!(
                        "Profile {}: {} mailbox creation failed: {}",
                        index + 1,
                        request.provider,
                        e
                    ));
                    profile.email = Some(EMAIL_CREATION_FAILED.to_string());
                }
            }
        }

        profiles.push(profile);
    }

    tracing::info!(
        "Batch {}: {} profiles generated, {} warnings",
        batch_id,
        profiles.len(),
        warnings.len()
    );

    Ok(GenerateResponse {
        batch_id,
        columns: export::columns(&request.fields),
        profiles,
        mailbox,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Country, Provider};

    fn request(count: u32) -> GenerateRequest {
        GenerateRequest {
            country: Country::Italy,
            count,
            fields: vec![],
            provider: Provider::GuerrillaMail,
            domain: None,
        }
    }

    #[test]
    fn test_count_bounds() {
        assert!(validate_request(&request(0)).is_err());
        assert!(validate_request(&request(1)).is_ok());
        assert!(validate_request(&request(25)).is_ok());
        assert!(validate_request(&request(26)).is_err());
    }
}
