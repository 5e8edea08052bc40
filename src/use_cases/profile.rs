use crate::domain::entities::Profile;
use crate::domain::errors::ApiError;
use crate::domain::request::ApiRequest;
use crate::interface_adapters::protocol::ProfileUpdate;
use crate::use_cases::request_pipeline::RequestPipeline;

const MY_PROFILE_PATH: &str = "profiles/me/";

// Read and edit the signed-in user's own profile.
pub struct ProfileUseCase<'a> {
    pub pipeline: &'a RequestPipeline,
}

impl ProfileUseCase<'_> {
    pub async fn me(&self) -> Result<Profile, ApiError> {
        self.pipeline.call_json(ApiRequest::get(MY_PROFILE_PATH)).await
    }

    pub async fn update(&self, update: ProfileUpdate) -> Result<Profile, ApiError> {
        if let Some(email) = update.contact_email.as_deref() {
            if !email.is_empty() && !email.contains('@') {
                return Err(ApiError::invalid_field(
                    "contact_email",
                    "Enter a valid email address.",
                ));
            }
        }

        let body =
            serde_json::to_value(&update).map_err(|err| ApiError::Decode(err.to_string()))?;
        self.pipeline
            .call_json(ApiRequest::patch(MY_PROFILE_PATH, body))
            .await
    }
}
