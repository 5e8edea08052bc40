use serde_json::json;

use crate::domain::errors::ApiError;
use crate::domain::request::ApiRequest;
use crate::interface_adapters::protocol::MessageResponse;
use crate::use_cases::request_pipeline::RequestPipeline;

const REGISTER_PATH: &str = "register/";

// Signup request fields.
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

// Signup use case. Registering does not log the new account in.
pub struct RegisterUseCase<'a> {
    pub pipeline: &'a RequestPipeline,
}

impl RegisterUseCase<'_> {
    #[tracing::instrument(name = "register", skip_all, fields(username = %request.username))]
    pub async fn execute(&self, request: RegisterRequest) -> Result<String, ApiError> {
        if request.username.trim().is_empty() {
            return Err(ApiError::invalid_field("username", "This field may not be blank."));
        }
        if request.password.is_empty() {
            return Err(ApiError::invalid_field("password", "This field may not be blank."));
        }
        if !request.email.is_empty() && !request.email.contains('@') {
            return Err(ApiError::invalid_field("email", "Enter a valid email address."));
        }

        let response: MessageResponse = self
            .pipeline
            .call_public_json(ApiRequest::post(
                REGISTER_PATH,
                json!({
                    "username": request.username,
                    "email": request.email,
                    "password": request.password,
                }),
            ))
            .await?;

        Ok(response.detail)
    }
}
