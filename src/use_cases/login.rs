use serde_json::json;
use tracing::info;

use crate::domain::entities::Session;
use crate::domain::errors::ApiError;
use crate::domain::ports::Clock;
use crate::domain::request::ApiRequest;
use crate::interface_adapters::protocol::{TOKEN_PATH, TokenPairResponse};
use crate::use_cases::request_pipeline::RequestPipeline;

// Login use case: exchange username/password for a credential pair and store it.
pub struct LoginUseCase<'a, C> {
    pub pipeline: &'a RequestPipeline,
    pub clock: C,
}

impl<C> LoginUseCase<'_, C>
where
    C: Clock,
{
    #[tracing::instrument(name = "login", skip_all, fields(username = %username))]
    pub async fn execute(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        if username.trim().is_empty() {
            return Err(ApiError::invalid_field("username", "This field may not be blank."));
        }
        if password.is_empty() {
            return Err(ApiError::invalid_field("password", "This field may not be blank."));
        }

        let pair: TokenPairResponse = self
            .pipeline
            .call_public_json(ApiRequest::post(
                TOKEN_PATH,
                json!({ "username": username, "password": password }),
            ))
            .await?;

        // Login must yield both halves of the pair; never store one alone.
        let refresh = pair
            .refresh
            .ok_or_else(|| ApiError::Decode("token response is missing `refresh`".to_string()))?;
        let session = Session::new(pair.access, refresh, self.clock.now_epoch_seconds());

        self.pipeline
            .store()
            .save(session.clone())
            .await
            .map_err(ApiError::Storage)?;

        info!("logged in");
        Ok(session)
    }
}
