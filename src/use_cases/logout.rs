use tracing::info;

use crate::domain::errors::ApiError;
use crate::domain::ports::SessionStore;

// Response returned by the logout use case.
pub struct LogoutResponse {
    pub had_session: bool,
}

// Logout use case: drop both credentials together.
pub struct LogoutUseCase<'a> {
    pub store: &'a dyn SessionStore,
}

impl LogoutUseCase<'_> {
    pub async fn execute(&self) -> Result<LogoutResponse, ApiError> {
        let had_session = self
            .store
            .load()
            .await
            .map_err(ApiError::Storage)?
            .is_some();

        self.store.clear().await.map_err(ApiError::Storage)?;

        info!(had_session, "logged out");
        Ok(LogoutResponse { had_session })
    }
}
