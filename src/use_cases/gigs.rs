use serde_json::json;

use crate::domain::entities::Gig;
use crate::domain::errors::ApiError;
use crate::domain::request::ApiRequest;
use crate::interface_adapters::protocol::NewGig;
use crate::use_cases::request_pipeline::RequestPipeline;

// Gig browsing and listing management.
pub struct GigsUseCase<'a> {
    pub pipeline: &'a RequestPipeline,
}

impl GigsUseCase<'_> {
    pub async fn list(&self) -> Result<Vec<Gig>, ApiError> {
        self.pipeline.call_json(ApiRequest::get("gigs/")).await
    }

    pub async fn get(&self, gig_id: u64) -> Result<Gig, ApiError> {
        self.pipeline
            .call_json(ApiRequest::get(format!("gigs/{gig_id}/")))
            .await
    }

    #[tracing::instrument(name = "create_gig", skip_all, fields(title = %gig.title))]
    pub async fn create(&self, gig: NewGig) -> Result<Gig, ApiError> {
        validate_new_gig(&gig)?;
        self.pipeline
            .call_json(ApiRequest::post(
                "gigs/",
                json!({
                    "title": gig.title,
                    "description": gig.description,
                    "price": gig.price,
                    "delivery_time": gig.delivery_time,
                }),
            ))
            .await
    }
}

fn validate_new_gig(gig: &NewGig) -> Result<(), ApiError> {
    const MAX_TITLE_LEN: usize = 200;

    let title_len = gig.title.trim().chars().count();
    if title_len == 0 || title_len > MAX_TITLE_LEN {
        return Err(ApiError::invalid_field(
            "title",
            "Title must be between 1 and 200 characters.",
        ));
    }
    if gig.delivery_time == 0 {
        return Err(ApiError::invalid_field(
            "delivery_time",
            "Delivery time must be at least one day.",
        ));
    }
    let price_is_valid = gig
        .price
        .parse::<f64>()
        .map(|price| price.is_finite() && price >= 0.0)
        .unwrap_or(false);
    if !price_is_valid {
        return Err(ApiError::invalid_field("price", "A valid number is required."));
    }
    Ok(())
}
