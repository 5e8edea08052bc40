use serde_json::json;
use tracing::info;

use crate::domain::entities::{Booking, Dispute, PaymentOrder, Review};
use crate::domain::errors::ApiError;
use crate::domain::lifecycle::{BookingAction, actions_for};
use crate::domain::request::ApiRequest;
use crate::use_cases::request_pipeline::RequestPipeline;

const MAX_RATING: u8 = 5;

// Follow-up actions on a booking. Each one re-reads the booking and only
// proceeds when the server's current status offers that action.
pub struct BookingActionsUseCase<'a> {
    pub pipeline: &'a RequestPipeline,
}

impl BookingActionsUseCase<'_> {
    #[tracing::instrument(name = "create_payment_order", skip(self))]
    pub async fn create_payment_order(&self, booking_id: u64) -> Result<PaymentOrder, ApiError> {
        self.require(booking_id, BookingAction::Pay).await?;

        let order: PaymentOrder = self
            .pipeline
            .call_json(ApiRequest::post("create-order/", json!({ "booking": booking_id })))
            .await?;
        info!(order_id = %order.order_id, "payment order created");
        Ok(order)
    }

    #[tracing::instrument(name = "open_dispute", skip(self, description))]
    pub async fn open_dispute(
        &self,
        booking_id: u64,
        description: &str,
    ) -> Result<Dispute, ApiError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ApiError::invalid_field(
                "description",
                "Describe the problem before opening a dispute.",
            ));
        }
        self.require(booking_id, BookingAction::Dispute).await?;

        self.pipeline
            .call_json(ApiRequest::post(
                "disputes/",
                json!({ "booking": booking_id, "description": description }),
            ))
            .await
    }

    #[tracing::instrument(name = "submit_review", skip(self, comment))]
    pub async fn submit_review(
        &self,
        booking_id: u64,
        rating: u8,
        comment: &str,
    ) -> Result<Review, ApiError> {
        if !(1..=MAX_RATING).contains(&rating) {
            return Err(ApiError::invalid_field("rating", "Rating must be between 1 and 5."));
        }
        self.require(booking_id, BookingAction::Review).await?;

        self.pipeline
            .call_json(ApiRequest::post(
                "reviews/",
                json!({ "booking": booking_id, "rating": rating, "comment": comment.trim() }),
            ))
            .await
    }

    // Fetch the booking fresh and check its status allows `action`.
    async fn require(&self, booking_id: u64, action: BookingAction) -> Result<Booking, ApiError> {
        let booking: Booking = self
            .pipeline
            .call_json(ApiRequest::get(format!("bookings/{booking_id}/")))
            .await?;

        if !actions_for(&booking.status).contains(action) {
            return Err(ApiError::ActionNotAllowed {
                booking_id,
                status: booking.status,
                action,
            });
        }
        Ok(booking)
    }
}
