use serde::Serialize;
use serde_json::json;

use crate::domain::entities::Booking;
use crate::domain::errors::ApiError;
use crate::domain::lifecycle::{ActionSet, actions_for, is_terminal};
use crate::domain::request::ApiRequest;
use crate::use_cases::request_pipeline::RequestPipeline;

// A fetched booking together with what the client may offer for it.
#[derive(Clone, Debug, Serialize)]
pub struct BookingView {
    pub booking: Booking,
    #[serde(serialize_with = "serialize_actions")]
    pub actions: ActionSet,
    pub terminal: bool,
}

impl BookingView {
    pub fn from_booking(booking: Booking) -> Self {
        let actions = actions_for(&booking.status);
        let terminal = is_terminal(&booking.status);
        Self {
            booking,
            actions,
            terminal,
        }
    }
}

fn serialize_actions<S: serde::Serializer>(actions: &ActionSet, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(actions.iter().map(|action| action.to_string()))
}

// Booking reads and creation. Status always comes from the latest server response.
pub struct BookingsUseCase<'a> {
    pub pipeline: &'a RequestPipeline,
}

impl BookingsUseCase<'_> {
    pub async fn get(&self, booking_id: u64) -> Result<BookingView, ApiError> {
        let booking: Booking = self
            .pipeline
            .call_json(ApiRequest::get(format!("bookings/{booking_id}/")))
            .await?;
        Ok(BookingView::from_booking(booking))
    }

    // Bookings owned by the signed-in identity.
    pub async fn list(&self) -> Result<Vec<BookingView>, ApiError> {
        let bookings: Vec<Booking> = self.pipeline.call_json(ApiRequest::get("bookings/")).await?;
        Ok(bookings.into_iter().map(BookingView::from_booking).collect())
    }

    #[tracing::instrument(name = "book_gig", skip(self))]
    pub async fn book(&self, gig_id: u64) -> Result<BookingView, ApiError> {
        let booking: Booking = self
            .pipeline
            .call_json(ApiRequest::post("bookings/", json!({ "gig": gig_id })))
            .await?;
        Ok(BookingView::from_booking(booking))
    }
}
