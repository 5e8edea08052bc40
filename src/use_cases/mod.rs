pub mod booking_actions;
pub mod bookings;
pub mod credential_refresher;
pub mod gigs;
pub mod login;
pub mod logout;
pub mod profile;
pub mod register;
pub mod request_pipeline;

#[cfg(test)]
pub(crate) mod test_support;
