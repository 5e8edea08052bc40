use serde::{Deserialize, Serialize};
use std::fmt;

// Access/refresh credential pair held by the session store.
// Both credentials are only ever constructed, saved and cleared together.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    access: String,
    refresh: String,
    issued_at: u64,
}

impl Session {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>, issued_at: u64) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
            issued_at,
        }
    }

    pub fn access(&self) -> &str {
        &self.access
    }

    pub fn refresh(&self) -> &str {
        &self.refresh
    }

    pub fn issued_at(&self) -> u64 {
        self.issued_at
    }
}

// Credentials stay out of logs and panic messages.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

// Server-reported booking status. Unrecognized values are kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Failed,
    Unknown(String),
}

impl BookingStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Failed => "FAILED",
            BookingStatus::Unknown(raw) => raw,
        }
    }
}

impl From<String> for BookingStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PENDING" => BookingStatus::Pending,
            "CONFIRMED" => BookingStatus::Confirmed,
            "COMPLETED" => BookingStatus::Completed,
            "FAILED" => BookingStatus::Failed,
            _ => BookingStatus::Unknown(value),
        }
    }
}

impl From<BookingStatus> for String {
    fn from(value: BookingStatus) -> Self {
        match value {
            BookingStatus::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Public profile of a marketplace user.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub id: u64,
    pub user: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub portfolio_url: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
}

// Service listing offered by a freelancer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Gig {
    pub id: u64,
    pub title: String,
    pub description: String,
    // Decimal amount as rendered by the server, e.g. "149.00".
    pub price: String,
    // Days to deliver.
    pub delivery_time: u32,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub freelancer: Option<Profile>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FreelancerContact {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

// Read-only projection of a booking as last reported by the server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Booking {
    pub id: u64,
    pub status: BookingStatus,
    pub gig_detail: Gig,
    #[serde(default)]
    pub booked_at: Option<String>,
    #[serde(default)]
    pub freelancer_contact: Option<FreelancerContact>,
}

// Payment order created for a pending booking.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub order_id: String,
    // Amount in the smallest currency unit.
    pub amount: u64,
    pub currency: String,
    pub key: String,
    pub transaction_id: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Dispute {
    pub id: u64,
    pub booking: u64,
    pub description: String,
    pub resolution_status: String,
    #[serde(default)]
    pub opened_at: Option<String>,
    #[serde(default)]
    pub resolved_at: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    pub booking: u64,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub reviewed_at: Option<String>,
}
