use clap::{Parser, Subcommand};

// Command-line surface of the marketplace client.
#[derive(Debug, Parser)]
#[command(name = "gig-client", version, about = "Freelance gig marketplace client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in and store the credential pair.
    Login {
        username: String,
        #[arg(long, env = "GIG_CLIENT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored credential pair.
    Logout,
    /// Create an account. Does not sign in.
    Register {
        username: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, env = "GIG_CLIENT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// List published gigs.
    Gigs,
    /// Show one gig.
    Gig { id: u64 },
    /// Publish a new gig as the signed-in freelancer.
    CreateGig {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        price: String,
        #[arg(long)]
        delivery_time: u32,
    },
    /// Book a gig.
    Book { gig_id: u64 },
    /// List your bookings with the actions each one allows.
    Bookings,
    /// Show one booking with the actions it allows.
    Booking { id: u64 },
    /// Create a payment order for a pending booking.
    Pay { id: u64 },
    /// Open a dispute on a booking.
    Dispute { id: u64, description: String },
    /// Review a completed booking.
    Review {
        id: u64,
        rating: u8,
        comment: Option<String>,
    },
    /// Show your profile.
    Profile,
    /// Change fields of your profile.
    UpdateProfile {
        #[arg(long)]
        bio: Option<String>,
        #[arg(long, value_delimiter = ',')]
        skills: Option<Vec<String>>,
        #[arg(long)]
        portfolio_url: Option<String>,
        #[arg(long)]
        contact_email: Option<String>,
        #[arg(long)]
        contact_phone: Option<String>,
    },
}
