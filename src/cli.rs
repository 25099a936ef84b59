//! CLI definition using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use sparrow_ride_client::models::{TripLocations, VehicleCategory};

#[derive(Parser)]
#[command(name = "sparrow-ride")]
#[command(version)]
#[command(about = "Terminal client for the Sparrow ride-hailing backend")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend base URL. Overrides SPARROW_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with a phone number. Without --otp an OTP is sent first.
    Login {
        #[arg(long)]
        phone: String,

        /// Code received by SMS
        #[arg(long)]
        otp: Option<String>,
    },

    /// Log out and forget stored tokens
    Logout,

    /// Show what this account can do
    Home,

    /// Rider commands
    #[command(subcommand)]
    Rider(RiderCommand),

    /// Driver commands
    #[command(subcommand)]
    Driver(DriverCommand),
}

#[derive(Subcommand)]
pub enum RiderCommand {
    /// Compare fares across vehicle categories
    Estimate(LocationArgs),

    /// Request a ride
    Book {
        #[command(flatten)]
        locations: LocationArgs,

        #[arg(long, value_enum, default_value_t = Category::Auto)]
        category: Category,

        /// Follow the trip after booking
        #[arg(long)]
        watch: bool,
    },

    /// Show a trip once
    Status { trip_id: i64 },

    /// Follow a trip until it finishes
    Watch { trip_id: i64 },

    /// Cancel a trip
    Cancel { trip_id: i64 },

    /// Show the ride in progress, if any
    Active,
}

#[derive(Subcommand)]
pub enum DriverCommand {
    /// Profile and shift status
    Dashboard,

    /// Start a shift
    Online,

    /// End the current shift
    Offline,

    /// List incoming offers
    Dispatches {
        #[arg(long)]
        watch: bool,
    },

    /// Accept an offer
    Accept { attempt_id: i64 },

    /// Reject an offer
    Reject { attempt_id: i64 },

    /// Show the active trip
    Trip {
        #[arg(long)]
        watch: bool,
    },

    /// Tell the rider you are at the pickup
    Arrive,

    /// Check the rider's pickup OTP without starting the trip
    VerifyOtp { otp: String },

    /// Verify the rider's OTP and start the trip
    Pickup { otp: String },

    /// Finish the active trip
    Complete,
}

#[derive(Args, Clone, Copy)]
pub struct LocationArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub pickup_lat: f64,
    #[arg(long, allow_hyphen_values = true)]
    pub pickup_lng: f64,
    #[arg(long, allow_hyphen_values = true)]
    pub drop_lat: f64,
    #[arg(long, allow_hyphen_values = true)]
    pub drop_lng: f64,
}

impl From<LocationArgs> for TripLocations {
    fn from(args: LocationArgs) -> Self {
        TripLocations {
            pickup_lat: args.pickup_lat,
            pickup_lng: args.pickup_lng,
            drop_lat: args.drop_lat,
            drop_lng: args.drop_lng,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Category {
    Bike,
    Auto,
    Sedan,
}

impl From<Category> for VehicleCategory {
    fn from(category: Category) -> Self {
        match category {
            Category::Bike => VehicleCategory::Bike,
            Category::Auto => VehicleCategory::Auto,
            Category::Sedan => VehicleCategory::Sedan,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(VehicleCategory::from(*self).as_str())
    }
}
