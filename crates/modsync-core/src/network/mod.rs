//! Network clients for the remote mod backends.
//!
//! Every client implements [`FetchLatest`](crate::sources::FetchLatest) and
//! shares one [`HttpClient`], which tracks rate limits per service. Requests
//! are not retried.

mod client;
mod github;
mod nexus;
mod steam;

pub use client::{extract_domain, HttpClient, RateLimitState};
pub use github::{parse_latest_release, GitHubClient};
pub use nexus::{parse_mod_info, NexusClient};
pub use steam::{parse_file_details, SteamWorkshopClient};
