//! Data models consumed by the sync engine.

mod descriptor;
mod published;
mod source;
mod version;

pub use descriptor::{
    GitHubLatestRelease, GitHubModData, ModDescriptor, ModSources, NexusModData, WorkshopModData,
};
pub use published::{NexusModInfo, PublishedFileDetails};
pub use source::ModSource;
pub use version::{is_newer_version, ModVersion};
