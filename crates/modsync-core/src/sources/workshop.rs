//! Steam Workshop backend.

use super::SourceBackend;
use crate::cache::WorkshopCache;
use crate::config::CacheFileConfig;
use crate::models::{ModSource, ModSources, PublishedFileDetails, WorkshopModData};

pub struct WorkshopBackend;

impl SourceBackend for WorkshopBackend {
    const SOURCE: ModSource = ModSource::SteamWorkshop;
    const FILE_NAME: &'static str = CacheFileConfig::WORKSHOP_FILE_NAME;

    type Cache = WorkshopCache;
    type Slot = WorkshopModData;
    /// Published file id.
    type Identity = u64;
    type Metadata = PublishedFileDetails;

    fn slot(sources: &mut ModSources) -> Option<&mut WorkshopModData> {
        sources.workshop.as_mut()
    }

    fn identity(slot: &WorkshopModData) -> Option<u64> {
        slot.is_enabled().then_some(slot.workshop_id)
    }

    fn is_known_absent(uuid: &str, cache: &WorkshopCache) -> bool {
        cache.is_non_participating(uuid)
    }

    fn apply(
        uuid: &str,
        slot: &mut WorkshopModData,
        details: PublishedFileDetails,
        cache: &mut WorkshopCache,
    ) {
        let tags = details.normalized_tags();
        slot.created = details.time_created;
        slot.updated = details.time_updated;
        slot.tags = tags.clone();
        cache.add_or_update(uuid, &details, &tags);
    }

    fn on_not_found(uuid: &str, cache: &mut WorkshopCache) {
        cache.add_non_participating(uuid);
    }
}
