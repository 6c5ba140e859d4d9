//! Nexus Mods backend.

use super::SourceBackend;
use crate::cache::{NexusCache, NexusCachedMod};
use crate::config::CacheFileConfig;
use crate::models::{ModSource, ModSources, NexusModData, NexusModInfo};

pub struct NexusBackend;

impl SourceBackend for NexusBackend {
    const SOURCE: ModSource = ModSource::NexusMods;
    const FILE_NAME: &'static str = CacheFileConfig::NEXUS_FILE_NAME;

    type Cache = NexusCache;
    type Slot = NexusModData;
    type Identity = i64;
    type Metadata = NexusModInfo;

    fn slot(sources: &mut ModSources) -> Option<&mut NexusModData> {
        sources.nexus.as_mut()
    }

    fn identity(slot: &NexusModData) -> Option<i64> {
        slot.is_enabled().then_some(slot.mod_id)
    }

    fn apply(uuid: &str, slot: &mut NexusModData, info: NexusModInfo, cache: &mut NexusCache) {
        cache.upsert(uuid, NexusCachedMod::from_info(uuid, &info));
        slot.name = info.name;
        slot.version = info.version;
        slot.summary = info.summary;
        slot.author = info.author;
        slot.updated_timestamp = info.updated_timestamp;
        slot.picture_url = info.picture_url;
    }
}
