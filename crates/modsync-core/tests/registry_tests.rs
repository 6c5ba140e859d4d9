//! Integration tests for the CacheRegistry public interface.
//!
//! Backends are driven by scripted fetchers so every refresh is offline and
//! deterministic.

use async_trait::async_trait;
use modsync_core::cache::{SourceCache, WorkshopCachedMod};
use modsync_core::models::{GitHubLatestRelease, NexusModInfo, PublishedFileDetails};
use modsync_core::sources::{FetchLatest, GitHubRepo};
use modsync_core::{
    CacheRegistry, CancellationToken, Fetchers, ModDescriptor, ModSource, ModSyncError, Result,
    SyncSettings,
};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

enum Reply<M> {
    Found(M),
    Missing,
    Fail,
    /// Cancel the session token, then never complete.
    Hang(CancellationToken),
}

struct ScriptedFetcher<I, M> {
    replies: HashMap<I, Reply<M>>,
    calls: Mutex<Vec<I>>,
}

impl<I: Eq + Hash + Clone, M> ScriptedFetcher<I, M> {
    fn new() -> Self {
        Self {
            replies: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn reply(mut self, identity: I, reply: Reply<M>) -> Self {
        self.replies.insert(identity, reply);
        self
    }

    fn calls(&self) -> Vec<I> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl<I, M> FetchLatest for ScriptedFetcher<I, M>
where
    I: Eq + Hash + Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
{
    type Identity = I;
    type Metadata = M;

    async fn fetch_latest(&self, identity: &I, _cancel: &CancellationToken) -> Result<Option<M>> {
        self.calls.lock().unwrap().push(identity.clone());
        match self.replies.get(identity) {
            Some(Reply::Found(metadata)) => Ok(Some(metadata.clone())),
            Some(Reply::Missing) | None => Ok(None),
            Some(Reply::Fail) => Err(ModSyncError::Network {
                message: "connection reset".to_string(),
                cause: None,
            }),
            Some(Reply::Hang(token)) => {
                token.cancel();
                std::future::pending::<()>().await;
                Ok(None)
            }
        }
    }
}

type GitHubFetcher = ScriptedFetcher<GitHubRepo, GitHubLatestRelease>;
type WorkshopFetcher = ScriptedFetcher<u64, PublishedFileDetails>;
type NexusFetcher = ScriptedFetcher<i64, NexusModInfo>;

struct TestEnv {
    temp_dir: TempDir,
    github: Arc<GitHubFetcher>,
    workshop: Arc<WorkshopFetcher>,
    nexus: Arc<NexusFetcher>,
}

impl TestEnv {
    fn new(github: GitHubFetcher, workshop: WorkshopFetcher, nexus: NexusFetcher) -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
            github: Arc::new(github),
            workshop: Arc::new(workshop),
            nexus: Arc::new(nexus),
        }
    }

    fn settings(&self) -> SyncSettings {
        SyncSettings {
            cache_dir: Some(self.temp_dir.path().to_path_buf()),
            app_version: "9.9.9".to_string(),
            ..SyncSettings::default()
        }
    }

    fn registry(&self) -> CacheRegistry {
        let fetchers = Fetchers {
            github: self.github.clone(),
            workshop: self.workshop.clone(),
            nexus: self.nexus.clone(),
        };
        let mut registry = CacheRegistry::new(&self.settings(), fetchers).unwrap();
        registry.load_all();
        registry
    }
}

fn release(version: &str) -> GitHubLatestRelease {
    GitHubLatestRelease {
        version: version.to_string(),
        release_date: "2024-01-01T00:00:00Z".to_string(),
        description: format!("Release {version}"),
        browser_download_link: format!("https://example.com/{version}.zip"),
    }
}

fn published(publish_id: u64, updated: i64) -> PublishedFileDetails {
    PublishedFileDetails {
        published_file_id: publish_id,
        time_created: 100,
        time_updated: updated,
        tags: vec!["Gameplay".to_string()],
    }
}

fn github_mod(uuid: &str) -> ModDescriptor {
    ModDescriptor::new(uuid, uuid)
        .with_version("1.0.0")
        .with_github("author", uuid)
}

fn repo(name: &str) -> GitHubRepo {
    GitHubRepo::new("author", name)
}

#[tokio::test]
async fn test_partial_failure_keeps_successes() {
    let env = TestEnv::new(
        GitHubFetcher::new()
            .reply(repo("m1"), Reply::Found(release("1.1.0")))
            .reply(repo("m2"), Reply::Fail)
            .reply(repo("m3"), Reply::Found(release("3.0.0"))),
        WorkshopFetcher::new(),
        NexusFetcher::new(),
    );
    let mut registry = env.registry();
    let mut mods = vec![github_mod("m1"), github_mod("m2"), github_mod("m3")];

    let outcomes = registry.refresh_all(&mut mods, &CancellationToken::new()).await;

    assert_eq!(outcomes.get(&ModSource::GitHub), Some(&true));
    let cache = registry.github().cache();
    assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["m1", "m3"]);
    assert!(cache.get("m2").is_none());
    assert_eq!(cache.get("m3").unwrap().latest_release.version, "3.0.0");

    assert!(mods[0].has_update(ModSource::GitHub));
    assert_eq!(
        mods[1].sources.github.as_ref().unwrap().latest_release,
        GitHubLatestRelease::default()
    );
    assert_eq!(env.github.calls().len(), 3);
}

#[tokio::test]
async fn test_empty_batch_is_not_success() {
    let env = TestEnv::new(GitHubFetcher::new(), WorkshopFetcher::new(), NexusFetcher::new());
    let mut registry = env.registry();

    let outcomes = registry.refresh_all(&mut [], &CancellationToken::new()).await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.values().all(|success| !success));
    for source in ModSource::ALL {
        assert!(!registry.handler(source).is_dirty());
    }
    assert!(registry.persist_dirty().is_empty());
}

#[tokio::test]
async fn test_all_failures_report_false_and_leave_cache_clean() {
    let env = TestEnv::new(
        GitHubFetcher::new().reply(repo("m1"), Reply::Fail),
        WorkshopFetcher::new(),
        NexusFetcher::new(),
    );
    let mut registry = env.registry();
    let mut mods = vec![github_mod("m1")];

    let outcomes = registry.refresh_all(&mut mods, &CancellationToken::new()).await;

    assert_eq!(outcomes.get(&ModSource::GitHub), Some(&false));
    assert!(registry.github().cache().is_empty());
    assert!(!registry.handler(ModSource::GitHub).is_dirty());
}

#[tokio::test]
async fn test_dirty_discipline_across_persist_and_reload() {
    let env = TestEnv::new(
        GitHubFetcher::new().reply(repo("m1"), Reply::Found(release("2.0.0"))),
        WorkshopFetcher::new(),
        NexusFetcher::new(),
    );
    let mut registry = env.registry();
    assert!(!registry.handler(ModSource::GitHub).is_dirty());

    let mut mods = vec![github_mod("m1")];
    registry.refresh_all(&mut mods, &CancellationToken::new()).await;
    assert!(registry.handler(ModSource::GitHub).is_dirty());

    assert_eq!(registry.persist_dirty(), vec![ModSource::GitHub]);
    let github = registry.handler(ModSource::GitHub);
    assert!(!github.is_dirty());
    assert!(github.metadata().has_been_updated());
    assert_eq!(github.metadata().last_version, "9.9.9");

    let path = env.temp_dir.path().join("githubdata.json");
    let raw = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["LastVersion"], "9.9.9");
    assert!(json["Mods"]["m1"].is_object());
    assert_eq!(json["Mods"]["m1"]["LatestRelease"]["Version"], "2.0.0");

    // Nothing changed since the last write.
    assert!(registry.persist_dirty().is_empty());

    let reloaded = env.registry();
    assert_eq!(reloaded.github().cache(), registry.github().cache());
    assert!(!reloaded.handler(ModSource::GitHub).is_dirty());
    assert_eq!(
        reloaded.handler(ModSource::GitHub).metadata().last_updated,
        registry.handler(ModSource::GitHub).metadata().last_updated
    );
}

#[tokio::test]
async fn test_cancellation_retains_partial_progress() {
    let cancel = CancellationToken::new();
    let env = TestEnv::new(
        GitHubFetcher::new()
            .reply(repo("m1"), Reply::Found(release("1.5.0")))
            .reply(repo("m2"), Reply::Hang(cancel.clone()))
            .reply(repo("m3"), Reply::Found(release("3.0.0"))),
        WorkshopFetcher::new(),
        NexusFetcher::new(),
    );
    let mut registry = env.registry();
    let mut mods = vec![github_mod("m1"), github_mod("m2"), github_mod("m3")];

    let outcomes = registry.refresh_all(&mut mods, &cancel).await;

    assert_eq!(outcomes.get(&ModSource::GitHub), Some(&true));
    assert_eq!(env.github.calls(), vec![repo("m1"), repo("m2")]);
    let cache = registry.github().cache();
    assert!(cache.get("m1").is_some());
    assert!(cache.get("m3").is_none());

    assert_eq!(registry.persist_dirty(), vec![ModSource::GitHub]);
}

#[tokio::test]
async fn test_cancelled_before_start_fetches_nothing() {
    let env = TestEnv::new(
        GitHubFetcher::new().reply(repo("m1"), Reply::Found(release("1.5.0"))),
        WorkshopFetcher::new(),
        NexusFetcher::new(),
    );
    let mut registry = env.registry();
    let mut mods = vec![github_mod("m1")];
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcomes = registry.refresh_all(&mut mods, &cancel).await;

    assert_eq!(outcomes.get(&ModSource::GitHub), Some(&false));
    assert!(env.github.calls().is_empty());
}

#[tokio::test]
async fn test_disabled_backend_is_absent_from_outcomes() {
    let env = TestEnv::new(
        GitHubFetcher::new().reply(repo("m1"), Reply::Found(release("1.1.0"))),
        WorkshopFetcher::new(),
        NexusFetcher::new(),
    );
    let mut registry = env.registry();
    registry.set_enabled(ModSource::GitHub, false);
    let mut mods = vec![github_mod("m1").with_nexus(5)];

    let outcomes = registry.refresh_all(&mut mods, &CancellationToken::new()).await;

    assert!(!outcomes.contains_key(&ModSource::GitHub));
    assert!(outcomes.contains_key(&ModSource::NexusMods));
    assert!(env.github.calls().is_empty());
    assert_eq!(env.nexus.calls(), vec![5]);
}

#[tokio::test]
async fn test_missing_and_corrupt_files_load_empty() {
    let env = TestEnv::new(GitHubFetcher::new(), WorkshopFetcher::new(), NexusFetcher::new());
    std::fs::write(env.temp_dir.path().join("githubdata.json"), "{ not json").unwrap();
    std::fs::write(env.temp_dir.path().join("workshopdata.json"), "[1, 2, 3]").unwrap();

    let registry = env.registry();

    for source in ModSource::ALL {
        let handler = registry.handler(source);
        assert!(!handler.is_dirty());
        assert!(!handler.metadata().has_been_updated());
    }
    assert!(registry.github().cache().is_empty());
    assert!(registry.workshop().cache().mods().is_empty());
    assert!(registry.nexus().cache().is_empty());
}

#[tokio::test]
async fn test_workshop_not_found_is_remembered() {
    let env = TestEnv::new(
        GitHubFetcher::new(),
        WorkshopFetcher::new().reply(41, Reply::Missing),
        NexusFetcher::new(),
    );
    let mut registry = env.registry();
    let mut mods = vec![ModDescriptor::new("local-only", "Local").with_workshop(41)];

    let outcomes = registry.refresh_all(&mut mods, &CancellationToken::new()).await;
    assert_eq!(outcomes.get(&ModSource::SteamWorkshop), Some(&false));
    assert!(registry.workshop().cache().is_non_participating("local-only"));
    assert_eq!(registry.persist_dirty(), vec![ModSource::SteamWorkshop]);

    // Known-absent mods are not looked up again.
    registry.refresh_all(&mut mods, &CancellationToken::new()).await;
    assert_eq!(env.workshop.calls(), vec![41]);

    let raw = std::fs::read_to_string(env.temp_dir.path().join("workshopdata.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["NonWorkshopMods"], serde_json::json!(["local-only"]));
}

#[tokio::test]
async fn test_workshop_merges_by_publish_id() {
    let env = TestEnv::new(
        GitHubFetcher::new(),
        WorkshopFetcher::new().reply(77, Reply::Found(published(77, 500))),
        NexusFetcher::new(),
    );
    std::fs::write(
        env.temp_dir.path().join("workshopdata.json"),
        r#"{
            "LastUpdated": 10,
            "LastVersion": "0.1.0",
            "Mods": {
                "old-key": { "UUID": "old-key", "WorkshopID": 77, "Created": 1, "LastUpdated": 2, "Tags": [] }
            },
            "NonWorkshopMods": ["other"]
        }"#,
    )
    .unwrap();

    let mut registry = env.registry();
    let mut mods = vec![ModDescriptor::new("reinstalled", "Mod").with_workshop(77)];
    let outcomes = registry.refresh_all(&mut mods, &CancellationToken::new()).await;

    assert_eq!(outcomes.get(&ModSource::SteamWorkshop), Some(&true));
    let cache = registry.workshop().cache();
    assert_eq!(cache.mods().len(), 1);
    assert!(cache.mods().get("reinstalled").is_none());
    let record: &WorkshopCachedMod = cache.mods().get("old-key").unwrap();
    assert_eq!(record.last_updated, 500);
    assert_eq!(record.tags, vec!["Gameplay"]);
    assert_eq!(mods[0].sources.workshop.as_ref().unwrap().updated, 500);
    assert_eq!(cache.non_workshop_mods(), ["other".to_string()]);
}

#[tokio::test]
async fn test_double_encoded_cache_is_rewritten_as_objects() {
    let env = TestEnv::new(GitHubFetcher::new(), WorkshopFetcher::new(), NexusFetcher::new());
    let path = env.temp_dir.path().join("nexusmodsdata.json");
    std::fs::write(
        &path,
        r#"{
            "LastUpdated": 5,
            "LastVersion": "0.2.0",
            "Mods": {
                "uuid-1": "{\"UUID\":\"uuid-1\",\"ModId\":3,\"Name\":\"Camera\",\"Version\":\"1.0\"}"
            }
        }"#,
    )
    .unwrap();

    let mut registry = env.registry();
    assert_eq!(registry.nexus().cache().get("uuid-1").unwrap().mod_id, 3);
    assert_eq!(registry.nexus().cache().get("uuid-1").unwrap().name, "Camera");
    assert!(registry.persist_dirty().is_empty());

    let nexus = registry.nexus();
    let document = nexus.cache().to_document(nexus.options()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&document).unwrap();
    assert!(json["Mods"]["uuid-1"].is_object());
    assert_eq!(json["Mods"]["uuid-1"]["Name"], "Camera");
}

#[tokio::test]
async fn test_all_backends_refresh_in_one_cycle() {
    let env = TestEnv::new(
        GitHubFetcher::new().reply(repo("m1"), Reply::Found(release("1.2.0"))),
        WorkshopFetcher::new().reply(9, Reply::Found(published(9, 300))),
        NexusFetcher::new().reply(
            4,
            Reply::Found(NexusModInfo {
                mod_id: 4,
                name: "m1".to_string(),
                version: "1.3.0".to_string(),
                ..Default::default()
            }),
        ),
    );
    let mut registry = env.registry();
    let mut mods = vec![github_mod("m1").with_workshop(9).with_nexus(4)];

    let outcomes = registry.refresh_all(&mut mods, &CancellationToken::new()).await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.values().all(|success| *success));
    assert!(mods[0].has_update(ModSource::NexusMods));

    let mut written = registry.persist_dirty();
    written.sort();
    assert_eq!(written, ModSource::ALL.to_vec());
    for file in ["githubdata.json", "workshopdata.json", "nexusmodsdata.json"] {
        assert!(env.temp_dir.path().join(file).exists());
    }
}
