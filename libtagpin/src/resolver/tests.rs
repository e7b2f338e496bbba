use super::*;
use chrono::{TimeZone, Utc};
use std::cell::RefCell;
use std::rc::Rc;

type Calls = Rc<RefCell<Vec<(String, String)>>>;

/// Tag source returning a fixed list and recording every call.
struct FakeSource {
    tags: Vec<RawTag>,
    fail: bool,
    calls: Calls,
}

impl FakeSource {
    fn new(tags: &[&str]) -> (Box<Self>, Calls) {
        Self::with_raw(tags.iter().map(|t| RawTag::new(*t)).collect())
    }

    fn with_raw(tags: Vec<RawTag>) -> (Box<Self>, Calls) {
        let calls = Calls::default();
        let source = Self {
            tags,
            fail: false,
            calls: calls.clone(),
        };
        (Box::new(source), calls)
    }

    fn failing() -> (Box<Self>, Calls) {
        let (mut source, calls) = Self::new(&[]);
        source.fail = true;
        (source, calls)
    }
}

impl TagSource for FakeSource {
    fn fetch_tags(&self, namespace: &str, repository: &str) -> Result<Vec<RawTag>> {
        self.calls
            .borrow_mut()
            .push((namespace.to_string(), repository.to_string()));
        if self.fail {
            return Err(TagpinError::server("unavailable", 503));
        }
        Ok(self.tags.clone())
    }
}

fn resolver_with(dockerhub: Box<FakeSource>, ghcr: Box<FakeSource>) -> Resolver {
    Resolver::with_sources(&Config::default(), dockerhub, ghcr).unwrap()
}

fn candidate(tag: &str) -> Candidate {
    Candidate {
        tag: RawTag::new(tag),
        version: crate::version::parse(tag).unwrap(),
    }
}

#[test]
fn test_ghcr_reference_routes_to_ghcr() {
    let (hub, hub_calls) = FakeSource::new(&[]);
    let (ghcr, ghcr_calls) = FakeSource::new(&["1.0", "1.1"]);
    let resolver = resolver_with(hub, ghcr);

    let tag = resolver.resolve_latest("ghcr.io/acme/widget:1.0");

    assert_eq!(tag.as_deref(), Some("1.1"));
    assert_eq!(*ghcr_calls.borrow(), vec![("acme".to_string(), "widget".to_string())]);
    assert!(hub_calls.borrow().is_empty());
}

#[test]
fn test_lscr_reference_routes_to_docker_hub_linuxserver() {
    let (hub, hub_calls) = FakeSource::new(&["4.0.14"]);
    let (ghcr, ghcr_calls) = FakeSource::new(&[]);
    let resolver = resolver_with(hub, ghcr);

    resolver.resolve_latest("lscr.io/linuxserver/sonarr:1.0");

    assert_eq!(
        *hub_calls.borrow(),
        vec![("linuxserver".to_string(), "sonarr".to_string())]
    );
    assert!(ghcr_calls.borrow().is_empty());
}

#[test]
fn test_bare_reference_routes_to_docker_hub() {
    let (hub, hub_calls) = FakeSource::new(&["7.2.4"]);
    let (ghcr, _) = FakeSource::new(&[]);
    let resolver = resolver_with(hub, ghcr);

    resolver.resolve_latest("bitnami/redis:7.0");

    assert_eq!(
        *hub_calls.borrow(),
        vec![("bitnami".to_string(), "redis".to_string())]
    );
}

#[test]
fn test_classify_is_pure() {
    let (hub, hub_calls) = FakeSource::new(&[]);
    let (ghcr, ghcr_calls) = FakeSource::new(&[]);
    let resolver = resolver_with(hub, ghcr);

    let source = resolver.classify("ghcr.io/acme/widget:1.0");

    assert_eq!(
        source,
        ImageSource::Ghcr {
            owner: "acme".to_string(),
            repository: "widget".to_string(),
        }
    );
    assert!(hub_calls.borrow().is_empty());
    assert!(ghcr_calls.borrow().is_empty());
}

#[test]
fn test_numeric_ordering_not_lexicographic() {
    let (hub, _) = FakeSource::new(&["1.2.3", "1.10.0", "1.9.0"]);
    let (ghcr, _) = FakeSource::new(&[]);
    let resolver = resolver_with(hub, ghcr);

    assert_eq!(resolver.resolve_latest("foo/bar:1.2.3").as_deref(), Some("1.10.0"));
}

#[test]
fn test_release_candidate_never_wins() {
    let (hub, _) = FakeSource::new(&["1.2.3", "1.10.0", "2.0.0-rc1"]);
    let (ghcr, _) = FakeSource::new(&[]);
    let resolver = resolver_with(hub, ghcr);

    assert_eq!(resolver.resolve_latest("foo/bar:1.2.3").as_deref(), Some("1.10.0"));
}

#[test]
fn test_final_release_beats_its_candidates() {
    let (hub, _) = FakeSource::new(&["1.2.3", "1.10.0", "2.0.0-rc1", "2.0.0"]);
    let (ghcr, _) = FakeSource::new(&[]);
    let resolver = resolver_with(hub, ghcr);

    assert_eq!(resolver.resolve_latest("foo/bar:1.2.3").as_deref(), Some("2.0.0"));
}

#[test]
fn test_selected_tag_is_verbatim() {
    let (hub, _) = FakeSource::new(&["v1.2.3", "v1.10.0"]);
    let (ghcr, _) = FakeSource::new(&[]);
    let resolver = resolver_with(hub, ghcr);

    assert_eq!(resolver.resolve_latest("foo/bar:v1.2.3").as_deref(), Some("v1.10.0"));
}

#[test]
fn test_hash_suffixed_tags_rank_by_release() {
    let (hub, _) = FakeSource::new(&[
        "1.42.2.10156-f737b826c",
        "1.43.0.10492-121068a07",
        "1.43.0.10492-121068a07-amd64",
    ]);
    let (ghcr, _) = FakeSource::new(&[]);
    let resolver = resolver_with(hub, ghcr);

    assert_eq!(
        resolver.resolve_latest("plexinc/pms-docker:1.42.2.10156-f737b826c").as_deref(),
        Some("1.43.0.10492-121068a07")
    );
}

#[test]
fn test_readarr_develop_channel_resolves() {
    let (hub, _) = FakeSource::new(&["0.4.18-develop", "0.4.19-develop", "develop", "latest"]);
    let (ghcr, _) = FakeSource::new(&[]);
    let resolver = resolver_with(hub, ghcr);

    assert_eq!(
        resolver.resolve_latest("lscr.io/linuxserver/readarr:0.4.18-develop").as_deref(),
        Some("0.4.19-develop")
    );
}

#[test]
fn test_no_candidates() {
    let (hub, _) = FakeSource::new(&["latest", "main", "1.0.0-amd64"]);
    let (ghcr, _) = FakeSource::new(&[]);
    let resolver = resolver_with(hub, ghcr);

    let resolution = resolver.resolve("foo/bar:1.0.0");

    assert!(matches!(resolution, Resolution::NoCandidates { fetched: 3 }));
    assert_eq!(resolution.tag(), None);
}

#[test]
fn test_fetch_failure_is_reported_not_raised() {
    let (hub, _) = FakeSource::failing();
    let (ghcr, _) = FakeSource::new(&[]);
    let resolver = resolver_with(hub, ghcr);

    let resolution = resolver.resolve("foo/bar:1.0.0");

    assert!(matches!(
        resolution,
        Resolution::Failed(TagpinError::Server { status_code: 503, .. })
    ));
    assert_eq!(resolver.resolve_latest("foo/bar:1.0.0"), None);
}

#[test]
fn test_invalid_reference_fails_without_fetching() {
    let (hub, hub_calls) = FakeSource::new(&["1.0"]);
    let (ghcr, _) = FakeSource::new(&[]);
    let resolver = resolver_with(hub, ghcr);

    let resolution = resolver.resolve("");

    assert!(matches!(resolution, Resolution::Failed(TagpinError::Validation { .. })));
    assert!(hub_calls.borrow().is_empty());
}

#[test]
fn test_candidates_preserve_order_and_drop_unparseable() {
    let (hub, _) = FakeSource::new(&[]);
    let (ghcr, _) = FakeSource::new(&[]);
    let resolver = resolver_with(hub, ghcr);
    let tags: Vec<RawTag> = ["2.0", "1.0-alpine", "1.5", "latest"]
        .into_iter()
        .map(RawTag::new)
        .collect();

    let candidates = resolver.candidates(&tags, "app");
    let names: Vec<&str> = candidates.iter().map(|c| c.tag.name.as_str()).collect();

    assert_eq!(names, vec!["2.0", "1.5"]);
}

#[test]
fn test_ranked_candidates_highest_first() {
    let (hub, _) = FakeSource::new(&["1.2.3", "1.10.0", "latest", "1.9.0"]);
    let (ghcr, _) = FakeSource::new(&[]);
    let resolver = resolver_with(hub, ghcr);

    let (source, ranked) = resolver.ranked_candidates("foo/bar:1.2.3").unwrap();
    let names: Vec<&str> = ranked.iter().map(|c| c.tag.name.as_str()).collect();

    assert_eq!(source.repository(), "bar");
    assert_eq!(names, vec!["1.10.0", "1.9.0", "1.2.3"]);
}

#[test]
fn test_highest_version_ties_keep_first() {
    let candidates = vec![candidate("1.0"), candidate("v1.0.0"), candidate("0.9")];

    let best = highest_version(&candidates).unwrap();

    assert_eq!(best.tag.name, "1.0");
}

#[test]
fn test_highest_version_empty() {
    assert!(highest_version(&[]).is_none());
}

#[test]
fn test_most_recent_prefers_latest_push() {
    let old = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let new = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let mut backport = candidate("1.9.9");
    backport.tag = backport.tag.pushed_at(new);
    let mut main = candidate("2.0.0");
    main.tag = main.tag.pushed_at(old);
    let undated = candidate("3.0.0");

    let candidates = vec![main, backport, undated];

    assert_eq!(most_recent(&candidates).unwrap().tag.name, "1.9.9");
}

#[test]
fn test_most_recent_strategy_falls_back_without_timestamps() {
    let mut config = Config::default();
    config.resolver.strategy = Strategy::MostRecent;
    let (hub, _) = FakeSource::new(&[]);
    let (ghcr, _) = FakeSource::new(&["1.0", "1.2", "1.1"]);
    let resolver = Resolver::with_sources(&config, hub, ghcr).unwrap();

    assert_eq!(resolver.resolve_latest("ghcr.io/a/b:1.0").as_deref(), Some("1.2"));
}

#[test]
fn test_most_recent_strategy_uses_push_times() {
    let mut config = Config::default();
    config.resolver.strategy = Strategy::MostRecent;
    let (hub, _) = FakeSource::with_raw(vec![
        RawTag::new("2.0.0").pushed_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        RawTag::new("1.9.9").pushed_at(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
    ]);
    let (ghcr, _) = FakeSource::new(&[]);
    let resolver = Resolver::with_sources(&config, hub, ghcr).unwrap();

    assert_eq!(resolver.resolve_latest("foo/bar:1.0").as_deref(), Some("1.9.9"));
}

#[test]
fn test_extra_strip_patterns_from_config() {
    let mut config = Config::default();
    config.version.strip_patterns = vec!["-ls[0-9]+$".to_string()];
    let (hub, _) = FakeSource::new(&["4.0.13.2932-ls293", "4.0.14.2939-ls294"]);
    let (ghcr, _) = FakeSource::new(&[]);
    let resolver = Resolver::with_sources(&config, hub, ghcr).unwrap();

    assert_eq!(
        resolver.resolve_latest("lscr.io/linuxserver/sonarr:4.0.13.2932-ls293").as_deref(),
        Some("4.0.14.2939-ls294")
    );
}

#[test]
fn test_invalid_strip_pattern_rejected_at_construction() {
    let mut config = Config::default();
    config.version.strip_patterns = vec!["[".to_string()];
    let (hub, _) = FakeSource::new(&[]);
    let (ghcr, _) = FakeSource::new(&[]);

    assert!(Resolver::with_sources(&config, hub, ghcr).is_err());
}
