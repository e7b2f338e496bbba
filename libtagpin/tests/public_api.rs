use libtagpin::document::{load_document, write_document};
use libtagpin::{Config, Resolution, Resolve, Resolver, UpdateOutcome, update_document};
use mockito::{Matcher, Server, ServerGuard};

fn config_for(server: &ServerGuard) -> Config {
    let mut config = Config::default();
    config.network.timeout = 5;
    config.ghcr.url = server.url();
    config.dockerhub.url = server.url();
    config
}

fn mock_ghcr_widget(server: &mut ServerGuard, tags: &str) -> (mockito::Mock, mockito::Mock) {
    let token = server
        .mock("GET", "/token")
        .match_query(Matcher::UrlEncoded(
            "scope".into(),
            "repository:acme/widget:pull".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"token":"anon"}"#)
        .create();
    let list = server
        .mock("GET", "/v2/acme/widget/tags/list")
        .match_header("authorization", "Bearer anon")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(r#"{{"name":"acme/widget","tags":{}}}"#, tags))
        .create();
    (token, list)
}

#[test]
fn test_version() {
    assert!(!libtagpin::version().is_empty());
}

#[test]
fn test_end_to_end_single_line_document() {
    let mut server = Server::new();
    let (token, list) = mock_ghcr_widget(&mut server, r#"["1.0","1.1","1.1-rc1","latest"]"#);
    let resolver = Resolver::new(&config_for(&server)).unwrap();

    let (updated, updates) = update_document("  image: ghcr.io/acme/widget:1.0\n", &resolver);

    token.assert();
    list.assert();
    assert_eq!(updated, "  image: ghcr.io/acme/widget:1.1\n");
    assert_eq!(updates.len(), 1);
    assert!(updates[0].is_updated());
}

#[test]
fn test_update_is_idempotent() {
    let mut server = Server::new();
    let _mocks = mock_ghcr_widget(&mut server, r#"["1.0","1.1","1.1-rc1","latest"]"#);
    let resolver = Resolver::new(&config_for(&server)).unwrap();

    let (once, _) = update_document("  image: ghcr.io/acme/widget:1.0\n", &resolver);
    let (twice, updates) = update_document(&once, &resolver);

    assert_eq!(once, twice);
    assert!(matches!(updates[0].outcome, UpdateOutcome::Unchanged));
}

#[test]
fn test_fetch_failure_leaves_document_untouched() {
    let mut server = Server::new();
    let _hub = server
        .mock("GET", "/v2/namespaces/bitnami/repositories/redis/tags?page_size=100")
        .with_status(503)
        .create();
    let resolver = Resolver::new(&config_for(&server)).unwrap();
    let doc = "services:\n  cache:\n    image: bitnami/redis:7.0\n";

    let (updated, updates) = update_document(doc, &resolver);

    assert_eq!(updated, doc);
    assert!(matches!(updates[0].outcome, UpdateOutcome::Failed(_)));
}

#[test]
fn test_mirror_reference_resolves_through_docker_hub() {
    let mut server = Server::new();
    let hub = server
        .mock("GET", "/v2/namespaces/linuxserver/repositories/sonarr/tags?page_size=100")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"next":null,"results":[
                {"name":"latest"},
                {"name":"4.0.14.2939-amd64"},
                {"name":"4.0.14.2939"},
                {"name":"4.0.13.2932"},
                {"name":"develop"}
            ]}"#,
        )
        .create();
    let resolver = Resolver::new(&config_for(&server)).unwrap();

    let resolution = resolver.resolve("lscr.io/linuxserver/sonarr:4.0.13.2932");

    hub.assert();
    assert_eq!(resolution.tag(), Some("4.0.14.2939"));
}

#[test]
fn test_no_release_tags() {
    let mut server = Server::new();
    let _mocks = mock_ghcr_widget(&mut server, r#"["latest","main","2.0-beta1"]"#);
    let resolver = Resolver::new(&config_for(&server)).unwrap();

    let resolution = resolver.resolve("ghcr.io/acme/widget:1.0");

    assert!(matches!(resolution, Resolution::NoCandidates { fetched: 3 }));
}

#[test]
fn test_document_file_round_trip() {
    let mut server = Server::new();
    let _mocks = mock_ghcr_widget(&mut server, r#"["1.0","1.1"]"#);
    let resolver = Resolver::new(&config_for(&server)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("docker-compose.yml");
    write_document(&path, "version: '3'\nservices:\n  w:\n    image: ghcr.io/acme/widget:1.0\n")
        .unwrap();

    let document = load_document(&path).unwrap();
    let (updated, _) = update_document(&document, &resolver);
    write_document(&path, &updated).unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "version: '3'\nservices:\n  w:\n    image: ghcr.io/acme/widget:1.1\n"
    );
}
