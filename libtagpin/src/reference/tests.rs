use super::*;
use crate::config::Config;

fn mirrors() -> Vec<Mirror> {
    Config::default().mirrors
}

fn classify(reference: &str) -> ImageSource {
    let reference: ImageReference = reference.parse().unwrap();
    ImageSource::classify(reference.base(), &mirrors())
}

#[test]
fn test_parse_host_path_and_tag() {
    let reference: ImageReference = "ghcr.io/acme/widget:1.0".parse().unwrap();

    assert_eq!(reference.base(), "ghcr.io/acme/widget");
    assert_eq!(reference.tag(), Some("1.0"));
    assert_eq!(reference.digest(), None);
}

#[test]
fn test_parse_without_tag() {
    let reference: ImageReference = "bitnami/redis".parse().unwrap();

    assert_eq!(reference.base(), "bitnami/redis");
    assert_eq!(reference.tag(), None);
}

#[test]
fn test_parse_registry_port_is_not_a_tag() {
    let reference: ImageReference = "registry.local:5000/team/app".parse().unwrap();
    assert_eq!(reference.base(), "registry.local:5000/team/app");
    assert_eq!(reference.tag(), None);

    let tagged: ImageReference = "registry.local:5000/team/app:2.1".parse().unwrap();
    assert_eq!(tagged.base(), "registry.local:5000/team/app");
    assert_eq!(tagged.tag(), Some("2.1"));
}

#[test]
fn test_base_never_contains_tag_colon() {
    for input in ["redis:7", "lscr.io/linuxserver/sonarr:4.0.14", "ghcr.io/a/b:v1.2.3"] {
        let reference: ImageReference = input.parse().unwrap();
        assert!(!reference.base().contains(':'), "{input}");
    }
}

#[test]
fn test_parse_digest() {
    let reference: ImageReference = "redis:7@sha256:abcdef".parse().unwrap();

    assert_eq!(reference.base(), "redis");
    assert_eq!(reference.tag(), Some("7"));
    assert_eq!(reference.digest(), Some("sha256:abcdef"));
}

#[test]
fn test_display_round_trips_original_text() {
    for input in [
        "ghcr.io/acme/widget:1.0",
        "bitnami/redis",
        "registry.local:5000/app:v2",
        "redis@sha256:abcdef",
    ] {
        let reference: ImageReference = input.parse().unwrap();
        assert_eq!(reference.to_string(), input);
    }
}

#[test]
fn test_with_tag_replaces_tag_and_digest() {
    let reference: ImageReference = "redis:7@sha256:abcdef".parse().unwrap();
    assert_eq!(reference.with_tag("7.2.4"), "redis:7.2.4");
}

#[test]
fn test_parse_rejects_invalid_references() {
    assert!("".parse::<ImageReference>().is_err());
    assert!("   ".parse::<ImageReference>().is_err());
    assert!("redis:".parse::<ImageReference>().is_err());
    assert!(":7".parse::<ImageReference>().is_err());
    assert!("ghcr.io/acme/".parse::<ImageReference>().is_err());
    assert!("two words".parse::<ImageReference>().is_err());
}

#[test]
fn test_classify_ghcr() {
    assert_eq!(
        classify("ghcr.io/acme/widget:1.0"),
        ImageSource::Ghcr {
            owner: "acme".to_string(),
            repository: "widget".to_string(),
        }
    );
}

#[test]
fn test_classify_ghcr_nested_repository() {
    let source = classify("ghcr.io/acme/tools/widget:1.0");

    assert_eq!(source.namespace(), "acme");
    assert_eq!(source.repository(), "tools/widget");
}

#[test]
fn test_classify_lscr_mirror_redirects_to_docker_hub() {
    assert_eq!(
        classify("lscr.io/linuxserver/sonarr:1.0"),
        ImageSource::DockerHub {
            namespace: "linuxserver".to_string(),
            repository: "sonarr".to_string(),
        }
    );
}

#[test]
fn test_classify_bare_docker_hub() {
    assert_eq!(
        classify("bitnami/redis:7.0"),
        ImageSource::DockerHub {
            namespace: "bitnami".to_string(),
            repository: "redis".to_string(),
        }
    );
}

#[test]
fn test_classify_official_image() {
    assert_eq!(
        classify("redis:7"),
        ImageSource::DockerHub {
            namespace: "library".to_string(),
            repository: "redis".to_string(),
        }
    );
}

#[test]
fn test_classify_explicit_docker_hub_host() {
    assert_eq!(classify("docker.io/bitnami/redis:7.0"), classify("bitnami/redis:7.0"));
    assert_eq!(classify("index.docker.io/library/redis:7"), classify("redis:7"));
}

#[test]
fn test_classify_unknown_host_falls_back_to_docker_hub() {
    assert_eq!(
        classify("quay.io/prometheus/node-exporter:v1.8.0"),
        ImageSource::DockerHub {
            namespace: "quay.io".to_string(),
            repository: "prometheus/node-exporter".to_string(),
        }
    );
}

#[test]
fn test_classify_incomplete_ghcr_falls_back() {
    let source = classify("ghcr.io/widget:1.0");
    assert!(matches!(source, ImageSource::DockerHub { .. }));
}

#[test]
fn test_classify_custom_mirror() {
    let mirrors = vec![Mirror {
        prefix: "cr.example.com/hub/".to_string(),
        namespace: "upstream".to_string(),
    }];

    assert_eq!(
        ImageSource::classify("cr.example.com/hub/app", &mirrors),
        ImageSource::DockerHub {
            namespace: "upstream".to_string(),
            repository: "app".to_string(),
        }
    );
}

#[test]
fn test_classify_without_mirrors_treats_lscr_as_namespace() {
    let source = ImageSource::classify("lscr.io/linuxserver/sonarr", &[]);

    assert_eq!(source.namespace(), "lscr.io");
    assert_eq!(source.repository(), "linuxserver/sonarr");
}

#[test]
fn test_source_display() {
    assert_eq!(classify("ghcr.io/acme/widget:1").to_string(), "ghcr acme/widget");
    assert_eq!(classify("redis").to_string(), "docker hub library/redis");
}
