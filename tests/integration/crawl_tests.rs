//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and exercise
//! discovery, traversal, retries and full coordinator runs end-to-end.

use sitemap_harvest::config::{
    Config, CrawlerConfig, IndexBackend, IndexConfig, OutputConfig, RequestConfig,
};
use sitemap_harvest::crawler::{Coordinator, FetchError, Fetcher, SitemapWalker};
use sitemap_harvest::model::{FieldValue, NodeKind, ProcessedByType, WebsiteNode};
use sitemap_harvest::storage::{MemoryStore, SqliteStore, UpdateTracker};
use sitemap_harvest::HarvestError;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Request profile with a short retry delay
fn test_request_config() -> RequestConfig {
    RequestConfig {
        retry_delay_ms: 50,
        retry_tries: 3,
        timeout_ms: 5_000,
        ..RequestConfig::default()
    }
}

fn test_crawler_config(home_url: &str, sleep_time_ms: u64) -> CrawlerConfig {
    CrawlerConfig {
        home_url: home_url.to_string(),
        robots_resource: "robots.txt".to_string(),
        sleep_time_ms,
        processed_by_type: ProcessedByType::Manual,
        processed_by: None,
    }
}

fn test_walker(home_url: &str, sleep_time_ms: u64) -> SitemapWalker {
    let fetcher = Fetcher::new(&test_request_config()).expect("Failed to build fetcher");
    SitemapWalker::new(fetcher, &test_crawler_config(home_url, sleep_time_ms))
}

fn urlset(locations: &[String]) -> String {
    let entries: String = locations
        .iter()
        .map(|loc| format!("<url><loc>{}</loc></url>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        entries
    )
}

fn sitemap_index(locations: &[String]) -> String {
    let entries: String = locations
        .iter()
        .map(|loc| format!("<sitemap><loc>{}</loc></sitemap>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</sitemapindex>"#,
        entries
    )
}

async fn mount_body(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, sitemaps: &[&str]) {
    let lines: String = sitemaps
        .iter()
        .map(|route| format!("Sitemap: {}{}\n", server.uri(), route))
        .collect();
    mount_body(server, "/robots.txt", format!("User-agent: *\nDisallow: /admin\n{}", lines)).await;
}

fn locations(nodes: &[WebsiteNode]) -> Vec<(String, NodeKind)> {
    nodes
        .iter()
        .map(|node| (node.location.clone(), node.kind))
        .collect()
}

#[tokio::test]
async fn test_discovers_sitemaps_from_robots() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_body(
        &server,
        "/robots.txt",
        format!(
            "User-agent: *\nSitemap: {base}/one.xml\nsitemap: {base}/two.xml\nSITEMAP:   {base}/three.xml  \n",
            base = base
        ),
    )
    .await;

    let sitemaps = test_walker(&base, 0).extract_sitemaps().await.unwrap();

    assert_eq!(
        sitemaps,
        vec![
            format!("{}/one.xml", base),
            format!("{}/two.xml", base),
            format!("{}/three.xml", base),
        ]
    );
}

#[tokio::test]
async fn test_missing_robots_is_discovery_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_walker(&server.uri(), 0).process_all_sitemaps().await;

    match result {
        Err(HarvestError::Discovery {
            source: FetchError::HttpStatus { status, .. },
            ..
        }) => assert_eq!(status, 404),
        other => panic!("expected discovery failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_robots_without_sitemaps() {
    let server = MockServer::start().await;
    mount_body(&server, "/robots.txt", "User-agent: *\nDisallow: /\n".to_string()).await;

    let result = test_walker(&server.uri(), 0).process_all_sitemaps().await;
    assert!(matches!(result, Err(HarvestError::NoSitemaps { .. })));

    let server = MockServer::start().await;
    mount_body(&server, "/robots.txt", String::new()).await;

    let result = test_walker(&server.uri(), 0).process_all_sitemaps().await;
    assert!(matches!(result, Err(HarvestError::NoSitemaps { .. })));
}

#[tokio::test]
async fn test_single_url_entry() {
    let server = MockServer::start().await;
    let base = server.uri();
    let page = format!("{}/page", base);

    mount_robots(&server, &["/sitemap.xml"]).await;
    mount_body(&server, "/sitemap.xml", urlset(&[page.clone()])).await;

    let walker = test_walker(&base, 0);
    let nodes = walker.process_all_sitemaps().await.unwrap();

    assert_eq!(nodes.len(), 1);
    let node = &nodes[0];
    assert_eq!(node.location, page);
    assert_eq!(node.parent_location, format!("{}/sitemap.xml", base));
    assert_eq!(node.kind, NodeKind::Url);
    assert_eq!(node.domain, base.trim_start_matches("http://"));
    assert_eq!(node.meta.processed_by, walker.identity().processed_by());
    assert!(node
        .meta
        .processed_by
        .starts_with("website_node_crawler___127_0_0_1___manual___"));
}

#[tokio::test]
async fn test_breadth_first_order() {
    let server = MockServer::start().await;
    let base = server.uri();
    let url = |route: &str| format!("{}{}", base, route);

    mount_robots(&server, &["/index.xml"]).await;
    mount_body(&server, "/index.xml", sitemap_index(&[url("/a.xml"), url("/b.xml")])).await;
    mount_body(
        &server,
        "/a.xml",
        format!(
            "<urlset><url><loc>{}</loc></url><sitemap><loc>{}</loc></sitemap></urlset>",
            url("/u1"),
            url("/c.xml")
        ),
    )
    .await;
    mount_body(&server, "/b.xml", urlset(&[url("/u2")])).await;
    mount_body(&server, "/c.xml", urlset(&[url("/u3")])).await;

    let nodes = test_walker(&base, 0).process_all_sitemaps().await.unwrap();

    assert_eq!(
        locations(&nodes),
        vec![
            (url("/a.xml"), NodeKind::Sitemap),
            (url("/b.xml"), NodeKind::Sitemap),
            (url("/u1"), NodeKind::Url),
            (url("/c.xml"), NodeKind::Sitemap),
            (url("/u2"), NodeKind::Url),
            (url("/u3"), NodeKind::Url),
        ]
    );
    assert_eq!(nodes[2].parent_location, url("/a.xml"));
    assert_eq!(nodes[5].parent_location, url("/c.xml"));
}

#[tokio::test]
async fn test_failed_child_sitemap_is_pruned() {
    let server = MockServer::start().await;
    let base = server.uri();
    let url = |route: &str| format!("{}{}", base, route);

    mount_robots(&server, &["/index.xml"]).await;
    mount_body(
        &server,
        "/index.xml",
        sitemap_index(&[url("/missing.xml"), url("/broken.xml"), url("/ok.xml")]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing.xml"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_body(&server, "/broken.xml", "<urlset><url>".to_string()).await;
    mount_body(&server, "/ok.xml", urlset(&[url("/page")])).await;

    let nodes = test_walker(&base, 0).process_all_sitemaps().await.unwrap();

    assert_eq!(
        locations(&nodes),
        vec![
            (url("/ok.xml"), NodeKind::Sitemap),
            (url("/page"), NodeKind::Url),
        ]
    );
}

#[tokio::test]
async fn test_unreachable_seed_is_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, &["/gone.xml", "/sitemap.xml"]).await;
    Mock::given(method("GET"))
        .and(path("/gone.xml"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;
    mount_body(&server, "/sitemap.xml", urlset(&[format!("{}/page", base)])).await;

    let nodes = test_walker(&base, 0).process_all_sitemaps().await.unwrap();

    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].location, format!("{}/page", base));
}

#[tokio::test]
async fn test_missing_loc_aborts() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, &["/sitemap.xml"]).await;
    mount_body(
        &server,
        "/sitemap.xml",
        format!(
            "<urlset><url><loc>{}/ok</loc></url><url><lastmod>2024-01-01</lastmod></url></urlset>",
            base
        ),
    )
    .await;

    let result = test_walker(&base, 0).process_all_sitemaps().await;

    match result {
        Err(HarvestError::MalformedDocument { url, tag, field }) => {
            assert_eq!(url, format!("{}/sitemap.xml", base));
            assert_eq!(tag, "url");
            assert_eq!(field, "loc");
        }
        other => panic!("expected malformed document, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_elements_are_ignored() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, &["/sitemap.xml"]).await;
    mount_body(
        &server,
        "/sitemap.xml",
        format!(
            "<urlset><note>hello</note><url><loc>{}/page</loc></url></urlset>",
            base
        ),
    )
    .await;

    let nodes = test_walker(&base, 0).process_all_sitemaps().await.unwrap();
    assert_eq!(nodes.len(), 1);
}

#[tokio::test]
async fn test_namespaced_entry_fields() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, &["/sitemap.xml"]).await;
    mount_body(
        &server,
        "/sitemap.xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
        xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">
  <url>
    <loc>{base}/gallery</loc>
    <lastmod>2024-05-01T10:30:00+02:00</lastmod>
    <changefreq>weekly</changefreq>
    <priority>0.7</priority>
    <image:image>
      <image:loc>{base}/photo.jpg</image:loc>
    </image:image>
  </url>
</urlset>"#,
            base = base
        ),
    )
    .await;

    let nodes = test_walker(&base, 0).process_all_sitemaps().await.unwrap();
    let node = &nodes[0];

    assert_eq!(node.location, format!("{}/gallery", base));
    assert_eq!(
        node.last_modified.map(|lm| lm.to_rfc3339()),
        Some("2024-05-01T10:30:00+02:00".to_string())
    );
    assert_eq!(node.change_frequency.as_deref(), Some("weekly"));
    assert_eq!(node.priority, Some(0.7));

    match node.extra_properties.get("image") {
        Some(FieldValue::Map(image)) => assert_eq!(
            image.get("loc").and_then(FieldValue::as_text),
            Some(format!("{}/photo.jpg", base).as_str())
        ),
        other => panic!("expected nested image map, got {:?}", other),
    }
}

#[tokio::test]
async fn test_duplicates_across_parents_are_kept() {
    let server = MockServer::start().await;
    let base = server.uri();
    let url = |route: &str| format!("{}{}", base, route);

    mount_robots(&server, &["/a.xml", "/b.xml"]).await;
    mount_body(&server, "/a.xml", urlset(&[url("/shared")])).await;
    mount_body(&server, "/b.xml", urlset(&[url("/shared")])).await;

    let nodes = test_walker(&base, 0).process_all_sitemaps().await.unwrap();

    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].parent_location, url("/a.xml"));
    assert_eq!(nodes[1].parent_location, url("/b.xml"));
}

#[tokio::test]
async fn test_pause_between_documents() {
    let server = MockServer::start().await;
    let base = server.uri();
    let url = |route: &str| format!("{}{}", base, route);

    mount_robots(&server, &["/index.xml"]).await;
    mount_body(&server, "/index.xml", sitemap_index(&[url("/a.xml"), url("/b.xml")])).await;
    mount_body(&server, "/a.xml", urlset(&[url("/u1")])).await;
    mount_body(&server, "/b.xml", urlset(&[url("/u2")])).await;

    let started = Instant::now();
    let nodes = test_walker(&base, 150).process_all_sitemaps().await.unwrap();
    let elapsed = started.elapsed();

    // Three documents, two pauses
    assert_eq!(nodes.len(), 4);
    assert!(elapsed >= Duration::from_millis(300), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_process_single_sitemap() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_body(&server, "/sitemap.xml", urlset(&[format!("{}/page", base)])).await;

    let nodes = test_walker(&base, 0)
        .process_sitemap(&format!("{}/sitemap.xml", base))
        .await
        .unwrap();
    assert_eq!(nodes.len(), 1);

    let result = test_walker(&base, 0)
        .process_sitemap(&format!("{}/absent.xml", base))
        .await;
    assert!(matches!(result, Err(HarvestError::Fetch(FetchError::HttpStatus { .. }))));
}

#[tokio::test]
async fn test_retryable_status_exhausts_budget() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&test_request_config()).unwrap();
    let started = Instant::now();
    let result = fetcher.execute(&format!("{}/busy", server.uri())).await;

    match result {
        Err(FetchError::Connectivity { attempts, .. }) => assert_eq!(attempts, 3),
        other => panic!("expected connectivity error, got {:?}", other),
    }
    // Two delays between three attempts
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_non_retryable_status_fails_fast() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&test_request_config()).unwrap();
    let result = fetcher.execute(&format!("{}/missing", server.uri())).await;

    assert!(matches!(
        result,
        Err(FetchError::HttpStatus { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_retry_then_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&test_request_config()).unwrap();
    let body = fetcher.execute(&format!("{}/flaky", server.uri())).await.unwrap();

    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_connection_refused_is_retried() {
    let config = RequestConfig {
        retry_delay_ms: 10,
        retry_tries: 2,
        ..test_request_config()
    };
    let fetcher = Fetcher::new(&config).unwrap();

    let result = fetcher.execute("http://127.0.0.1:1/robots.txt").await;

    match result {
        Err(FetchError::Connectivity { attempts, .. }) => assert_eq!(attempts, 2),
        other => panic!("expected connectivity error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_request_profile_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .and(header("x-api-key", "secret"))
        .and(header("upgrade-insecure-requests", "1"))
        .and(body_string("query=1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("accepted"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_request_config();
    config.method = "post".to_string();
    config.body = Some("query=1".to_string());
    config
        .headers
        .insert("X-Api-Key".to_string(), "secret".to_string());

    let fetcher = Fetcher::new(&config).unwrap();
    let body = fetcher.execute(&format!("{}/api", server.uri())).await.unwrap();

    assert_eq!(body, "accepted");
}

#[tokio::test]
async fn test_redirect_policy() {
    let server = MockServer::start().await;
    let target = format!("{}/new", server.uri());

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", target.as_str())
                .set_body_string("moved"),
        )
        .mount(&server)
        .await;
    mount_body(&server, "/new", "destination".to_string()).await;

    let following = Fetcher::new(&test_request_config()).unwrap();
    let body = following
        .execute(&format!("{}/old", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "destination");

    let config = RequestConfig {
        allow_redirects: false,
        ..test_request_config()
    };
    let not_following = Fetcher::new(&config).unwrap();
    let body = not_following
        .execute(&format!("{}/old", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "moved");
}

#[tokio::test]
async fn test_coordinator_collapses_duplicates() {
    let server = MockServer::start().await;
    let base = server.uri();
    let url = |route: &str| format!("{}{}", base, route);

    mount_robots(&server, &["/a.xml", "/b.xml"]).await;
    mount_body(&server, "/a.xml", urlset(&[url("/shared"), url("/only-a")])).await;
    mount_body(&server, "/b.xml", urlset(&[url("/shared")])).await;

    let tracker = UpdateTracker::new(Box::new(MemoryStore::new()));
    let mut coordinator = Coordinator::new(test_walker(&base, 0), tracker, Vec::new());
    let stats = coordinator.run().await.unwrap();

    assert_eq!(stats.urls, 3);
    assert_eq!(stats.duplicates, 1);
    assert_eq!(stats.written, 2);

    let run_start = coordinator.walker().identity().processed_at();
    assert_eq!(
        coordinator.tracker().lookup(&url("/shared")).unwrap(),
        Some(run_start)
    );

    let written = coordinator.into_sink();
    assert_eq!(written[0].parent_location, url("/a.xml"));
    assert_eq!(
        written.iter().map(|n| n.location.clone()).collect::<Vec<_>>(),
        vec![url("/shared"), url("/only-a")]
    );
}

#[tokio::test]
async fn test_repeated_runs_skip_unchanged_urls() {
    let server = MockServer::start().await;
    let base = server.uri();
    let url = |route: &str| format!("{}{}", base, route);

    mount_robots(&server, &["/index.xml"]).await;
    mount_body(&server, "/index.xml", sitemap_index(&[url("/pages.xml")])).await;
    mount_body(
        &server,
        "/pages.xml",
        format!(
            "<urlset>\
               <url><loc>{}</loc><lastmod>2020-01-01</lastmod></url>\
               <url><loc>{}</loc></url>\
             </urlset>",
            url("/stable"),
            url("/undated")
        ),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("index.db");

    let tracker = UpdateTracker::new(Box::new(SqliteStore::new(&db_path).unwrap()));
    let mut first = Coordinator::new(test_walker(&base, 0), tracker, Vec::new());
    let stats = first.run().await.unwrap();
    assert_eq!(stats.sitemaps, 1);
    assert_eq!(stats.unchanged, 0);
    assert_eq!(stats.written, 3);
    drop(first);

    // The second run must start strictly after the first
    tokio::time::sleep(Duration::from_millis(5)).await;

    let tracker = UpdateTracker::new(Box::new(SqliteStore::new(&db_path).unwrap()));
    let mut second = Coordinator::new(test_walker(&base, 0), tracker, Vec::new());
    let stats = second.run().await.unwrap();
    assert_eq!(stats.unchanged, 1);
    assert_eq!(stats.written, 2);

    let written = second.into_sink();
    assert_eq!(
        written
            .iter()
            .map(|n| (n.location.clone(), n.kind))
            .collect::<Vec<_>>(),
        vec![
            (url("/pages.xml"), NodeKind::Sitemap),
            (url("/undated"), NodeKind::Url),
        ]
    );
}

#[tokio::test]
async fn test_failed_discovery_keeps_previous_output() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output_path = dir.path().join("nodes.jsonl");
    std::fs::write(&output_path, "previous\n").unwrap();

    let config = Config {
        crawler: test_crawler_config(&server.uri(), 0),
        request: test_request_config(),
        index: IndexConfig {
            backend: IndexBackend::Memory,
            ..IndexConfig::default()
        },
        output: OutputConfig {
            path: output_path.to_string_lossy().into_owned(),
        },
    };

    let mut coordinator = Coordinator::from_config(&config).unwrap();
    let result = coordinator.run().await;

    assert!(matches!(result, Err(HarvestError::Discovery { .. })));
    assert_eq!(std::fs::read_to_string(&output_path).unwrap(), "previous\n");
}

#[tokio::test]
async fn test_configured_output_is_replaced_after_traversal() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, &["/pages.xml"]).await;
    mount_body(&server, "/pages.xml", urlset(&[format!("{}/a", base)])).await;

    let dir = TempDir::new().unwrap();
    let output_path = dir.path().join("nodes.jsonl");
    std::fs::write(&output_path, "previous\n").unwrap();

    let config = Config {
        crawler: test_crawler_config(&base, 0),
        request: test_request_config(),
        index: IndexConfig {
            backend: IndexBackend::Memory,
            ..IndexConfig::default()
        },
        output: OutputConfig {
            path: output_path.to_string_lossy().into_owned(),
        },
    };

    let mut coordinator = Coordinator::from_config(&config).unwrap();
    let stats = coordinator.run().await.unwrap();
    assert_eq!(stats.written, 2);
    drop(coordinator);

    let content = std::fs::read_to_string(&output_path).unwrap();
    assert!(!content.contains("previous"));
    assert_eq!(content.lines().count(), 2);
}

#[tokio::test]
async fn test_minute_precision_zulu_lastmod_is_unchanged_on_second_run() {
    let server = MockServer::start().await;
    let base = server.uri();
    let page = format!("{}/page", base);

    mount_robots(&server, &["/pages.xml"]).await;
    mount_body(
        &server,
        "/pages.xml",
        format!(
            "<urlset><url><loc>{}</loc><lastmod>2005-01-01T12:00Z</lastmod></url></urlset>",
            page
        ),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("index.db");

    let tracker = UpdateTracker::new(Box::new(SqliteStore::new(&db_path).unwrap()));
    let mut first = Coordinator::new(test_walker(&base, 0), tracker, Vec::new());
    let stats = first.run().await.unwrap();
    assert_eq!(stats.written, 2);
    drop(first);

    let tracker = UpdateTracker::new(Box::new(SqliteStore::new(&db_path).unwrap()));
    let mut second = Coordinator::new(test_walker(&base, 0), tracker, Vec::new());
    let stats = second.run().await.unwrap();
    assert_eq!(stats.unchanged, 1);

    let written = second.into_sink();
    assert_eq!(
        locations(&written),
        vec![(format!("{}/pages.xml", base), NodeKind::Sitemap)]
    );
}
