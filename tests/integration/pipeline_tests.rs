//! Integration tests for the aggregation pipeline
//!
//! These tests use wiremock to serve recipe pages and collaborator services
//! and drive the full fetch → extract → normalize → analyze → sort cycle.

use recipe_consensus::config::{load_config, Config, DomainEntry, SearchConfig, ServiceConfig};
use recipe_consensus::crawler::Coordinator;
use recipe_consensus::output::{JsonReportWriter, RecipeReport, ReportWriter};
use recipe_consensus::search::CandidateUrl;
use recipe_consensus::{AggregationRequest, Pipeline};
use serde_json::{json, Value};
use std::io::Write;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds an HTML page embedding one JSON-LD block
fn page_with(json_ld: Value) -> String {
    format!(
        r#"<html><head><title>Recipe</title>
        <script type="application/ld+json">{}</script>
        </head><body>Method</body></html>"#,
        json_ld
    )
}

fn recipe_page(name: &str, rating: Option<Value>, ingredients: &[&str]) -> String {
    let mut recipe = json!({
        "@context": "https://schema.org",
        "@type": "Recipe",
        "name": name,
        "recipeIngredient": ingredients,
        "totalTime": "PT1H"
    });
    if let Some(rating) = rating {
        recipe["aggregateRating"] = json!({"@type": "AggregateRating", "ratingValue": rating});
    }
    page_with(recipe)
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

/// Mounts a GET page at `route` that must be requested exactly `times` times
async fn mount_page(server: &MockServer, route: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

fn report_json(report: &RecipeReport) -> Value {
    let mut writer = JsonReportWriter::new(Vec::new());
    writer.write_report(report).expect("Failed to write report");
    serde_json::from_slice(&writer.into_inner()).expect("Report is not valid JSON")
}

fn keys(report: &RecipeReport) -> Vec<&str> {
    report.recipes.keys().collect()
}

fn name<'a>(report: &'a RecipeReport, key: &str) -> Option<&'a str> {
    report.recipes.get(key)?.name.as_deref()
}

#[tokio::test]
async fn test_rank_order_survives_reversed_latency() {
    let server = MockServer::start().await;
    let base = server.uri();

    // Best-ranked page answers last
    mount_page(
        &server,
        "/first",
        html(recipe_page("First", None, &["salt"])).set_delay(Duration::from_millis(600)),
        1,
    )
    .await;
    mount_page(
        &server,
        "/second",
        html(recipe_page("Second", None, &["salt"])).set_delay(Duration::from_millis(300)),
        1,
    )
    .await;
    mount_page(&server, "/third", html(recipe_page("Third", None, &["salt"])), 1).await;

    let pipeline = Pipeline::new(&Config::default()).expect("Failed to build pipeline");
    let request = AggregationRequest::urls(
        [
            format!("{}/first", base),
            format!("{}/second", base),
            format!("{}/third", base),
        ],
        5,
    );
    let report = pipeline.run(&request).await.expect("Aggregation failed");

    assert_eq!(keys(&report), vec!["recipe_1", "recipe_2", "recipe_3"]);
    assert_eq!(name(&report, "recipe_1"), Some("First"));
    assert_eq!(name(&report, "recipe_2"), Some("Second"));
    assert_eq!(name(&report, "recipe_3"), Some("Third"));
}

#[tokio::test]
async fn test_limit_caps_output_but_every_fetch_runs() {
    let server = MockServer::start().await;
    let base = server.uri();

    let mut urls = Vec::new();
    for (route, title) in [("/a", "A"), ("/b", "B"), ("/c", "C"), ("/d", "D")] {
        mount_page(&server, route, html(recipe_page(title, None, &["flour"])), 1).await;
        urls.push(format!("{}{}", base, route));
    }

    let coordinator = Coordinator::new(&Config::default()).expect("Failed to build coordinator");
    let (recipes, stats) = coordinator
        .collect_with_stats(&CandidateUrl::from_urls(urls), 2)
        .await;

    assert_eq!(recipes.keys().collect::<Vec<_>>(), vec!["recipe_1", "recipe_2"]);
    assert_eq!(recipes.get("recipe_1").unwrap().name.as_deref(), Some("A"));
    assert_eq!(recipes.get("recipe_2").unwrap().name.as_deref(), Some("B"));
    assert_eq!(stats.dispatched, 4);
    assert_eq!(stats.extracted, 4);
    assert_eq!(stats.accepted, 2);
    assert_eq!(stats.discarded_over_limit, 2);
}

#[tokio::test]
async fn test_failures_are_isolated_and_keys_stay_contiguous() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/missing", ResponseTemplate::new(404), 1).await;

    // A broken block must not hide the valid one after it
    let malformed = format!(
        r#"<html><head>
        <script type="application/ld+json">{{"@type": "Recipe", "name": </script>
        <script type="application/ld+json">{}</script>
        </head><body></body></html>"#,
        json!({"@type": "Recipe", "name": "Survivor", "recipeIngredient": ["eggs"]})
    );
    mount_page(&server, "/malformed", html(malformed), 1).await;

    mount_page(
        &server,
        "/plain",
        html("<html><body>No structured data here</body></html>".to_string()),
        1,
    )
    .await;
    mount_page(
        &server,
        "/article",
        html(page_with(json!({"@type": "Article", "name": "Not food"}))),
        1,
    )
    .await;
    mount_page(&server, "/good", html(recipe_page("Good", None, &["eggs"])), 1).await;

    let urls = vec![
        format!("{}/missing", base),
        format!("{}/malformed", base),
        "http://127.0.0.1:1/unreachable".to_string(),
        format!("{}/plain", base),
        format!("{}/article", base),
        format!("{}/good", base),
    ];

    let pipeline = Pipeline::new(&Config::default()).expect("Failed to build pipeline");
    let report = pipeline
        .run(&AggregationRequest::urls(urls, 5))
        .await
        .expect("Aggregation failed");

    assert_eq!(keys(&report), vec!["recipe_1", "recipe_2"]);
    assert_eq!(name(&report, "recipe_1"), Some("Survivor"));
    assert_eq!(name(&report, "recipe_2"), Some("Good"));
    assert_eq!(report.statistics.dispatched, 6);
    assert_eq!(report.statistics.fetch_failures, 2);
    assert_eq!(report.statistics.extraction_absent, 2);
    assert_eq!(report.statistics.accepted, 2);
}

#[tokio::test]
async fn test_excluded_urls_are_never_fetched() {
    let server = MockServer::start().await;
    let port = server.address().port();

    mount_page(&server, "/video", html(recipe_page("Video", None, &["salt"])), 0).await;
    mount_page(&server, "/recipe", html(recipe_page("Kept", None, &["salt"])), 1).await;

    let config = Config {
        exclusions: vec![DomainEntry {
            domain: "localhost".to_string(),
        }],
        ..Config::default()
    };
    let pipeline = Pipeline::new(&config).expect("Failed to build pipeline");
    let request = AggregationRequest::urls(
        [
            format!("http://localhost:{}/video", port),
            format!("http://127.0.0.1:{}/recipe", port),
        ],
        5,
    );
    let report = pipeline.run(&request).await.expect("Aggregation failed");

    assert_eq!(keys(&report), vec!["recipe_1"]);
    assert_eq!(name(&report, "recipe_1"), Some("Kept"));
    assert_eq!(report.statistics.excluded, 1);
    assert_eq!(report.statistics.dispatched, 1);
}

#[tokio::test]
async fn test_collaborator_failures_degrade_to_pass_through() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/one", html(recipe_page("One", None, &["1 tsp salt"])), 1).await;
    mount_page(&server, "/two", html(recipe_page("Two", None, &["2 tsp salt"])), 1).await;

    Mock::given(method("POST"))
        .and(path("/normalize"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/sort"))
        .respond_with(ResponseTemplate::new(200).set_body_string("I would start with Two."))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        normalizer: Some(ServiceConfig {
            endpoint: format!("{}/normalize", base),
        }),
        sorter: Some(ServiceConfig {
            endpoint: format!("{}/sort", base),
        }),
        ..Config::default()
    };
    let pipeline = Pipeline::new(&config).expect("Failed to build pipeline");
    let request =
        AggregationRequest::urls([format!("{}/one", base), format!("{}/two", base)], 5)
            .with_sort("quickest");
    let report = pipeline.run(&request).await.expect("Aggregation failed");

    assert_eq!(keys(&report), vec!["recipe_1", "recipe_2"]);

    // Raw ingredient text is passed through unannotated
    let written = report_json(&report);
    assert_eq!(
        written["recipes"]["recipe_1"]["recipeIngredient"],
        json!(["1 tsp salt"])
    );
    assert_eq!(report.secret_ingredient_count(), 0);
}

#[tokio::test]
async fn test_end_to_end_with_search_and_collaborators() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/classic",
        html(recipe_page(
            "Classic Stew",
            Some(json!("4.8")),
            &["1 tsp salt", "2 cups stock", "1 pinch saffron"],
        )),
        1,
    )
    .await;
    mount_page(
        &server,
        "/weeknight",
        html(recipe_page("Weeknight Stew", Some(json!(4.0)), &["salt", "stock"])),
        1,
    )
    .await;
    mount_page(
        &server,
        "/budget",
        html(recipe_page("Budget Stew", None, &["salt", "water"])),
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"link": format!("{}/classic", base)},
                {"link": "https://www.youtube.com/watch?v=stew"},
                {"link": format!("{}/weeknight", base)},
                {"link": format!("{}/budget", base)}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/normalize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recipe_1": [
                {"ingredient_name": "salt", "quantity": "1 tsp"},
                {"ingredient_name": "stock", "quantity": "2 cups"},
                {"ingredient_name": "saffron", "quantity": "1 pinch"}
            ],
            "recipe_2": [
                {"ingredient_name": "salt", "quantity": null},
                {"ingredient_name": "stock", "quantity": null}
            ],
            "recipe_3": [
                {"ingredient_name": "salt", "quantity": null},
                {"ingredient_name": "water", "quantity": null}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/sort"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"order": ["recipe_3", "recipe_1"]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        search: SearchConfig {
            endpoint: format!("{}/customsearch/v1", base),
            api_key: Some("test-key".to_string()),
            engine_id: Some("test-engine".to_string()),
        },
        normalizer: Some(ServiceConfig {
            endpoint: format!("{}/normalize", base),
        }),
        sorter: Some(ServiceConfig {
            endpoint: format!("{}/sort", base),
        }),
        ..Config::default()
    };
    let pipeline = Pipeline::new(&config).expect("Failed to build pipeline");
    let report = pipeline
        .run(&AggregationRequest::query("beef stew", 5).with_sort("quickest"))
        .await
        .expect("Aggregation failed");

    assert_eq!(report.statistics.candidates, 4);
    assert_eq!(report.statistics.excluded, 1);
    assert_eq!(report.statistics.accepted, 3);

    // Sorter order first, omitted keys appended
    assert_eq!(keys(&report), vec!["recipe_3", "recipe_1", "recipe_2"]);
    assert_eq!(name(&report, "recipe_1"), Some("Classic Stew"));

    let written = report_json(&report);
    assert_eq!(written["query"], json!("beef stew"));
    assert_eq!(written["sort"], json!("quickest"));

    let classic = &written["recipes"]["recipe_1"]["recipeIngredient"];
    assert_eq!(
        classic[0],
        json!({
            "ingredient_name": "salt",
            "quantity": "1 tsp",
            "frequency_percent": 100,
            "consensus_level": "Essential",
            "is_secret_ingredient": false
        })
    );
    assert_eq!(classic[1]["frequency_percent"], json!(67));
    assert_eq!(classic[1]["consensus_level"], json!("Essential"));
    assert_eq!(
        classic[2],
        json!({
            "ingredient_name": "saffron",
            "quantity": "1 pinch",
            "frequency_percent": 33,
            "consensus_level": "Flavor Variant",
            "is_secret_ingredient": true
        })
    );

    // Unique, but the recipe has no rating
    let budget = &written["recipes"]["recipe_3"]["recipeIngredient"];
    assert_eq!(budget[1]["ingredient_name"], json!("water"));
    assert_eq!(budget[1]["is_secret_ingredient"], json!(false));

    // Extra JSON-LD fields survive
    assert_eq!(written["recipes"]["recipe_1"]["totalTime"], json!("PT1H"));
    assert_eq!(
        written["recipes"]["recipe_1"]["@context"],
        json!("https://schema.org")
    );

    assert_eq!(report.secret_ingredient_count(), 1);

    // Only raw text went to the normalizer
    let requests = server.received_requests().await.expect("Request recording enabled");
    let normalize_request = requests
        .iter()
        .find(|r| r.url.path() == "/normalize")
        .expect("Normalizer was not called");
    let sent: Value = serde_json::from_slice(&normalize_request.body).unwrap();
    assert_eq!(
        sent["ingredients"]["recipe_1"],
        json!(["1 tsp salt", "2 cups stock", "1 pinch saffron"])
    );
}

#[tokio::test]
async fn test_pipeline_from_config_file() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/only"))
        .and(header(
            "user-agent",
            "Mozilla/5.0 (X11; Linux x86_64) TestBrowser/1.0",
        ))
        .respond_with(html(recipe_page("Only", None, &["rice"])))
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    write!(
        file,
        r#"
[user-agent]
browser = "Mozilla/5.0 (X11; Linux x86_64) TestBrowser/1.0"

[fan-out]
default-limit = 3
max-candidates = 10

[[exclusion]]
domain = "*.youtube.com"
"#
    )
    .expect("Failed to write config");

    let config = load_config(file.path()).expect("Failed to load config");
    assert_eq!(config.fan_out.default_limit, 3);
    assert_eq!(config.exclusions.len(), 1);

    let pipeline = Pipeline::new(&config).expect("Failed to build pipeline");
    let report = pipeline
        .run(&AggregationRequest::urls(
            [format!("{}/only", base)],
            config.fan_out.default_limit,
        ))
        .await
        .expect("Aggregation failed");

    // A single recipe has nothing to compare against
    assert_eq!(keys(&report), vec!["recipe_1"]);
    let written = report_json(&report);
    assert_eq!(
        written["recipes"]["recipe_1"]["recipeIngredient"],
        json!(["rice"])
    );
}
