//! Integration tests for `ReviewClient` against a local `wiremock` server.
//!
//! No real network traffic: each test mounts the listing pages it needs and
//! asserts on crawl order, termination, malformed-record policy and the
//! pagination bound.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use opindb_core::{AppConfig, MalformedPolicy, Recommendation};
use opindb_scraper::{ReviewClient, ScrapeError};

fn test_config(base_url: &str, max_pages: usize, on_malformed: MalformedPolicy) -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        log_level: "info".to_owned(),
        data_dir: std::path::PathBuf::from("./data/products"),
        source_base_url: base_url.to_owned(),
        scraper_request_timeout_secs: 5,
        scraper_user_agent: "opindb-test/0.1".to_owned(),
        scraper_max_pages: max_pages,
        scraper_inter_request_delay_ms: 0,
        scraper_max_retries: 0,
        scraper_retry_backoff_base_secs: 0,
        scraper_on_malformed: on_malformed,
    }
}

fn client(server: &MockServer, on_malformed: MalformedPolicy) -> ReviewClient {
    ReviewClient::new(&test_config(&server.uri(), 50, on_malformed)).expect("client")
}

/// One well-formed review fragment with the given id and rating.
fn review_fragment(id: &str, stars: &str, votes_yes: &str) -> String {
    format!(
        r#"<div class="js_product-review" data-entry-id="{id}">
             <span class="user-post__author-name">user-{id}</span>
             <span class="user-post__author-recomendation"><em>Polecam</em></span>
             <span class="user-post__score-count">{stars}</span>
             <div class="user-post__text">Treść opinii {id}</div>
             <span class="user-post__published">
               <time datetime="2021-02-17 09:00:21">17 lutego 2021</time>
             </span>
             <span id="votes-yes-{id}">{votes_yes}</span>
             <span id="votes-no-{id}">0</span>
           </div>"#
    )
}

fn listing_page(fragments: &[String]) -> String {
    format!("<html><body>{}</body></html>", fragments.concat())
}

async fn mount_listing(server: &MockServer, product_id: &str, page: usize, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/{product_id}/opinie-{page}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_end(server: &MockServer, product_id: &str, page: usize, status: u16) {
    let mut template = ResponseTemplate::new(status);
    if (300..400).contains(&status) {
        template = template.insert_header("Location", "/");
    }
    Mock::given(method("GET"))
        .and(path(format!("/{product_id}/opinie-{page}")))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn crawl_flattens_pages_in_document_and_page_order() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        "100",
        1,
        listing_page(&[
            review_fragment("a1", "4,5/5", "6"),
            review_fragment("a2", "3,0/5", "0"),
        ]),
    )
    .await;
    mount_listing(
        &server,
        "100",
        2,
        listing_page(&[review_fragment("b1", "5,0/5", "2")]),
    )
    .await;
    mount_end(&server, "100", 3, 404).await;

    let opinions = client(&server, MalformedPolicy::Abort)
        .extract_opinions("100")
        .await
        .expect("crawl");

    let ids: Vec<&str> = opinions.iter().map(|o| o.opinion_id.as_str()).collect();
    assert_eq!(ids, ["a1", "a2", "b1"]);
    assert_eq!(opinions[0].stars, 4.5);
    assert_eq!(opinions[0].recommendation, Recommendation::Recommended);
}

#[tokio::test]
async fn redirect_is_the_termination_signal_not_an_error() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        "200",
        1,
        listing_page(&[review_fragment("r1", "4,0/5", "1")]),
    )
    .await;
    mount_end(&server, "200", 2, 301).await;

    let opinions = client(&server, MalformedPolicy::Abort)
        .extract_opinions("200")
        .await
        .expect("crawl");
    assert_eq!(opinions.len(), 1);
}

#[tokio::test]
async fn immediate_end_yields_empty_sequence() {
    let server = MockServer::start().await;
    mount_end(&server, "300", 1, 404).await;

    let opinions = client(&server, MalformedPolicy::Abort)
        .extract_opinions("300")
        .await
        .expect("crawl");
    assert!(opinions.is_empty());
}

#[tokio::test]
async fn success_page_without_fragments_continues_to_next_page() {
    let server = MockServer::start().await;
    mount_listing(&server, "310", 1, listing_page(&[])).await;
    mount_listing(
        &server,
        "310",
        2,
        listing_page(&[review_fragment("c1", "2,5/5", "0")]),
    )
    .await;
    mount_end(&server, "310", 3, 404).await;

    let opinions = client(&server, MalformedPolicy::Abort)
        .extract_opinions("310")
        .await
        .expect("crawl");
    assert_eq!(opinions.len(), 1);
}

#[tokio::test]
async fn malformed_opinion_aborts_the_crawl_under_abort_policy() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        "400",
        1,
        listing_page(&[
            review_fragment("ok1", "4,0/5", "3"),
            review_fragment("bad", "4,0/5", "abc"),
        ]),
    )
    .await;

    let err = client(&server, MalformedPolicy::Abort)
        .extract_opinions("400")
        .await
        .expect_err("expected malformed opinion");
    match err {
        ScrapeError::MalformedOpinion {
            opinion_id, field, ..
        } => {
            assert_eq!(opinion_id, "bad");
            assert_eq!(field, "usefulness");
        }
        other => panic!("expected MalformedOpinion, got: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_opinion_is_skipped_under_skip_policy() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        "500",
        1,
        listing_page(&[
            review_fragment("ok1", "4,0/5", "3"),
            review_fragment("bad", "4,0/5", "abc"),
            review_fragment("ok2", "3,5/5", "1"),
        ]),
    )
    .await;
    mount_end(&server, "500", 2, 404).await;

    let opinions = client(&server, MalformedPolicy::Skip)
        .extract_opinions("500")
        .await
        .expect("crawl");
    let ids: Vec<&str> = opinions.iter().map(|o| o.opinion_id.as_str()).collect();
    assert_eq!(ids, ["ok1", "ok2"]);
}

#[tokio::test]
async fn exceeding_the_page_bound_is_a_pagination_limit_error() {
    let server = MockServer::start().await;
    // Every page answers 200 with one fragment; the site never signals end.
    for page in 1..=3 {
        mount_listing(
            &server,
            "600",
            page,
            listing_page(&[review_fragment(&format!("p{page}"), "4,0/5", "0")]),
        )
        .await;
    }

    let config = test_config(&server.uri(), 2, MalformedPolicy::Abort);
    let err = ReviewClient::new(&config)
        .expect("client")
        .extract_opinions("600")
        .await
        .expect_err("expected pagination limit");
    assert!(
        matches!(err, ScrapeError::PaginationLimit { max_pages: 2, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn extract_product_combines_name_opinions_and_aggregates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/700"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<h1 class="product-top__product-info__name">Laptop ABC 15</h1>"#,
        ))
        .mount(&server)
        .await;
    mount_listing(
        &server,
        "700",
        1,
        listing_page(&[
            review_fragment("x1", "3,0/5", "0"),
            review_fragment("x2", "5,0/5", "4"),
        ]),
    )
    .await;
    mount_end(&server, "700", 2, 404).await;

    let product = client(&server, MalformedPolicy::Abort)
        .extract_product("700")
        .await
        .expect("extract");

    assert_eq!(product.product_id, "700");
    assert_eq!(product.product_name, "Laptop ABC 15");
    assert_eq!(product.opinions_count, 2);
    assert_eq!(product.average_score, Some(4.0));
}

#[tokio::test]
async fn unknown_product_code_is_product_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server, MalformedPolicy::Abort)
        .extract_product("999")
        .await
        .expect_err("expected not found");
    assert!(matches!(err, ScrapeError::ProductNotFound { .. }));
}
