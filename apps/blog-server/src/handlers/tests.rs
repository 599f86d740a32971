use std::sync::{Arc, Mutex};

use actix_web::{App, http::StatusCode, middleware::from_fn, test, web};
use async_trait::async_trait;
use chrono::{Datelike, Duration, Utc};
use serde_json::Value;

use quill_core::BlogConfig;
use quill_core::domain::Post;
use quill_core::ports::{MailError, Mailer, OutgoingMail, PostRepository};
use quill_infra::InMemoryStore;

use crate::observability::request_id;
use crate::state::{AppState, in_memory_repositories};

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

struct Blog {
    store: InMemoryStore,
    mailer: Arc<RecordingMailer>,
    state: AppState,
}

impl Blog {
    fn new() -> Self {
        let store = InMemoryStore::new();
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::from_parts(
            in_memory_repositories(store.clone()),
            mailer.clone(),
            BlogConfig::default(),
        );
        Self {
            store,
            mailer,
            state,
        }
    }

    async fn post(&self, title: &str, tags: &[&str], age_days: i64, publish: bool) -> Post {
        let blog = &self.state.blog;
        let author = blog.get_or_create_author("admin").await.unwrap();
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        let mut post = blog
            .create_post(&author, title.into(), format!("All about {}", title), &tags)
            .await
            .unwrap();
        post.publish = Utc::now() - Duration::days(age_days);
        let post = self.store.save(post).await.unwrap();
        if publish {
            blog.publish_post(post.id).await.unwrap()
        } else {
            post
        }
    }
}

fn detail_uri(post: &Post) -> String {
    let date = post.publish_date();
    format!(
        "/api/blog/posts/{}/{}/{}/{}",
        date.year(),
        date.month(),
        date.day(),
        post.slug
    )
}

macro_rules! app {
    ($blog:expr) => {
        test::init_service(
            App::new()
                .wrap(from_fn(request_id))
                .app_data(web::Data::new($blog.state.clone()))
                .configure(super::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health_sets_request_id() {
    let blog = Blog::new();
    let app = app!(blog);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
}

#[actix_web::test]
async fn test_request_id_is_propagated() {
    let blog = Blog::new();
    let app = app!(blog);

    let req = test::TestRequest::get()
        .uri("/api/health")
        .insert_header(("X-Request-ID", "abc-123"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.headers().get("x-request-id").unwrap(), "abc-123");
}

#[actix_web::test]
async fn test_list_hides_drafts_and_recovers_bad_page() {
    let blog = Blog::new();
    for i in 0..5 {
        blog.post(&format!("Post {}", i), &[], i, true).await;
    }
    blog.post("Hidden", &[], 0, false).await;
    let app = app!(blog);

    let req = test::TestRequest::get()
        .uri("/api/blog/posts?page=abc")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["page"]["number"], 1);
    assert_eq!(body["page"]["total_items"], 5);
    assert_eq!(body["page"]["total_pages"], 2);
    assert_eq!(body["posts"].as_array().unwrap().len(), 4);
    assert_eq!(body["posts"][0]["title"], "Post 0");

    let req = test::TestRequest::get()
        .uri("/api/blog/posts?page=99")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["page"]["number"], 2);
    assert_eq!(body["posts"][0]["title"], "Post 4");
}

#[actix_web::test]
async fn test_list_by_tag() {
    let blog = Blog::new();
    blog.post("Tagged", &["rust"], 1, true).await;
    blog.post("Other", &["python"], 1, true).await;
    let app = app!(blog);

    let req = test::TestRequest::get()
        .uri("/api/blog/posts?tag=rust")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["tag"]["slug"], "rust");
    assert_eq!(body["posts"].as_array().unwrap().len(), 1);
    assert_eq!(body["posts"][0]["title"], "Tagged");
}

#[actix_web::test]
async fn test_unknown_tag_is_problem_404() {
    let blog = Blog::new();
    let app = app!(blog);

    let req = test::TestRequest::get()
        .uri("/api/blog/posts?tag=nope")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 404);
    assert_eq!(body["title"], "Not Found");
}

#[actix_web::test]
async fn test_detail_ranks_similar_posts() {
    let blog = Blog::new();
    let a = blog.post("A", &["x", "y"], 1, true).await;
    blog.post("B", &["x"], 3, true).await;
    blog.post("C", &["x", "y"], 2, true).await;
    blog.post("D", &[], 1, true).await;
    let app = app!(blog);

    let req = test::TestRequest::get().uri(&detail_uri(&a)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["post"]["title"], "A");
    assert_eq!(body["post"]["status"], "PB");
    let similar: Vec<&str> = body["similar_posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(similar, vec!["C", "B"]);
}

#[actix_web::test]
async fn test_canonical_url_serves_detail() {
    let blog = Blog::new();
    let post = blog.post("Hello World", &[], 0, true).await;
    let app = app!(blog);

    let req = test::TestRequest::get()
        .uri(&post.absolute_url())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["post"]["id"], post.id.to_string());
}

#[actix_web::test]
async fn test_unpadded_canonical_url_serves_detail() {
    let blog = Blog::new();
    let post = blog.post("Hello World", &[], 0, true).await;
    let app = app!(blog);

    let date = post.publish_date();
    let uri = format!(
        "/blog/{}/{}/{}/{}/",
        date.year(),
        date.month(),
        date.day(),
        post.slug
    );
    let req = test::TestRequest::get().uri(&uri).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["post"]["id"], post.id.to_string());
}

#[actix_web::test]
async fn test_draft_detail_is_404() {
    let blog = Blog::new();
    let draft = blog.post("Secret", &[], 0, false).await;
    let app = app!(blog);

    let req = test::TestRequest::get().uri(&detail_uri(&draft)).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_comment_created() {
    let blog = Blog::new();
    let post = blog.post("Hello", &[], 0, true).await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/api/blog/posts/{}/comments", post.id))
        .set_form([
            ("name", "Alice"),
            ("email", "a@example.com"),
            ("body", "Nice post"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["comment"]["name"], "Alice");
    assert!(body["comment"].get("email").is_none());

    let req = test::TestRequest::get().uri(&detail_uri(&post)).to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(detail["comments"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_invalid_comment_reports_field_errors() {
    let blog = Blog::new();
    let post = blog.post("Hello", &[], 0, true).await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/api/blog/posts/{}/comments", post.id))
        .set_form([("name", "Alice"), ("email", "not-an-email"), ("body", "Hi")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["email"].is_array());
    assert!(body["errors"].get("name").is_none());

    let req = test::TestRequest::get().uri(&detail_uri(&post)).to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;
    assert!(detail["comments"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_missing_comment_fields_are_field_errors() {
    let blog = Blog::new();
    let post = blog.post("Hello", &[], 0, true).await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/api/blog/posts/{}/comments", post.id))
        .set_form([("name", "Alice")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["email"].is_array());
    assert!(body["errors"]["body"].is_array());
}

#[actix_web::test]
async fn test_share_sends_one_mail() {
    let blog = Blog::new();
    let post = blog.post("Hello World", &[], 0, true).await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/api/blog/posts/{}/share", post.id))
        .set_form([
            ("name", "Bob"),
            ("email", "bob@example.com"),
            ("to", "carol@example.com"),
            ("comments", "Worth a look"),
        ])
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["sent"], true);
    assert_eq!(body["post"]["id"], post.id.to_string());

    let sent = blog.mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["carol@example.com".to_string()]);
    assert_eq!(sent[0].subject, "Bob recommends you read Hello World");
    assert!(sent[0].body.contains(&post.absolute_url()));
}

#[actix_web::test]
async fn test_invalid_share_sends_nothing() {
    let blog = Blog::new();
    let post = blog.post("Hello", &[], 0, true).await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/api/blog/posts/{}/share", post.id))
        .set_form([("name", "Bob"), ("email", "bob@example.com"), ("to", "nobody")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["to"].is_array());
    assert!(blog.mailer.sent.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn test_share_unknown_post_is_404() {
    let blog = Blog::new();
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/api/blog/posts/{}/share", uuid::Uuid::new_v4()))
        .set_form([
            ("name", "Bob"),
            ("email", "bob@example.com"),
            ("to", "carol@example.com"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_search() {
    let blog = Blog::new();
    blog.post("Ownership in Rust", &[], 1, true).await;
    blog.post("Gardening", &[], 1, true).await;
    blog.post("Rust drafts", &[], 1, false).await;
    let app = app!(blog);

    let req = test::TestRequest::get()
        .uri("/api/blog/search?query=rust")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["query"], "rust");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["title"], "Ownership in Rust");

    let req = test::TestRequest::get()
        .uri("/api/blog/search?query=")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert!(body["query"].is_null());
    assert!(body["results"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_sitemap_lists_published_posts() {
    let blog = Blog::new();
    let post = blog.post("Hello", &[], 0, true).await;
    let draft = blog.post("Secret", &[], 0, false).await;
    let app = app!(blog);

    let req = test::TestRequest::get().uri("/sitemap.xml").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("application/xml")
    );

    let body = test::read_body(resp).await;
    let xml = std::str::from_utf8(&body).unwrap();
    assert!(xml.contains(&post.absolute_url()));
    assert!(!xml.contains(&draft.absolute_url()));
    assert_eq!(xml.matches("<url>").count(), 1);
}
