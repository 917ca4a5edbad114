use std::sync::Arc;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use vn_core::SearchHit;
use vn_inference::models::{DummyModel, ModelSet};
use vn_inference::{ArticleAnalyzer, ComparativeAnalyzer, FinalSummarizer};
use vn_scrappers::testing::{StaticPages, StaticSearch};
use vn_scrappers::{NewsFetcher, NewsPipeline};
use vn_voice::testing::{EchoSpeech, EchoTranslator};
use vn_voice::VoiceServices;
use vn_web::{create_app, AppState};

fn comparative_stub() -> Value {
    json!({
        "Sentiment Distribution": {"Positive": 1, "Negative": 1, "Neutral": 0},
        "Coverage Differences": [
            {
                "Comparison": "Article 1 covers Acme's record quarter, while Article 2 covers a product recall.",
                "Impact": "Investors weigh strong earnings against safety concerns."
            }
        ],
        "Topic Overlap": {
            "Common Topics": ["Acme"],
            "Unique Topics in Article 1": ["Earnings"],
            "Unique Topics in Article 2": ["Recall"]
        }
    })
}

fn app_with(generative: DummyModel) -> Router {
    let hits = vec![
        SearchHit {
            title: "Acme posts record quarter".to_string(),
            url: "https://news.example/acme-record".to_string(),
        },
        SearchHit {
            title: "Acme recalls widgets".to_string(),
            url: "https://news.example/acme-recall".to_string(),
        },
    ];
    let pages = StaticPages::new()
        .with_page("https://news.example/acme-record", "Acme reported record profit this quarter.")
        .with_page("https://news.example/acme-recall", "Acme recalled thousands of faulty widgets.");

    let chat = DummyModel::new()
        .reply_when("###SUMMARY", "[\"Acme\", \"Earnings\"]")
        .reply_when("###CLEANED SUMMARY", "Positive");
    let generative: Arc<DummyModel> = Arc::new(generative);
    let models = ModelSet {
        generative: generative.clone(),
        chat: Arc::new(chat),
    };

    let fetcher = NewsFetcher::new(
        Arc::new(StaticSearch::new(hits)),
        Arc::new(pages),
        Arc::new(ArticleAnalyzer::new(&models)),
    );
    let pipeline = NewsPipeline::new(
        fetcher,
        ComparativeAnalyzer::new(generative.clone()),
        FinalSummarizer::new(generative),
    );
    let voice = VoiceServices {
        translator: Arc::new(EchoTranslator),
        speech: Arc::new(EchoSpeech),
    };
    create_app(AppState::new(pipeline, voice))
}

fn app() -> Router {
    app_with(
        DummyModel::new()
            .reply_when("Coverage Differences", format!("```json\n{}\n```", comparative_stub()))
            .reply_when("4-5 lines", "Coverage of Acme is mixed.")
            .reply_when("Summarize", "Acme had news."),
    )
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_root() {
    let (status, body) = get_json(app(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Hello, World!"}));
}

#[tokio::test]
async fn test_fetch_news_end_to_end() {
    let (status, body) = get_json(app(), "/fetch_news?company=Acme").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Company"], "Acme");

    let articles = body["Articles"].as_array().unwrap();
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0]["Title"], "Acme posts record quarter");
    assert_eq!(articles[1]["Title"], "Acme recalls widgets");
    assert_eq!(articles[0]["Summary"], "Acme had news.");
    assert_eq!(articles[0]["Sentiment"], "Positive");

    assert_eq!(body["Comparative Sentiment Score"], comparative_stub());
    assert_eq!(body["Final Sentiment Analysis"], "Coverage of Acme is mixed.");
}

#[tokio::test]
async fn test_trailing_slash_routes() {
    let (status, _) = get_json(app(), "/fetch_news/?company=Acme").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get_json(app(), "/translate/?text=Hello").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("[hi] Hello"));
}

#[tokio::test]
async fn test_missing_company_is_bad_request() {
    let (status, body) = get_json(app(), "/fetch_news").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("company"));

    let (status, _) = get_json(app(), "/fetch_news?company=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_comparison_is_bad_gateway() {
    let app = app_with(
        DummyModel::new()
            .reply_when("Coverage Differences", "I could not compare these articles.")
            .reply_when("4-5 lines", "Summary.")
            .reply_when("Summarize", "Acme had news."),
    );
    let (status, body) = get_json(app, "/fetch_news?company=Acme").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["stage"], "comparative");
}

#[tokio::test]
async fn test_model_outage_names_the_article() {
    let app = app_with(
        DummyModel::new()
            .fail_when("faulty widgets")
            .reply_when("Summarize", "Acme had news."),
    );
    let (status, body) = get_json(app, "/fetch_news?company=Acme").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["stage"], "summarize");
    assert_eq!(body["article"], 1);
}

#[tokio::test]
async fn test_translate_with_target_language() {
    let (status, body) = get_json(app(), "/translate?text=Good%20news&target_language=ta").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("[ta] Good news"));
}

#[tokio::test]
async fn test_generate_tts_returns_audio() {
    let response = app()
        .oneshot(Request::builder().uri("/generate_tts?text=namaste").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"namaste");
}

#[tokio::test]
async fn test_generate_tts_rejects_empty_text() {
    let (status, body) = get_json(app(), "/generate_tts?text=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
