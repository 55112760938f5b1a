use etsy_flow::config::AppConfig;
use etsy_flow::gateway::{AiGateway, GatewayError, GeminiGateway};
use etsy_flow::types::{Difficulty, SearchVolume};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEXT_PATH: &str = "/v1beta/models/text-model:generateContent";
const IMAGE_PATH: &str = "/v1beta/models/image-model:generateContent";

fn gateway(server: &MockServer) -> GeminiGateway {
    let config = AppConfig {
        api_key: Some("test-key".into()),
        api_base: format!("{}/", server.uri()),
        text_model: "text-model".into(),
        image_model: "image-model".into(),
        data_dir: None,
    };
    GeminiGateway::new(&config).unwrap()
}

fn text_response(payload: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": payload.to_string() }] } }]
    }))
}

#[tokio::test]
async fn generate_ideas_sends_schema_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(text_response(json!({
            "ideas": [{
                "title": "ADHD Daily Planner",
                "description": "Dopamine-friendly daily layout",
                "targetAudience": "Adults with ADHD",
                "priceRange": "$5-$9",
                "tags": ["adhd", "planner", "printable"],
                "difficulty": "Intermediate",
                "format": "GoodNotes PDF"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ideas = gateway(&server).generate_ideas("ADHD Organization").await.unwrap();
    assert_eq!(ideas.len(), 1);
    assert_eq!(ideas[0].title, "ADHD Daily Planner");
    assert_eq!(ideas[0].difficulty, Difficulty::Intermediate);

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("\"ADHD Organization\""));
    assert!(body["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .contains("Etsy shop consultant"));
    assert_eq!(
        body["generationConfig"]["responseSchema"]["required"],
        json!(["ideas"])
    );
}

#[tokio::test]
async fn find_trends_requests_search_and_shares_citations() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .and(body_partial_json(json!({ "tools": [{ "googleSearch": {} }] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": json!({
                    "trends": [
                        { "trendName": "Coquette bows", "description": "d", "searchVolumeLevel": "High" },
                        { "trendName": "Reading journals", "description": "d", "searchVolumeLevel": "Medium" },
                        { "trendName": "Pet portraits", "description": "d", "searchVolumeLevel": "Rising" }
                    ]
                }).to_string() }] },
                "groundingMetadata": { "groundingChunks": [
                    { "web": { "uri": "https://one.example", "title": "one" } },
                    { "web": { "uri": "https://two.example" } },
                    { "web": { "uri": "https://one.example" } },
                    { "web": { "uri": "https://three.example" } },
                    { "web": { "uri": "https://four.example" } }
                ] }
            }]
        })))
        .mount(&server)
        .await;

    let trends = gateway(&server).find_trends("Stickers").await.unwrap();
    assert_eq!(trends.len(), 3);
    assert_eq!(trends[2].search_volume_level, SearchVolume::Rising);
    for trend in &trends {
        assert_eq!(
            trend.grounding_urls,
            vec!["https://one.example", "https://two.example", "https://three.example"]
        );
    }
}

#[tokio::test]
async fn generate_mockup_uses_image_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [
                { "text": "Here you go" },
                { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgo=" } }
            ] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let image = gateway(&server)
        .generate_mockup("Budget Planner. Monthly tracker. Format: PDF. Target Audience: Students")
        .await
        .unwrap();
    assert_eq!(image.data_url(), "data:image/png;base64,iVBORw0KGgo=");

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .contains("Product description: Budget Planner."));
    assert!(body.get("generationConfig").is_none());
}

#[tokio::test]
async fn mockup_without_image_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .respond_with(text_response(json!("I cannot draw that")))
        .mount(&server)
        .await;

    let err = gateway(&server).generate_mockup("anything").await.unwrap_err();
    assert!(matches!(err, GatewayError::NoImage));
}

#[tokio::test]
async fn http_failure_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = gateway(&server).generate_ideas("Wedding").await.unwrap_err();
    match err {
        GatewayError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "overloaded");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn schema_violation_fails_whole_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(text_response(json!({
            "ideas": [{ "title": "Half an idea", "difficulty": "Expert" }]
        })))
        .mount(&server)
        .await;

    let err = gateway(&server).generate_ideas("Wedding").await.unwrap_err();
    assert!(matches!(err, GatewayError::Shape(_)));
}

#[tokio::test]
async fn empty_candidate_list_yields_no_ideas() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    assert!(gateway(&server).generate_ideas("Wedding").await.unwrap().is_empty());
}

#[tokio::test]
async fn non_json_envelope_is_a_shape_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = gateway(&server).find_trends("Wedding").await.unwrap_err();
    assert!(matches!(err, GatewayError::Shape(_)));
}
