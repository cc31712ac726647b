pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::seo::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // SEO API
        .route("/api/v1/seo/generate", post(handlers::handle_generate))
        .route("/api/v1/seo/batch", post(handlers::handle_batch))
        .route("/api/v1/seo/score", post(handlers::handle_score))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::{Config, ConfigTree};
    use crate::oracle::stub::StubOracle;
    use crate::oracle::OracleError;
    use crate::seo::pipeline::SeoPipeline;

    fn app(oracle: StubOracle) -> Router {
        let config = Config::from_tree(&ConfigTree::default()).unwrap();
        let pipeline = SeoPipeline::new(Arc::new(oracle), config.batch_size);
        build_router(AppState {
            pipeline: Arc::new(pipeline),
            config,
        })
    }

    async fn call(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(v) => Body::from(v.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health_reports_model() {
        let (status, body) = call(app(StubOracle::constant("x")), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model"], "stub-model");
    }

    #[tokio::test]
    async fn test_generate_returns_metadata() {
        let oracle = StubOracle::new(vec![
            Ok("camera, vintage".to_string()),
            Ok("A vintage camera in working order.".to_string()),
        ]);
        let (status, body) = call(
            app(oracle),
            "POST",
            "/api/v1/seo/generate",
            Some(json!({"title": "Nikon F3", "price": 250, "condition": "Used"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["keywords"], json!(["camera", "vintage"]));
        assert_eq!(body["metadata"]["meta_keywords"], "camera,vintage");
        assert_eq!(body["metadata"]["suggested_tags"], json!(["camera", "vintage"]));
        // 2 hits, 34 chars → 2 / 4
        assert_eq!(body["metadata"]["seo_score"], 50.0);
        assert_eq!(body["degradations"], json!([]));
        assert!(body["generated_at"].is_string());
    }

    #[tokio::test]
    async fn test_generate_degrades_instead_of_failing() {
        let oracle = StubOracle::new(vec![
            Ok("lamp".to_string()),
            Err(OracleError::Api {
                status: 503,
                message: "model loading".into(),
            }),
        ]);
        let (status, body) = call(
            app(oracle),
            "POST",
            "/api/v1/seo/generate",
            Some(json!({"title": "Lamp"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["description"], "");
        assert_eq!(body["metadata"]["seo_score"], 0.0);
        assert_eq!(body["degradations"][0]["stage"], "description");
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_title() {
        let (status, body) = call(
            app(StubOracle::constant("x")),
            "POST",
            "/api/v1/seo/generate",
            Some(json!({"title": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_batch_returns_results_in_order() {
        let (status, body) = call(
            app(StubOracle::constant("same")),
            "POST",
            "/api/v1/seo/batch",
            Some(json!({"items": [{"title": "one"}, {"title": "two"}, {"title": "three"}]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_batch_blank_title_does_not_fail_other_items() {
        let (status, body) = call(
            app(StubOracle::constant("widget")),
            "POST",
            "/api/v1/seo/batch",
            Some(json!({"items": [{"title": "good one"}, {"title": ""}, {"title": "good two"}]})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        for result in results {
            assert_eq!(result["keywords"], json!(["widget"]));
            assert_eq!(result["metadata"]["meta_description"], "widget");
        }
    }

    #[tokio::test]
    async fn test_batch_rejects_empty_list() {
        let (status, _) = call(
            app(StubOracle::constant("x")),
            "POST",
            "/api/v1/seo/batch",
            Some(json!({"items": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_batch_rejects_oversized_list() {
        // default batch size 16 → limit 256
        let items: Vec<Value> = (0..257).map(|i| json!({"title": format!("item {i}")})).collect();
        let (status, body) = call(
            app(StubOracle::constant("x")),
            "POST",
            "/api/v1/seo/batch",
            Some(json!({ "items": items })),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"]["code"], "BATCH_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_score_does_not_call_oracle() {
        let oracle = Arc::new(StubOracle::new(vec![]));
        let config = Config::from_tree(&ConfigTree::default()).unwrap();
        let router = build_router(AppState {
            pipeline: Arc::new(SeoPipeline::new(oracle.clone(), 1)),
            config,
        });

        let (status, body) = call(
            router,
            "POST",
            "/api/v1/seo/score",
            Some(json!({"description": "red shoe", "keywords": ["red", "shoe", "blue"]})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        // 2 hits / (3 + 2) = 40
        assert_eq!(body["seo_score"], 40.0);
        assert_eq!(body["meta_description"], "red shoe");
        assert_eq!(oracle.calls(), 0);
    }
}
