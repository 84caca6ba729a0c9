//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::instances::{ConvertError, instances_to_batches};
use crate::runtime::RuntimeError;
use crate::service::PredictService;
use crate::validate::ValidationError;
use crate::version::VersionInfo;

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: &'static str,
    pub version: VersionInfo,
    pub signatures: Vec<String>,
}

async fn health_check(State(service): State<Arc<PredictService>>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "READY",
        version: service.version().clone(),
        signatures: service.signature_names(),
    })
}

async fn api_description(State(service): State<Arc<PredictService>>) -> impl IntoResponse {
    (StatusCode::OK, Json(service.api_description().clone()))
}

fn validation_detail(errors: &[ValidationError]) -> Value {
    let detail: Vec<Value> = errors
        .iter()
        .map(|e| {
            json!({
                "loc": ["body", e.field],
                "msg": e.msg,
                "type": e.error_type
            })
        })
        .collect();
    json!({ "detail": detail })
}

fn conversion_detail(errors: &[ConvertError]) -> Value {
    let detail: Vec<Value> = errors
        .iter()
        .map(|e| {
            json!({
                "loc": ["body", e.field],
                "msg": e.msg,
                "type": "value_error"
            })
        })
        .collect();
    json!({ "detail": detail })
}

async fn predict(
    State(service): State<Arc<PredictService>>,
    Path(signature_name): Path<String>,
    body: Option<Json<Value>>,
) -> (StatusCode, Json<Value>) {
    let Some(signature) = service.signature(&signature_name) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("unknown signature: {signature_name}")})),
        );
    };

    let body = body.map(|Json(v)| v).unwrap_or_else(|| json!({}));

    // Validator exists for every signature the service was built with.
    if let Some(validator) = service.validator(&signature_name)
        && let Err(errors) = validator.validate(&body)
    {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(validation_detail(&errors)),
        );
    }

    let instances = body
        .get("instances")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let batches = match instances_to_batches(signature, &instances) {
        Ok(batches) => batches,
        Err(errors) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(conversion_detail(&errors)),
            );
        }
    };

    match service.runtime().run(&signature_name, batches).await {
        Ok(outputs) => (StatusCode::OK, Json(json!({ "predictions": outputs }))),
        Err(RuntimeError::UnknownSignature(name)) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("runtime does not expose signature '{name}'")})),
        ),
        Err(e) => {
            tracing::error!(signature = %signature_name, error = %e, "Prediction failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
        }
    }
}

pub fn routes(service: Arc<PredictService>) -> Router {
    Router::new()
        .route("/health-check", get(health_check))
        .route("/swagger.json", get(api_description))
        .route("/{signature}/predict/", post(predict))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ModelRuntime, TensorBatch};
    use api_gen::types::{Dim, Signature, TensorInfo};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use indexmap::IndexMap;
    use tower::ServiceExt;

    /// Mock runtime that reports the batch size of the first input.
    struct MockRuntime;

    #[async_trait]
    impl ModelRuntime for MockRuntime {
        async fn run(
            &self,
            _signature: &str,
            inputs: IndexMap<String, TensorBatch>,
        ) -> Result<IndexMap<String, Value>, RuntimeError> {
            let rows = inputs.values().next().map(|b| b.rows.len()).unwrap_or(0);
            let mut outputs = IndexMap::new();
            outputs.insert("scores".to_string(), json!(vec![0.5; rows]));
            Ok(outputs)
        }

        fn label(&self) -> &str {
            "mock"
        }
    }

    /// Mock runtime that always fails.
    struct FailingRuntime;

    #[async_trait]
    impl ModelRuntime for FailingRuntime {
        async fn run(
            &self,
            _signature: &str,
            _inputs: IndexMap<String, TensorBatch>,
        ) -> Result<IndexMap<String, Value>, RuntimeError> {
            Err(RuntimeError::Execution("session collapsed".to_string()))
        }
    }

    fn test_signatures() -> Vec<Signature> {
        let mut image_inputs = IndexMap::new();
        image_inputs.insert(
            "image_input".to_string(),
            TensorInfo {
                dtype: "float32".into(),
                shape: vec![Dim::Dynamic, Dim::Fixed(4)],
            },
        );
        let mut alt_inputs = IndexMap::new();
        alt_inputs.insert(
            "x".to_string(),
            TensorInfo {
                dtype: "int64".into(),
                shape: vec![Dim::Dynamic],
            },
        );
        vec![
            Signature {
                name: "serving_default".into(),
                inputs: image_inputs,
            },
            Signature {
                name: "alt".into(),
                inputs: alt_inputs,
            },
        ]
    }

    fn test_app(runtime: Arc<dyn ModelRuntime>) -> Router {
        let service = Arc::new(PredictService::new(test_signatures(), runtime).unwrap());
        routes(service)
    }

    async fn response_json(response: axum::response::Response) -> Value {
        let body = response.into_body();
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_check_reports_signatures_and_version() {
        let app = test_app(Arc::new(MockRuntime));

        let response = app
            .oneshot(Request::get("/health-check").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "READY");
        assert_eq!(json["version"]["runtime"], "mock");
        assert_eq!(json["signatures"], json!(["serving_default", "alt"]));
    }

    #[tokio::test]
    async fn swagger_json_serves_the_synthesized_document() {
        let app = test_app(Arc::new(MockRuntime));

        let response = app
            .oneshot(Request::get("/swagger.json").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["swagger"], "2.0");
        assert!(json["paths"]["/serving_default/predict/"]["post"].is_object());
        assert!(json["definitions"]["Type1"].is_object());
    }

    #[tokio::test]
    async fn predict_returns_runtime_outputs() {
        let app = test_app(Arc::new(MockRuntime));

        let response = app
            .oneshot(
                Request::post("/serving_default/predict/")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"instances": [{"image_input": [1.0, 2.0, 3.0, 4.0]},
                                          {"image_input": [5.0, 6.0, 7.0, 8.0]}]}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["predictions"]["scores"], json!([0.5, 0.5]));
    }

    #[tokio::test]
    async fn predict_unknown_signature_is_404() {
        let app = test_app(Arc::new(MockRuntime));

        let response = app
            .oneshot(
                Request::post("/missing/predict/")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"instances": []}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = response_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("missing"));
    }

    #[tokio::test]
    async fn predict_without_instances_is_422() {
        let app = test_app(Arc::new(MockRuntime));

        let response = app
            .oneshot(
                Request::post("/serving_default/predict/")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = response_json(response).await;
        assert_eq!(json["detail"][0]["loc"], json!(["body", "instances"]));
        assert_eq!(json["detail"][0]["type"], "value_error.missing");
    }

    #[tokio::test]
    async fn predict_with_missing_input_field_is_422() {
        let app = test_app(Arc::new(MockRuntime));

        let response = app
            .oneshot(
                Request::post("/serving_default/predict/")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"instances": [{"wrong_name": [1.0]}]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = response_json(response).await;
        let detail = json["detail"].as_array().unwrap();
        assert!(detail.iter().any(|row| {
            row["loc"][1] == "instances[0].image_input" && row["type"] == "value_error.missing"
        }));
    }

    #[tokio::test]
    async fn predict_runtime_failure_is_500() {
        let app = test_app(Arc::new(FailingRuntime));

        let response = app
            .oneshot(
                Request::post("/alt/predict/")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"instances": [{"x": [1]}]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = response_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("session collapsed"));
    }

    #[tokio::test]
    async fn predict_with_empty_body_is_422() {
        let app = test_app(Arc::new(MockRuntime));

        let response = app
            .oneshot(
                Request::post("/serving_default/predict/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
