use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use log::{info, warn};
use std::net::SocketAddr;

use crate::data::{GenerateRequest, GenerateResponse};
use crate::error::GenerateError;
use crate::solver;

async fn generate_handler(
    Json(input): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, String)> {
    match solver::solve(&input) {
        Ok(output) => Ok(Json(output)),
        Err(e) => {
            warn!("Generate request failed: {e}");
            let status = match e {
                GenerateError::Invalid(_) => StatusCode::BAD_REQUEST,
                GenerateError::UnsatisfiableSeating { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            };
            Err((status, e.to_string()))
        }
    }
}

pub fn app() -> Router {
    Router::new().route("/v1/seating/generate", post(generate_handler))
}

pub async fn run_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn post_json(body: Value) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method("POST")
            .uri("/v1/seating/generate")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn generates_seating_and_schedule() {
        let (status, body) = post_json(json!({
            "rooms": "2",
            "subjects": [
                { "code": "CS", "start": "1", "end": "3" },
                { "code": "MA", "start": 1, "end": 3 }
            ],
            "staff": ["Ann", "Bo"],
            "capacity": 6,
            "seed": 9
        }))
        .await;
        assert_eq!(status, StatusCode::OK);

        let output: Value = serde_json::from_slice(&body).unwrap();
        let room_one = output["seating"]["1"].as_array().unwrap();
        assert_eq!(room_one.len(), 6);
        assert_eq!(room_one[0], json!("CS001"));
        assert_eq!(room_one[1], json!("MA001"));
        assert_eq!(output["seating"]["2"].as_array().unwrap().len(), 6);
        assert_eq!(output["schedule"]["2"].as_object().unwrap().len(), 3);
        assert_eq!(output["unseated"], json!([]));
    }

    #[tokio::test]
    async fn invalid_input_is_bad_request() {
        let (status, body) = post_json(json!({
            "rooms": 0,
            "subjects": [{ "code": "CS", "start": "a", "end": 3 }],
            "staff": []
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = String::from_utf8(body).unwrap();
        assert!(message.contains("room count"));
        assert!(message.contains("subject 'CS'"));
        assert!(message.contains("staff"));
    }

    #[tokio::test]
    async fn oversized_request_is_bad_request() {
        let (status, body) = post_json(json!({
            "rooms": 1,
            "subjects": [{ "code": "CS", "start": 0, "end": 4000000000u64 }],
            "staff": ["Ann"],
            "capacity": 4294967295u64
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = String::from_utf8(body).unwrap();
        assert!(message.contains("room capacity 4294967295 exceeds"));
        assert!(message.contains("4000000001 candidates"));
    }

    #[tokio::test]
    async fn unsatisfiable_is_unprocessable() {
        let (status, _) = post_json(json!({
            "rooms": 1,
            "subjects": [{ "code": "CS", "start": 1, "end": 61 }],
            "staff": ["Ann"],
            "fallback": "fail"
        }))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
