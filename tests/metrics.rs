// tests/metrics.rs
//
// Prometheus exposition after real requests through the full router
// (`/predict` merged with `/metrics`). The recorder is process-global, so it
// is installed once and shared by every test in this binary.

mod common;

use std::sync::{Arc, OnceLock};

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use common::*;
use leaf_disease_gate::config::{GateConfig, ServiceConfig};
use leaf_disease_gate::metrics::Metrics;
use leaf_disease_gate::{api, AppState};

const BOUNDARY: &str = "leafgatemetrics";

fn metrics() -> &'static Metrics {
    static METRICS: OnceLock<Metrics> = OnceLock::new();
    METRICS.get_or_init(|| Metrics::init(&GateConfig::default()).expect("install recorder"))
}

fn app(general: Vec<f32>, disease: Vec<f32>) -> Router {
    let general = ScriptedClassifier::returning("general", general);
    let disease = ScriptedClassifier::returning("disease", disease);
    let p = pipeline(&general, &disease, GateConfig::default());
    api::router(AppState::new(Arc::new(p)), &ServiceConfig::default()).merge(metrics().router())
}

fn upload(bytes: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"leaf.png\"\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::post("/predict")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn scrape(app: Router) -> String {
    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn every_outcome_and_error_shows_up_in_exposition() {
    let leaf = general_output(&[("leaf", 0.9)]);
    let cases = [
        (leaf.clone(), vec![0.05, 0.9, 0.05], png_bytes(), StatusCode::OK),
        (general_output(&[("car", 0.9)]), vec![1.0, 0.0, 0.0], png_bytes(), StatusCode::OK),
        (leaf.clone(), vec![0.2, 0.1, 0.7], png_bytes(), StatusCode::OK),
        (leaf, vec![1.0, 0.0, 0.0], b"not an image".to_vec(), StatusCode::BAD_REQUEST),
    ];
    for (general, disease, bytes, expected) in cases {
        let resp = app(general, disease).oneshot(upload(&bytes)).await.unwrap();
        assert_eq!(resp.status(), expected);
    }

    let text = scrape(app(general_output(&[]), vec![1.0, 0.0, 0.0])).await;
    for needle in [
        r#"leaf_classify_outcomes_total{outcome="accepted"}"#,
        r#"leaf_classify_outcomes_total{outcome="not_a_plant"}"#,
        r#"leaf_classify_outcomes_total{outcome="low_confidence"}"#,
        r#"leaf_classify_errors_total{kind="decode"}"#,
        "leaf_classify_duration_ms",
    ] {
        assert!(
            text.contains(needle),
            "metrics exposition missing '{needle}'\n{text}"
        );
    }
}

fn sample(text: &str, series: &str) -> Option<f64> {
    text.lines()
        .find_map(|l| l.strip_prefix(series))
        .and_then(|v| v.trim().parse().ok())
}

#[tokio::test]
async fn gate_thresholds_are_published() {
    let text = scrape(app(general_output(&[]), vec![1.0, 0.0, 0.0])).await;
    let plant = sample(&text, r#"leaf_gate_threshold{gate="plant"}"#).expect("plant gauge");
    let conf = sample(&text, r#"leaf_gate_threshold{gate="confidence"}"#).expect("conf gauge");
    assert!((plant - 0.35).abs() < 1e-6, "{text}");
    assert!((conf - 0.80).abs() < 1e-6, "{text}");
}
