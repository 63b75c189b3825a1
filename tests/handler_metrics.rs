mod common;

use axum::http::StatusCode;
use metrics_exporter_prometheus::PrometheusBuilder;

#[tokio::test]
async fn test_metrics_renders_recorded_counters() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    metrics::with_local_recorder(&recorder, || {
        metrics::counter!("link_redirects_total").increment(3);
    });

    let server = common::test_server(common::create_test_state().with_metrics(handle));

    let response = server.get("/api/metrics").await;

    response.assert_status_ok();
    assert_eq!(
        response.header("content-type"),
        "text/plain; version=0.0.4; charset=utf-8"
    );
    assert!(response.text().contains("link_redirects_total 3"));
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let server = common::test_server(common::create_test_state());

    let response = server.get("/api/metrics").await;

    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_text("Metrics not enabled");
}
