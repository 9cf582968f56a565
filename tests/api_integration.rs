#![cfg(feature = "api")]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use loadplan::api::{AppState, router};
use loadplan::store::{FileStore, MemoryStore};

async fn call(app: axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn save_list_load_delete_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(FileStore::open(dir.path()).unwrap());
    let config = json!({"lineupNames": ["A01", "B01"], "lineupMaxKW": 900});

    for name in ["hall-b", "hall-a"] {
        let (status, body) = call(
            router(state.clone()),
            post_json("/api/save-config", json!({"name": name, "data": config})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    let (status, body) = call(router(state.clone()), get("/api/list-configs")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["hall-a", "hall-b"]));

    let (status, body) = call(router(state.clone()), get("/api/load-config?name=hall-a")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, config);

    let req = Request::delete("/api/delete-config?name=hall-a")
        .body(Body::empty())
        .unwrap();
    let (status, _) = call(router(state.clone()), req).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(router(state.clone()), get("/api/load-config?name=hall-a")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_without_name_is_bad_request() {
    let state = AppState::new(MemoryStore::new());
    let req = Request::delete("/api/delete-config")
        .body(Body::empty())
        .unwrap();
    let (status, _) = call(router(state), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn plan_endpoint_distributes_and_reports() {
    let state = AppState::new(MemoryStore::new());
    let body = json!({
        "config": {"lineupNames": ["A01", "A02"], "lineupMaxKW": 600},
        "targetMW": 1.5,
        "sharingMode": "perPdu"
    });
    let (status, plan) = call(router(state), post_json("/api/plan", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["sharingMode"], "perPdu");
    assert_eq!(plan["unassignedKw"], 300.0);
    assert_eq!(plan["saturatedLineups"], json!(["A01", "A02"]));
    assert_eq!(plan["assignment"].as_array().map(Vec::len), Some(4));
    assert_eq!(plan["assignment"][0]["pduId"], "PDU-A01-1");
    assert_eq!(plan["assignment"][0]["kw"], 300.0);
    assert_eq!(plan["warnings"], json!([]));
    assert_eq!(plan["summary"]["totalLoadKw"], 1200.0);
}

#[tokio::test]
async fn plan_endpoint_rejects_invalid_config() {
    let state = AppState::new(MemoryStore::new());
    let body = json!({"config": {"powerFactor": 3.0}});
    let (status, err) = call(router(state), post_json("/api/plan", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].as_str().unwrap().contains("powerFactor"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn file_store_handles_concurrent_saves() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(FileStore::open(dir.path()).unwrap());

    let saves = (0..8).map(|i| {
        let app = router(state.clone());
        tokio::spawn(async move {
            call(
                app,
                post_json(
                    "/api/save-config",
                    json!({"name": format!("hall-{i}"), "data": {"lineupMaxKW": 100 * i}}),
                ),
            )
            .await
        })
    });
    for save in saves.collect::<Vec<_>>() {
        let (status, _) = save.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = call(router(state.clone()), get("/api/list-configs")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 8);
    let (_, body) = call(router(state), get("/api/load-config?name=hall-7")).await;
    assert_eq!(body["lineupMaxKW"], 700);
}
