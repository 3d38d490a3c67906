#![allow(clippy::unwrap_used)]
#![allow(clippy::indexing_slicing)]

use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use client::{BooruClient, BooruError, UploadQueue};
use common::{ImageUpdate, SearchRequest, Settings, Sort, TagRef, TagType};

const TOKEN: &str = "tok-123";
const BACKUP_LEN: usize = 4096;

#[derive(Clone, Default)]
struct Recorded {
    bodies: Arc<Mutex<Vec<(String, Value)>>>,
    uploads: Arc<Mutex<Vec<(String, String, usize)>>>,
}

impl Recorded {
    fn push(&self, route: &str, body: Value) {
        self.bodies.lock().unwrap().push((route.to_string(), body));
    }

    fn last(&self, route: &str) -> Option<Value> {
        self.bodies
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(r, _)| r == route)
            .map(|(_, b)| b.clone())
    }
}

fn image_json(id: u64, tags: &Value) -> Value {
    json!({
        "id": id,
        "title": "sunset",
        "fileName": "sunset.png",
        "extension": "png",
        "size": 2048,
        "width": 640,
        "height": 480,
        "hash": "abc123",
        "viewCount": 1,
        "createdAt": "2025-02-10T08:30:00Z",
        "updatedAt": "2025-02-10T08:30:00Z",
        "imageUrl": format!("/api/file/{id}"),
        "thumbnailUrl": format!("/api/file/{id}/thumb"),
        "tags": tags
    })
}

fn authorized(headers: &HeaderMap) -> Result<(), StatusCode> {
    let expected = format!("Bearer {TOKEN}");
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(v) if v == expected => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn login(Json(body): Json<Value>) -> Result<Json<Value>, StatusCode> {
    if body["password"] == "hunter2" {
        Ok(Json(json!({ "token": TOKEN })))
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

async fn get_image(
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorized(&headers).map_err(|s| (s, Json(json!({}))))?;
    if id == 404 {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({
                "status": 404,
                "error": "Not Found",
                "message": "Image not found",
                "path": "/api/images/404"
            })),
        ));
    }
    Ok(Json(image_json(
        id,
        &json!([{"id": 5, "name": "sky", "type": "general", "score": 0.9}]),
    )))
}

async fn update_image(
    State(rec): State<Recorded>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    rec.push("update", body);
    Json(image_json(id, &json!([])))
}

async fn add_tag(
    State(rec): State<Recorded>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    rec.push("add_tag", body.clone());
    let name = body["name"].as_str().unwrap_or("unknown").to_string();
    Json(image_json(
        id,
        &json!([{"id": 9, "name": name, "type": "character"}]),
    ))
}

async fn regenerate_tags(State(rec): State<Recorded>, Path(id): Path<u64>) -> Json<Value> {
    rec.push("regenerate", json!(id));
    Json(image_json(
        id,
        &json!([{"id": 11, "name": "sunset", "type": "meta", "score": 0.8}]),
    ))
}

async fn remove_tag(Path((id, _tag_id)): Path<(u64, u64)>) -> Json<Value> {
    Json(image_json(id, &json!([])))
}

async fn batch_delete(State(rec): State<Recorded>, Json(body): Json<Value>) -> StatusCode {
    rec.push("batch_delete", body);
    StatusCode::OK
}

async fn batch_download(Json(body): Json<Value>) -> Vec<u8> {
    let count = body.as_array().map_or(0, Vec::len);
    let mut zip = b"PK\x03\x04".to_vec();
    zip.extend(std::iter::repeat_n(b'x', count));
    zip
}

async fn search(State(rec): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    rec.push("search", body.clone());
    let number = body["page"].as_u64().unwrap_or(0);
    Json(json!({
        "content": [image_json(1, &json!([]))],
        "totalPages": 2,
        "totalElements": 21,
        "size": 20,
        "number": number,
        "first": number == 0,
        "last": number == 1,
        "empty": false
    }))
}

async fn parse_query(headers: HeaderMap, body: String) -> Result<String, StatusCode> {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with("text/plain") {
        return Err(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
    Ok(format!("parsed:{body}"))
}

async fn list_tags(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let all = [("hatsune_miku", "character"), ("sky", "general")];
    let tags: Vec<Value> = all
        .iter()
        .enumerate()
        .filter(|(_, (name, _))| params.get("query").is_none_or(|q| name.contains(q.as_str())))
        .map(|(i, (name, kind))| json!({"id": i, "name": name, "type": kind}))
        .collect();
    Json(Value::Array(tags))
}

async fn upload(
    State(rec): State<Recorded>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> StatusCode {
    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let len = field.bytes().await.map_or(0, |b| b.len());
        fields.push((name, file_name, len));
    }
    if let Err(status) = authorized(&headers) {
        return status;
    }
    rec.uploads.lock().unwrap().extend(fields);
    StatusCode::OK
}

async fn tasks() -> Json<Value> {
    Json(json!({
        "pendingCount": 1,
        "processingTask": null,
        "failedTasks": [{
            "id": "0e1a4c2d-7b1d-4a55-8a87-2d5b1f6e0c33",
            "filename": "broken.png",
            "size": 10,
            "errorMessage": "unsupported format"
        }]
    }))
}

async fn retry_task(
    State(rec): State<Recorded>,
    Query(params): Query<HashMap<String, String>>,
) -> StatusCode {
    rec.push("retry", json!(params.get("id")));
    StatusCode::OK
}

async fn settings() -> Json<Value> {
    Json(json!({
        "upload.max-file-size": "1024",
        "upload.allowed-extensions": "png,jpg"
    }))
}

async fn update_settings(State(rec): State<Recorded>, Json(body): Json<Value>) -> StatusCode {
    rec.push("settings", body);
    StatusCode::OK
}

async fn clear_cache(State(rec): State<Recorded>) -> StatusCode {
    rec.push("clear_cache", Value::Null);
    StatusCode::OK
}

async fn backup(headers: HeaderMap) -> Result<Vec<u8>, StatusCode> {
    authorized(&headers)?;
    let mut zip = b"PK\x03\x04".to_vec();
    zip.resize(BACKUP_LEN, 0);
    Ok(zip)
}

async fn restore(
    State(rec): State<Recorded>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> StatusCode {
    let mut parts = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let len = field.bytes().await.map_or(0, |b| b.len());
        parts.push(json!({"name": name, "fileName": file_name, "len": len}));
    }
    if let Err(status) = authorized(&headers) {
        return status;
    }
    rec.push("restore", Value::Array(parts));
    StatusCode::OK
}

async fn reset(State(rec): State<Recorded>) -> StatusCode {
    rec.push("reset", Value::Null);
    StatusCode::OK
}

async fn delete_task(State(rec): State<Recorded>, Path(id): Path<String>) -> StatusCode {
    rec.push("delete_task", json!(id));
    StatusCode::OK
}

async fn status() -> Json<Value> {
    Json(json!({"initialized": true, "passwordSet": true}))
}

fn router(rec: Recorded) -> Router {
    Router::new()
        .route("/api/auth/status", get(status))
        .route("/api/auth/login", post(login))
        .route(
            "/api/images/{id}",
            get(get_image).put(update_image).delete(|| async { StatusCode::OK }),
        )
        .route("/api/images/{id}/tags", post(add_tag))
        .route("/api/images/{id}/tags/regenerate", post(regenerate_tags))
        .route("/api/images/{id}/tags/{tag_id}", axum::routing::delete(remove_tag))
        .route("/api/images/batch/delete", post(batch_delete))
        .route("/api/images/batch/download", post(batch_download))
        .route("/api/search", post(search))
        .route("/api/search/parse", post(parse_query))
        .route("/api/tags", get(list_tags))
        .route("/api/upload", post(upload))
        .route(
            "/api/upload/tasks",
            get(tasks).post(retry_task).delete(|| async { StatusCode::OK }),
        )
        .route("/api/upload/tasks/{id}", axum::routing::delete(delete_task))
        .route("/api/system/settings", get(settings).post(update_settings))
        .route("/api/system/settings/clear-cache", post(clear_cache))
        .route("/api/system/backup", get(backup))
        .route("/api/system/backup/restore", post(restore))
        .route("/api/system/backup/reset", axum::routing::delete(reset))
        .with_state(rec)
}

fn spawn_backend() -> (String, Recorded) {
    let rec = Recorded::default();
    let app = router(rec.clone());
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();
    let listener = rt.block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        rt.block_on(async move { axum::serve(listener, app).await.unwrap() });
    });
    (format!("http://{addr}"), rec)
}

fn logged_in_client(base: &str) -> BooruClient {
    BooruClient::builder()
        .token(Some(TOKEN.to_string()))
        .build(base)
        .unwrap()
}

#[test]
fn test_login_installs_token() {
    let (base, _) = spawn_backend();
    let client = BooruClient::builder().build(&base).unwrap();

    let status = client.auth().status().unwrap();
    assert!(status.requires_login());

    let err = client.gallery().get(1).unwrap_err();
    assert!(err.is_unauthorized());

    assert!(client.auth().login("wrong").unwrap_err().is_unauthorized());

    let response = client.auth().login("hunter2").unwrap();
    assert_eq!(response.token, TOKEN);
    assert!(client.has_token());
    assert_eq!(client.gallery().get(1).unwrap().id, 1);

    client.clear_token();
    assert!(client.gallery().get(1).unwrap_err().is_unauthorized());
}

#[test]
fn test_api_error_body_is_parsed() {
    let (base, _) = spawn_backend();
    let client = logged_in_client(&base);
    match client.gallery().get(404).unwrap_err() {
        BooruError::Api { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body.message.as_deref(), Some("Image not found"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_gallery_operations() {
    let (base, rec) = spawn_backend();
    let client = logged_in_client(&base);

    let image = client.gallery().get(7).unwrap();
    assert_eq!(image.url, "/api/file/7");
    assert_eq!(image.tags[0].kind, TagType::General);

    let update = ImageUpdate {
        title: Some("dusk".to_string()),
        ..ImageUpdate::default()
    };
    client.gallery().update(7, &update).unwrap();
    assert_eq!(rec.last("update").unwrap(), json!({"title": "dusk"}));

    let tag = TagRef::by_name("hatsune_miku", Some(TagType::Character)).unwrap();
    let image = client.gallery().add_tag(7, &tag).unwrap();
    assert_eq!(image.tags[0].name, "hatsune_miku");
    assert_eq!(
        rec.last("add_tag").unwrap(),
        json!({"name": "hatsune_miku", "type": "character"})
    );

    let image = client.gallery().remove_tag(7, 9).unwrap();
    assert!(image.tags.is_empty());

    client.gallery().delete(7).unwrap();
    client.gallery().delete_many(&[1, 2, 3]).unwrap();
    assert_eq!(rec.last("batch_delete").unwrap(), json!([1, 2, 3]));

    let mut zip = Vec::new();
    let written = client.gallery().download_many(&[1, 2], &mut zip).unwrap();
    assert_eq!(written, 6);
    assert!(zip.starts_with(b"PK"));
}

#[test]
fn test_regenerate_tags() {
    let (base, rec) = spawn_backend();
    let client = logged_in_client(&base);

    let image = client.gallery().regenerate_tags(7).unwrap();
    assert_eq!(image.id, 7);
    assert_eq!(image.tags[0].name, "sunset");
    assert_eq!(image.tags[0].kind, TagType::Meta);
    assert_eq!(rec.last("regenerate").unwrap(), json!(7));
}

#[test]
fn test_search_and_parse() {
    let (base, rec) = spawn_backend();
    let client = logged_in_client(&base);

    let request = SearchRequest {
        tags: Some("sky -night".to_string()),
        page: Some(1),
        size: Some(20),
        sort: Some("createdAt,desc".parse::<Sort>().unwrap()),
        ..SearchRequest::default()
    };
    let page = client.search().search(&request).unwrap();
    assert_eq!(page.number, 1);
    assert!(page.last);
    assert_eq!(page.total_elements, 21);
    assert_eq!(
        rec.last("search").unwrap(),
        json!({"tags": "sky -night", "page": 1, "size": 20, "sort": "createdAt,desc"})
    );

    let parsed = client.search().parse("cats at night").unwrap();
    assert_eq!(parsed, "parsed:cats at night");
}

#[test]
fn test_tags_query_is_optional() {
    let (base, _) = spawn_backend();
    let client = logged_in_client(&base);

    assert_eq!(client.tags().list(None).unwrap().len(), 2);
    assert_eq!(client.tags().list(Some("  ")).unwrap().len(), 2);
    let found = client.tags().list(Some("miku")).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, TagType::Character);
}

#[test]
fn test_system_settings() {
    let (base, rec) = spawn_backend();
    let client = logged_in_client(&base);

    let settings = client.system().settings().unwrap();
    assert_eq!(settings.max_file_size(), 1024);

    let mut update = Settings::new();
    update.set("llm.model", "small");
    client.system().update_settings(&update).unwrap();
    assert_eq!(rec.last("settings").unwrap(), json!({"llm.model": "small"}));
}

#[test]
fn test_system_maintenance() {
    let (base, rec) = spawn_backend();
    let client = logged_in_client(&base);

    client.system().clear_cache().unwrap();
    assert_eq!(rec.last("clear_cache"), Some(Value::Null));

    let mut backup = Vec::new();
    let written = client.system().download_backup(&mut backup).unwrap();
    assert_eq!(written, BACKUP_LEN as u64);
    assert_eq!(backup.len(), BACKUP_LEN);
    assert!(backup.starts_with(b"PK"));

    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("backup.zip");
    fs::write(&archive, &backup[..10]).unwrap();
    client.system().restore_backup(&archive).unwrap();
    assert_eq!(
        rec.last("restore").unwrap(),
        json!([{"name": "file", "fileName": "backup.zip", "len": 10}])
    );

    assert_eq!(rec.last("reset"), None);
    client.system().reset().unwrap();
    assert_eq!(rec.last("reset"), Some(Value::Null));
}

#[test]
fn test_backup_requires_session() {
    let (base, rec) = spawn_backend();
    let client = BooruClient::builder().build(&base).unwrap();

    let mut backup = Vec::new();
    assert!(
        client
            .system()
            .download_backup(&mut backup)
            .unwrap_err()
            .is_unauthorized()
    );
    assert!(backup.is_empty());

    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("backup.zip");
    fs::write(&archive, b"PK").unwrap();
    assert!(
        client
            .system()
            .restore_backup(&archive)
            .unwrap_err()
            .is_unauthorized()
    );
    assert_eq!(rec.last("restore"), None);
}

#[test]
fn test_upload_tasks() {
    let (base, rec) = spawn_backend();
    let client = logged_in_client(&base);

    let info = client.upload().tasks().unwrap();
    assert_eq!(info.pending_count, 1);
    let failed = &info.failed_tasks[0];

    client.upload().retry(&failed.id).unwrap();
    assert_eq!(
        rec.last("retry").unwrap(),
        json!("0e1a4c2d-7b1d-4a55-8a87-2d5b1f6e0c33")
    );
    client.upload().delete(&failed.id).unwrap();
    assert_eq!(
        rec.last("delete_task").unwrap(),
        json!("0e1a4c2d-7b1d-4a55-8a87-2d5b1f6e0c33")
    );
    client.upload().clear_failed().unwrap();
}

#[test]
fn test_upload_queue_against_backend() {
    let (base, rec) = spawn_backend();
    let client = Arc::new(logged_in_client(&base));

    let dir = tempfile::tempdir().unwrap();
    let mut files = Vec::new();
    for (name, len) in [("a.png", 3), ("b.jpg", 5), ("c.webp", 7)] {
        let path = dir.path().join(name);
        fs::write(&path, vec![0u8; len]).unwrap();
        files.push(path);
    }

    let queue = UploadQueue::new(Arc::clone(&client), 2).unwrap();
    for f in files {
        queue.add(f).unwrap();
    }
    let report = queue.finish();
    assert_eq!(report.stats.completed, 3);
    assert!(report.failures.is_empty());

    let mut uploads = rec.uploads.lock().unwrap().clone();
    uploads.sort();
    assert_eq!(
        uploads,
        vec![
            ("file".to_string(), "a.png".to_string(), 3),
            ("file".to_string(), "b.jpg".to_string(), 5),
            ("file".to_string(), "c.webp".to_string(), 7),
        ]
    );
}

#[test]
fn test_upload_queue_logs_failures() {
    let (base, _) = spawn_backend();
    // No token: every upload is rejected
    let client = Arc::new(BooruClient::builder().build(&base).unwrap());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.png");
    fs::write(&path, b"png").unwrap();

    let queue = UploadQueue::new(client, 1).unwrap();
    queue.add(path.clone()).unwrap();
    let report = queue.finish();
    assert_eq!(report.stats.completed, 0);
    assert_eq!(report.stats.failed, 1);
    assert_eq!(report.failures[0].path, path);
    assert!(report.failures[0].error.contains("Unauthorized"));
}
