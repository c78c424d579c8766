use std::net::SocketAddr;

use axum::Router;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes;
use server::state::{DbState, MemoryState};

fn cors() -> CorsLayer { CorsLayer::very_permissive() }

struct TestApp {
    base_url: String,
    client: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }

    async fn post(&self, path: &str, body: Value) -> anyhow::Result<reqwest::Response> {
        Ok(self.client.post(self.url(path)).json(&body).send().await?)
    }

    async fn put(&self, path: &str, body: Value) -> anyhow::Result<reqwest::Response> {
        Ok(self.client.put(self.url(path)).json(&body).send().await?)
    }

    async fn get(&self, path: &str) -> anyhow::Result<reqwest::Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    async fn delete(&self, path: &str) -> anyhow::Result<reqwest::Response> {
        Ok(self.client.delete(self.url(path)).send().await?)
    }
}

async fn serve(app: Router) -> anyhow::Result<TestApp> {
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, client: reqwest::Client::new() })
}

async fn start_server() -> anyhow::Result<TestApp> {
    serve(routes::build_router(MemoryState::in_memory(), cors())).await
}

fn school(name: &str) -> Value {
    json!({"name": name, "address": "77 Massachusetts Ave", "phoneNumber": "617-253-1000"})
}

fn student(first: &str, last: &str, email: &str, school_name: &str) -> Value {
    json!({"firstname": first, "lastname": last, "email": email, "school_name": school_name})
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = app.get("/health").await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_metrics_and_openapi() -> anyhow::Result<()> {
    let app = start_server().await?;
    app.get("/health").await?;

    let res = app.get("/metrics").await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert!(res.text().await?.contains("school_registry_http_requests_total"));

    let res = app.get("/api-docs/openapi.json").await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let doc = res.json::<Value>().await?;
    assert!(doc["paths"]["/api/students"].is_object());
    Ok(())
}

#[tokio::test]
async fn e2e_create_student_and_read_back() -> anyhow::Result<()> {
    let app = start_server().await?;

    let res = app.post("/api/schools", school("MIT")).await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let created_school = res.json::<Value>().await?;
    assert_eq!(created_school["studentCount"], 0);
    assert_eq!(created_school["phoneNumber"], "617-253-1000");

    let res = app.post("/api/students", student("John", "Doe", "JohnDoe@Gmail.com", "MIT")).await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let created = res.json::<Value>().await?;
    assert_eq!(created["email"], "johndoe@gmail.com");
    assert_eq!(created["school_name"], "MIT");
    assert!(created["createdAt"].is_string());
    let id = created["id"].as_i64().expect("student id");

    let by_id = app.get(&format!("/api/students/{}", id)).await?.json::<Value>().await?;
    assert_eq!(by_id["firstname"], "John");
    assert_eq!(by_id["school_name"], "MIT");

    let res = app.get("/api/students/email/JOHNDOE@gmail.com").await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let exists = app.get("/api/students/exists?email=johndoe@gmail.com").await?.json::<Value>().await?;
    assert_eq!(exists["exists"], true);

    let school_id = created_school["id"].as_i64().expect("school id");
    let count = app.get(&format!("/api/schools/{}/students/count", school_id)).await?.json::<Value>().await?;
    assert_eq!(count["count"], 1);

    let by_name = app.get("/api/schools/name/MIT").await?.json::<Value>().await?;
    assert_eq!(by_name["studentCount"], 1);
    Ok(())
}

#[tokio::test]
async fn e2e_conflicts_and_missing_resources() -> anyhow::Result<()> {
    let app = start_server().await?;
    app.post("/api/schools", school("MIT")).await?;

    let res = app.post("/api/schools", school("MIT")).await?;
    assert_eq!(res.status(), HttpStatusCode::CONFLICT);
    let body = res.json::<Value>().await?;
    assert!(body["error"].is_string());
    assert!(body["message"].is_string());

    app.post("/api/students", student("John", "Doe", "john@doe.com", "MIT")).await?;
    let res = app.post("/api/students", student("Jon", "Doe", "JOHN@doe.com", "MIT")).await?;
    assert_eq!(res.status(), HttpStatusCode::CONFLICT);

    let res = app.post("/api/students", student("Ann", "Lee", "ann@lee.com", "Hogwarts")).await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    assert_eq!(app.get("/api/students/999").await?.status(), HttpStatusCode::NOT_FOUND);
    assert_eq!(app.get("/api/students/email/nobody@x.com").await?.status(), HttpStatusCode::NOT_FOUND);
    assert_eq!(app.get("/api/schools/999").await?.status(), HttpStatusCode::NOT_FOUND);
    assert_eq!(app.get("/api/schools/name/Yale").await?.status(), HttpStatusCode::NOT_FOUND);
    assert_eq!(app.delete("/api/students/999").await?.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_validation_errors() -> anyhow::Result<()> {
    let app = start_server().await?;
    app.post("/api/schools", school("MIT")).await?;

    let res = app.post("/api/students", Value::Null).await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = app.post("/api/students", student("J", "Doe", "j@doe.com", "MIT")).await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = app.post("/api/students", student("John", "Doe", "not-an-email", "MIT")).await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = app.post("/api/schools", json!({"name": "Yale"})).await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let all = app.get("/api/students").await?.json::<Vec<Value>>().await?;
    assert!(all.is_empty());
    Ok(())
}

#[tokio::test]
async fn e2e_values_wider_than_columns_are_rejected() -> anyhow::Result<()> {
    let app = start_server().await?;
    app.post("/api/schools", school("MIT")).await?;

    let mut long_phone = school("Caltech");
    long_phone["phoneNumber"] = json!("1".repeat(40));
    let res = app.post("/api/schools", long_phone).await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Validation Error");
    assert_eq!(body["message"], "phone_number must be at most 32 characters");

    let mut long_address = school("Caltech");
    long_address["address"] = json!("x".repeat(256));
    assert_eq!(app.post("/api/schools", long_address).await?.status(), HttpStatusCode::BAD_REQUEST);

    let email = format!("{}@example.com", "a".repeat(260));
    let res = app.post("/api/students", student("John", "Doe", &email, "MIT")).await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["message"], "email must be at most 255 characters");

    let john = app.post("/api/students", student("John", "Doe", "john@doe.com", "MIT")).await?.json::<Value>().await?;
    let res = app.put(&format!("/api/students/{}", john["id"]), json!({"email": email})).await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let schools = app.get("/api/schools").await?.json::<Vec<Value>>().await?;
    assert_eq!(schools.len(), 1);
    Ok(())
}

#[tokio::test]
async fn e2e_malformed_input_gets_json_error_body() -> anyhow::Result<()> {
    let app = start_server().await?;
    app.post("/api/schools", school("MIT")).await?;

    let res = app
        .post("/api/students", json!({"firstname": 123, "lastname": "Doe", "email": "j@doe.com", "school_name": "MIT"}))
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert!(res.headers()["content-type"].to_str()?.starts_with("application/json"));
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Validation Error");
    assert!(body["message"].as_str().is_some_and(|m| m.contains("firstname")));

    let res = app.client.post(app.url("/api/schools")).body("{not json").header("content-type", "application/json").send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "Validation Error");

    let res = app.get("/api/students/search").await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "Validation Error");

    let res = app.get("/api/students/exists").await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = app.get("/api/students/abc").await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "Validation Error");
    Ok(())
}

#[tokio::test]
async fn e2e_update_search_and_delete() -> anyhow::Result<()> {
    let app = start_server().await?;
    app.post("/api/schools", school("MIT")).await?;
    app.post("/api/schools", school("Harvard")).await?;
    let john = app.post("/api/students", student("John", "Doe", "john@doe.com", "MIT")).await?.json::<Value>().await?;
    app.post("/api/students", student("Jane", "Smith", "jane@smith.com", "MIT")).await?;
    let id = john["id"].as_i64().expect("student id");

    let hits = app.get("/api/students/search?name=an").await?.json::<Vec<Value>>().await?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["firstname"], "Jane");

    let res = app.put(&format!("/api/students/{}", id), json!({"lastname": "Roe", "school_name": "Harvard"})).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let updated = res.json::<Value>().await?;
    assert_eq!(updated["lastname"], "Roe");
    assert_eq!(updated["firstname"], "John");
    assert_eq!(updated["school_name"], "Harvard");

    let res = app.put(&format!("/api/students/{}", id), json!({"email": "Jane@Smith.com"})).await?;
    assert_eq!(res.status(), HttpStatusCode::CONFLICT);

    let res = app.put("/api/students/999", json!({"lastname": "Roe"})).await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let harvard = app.get("/api/students/school/Harvard").await?.json::<Vec<Value>>().await?;
    assert_eq!(harvard.len(), 1);

    assert_eq!(app.delete(&format!("/api/students/{}", id)).await?.status(), HttpStatusCode::NO_CONTENT);
    assert_eq!(app.delete("/api/students/email/JANE@smith.com").await?.status(), HttpStatusCode::NO_CONTENT);
    assert_eq!(app.delete("/api/students/email/jane@smith.com").await?.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_school_delete_blocked_while_students_enrolled() -> anyhow::Result<()> {
    let app = start_server().await?;
    let mit = app.post("/api/schools", school("MIT")).await?.json::<Value>().await?;
    let school_id = mit["id"].as_i64().expect("school id");
    let john = app.post("/api/students", student("John", "Doe", "john@doe.com", "MIT")).await?.json::<Value>().await?;

    let res = app.delete(&format!("/api/schools/{}", school_id)).await?;
    assert_eq!(res.status(), HttpStatusCode::CONFLICT);
    assert_eq!(app.get(&format!("/api/schools/{}", school_id)).await?.status(), HttpStatusCode::OK);
    assert_eq!(app.get(&format!("/api/students/{}", john["id"])).await?.status(), HttpStatusCode::OK);

    app.delete(&format!("/api/students/{}", john["id"])).await?;
    let res = app.delete(&format!("/api/schools/{}", school_id)).await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    assert_eq!(app.get(&format!("/api/schools/{}", school_id)).await?.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_database_backed_flow() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL missing; skip database e2e test.");
        return Ok(());
    }
    let db = models::db::connect().await?;
    models::db::migrate(&db).await?;
    let app = serve(routes::build_router(DbState::from_db(db), cors())).await?;

    let name = format!("E2E_{}", Uuid::new_v4().simple());
    let email = format!("e2e_{}@example.com", Uuid::new_v4().simple());
    let res = app.post("/api/schools", school(&name)).await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let school_id = res.json::<Value>().await?["id"].as_i64().expect("school id");

    let res = app.post("/api/students", student("Grace", "Hopper", &email.to_uppercase(), &name)).await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let created = res.json::<Value>().await?;
    assert_eq!(created["email"], email.as_str());

    let res = app.delete(&format!("/api/schools/{}", school_id)).await?;
    assert_eq!(res.status(), HttpStatusCode::CONFLICT);

    let mut long_phone = school(&format!("{}_P", name));
    long_phone["phoneNumber"] = json!("1".repeat(40));
    assert_eq!(app.post("/api/schools", long_phone).await?.status(), HttpStatusCode::BAD_REQUEST);
    let long_email = format!("{}@example.com", "a".repeat(260));
    let res = app.post("/api/students", student("Ada", "Lovelace", &long_email, &name)).await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    assert_eq!(app.delete(&format!("/api/students/email/{}", email)).await?.status(), HttpStatusCode::NO_CONTENT);
    assert_eq!(app.delete(&format!("/api/schools/{}", school_id)).await?.status(), HttpStatusCode::NO_CONTENT);
    Ok(())
}
