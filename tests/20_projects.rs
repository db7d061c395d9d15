mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{Part, TestApp};

async fn create(app: &TestApp, token: &str, body: Value) -> Result<Value> {
    let (status, created) = app.json(Method::POST, "/api/projects", Some(token), body).await?;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    Ok(created["data"].clone())
}

fn project(title: &str, status: &str) -> Value {
    json!({
        "title": title,
        "shortDescription": "Short",
        "fullDescription": "Full description",
        "status": status,
    })
}

#[tokio::test]
async fn anonymous_list_only_shows_published() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin_token().await?;
    create(&app, &admin, project("Draft", "draft")).await?;
    create(&app, &admin, project("Live", "published")).await?;
    create(&app, &admin, project("Old", "archived")).await?;

    let (status, body) = app.get("/api/projects?status=draft", None).await?;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert!(items.iter().all(|p| p["status"] == "published"));
    assert!(body["pagination"].is_null());

    // Any header that is not a verified admin credential counts as anonymous.
    let user = app.user_token("reader@example.com").await?;
    for token in ["garbage", user.as_str()] {
        let (status, body) = app.get("/api/projects", Some(token)).await?;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|p| p["status"] == "published"));
    }

    let (_, body) = app.get("/api/projects", Some(&admin)).await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (_, body) = app.get("/api/projects?status=draft", Some(&admin)).await?;
    assert_eq!(body["data"][0]["title"], "Draft");
    Ok(())
}

#[tokio::test]
async fn list_orders_and_paginates() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin_token().await?;
    for (title, order) in [("Third", 3), ("First", 1), ("Second", 2)] {
        let mut body = project(title, "published");
        body["order"] = json!(order);
        create(&app, &admin, body).await?;
    }

    let (_, body) = app.get("/api/projects", None).await?;
    let titles: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["First", "Second", "Third"]);

    let (_, body) = app.get("/api/projects?limit=2&page=2", None).await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Third");
    assert_eq!(
        body["pagination"],
        json!({ "page": 2, "limit": 2, "total": 3, "pages": 2 })
    );
    Ok(())
}

#[tokio::test]
async fn each_read_counts_one_view() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin_token().await?;
    let created = create(&app, &admin, project("Counted", "draft")).await?;
    let uri = format!("/api/projects/{}", created["id"].as_str().unwrap());

    let before = created["viewCount"].as_i64().unwrap();
    let mut last = Value::Null;
    for _ in 0..5 {
        let (status, body) = app.get(&uri, None).await?;
        assert_eq!(status, StatusCode::OK);
        last = body;
    }
    assert_eq!(last["data"]["viewCount"].as_i64().unwrap(), before + 5);
    Ok(())
}

#[tokio::test]
async fn technologies_round_trip_in_order() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin_token().await?;
    let mut body = project("Stack", "published");
    body["technologies"] = json!(["Go", "Rust"]);
    let created = create(&app, &admin, body).await?;

    let (_, fetched) = app
        .get(&format!("/api/projects/{}", created["id"].as_str().unwrap()), None)
        .await?;
    assert_eq!(fetched["data"]["technologies"], json!(["Go", "Rust"]));
    Ok(())
}

#[tokio::test]
async fn validation_and_missing_records() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin_token().await?;

    let (status, body) = app
        .json(Method::POST, "/api/projects", Some(&admin), json!({ "title": "x".repeat(101) }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<_> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap().to_string())
        .collect();
    assert!(fields.contains(&"title".to_string()));
    assert!(fields.contains(&"shortDescription".to_string()));

    let (status, body) = app.get("/api/projects/not-an-id", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Project not found");

    let missing = format!("/api/projects/{}", uuid::Uuid::new_v4());
    let (status, _) = app.call(Method::DELETE, &missing, Some(&admin)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn mutations_require_admin() -> Result<()> {
    let app = TestApp::new();
    let user = app.user_token("nosy@example.com").await?;

    let (status, _) = app
        .json(Method::POST, "/api/projects", None, project("Nope", "draft"))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .json(Method::POST, "/api/projects", Some(&user), project("Nope", "draft"))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.objects.len().await, 0);
    Ok(())
}

#[tokio::test]
async fn toggle_featured_flips_and_reports_state() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin_token().await?;
    let created = create(&app, &admin, project("Star", "published")).await?;
    let uri = format!(
        "/api/projects/{}/toggle-featured",
        created["id"].as_str().unwrap()
    );

    let (_, body) = app.call(Method::PATCH, &uri, Some(&admin)).await?;
    assert_eq!(body["data"]["featured"], true);
    assert_eq!(body["message"], "Project featured successfully");

    let (_, body) = app.call(Method::PATCH, &uri, Some(&admin)).await?;
    assert_eq!(body["data"]["featured"], false);
    assert_eq!(body["message"], "Project unfeatured successfully");

    let (_, listed) = app.get("/api/projects?featured=true", None).await?;
    assert_eq!(listed["data"].as_array().unwrap().len(), 0);
    Ok(())
}

#[tokio::test]
async fn multipart_create_stores_thumbnail_and_decodes_fields() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin_token().await?;

    let (status, body) = app
        .multipart(
            Method::POST,
            "/api/projects",
            Some(&admin),
            &[
                Part::text("title", "Uploaded"),
                Part::text("shortDescription", "Short"),
                Part::text("fullDescription", "Full"),
                Part::text("technologies", r#"["Rust","Axum"]"#),
                Part::text("featured", "true"),
                Part::text("order", "4"),
                Part::png("thumbnail", "My Shot.PNG"),
            ],
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let data = &body["data"];
    assert_eq!(data["technologies"], json!(["Rust", "Axum"]));
    assert_eq!(data["featured"], true);
    assert_eq!(data["order"], 4);

    let thumb = data["thumbnailImage"].as_str().unwrap();
    assert!(thumb.starts_with("/uploads/projects/"), "{thumb}");
    assert!(thumb.ends_with("-my-shot.png"), "{thumb}");
    assert!(app.objects.contains(thumb).await);
    Ok(())
}

#[tokio::test]
async fn replacing_thumbnail_reclaims_old_blob() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin_token().await?;

    let (_, body) = app
        .multipart(
            Method::POST,
            "/api/projects",
            Some(&admin),
            &[
                Part::text("title", "Swap"),
                Part::text("shortDescription", "Short"),
                Part::text("fullDescription", "Full"),
                Part::png("thumbnail", "first.png"),
            ],
        )
        .await?;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let first = body["data"]["thumbnailImage"].as_str().unwrap().to_string();

    let (status, body) = app
        .multipart(
            Method::PUT,
            &format!("/api/projects/{}", id),
            Some(&admin),
            &[Part::png("thumbnail", "second.png")],
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    let second = body["data"]["thumbnailImage"].as_str().unwrap().to_string();
    assert_ne!(first, second);
    assert_eq!(body["data"]["title"], "Swap");
    assert!(app.objects.contains(&second).await);
    assert!(!app.objects.contains(&first).await);

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/projects/{}", id), Some(&admin))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.objects.len().await, 0);
    Ok(())
}

#[tokio::test]
async fn rejected_uploads_leave_no_trace() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin_token().await?;

    let (status, body) = app
        .multipart(
            Method::POST,
            "/api/projects",
            Some(&admin),
            &[
                Part::text("title", "Bad file"),
                Part::text("shortDescription", "Short"),
                Part::text("fullDescription", "Full"),
                Part::pdf("thumbnail", "not-an-image.pdf"),
            ],
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Only image files are allowed!");

    app.objects.fail_writes_to("projects");
    let (status, body) = app
        .multipart(
            Method::POST,
            "/api/projects",
            Some(&admin),
            &[
                Part::text("title", "Outage"),
                Part::text("shortDescription", "Short"),
                Part::text("fullDescription", "Full"),
                Part::png("thumbnail", "shot.png"),
            ],
        )
        .await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "UPLOAD_FAILED");

    let (_, listed) = app.get("/api/projects", Some(&admin)).await?;
    assert_eq!(listed["data"].as_array().unwrap().len(), 0);
    assert_eq!(app.objects.len().await, 0);
    Ok(())
}

#[tokio::test]
async fn gallery_links_to_other_records_survive_cleanup() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin_token().await?;

    let (status, body) = app
        .multipart(
            Method::PUT,
            "/api/profile",
            Some(&admin),
            &[Part::png("profileImage", "me.png")],
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    let avatar = body["data"]["profileImage"].as_str().unwrap().to_string();

    let gallery = json!([
        { "url": avatar, "alt": "local link" },
        { "url": format!("https://cdn.other-site.example{}", avatar), "alt": "mirror" },
    ]);
    let mut uris = Vec::new();
    for title in ["Edited", "Removed"] {
        let mut linked = project(title, "published");
        linked["images"] = gallery.clone();
        let created = create(&app, &admin, linked).await?;
        uris.push(format!("/api/projects/{}", created["id"].as_str().unwrap()));
    }

    let (status, _) = app
        .json(Method::PUT, &uris[0], Some(&admin), json!({ "images": [] }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(app.objects.contains(&avatar).await);

    let (status, _) = app.call(Method::DELETE, &uris[1], Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(app.objects.contains(&avatar).await);

    let (_, profile) = app.get("/api/profile", None).await?;
    assert_eq!(profile["data"]["profileImage"], avatar.as_str());
    Ok(())
}
