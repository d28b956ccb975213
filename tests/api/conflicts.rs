use chrono::Utc;
use claimant_registry::{Condition, MemberStore, Mutation};
use serde_json::{json, Value};

use crate::support::{create, start_server};

async fn put(client: &reqwest::Client, url: &str, body: Value) -> (u16, Value) {
    let resp = client.put(url).json(&body).send().await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn update_walk_through_with_stale_edit() {
    let (_, base) = start_server().await;
    let client = reqwest::Client::new();

    let created = create(&client, &base, json!({ "firstName": "Ada" })).await;
    let url = format!("{base}/api/members/{}", created["id"]);

    let (status, body) = put(
        &client,
        &url,
        json!({ "firstName": "A", "version": 1, "lastModifiedBy": "clerk-1" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["version"], 2);
    assert_eq!(body["lastModifiedBy"], "clerk-1");
    assert_eq!(body["isLocked"], false);

    let (status, body) = put(&client, &url, json!({ "firstName": "B", "version": 1 })).await;
    assert_eq!(status, 409);
    assert_eq!(body["currentVersion"], 2);

    let (status, body) = put(&client, &url, json!({ "firstName": "B", "version": 2 })).await;
    assert_eq!(status, 200);
    assert_eq!(body["version"], 3);
    assert_eq!(body["firstName"], "B");
}

#[tokio::test]
async fn update_locked_member_conflicts_without_current_version() {
    let (registry, base) = start_server().await;
    let client = reqwest::Client::new();

    let created = create(&client, &base, json!({ "firstName": "Ada" })).await;
    let id = created["id"].as_i64().unwrap();
    registry
        .store()
        .update_fields(id, Condition::unlocked(), &Mutation::Acquire { at: Utc::now() })
        .unwrap();

    let url = format!("{base}/api/members/{id}");
    let (status, body) = put(&client, &url, json!({ "firstName": "B", "version": 1 })).await;
    assert_eq!(status, 409);
    assert_eq!(body["locked"], true);
    assert!(body.get("currentVersion").is_none());

    let resp = client.delete(&url).send().await.unwrap();
    assert_eq!(resp.status(), 409);
    assert!(registry.get(id).is_ok());

    // GET shows the lock to other readers.
    let fetched: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(fetched["isLocked"], true);
    assert!(fetched["lockedAt"].is_string());
}

#[tokio::test]
async fn unlock_endpoint_releases_stuck_lock() {
    let (registry, base) = start_server().await;
    let client = reqwest::Client::new();

    let created = create(&client, &base, json!({ "firstName": "Ada" })).await;
    let id = created["id"].as_i64().unwrap();
    registry
        .store()
        .update_fields(id, Condition::unlocked(), &Mutation::Acquire { at: Utc::now() })
        .unwrap();

    let resp = client
        .post(format!("{base}/api/members/{id}/unlock"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["isLocked"], false);
    assert_eq!(body["version"], 1);

    let (status, body) = put(
        &client,
        &format!("{base}/api/members/{id}"),
        json!({ "firstName": "B", "version": 1 }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["version"], 2);

    let resp = client
        .post(format!("{base}/api/members/4242/unlock"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn update_without_version_is_bad_request() {
    let (registry, base) = start_server().await;
    let client = reqwest::Client::new();

    let created = create(&client, &base, json!({ "firstName": "Ada" })).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = put(
        &client,
        &format!("{base}/api/members/{id}"),
        json!({ "firstName": "B" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "version is required when updating a member");
    assert_eq!(registry.get(id).unwrap().version, 1);
}

#[tokio::test]
async fn update_missing_member_is_not_found() {
    let (_, base) = start_server().await;
    let (status, _) = put(
        &reqwest::Client::new(),
        &format!("{base}/api/members/31337"),
        json!({ "firstName": "B", "version": 1 }),
    )
    .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn concurrent_puts_with_same_version_have_one_winner() {
    let (registry, base) = start_server().await;
    let client = reqwest::Client::new();

    let created = create(&client, &base, json!({ "firstName": "Ada" })).await;
    let id = created["id"].as_i64().unwrap();
    let url = format!("{base}/api/members/{id}");

    let requests = (0..8).map(|n| {
        let client = client.clone();
        let url = url.clone();
        tokio::spawn(async move {
            put(
                &client,
                &url,
                json!({ "firstName": format!("writer-{n}"), "version": 1 }),
            )
            .await
            .0
        })
    });

    let mut statuses = Vec::new();
    for handle in requests.collect::<Vec<_>>() {
        statuses.push(handle.await.unwrap());
    }

    assert_eq!(statuses.iter().filter(|s| **s == 200).count(), 1);
    assert!(statuses.iter().all(|s| *s == 200 || *s == 409));

    let stored = registry.get(id).unwrap();
    assert_eq!(stored.version, 2);
    assert!(!stored.is_locked);
}
