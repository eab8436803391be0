use landax_client::{
    ClientConfig, Credentials, LandaxClient, LandaxError, PagingStrategy, QueryParams, Record,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a test client with a fixed token
async fn create_test_client(server: &MockServer, page_size: usize, paging: PagingStrategy) -> LandaxClient {
    let config = ClientConfig::new(
        "example.landax.no",
        Credentials::new("123456", "123456", "123456", "123456"),
    )
    .with_base_url(server.uri())
    .with_page_size(page_size)
    .with_paging(paging);

    LandaxClient::with_token(config, "tok")
        .await
        .expect("Failed to create client")
}

/// Helper to build a listing envelope with records 'from..=to'
fn page(from: i64, to: i64) -> Value {
    let value: Vec<Value> = (from..=to).map(|id| json!({"Id": id})).collect();
    json!({ "value": value })
}

fn ids(records: &[Record]) -> Vec<i64> {
    records
        .iter()
        .map(|r| r["Id"].as_i64().expect("record without Id"))
        .collect()
}

/// Test that offset paging walks pages until a short one
#[tokio::test]
async fn test_offset_paging_concatenates_pages() {
    let _ = env_logger::try_init();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v20/Contacts"))
        .and(query_param("$skip", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(3, 4)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v20/Contacts"))
        .and(query_param("$skip", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(5, 5)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v20/Contacts"))
        .and(query_param("$top", "2"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1, 2)))
        .with_priority(10)
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server, 2, PagingStrategy::Offset).await;
    let records = client
        .records()
        .get_all("Contacts", QueryParams::new())
        .await
        .expect("Failed to fetch contacts");

    assert_eq!(ids(&records), vec![1, 2, 3, 4, 5]);
}

/// Test that an empty first page ends after one request
#[tokio::test]
async fn test_empty_collection() {
    let _ = env_logger::try_init();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v20/Contacts"))
        .and(query_param("$top", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server, 1000, PagingStrategy::Offset).await;
    let records = client
        .records()
        .get_all("Contacts", QueryParams::new())
        .await
        .expect("Failed to fetch contacts");

    assert!(records.is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

/// Test that caller paging parameters are replaced by the engine's own
#[tokio::test]
async fn test_caller_paging_params_are_stripped() {
    let _ = env_logger::try_init();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v20/Contacts"))
        .and(query_param("$top", "1000"))
        .and(query_param("$filter", "FirstName eq 'Test'"))
        .and(query_param("$select", "Id,FirstName"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1, 3)))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server, 1000, PagingStrategy::Offset).await;
    let params = QueryParams::new()
        .filter("FirstName eq 'Test'")
        .top(5)
        .skip(50);
    let records = client
        .records()
        .fetch_all("Contacts", params, Some(&["Id", "FirstName"][..]))
        .await
        .expect("Failed to fetch contacts");
    assert_eq!(records.len(), 3);

    let requests = server.received_requests().await.unwrap();
    assert!(
        requests[0].url.query_pairs().all(|(key, _)| key != "$skip"),
        "Caller $skip should not reach the service"
    );
}

/// Test that next-link paging follows absolute and relative links
#[tokio::test]
async fn test_next_link_paging() {
    let _ = env_logger::try_init();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v20/Contacts"))
        .and(query_param("$skiptoken", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"Id": 3}],
            "@odata.nextLink": "Contacts?$skiptoken=3"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v20/Contacts"))
        .and(query_param("$skiptoken", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": [{"Id": 4}]})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v20/Contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"Id": 1}, {"Id": 2}],
            "@odata.nextLink": format!("{}/api/v20/Contacts?$skiptoken=2", server.uri())
        })))
        .with_priority(10)
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server, 1000, PagingStrategy::NextLink).await;
    let records = client
        .records()
        .get_all("Contacts", QueryParams::new())
        .await
        .expect("Failed to fetch contacts");

    assert_eq!(ids(&records), vec![1, 2, 3, 4]);
    let requests = server.received_requests().await.unwrap();
    assert!(
        requests[0].url.query_pairs().all(|(key, _)| key != "$top"),
        "Next-link paging leaves page size to the service"
    );
}

/// Test that a failing page fails the whole fetch
#[tokio::test]
async fn test_failed_page() {
    let _ = env_logger::try_init();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v20/Contacts"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": "", "message": "boom"}
        })))
        .mount(&server)
        .await;

    let client = create_test_client(&server, 1000, PagingStrategy::Offset).await;
    let err = client
        .records()
        .get_all("Contacts", QueryParams::new())
        .await
        .err()
        .expect("fetch should fail");
    match err {
        LandaxError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("unexpected error: {}", other),
    }
}

/// Test single record retrieval and the not-found sentinel
#[tokio::test]
async fn test_get_one() {
    let _ = env_logger::try_init();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v20/Contacts(5)"))
        .and(query_param("$expand", "Company"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Id": 5, "FirstName": "Test", "Company": {"Id": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v20/Contacts(404)"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let client = create_test_client(&server, 1000, PagingStrategy::Offset).await;
    let records = client.records();

    let params = QueryParams::new().expand(&["Company"]);
    let contact = records
        .get_one("Contacts", 5, &params)
        .await
        .expect("Failed to get contact")
        .expect("Contact should exist");
    assert_eq!(contact["FirstName"], "Test");
    assert_eq!(contact["Company"]["Id"], 2);

    for _ in 0..2 {
        let missing = records
            .get_one("Contacts", 404, &QueryParams::new())
            .await
            .expect("Not found should not be an error");
        assert!(missing.is_none());
    }
}

/// Test that create/update return raw responses with a JSON content type
#[tokio::test]
async fn test_create_and_update() {
    let _ = env_logger::try_init();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v20/Contacts"))
        .and(header("Content-Type", "application/json"))
        .and(header("Authorization", "Bearer tok"))
        .and(body_json(json!({"FirstName": "Test"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"Id": 9, "FirstName": "Test"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v20/Contacts(9)"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({"FirstName": "Test222"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v20/Contacts(9)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Id": 9})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server, 1000, PagingStrategy::Offset).await;
    let records = client.records();

    let created = records
        .create("Contacts", &json!({"FirstName": "Test"}))
        .await
        .expect("Failed to post contact");
    assert_eq!(created.status().as_u16(), 201);
    let body: Value = created.json().await.expect("Invalid create body");
    let id = body["Id"].as_i64().unwrap();

    let updated = records
        .update("Contacts", id, &json!({"FirstName": "Test222"}))
        .await
        .expect("Failed to patch contact");
    assert_eq!(updated.status().as_u16(), 204);

    records
        .get_one("Contacts", id, &QueryParams::new())
        .await
        .expect("Failed to get contact");

    // Reads after a mutation carry only the session headers
    let requests = server.received_requests().await.unwrap();
    let get = requests
        .iter()
        .find(|r| r.method.as_str() == "GET")
        .expect("GET was sent");
    assert!(get.headers.get("content-type").is_none());
}

/// Test that create does not raise on a refused record
#[tokio::test]
async fn test_create_returns_refusal_untouched() {
    let _ = env_logger::try_init();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v20/Contacts"))
        .respond_with(ResponseTemplate::new(400).set_body_string("FirstName is required"))
        .mount(&server)
        .await;

    let client = create_test_client(&server, 1000, PagingStrategy::Offset).await;
    let response = client
        .records()
        .create("Contacts", &json!({}))
        .await
        .expect("Transport should succeed");
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(response.text().await.unwrap(), "FirstName is required");
}

/// Test deleting existing and missing records
#[tokio::test]
async fn test_delete() {
    let _ = env_logger::try_init();
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v20/Contacts(9)"))
        .and(query_param("$format", "json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v20/Contacts(10)"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server, 1000, PagingStrategy::Offset).await;
    let records = client.records();

    let deleted = records.delete("Contacts", 9).await.expect("Failed to delete");
    assert_eq!(deleted.map(|r| r.status().as_u16()), Some(200));

    let missing = records.delete("Contacts", 10).await.expect("Failed to delete");
    assert!(missing.is_none());
}
