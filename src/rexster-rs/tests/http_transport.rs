use rexster_rs::{Client, ClientError, Comparison, Direction, Properties, QueryExpression};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_vertex_unwraps_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/graphs/tinkergraph/vertices/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": "2.6.0",
            "results": {"_id": "1", "_type": "vertex", "name": "marko"},
            "queryTime": 0.5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(server.uri(), "tinkergraph").unwrap();
    let vertex = client.vertex("1").await.unwrap();
    assert_eq!(vertex["name"], json!("marko"));
}

#[tokio::test]
async fn test_neighbor_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/graphs/tinkergraph/vertices/1/outE"))
        .and(query_param("_label", "knows"))
        .and(query_param("_take", "10"))
        .and(query_param("_properties", "[weight,>=,(d,0.500000)]"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [{"_id": "7"}]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(server.uri(), "tinkergraph").unwrap();
    let query = QueryExpression::builder()
        .label("knows")
        .take(10)
        .constraint("weight", Comparison::GreaterThanEqual, 0.5)
        .build()
        .unwrap();
    let edges = client.adjacent_edges("1", Direction::Out, query).await.unwrap();
    assert_eq!(edges, json!([{"_id": "7"}]));
}

#[tokio::test]
async fn test_gremlin_lookup_posts_script() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphs/tinkergraph/tp/gremlin"))
        .and(body_json(json!({
            "params": {},
            "script": "g.query().has(\"label\", \"person\").vertices()"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [{"_id": "1"}]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(server.uri(), "tinkergraph").unwrap();
    let query = QueryExpression::builder().label("person").build().unwrap();
    let vertex = client.get_unique_vertex(query).await.unwrap();
    assert_eq!(vertex, json!({"_id": "1"}));
}

#[tokio::test]
async fn test_create_vertex_sends_properties() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphs/tinkergraph/vertices"))
        .and(body_json(json!({"name": "lop", "lang": "java"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": {"_id": "3"}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(server.uri(), "tinkergraph").unwrap();
    let mut properties = Properties::new();
    properties.insert("name".to_string(), json!("lop"));
    properties.insert("lang".to_string(), json!("java"));
    let created = client.create_vertex(properties).await.unwrap();
    assert_eq!(created["_id"], json!("3"));
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/graphs/tinkergraph/vertices/404"))
        .respond_with(ResponseTemplate::new(404).set_body_string("{\"message\":\"Vertex not found\"}"))
        .mount(&server)
        .await;

    let client = Client::new(server.uri(), "tinkergraph").unwrap();
    let err = client.delete_vertex("404").await.unwrap_err();
    match err {
        ClientError::Server { status, message } => {
            assert_eq!(status, 404);
            assert!(message.contains("Vertex not found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/graphs/tinkergraph/indices/people"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = Client::new(server.uri(), "tinkergraph").unwrap();
    assert_eq!(client.drop_index("people").await.unwrap(), serde_json::Value::Null);
}
