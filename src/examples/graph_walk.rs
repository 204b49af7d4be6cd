//! Graph Walk Example
//!
//! Builds a tiny graph on a running Rexster server and queries it back.
//!
//! Run with: cargo run --example graph_walk

use rexster_rs::{Client, Comparison, Direction, Properties, QueryExpression};
use serde_json::json;

fn properties(value: serde_json::Value) -> Properties {
    value.as_object().cloned().unwrap_or_default()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("Rexster Graph Walk Example\n");

    let client = Client::new("http://localhost:8182", "tinkergraph")?;

    let marko = client
        .create_vertex(properties(json!({"name": "marko", "age": 29})))
        .await?;
    let vadas = client
        .create_vertex(properties(json!({"name": "vadas", "age": 27})))
        .await?;

    let marko_id = marko["_id"].as_str().unwrap_or_default().to_string();
    let vadas_id = vadas["_id"].as_str().unwrap_or_default().to_string();
    println!("📝 Added vertices: {} and {}", marko_id, vadas_id);

    client
        .create_edge(&marko_id, &vadas_id, "knows", properties(json!({"weight": 0.5})))
        .await?;

    // Neighbours through the REST endpoint
    let knows = QueryExpression::builder().label("knows").build()?;
    let friends = client.incident(&marko_id, Direction::Out, knows).await?;
    println!("🔍 marko knows: {}", friends);

    // The same kind of filter evaluated through Gremlin
    let adults = QueryExpression::builder()
        .constraint("age", Comparison::GreaterThan, 28)
        .take(10)
        .build()?;
    let found = client.lookup_vertex(adults).await?;
    println!("🔍 older than 28: {}", found);

    client.delete_vertex(&vadas_id).await?;
    client.delete_vertex(&marko_id).await?;
    println!("\n✅ Cleaned up");

    Ok(())
}
