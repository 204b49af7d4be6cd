use anyhow::Result;
use clap::Parser;
use rexster_core::ClientConfig;
use rexster_rs::{Client, Properties};
use serde_json::{json, Value};

mod cli;
mod telemetry;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let loaded = ClientConfig::load_if_present(&cli.config)?;
    let config_missing = loaded.is_none();
    let mut config = loaded.unwrap_or_default();
    if let Some(url) = &cli.url {
        config.base_url = url.clone();
    }
    if let Some(graph) = &cli.graph {
        config.graph = graph.clone();
    }

    let _guard = telemetry::init_telemetry(&config.log_filter)?;
    if config_missing {
        tracing::warn!("Config file {} not found, using defaults", cli.config);
    }
    tracing::info!(base_url = %config.base_url, graph = %config.graph, "rexster-cli starting");

    let output = run(cli.command, &config).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

async fn run(command: Command, config: &ClientConfig) -> Result<Value> {
    let client = || Client::from_config(config);

    let result = match command {
        // Explain never touches the network
        Command::Explain { filter } => {
            let query = filter.to_query()?;
            json!({
                "query_parameters": query.to_query_parameters(),
                "traversal": query.to_traversal_fragment(),
            })
        }
        Command::Vertex { id } => client()?.vertex(id).await?,
        Command::Vertices { key, value } => {
            let client = client()?;
            match (key, value) {
                (Some(key), Some(value)) => {
                    let value = cli::parse_typed(&value)?;
                    client.vertices(Some((key.as_str(), value))).await?
                }
                _ => client.vertices(None).await?,
            }
        }
        Command::LookupVertices { filter } => client()?.lookup_vertex(filter.to_query()?).await?,
        Command::LookupEdges { filter } => client()?.lookup_edge(filter.to_query()?).await?,
        Command::RunScript { script, params } => {
            let client = client()?;
            tracing::debug!(scripts = client.scripts().len(), "Client ready");
            let params = params
                .iter()
                .map(|p| cli::parse_param(p))
                .collect::<Result<Properties>>()?;
            client.run_script_on_graph(&script, params).await?
        }
    };

    Ok(result)
}
