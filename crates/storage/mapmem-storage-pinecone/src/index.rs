//! Serverless index lifecycle and data plane

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use mapmem_core::{
    IndexStats, MapMemError, MappingRecord, Result, ScoredMatch, VectorIndex, VectorRecord,
};

use crate::{api_client, PineconeConfig};

/// How long to wait for a newly created index to become ready
const READY_WAIT_MAX: Duration = Duration::from_secs(60);

/// Poll interval while waiting for readiness
const READY_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Vector index backed by a Pinecone serverless index
pub struct PineconeIndex {
    client: Client,
    host_url: String,
    name: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: IndexSpec<'a>,
}

#[derive(Debug, Serialize)]
struct IndexSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Debug, Serialize)]
struct ServerlessSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Debug, Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexDescription>,
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    name: String,
    #[serde(default)]
    host: String,
    #[serde(default)]
    dimension: Option<usize>,
    #[serde(default)]
    status: DescribedStatus,
}

#[derive(Debug, Default, Deserialize)]
struct DescribedStatus {
    #[serde(default)]
    ready: bool,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    vector: Vec<f32>,
    top_k: usize,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(default)]
    total_vector_count: usize,
    #[serde(default)]
    dimension: Option<usize>,
}

impl PineconeIndex {
    /// Connect to the configured index, creating it if absent and waiting
    /// (bounded) for a fresh index to become ready.
    ///
    /// A failed existence check is logged and treated as "index exists";
    /// the subsequent host lookup still fails loudly if it does not.
    pub async fn ensure(config: &PineconeConfig) -> Result<Self> {
        let client = api_client(&config.api_key)?;

        let listing = list_index_names(&client, &config.controller_url).await;
        if index_exists(&config.index_name, listing) {
            info!("Connected to existing index: {}", config.index_name);
        } else {
            create_index(&client, config).await?;
            info!(
                "Created new index: {}, waiting for it to become ready...",
                config.index_name
            );
            wait_until_ready(&client, config).await?;
        }

        let description = describe_index(&client, config).await?;
        check_dimension(&description, config.dimension)?;

        Ok(Self {
            client,
            host_url: format!("https://{}", description.host),
            name: config.index_name.clone(),
            dimension: config.dimension,
        })
    }
}

/// Interpret an index-listing outcome. A failed listing is logged and
/// treated as "exists" so connection is still attempted; the host lookup
/// that follows fails loudly if the index is genuinely absent.
fn index_exists(index_name: &str, listing: Result<Vec<String>>) -> bool {
    match listing {
        Ok(names) => names.iter().any(|n| n == index_name),
        Err(e) => {
            warn!(
                "Could not list indexes: {}. Assuming '{}' exists and connecting anyway.",
                e, index_name
            );
            true
        }
    }
}

/// Fail when the described index disagrees with the configured dimension
fn check_dimension(description: &IndexDescription, expected: usize) -> Result<()> {
    if let Some(dimension) = description.dimension {
        if dimension != expected {
            return Err(MapMemError::dimension(
                format!(
                    "Index '{}' was created with a different dimension",
                    description.name
                ),
                dimension,
                expected,
            ));
        }
    }
    Ok(())
}

async fn list_index_names(client: &Client, controller_url: &str) -> Result<Vec<String>> {
    let url = format!("{}/indexes", controller_url);
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| MapMemError::backend(format!("Index listing failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(MapMemError::backend(format!(
            "Index listing failed ({}): {}",
            status, body
        )));
    }

    let list: IndexList = response
        .json()
        .await
        .map_err(|e| MapMemError::backend(format!("Invalid index listing: {}", e)))?;
    Ok(list.indexes.into_iter().map(|d| d.name).collect())
}

async fn create_index(client: &Client, config: &PineconeConfig) -> Result<()> {
    let url = format!("{}/indexes", config.controller_url);
    let request = CreateIndexRequest {
        name: &config.index_name,
        dimension: config.dimension,
        metric: "cosine",
        spec: IndexSpec {
            serverless: ServerlessSpec {
                cloud: &config.cloud,
                region: &config.region,
            },
        },
    };

    let response = client
        .post(&url)
        .json(&request)
        .send()
        .await
        .map_err(|e| MapMemError::backend(format!("Index creation failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(MapMemError::backend(format!(
            "Index creation failed ({}): {}",
            status, body
        )));
    }
    Ok(())
}

async fn describe_index(client: &Client, config: &PineconeConfig) -> Result<IndexDescription> {
    let url = format!("{}/indexes/{}", config.controller_url, config.index_name);
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| MapMemError::backend(format!("Index description failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(MapMemError::backend(format!(
            "Index description failed ({}): {}",
            status, body
        )));
    }

    response
        .json()
        .await
        .map_err(|e| MapMemError::backend(format!("Invalid index description: {}", e)))
}

async fn wait_until_ready(client: &Client, config: &PineconeConfig) -> Result<()> {
    poll_until_ready(&config.index_name, || async move {
        Ok(describe_index(client, config).await?.status.ready)
    })
    .await
}

/// Run the readiness check every [`READY_POLL_INTERVAL`] until it reports
/// true, giving up with [`MapMemError::IndexNotReady`] once
/// [`READY_WAIT_MAX`] has elapsed.
async fn poll_until_ready<F, Fut>(index_name: &str, mut is_ready: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let mut waited = Duration::ZERO;
    loop {
        if is_ready().await? {
            info!("Index {} is ready", index_name);
            return Ok(());
        }
        if waited >= READY_WAIT_MAX {
            return Err(MapMemError::index_not_ready(index_name, waited.as_secs()));
        }

        debug!(
            "Still waiting for index {} ({}s)",
            index_name,
            waited.as_secs()
        );
        tokio::time::sleep(READY_POLL_INTERVAL).await;
        waited += READY_POLL_INTERVAL;
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()> {
        for record in records {
            if record.values.len() != self.dimension {
                return Err(MapMemError::dimension(
                    format!("Vector '{}' does not fit the index", record.id),
                    record.values.len(),
                    self.dimension,
                ));
            }
        }

        let url = format!("{}/vectors/upsert", self.host_url);
        let response = self
            .client
            .post(&url)
            .json(&UpsertRequest { vectors: records })
            .send()
            .await
            .map_err(|e| MapMemError::backend(format!("Upsert failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MapMemError::backend(format!(
                "Upsert failed ({}): {}",
                status, body
            )));
        }

        debug!("Upserted {} vectors into {}", records.len(), self.name);
        Ok(())
    }

    async fn query(
        &self,
        vector: Vec<f32>,
        top_k: usize,
        filter: Option<Value>,
    ) -> Result<Vec<ScoredMatch>> {
        if vector.len() != self.dimension {
            return Err(MapMemError::dimension(
                "query vector does not fit the index",
                vector.len(),
                self.dimension,
            ));
        }

        let url = format!("{}/query", self.host_url);
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            filter,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| MapMemError::backend(format!("Query failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MapMemError::backend(format!(
                "Query failed ({}): {}",
                status, body
            )));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| MapMemError::backend(format!("Invalid query response: {}", e)))?;

        // metadata that does not parse as a mapping record is dropped
        Ok(parsed
            .matches
            .into_iter()
            .map(|m| ScoredMatch {
                id: m.id,
                score: m.score,
                metadata: m
                    .metadata
                    .and_then(|v| serde_json::from_value::<MappingRecord>(v).ok()),
            })
            .collect())
    }

    async fn describe_stats(&self) -> Result<IndexStats> {
        let url = format!("{}/describe_index_stats", self.host_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| MapMemError::backend(format!("Stats request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MapMemError::backend(format!(
                "Stats request failed ({}): {}",
                status, body
            )));
        }

        let parsed: StatsResponse = response
            .json()
            .await
            .map_err(|e| MapMemError::backend(format!("Invalid stats response: {}", e)))?;

        Ok(IndexStats {
            total_vector_count: parsed.total_vector_count,
            dimension: parsed.dimension,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
