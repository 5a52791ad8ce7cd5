use mapmem_core::{
    compose_context, load_env, FieldDescriptor, MappingMemory, NewMapping, Result, RetrieveOptions,
};
use mapmem_storage_pinecone::{connect, PineconeConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
    load_env().ok();

    let config = PineconeConfig::from_env()?;
    let (embedder, index) = connect(&config).await?;
    let memory = MappingMemory::new(embedder, index);

    let mut mapping = NewMapping::new("Email", "Person.email");
    mapping.source_system = "Salesforce".to_string();
    mapping.transformation = "lowercase".to_string();
    mapping.confidence = 0.95;
    mapping.validated = true;
    let id = memory.store(mapping).await?;
    println!("stored mapping {}", id);

    let field = FieldDescriptor::new("EmailAddress", "string").with_source_system("HubSpot");
    let matches = memory.retrieve(&field, RetrieveOptions::default()).await?;
    println!("{}", compose_context(&matches));

    let stats = memory.stats().await?;
    println!(
        "{} mappings in {} ({} @ {} dims)",
        stats.total_mappings, stats.index_name, stats.embedding_model, stats.embedding_dimension
    );
    Ok(())
}
