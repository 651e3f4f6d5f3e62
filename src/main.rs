use fenced_store::config::NodeConfig;
use fenced_store::node::Node;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = NodeConfig::from_env_and_args()?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    tracing::info!(
        "Starting node on {} with {} partitions",
        config.bind_addr,
        config.num_partitions
    );

    // 1. Storage layer + router:
    let node = Node::new(config.num_partitions)?;

    // 2. Stats reporter:
    let stats_store = node.store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(30));

        loop {
            interval.tick().await;
            let rows = stats_store.local_row_count().await;
            let mean = stats_store.version_average().await.finalize();
            tracing::info!("Store stats: {} rows, mean version {:?}", rows, mean);
        }
    });

    // 3. HTTP server:
    let app = node.app();
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    tracing::info!("HTTP server listening on {}", config.bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app).await?;

    Ok(())
}
