use print_relay::{init_logger, Config, Server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logger();

    let config = Config::from_env();
    tracing::info!("🖨️  POS print relay starting...");

    Server::new(config).run().await
}
