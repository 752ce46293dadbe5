#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    relay_orchestrator::run::run().await
}
