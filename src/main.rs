#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fakepay::server::run().await
}
