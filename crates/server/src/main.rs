#[tokio::main]
async fn main() -> anyhow::Result<()> {
    askpti_server::start().await
}
