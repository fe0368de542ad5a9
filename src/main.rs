#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gameshelf_lib::run().await
}
