use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    grantscope_cli::main_entry().await
}
