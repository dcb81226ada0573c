use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    nextedit_cli::main_entry().await
}
