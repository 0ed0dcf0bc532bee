#[tokio::main]
async fn main() -> anyhow::Result<()> {
    argocd_secrets::cli::run_cli().await
}
