#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = suspended_group_sweep::run_once().await {
        eprintln!("sweep_once failed: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
