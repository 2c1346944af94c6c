#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = suspended_group_sweep::run_worker().await {
        eprintln!("suspended-group-sweep fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
