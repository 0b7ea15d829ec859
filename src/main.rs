use anyhow::Context;
use env_logger::Env;
use maps_harvest::{configuration::get_configuration, startup::run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().context("Failed to read configuration.")?;

    if let Err(e) = run(configuration).await {
        log::error!("Run failed: {:?}", e);
        return Err(e);
    }

    Ok(())
}
