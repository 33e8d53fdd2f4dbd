use mergington_registry::{ActivityDbExt, ActivityQuery};
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(debug_assertions)]
    let level = Some(Level::DEBUG);
    #[cfg(not(debug_assertions))]
    let level = Some(Level::INFO);

    let store = mergington_registry::create(level).await?;

    let activities = store.list_activities(&ActivityQuery::default()).await?;
    let days = store.available_days().await?;
    tracing::info!(
        "Registry ready on {} storage: {} activities across {}.",
        store.backend(),
        activities.len(),
        days.join(", ")
    );

    Ok(())
}
