use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use once_cell::sync::OnceCell;
use sqlx::MySqlPool;
use tracing::{debug, info};

use crate::model::employee::Employee;
use crate::repository::employee;

/// The whole active roster lives under one key.
const ROSTER_KEY: () = ();

static ROSTER_CACHE: OnceCell<Cache<(), Arc<Vec<Employee>>>> = OnceCell::new();

fn cache() -> &'static Cache<(), Arc<Vec<Employee>>> {
    ROSTER_CACHE.get_or_init(|| build(Duration::from_secs(300)))
}

fn build(ttl: Duration) -> Cache<(), Arc<Vec<Employee>>> {
    Cache::builder().max_capacity(1).time_to_live(ttl).build()
}

/// Sets the TTL. Only the first call before any lookup takes effect.
pub fn configure(ttl: Duration) {
    if ROSTER_CACHE.set(build(ttl)).is_err() {
        debug!("Roster cache already initialised, keeping existing TTL");
    }
}

/// Active employees in roster order, loading them on a miss.
pub async fn active_roster(pool: &MySqlPool) -> Result<Arc<Vec<Employee>>, Arc<sqlx::Error>> {
    cache()
        .try_get_with(ROSTER_KEY, async {
            debug!("Roster cache miss, loading active employees");
            employee::active_roster(pool).await.map(Arc::new)
        })
        .await
}

/// Drops the cached roster after any employee mutation.
pub async fn invalidate() {
    cache().invalidate(&ROSTER_KEY).await;
}

/// Loads the roster once at startup so the first kiosk request is warm.
pub async fn warmup_roster_cache(pool: &MySqlPool) -> anyhow::Result<()> {
    let roster = active_roster(pool)
        .await
        .map_err(|e| anyhow::anyhow!("roster warmup failed: {e}"))?;
    info!(employees = roster.len(), "Roster cache warmup complete");
    Ok(())
}
