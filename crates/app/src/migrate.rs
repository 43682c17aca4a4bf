use metrics::counter;
use tracing::{error, info};

use product_catalog_storage::{Database, StorageError};
use product_catalog_util::MigrationPolicy;

/// Applies schema migrations, sleeping and retrying up to the configured
/// number of attempts. The last error is returned once attempts run out.
pub async fn run_with_retry(
    database: &Database,
    policy: MigrationPolicy,
) -> Result<(), StorageError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        info!(stage = "storage", attempt, max_attempts, "applying database migrations");

        match database.run_migrations().await {
            Ok(()) => {
                counter!("migration_attempts_total", "result" => "ok").increment(1);
                info!(stage = "storage", attempt, "database migrations applied");
                return Ok(());
            }
            Err(err) => {
                counter!("migration_attempts_total", "result" => "error").increment(1);
                error!(stage = "storage", attempt, max_attempts, error = %err, "failed to apply database migrations");

                if attempt >= max_attempts {
                    error!(stage = "storage", max_attempts, "giving up on database migrations");
                    return Err(err);
                }

                info!(
                    stage = "storage",
                    delay_secs = policy.retry_delay.as_secs(),
                    "waiting before retrying migrations"
                );
                tokio::time::sleep(policy.retry_delay).await;
                attempt += 1;
            }
        }
    }
}
