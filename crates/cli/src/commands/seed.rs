use crate::commands::{load_config, runtime, CommandResult};
use storefront_db::{connect, migrations, DemoCatalog, SeedResult};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("seed") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let seeded = DemoCatalog::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 6u8));

        pool.close().await;
        seeded
    });
    let result: Result<SeedResult, (&'static str, String, u8)> = result;

    match result {
        Ok(seeded) => CommandResult::success("seed", summary(&seeded)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn summary(seeded: &SeedResult) -> String {
    if seeded.inserted == 0 {
        format!("local catalog already holds {} products; nothing seeded", seeded.existing)
    } else {
        format!("seeded {} demo products into the local catalog", seeded.inserted)
    }
}

#[cfg(test)]
mod tests {
    use storefront_db::SeedResult;

    use super::summary;

    #[test]
    fn summary_reports_inserted_products() {
        assert_eq!(
            summary(&SeedResult { inserted: 4, existing: 0 }),
            "seeded 4 demo products into the local catalog"
        );
    }

    #[test]
    fn summary_reports_skipped_seed() {
        assert_eq!(
            summary(&SeedResult { inserted: 0, existing: 7 }),
            "local catalog already holds 7 products; nothing seeded"
        );
    }
}
