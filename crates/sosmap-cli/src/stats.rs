//! `stats` command: per-category row counts.

use sosmap_core::AppConfig;

pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let pool_config = sosmap_db::PoolConfig::from_app_config(config);
    let pool = sosmap_db::connect_pool(&config.database_url, pool_config).await?;

    let counts = sosmap_db::count_by_category(&pool).await?;
    if counts.is_empty() {
        println!("no facilities stored; run `sosmap-cli sync` first");
        return Ok(());
    }

    let total: i64 = counts.iter().map(|row| row.count).sum();
    for row in &counts {
        println!("{:<16} {:>8}", row.category, row.count);
    }
    println!("{:<16} {total:>8}", "TOTAL");

    Ok(())
}
