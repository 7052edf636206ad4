//! `sync` command: fetch the public feeds and replace stored snapshots.

use sosmap_core::{AppConfig, FacilityCategory, Region};
use sosmap_nemc::NemcClient;

pub async fn run(config: &AppConfig, category: Option<FacilityCategory>) -> anyhow::Result<()> {
    let pool_config = sosmap_db::PoolConfig::from_app_config(config);
    let pool = sosmap_db::connect_pool(&config.database_url, pool_config).await?;
    sosmap_db::run_migrations(&pool).await?;

    let client = NemcClient::from_app_config(config)?;
    let regions = sync_regions(config);

    let categories: Vec<FacilityCategory> = match category {
        Some(category) => vec![category],
        None => FacilityCategory::all().to_vec(),
    };

    for category in categories {
        let records = sosmap_nemc::fetch_category(&client, category, &regions).await?;
        let fetched = records.len();
        let new_facilities: Vec<sosmap_db::NewFacility> =
            records.into_iter().map(Into::into).collect();
        let stored = sosmap_db::replace_category(&pool, category, &new_facilities).await?;
        println!("{category}: fetched {fetched}, stored {stored}");
    }

    Ok(())
}

fn sync_regions(config: &AppConfig) -> Vec<Option<Region>> {
    match sosmap_core::load_regions(&config.regions_path) {
        Ok(file) => file.regions.into_iter().map(Some).collect(),
        Err(e) => {
            tracing::warn!(
                path = %config.regions_path.display(),
                error = %e,
                "regions file unavailable, syncing nationwide"
            );
            vec![None]
        }
    }
}
