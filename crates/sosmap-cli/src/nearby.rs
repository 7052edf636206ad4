//! `nearby` command: rank stored facilities around a coordinate.

use sosmap_core::{
    facility_status, filter_by_radius, filter_open_now, format_distance, sort_by_distance,
    AppConfig, Coord, FacilityCategory, FacilityRecord,
};

pub struct NearbyArgs {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: f64,
    pub category: Option<FacilityCategory>,
    pub open_now: bool,
    pub limit: usize,
}

pub async fn run(config: &AppConfig, args: NearbyArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        (-90.0..=90.0).contains(&args.lat) && (-180.0..=180.0).contains(&args.lng),
        "lat/lng out of range"
    );
    anyhow::ensure!(
        args.radius_km.is_finite() && args.radius_km > 0.0,
        "radius_km must be positive"
    );

    let pool_config = sosmap_db::PoolConfig::from_app_config(config);
    let pool = sosmap_db::connect_pool(&config.database_url, pool_config).await?;

    let rows = sosmap_db::list_facility_pins(&pool, args.category).await?;
    let mut records: Vec<FacilityRecord> = rows
        .into_iter()
        .filter_map(sosmap_db::FacilityRow::into_record)
        .collect();

    let now = chrono::Local::now().naive_local();
    if args.open_now {
        records = filter_open_now(records, now);
    }

    let origin = Coord {
        lat: args.lat,
        lng: args.lng,
    };
    let within = filter_by_radius(records, origin, args.radius_km);
    let ranked = sort_by_distance(within, origin);

    if ranked.is_empty() {
        println!(
            "no facilities within {} of {:.4},{:.4}",
            format_distance(args.radius_km),
            args.lat,
            args.lng
        );
        return Ok(());
    }

    for entry in ranked.iter().take(args.limit) {
        let status = facility_status(&entry.item, now);
        println!(
            "{:>7}  {:<16} {}  [{}]",
            format_distance(entry.distance_km),
            entry.item.category.to_string(),
            entry.item.name,
            status.message,
        );
        if let Some(address) = &entry.item.address {
            println!("         {address}");
        }
    }

    Ok(())
}
