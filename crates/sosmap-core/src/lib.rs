use thiserror::Error;

pub mod app_config;
mod config;
pub mod facility;
pub mod geo;
pub mod hours;
pub mod regions;
pub mod status;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use facility::{FacilityCategory, FacilityRecord};
pub use geo::{
    filter_by_radius, format_distance, haversine_km, sort_by_distance, Coord, Located,
    LocationError, LocationProvider, LocationRequest, Ranked,
};
pub use hours::{
    format_time_token, parse_time_token, DutyHours, DutySlot, OperatingHours, WeeklyHours,
};
pub use regions::{load_regions, Region, RegionsFile};
pub use status::{
    animal_hospital_status, facility_status, filter_open_now, BusinessStatus, StatusKind,
};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid facility category: {0}")]
    InvalidCategory(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read regions file {path}: {source}")]
    RegionsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse regions file: {0}")]
    RegionsFileParse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}
