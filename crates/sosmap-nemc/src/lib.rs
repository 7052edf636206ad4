//! Client for the data.go.kr emergency-data services.
//!
//! Covers the NEMC emergency-room, pharmacy, and AED feeds plus the MAFRA
//! animal-hospital feed. Responses arrive as the standard data.go.kr XML
//! envelope; this crate parses them into raw item types and normalizes
//! those into the canonical [`sosmap_core::FacilityRecord`] shape.

mod client;
mod error;
mod normalize;
mod retry;
mod sync;
mod types;
mod xml;

pub use client::NemcClient;
pub use error::NemcError;
pub use normalize::{
    normalize_aeds, normalize_animal_hospitals, normalize_bed_statuses, normalize_hospitals,
    normalize_pharmacies, BedStatus,
};
pub use sync::fetch_category;
pub use types::{RawAedItem, RawAnimalItem, RawBedItem, RawDutyItem};
