//! Normalization of raw feed items into the canonical facility shape.
//!
//! Every feed funnels into [`sosmap_core::FacilityRecord`] here, before
//! persistence or status computation sees the data. Records missing either
//! coordinate are dropped: the app is a map, and an unmappable row serves
//! nothing downstream.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use sosmap_core::{
    DutyHours, DutySlot, FacilityCategory, FacilityRecord, OperatingHours, WeeklyHours,
};

use crate::types::{RawAedItem, RawAnimalItem, RawBedItem, RawDutyItem};

/// Realtime emergency-bed availability for one hospital.
#[derive(Debug, Clone, PartialEq)]
pub struct BedStatus {
    pub hpid: Option<String>,
    pub name: String,
    pub available_beds: Option<i32>,
    pub note: Option<String>,
    pub reported_at: Option<NaiveDateTime>,
}

/// Converts emergency-room data into facility records.
///
/// The realtime bed feed drives the result (it reflects which ERs are
/// actually reporting); the base list contributes address, coordinates,
/// and schedule, joined by `hpid`. Rows whose base entry lacks
/// coordinates are dropped.
#[must_use]
pub fn normalize_hospitals(base: &[RawDutyItem], beds: &[RawBedItem]) -> Vec<FacilityRecord> {
    let base_by_hpid: HashMap<&str, &RawDutyItem> = base
        .iter()
        .filter_map(|item| item.hpid.as_deref().map(|hpid| (hpid, item)))
        .collect();

    beds.iter()
        .filter_map(|bed| {
            let hpid = bed.hpid.as_deref()?;
            let info = base_by_hpid.get(hpid)?;
            let (lat, lng) = (info.wgs84_lat?, info.wgs84_lon?);
            let name = bed
                .duty_name
                .clone()
                .or_else(|| info.duty_name.clone())?;

            Some(FacilityRecord {
                category: FacilityCategory::Emergency,
                external_id: Some(hpid.to_owned()),
                name,
                address: info.duty_addr.clone(),
                phone: info.duty_tel1.clone(),
                emergency_phone: bed.duty_tel3.clone().or_else(|| info.duty_tel3.clone()),
                lat,
                lng,
                is_24h: false,
                hours: duty_hours_from(&info.duty_times).map(OperatingHours::Duty),
                beds_available: bed.hvec,
                note: bed.hv1.clone(),
            })
        })
        .collect()
}

/// Converts pharmacy items into facility records, rewriting the per-index
/// duty tokens into the keyed-by-day weekly map (`"open-close"` per day,
/// day omitted when either token is missing).
#[must_use]
pub fn normalize_pharmacies(items: &[RawDutyItem]) -> Vec<FacilityRecord> {
    items
        .iter()
        .filter_map(|item| {
            let (lat, lng) = (item.wgs84_lat?, item.wgs84_lon?);
            Some(FacilityRecord {
                category: FacilityCategory::Pharmacy,
                external_id: item.hpid.clone(),
                name: item.duty_name.clone()?,
                address: item.duty_addr.clone(),
                phone: item.duty_tel1.clone(),
                emergency_phone: None,
                lat,
                lng,
                is_24h: false,
                hours: weekly_hours_from(&item.duty_times).map(OperatingHours::Weekly),
                beds_available: None,
                note: None,
            })
        })
        .collect()
}

/// Converts AED installations into facility records. AEDs carry no
/// schedule; availability policy lives in the status layer.
#[must_use]
pub fn normalize_aeds(items: &[RawAedItem]) -> Vec<FacilityRecord> {
    items
        .iter()
        .filter_map(|item| {
            let (lat, lng) = (item.wgs84_lat?, item.wgs84_lon?);
            Some(FacilityRecord {
                category: FacilityCategory::Aed,
                external_id: item.serial_seq.clone(),
                name: item.build_place.clone()?,
                address: item.build_address.clone(),
                phone: item.manager_tel.clone(),
                emergency_phone: None,
                lat,
                lng,
                is_24h: false,
                hours: None,
                beds_available: None,
                note: item.model.clone(),
            })
        })
        .collect()
}

/// Converts animal-hospital items into facility records, reconciling the
/// feed's two naming schemes (road address preferred over lot-number).
#[must_use]
pub fn normalize_animal_hospitals(items: &[RawAnimalItem]) -> Vec<FacilityRecord> {
    items
        .iter()
        .filter_map(|item| {
            let lat = item.lat.or(item.wgs84_lat)?;
            let lng = item.lon.or(item.wgs84_lon)?;
            let name = item.bizplc_nm.clone().or_else(|| item.duty_name.clone())?;
            let address = item
                .rdn_whl_addr
                .clone()
                .or_else(|| item.duty_addr.clone())
                .or_else(|| item.locplc_addr.clone());

            Some(FacilityRecord {
                category: FacilityCategory::AnimalHospital,
                external_id: None,
                name,
                address,
                phone: item.telno.clone().or_else(|| item.duty_tel1.clone()),
                emergency_phone: None,
                lat,
                lng,
                is_24h: false,
                hours: None,
                beds_available: None,
                note: None,
            })
        })
        .collect()
}

/// Converts realtime bed items into display-ready bed statuses. Items
/// without a facility name are dropped; everything else is passed through
/// as reported.
#[must_use]
pub fn normalize_bed_statuses(items: &[RawBedItem]) -> Vec<BedStatus> {
    items
        .iter()
        .filter_map(|item| {
            Some(BedStatus {
                hpid: item.hpid.clone(),
                name: item.duty_name.clone()?,
                available_beds: item.hvec,
                note: item.hv1.clone(),
                reported_at: item
                    .hvidate
                    .as_deref()
                    .and_then(|raw| NaiveDateTime::parse_from_str(raw, "%Y%m%d%H%M%S").ok()),
            })
        })
        .collect()
}

fn duty_hours_from(duty_times: &[(Option<String>, Option<String>); 8]) -> Option<DutyHours> {
    let mut hours = DutyHours::default();
    let mut any = false;
    for (slot, (open, close)) in hours.slots.iter_mut().zip(duty_times) {
        if let (Some(open), Some(close)) = (open, close) {
            *slot = Some(DutySlot {
                open: open.clone(),
                close: close.clone(),
            });
            any = true;
        }
    }
    any.then_some(hours)
}

fn weekly_hours_from(duty_times: &[(Option<String>, Option<String>); 8]) -> Option<WeeklyHours> {
    let entry = |index: usize| -> Option<String> {
        let (open, close) = &duty_times[index];
        match (open, close) {
            (Some(open), Some(close)) => Some(format!("{open}-{close}")),
            _ => None,
        }
    };

    let hours = WeeklyHours {
        mon: entry(0),
        tue: entry(1),
        wed: entry(2),
        thu: entry(3),
        fri: entry(4),
        sat: entry(5),
        sun: entry(6),
        hol: entry(7),
    };

    (hours != WeeklyHours::default()).then_some(hours)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duty_item(hpid: &str, name: &str, lat: Option<f64>, lng: Option<f64>) -> RawDutyItem {
        RawDutyItem {
            hpid: Some(hpid.to_owned()),
            duty_name: Some(name.to_owned()),
            duty_addr: Some("1 Sejong-daero".to_owned()),
            duty_tel1: Some("02-120".to_owned()),
            wgs84_lat: lat,
            wgs84_lon: lng,
            ..RawDutyItem::default()
        }
    }

    #[test]
    fn pharmacy_duty_tokens_become_weekly_map() {
        let mut item = duty_item("C1100001", "Central Pharmacy", Some(37.5665), Some(126.9780));
        item.duty_times[0] = (Some("0900".to_owned()), Some("1800".to_owned()));
        item.duty_times[5] = (Some("0900".to_owned()), Some("1300".to_owned()));
        item.duty_times[7] = (Some("1000".to_owned()), Some("1400".to_owned()));
        // Tuesday has an open token but no close token: the day is omitted.
        item.duty_times[1] = (Some("0900".to_owned()), None);

        let records = normalize_pharmacies(&[item]);
        assert_eq!(records.len(), 1);

        let Some(OperatingHours::Weekly(weekly)) = &records[0].hours else {
            panic!("expected weekly hours");
        };
        assert_eq!(weekly.mon.as_deref(), Some("0900-1800"));
        assert_eq!(weekly.sat.as_deref(), Some("0900-1300"));
        assert_eq!(weekly.hol.as_deref(), Some("1000-1400"));
        assert!(weekly.tue.is_none());
        assert!(weekly.sun.is_none());
    }

    #[test]
    fn pharmacy_without_any_tokens_has_no_hours() {
        let item = duty_item("C1100002", "Bare Pharmacy", Some(37.0), Some(127.0));
        let records = normalize_pharmacies(&[item]);
        assert!(records[0].hours.is_none());
    }

    #[test]
    fn coordinate_less_records_are_dropped() {
        let with = duty_item("C1", "Mapped", Some(37.0), Some(127.0));
        let without = duty_item("C2", "Unmapped", None, Some(127.0));
        let records = normalize_pharmacies(&[with, without]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Mapped");
    }

    #[test]
    fn hospitals_join_beds_to_base_info_by_hpid() {
        let mut base = duty_item("A1100001", "City Hospital", Some(37.5665), Some(126.9780));
        base.duty_tel3 = Some("02-120-0001".to_owned());
        base.duty_times[0] = (Some("0000".to_owned()), Some("2400".to_owned()));

        let bed = RawBedItem {
            hpid: Some("A1100001".to_owned()),
            duty_name: Some("City Hospital ER".to_owned()),
            hvec: Some(7),
            hv1: Some("trauma team on call".to_owned()),
            ..RawBedItem::default()
        };
        let orphan = RawBedItem {
            hpid: Some("A9999999".to_owned()),
            duty_name: Some("Unknown ER".to_owned()),
            ..RawBedItem::default()
        };

        let records = normalize_hospitals(&[base], &[bed, orphan]);
        assert_eq!(records.len(), 1, "orphan bed rows have no coordinates");

        let record = &records[0];
        assert_eq!(record.category, FacilityCategory::Emergency);
        assert_eq!(record.external_id.as_deref(), Some("A1100001"));
        assert_eq!(record.name, "City Hospital ER");
        assert_eq!(record.beds_available, Some(7));
        assert_eq!(record.note.as_deref(), Some("trauma team on call"));
        assert_eq!(record.emergency_phone.as_deref(), Some("02-120-0001"));
        assert!(matches!(record.hours, Some(OperatingHours::Duty(_))));
    }

    #[test]
    fn aed_model_is_kept_as_note() {
        let item = RawAedItem {
            serial_seq: Some("12345".to_owned()),
            build_place: Some("Station concourse".to_owned()),
            build_address: Some("3 Station-ro".to_owned()),
            model: Some("HeartStart".to_owned()),
            manager_tel: Some("02-000-0000".to_owned()),
            wgs84_lat: Some(37.55),
            wgs84_lon: Some(126.97),
        };
        let records = normalize_aeds(&[item]);
        assert_eq!(records[0].category, FacilityCategory::Aed);
        assert_eq!(records[0].name, "Station concourse");
        assert_eq!(records[0].note.as_deref(), Some("HeartStart"));
        assert!(records[0].hours.is_none());
    }

    #[test]
    fn animal_hospitals_reconcile_field_schemes() {
        let mafra = RawAnimalItem {
            bizplc_nm: Some("Happy Paws Clinic".to_owned()),
            rdn_whl_addr: Some("2 Teheran-ro".to_owned()),
            telno: Some("02-111-1111".to_owned()),
            lat: Some(37.50),
            lon: Some(127.03),
            ..RawAnimalItem::default()
        };
        let nemc_shaped = RawAnimalItem {
            duty_name: Some("Vet Center".to_owned()),
            duty_addr: Some("4 Mapo-daero".to_owned()),
            duty_tel1: Some("02-222-2222".to_owned()),
            wgs84_lat: Some(37.54),
            wgs84_lon: Some(126.94),
            ..RawAnimalItem::default()
        };

        let records = normalize_animal_hospitals(&[mafra, nemc_shaped]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Happy Paws Clinic");
        assert_eq!(records[0].address.as_deref(), Some("2 Teheran-ro"));
        assert_eq!(records[1].name, "Vet Center");
        assert_eq!(records[1].phone.as_deref(), Some("02-222-2222"));
    }

    #[test]
    fn bed_status_parses_report_timestamp() {
        let item = RawBedItem {
            hpid: Some("A1".to_owned()),
            duty_name: Some("City Hospital".to_owned()),
            hvec: Some(3),
            hvidate: Some("20250601233000".to_owned()),
            ..RawBedItem::default()
        };
        let statuses = normalize_bed_statuses(&[item]);
        let reported = statuses[0].reported_at.expect("timestamp");
        assert_eq!(reported.format("%Y-%m-%d %H:%M").to_string(), "2025-06-01 23:30");
    }

    #[test]
    fn bed_status_tolerates_bad_timestamp() {
        let item = RawBedItem {
            duty_name: Some("City Hospital".to_owned()),
            hvidate: Some("not-a-date".to_owned()),
            ..RawBedItem::default()
        };
        let statuses = normalize_bed_statuses(&[item]);
        assert!(statuses[0].reported_at.is_none());
    }
}
