//! Raw feed item types.
//!
//! Each struct mirrors one feed's `<item>` element, field names included,
//! with everything optional since the portal omits elements freely. Typed
//! extraction from the flat tag map lives here; interpretation (fallback
//! chains, coordinate requirements) lives in `normalize`.

use std::collections::BTreeMap;

/// An `<item>` from the emergency-room or pharmacy list feeds
/// (`getEgytListInfoInqire` / `getParmacyListInfoInqire`).
#[derive(Debug, Clone, Default)]
pub struct RawDutyItem {
    pub hpid: Option<String>,
    pub duty_name: Option<String>,
    pub duty_addr: Option<String>,
    pub duty_tel1: Option<String>,
    /// Direct emergency-room line.
    pub duty_tel3: Option<String>,
    pub wgs84_lat: Option<f64>,
    pub wgs84_lon: Option<f64>,
    /// `dutyTime{n}s`/`dutyTime{n}c` open/close pairs, n = 1..=8
    /// (Monday..Sunday, then holiday).
    pub duty_times: [(Option<String>, Option<String>); 8],
}

impl RawDutyItem {
    pub(crate) fn from_fields(fields: &BTreeMap<String, String>) -> Self {
        let mut duty_times: [(Option<String>, Option<String>); 8] = Default::default();
        for (slot, pair) in duty_times.iter_mut().enumerate() {
            let n = slot + 1;
            pair.0 = fields.get(&format!("dutyTime{n}s")).cloned();
            pair.1 = fields.get(&format!("dutyTime{n}c")).cloned();
        }

        Self {
            hpid: fields.get("hpid").cloned(),
            duty_name: fields.get("dutyName").cloned(),
            duty_addr: fields.get("dutyAddr").cloned(),
            duty_tel1: fields.get("dutyTel1").cloned(),
            duty_tel3: fields.get("dutyTel3").cloned(),
            wgs84_lat: parse_f64(fields.get("wgs84Lat")),
            wgs84_lon: parse_f64(fields.get("wgs84Lon")),
            duty_times,
        }
    }
}

/// An `<item>` from the realtime emergency-bed feed
/// (`getEmrrmRltmUsefulSckbdInfoInqire`).
#[derive(Debug, Clone, Default)]
pub struct RawBedItem {
    pub hpid: Option<String>,
    pub duty_name: Option<String>,
    pub duty_tel3: Option<String>,
    /// Available general emergency beds (`hvec`).
    pub hvec: Option<i32>,
    /// Free-text situation message (`hv1`).
    pub hv1: Option<String>,
    /// Report timestamp, `YYYYMMDDHHMMSS` (`hvidate`).
    pub hvidate: Option<String>,
}

impl RawBedItem {
    pub(crate) fn from_fields(fields: &BTreeMap<String, String>) -> Self {
        Self {
            hpid: fields.get("hpid").cloned(),
            duty_name: fields.get("dutyName").cloned(),
            duty_tel3: fields.get("dutyTel3").cloned(),
            hvec: parse_i32(fields.get("hvec")),
            hv1: fields.get("hv1").cloned(),
            hvidate: fields.get("hvidate").cloned(),
        }
    }
}

/// An `<item>` from the AED location feed (`getAedLcinfoInqire`).
#[derive(Debug, Clone, Default)]
pub struct RawAedItem {
    pub serial_seq: Option<String>,
    pub build_place: Option<String>,
    pub build_address: Option<String>,
    pub model: Option<String>,
    pub manager_tel: Option<String>,
    pub wgs84_lat: Option<f64>,
    pub wgs84_lon: Option<f64>,
}

impl RawAedItem {
    pub(crate) fn from_fields(fields: &BTreeMap<String, String>) -> Self {
        Self {
            serial_seq: fields.get("serialSeq").cloned(),
            build_place: fields.get("buildPlace").cloned(),
            build_address: fields.get("buildAddress").cloned(),
            model: fields.get("model").cloned(),
            manager_tel: fields.get("managerTel").cloned(),
            wgs84_lat: parse_f64(fields.get("wgs84Lat")),
            wgs84_lon: parse_f64(fields.get("wgs84Lon")),
        }
    }
}

/// An `<item>` from the MAFRA animal-hospital feed (`animalHosptlInfo`).
///
/// This feed uses different element names from the NEMC services and has
/// shipped more than one naming scheme, so both sets are captured and
/// reconciled during normalization.
#[derive(Debug, Clone, Default)]
pub struct RawAnimalItem {
    pub bizplc_nm: Option<String>,
    pub duty_name: Option<String>,
    /// Road address.
    pub rdn_whl_addr: Option<String>,
    pub duty_addr: Option<String>,
    /// Lot-number address.
    pub locplc_addr: Option<String>,
    pub telno: Option<String>,
    pub duty_tel1: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub wgs84_lat: Option<f64>,
    pub wgs84_lon: Option<f64>,
}

impl RawAnimalItem {
    pub(crate) fn from_fields(fields: &BTreeMap<String, String>) -> Self {
        Self {
            bizplc_nm: fields.get("bizplcNm").cloned(),
            duty_name: fields.get("dutyName").cloned(),
            rdn_whl_addr: fields.get("rdnWhlAddr").cloned(),
            duty_addr: fields.get("dutyAddr").cloned(),
            locplc_addr: fields.get("locplcAddr").cloned(),
            telno: fields.get("telno").cloned(),
            duty_tel1: fields.get("dutyTel1").cloned(),
            lat: parse_f64(fields.get("lat")),
            lon: parse_f64(fields.get("lon")),
            wgs84_lat: parse_f64(fields.get("wgs84Lat")),
            wgs84_lon: parse_f64(fields.get("wgs84Lon")),
        }
    }
}

fn parse_f64(value: Option<&String>) -> Option<f64> {
    value.and_then(|v| v.trim().parse().ok())
}

fn parse_i32(value: Option<&String>) -> Option<i32> {
    value.and_then(|v| v.trim().parse().ok())
}
