//! # Inspection Data Model
//!
//! The input representation for the report engine: one fully loaded
//! inspection with everything hanging off it (panels and their circuits,
//! rooms and their devices, defects with photos, instruments, and the
//! company/technician/customer identities).
//!
//! The engine never mutates any of this. It receives an immutable snapshot,
//! already fetched and denormalized by the caller, and performs no I/O.

pub mod page;

pub use page::{Edges, Orientation, PageConfig, PageSize};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::image_loader::ImageSource;

/// One inspection with its complete data graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InspectionRecord {
    // ── Identity ───────────────────────────────────────────────
    /// Inspection report number, e.g. "R-2024-017".
    pub number: String,
    pub title: String,
    /// Address of the inspected site.
    pub site_address: String,
    /// Description of the inspected object (building, hall, line…).
    pub object_description: String,
    /// The ordering party as free text, used when no structured customer is attached.
    pub client: String,

    // ── Dates ──────────────────────────────────────────────────
    #[serde(with = "lenient_date")]
    pub performed_on: Option<NaiveDate>,
    #[serde(with = "lenient_date")]
    pub completed_on: Option<NaiveDate>,
    #[serde(with = "lenient_date")]
    pub drafted_on: Option<NaiveDate>,
    #[serde(with = "lenient_date")]
    pub valid_until: Option<NaiveDate>,

    // ── Classification ─────────────────────────────────────────
    pub kind: InspectionKind,
    pub category: InspectionCategory,
    pub result: InspectionResult,

    // ── Narrative ──────────────────────────────────────────────
    pub scope: String,
    pub scope_excluded: String,
    pub voltage_system: String,
    /// Selected protective measures (checklist items).
    pub protective_measures: Vec<String>,
    pub prior_findings: String,
    pub performed_actions: String,
    pub conclusion: String,
    pub non_compliance_reason: String,

    // ── Children ───────────────────────────────────────────────
    pub panels: Vec<Panel>,
    pub rooms: Vec<Room>,
    pub defects: Vec<Defect>,
    pub instruments: Vec<Instrument>,

    // ── Parties ────────────────────────────────────────────────
    pub customer: Option<Customer>,
    pub company: Option<Company>,
    pub technician: Option<Technician>,
}

impl InspectionRecord {
    pub fn circuit_count(&self) -> usize {
        self.panels.iter().map(|p| p.circuits.len()).sum()
    }

    pub fn device_count(&self) -> usize {
        self.rooms.iter().map(|r| r.devices.len()).sum()
    }

    pub fn defect_count(&self, severity: Severity) -> usize {
        self.defects
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Human-readable location of a defect (panel or room name), if any.
    pub fn defect_location(&self, defect: &Defect) -> Option<String> {
        if let Some(id) = defect.panel_id {
            if let Some(panel) = self.panels.iter().find(|p| p.id == Some(id)) {
                return Some(format!("Rozvaděč {}", panel.name));
            }
        }
        if let Some(id) = defect.room_id {
            if let Some(room) = self.rooms.iter().find(|r| r.id == Some(id)) {
                return Some(format!("Místnost {}", room.name));
            }
        }
        None
    }
}

/// An electrical distribution board.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Panel {
    pub id: Option<i64>,
    pub name: String,
    pub location: String,
    pub panel_type: String,
    pub circuits: Vec<Circuit>,
}

/// One protected circuit with its measured values.
///
/// `number` is kept as text: duplicates, gaps and values like "3a" occur in
/// real data and are rendered as entered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Circuit {
    #[serde(deserialize_with = "string_or_number")]
    pub number: String,
    pub name: String,
    pub breaker_type: String,
    /// Breaker rating in amperes.
    pub breaker_rating: Option<f64>,
    pub phases: Option<u8>,
    pub conductor: String,
    /// Insulation resistance in MΩ.
    pub insulation_resistance: Option<f64>,
    /// Loop impedance in Ω.
    pub loop_impedance: Option<f64>,
    /// RCD rated residual current in mA.
    pub rcd_rating: Option<f64>,
    /// RCD trip time in ms.
    pub trip_time: Option<f64>,
    pub note: String,
}

/// A room or space inspected for appliances.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Room {
    pub id: Option<i64>,
    pub name: String,
    pub floor: String,
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Device {
    pub name: String,
    pub quantity: u32,
    pub protection_class: Option<ProtectionClass>,
    /// Power draw in watts.
    pub power: Option<f64>,
    /// Measured touch-protection value (protective conductor resistance, Ω).
    pub touch_protection: Option<f64>,
    pub status: String,
}

impl Default for Device {
    fn default() -> Self {
        Self {
            name: String::new(),
            quantity: 1,
            protection_class: None,
            power: None,
            touch_protection: None,
            status: String::new(),
        }
    }
}

/// A non-compliance finding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Defect {
    pub description: String,
    pub severity: Severity,
    pub status: DefectStatus,
    pub remedy: String,
    #[serde(with = "lenient_date")]
    pub found_on: Option<NaiveDate>,
    #[serde(with = "lenient_date")]
    pub deadline: Option<NaiveDate>,
    pub panel_id: Option<i64>,
    pub room_id: Option<i64>,
    pub photos: Vec<Photo>,
}

/// A photo attached to a defect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub image: ImageSource,
    #[serde(default)]
    pub caption: Option<String>,
}

/// A measuring instrument used during the inspection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Instrument {
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    #[serde(with = "lenient_date")]
    pub calibrated_on: Option<NaiveDate>,
    #[serde(with = "lenient_date")]
    pub calibration_valid_until: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    pub name: String,
    pub ico: String,
    pub address: String,
    pub contact_person: String,
    pub phone: String,
    pub email: String,
}

/// The inspecting company.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Company {
    pub name: String,
    pub ico: String,
    pub dic: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub logo: Option<ImageSource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Technician {
    pub name: String,
    pub license_number: String,
    pub phone: String,
    pub email: String,
}

// ── Enums ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionKind {
    #[default]
    #[serde(alias = "pravidelna")]
    Periodic,
    #[serde(alias = "vychozi")]
    Initial,
    #[serde(alias = "mimoradna")]
    Extraordinary,
}

impl InspectionKind {
    pub fn label(&self) -> &'static str {
        match self {
            InspectionKind::Periodic => "Pravidelná",
            InspectionKind::Initial => "Výchozí",
            InspectionKind::Extraordinary => "Mimořádná",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionCategory {
    #[default]
    #[serde(alias = "elektro")]
    Electrical,
    #[serde(alias = "hromosvod")]
    LightningProtection,
    #[serde(alias = "stroje")]
    Machinery,
}

impl InspectionCategory {
    pub fn label(&self) -> &'static str {
        match self {
            InspectionCategory::Electrical => "Elektrická instalace",
            InspectionCategory::LightningProtection => "Ochrana před bleskem",
            InspectionCategory::Machinery => "Elektrická zařízení strojů",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionResult {
    #[serde(alias = "vyhovuje")]
    Compliant,
    #[serde(alias = "nevyhovuje")]
    NonCompliant,
    #[serde(alias = "podminecne")]
    ConditionallyCompliant,
    #[default]
    #[serde(alias = "nevyplneno")]
    Unset,
}

impl InspectionResult {
    pub fn label(&self) -> &'static str {
        match self {
            InspectionResult::Compliant => "Elektrická instalace JE schopna bezpečného provozu",
            InspectionResult::NonCompliant => "Elektrická instalace NENÍ schopna bezpečného provozu",
            InspectionResult::ConditionallyCompliant => {
                "Elektrická instalace je schopna bezpečného provozu s výhradou"
            }
            InspectionResult::Unset => "Výsledek revize nebyl stanoven",
        }
    }

    pub fn short_label(&self) -> &'static str {
        match self {
            InspectionResult::Compliant => "Vyhovuje",
            InspectionResult::NonCompliant => "Nevyhovuje",
            InspectionResult::ConditionallyCompliant => "Vyhovuje s výhradou",
            InspectionResult::Unset => "-",
        }
    }
}

/// Defect severity, C1 being the most serious.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    C1,
    C2,
    #[default]
    C3,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::C1 => "C1 - kritická",
            Severity::C2 => "C2 - závažná",
            Severity::C3 => "C3 - menší",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectStatus {
    #[default]
    #[serde(alias = "otevrena")]
    Open,
    #[serde(alias = "v_reseni")]
    InProgress,
    #[serde(alias = "vyresena")]
    Resolved,
}

impl DefectStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DefectStatus::Open => "Otevřená",
            DefectStatus::InProgress => "V řešení",
            DefectStatus::Resolved => "Vyřešená",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtectionClass {
    I,
    II,
    III,
}

impl ProtectionClass {
    pub fn label(&self) -> &'static str {
        match self {
            ProtectionClass::I => "I",
            ProtectionClass::II => "II",
            ProtectionClass::III => "III",
        }
    }
}

// ── Serde helpers ──────────────────────────────────────────────

/// Accepts a JSON string or number for text fields such as circuit numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Dates arrive as `YYYY-MM-DD`, full ISO timestamps, empty strings or null.
/// Anything unparseable is treated as unset.
pub(crate) mod lenient_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.and_then(|s| parse(&s)))
    }

    pub fn parse(s: &str) -> Option<NaiveDate> {
        let s = s.trim();
        let head = s.get(..10).unwrap_or(s);
        match NaiveDate::parse_from_str(head, "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(_) => {
                if !s.is_empty() {
                    log::warn!("Ignoring unparseable date '{}'", s);
                }
                None
            }
        }
    }
}
