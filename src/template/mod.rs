//! # Template Descriptor
//!
//! The user-configurable document template ("šablona"): theme colors, fonts,
//! which sections, table columns and cover blocks appear and in what order,
//! plus header/footer flags and the signatures placement.
//!
//! Templates are stored by the application as JSON with Czech keys. Saved
//! templates predate newer options, so every field has an explicit default
//! here and nowhere else. Section, column and block lists are merged with the
//! canonical catalogues below by [`ordering`].

pub mod ordering;

use serde::{Deserialize, Serialize};

use crate::style::Theme;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateDescriptor {
    #[serde(rename = "nazev")]
    pub name: String,

    // ── Theme ──────────────────────────────────────────────────
    #[serde(rename = "barvaPrimarni")]
    pub primary_color: String,
    #[serde(rename = "barvaSekundarni")]
    pub secondary_color: String,
    #[serde(rename = "velikostPisma")]
    pub font_size: f64,
    #[serde(rename = "pismo")]
    pub font_family: String,

    // ── Structure ──────────────────────────────────────────────
    #[serde(rename = "sekce")]
    pub sections: Vec<SectionConfig>,
    #[serde(rename = "sloupceOkruhu")]
    pub circuit_columns: Vec<ColumnConfig>,
    #[serde(rename = "sloupceZarizeni")]
    pub device_columns: Vec<ColumnConfig>,

    // ── Cover page ─────────────────────────────────────────────
    #[serde(rename = "uvodniStranaZobrazit")]
    pub show_cover: bool,
    #[serde(rename = "uvodniStranaZobrazitFirmu")]
    pub cover_show_company: bool,
    #[serde(rename = "uvodniStranaZobrazitTechnika")]
    pub cover_show_technician: bool,
    #[serde(rename = "uvodniStranaZobrazitZakaznika")]
    pub cover_show_customer: bool,
    #[serde(rename = "uvodniStranaZobrazitObjekt")]
    pub cover_show_object: bool,
    #[serde(rename = "uvodniStranaZobrazitVysledek")]
    pub cover_show_result: bool,
    #[serde(rename = "uvodniStranaZobrazitPodpisy")]
    pub cover_show_signatures: bool,
    /// Cover title; may contain `{{path}}` variables.
    #[serde(rename = "uvodniStranaNadpis")]
    pub cover_title: String,
    #[serde(rename = "uvodniStranaNadpisVelikost")]
    pub cover_title_size: f64,
    #[serde(rename = "uvodniStranaNadpisRamecek")]
    pub cover_title_border: bool,
    #[serde(rename = "uvodniStranaBloky")]
    pub cover_blocks: Vec<BlockConfig>,

    // ── Header / footer ────────────────────────────────────────
    #[serde(rename = "zahlaviZobrazit")]
    pub show_header: bool,
    #[serde(rename = "zapatiCisloStranky")]
    pub footer_page_number: bool,
    #[serde(rename = "zapatiDatumTisku")]
    pub footer_print_date: bool,
    /// Free footer text; may contain `{{path}}` variables.
    #[serde(rename = "zapatiVlastniText")]
    pub footer_custom_text: String,

    #[serde(rename = "podpisyUmisteni")]
    pub signature_placement: SignaturePlacement,
}

impl Default for TemplateDescriptor {
    fn default() -> Self {
        Self {
            name: "Výchozí šablona".to_string(),
            primary_color: "#1e40af".to_string(),
            secondary_color: "#64748b".to_string(),
            font_size: 10.0,
            font_family: "Helvetica".to_string(),
            sections: Vec::new(),
            circuit_columns: Vec::new(),
            device_columns: Vec::new(),
            show_cover: true,
            cover_show_company: true,
            cover_show_technician: true,
            cover_show_customer: true,
            cover_show_object: true,
            cover_show_result: true,
            cover_show_signatures: true,
            cover_title: "ZPRÁVA O REVIZI ELEKTRICKÉ INSTALACE".to_string(),
            cover_title_size: 20.0,
            cover_title_border: true,
            cover_blocks: Vec::new(),
            show_header: true,
            footer_page_number: true,
            footer_print_date: true,
            footer_custom_text: String::new(),
            signature_placement: SignaturePlacement::Cover,
        }
    }
}

impl TemplateDescriptor {
    pub fn theme(&self) -> Theme {
        Theme::new(
            &self.primary_color,
            &self.secondary_color,
            &self.font_family,
            self.font_size,
        )
    }
}

/// Where the signatures block goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignaturePlacement {
    /// Bottom of the cover page.
    #[default]
    #[serde(rename = "uvodni")]
    Cover,
    /// Bottom of the last body page, before any appendix.
    #[serde(rename = "posledni")]
    LastPage,
}

/// One section entry as stored in a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionConfig {
    pub id: String,
    pub display_name: Option<String>,
    pub enabled: Option<bool>,
    pub order: Option<i64>,
}

/// One table column entry as stored in a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnConfig {
    pub id: String,
    pub label: Option<String>,
    pub enabled: Option<bool>,
    pub order: Option<i64>,
    /// Explicit width in points. Columns without one share what's left.
    pub width: Option<f64>,
}

/// One cover block entry as stored in a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockConfig {
    pub id: String,
    pub enabled: Option<bool>,
    pub order: Option<i64>,
}

// ── Catalogues ─────────────────────────────────────────────────

/// Every section the engine can render, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionId {
    Identity,
    Object,
    Scope,
    ProtectiveMeasures,
    PriorInspections,
    PerformedActions,
    Panels,
    Rooms,
    Instruments,
    Conclusion,
    Defects,
}

impl SectionId {
    pub const CANONICAL: [SectionId; 11] = [
        SectionId::Identity,
        SectionId::Object,
        SectionId::Scope,
        SectionId::ProtectiveMeasures,
        SectionId::PriorInspections,
        SectionId::PerformedActions,
        SectionId::Panels,
        SectionId::Rooms,
        SectionId::Instruments,
        SectionId::Conclusion,
        SectionId::Defects,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SectionId::Identity => "identifikace",
            SectionId::Object => "objekt",
            SectionId::Scope => "rozsah",
            SectionId::ProtectiveMeasures => "ochranna_opatreni",
            SectionId::PriorInspections => "predchozi_revize",
            SectionId::PerformedActions => "provedene_ukony",
            SectionId::Panels => "rozvadece",
            SectionId::Rooms => "mistnosti",
            SectionId::Instruments => "pristroje",
            SectionId::Conclusion => "zaver",
            SectionId::Defects => "zavady",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::CANONICAL.into_iter().find(|s| s.key() == key)
    }

    pub fn default_title(&self) -> &'static str {
        match self {
            SectionId::Identity => "Identifikační údaje",
            SectionId::Object => "Údaje o objektu",
            SectionId::Scope => "Rozsah revize",
            SectionId::ProtectiveMeasures => "Ochranná opatření",
            SectionId::PriorInspections => "Vyhodnocení předchozích revizí",
            SectionId::PerformedActions => "Soupis provedených úkonů",
            SectionId::Panels => "Rozvaděče a měření okruhů",
            SectionId::Rooms => "Místnosti a spotřebiče",
            SectionId::Instruments => "Použité měřicí přístroje",
            SectionId::Conclusion => "Závěr",
            SectionId::Defects => "Fotodokumentace závad",
        }
    }

    /// Appendix sections render after the body, on landscape pages.
    pub fn is_appendix(&self) -> bool {
        matches!(self, SectionId::Defects)
    }
}

/// Columns of the per-panel circuit table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitColumn {
    Number,
    Name,
    Breaker,
    Phases,
    Conductor,
    InsulationResistance,
    LoopImpedance,
    Rcd,
    TripTime,
    Note,
}

impl CircuitColumn {
    pub const CANONICAL: [CircuitColumn; 10] = [
        CircuitColumn::Number,
        CircuitColumn::Name,
        CircuitColumn::Breaker,
        CircuitColumn::Phases,
        CircuitColumn::Conductor,
        CircuitColumn::InsulationResistance,
        CircuitColumn::LoopImpedance,
        CircuitColumn::Rcd,
        CircuitColumn::TripTime,
        CircuitColumn::Note,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            CircuitColumn::Number => "cislo",
            CircuitColumn::Name => "nazev",
            CircuitColumn::Breaker => "jistic",
            CircuitColumn::Phases => "faze",
            CircuitColumn::Conductor => "vodic",
            CircuitColumn::InsulationResistance => "izolacniOdpor",
            CircuitColumn::LoopImpedance => "impedance",
            CircuitColumn::Rcd => "proudovyChranic",
            CircuitColumn::TripTime => "vybavovaciCas",
            CircuitColumn::Note => "poznamka",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::CANONICAL.into_iter().find(|c| c.key() == key)
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            CircuitColumn::Number => "Č.",
            CircuitColumn::Name => "Okruh",
            CircuitColumn::Breaker => "Jistič",
            CircuitColumn::Phases => "Fáze",
            CircuitColumn::Conductor => "Vodič",
            CircuitColumn::InsulationResistance => "Izol. odpor",
            CircuitColumn::LoopImpedance => "Impedance",
            CircuitColumn::Rcd => "Chránič",
            CircuitColumn::TripTime => "Vyp. čas",
            CircuitColumn::Note => "Poznámka",
        }
    }

    pub fn enabled_by_default(&self) -> bool {
        !matches!(self, CircuitColumn::Note)
    }
}

/// Columns of the per-room device table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceColumn {
    Name,
    Quantity,
    ProtectionClass,
    Power,
    TouchProtection,
    Status,
}

impl DeviceColumn {
    pub const CANONICAL: [DeviceColumn; 6] = [
        DeviceColumn::Name,
        DeviceColumn::Quantity,
        DeviceColumn::ProtectionClass,
        DeviceColumn::Power,
        DeviceColumn::TouchProtection,
        DeviceColumn::Status,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            DeviceColumn::Name => "nazev",
            DeviceColumn::Quantity => "pocet",
            DeviceColumn::ProtectionClass => "trida",
            DeviceColumn::Power => "prikon",
            DeviceColumn::TouchProtection => "ochrana",
            DeviceColumn::Status => "stav",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::CANONICAL.into_iter().find(|c| c.key() == key)
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            DeviceColumn::Name => "Zařízení",
            DeviceColumn::Quantity => "Ks",
            DeviceColumn::ProtectionClass => "Třída",
            DeviceColumn::Power => "Příkon",
            DeviceColumn::TouchProtection => "Ochrana",
            DeviceColumn::Status => "Stav",
        }
    }
}

/// Blocks of the cover page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoverBlock {
    Identity,
    Title,
    Customer,
    Object,
    Result,
    Signatures,
}

impl CoverBlock {
    pub const CANONICAL: [CoverBlock; 6] = [
        CoverBlock::Identity,
        CoverBlock::Title,
        CoverBlock::Customer,
        CoverBlock::Object,
        CoverBlock::Result,
        CoverBlock::Signatures,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            CoverBlock::Identity => "identita",
            CoverBlock::Title => "nadpis",
            CoverBlock::Customer => "zakaznik",
            CoverBlock::Object => "objekt",
            CoverBlock::Result => "vysledek",
            CoverBlock::Signatures => "podpisy",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::CANONICAL.into_iter().find(|b| b.key() == key)
    }
}
