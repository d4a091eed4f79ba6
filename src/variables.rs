//! # Variable Resolution
//!
//! Resolves dotted references such as `revize.cisloRevize` or `firma.nazev`
//! against the inspection data graph, and interpolates `{{path}}` occurrences
//! in template-provided text.
//!
//! Paths are parsed into a closed set of namespace/field variants. A path
//! that doesn't parse, or points into a party the record doesn't have, is
//! not an error: it renders as `[path]` so a broken template is visible in
//! the output.
//!
//! `currentPage` and `totalPages` are unknown until pagination has finished.
//! They resolve to deferred markers which the overlay pass substitutes.

use chrono::NaiveDate;

use crate::model::{InspectionRecord, Severity};

pub const CURRENT_PAGE_MARKER: &str = "{{currentPage}}";
pub const TOTAL_PAGES_MARKER: &str = "{{totalPages}}";

/// Rendered for unset values.
pub const DASH: &str = "-";

/// Everything a path may resolve against.
#[derive(Debug, Clone, Copy)]
pub struct VariableContext<'a> {
    pub record: &'a InspectionRecord,
    pub today: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
    Revize(RevizeField),
    Firma(FirmaField),
    Technik(TechnikField),
    Zakaznik(ZakaznikField),
    Stats(StatsField),
    Today,
    CurrentPage,
    TotalPages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevizeField {
    CisloRevize,
    Nazev,
    Adresa,
    Objekt,
    TypRevize,
    Kategorie,
    Vysledek,
    Datum,
    DatumDokonceni,
    DatumVypracovani,
    PlatnostDo,
    Rozsah,
    PredmetNeni,
    NapetovaSoustava,
    Zaver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirmaField {
    Nazev,
    Ico,
    Dic,
    Adresa,
    Telefon,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechnikField {
    Jmeno,
    CisloOpravneni,
    Telefon,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZakaznikField {
    Nazev,
    Ico,
    Adresa,
    KontaktniOsoba,
    Telefon,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsField {
    PocetRozvadecu,
    PocetOkruhu,
    PocetMistnosti,
    PocetZarizeni,
    PocetZavad,
    PocetZavadC1,
    PocetZavadC2,
    PocetZavadC3,
    PocetPristroju,
}

impl Variable {
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim();
        match path {
            "today" => return Some(Variable::Today),
            "currentPage" => return Some(Variable::CurrentPage),
            "totalPages" => return Some(Variable::TotalPages),
            _ => {}
        }
        let (namespace, field) = path.split_once('.')?;
        Some(match namespace {
            "revize" => Variable::Revize(match field {
                "cisloRevize" => RevizeField::CisloRevize,
                "nazev" => RevizeField::Nazev,
                "adresa" => RevizeField::Adresa,
                "objekt" => RevizeField::Objekt,
                "typRevize" => RevizeField::TypRevize,
                "kategorie" => RevizeField::Kategorie,
                "vysledek" => RevizeField::Vysledek,
                "datum" => RevizeField::Datum,
                "datumDokonceni" => RevizeField::DatumDokonceni,
                "datumVypracovani" => RevizeField::DatumVypracovani,
                "platnostDo" => RevizeField::PlatnostDo,
                "rozsah" => RevizeField::Rozsah,
                "predmetNeni" => RevizeField::PredmetNeni,
                "napetovaSoustava" => RevizeField::NapetovaSoustava,
                "zaver" => RevizeField::Zaver,
                _ => return None,
            }),
            "firma" => Variable::Firma(match field {
                "nazev" => FirmaField::Nazev,
                "ico" => FirmaField::Ico,
                "dic" => FirmaField::Dic,
                "adresa" => FirmaField::Adresa,
                "telefon" => FirmaField::Telefon,
                "email" => FirmaField::Email,
                _ => return None,
            }),
            "technik" => Variable::Technik(match field {
                "jmeno" => TechnikField::Jmeno,
                "cisloOpravneni" => TechnikField::CisloOpravneni,
                "telefon" => TechnikField::Telefon,
                "email" => TechnikField::Email,
                _ => return None,
            }),
            "zakaznik" => Variable::Zakaznik(match field {
                "nazev" => ZakaznikField::Nazev,
                "ico" => ZakaznikField::Ico,
                "adresa" => ZakaznikField::Adresa,
                "kontaktniOsoba" => ZakaznikField::KontaktniOsoba,
                "telefon" => ZakaznikField::Telefon,
                "email" => ZakaznikField::Email,
                _ => return None,
            }),
            "stats" => Variable::Stats(match field {
                "pocetRozvadecu" => StatsField::PocetRozvadecu,
                "pocetOkruhu" => StatsField::PocetOkruhu,
                "pocetMistnosti" => StatsField::PocetMistnosti,
                "pocetZarizeni" => StatsField::PocetZarizeni,
                "pocetZavad" => StatsField::PocetZavad,
                "pocetZavadC1" => StatsField::PocetZavadC1,
                "pocetZavadC2" => StatsField::PocetZavadC2,
                "pocetZavadC3" => StatsField::PocetZavadC3,
                "pocetPristroju" => StatsField::PocetPristroju,
                _ => return None,
            }),
            _ => return None,
        })
    }

    /// Resolve to display text. Unset values render as a dash; `None` when
    /// the party the path points into is missing from the record.
    pub fn resolve(&self, ctx: &VariableContext) -> Option<String> {
        let r = ctx.record;
        let text = match *self {
            Variable::Today => format_date(Some(ctx.today)),
            Variable::CurrentPage => CURRENT_PAGE_MARKER.to_string(),
            Variable::TotalPages => TOTAL_PAGES_MARKER.to_string(),
            Variable::Revize(field) => match field {
                RevizeField::CisloRevize => or_dash(&r.number),
                RevizeField::Nazev => or_dash(&r.title),
                RevizeField::Adresa => or_dash(&r.site_address),
                RevizeField::Objekt => or_dash(&r.object_description),
                RevizeField::TypRevize => r.kind.label().to_string(),
                RevizeField::Kategorie => r.category.label().to_string(),
                RevizeField::Vysledek => r.result.short_label().to_string(),
                RevizeField::Datum => format_date(r.performed_on),
                RevizeField::DatumDokonceni => format_date(r.completed_on),
                RevizeField::DatumVypracovani => format_date(r.drafted_on),
                RevizeField::PlatnostDo => format_date(r.valid_until),
                RevizeField::Rozsah => or_dash(&r.scope),
                RevizeField::PredmetNeni => or_dash(&r.scope_excluded),
                RevizeField::NapetovaSoustava => or_dash(&r.voltage_system),
                RevizeField::Zaver => or_dash(&r.conclusion),
            },
            Variable::Firma(field) => match &r.company {
                None => return None,
                Some(c) => or_dash(match field {
                    FirmaField::Nazev => &c.name,
                    FirmaField::Ico => &c.ico,
                    FirmaField::Dic => &c.dic,
                    FirmaField::Adresa => &c.address,
                    FirmaField::Telefon => &c.phone,
                    FirmaField::Email => &c.email,
                }),
            },
            Variable::Technik(field) => match &r.technician {
                None => return None,
                Some(t) => or_dash(match field {
                    TechnikField::Jmeno => &t.name,
                    TechnikField::CisloOpravneni => &t.license_number,
                    TechnikField::Telefon => &t.phone,
                    TechnikField::Email => &t.email,
                }),
            },
            Variable::Zakaznik(field) => match &r.customer {
                // The free-text client stands in for a missing customer name.
                None if field == ZakaznikField::Nazev && !r.client.trim().is_empty() => {
                    r.client.trim().to_string()
                }
                None => return None,
                Some(c) => or_dash(match field {
                    ZakaznikField::Nazev => &c.name,
                    ZakaznikField::Ico => &c.ico,
                    ZakaznikField::Adresa => &c.address,
                    ZakaznikField::KontaktniOsoba => &c.contact_person,
                    ZakaznikField::Telefon => &c.phone,
                    ZakaznikField::Email => &c.email,
                }),
            },
            Variable::Stats(field) => {
                let n = match field {
                    StatsField::PocetRozvadecu => r.panels.len(),
                    StatsField::PocetOkruhu => r.circuit_count(),
                    StatsField::PocetMistnosti => r.rooms.len(),
                    StatsField::PocetZarizeni => r.device_count(),
                    StatsField::PocetZavad => r.defects.len(),
                    StatsField::PocetZavadC1 => r.defect_count(Severity::C1),
                    StatsField::PocetZavadC2 => r.defect_count(Severity::C2),
                    StatsField::PocetZavadC3 => r.defect_count(Severity::C3),
                    StatsField::PocetPristroju => r.instruments.len(),
                };
                n.to_string()
            }
        };
        Some(text)
    }
}

/// Resolve a dotted path. Never fails: unknown paths render as `[path]`.
pub fn resolve(path: &str, ctx: &VariableContext) -> String {
    match Variable::parse(path).and_then(|var| var.resolve(ctx)) {
        Some(text) => text,
        None => {
            log::warn!("Unresolved variable '{}'", path);
            format!("[{}]", path.trim())
        }
    }
}

/// Replace every `{{path}}` in `text`. Deferred page markers pass through
/// untouched; an unterminated `{{` is kept literally.
pub fn interpolate(text: &str, ctx: &VariableContext) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                out.push_str(&resolve(&after[..end], ctx));
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Substitute the deferred page markers once the page count is known.
pub fn substitute_page_markers(text: &str, current_page: usize, total_pages: usize) -> String {
    if !text.contains("{{") {
        return text.to_string();
    }
    text.replace(CURRENT_PAGE_MARKER, &current_page.to_string())
        .replace(TOTAL_PAGES_MARKER, &total_pages.to_string())
}

// ── Formatting ─────────────────────────────────────────────────

/// Czech date convention, `DD.MM.YYYY`. Unset dates render as a dash.
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%d.%m.%Y").to_string(),
        None => DASH.to_string(),
    }
}

/// Decimal comma, at most `decimals` places, trailing zeros trimmed.
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return DASH.to_string();
    }
    let s = format!("{:.*}", decimals, value);
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    };
    let s = if s == "-0" { "0".to_string() } else { s };
    s.replace('.', ",")
}

/// Number with a unit suffix, or a dash when absent.
pub fn format_measure(value: Option<f64>, decimals: usize, unit: &str) -> String {
    match value {
        Some(v) if v.is_finite() => {
            if unit.is_empty() {
                format_number(v, decimals)
            } else {
                format!("{} {}", format_number(v, decimals), unit)
            }
        }
        _ => DASH.to_string(),
    }
}

pub fn or_dash(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        DASH.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Company, Defect, InspectionResult, Panel};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn record() -> InspectionRecord {
        InspectionRecord {
            number: "R-17".to_string(),
            title: "Revize kotelny".to_string(),
            performed_on: NaiveDate::from_ymd_opt(2024, 5, 1),
            result: InspectionResult::Compliant,
            company: Some(Company {
                name: "Elektro s.r.o.".to_string(),
                ..Default::default()
            }),
            panels: vec![Panel::default(), Panel::default()],
            defects: vec![
                Defect {
                    severity: Severity::C1,
                    ..Default::default()
                },
                Defect::default(),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_known_paths() {
        let r = record();
        let ctx = VariableContext {
            record: &r,
            today: today(),
        };
        assert_eq!(resolve("revize.cisloRevize", &ctx), "R-17");
        assert_eq!(resolve("revize.datum", &ctx), "01.05.2024");
        assert_eq!(resolve("revize.platnostDo", &ctx), "-");
        assert_eq!(resolve("firma.nazev", &ctx), "Elektro s.r.o.");
        assert_eq!(resolve("firma.ico", &ctx), "-");
        assert_eq!(resolve("technik.jmeno", &ctx), "[technik.jmeno]");
        assert_eq!(resolve("today", &ctx), "03.06.2024");
        assert_eq!(resolve("revize.vysledek", &ctx), "Vyhovuje");
    }

    #[test]
    fn test_stats_are_computed() {
        let r = record();
        let ctx = VariableContext {
            record: &r,
            today: today(),
        };
        assert_eq!(resolve("stats.pocetRozvadecu", &ctx), "2");
        assert_eq!(resolve("stats.pocetZavad", &ctx), "2");
        assert_eq!(resolve("stats.pocetZavadC1", &ctx), "1");
        assert_eq!(resolve("stats.pocetZavadC2", &ctx), "0");
        assert_eq!(resolve("stats.pocetOkruhu", &ctx), "0");
    }

    #[test]
    fn test_unknown_paths_render_placeholder() {
        let r = record();
        let ctx = VariableContext {
            record: &r,
            today: today(),
        };
        for path in ["revize.neexistuje", "foo.bar", "firma", "", "stats."] {
            let out = resolve(path, &ctx);
            assert!(!out.is_empty());
            assert!(out.contains(path), "{out} should echo {path}");
        }
    }

    #[test]
    fn test_absent_party_echoes_path() {
        let r = InspectionRecord::default();
        let ctx = VariableContext {
            record: &r,
            today: today(),
        };
        assert_eq!(resolve("firma.nazev", &ctx), "[firma.nazev]");
        assert_eq!(resolve("technik.jmeno", &ctx), "[technik.jmeno]");
        assert_eq!(resolve("zakaznik.email", &ctx), "[zakaznik.email]");
        assert_eq!(resolve("zakaznik.nazev", &ctx), "[zakaznik.nazev]");
        // Dates stay a dash: the field exists, it just isn't set.
        assert_eq!(resolve("revize.datum", &ctx), "-");

        let with_client = InspectionRecord {
            client: "Obec Lipov".to_string(),
            ..Default::default()
        };
        let ctx = VariableContext {
            record: &with_client,
            today: today(),
        };
        assert_eq!(resolve("zakaznik.nazev", &ctx), "Obec Lipov");
    }

    #[test]
    fn test_deferred_markers_survive_interpolation() {
        let r = record();
        let ctx = VariableContext {
            record: &r,
            today: today(),
        };
        let text = interpolate("Strana {{currentPage}} z {{totalPages}}", &ctx);
        assert_eq!(text, "Strana {{currentPage}} z {{totalPages}}");
        assert_eq!(substitute_page_markers(&text, 2, 5), "Strana 2 z 5");
    }

    #[test]
    fn test_interpolate_mixed() {
        let r = record();
        let ctx = VariableContext {
            record: &r,
            today: today(),
        };
        assert_eq!(
            interpolate("Revize {{ revize.cisloRevize }} / {{x.y}} / {{open", &ctx),
            "Revize R-17 / [x.y] / {{open"
        );
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(0.45, 2), "0,45");
        assert_eq!(format_number(16.0, 2), "16");
        assert_eq!(format_number(1.50, 2), "1,5");
        assert_eq!(format_measure(Some(250.0), 1, "MΩ"), "250 MΩ");
        assert_eq!(format_measure(None, 1, "Ω"), "-");
    }
}
