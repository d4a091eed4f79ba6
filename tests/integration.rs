//! Integration tests for the report pipeline.
//!
//! These tests exercise the full path from inspection data and template to
//! recorded pages and PDF bytes. They verify:
//! - Section ordering, visibility and canonical defaults
//! - Appendices always land last, on landscape pages
//! - Signatures placement on the cover or the last body page
//! - Nothing is drawn outside the page content area
//! - Generation is deterministic for a fixed date

use chrono::NaiveDate;

use revize_report::canvas::{Canvas, DrawCommand, Page, PageSequence};
use revize_report::image_loader::ImageSource;
use revize_report::layout::PageFrame;
use revize_report::sections::signatures::anchored_top;
use revize_report::model::*;
use revize_report::template::{ColumnConfig, SectionConfig, SignaturePlacement, TemplateDescriptor};
use revize_report::{generate, render_json, render_pdf, GenerateOptions, ReportError};

// ─── Helpers ────────────────────────────────────────────────────

fn options() -> GenerateOptions {
    GenerateOptions::with_today(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
}

fn png(w: u32, h: u32) -> ImageSource {
    let img = image::RgbImage::from_pixel(w, h, image::Rgb([200, 40, 40]));
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(encoder, img.as_raw(), w, h, image::ColorType::Rgb8).unwrap();
    ImageSource::from_bytes(&buf)
}

fn circuit(number: &str, name: &str) -> Circuit {
    Circuit {
        number: number.to_string(),
        name: name.to_string(),
        breaker_type: "B".to_string(),
        breaker_rating: Some(16.0),
        phases: Some(1),
        conductor: "CYKY 3x2,5".to_string(),
        insulation_resistance: Some(250.0),
        loop_impedance: Some(0.46),
        ..Default::default()
    }
}

fn photo(caption: &str) -> Photo {
    Photo {
        image: png(40, 30),
        caption: Some(caption.to_string()),
    }
}

/// Two panels (3 and 1 circuits), one room, one instrument and two defects:
/// a C1 with four photos and a C3 without photos.
fn record() -> InspectionRecord {
    InspectionRecord {
        number: "R-2026-014".to_string(),
        title: "Bytový dům Lipová 12".to_string(),
        site_address: "Lipová 12, Brno".to_string(),
        performed_on: NaiveDate::from_ymd_opt(2026, 2, 10),
        drafted_on: NaiveDate::from_ymd_opt(2026, 2, 12),
        valid_until: NaiveDate::from_ymd_opt(2031, 2, 10),
        result: InspectionResult::ConditionallyCompliant,
        scope: "Hlavní rozvaděč a společné prostory.".to_string(),
        voltage_system: "TN-C-S".to_string(),
        protective_measures: vec!["Automatické odpojení od zdroje".to_string()],
        conclusion: "Instalace je schopna provozu po odstranění závad.".to_string(),
        non_compliance_reason: "Chybí kryt svorkovnice.".to_string(),
        panels: vec![
            Panel {
                id: Some(1),
                name: "RH".to_string(),
                circuits: vec![
                    circuit("1", "Osvětlení"),
                    circuit("2", "Zásuvky"),
                    circuit("3", "Kotel"),
                ],
                ..Default::default()
            },
            Panel {
                id: Some(2),
                name: "R1".to_string(),
                circuits: vec![circuit("1", "Sklep")],
                ..Default::default()
            },
        ],
        rooms: vec![Room {
            id: Some(1),
            name: "Kotelna".to_string(),
            devices: vec![Device {
                name: "Čerpadlo".to_string(),
                protection_class: Some(ProtectionClass::I),
                ..Default::default()
            }],
            ..Default::default()
        }],
        defects: vec![
            Defect {
                description: "Chybějící kryt svorkovnice".to_string(),
                severity: Severity::C1,
                panel_id: Some(2),
                photos: vec![photo("A"), photo("B"), photo("C"), photo("D")],
                ..Default::default()
            },
            Defect {
                description: "Neoznačený jistič".to_string(),
                severity: Severity::C3,
                ..Default::default()
            },
        ],
        instruments: vec![Instrument {
            name: "Multifunkční tester".to_string(),
            manufacturer: "Metrel".to_string(),
            ..Default::default()
        }],
        customer: Some(Customer {
            name: "SVJ Lipová 12".to_string(),
            ..Default::default()
        }),
        company: Some(Company {
            name: "Elektro Revize s.r.o.".to_string(),
            ..Default::default()
        }),
        technician: Some(Technician {
            name: "Ing. Petr Svoboda".to_string(),
            license_number: "1234/5678".to_string(),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn section(id: &str, enabled: Option<bool>, order: Option<i64>) -> SectionConfig {
    SectionConfig {
        id: id.to_string(),
        display_name: None,
        enabled,
        order,
    }
}

fn column(id: &str, enabled: bool, order: i64) -> ColumnConfig {
    ColumnConfig {
        id: id.to_string(),
        label: None,
        enabled: Some(enabled),
        order: Some(order),
        width: None,
    }
}

/// Position of `needle` in the document text, page by page.
fn text_position(pages: &PageSequence, needle: &str) -> Option<usize> {
    pages.all_text().join("\n").find(needle)
}

/// x coordinate of the first text run equal to `label` on `page`.
fn text_x(page: &Page, label: &str) -> Option<f64> {
    page.commands.iter().find_map(|c| match c {
        DrawCommand::Text { text, x, .. } if text == label => Some(*x),
        _ => None,
    })
}

fn occurrences(pages: &PageSequence, needle: &str) -> Vec<usize> {
    pages
        .pages()
        .iter()
        .enumerate()
        .flat_map(|(i, p)| p.texts().filter(|t| t.contains(needle)).map(move |_| i))
        .collect()
}

// ─── Document Shape ─────────────────────────────────────────────

#[test]
fn test_default_document_shape() {
    let pages = generate(&record(), &TemplateDescriptor::default(), &options()).unwrap();

    // Cover first
    assert!(pages.page_text(0).contains("ZPRÁVA O REVIZI ELEKTRICKÉ INSTALACE"));
    assert_eq!(pages.page(0).unwrap().orientation, Orientation::Portrait);

    // Exactly one landscape page, and it is the last one
    let landscape: Vec<usize> = pages
        .pages()
        .iter()
        .enumerate()
        .filter(|(_, p)| p.orientation == Orientation::Landscape)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(landscape, vec![pages.page_count() - 1]);
    assert!(pages.page_count() >= 3);

    // Four photos in two rows
    let appendix = pages.pages().last().unwrap();
    assert_eq!(appendix.image_count(), 4);
    let mut rows: Vec<f64> = appendix
        .commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Image { y, .. } => Some(*y),
            _ => None,
        })
        .collect();
    rows.sort_by(|a, b| a.partial_cmp(b).unwrap());
    rows.dedup_by(|a, b| (*a - *b).abs() < 0.5);
    assert_eq!(rows.len(), 2);

    assert!(appendix.text().contains("Příloha 1: Fotodokumentace závad"));
    assert!(appendix.text().contains("Závada č. 2"));
    assert!(appendix.text().contains("C1 - kritická"));
}

#[test]
fn test_page_numbers_resolved_everywhere() {
    let pages = generate(&record(), &TemplateDescriptor::default(), &options()).unwrap();
    let total = pages.page_count();
    for i in 0..total {
        assert!(
            pages.page_text(i).contains(&format!("Strana {} z {}", i + 1, total)),
            "page {} lacks its page number",
            i + 1
        );
    }
    assert!(pages.find_page("{{").is_none());
}

#[test]
fn test_generation_is_deterministic() {
    let template = TemplateDescriptor::default();
    let a = generate(&record(), &template, &options()).unwrap();
    let b = generate(&record(), &template, &options()).unwrap();
    assert_eq!(a.page_count(), b.page_count());
    assert_eq!(a.all_text(), b.all_text());
    for (pa, pb) in a.pages().iter().zip(b.pages()) {
        assert_eq!(pa.commands.len(), pb.commands.len());
        assert_eq!(pa.content_bounds(), pb.content_bounds());
    }
}

#[test]
fn test_empty_record_still_renders() {
    let pages = generate(&InspectionRecord::default(), &TemplateDescriptor::default(), &options()).unwrap();
    assert!(pages.page_count() >= 2);
    assert!(pages.find_page("Závěr").is_some());
    // No defects: no appendix page
    assert!(pages.pages().iter().all(|p| p.orientation == Orientation::Portrait));
    // Empty sections draw nothing
    assert!(pages.find_page("Místnosti a spotřebiče").is_none());
}

// ─── Ordering & Visibility ──────────────────────────────────────

#[test]
fn test_sections_follow_template_order() {
    let template = TemplateDescriptor {
        sections: vec![
            section("zaver", None, Some(1)),
            section("identifikace", None, Some(2)),
        ],
        ..Default::default()
    };
    let pages = generate(&record(), &template, &options()).unwrap();
    let conclusion = text_position(&pages, "Zdůvodnění").unwrap();
    let identity = text_position(&pages, "Identifikační údaje").unwrap();
    assert!(conclusion < identity);
}

#[test]
fn test_equal_order_keeps_template_sequence() {
    let template = TemplateDescriptor {
        sections: vec![
            section("rozsah", None, Some(1)),
            section("objekt", None, Some(1)),
        ],
        ..Default::default()
    };
    let pages = generate(&record(), &template, &options()).unwrap();
    let scope = text_position(&pages, "Rozsah revize").unwrap();
    let object = text_position(&pages, "Údaje o objektu").unwrap();
    assert!(scope < object);
}

#[test]
fn test_missing_canonical_section_is_appended() {
    // A template saved before the instruments section existed
    let template = TemplateDescriptor {
        sections: vec![section("identifikace", None, Some(1)), section("zaver", None, Some(2))],
        ..Default::default()
    };
    let pages = generate(&record(), &template, &options()).unwrap();
    assert!(pages.find_page("Použité měřicí přístroje").is_some());
    assert!(pages.find_page("Multifunkční tester").is_some());
}

#[test]
fn test_disabled_section_is_omitted() {
    let template = TemplateDescriptor {
        sections: vec![section("mistnosti", Some(false), None)],
        ..Default::default()
    };
    let pages = generate(&record(), &template, &options()).unwrap();
    assert!(pages.find_page("Místnosti a spotřebiče").is_none());
    assert!(pages.find_page("Kotelna").is_none());
}

#[test]
fn test_appendix_last_even_when_ordered_first() {
    let template = TemplateDescriptor {
        sections: vec![section("zavady", None, Some(0))],
        ..Default::default()
    };
    let pages = generate(&record(), &template, &options()).unwrap();
    let appendix = pages.find_page("Příloha 1: Fotodokumentace závad").unwrap();
    assert_eq!(appendix, pages.page_count() - 1);
    assert_eq!(pages.page(appendix).unwrap().orientation, Orientation::Landscape);
    for page in &pages.pages()[..appendix] {
        assert_eq!(page.orientation, Orientation::Portrait);
    }
}

#[test]
fn test_unknown_section_is_an_error() {
    let template = TemplateDescriptor {
        sections: vec![section("fotogalerie", None, Some(1))],
        ..Default::default()
    };
    let err = generate(&record(), &template, &options()).unwrap_err();
    assert!(matches!(err, ReportError::UnknownSection(ref id) if id == "fotogalerie"));
}

#[test]
fn test_circuit_columns_follow_template() {
    let template = TemplateDescriptor {
        circuit_columns: vec![
            column("jistic", true, 1),
            column("cislo", true, 2),
            column("nazev", false, 3),
        ],
        ..Default::default()
    };
    let pages = generate(&record(), &template, &options()).unwrap();
    let index = pages.find_page("Rozvaděč RH").unwrap();
    let page = pages.page(index).unwrap();

    let breaker = text_x(page, "Jistič").unwrap();
    let number = text_x(page, "Č.").unwrap();
    assert!(breaker < number);
    assert!(text_x(page, "Okruh").is_none());
    // Circuit names belong to the disabled column
    assert!(pages.find_page("Osvětlení").is_none());
    // Note column is disabled by default
    assert!(text_x(page, "Poznámka").is_none());
}

// ─── Variables ──────────────────────────────────────────────────

#[test]
fn test_cover_title_variables() {
    let template = TemplateDescriptor {
        cover_title: "Revize {{revize.cisloRevize}} {{neznamy.pole}}".to_string(),
        ..Default::default()
    };
    let pages = generate(&record(), &template, &options()).unwrap();
    let cover = pages.page_text(0);
    assert!(cover.contains("Revize R-2026-014 [neznamy.pole]"));
}

#[test]
fn test_footer_custom_text_and_print_date() {
    let template = TemplateDescriptor {
        footer_custom_text: "{{firma.nazev}}".to_string(),
        ..Default::default()
    };
    let pages = generate(&record(), &template, &options()).unwrap();
    for i in 0..pages.page_count() {
        let text = pages.page_text(i);
        assert!(text.contains("Elektro Revize s.r.o."));
        assert!(text.contains("Vytištěno: 01.03.2026"));
    }
}

// ─── Signatures ─────────────────────────────────────────────────

#[test]
fn test_signatures_on_cover_by_default() {
    let pages = generate(&record(), &TemplateDescriptor::default(), &options()).unwrap();
    assert_eq!(occurrences(&pages, "Za objednatele / provozovatele"), vec![0]);
}

#[test]
fn test_signatures_on_last_body_page() {
    let template = TemplateDescriptor {
        signature_placement: SignaturePlacement::LastPage,
        ..Default::default()
    };
    let pages = generate(&record(), &template, &options()).unwrap();
    let appendix = pages
        .pages()
        .iter()
        .position(|p| p.orientation == Orientation::Landscape)
        .unwrap();
    let last_body = appendix - 1;
    assert_eq!(
        occurrences(&pages, "Za objednatele / provozovatele"),
        vec![last_body]
    );

    // Anchored to the bottom of the content frame.
    let frame = PageFrame::new(&options().page, Orientation::Portrait);
    let top = anchored_top(&frame);
    let page = pages.page(last_body).unwrap();
    let block: Vec<(f64, f64)> = page
        .commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Text { text, y, style, .. }
                if ["Revizní technik", "Za objednatele / provozovatele", "podpis"]
                    .contains(&text.as_str()) =>
            {
                Some((*y, *y + style.line_height()))
            }
            _ => None,
        })
        .collect();
    assert_eq!(block.len(), 4);
    for (y, bottom) in &block {
        assert!(*y >= top - 1e-6, "signature text at {y} above {top}");
        assert!(*bottom <= frame.bottom + 1e-6, "signature text ends at {bottom}");
    }
    let lowest = block.iter().map(|(_, b)| *b).fold(0.0, f64::max);
    assert!(frame.bottom - lowest < 1.0);
}

#[test]
fn test_signatures_follow_body_when_cover_disabled() {
    let template = TemplateDescriptor {
        show_cover: false,
        ..Default::default()
    };
    let pages = generate(&record(), &template, &options()).unwrap();
    let hits = occurrences(&pages, "Za objednatele / provozovatele");
    assert_eq!(hits.len(), 1);
    assert_eq!(pages.page(hits[0]).unwrap().orientation, Orientation::Portrait);
}

#[test]
fn test_signatures_hidden() {
    let template = TemplateDescriptor {
        cover_show_signatures: false,
        ..Default::default()
    };
    let pages = generate(&record(), &template, &options()).unwrap();
    assert!(occurrences(&pages, "Za objednatele / provozovatele").is_empty());
}

// ─── Geometry ───────────────────────────────────────────────────

#[test]
fn test_everything_inside_margins() {
    let mut long = record();
    long.scope = "Prohlídka a měření elektrické instalace společných prostor. ".repeat(120);
    let pages = generate(&long, &TemplateDescriptor::default(), &options()).unwrap();
    let margin = PageConfig::default().margin;

    for (i, page) in pages.pages().iter().enumerate() {
        let bounds = page.content_bounds().unwrap();
        assert!(bounds.x >= margin.left - 1e-6, "page {} left", i + 1);
        assert!(bounds.y >= margin.top - 1e-6, "page {} top", i + 1);
        assert!(bounds.right() <= page.width - margin.right + 1e-6, "page {} right", i + 1);
        assert!(bounds.bottom() <= page.height - margin.bottom + 1e-6, "page {} bottom", i + 1);
    }
}

#[test]
fn test_body_stays_inside_content_frame() {
    let mut long = record();
    long.prior_findings = "Závady zjištěné při předchozí revizi byly odstraněny. ".repeat(150);
    let template = TemplateDescriptor {
        show_header: false,
        footer_page_number: false,
        footer_print_date: false,
        ..Default::default()
    };
    let pages = generate(&long, &template, &options()).unwrap();
    assert!(pages.page_count() >= 4);

    let config = PageConfig::default();
    for (i, page) in pages.pages().iter().enumerate() {
        let frame = PageFrame::new(&config, page.orientation);
        let Some(bounds) = page.content_bounds() else {
            continue;
        };
        assert!(bounds.y >= frame.top - 1e-6, "page {} starts above the frame", i + 1);
        assert!(bounds.bottom() <= frame.bottom + 1e-6, "page {} crosses the bottom", i + 1);
    }
}

// ─── PDF Output ─────────────────────────────────────────────────

#[test]
fn test_render_pdf_structure() {
    let record = record();
    let template = TemplateDescriptor::default();
    let page_count = generate(&record, &template, &options()).unwrap().page_count();
    let bytes = render_pdf(&record, &template, &options()).unwrap();
    let text = String::from_utf8_lossy(&bytes);

    assert!(bytes.starts_with(b"%PDF-1.7"));
    assert!(text.contains(&format!("/Count {}", page_count)));
    assert!(text.contains("/MediaBox [0 0 841.89 595.28]"));
    assert!(text.contains("/Title (Revize R-2026-014 - Bytov\\375 dum Lipov\\341 12)"));
    assert!(text.trim_end().ends_with("%%EOF"));
}

#[test]
fn test_render_json_bundle() {
    let json = r##"{
        "revize": {
            "number": "R-1",
            "performedOn": "2026-02-10T08:00:00Z",
            "result": "vyhovuje",
            "panels": [{ "name": "RH", "circuits": [{ "number": 1, "name": "Světla" }] }]
        },
        "sablona": { "podpisyUmisteni": "posledni", "barvaPrimarni": "nonsense" }
    }"##;
    let bytes = render_json(json, &options()).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_render_json_parse_error_has_hint() {
    let err = render_json("{ \"revize\": { ", &options()).unwrap_err();
    match err {
        ReportError::Parse { hint, .. } => assert!(!hint.is_empty()),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_broken_photo_draws_placeholder() {
    let mut record = record();
    record.defects[0].photos[1].image = ImageSource::from_base64("bm90IGFuIGltYWdl");
    let pages = generate(&record, &TemplateDescriptor::default(), &options()).unwrap();
    let appendix = pages.pages().last().unwrap();
    assert_eq!(appendix.image_count(), 3);
    assert!(appendix.text().contains("Fotografii nelze zobrazit"));
}
