//! Identification and object sections: label/value tables.

use super::{draw_heading, heading_height, key_value_table, RenderContext, SectionRenderer};
use crate::error::ReportError;
use crate::layout::table::Table;
use crate::layout::{Cursor, Flow};
use crate::template::ordering::PlannedSection;
use crate::template::SectionId;
use crate::variables::{format_date, or_dash};

const LABEL_WIDTH: f64 = 150.0;

pub struct IdentitySection;

impl IdentitySection {
    fn table(&self, ctx: &RenderContext) -> Table {
        let r = ctx.record;
        let mut rows = vec![
            ("Číslo revizní zprávy", or_dash(&r.number)),
            ("Druh revize", r.kind.label().to_string()),
            ("Kategorie", r.category.label().to_string()),
            ("Datum zahájení revize", format_date(r.performed_on)),
            ("Datum ukončení revize", format_date(r.completed_on)),
            ("Datum vypracování zprávy", format_date(r.drafted_on)),
            ("Termín příští revize", format_date(r.valid_until)),
        ];
        if let Some(t) = &r.technician {
            rows.push(("Revizní technik", or_dash(&t.name)));
            rows.push(("Číslo osvědčení", or_dash(&t.license_number)));
        }
        if let Some(c) = &r.company {
            let mut company = or_dash(&c.name);
            if !c.ico.trim().is_empty() {
                company.push_str(&format!(", IČO {}", c.ico.trim()));
            }
            rows.push(("Firma", company));
        }
        key_value_table(rows, &ctx.theme, LABEL_WIDTH)
    }
}

impl SectionRenderer for IdentitySection {
    fn id(&self) -> SectionId {
        SectionId::Identity
    }

    fn has_content(&self, _ctx: &RenderContext) -> bool {
        true
    }

    fn estimate(&self, ctx: &RenderContext, width: f64) -> f64 {
        heading_height(&ctx.theme) + self.table(ctx).measure(width)
    }

    fn render(
        &self,
        ctx: &RenderContext,
        flow: &mut Flow,
        cursor: Cursor,
        section: &PlannedSection,
    ) -> Result<Cursor, ReportError> {
        let frame = flow.frame(cursor.orientation);
        let cursor = draw_heading(flow, cursor, &section.title, &ctx.theme);
        Ok(self
            .table(ctx)
            .draw(flow, cursor, frame.left, frame.width, &ctx.theme))
    }
}

pub struct ObjectSection;

impl ObjectSection {
    fn rows(&self, ctx: &RenderContext) -> Vec<(&'static str, String)> {
        let r = ctx.record;
        let mut rows = Vec::new();
        let mut push = |label: &'static str, value: &str| {
            if !value.trim().is_empty() {
                rows.push((label, value.trim().to_string()));
            }
        };
        push("Objekt", &r.title);
        push("Popis objektu", &r.object_description);
        push("Adresa", &r.site_address);
        match &r.customer {
            Some(c) => {
                push("Objednatel", &c.name);
                push("IČO objednatele", &c.ico);
                push("Adresa objednatele", &c.address);
                push("Kontaktní osoba", &c.contact_person);
            }
            None => push("Objednatel", &r.client),
        }
        push("Napěťová soustava", &r.voltage_system);
        rows
    }
}

impl SectionRenderer for ObjectSection {
    fn id(&self) -> SectionId {
        SectionId::Object
    }

    fn has_content(&self, ctx: &RenderContext) -> bool {
        !self.rows(ctx).is_empty()
    }

    fn estimate(&self, ctx: &RenderContext, width: f64) -> f64 {
        heading_height(&ctx.theme)
            + key_value_table(self.rows(ctx), &ctx.theme, LABEL_WIDTH).measure(width)
    }

    fn render(
        &self,
        ctx: &RenderContext,
        flow: &mut Flow,
        cursor: Cursor,
        section: &PlannedSection,
    ) -> Result<Cursor, ReportError> {
        let frame = flow.frame(cursor.orientation);
        let cursor = draw_heading(flow, cursor, &section.title, &ctx.theme);
        let table = key_value_table(self.rows(ctx), &ctx.theme, LABEL_WIDTH);
        Ok(table.draw(flow, cursor, frame.left, frame.width, &ctx.theme))
    }
}
