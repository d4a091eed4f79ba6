//! Measuring instruments used, with fixed columns.

use super::{draw_heading, heading_height, RenderContext, SectionRenderer};
use crate::error::ReportError;
use crate::layout::table::{Cell, Table, TableColumn};
use crate::layout::{Cursor, Flow};
use crate::template::ordering::PlannedSection;
use crate::template::SectionId;
use crate::variables::{format_date, or_dash};

pub struct InstrumentsSection;

impl InstrumentsSection {
    fn table(&self, ctx: &RenderContext) -> Table {
        let mut table = Table::new(
            vec![
                TableColumn::new("Přístroj", None),
                TableColumn::new("Výrobce / typ", None),
                TableColumn::new("Výrobní číslo", Some(90.0)),
                TableColumn::new("Kalibrace", Some(70.0)),
                TableColumn::new("Platnost kalibrace", Some(90.0)),
            ],
            ctx.theme.small(),
        );
        for instrument in &ctx.record.instruments {
            let maker: Vec<&str> = [instrument.manufacturer.trim(), instrument.model.trim()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect();
            let valid_until = instrument.calibration_valid_until;
            let mut validity = Cell::from(format_date(valid_until));
            if valid_until.is_some_and(|d| d < ctx.today) {
                validity = validity.bold();
            }
            table.push_row(vec![
                Cell::from(or_dash(&instrument.name)),
                Cell::from(or_dash(&maker.join(" "))),
                Cell::from(or_dash(&instrument.serial_number)),
                Cell::from(format_date(instrument.calibrated_on)),
                validity,
            ]);
        }
        table
    }
}

impl SectionRenderer for InstrumentsSection {
    fn id(&self) -> SectionId {
        SectionId::Instruments
    }

    fn has_content(&self, ctx: &RenderContext) -> bool {
        !ctx.record.instruments.is_empty()
    }

    fn estimate(&self, ctx: &RenderContext, width: f64) -> f64 {
        heading_height(&ctx.theme) + self.table(ctx).leading_height(width)
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
