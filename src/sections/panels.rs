//! Distribution boards: one subheading and circuit table per panel.

use super::{
    draw_heading, draw_subheading, heading_height, subheading_height, RenderContext,
    SectionRenderer, BLOCK_GAP,
};
use crate::error::ReportError;
use crate::layout::table::{Cell, Table, TableColumn};
use crate::layout::{Cursor, Flow};
use crate::model::{Circuit, Panel};
use crate::template::ordering::{circuit_columns, Column, PlannedSection};
use crate::template::{CircuitColumn, SectionId};
use crate::variables::{format_measure, or_dash, DASH};

/// Display text of one circuit column.
pub fn circuit_cell(column: CircuitColumn, circuit: &Circuit) -> String {
    match column {
        CircuitColumn::Number => or_dash(&circuit.number),
        CircuitColumn::Name => or_dash(&circuit.name),
        CircuitColumn::Breaker => {
            let kind = circuit.breaker_type.trim();
            match circuit.breaker_rating {
                Some(rating) => format!("{}{}", kind, format_measure(Some(rating), 1, "")),
                None if !kind.is_empty() => kind.to_string(),
                None => DASH.to_string(),
            }
        }
        CircuitColumn::Phases => match circuit.phases {
            Some(p) => format!("{}f", p),
            None => DASH.to_string(),
        },
        CircuitColumn::Conductor => or_dash(&circuit.conductor),
        CircuitColumn::InsulationResistance => format_measure(circuit.insulation_resistance, 1, "MΩ"),
        CircuitColumn::LoopImpedance => format_measure(circuit.loop_impedance, 2, "Ω"),
        CircuitColumn::Rcd => format_measure(circuit.rcd_rating, 0, "mA"),
        CircuitColumn::TripTime => format_measure(circuit.trip_time, 1, "ms"),
        CircuitColumn::Note => or_dash(&circuit.note),
    }
}

pub fn circuit_table(columns: &[Column<CircuitColumn>], circuits: &[Circuit], ctx: &RenderContext) -> Table {
    let mut table = Table::new(
        columns
            .iter()
            .map(|c| TableColumn::new(c.label.clone(), c.width))
            .collect(),
        ctx.theme.small(),
    );
    for circuit in circuits {
        table.push_row(
            columns
                .iter()
                .map(|c| Cell::from(circuit_cell(c.kind, circuit)))
                .collect(),
        );
    }
    table
}

fn panel_title(panel: &Panel) -> String {
    let mut title = format!("Rozvaděč {}", or_dash(&panel.name));
    let details: Vec<&str> = [panel.location.trim(), panel.panel_type.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    if !details.is_empty() {
        title.push_str(&format!(" ({})", details.join(", ")));
    }
    title
}

pub struct PanelsSection;

impl SectionRenderer for PanelsSection {
    fn id(&self) -> SectionId {
        SectionId::Panels
    }

    fn has_content(&self, ctx: &RenderContext) -> bool {
        !ctx.record.panels.is_empty()
    }

    fn estimate(&self, ctx: &RenderContext, width: f64) -> f64 {
        let columns = circuit_columns(ctx.template);
        let first = ctx
            .record
            .panels
            .first()
            .map(|p| {
                circuit_table(&columns, &p.circuits, ctx).leading_height(width)
            })
            .unwrap_or(0.0);
        heading_height(&ctx.theme) + subheading_height(&ctx.theme) + first
    }

    fn render(
        &self,
        ctx: &RenderContext,
        flow: &mut Flow,
        cursor: Cursor,
        section: &PlannedSection,
    ) -> Result<Cursor, ReportError> {
        let columns = circuit_columns(ctx.template);
        let mut cursor = draw_heading(flow, cursor, &section.title, &ctx.theme);
        let frame = flow.frame(cursor.orientation);

        for (i, panel) in ctx.record.panels.iter().enumerate() {
            if i > 0 {
                cursor = cursor.advance(BLOCK_GAP);
            }
            let table = circuit_table(&columns, &panel.circuits, ctx);
            let note_height = if panel.circuits.is_empty() {
                ctx.theme.small().line_height()
            } else {
                table.leading_height(frame.width)
            };
            cursor = flow.ensure(cursor, subheading_height(&ctx.theme) + note_height);
            cursor = draw_subheading(flow, cursor, &panel_title(panel), &ctx.theme);

            if panel.circuits.is_empty() {
                flow.canvas_at(cursor).draw_text(
                    "Bez měřených okruhů",
                    frame.left,
                    cursor.y,
                    &ctx.theme.small(),
                );
                cursor = cursor.advance(note_height);
            } else {
                cursor = table.draw(flow, cursor, frame.left, frame.width, &ctx.theme);
            }
        }
        Ok(cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_cells() {
        let circuit = Circuit {
            number: "3a".to_string(),
            breaker_type: "B".to_string(),
            breaker_rating: Some(16.0),
            phases: Some(1),
            insulation_resistance: Some(250.0),
            loop_impedance: Some(0.456),
            ..Default::default()
        };
        assert_eq!(circuit_cell(CircuitColumn::Number, &circuit), "3a");
        assert_eq!(circuit_cell(CircuitColumn::Breaker, &circuit), "B16");
        assert_eq!(circuit_cell(CircuitColumn::Phases, &circuit), "1f");
        assert_eq!(circuit_cell(CircuitColumn::InsulationResistance, &circuit), "250 MΩ");
        assert_eq!(circuit_cell(CircuitColumn::LoopImpedance, &circuit), "0,46 Ω");
        assert_eq!(circuit_cell(CircuitColumn::Rcd, &circuit), "-");
        assert_eq!(circuit_cell(CircuitColumn::Name, &circuit), "-");
    }

    #[test]
    fn test_panel_title_details() {
        let panel = Panel {
            name: "RH".to_string(),
            location: "chodba".to_string(),
            ..Default::default()
        };
        assert_eq!(panel_title(&panel), "Rozvaděč RH (chodba)");
    }
}
