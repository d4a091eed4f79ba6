//! Rooms and the devices inspected in them.

use super::{
    draw_heading, draw_subheading, heading_height, subheading_height, RenderContext,
    SectionRenderer, BLOCK_GAP,
};
use crate::error::ReportError;
use crate::layout::table::{Cell, Table, TableColumn};
use crate::layout::{Cursor, Flow};
use crate::model::{Device, Room};
use crate::template::ordering::{device_columns, Column, PlannedSection};
use crate::template::{DeviceColumn, SectionId};
use crate::variables::{format_measure, or_dash, DASH};

pub fn device_cell(column: DeviceColumn, device: &Device) -> String {
    match column {
        DeviceColumn::Name => or_dash(&device.name),
        DeviceColumn::Quantity => device.quantity.to_string(),
        DeviceColumn::ProtectionClass => device
            .protection_class
            .map(|c| c.label().to_string())
            .unwrap_or_else(|| DASH.to_string()),
        DeviceColumn::Power => format_measure(device.power, 0, "W"),
        DeviceColumn::TouchProtection => format_measure(device.touch_protection, 2, "Ω"),
        DeviceColumn::Status => or_dash(&device.status),
    }
}

fn device_table(columns: &[Column<DeviceColumn>], devices: &[Device], ctx: &RenderContext) -> Table {
    let mut table = Table::new(
        columns
            .iter()
            .map(|c| TableColumn::new(c.label.clone(), c.width))
            .collect(),
        ctx.theme.small(),
    );
    for device in devices {
        table.push_row(
            columns
                .iter()
                .map(|c| Cell::from(device_cell(c.kind, device)))
                .collect(),
        );
    }
    table
}

fn room_title(room: &Room) -> String {
    if room.floor.trim().is_empty() {
        format!("Místnost {}", or_dash(&room.name))
    } else {
        format!("Místnost {} ({})", or_dash(&room.name), room.floor.trim())
    }
}

pub struct RoomsSection;

impl SectionRenderer for RoomsSection {
    fn id(&self) -> SectionId {
        SectionId::Rooms
    }

    fn has_content(&self, ctx: &RenderContext) -> bool {
        !ctx.record.rooms.is_empty()
    }

    fn estimate(&self, ctx: &RenderContext, width: f64) -> f64 {
        let columns = device_columns(ctx.template);
        let first = ctx
            .record
            .rooms
            .first()
            .map(|r| device_table(&columns, &r.devices, ctx).leading_height(width))
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
        let columns = device_columns(ctx.template);
        let mut cursor = draw_heading(flow, cursor, &section.title, &ctx.theme);
        let frame = flow.frame(cursor.orientation);

        for (i, room) in ctx.record.rooms.iter().enumerate() {
            if i > 0 {
                cursor = cursor.advance(BLOCK_GAP);
            }
            let table = device_table(&columns, &room.devices, ctx);
            let lead = if room.devices.is_empty() {
                ctx.theme.small().line_height()
            } else {
                table.leading_height(frame.width)
            };
            cursor = flow.ensure(cursor, subheading_height(&ctx.theme) + lead);
            cursor = draw_subheading(flow, cursor, &room_title(room), &ctx.theme);

            if room.devices.is_empty() {
                flow.canvas_at(cursor).draw_text(
                    "Bez zařízení",
                    frame.left,
                    cursor.y,
                    &ctx.theme.small(),
                );
                cursor = cursor.advance(lead);
            } else {
                cursor = table.draw(flow, cursor, frame.left, frame.width, &ctx.theme);
            }
        }
        Ok(cursor)
    }
}
