//! Ordering and visibility of template entries.
//!
//! Sections, table columns and cover blocks all follow the same rules:
//!
//! 1. Every canonical id missing from the template is appended with
//!    `order = len + 1`, so templates saved before an id existed still show it.
//! 2. Entries with `enabled: false` are dropped. A missing flag means enabled.
//! 3. The rest is sorted by `order`, ties keeping their array position.
//!    An entry without `order` takes its 1-based array position.
//!
//! Then the string ids are mapped to their typed variants. An unknown section
//! id is a template bug and fails the run; unknown column and block ids are
//! skipped with a warning.

use super::{
    BlockConfig, CircuitColumn, ColumnConfig, CoverBlock, DeviceColumn, SectionConfig, SectionId,
    TemplateDescriptor,
};
use crate::error::ReportError;

/// Common view over section, column and block entries.
pub trait OrderedEntry: Clone {
    fn id(&self) -> &str;
    fn enabled(&self) -> Option<bool>;
    fn order(&self) -> Option<i64>;
    fn synthetic(id: &str, enabled: bool, order: i64) -> Self;
}

impl OrderedEntry for SectionConfig {
    fn id(&self) -> &str {
        &self.id
    }
    fn enabled(&self) -> Option<bool> {
        self.enabled
    }
    fn order(&self) -> Option<i64> {
        self.order
    }
    fn synthetic(id: &str, enabled: bool, order: i64) -> Self {
        SectionConfig {
            id: id.to_string(),
            display_name: None,
            enabled: Some(enabled),
            order: Some(order),
        }
    }
}

impl OrderedEntry for ColumnConfig {
    fn id(&self) -> &str {
        &self.id
    }
    fn enabled(&self) -> Option<bool> {
        self.enabled
    }
    fn order(&self) -> Option<i64> {
        self.order
    }
    fn synthetic(id: &str, enabled: bool, order: i64) -> Self {
        ColumnConfig {
            id: id.to_string(),
            label: None,
            enabled: Some(enabled),
            order: Some(order),
            width: None,
        }
    }
}

impl OrderedEntry for BlockConfig {
    fn id(&self) -> &str {
        &self.id
    }
    fn enabled(&self) -> Option<bool> {
        self.enabled
    }
    fn order(&self) -> Option<i64> {
        self.order
    }
    fn synthetic(id: &str, enabled: bool, order: i64) -> Self {
        BlockConfig {
            id: id.to_string(),
            enabled: Some(enabled),
            order: Some(order),
        }
    }
}

/// Append every canonical `(id, enabled_by_default)` the template lacks.
pub fn merge_with_defaults<T: OrderedEntry>(configured: &[T], canonical: &[(&str, bool)]) -> Vec<T> {
    let mut merged: Vec<T> = Vec::with_capacity(configured.len() + canonical.len());
    for entry in configured {
        if merged.iter().any(|e: &T| e.id() == entry.id()) {
            log::warn!("Duplicate template entry '{}' ignored", entry.id());
            continue;
        }
        merged.push(entry.clone());
    }
    for (id, enabled) in canonical {
        if !merged.iter().any(|e| e.id() == *id) {
            let order = merged.len() as i64 + 1;
            merged.push(T::synthetic(id, *enabled, order));
        }
    }
    merged
}

/// Drop disabled entries and stable-sort the rest by order.
pub fn enabled_in_order<T: OrderedEntry>(entries: Vec<T>) -> Vec<T> {
    let mut keyed: Vec<(i64, T)> = entries
        .into_iter()
        .enumerate()
        .filter(|(_, e)| e.enabled() != Some(false))
        .map(|(i, e)| (e.order().unwrap_or(i as i64 + 1), e))
        .collect();
    // sort_by_key is stable
    keyed.sort_by_key(|(order, _)| *order);
    keyed.into_iter().map(|(_, e)| e).collect()
}

/// `merge_with_defaults` followed by `enabled_in_order`.
pub fn resolve_entries<T: OrderedEntry>(configured: &[T], canonical: &[(&str, bool)]) -> Vec<T> {
    enabled_in_order(merge_with_defaults(configured, canonical))
}

// ── Sections ───────────────────────────────────────────────────

/// A section scheduled for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedSection {
    pub id: SectionId,
    /// Heading as displayed, including the "Příloha N" prefix for appendices.
    pub title: String,
    /// 1-based appendix number.
    pub appendix: Option<usize>,
}

/// The section plan: body sections in order, then appendices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionPlan {
    pub body: Vec<PlannedSection>,
    pub appendices: Vec<PlannedSection>,
}

impl SectionPlan {
    /// Every planned section in rendering order.
    pub fn iter(&self) -> impl Iterator<Item = &PlannedSection> {
        self.body.iter().chain(self.appendices.iter())
    }
}

pub fn plan_sections(template: &TemplateDescriptor) -> Result<SectionPlan, ReportError> {
    let canonical: Vec<(&str, bool)> = SectionId::CANONICAL.iter().map(|s| (s.key(), true)).collect();
    let ordered = resolve_entries(&template.sections, &canonical);

    let mut plan = SectionPlan::default();
    for entry in ordered {
        let id = SectionId::from_key(&entry.id)
            .ok_or_else(|| ReportError::UnknownSection(entry.id.clone()))?;
        let name = entry
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(id.default_title());

        if id.is_appendix() {
            let number = plan.appendices.len() + 1;
            plan.appendices.push(PlannedSection {
                id,
                title: format!("Příloha {}: {}", number, name),
                appendix: Some(number),
            });
        } else {
            plan.body.push(PlannedSection {
                id,
                title: name.to_string(),
                appendix: None,
            });
        }
    }

    log::debug!(
        "Section plan: body [{}], appendices [{}]",
        plan.body.iter().map(|s| s.id.key()).collect::<Vec<_>>().join(", "),
        plan.appendices.iter().map(|s| s.id.key()).collect::<Vec<_>>().join(", ")
    );
    Ok(plan)
}

// ── Columns ────────────────────────────────────────────────────

/// A resolved table column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column<K> {
    pub kind: K,
    pub label: String,
    pub width: Option<f64>,
}

fn resolve_columns<K: Copy>(
    configured: &[ColumnConfig],
    canonical: &[(K, &'static str, bool)],
    lookup: impl Fn(&str) -> Option<K>,
    default_label: impl Fn(K) -> &'static str,
) -> Vec<Column<K>> {
    let keys: Vec<(&str, bool)> = canonical.iter().map(|(_, key, on)| (*key, *on)).collect();
    resolve_entries(configured, &keys)
        .into_iter()
        .filter_map(|entry| {
            let Some(kind) = lookup(&entry.id) else {
                log::warn!("Unknown column id '{}' skipped", entry.id);
                return None;
            };
            let label = entry
                .label
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| default_label(kind).to_string());
            Some(Column {
                kind,
                label,
                width: entry.width.filter(|w| w.is_finite() && *w > 0.0),
            })
        })
        .collect()
}

pub fn circuit_columns(template: &TemplateDescriptor) -> Vec<Column<CircuitColumn>> {
    let canonical: Vec<_> = CircuitColumn::CANONICAL
        .iter()
        .map(|c| (*c, c.key(), c.enabled_by_default()))
        .collect();
    resolve_columns(
        &template.circuit_columns,
        &canonical,
        CircuitColumn::from_key,
        |c| c.default_label(),
    )
}

pub fn device_columns(template: &TemplateDescriptor) -> Vec<Column<DeviceColumn>> {
    let canonical: Vec<_> = DeviceColumn::CANONICAL
        .iter()
        .map(|c| (*c, c.key(), true))
        .collect();
    resolve_columns(
        &template.device_columns,
        &canonical,
        DeviceColumn::from_key,
        |c| c.default_label(),
    )
}

// ── Cover blocks ───────────────────────────────────────────────

/// Cover blocks in order, after the legacy per-block visibility flags.
pub fn cover_blocks(template: &TemplateDescriptor) -> Vec<CoverBlock> {
    let canonical: Vec<(&str, bool)> = CoverBlock::CANONICAL.iter().map(|b| (b.key(), true)).collect();
    resolve_entries(&template.cover_blocks, &canonical)
        .into_iter()
        .filter_map(|entry| {
            let block = CoverBlock::from_key(&entry.id);
            if block.is_none() {
                log::warn!("Unknown cover block '{}' skipped", entry.id);
            }
            block
        })
        .filter(|block| match block {
            CoverBlock::Identity => template.cover_show_company || template.cover_show_technician,
            CoverBlock::Title => true,
            CoverBlock::Customer => template.cover_show_customer,
            CoverBlock::Object => template.cover_show_object,
            CoverBlock::Result => template.cover_show_result,
            CoverBlock::Signatures => template.cover_show_signatures,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: &str, enabled: Option<bool>, order: Option<i64>) -> SectionConfig {
        SectionConfig {
            id: id.to_string(),
            display_name: None,
            enabled,
            order,
        }
    }

    fn ids(entries: &[SectionConfig]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_missing_canonical_ids_are_appended_enabled() {
        let configured = vec![section("b", Some(true), Some(1))];
        let merged = merge_with_defaults(&configured, &[("a", true), ("b", true), ("c", true)]);
        assert_eq!(ids(&merged), vec!["b", "a", "c"]);
        assert_eq!(merged[1].order, Some(2));
        assert_eq!(merged[2].order, Some(3));
        assert_eq!(merged[2].enabled, Some(true));
    }

    #[test]
    fn test_disabled_entries_are_dropped_absent_flag_means_enabled() {
        let entries = vec![
            section("a", None, Some(1)),
            section("b", Some(false), Some(2)),
            section("c", Some(true), Some(3)),
        ];
        assert_eq!(ids(&enabled_in_order(entries)), vec!["a", "c"]);
    }

    #[test]
    fn test_sort_is_stable_on_equal_order() {
        let entries = vec![
            section("x", None, Some(5)),
            section("y", None, Some(1)),
            section("z", None, Some(5)),
            section("w", None, Some(5)),
        ];
        for _ in 0..3 {
            assert_eq!(ids(&enabled_in_order(entries.clone())), vec!["y", "x", "z", "w"]);
        }
    }

    #[test]
    fn test_missing_order_uses_array_position() {
        let entries = vec![
            section("a", None, Some(3)),
            section("b", None, None),
            section("c", None, Some(1)),
        ];
        assert_eq!(ids(&enabled_in_order(entries)), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_appendix_numbering_skips_disabled() {
        let template = TemplateDescriptor {
            sections: vec![
                section("zavady", None, Some(0)),
                section("objekt", Some(false), None),
            ],
            ..Default::default()
        };
        let plan = plan_sections(&template).unwrap();
        assert_eq!(plan.appendices.len(), 1);
        assert_eq!(plan.appendices[0].id, SectionId::Defects);
        assert_eq!(plan.appendices[0].title, "Příloha 1: Fotodokumentace závad");
        assert!(plan.body.iter().all(|s| s.id != SectionId::Object));
        assert_eq!(plan.body.len(), SectionId::CANONICAL.len() - 2);
    }

    #[test]
    fn test_unknown_section_is_fatal() {
        let template = TemplateDescriptor {
            sections: vec![section("fotky", None, None)],
            ..Default::default()
        };
        let err = plan_sections(&template).unwrap_err();
        assert!(matches!(err, ReportError::UnknownSection(id) if id == "fotky"));
    }

    #[test]
    fn test_disabled_unknown_section_is_not_fatal() {
        let template = TemplateDescriptor {
            sections: vec![section("stara_sekce", Some(false), None)],
            ..Default::default()
        };
        assert!(plan_sections(&template).is_ok());
    }

    #[test]
    fn test_default_circuit_columns_hide_note() {
        let cols = circuit_columns(&TemplateDescriptor::default());
        assert_eq!(cols.len(), 9);
        assert!(cols.iter().all(|c| c.kind != CircuitColumn::Note));
        assert_eq!(cols[0].label, "Č.");
    }

    #[test]
    fn test_unknown_columns_are_skipped() {
        let template = TemplateDescriptor {
            device_columns: vec![
                ColumnConfig {
                    id: "barva".to_string(),
                    ..Default::default()
                },
                ColumnConfig {
                    id: "stav".to_string(),
                    label: Some("Výsledek".to_string()),
                    order: Some(0),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let cols = device_columns(&template);
        assert_eq!(cols[0].kind, DeviceColumn::Status);
        assert_eq!(cols[0].label, "Výsledek");
        assert_eq!(cols.len(), 6);
    }

    #[test]
    fn test_cover_blocks_respect_legacy_flags() {
        let template = TemplateDescriptor {
            cover_show_result: false,
            cover_show_signatures: false,
            ..Default::default()
        };
        let blocks = cover_blocks(&template);
        assert_eq!(
            blocks,
            vec![
                CoverBlock::Identity,
                CoverBlock::Title,
                CoverBlock::Customer,
                CoverBlock::Object
            ]
        );
    }
}
