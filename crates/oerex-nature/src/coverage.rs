//! Coverage analysis over the persisted feature table.
//!
//! Computes per-field fill rates for the quantitative and categorical
//! columns, plus vocabulary-group hit rates and the most frequently
//! mentioned elements. Used by the `coverage` subcommand and printed
//! after each run.

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use oerex_core::progress::fmt_num;
use oerex_extract::vocab;
use oerex_store::record::FeatureRecord;

/// Field completeness statistics for the feature table.
#[derive(Debug, Default)]
pub struct FieldCompleteness {
    pub total_rows: usize,
    pub fields: Vec<FieldStat>,
    /// Elements by number of rows mentioning them, descending
    pub top_elements: Vec<(String, usize)>,
}

/// Individual field statistics.
#[derive(Debug, Clone)]
pub struct FieldStat {
    pub name: &'static str,
    pub present: usize,
    pub pct: f64,
}

impl FieldCompleteness {
    /// Compute completeness from in-memory records.
    pub fn compute(records: &[FeatureRecord]) -> Self {
        let total = records.len();

        let count = |f: &dyn Fn(&FeatureRecord) -> bool| records.iter().filter(|r| f(r)).count();

        let pct = |n: usize| -> f64 {
            if total > 0 {
                n as f64 / total as f64 * 100.0
            } else {
                0.0
            }
        };

        let mut fields = Vec::new();
        let mut push = |name: &'static str, present: usize| {
            fields.push(FieldStat {
                name,
                present,
                pct: pct(present),
            });
        };

        push("overpotential_mv", count(&|r| r.quant.overpotential_mv.is_some()));
        push("current_density", count(&|r| r.quant.current_density.is_some()));
        push("ph", count(&|r| r.quant.ph.is_some()));
        push("temperature_c", count(&|r| r.quant.temperature_c.is_some()));
        push("tafel_slope_mv_per_dec", count(&|r| {
            r.quant.tafel_slope_mv_per_dec.is_some()
        }));
        push("faradaic_efficiency_pct", count(&|r| {
            r.quant.faradaic_efficiency_pct.is_some()
        }));
        push("turnover_frequency", count(&|r| r.quant.turnover_frequency.is_some()));
        push("stability_hours", count(&|r| r.quant.stability_hours.is_some()));
        push("catalyst", count(&|r| r.catalyst.is_some()));
        push("substrate", count(&|r| r.substrate.is_some()));
        push("electrolyte", count(&|r| r.electrolyte.is_some()));
        push("electrolyte_concentration_m", count(&|r| {
            r.electrolyte_concentration_m.is_some()
        }));
        push("year", count(&|r| r.year.is_some()));
        push("any_element", count(&|r| r.element_counts.iter().any(|&c| c > 0)));
        push("any_compound", count(&|r| r.compound_flags.iter().any(|&f| f)));
        push("any_morphology", count(&|r| r.morphology_flags.iter().any(|&f| f)));

        let mut top_elements: Vec<(String, usize)> = vocab::ELEMENTS
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let rows = records
                    .iter()
                    .filter(|r| r.element_counts.get(i).copied().unwrap_or(0) > 0)
                    .count();
                (e.to_string(), rows)
            })
            .filter(|(_, rows)| *rows > 0)
            .collect();
        top_elements.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_elements.truncate(5);

        Self {
            total_rows: total,
            fields,
            top_elements,
        }
    }

    /// Format completeness table as a string.
    pub fn format_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new(format!("Field Completeness (n={})", fmt_num(self.total_rows)))
                    .fg(Color::Cyan)
                    .add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Present").fg(Color::Cyan),
                Cell::new("Coverage").fg(Color::Cyan),
            ]);

        for f in &self.fields {
            let color = if f.pct >= 90.0 {
                Color::Green
            } else if f.pct >= 50.0 {
                Color::Yellow
            } else {
                Color::Red
            };

            table.add_row(vec![
                Cell::new(f.name),
                Cell::new(fmt_num(f.present)),
                Cell::new(format!("{:.1}%", f.pct)).fg(color),
            ]);
        }

        let mut out = format!("\n{table}");

        if !self.top_elements.is_empty() {
            let mut elems = Table::new();
            elems
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Top Elements")
                        .fg(Color::Cyan)
                        .add_attribute(comfy_table::Attribute::Bold),
                    Cell::new("Rows").fg(Color::Cyan),
                ]);
            for (name, rows) in &self.top_elements {
                elems.add_row(vec![Cell::new(name), Cell::new(fmt_num(*rows))]);
            }
            out.push_str(&format!("\n{elems}"));
        }

        out
    }

    /// Log completeness summary (non-TTY mode).
    pub fn log(&self) {
        let parts: Vec<String> = self
            .fields
            .iter()
            .filter(|f| f.pct >= 10.0)
            .map(|f| format!("{}={:.0}%", f.name, f.pct))
            .collect();
        log::info!("Fields (n={}): {}", self.total_rows, parts.join(" "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_overpotential(mv: f64) -> FeatureRecord {
        let mut rec = FeatureRecord {
            identifier: format!("id-{mv}"),
            ..Default::default()
        };
        rec.quant.overpotential_mv = Some(mv);
        rec
    }

    #[test]
    fn compute_empty_table() {
        let stats = FieldCompleteness::compute(&[]);
        assert_eq!(stats.total_rows, 0);
        assert!(stats.fields.iter().all(|f| f.pct == 0.0));
        assert!(stats.top_elements.is_empty());
    }

    #[test]
    fn fill_rates_counted_per_field() {
        let mut with_catalyst = FeatureRecord::default();
        with_catalyst.catalyst = Some("NiFe-LDH".into());
        let rows = vec![
            record_with_overpotential(240.0),
            record_with_overpotential(310.0),
            with_catalyst,
            FeatureRecord::default(),
        ];

        let stats = FieldCompleteness::compute(&rows);
        assert_eq!(stats.total_rows, 4);

        let field = |name: &str| stats.fields.iter().find(|f| f.name == name).unwrap();
        assert_eq!(field("overpotential_mv").present, 2);
        assert!((field("overpotential_mv").pct - 50.0).abs() < 0.01);
        assert_eq!(field("catalyst").present, 1);
        assert_eq!(field("ph").present, 0);
    }

    #[test]
    fn top_elements_ranked_by_row_count() {
        let ni = vocab::ELEMENTS.iter().position(|&e| e == "Ni").unwrap();
        let fe = vocab::ELEMENTS.iter().position(|&e| e == "Fe").unwrap();

        let mut both = FeatureRecord::default();
        both.element_counts = vec![0; vocab::ELEMENTS.len()];
        both.element_counts[ni] = 4;
        both.element_counts[fe] = 1;

        let mut ni_only = FeatureRecord::default();
        ni_only.element_counts = vec![0; vocab::ELEMENTS.len()];
        ni_only.element_counts[ni] = 2;

        let stats = FieldCompleteness::compute(&[both, ni_only]);
        assert_eq!(stats.top_elements[0], ("Ni".to_string(), 2));
        assert_eq!(stats.top_elements[1], ("Fe".to_string(), 1));
        assert_eq!(stats.top_elements.len(), 2);
    }
}
