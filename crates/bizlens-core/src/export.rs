//! # Insights Export
//!
//! Flattens [`Insights`] into `Metric,Value` rows for spreadsheet download.
//!
//! ```text
//! Metric,Value
//! Health Score,70
//! Real Burn Rate,200
//! BEP - Widget,100 units
//! BEP - Loss,Not profitable
//! Margin - Widget,60.0%
//! Recommendation 1,"Cash reserves may become negative starting 2025-03-01. ..."
//! ```

use csv::Writer;

use crate::error::{CoreError, CoreResult};
use crate::insights::Insights;

/// One exported `(metric, value)` pair.
pub type ExportRow = (String, String);

/// Builds the export rows (without the header) in download order.
pub fn export_rows(insights: &Insights) -> Vec<ExportRow> {
    let mut rows: Vec<ExportRow> = vec![
        ("Health Score".into(), insights.health_score.to_string()),
        (
            "Real Burn Rate".into(),
            insights.cash_insights.real_burn_rate.to_string(),
        ),
    ];

    rows.extend(insights.bep_insights.iter().map(|bep| {
        let value = match bep.break_even_units {
            Some(units) if !bep.issue => format!("{} units", units),
            _ => "Not profitable".to_string(),
        };
        (format!("BEP - {}", bep.product), value)
    }));

    rows.extend(insights.pricing_insights.iter().map(|p| {
        (format!("Margin - {}", p.product), format!("{:.1}%", p.margin))
    }));

    rows.extend(
        insights
            .recommendations
            .iter()
            .enumerate()
            .map(|(i, rec)| (format!("Recommendation {}", i + 1), rec.clone())),
    );

    rows
}

/// Renders the insights as CSV text with a `Metric,Value` header.
pub fn export_csv(insights: &Insights) -> CoreResult<String> {
    let mut wtr = Writer::from_writer(vec![]);

    wtr.write_record(["Metric", "Value"])?;
    for (metric, value) in export_rows(insights) {
        wtr.write_record([metric, value])?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| CoreError::Export(format!("CSV writer error: {}", e)))?;
    String::from_utf8(data).map_err(|e| CoreError::Export(format!("UTF-8 conversion error: {}", e)))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::generate_insights;
    use crate::types::{BusinessDataset, CashFlowEntry, Product};

    fn sample_insights() -> Insights {
        generate_insights(&BusinessDataset {
            fixed_cost: 1200.0,
            products: vec![
                Product::priced("Widget", 20.0, 8.0),
                Product::priced("Loss, Inc", 5.0, 6.0),
            ],
            cash_flow: vec![CashFlowEntry {
                date: "2025-03-01".into(),
                net_cash_flow: Some(-50.0),
                running_balance: Some(-50.0),
                ..CashFlowEntry::default()
            }],
            ..BusinessDataset::default()
        })
    }

    #[test]
    fn test_export_rows_order() {
        let rows = export_rows(&sample_insights());
        let metrics: Vec<&str> = rows.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(
            metrics,
            vec![
                "Health Score",
                "Real Burn Rate",
                "BEP - Widget",
                "BEP - Loss, Inc",
                "Margin - Widget",
                "Margin - Loss, Inc",
                "Recommendation 1",
                "Recommendation 2",
                "Recommendation 3",
            ]
        );
        assert_eq!(rows[0].1, "25");
        assert_eq!(rows[1].1, "50");
        assert_eq!(rows[2].1, "100 units");
        assert_eq!(rows[3].1, "Not profitable");
        assert_eq!(rows[4].1, "60.0%");
        assert_eq!(rows[5].1, "-20.0%");
    }

    #[test]
    fn test_export_csv_quotes_commas() {
        let csv = export_csv(&sample_insights()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Metric,Value");
        assert_eq!(lines[1], "Health Score,25");
        assert!(lines.contains(&"\"BEP - Loss, Inc\",Not profitable"));
    }

    #[test]
    fn test_export_empty_insights() {
        let csv = export_csv(&generate_insights(&BusinessDataset::default())).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "Health Score,60");
        assert_eq!(lines[2], "Real Burn Rate,0");
    }
}
