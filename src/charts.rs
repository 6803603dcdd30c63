//! Chart rendering for the dashboard pages. Every chart is drawn to an SVG
//! string and handed to the templates as a `data:` URI, so nothing is written
//! to disk or cached between requests.

use anyhow::{ensure, Result};
use base64::Engine;
use plotters::prelude::*;

use crate::report::{ProductionReport, TARGET_WEIGHT};

const PIE_COLORS: [RGBColor; 6] = [
    RGBColor(102, 194, 165),
    RGBColor(252, 141, 98),
    RGBColor(141, 160, 203),
    RGBColor(231, 138, 195),
    RGBColor(166, 216, 84),
    RGBColor(255, 217, 47),
];

fn to_data_uri(svg: String) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(svg.as_bytes());
    format!("data:image/svg+xml;base64,{}", encoded)
}

/// Breed share of the whole flock as a pie chart.
pub fn breed_share_chart(report: &ProductionReport) -> Result<String> {
    ensure!(!report.breed_stats.is_empty(), "no rows to chart");

    let sizes: Vec<f64> = report
        .breed_stats
        .iter()
        .map(|b| b.count as f64)
        .collect();
    let labels: Vec<String> = report
        .breed_stats
        .iter()
        .map(|b| b.breed.clone())
        .collect();
    let colors: Vec<RGBColor> = (0..sizes.len())
        .map(|i| PIE_COLORS[i % PIE_COLORS.len()])
        .collect();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (600, 600)).into_drawing_area();
        root.fill(&WHITE)?;
        let root = root.titled("Breed share", ("sans-serif", 24))?;

        let center = (300, 290);
        let radius = 225.0;
        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(90.0);
        pie.label_style(("sans-serif", 18).into_font());
        pie.percentages(("sans-serif", 14).into_font());
        root.draw(&pie)?;

        root.present()?;
    }

    Ok(to_data_uri(svg))
}

/// Average weight per farm with a dashed reference line at the target weight.
pub fn farm_weight_chart(report: &ProductionReport) -> Result<String> {
    let labels: Vec<String> = report.farm_stats.iter().map(|f| f.farm.clone()).collect();
    let values: Vec<f64> = report.farm_stats.iter().map(|f| f.avg_weight).collect();
    bar_chart(
        "Average weight by farm (g)",
        &labels,
        &values,
        Some(TARGET_WEIGHT),
    )
}

/// Average weight per breed, the single chart on the overview page.
pub fn breed_weight_chart(report: &ProductionReport) -> Result<String> {
    let labels: Vec<String> = report.breed_stats.iter().map(|b| b.breed.clone()).collect();
    let values: Vec<f64> = report.breed_stats.iter().map(|b| b.avg_weight).collect();
    bar_chart("Average weight by breed (g)", &labels, &values, None)
}

fn bar_chart(
    title: &str,
    labels: &[String],
    values: &[f64],
    target: Option<f64>,
) -> Result<String> {
    ensure!(!labels.is_empty(), "no rows to chart");

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (800, 500)).into_drawing_area();
        root.fill(&WHITE)?;

        let max_value = values
            .iter()
            .copied()
            .fold(target.unwrap_or(0.0), f64::max)
            .max(1.0)
            * 1.2;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0usize..labels.len(), 0f64..max_value)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len())
            .x_label_formatter(&|idx| labels.get(*idx).cloned().unwrap_or_default())
            .y_desc("grams")
            .draw()?;

        chart.draw_series(values.iter().enumerate().map(|(idx, value)| {
            Rectangle::new([(idx, 0.0), (idx + 1, *value)], BLUE.mix(0.6).filled())
        }))?;

        if let Some(target) = target {
            chart.draw_series(DashedLineSeries::new(
                vec![(0, target), (labels.len(), target)],
                8,
                4,
                RED.stroke_width(2),
            ))?;
        }

        root.present()?;
    }

    Ok(to_data_uri(svg))
}
