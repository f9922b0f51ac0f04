//! Chart rendering
//!
//! Reward curves per experiment, mean-reward comparisons across algorithms
//! and environments, and a total-cost bar chart. Charts are written as SVG
//! into the image directory.

use plotters::prelude::*;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::summary::{CostRow, ReportData, RunLog};
use crate::domain::Algorithm;
use crate::error::{Result, RlcostError};

const LINE_CHART_SIZE: (u32, u32) = (1200, 600);
const BAR_CHART_SIZE: (u32, u32) = (1400, 700);
const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);

/// One labelled line of a chart
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

fn plot_err<E: std::fmt::Debug>(e: E) -> RlcostError {
    RlcostError::Plot(format!("{:?}", e))
}

/// Max, mean and min reward of one experiment
pub fn reward_series(run: &RunLog) -> Vec<Series> {
    let series = |label: &str, pick: fn(&crate::domain::RoundRecord) -> f64| Series {
        label: label.to_string(),
        points: run
            .rounds
            .iter()
            .map(|round| (round.round_id as f64, pick(round)))
            .collect(),
    };

    vec![
        series("Max Reward", |r| r.eval_reward_max),
        series("Mean Reward", |r| r.eval_reward_mean),
        series("Min Reward", |r| r.eval_reward_min),
    ]
}

/// Mean reward of each algorithm on one environment
pub fn env_comparison_series(data: &ReportData, env: &str, algorithms: &[Algorithm]) -> Vec<Series> {
    algorithms
        .iter()
        .filter_map(|&algorithm| data.run(env, algorithm))
        .map(|run| Series {
            label: run.algorithm.to_string(),
            points: run.mean_reward_series(),
        })
        .collect()
}

/// Mean reward of one algorithm on each environment
pub fn model_comparison_series(data: &ReportData, algorithm: Algorithm, envs: &[String]) -> Vec<Series> {
    envs.iter()
        .filter_map(|env| data.run(env, algorithm))
        .map(|run| Series {
            label: run.env.clone(),
            points: run.mean_reward_series(),
        })
        .collect()
}

fn padded(min: f64, max: f64) -> Range<f64> {
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 1.0)..(max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

/// Axis ranges covering every point of every series
pub fn chart_bounds(series: &[Series]) -> (Range<f64>, Range<f64>) {
    let points = series.iter().flat_map(|s| s.points.iter());

    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    (padded(x_min, x_max), padded(y_min, y_max))
}

fn draw_line_chart(path: &Path, title: &str, y_desc: &str, series: &[Series]) -> Result<()> {
    let root = SVGBackend::new(path, LINE_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let (x_range, y_range) = chart_bounds(series);
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Round Number")
        .y_desc(y_desc)
        .draw()
        .map_err(plot_err)?;

    for (idx, line) in series.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        chart
            .draw_series(LineSeries::new(line.points.iter().copied(), color.stroke_width(2)))
            .map_err(plot_err)?
            .label(line.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

fn draw_cost_bars(path: &Path, rows: &[CostRow]) -> Result<()> {
    let root = SVGBackend::new(path, BAR_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let max_cost = rows.iter().map(|row| row.total_cost).fold(0.0, f64::max);
    let y_max = if max_cost > 0.0 { max_cost * 1.1 } else { 1.0 };
    let labels: Vec<&str> = rows.iter().map(|row| row.combination.as_str()).collect();

    let mut chart = ChartBuilder::on(&root)
        .caption("Total Costs for Each Environment-Model Combination", ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(160)
        .y_label_area_size(70)
        .build_cartesian_2d((0..rows.len()).into_segmented(), 0f64..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Environment-Model Combinations")
        .y_desc("Total Cost")
        .x_labels(rows.len())
        .x_label_style(("sans-serif", 12).into_font().transform(FontTransform::Rotate90))
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(idx) => labels.get(*idx).map(|l| l.to_string()).unwrap_or_default(),
            _ => String::new(),
        })
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(SKY_BLUE.filled())
                .margin(10)
                .data(rows.iter().enumerate().map(|(idx, row)| (idx, row.total_cost))),
        )
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

/// Reward curves of one experiment
pub fn render_rewards(imgs_dir: &Path, run: &RunLog) -> Result<PathBuf> {
    let path = imgs_dir.join(format!("{}-{}-rewards.svg", run.env, run.algorithm));
    draw_line_chart(
        &path,
        &format!("Reward Metrics Over Rounds for {}", run.label()),
        "Reward",
        &reward_series(run),
    )?;
    Ok(path)
}

/// Total cost bar chart over every loaded combination
pub fn render_total_costs(imgs_dir: &Path, data: &ReportData) -> Result<Option<PathBuf>> {
    let rows = data.total_costs();
    if rows.is_empty() {
        debug!("No round logs loaded, skipping cost chart");
        return Ok(None);
    }

    let path = imgs_dir.join("total_costs_comparison.svg");
    draw_cost_bars(&path, &rows)?;
    Ok(Some(path))
}

/// Render every chart of the report, returning the written files
pub fn render_all(
    imgs_dir: &Path,
    data: &ReportData,
    envs: &[String],
    algorithms: &[Algorithm],
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(imgs_dir)?;
    let mut written = Vec::new();

    for run in &data.runs {
        written.push(render_rewards(imgs_dir, run)?);
    }

    written.extend(render_total_costs(imgs_dir, data)?);

    for env in envs {
        let series = env_comparison_series(data, env, algorithms);
        if series.is_empty() {
            continue;
        }
        let path = imgs_dir.join(format!("{}-model-comparison.svg", env));
        draw_line_chart(
            &path,
            &format!("Mean Reward Comparison Across Models for {}", env),
            "Mean Reward",
            &series,
        )?;
        written.push(path);
    }

    for &algorithm in algorithms {
        let series = model_comparison_series(data, algorithm, envs);
        if series.is_empty() {
            continue;
        }
        let path = imgs_dir.join(format!("{}-env-comparison.svg", algorithm));
        draw_line_chart(
            &path,
            &format!("Mean Reward Comparison Across Environments for {}", algorithm),
            "Mean Reward",
            &series,
        )?;
        written.push(path);
    }

    info!("Rendered {} charts into {}", written.len(), imgs_dir.display());
    Ok(written)
}
