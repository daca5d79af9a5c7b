use std::fmt;
use std::path::PathBuf;
use plotters::prelude::*;
use crate::config::{AnalysisConfig, ChartConfig};
use crate::error::{Error, Result};
use crate::funding::signals::FundingSignals;
use crate::market_data::RawFundingRecord;
use crate::observability::tracing::trace_render;
use crate::types::price::{close_range, PricePoint};
use crate::types::timestamp::{from_millis, to_millis};

const PRICE_COLOR: RGBColor = RGBColor(255, 165, 0);
const FUNDING_COLOR: RGBColor = BLUE;
const OVERBOUGHT_COLOR: RGBColor = RED;
const OVERSOLD_COLOR: RGBColor = GREEN;

const DAY_MS: i64 = 86_400_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NoPriceData,
    NoFundingData,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoPriceData => write!(f, "No BTC price data to plot."),
            SkipReason::NoFundingData => write!(f, "No funding data to plot."),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered {
        path: PathBuf,
        overbought: usize,
        oversold: usize,
    },
    Skipped(SkipReason),
}

/// Price on the left axis, normalized funding on the right, red/green
/// verticals at the overbought/oversold timestamps.
///
/// Nothing is written when either series is empty.
pub fn plot_combined(
    prices: &[PricePoint],
    funding: &[RawFundingRecord],
    analysis: &AnalysisConfig,
    chart: &ChartConfig,
) -> Result<RenderOutcome> {
    let _span = trace_render(&chart.output_path).entered();

    if prices.is_empty() {
        return Ok(skip(SkipReason::NoPriceData));
    }
    if funding.is_empty() {
        return Ok(skip(SkipReason::NoFundingData));
    }

    let signals = FundingSignals::from_raw(funding, analysis)?;
    draw(prices, &signals, chart)?;

    tracing::info!(
        "Chart written to {} ({} price points, {} funding points)",
        chart.output_path.display(),
        prices.len(),
        signals.records.len()
    );

    Ok(RenderOutcome::Rendered {
        path: chart.output_path.clone(),
        overbought: signals.overbought.len(),
        oversold: signals.oversold.len(),
    })
}

fn skip(reason: SkipReason) -> RenderOutcome {
    tracing::warn!("{}", reason);
    RenderOutcome::Skipped(reason)
}

fn render_err<E: fmt::Display>(e: E) -> Error {
    Error::RenderError(e.to_string())
}

fn draw(prices: &[PricePoint], signals: &FundingSignals, config: &ChartConfig) -> Result<()> {
    if let Some(parent) = config.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let (x_min, x_max) = time_span(prices, signals).ok_or(Error::EmptyInput)?;
    let (price_lo, price_hi) = close_range(prices)
        .map(|(lo, hi)| padded(lo, hi))
        .ok_or(Error::EmptyInput)?;
    let (z_lo, z_hi) = normalized_range(signals).ok_or(Error::EmptyInput)?;

    let root = SVGBackend::new(&config.output_path, (config.width, config.height))
        .into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&config.title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .right_y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max, price_lo..price_hi)
        .map_err(render_err)?
        .set_secondary_coord(x_min..x_max, z_lo..z_hi);

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("BTC Price (USD)")
        .x_label_formatter(&format_date_label)
        .label_style(("sans-serif", 12))
        .draw()
        .map_err(render_err)?;

    chart
        .configure_secondary_axes()
        .y_desc("Normalized Funding Rate")
        .draw()
        .map_err(render_err)?;

    // Markers go first so both lines stay on top of them.
    let marker = |millis: i64, color: RGBColor| {
        PathElement::new(vec![(millis, z_lo), (millis, z_hi)], color.mix(0.7).stroke_width(1))
    };
    chart
        .draw_secondary_series(signals.overbought.iter().map(|ts| marker(to_millis(ts), OVERBOUGHT_COLOR)))
        .map_err(render_err)?;
    chart
        .draw_secondary_series(signals.oversold.iter().map(|ts| marker(to_millis(ts), OVERSOLD_COLOR)))
        .map_err(render_err)?;

    chart
        .draw_secondary_series(LineSeries::new(
            signals.records.iter().map(|r| (to_millis(&r.timestamp()), r.normalized)),
            FUNDING_COLOR.stroke_width(1),
        ))
        .map_err(render_err)?
        .label("Normalized Funding Rate")
        .legend(|(x, y)| legend_line(x, y, FUNDING_COLOR));

    chart
        .draw_series(LineSeries::new(
            prices.iter().map(|p| (to_millis(&p.timestamp), p.close)),
            PRICE_COLOR.stroke_width(2),
        ))
        .map_err(render_err)?
        .label("BTC Close Price")
        .legend(|(x, y)| legend_line(x, y, PRICE_COLOR));

    // Legend-only entries for the marker colours.
    for (label, color) in [
        ("Overbought (Z > 1.96)", OVERBOUGHT_COLOR),
        ("Oversold (Z < -1.96)", OVERSOLD_COLOR),
    ] {
        chart
            .draw_secondary_series(LineSeries::new(Vec::<(i64, f64)>::new(), color.stroke_width(2)))
            .map_err(render_err)?
            .label(label)
            .legend(move |(x, y)| legend_line(x, y, color));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

fn legend_line(x: i32, y: i32, color: RGBColor) -> PathElement<(i32, i32)> {
    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
}

/// Millisecond x-range covering both series, at least one day wide.
fn time_span(prices: &[PricePoint], signals: &FundingSignals) -> Option<(i64, i64)> {
    let times = prices
        .iter()
        .map(|p| to_millis(&p.timestamp))
        .chain(signals.records.iter().map(|r| to_millis(&r.timestamp())));

    let (lo, hi) = times.fold(None, |acc: Option<(i64, i64)>, t| match acc {
        None => Some((t, t)),
        Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
    })?;
    Some(if hi > lo { (lo, hi) } else { (lo - DAY_MS, hi + DAY_MS) })
}

fn normalized_range(signals: &FundingSignals) -> Option<(f64, f64)> {
    let values = signals.records.iter().map(|r| r.normalized);

    let (lo, hi) = values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })?;
    Some(padded(lo, hi))
}

/// Adds 5% headroom on both sides; a flat series gets ±1.
fn padded(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    if span > 0.0 {
        (lo - span * 0.05, hi + span * 0.05)
    } else {
        (lo - 1.0, hi + 1.0)
    }
}

fn format_date_label(millis: &i64) -> String {
    from_millis(*millis)
        .map(|ts| ts.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
