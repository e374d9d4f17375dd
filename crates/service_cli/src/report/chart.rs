//! Four-panel SVG dashboard.
//!
//! ```text
//! ┌──────────────────────────┬──────────────────────────┐
//! │ SM profitability         │ ABS margin trend         │
//! │ market vs cost bars      │ market / cost lines      │
//! ├──────────────────────────┼──────────────────────────┤
//! │ Scenario ladder          │ Raw material trend       │
//! │ ABS cost vs market bars  │ $/t lines + WTI (right)  │
//! └──────────────────────────┴──────────────────────────┘
//! ```
//!
//! Unknown values leave gaps: bars are omitted and line series break.

use std::fmt::Write as _;
use std::path::Path;

use petro_core::types::Commodity;
use petro_models::{DerivedField, DerivedRow, SeriesKey};

use crate::error::Result;
use crate::pipeline::RunOutput;

use super::{signed_usd, usd, write_file};

const WIDTH: f64 = 1600.0;
const HEIGHT: f64 = 1200.0;
const HEADER: f64 = 60.0;
const FOOTER: f64 = 34.0;
const GUTTER: f64 = 20.0;

const FONT: &str = "DejaVu Sans, Arial, sans-serif";

mod palette {
    pub const BACKGROUND: &str = "#0f172a";
    pub const PANEL: &str = "#1e293b";
    pub const TITLE: &str = "#fbbf24";
    pub const BLUE: &str = "#3b82f6";
    pub const RED: &str = "#ef4444";
    pub const GREEN: &str = "#10b981";
    pub const PURPLE: &str = "#a855f7";
    pub const AXIS_TEXT: &str = "#94a3b8";
    pub const SPINE: &str = "#334155";
    pub const FOOTER: &str = "#475569";
    pub const TEXT: &str = "#e2e8f0";
}

/// Render the dashboard for `output`.
pub fn render(output: &RunOutput) -> String {
    let mut svg = Svg::new(WIDTH, HEIGHT);
    svg.rect(0.0, 0.0, WIDTH, HEIGHT, palette::BACKGROUND, None);

    svg.text(
        WIDTH / 2.0,
        HEADER / 2.0 + 8.0,
        &format!(
            "PETROCHEMICAL COST RISK DASHBOARD  |  WTI ${:.2}  |  {}",
            output.current.crude_realtime(),
            output.generated_at.format("%Y-%m-%d %H:%M UTC")
        ),
        TextStyle::new(22.0, palette::TITLE).middle().bold(),
    );

    let panel_w = (WIDTH - 3.0 * GUTTER) / 2.0;
    let panel_h = (HEIGHT - HEADER - FOOTER - 2.0 * GUTTER) / 2.0;
    let panel = |col: f64, row: f64| Frame {
        x: GUTTER + col * (panel_w + GUTTER),
        y: HEADER + row * (panel_h + GUTTER),
        w: panel_w,
        h: panel_h,
    };

    sm_profitability(&mut svg, panel(0.0, 0.0), output);
    abs_trend(&mut svg, panel(1.0, 0.0), output);
    scenario_ladder(&mut svg, panel(0.0, 1.0), output);
    raw_trend(&mut svg, panel(1.0, 1.0), output);

    svg.text(
        WIDTH / 2.0,
        HEIGHT - FOOTER / 2.0 + 5.0,
        &format!(
            "Source: Yahoo Finance (CL=F) + weekly raw material sheet  |  {}  |  preset {}",
            output.quote.provenance, output.preset
        ),
        TextStyle::new(13.0, palette::FOOTER).middle(),
    );

    svg.finish()
}

/// Render and write the dashboard.
///
/// # Errors
///
/// Returns `CliError::Output` if the file cannot be written.
pub fn write(path: &Path, output: &RunOutput) -> Result<()> {
    write_file(path, render(output).as_bytes())
}

/// Panel 1: SM market vs actual cost.
fn sm_profitability(svg: &mut Svg, frame: Frame, output: &RunOutput) {
    let snap = &output.current;
    let market = snap.adjusted(SeriesKey::Commodity(Commodity::Styrene));
    let cost = snap.adjusted(SeriesKey::Derived(DerivedField::SmCostActual));
    let margin = snap.adjusted(SeriesKey::Derived(DerivedField::SmMarginActual));

    let title_color = if margin < 0.0 { palette::RED } else { palette::GREEN };
    let plot = frame.panel(
        svg,
        &format!("SM Profitability  |  Margin: {}/t", signed_usd(margin)),
        title_color,
    );

    let top = finite_max([market, cost]).unwrap_or(1000.0) * 1.15;
    let y = Scale::new(0.0, top, plot.bottom(), plot.y);
    plot.y_axis(svg, &y, "$/t");

    let bars = [("SM Market", market, palette::BLUE), ("SM Cost", cost, palette::RED)];
    let slot = plot.w / bars.len() as f64;
    let bar_w = slot * 0.5;
    for (i, (label, value, color)) in bars.iter().enumerate() {
        let cx = plot.x + slot * (i as f64 + 0.5);
        if value.is_finite() {
            let top_y = y.map(value.max(0.0));
            svg.rect(cx - bar_w / 2.0, top_y, bar_w, plot.bottom() - top_y, color, Some(0.85));
            svg.text(
                cx,
                top_y - 8.0,
                &usd(*value),
                TextStyle::new(15.0, palette::TEXT).middle().bold(),
            );
        } else {
            svg.text(
                cx,
                plot.bottom() - 10.0,
                "n/a",
                TextStyle::new(14.0, palette::AXIS_TEXT).middle(),
            );
        }
        svg.text(
            cx,
            plot.bottom() + 22.0,
            label,
            TextStyle::new(13.0, palette::AXIS_TEXT).middle(),
        );
    }

    if margin < 0.0 && market.is_finite() {
        let ly = y.map(market);
        svg.line(plot.x, ly, plot.right(), ly, palette::TITLE, 1.5, Some("6,4"));
        svg.text(
            plot.right() - 6.0,
            ly - 8.0,
            "⚠ NEGATIVE MARGIN",
            TextStyle::new(13.0, palette::TITLE).end().bold(),
        );
    }
}

/// Panel 2: ABS market and cost over the trend window.
fn abs_trend(svg: &mut Svg, frame: Frame, output: &RunOutput) {
    let rows = output.window_rows();
    let market: Vec<f64> = rows.iter().map(|r| r.price(Commodity::AbsMarket)).collect();
    let cost: Vec<f64> = rows
        .iter()
        .map(|r| r.derived(DerivedField::AbsCostActual))
        .collect();
    let latest_gap = rows
        .last()
        .map(|r| r.derived(DerivedField::AbsGapActual))
        .unwrap_or(f64::NAN);

    let plot = frame.panel(
        svg,
        &format!(
            "ABS Margin Trend ({}W)  |  Latest gap: {}/t",
            rows.len(),
            signed_usd(latest_gap)
        ),
        palette::TITLE,
    );

    let top = finite_max(market.iter().chain(&cost).copied()).unwrap_or(1500.0) * 1.1;
    let y = Scale::new(0.0, top, plot.bottom(), plot.y);
    plot.y_axis(svg, &y, "$/t");
    let x = plot.x_positions(rows.len());
    plot.date_labels(svg, &x, rows);

    let alert_y = y.map(output.alert_threshold.clamp(0.0, top));
    svg.line(plot.x, alert_y, plot.right(), alert_y, palette::TITLE, 1.0, Some("2,4"));
    svg.text(
        plot.x + 6.0,
        alert_y - 6.0,
        &format!("Alert {}", usd(output.alert_threshold)),
        TextStyle::new(12.0, palette::TITLE),
    );

    svg.series(&x, &market, &y, palette::BLUE, 2.5, None, true);
    svg.series(&x, &cost, &y, palette::RED, 2.5, Some("8,5"), true);

    for ((px, m), c) in x.iter().zip(&market).zip(&cost) {
        if m.is_finite() && c.is_finite() {
            let gap = m - c;
            let color = if gap < output.alert_threshold { palette::RED } else { palette::GREEN };
            svg.text(
                *px,
                y.map((m + c) / 2.0) + 4.0,
                &signed_usd(gap),
                TextStyle::new(11.0, color).middle().bold(),
            );
        }
    }

    svg.legend(
        plot.right() - 150.0,
        plot.y + 10.0,
        &[("ABS Market", palette::BLUE, None), ("ABS Cost", palette::RED, Some("8,5"))],
    );
}

/// Panel 3: ABS cost vs market per scenario.
fn scenario_ladder(svg: &mut Svg, frame: Frame, output: &RunOutput) {
    let plot = frame.panel(svg, "Risk Scenarios: ABS Cost vs Market", palette::TITLE);
    let outcomes = &output.scenarios;

    let pairs: Vec<(f64, f64)> = outcomes
        .iter()
        .map(|o| {
            (
                o.snapshot.adjusted(SeriesKey::Derived(DerivedField::AbsCostActual)),
                o.snapshot.adjusted(SeriesKey::Commodity(Commodity::AbsMarket)),
            )
        })
        .collect();
    let top = finite_max(pairs.iter().flat_map(|(c, m)| [*c, *m])).unwrap_or(1500.0) * 1.2;
    let y = Scale::new(0.0, top, plot.bottom(), plot.y);
    plot.y_axis(svg, &y, "$/t");

    if outcomes.is_empty() {
        return;
    }
    let slot = plot.w / outcomes.len() as f64;
    let bar_w = (slot * 0.35).min(60.0);
    for (i, (outcome, (cost, market))) in outcomes.iter().zip(&pairs).enumerate() {
        let cx = plot.x + slot * (i as f64 + 0.5);
        for (value, offset, color) in [(cost, -1.0, palette::RED), (market, 0.0, palette::BLUE)] {
            if value.is_finite() {
                let top_y = y.map(value.max(0.0));
                svg.rect(
                    cx + offset * bar_w,
                    top_y,
                    bar_w,
                    plot.bottom() - top_y,
                    color,
                    Some(0.85),
                );
            }
        }

        let gap = outcome.abs_gap();
        if gap.is_finite() {
            let color = if gap < output.alert_threshold { palette::RED } else { palette::GREEN };
            let label_y = y.map(finite_max([*cost, *market]).unwrap_or(0.0)) - 10.0;
            svg.text(
                cx,
                label_y,
                &format!("GAP {}", signed_usd(gap)),
                TextStyle::new(12.0, color).middle().bold(),
            );
        }
        svg.text(
            cx,
            plot.bottom() + 18.0,
            &outcome.spec.label,
            TextStyle::new(12.0, palette::AXIS_TEXT).middle(),
        );
        svg.text(
            cx,
            plot.bottom() + 34.0,
            &format!("(${:.0})", outcome.spec.crude_price),
            TextStyle::new(11.0, palette::AXIS_TEXT).middle(),
        );
    }

    svg.legend(
        plot.right() - 150.0,
        plot.y + 10.0,
        &[("ABS Cost", palette::RED, None), ("ABS Market", palette::BLUE, None)],
    );
}

/// Panel 4: raw material prices with crude on a secondary axis.
fn raw_trend(svg: &mut Svg, frame: Frame, output: &RunOutput) {
    let rows = output.window_rows();
    let plot = frame.panel(svg, "Raw Material Trend", palette::TITLE);

    let series: [(&str, Vec<f64>, &str, Option<&str>); 4] = [
        ("BZ", column(rows, SeriesKey::Commodity(Commodity::Benzene)), palette::PURPLE, None),
        ("SM", column(rows, SeriesKey::Commodity(Commodity::Styrene)), palette::BLUE, None),
        (
            "SM Cost",
            column(rows, SeriesKey::Derived(DerivedField::SmCostActual)),
            palette::RED,
            Some("3,4"),
        ),
        ("BD", column(rows, SeriesKey::Commodity(Commodity::Butadiene)), palette::GREEN, None),
    ];
    let crude = column(rows, SeriesKey::Commodity(Commodity::Wti));

    let values = series.iter().flat_map(|(_, v, _, _)| v.iter().copied());
    let (lo, hi) = finite_range(values).unwrap_or((400.0, 1400.0));
    let pad = ((hi - lo) * 0.1).max(20.0);
    let y = Scale::new(lo - pad, hi + pad, plot.bottom(), plot.y);
    plot.y_axis(svg, &y, "$/t");

    let (clo, chi) = finite_range(crude.iter().copied()).unwrap_or((40.0, 100.0));
    let crude_axis = Scale::new(clo.min(40.0), chi.max(100.0), plot.bottom(), plot.y);
    plot.right_axis(svg, &crude_axis, "WTI $/bbl");

    let x = plot.x_positions(rows.len());
    plot.date_labels(svg, &x, rows);

    for (_, values, color, dash) in &series {
        svg.series(&x, values, &y, color, 2.0, *dash, false);
    }
    svg.series(&x, &crude, &crude_axis, palette::TITLE, 2.0, Some("8,5"), false);

    let mut legend: Vec<(&str, &str, Option<&str>)> = series
        .iter()
        .map(|(label, _, color, dash)| (*label, *color, *dash))
        .collect();
    legend.push(("WTI (right)", palette::TITLE, Some("8,5")));
    svg.legend(plot.x + 10.0, plot.y + 10.0, &legend);
}

fn column(rows: &[DerivedRow], key: SeriesKey) -> Vec<f64> {
    rows.iter().map(|r| r.value(key)).collect()
}

fn finite_max(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
}

fn finite_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Linear map from data space to pixels.
#[derive(Clone, Copy, Debug)]
struct Scale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl Scale {
    fn new(d0: f64, d1: f64, r0: f64, r1: f64) -> Self {
        // Flat domains would divide by zero
        let d1 = if (d1 - d0).abs() < f64::EPSILON { d0 + 1.0 } else { d1 };
        Self { d0, d1, r0, r1 }
    }

    fn map(&self, v: f64) -> f64 {
        self.r0 + (v - self.d0) / (self.d1 - self.d0) * (self.r1 - self.r0)
    }

    fn ticks(&self, count: usize) -> impl Iterator<Item = f64> + '_ {
        let step = (self.d1 - self.d0) / count as f64;
        (0..=count).map(move |i| self.d0 + step * i as f64)
    }
}

/// Panel outline.
#[derive(Clone, Copy, Debug)]
struct Frame {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl Frame {
    /// Draw background and title, return the plot area.
    fn panel(&self, svg: &mut Svg, title: &str, title_color: &str) -> Frame {
        svg.rect(self.x, self.y, self.w, self.h, palette::PANEL, None);
        svg.text(
            self.x + self.w / 2.0,
            self.y + 28.0,
            title,
            TextStyle::new(16.0, title_color).middle().bold(),
        );
        let plot = Frame {
            x: self.x + 75.0,
            y: self.y + 50.0,
            w: self.w - 75.0 - 70.0,
            h: self.h - 50.0 - 55.0,
        };
        svg.line(plot.x, plot.bottom(), plot.right(), plot.bottom(), palette::SPINE, 1.0, None);
        svg.line(plot.x, plot.y, plot.x, plot.bottom(), palette::SPINE, 1.0, None);
        plot
    }

    fn right(&self) -> f64 {
        self.x + self.w
    }

    fn bottom(&self) -> f64 {
        self.y + self.h
    }

    fn y_axis(&self, svg: &mut Svg, scale: &Scale, unit: &str) {
        for tick in scale.ticks(5) {
            let ty = scale.map(tick);
            svg.line(self.x, ty, self.right(), ty, palette::SPINE, 0.5, Some("2,3"));
            svg.text(
                self.x - 8.0,
                ty + 4.0,
                &format!("{:.0}", tick),
                TextStyle::new(11.0, palette::AXIS_TEXT).end(),
            );
        }
        svg.text(self.x - 8.0, self.y - 10.0, unit, TextStyle::new(11.0, palette::AXIS_TEXT).end());
    }

    fn right_axis(&self, svg: &mut Svg, scale: &Scale, unit: &str) {
        svg.line(self.right(), self.y, self.right(), self.bottom(), palette::SPINE, 1.0, None);
        for tick in scale.ticks(5) {
            svg.text(
                self.right() + 8.0,
                scale.map(tick) + 4.0,
                &format!("{:.0}", tick),
                TextStyle::new(11.0, palette::TITLE),
            );
        }
        svg.text(self.right() + 8.0, self.y - 10.0, unit, TextStyle::new(11.0, palette::TITLE));
    }

    fn x_positions(&self, n: usize) -> Vec<f64> {
        match n {
            0 => Vec::new(),
            1 => vec![self.x + self.w / 2.0],
            _ => {
                let step = (self.w - 40.0) / (n - 1) as f64;
                (0..n).map(|i| self.x + 20.0 + step * i as f64).collect()
            }
        }
    }

    fn date_labels(&self, svg: &mut Svg, xs: &[f64], rows: &[DerivedRow]) {
        for (x, row) in xs.iter().zip(rows) {
            svg.text(
                *x,
                self.bottom() + 20.0,
                &row.date().format("%m/%d").to_string(),
                TextStyle::new(11.0, palette::AXIS_TEXT).middle(),
            );
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Anchor {
    Start,
    Middle,
    End,
}

#[derive(Clone, Copy, Debug)]
struct TextStyle<'a> {
    size: f64,
    color: &'a str,
    anchor: Anchor,
    bold: bool,
}

impl<'a> TextStyle<'a> {
    fn new(size: f64, color: &'a str) -> Self {
        Self {
            size,
            color,
            anchor: Anchor::Start,
            bold: false,
        }
    }

    fn middle(mut self) -> Self {
        self.anchor = Anchor::Middle;
        self
    }

    fn end(mut self) -> Self {
        self.anchor = Anchor::End;
        self
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// Minimal SVG writer. Non-finite coordinates are dropped, never emitted.
struct Svg {
    buf: String,
}

impl Svg {
    fn new(width: f64, height: f64) -> Self {
        let mut buf = String::new();
        let _ = writeln!(
            buf,
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" "#,
                r#"viewBox="0 0 {w} {h}" font-family="{font}">"#
            ),
            w = width,
            h = height,
            font = FONT
        );
        Self { buf }
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, opacity: Option<f64>) {
        if ![x, y, w, h].iter().all(|v| v.is_finite()) || w < 0.0 || h < 0.0 {
            return;
        }
        let opacity = opacity.map(|o| format!(r#" fill-opacity="{}""#, o)).unwrap_or_default();
        let _ = writeln!(
            self.buf,
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"{}/>"#,
            x, y, w, h, fill, opacity
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn line(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: &str,
        width: f64,
        dash: Option<&str>,
    ) {
        if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
            return;
        }
        let _ = writeln!(
            self.buf,
            concat!(
                r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" "#,
                r#"stroke="{}" stroke-width="{}"{}/>"#
            ),
            x1, y1, x2, y2, stroke, width, dash_attr(dash)
        );
    }

    fn text(&mut self, x: f64, y: f64, content: &str, style: TextStyle<'_>) {
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        let anchor = match style.anchor {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        };
        let weight = if style.bold { r#" font-weight="bold""# } else { "" };
        let _ = writeln!(
            self.buf,
            r#"<text x="{:.1}" y="{:.1}" font-size="{}" fill="{}" text-anchor="{}"{}>{}</text>"#,
            x,
            y,
            style.size,
            style.color,
            anchor,
            weight,
            escape(content)
        );
    }

    /// Polyline broken at unknown values, with optional point markers.
    #[allow(clippy::too_many_arguments)]
    fn series(
        &mut self,
        xs: &[f64],
        values: &[f64],
        scale: &Scale,
        stroke: &str,
        width: f64,
        dash: Option<&str>,
        markers: bool,
    ) {
        let mut segment: Vec<(f64, f64)> = Vec::new();
        let mut segments = Vec::new();
        for (x, v) in xs.iter().zip(values) {
            if v.is_finite() {
                segment.push((*x, scale.map(*v)));
            } else if !segment.is_empty() {
                segments.push(std::mem::take(&mut segment));
            }
        }
        if !segment.is_empty() {
            segments.push(segment);
        }

        for points in &segments {
            if points.len() > 1 {
                let coords: Vec<String> = points
                    .iter()
                    .map(|(x, y)| format!("{:.1},{:.1}", x, y))
                    .collect();
                let _ = writeln!(
                    self.buf,
                    r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{}"{}/>"#,
                    coords.join(" "),
                    stroke,
                    width,
                    dash_attr(dash)
                );
            }
            if markers || points.len() == 1 {
                for (x, y) in points {
                    let _ = writeln!(
                        self.buf,
                        r#"<circle cx="{:.1}" cy="{:.1}" r="4" fill="{}"/>"#,
                        x, y, stroke
                    );
                }
            }
        }
    }

    fn legend(&mut self, x: f64, y: f64, entries: &[(&str, &str, Option<&str>)]) {
        for (i, (label, color, dash)) in entries.iter().enumerate() {
            let ly = y + 10.0 + 18.0 * i as f64;
            self.line(x, ly, x + 24.0, ly, color, 2.5, *dash);
            self.text(x + 30.0, ly + 4.0, label, TextStyle::new(11.0, palette::TEXT));
        }
    }

    fn finish(mut self) -> String {
        self.buf.push_str("</svg>\n");
        self.buf
    }
}

fn dash_attr(dash: Option<&str>) -> String {
    dash.map(|d| format!(r#" stroke-dasharray="{}""#, d))
        .unwrap_or_default()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
