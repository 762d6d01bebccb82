use log::debug;

use super::scene::{Anchor, Rgb, Scene, Shape, text_width};
use super::ChartOptions;
use crate::constants::{
    ANNOTATION_OFFSET_PT, AXIS_MARGIN, CHART_TITLE, GRID_ALPHA, X_LABEL, Y_LABEL,
};
use crate::dataset::{Dataset, Method};
use crate::error::{PlotError, Result};

const TICK_LENGTH: f32 = 3.5;
const TICK_PAD: f32 = 3.5;
const SPINE_WIDTH: f32 = 0.8;
const GRID_WIDTH: f32 = 0.8;
const GRID_DASH: (f32, f32) = (3.0, 1.5);
/// Upper bound on y-axis intervals
const MAX_Y_INTERVALS: f64 = 8.0;

/// Linear mapping from data values onto a pixel span
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisScale {
    pub lo: f64,
    pub hi: f64,
    pub px_lo: f32,
    pub px_hi: f32,
}

impl AxisScale {
    pub fn map(&self, v: f64) -> f32 {
        let t = (v - self.lo) / (self.hi - self.lo);
        self.px_lo + (self.px_hi - self.px_lo) * t as f32
    }
}

/// Tick positions from 0 up to `top` with a step of 1, 2, 2.5 or 5 x 10^k.
/// Returns (step, ticks).
pub fn nice_ticks(top: f64) -> (f64, Vec<f64>) {
    let top = if top > 0.0 && top.is_finite() { top } else { 1.0 };
    let raw = top / MAX_Y_INTERVALS;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|&s| s >= raw)
        .unwrap_or(10.0 * magnitude);

    let count = (top / step + 1e-9).floor() as usize;
    let ticks = (0..=count).map(|i| i as f64 * step).collect();
    (step, ticks)
}

/// Decimal places needed to print multiples of `step` exactly
fn tick_decimals(step: f64) -> usize {
    let mut d = 0;
    while d < 6 {
        let scaled = step * 10f64.powi(d as i32);
        if (scaled - scaled.round()).abs() < 1e-9 {
            break;
        }
        d += 1;
    }
    d
}

/// Builds the grouped bar chart: one group per demand level, one bar per
/// rendered method.
pub fn build_bar_chart(dataset: &Dataset, opt: &ChartOptions) -> Result<Scene> {
    dataset.validate()?;

    let total_series = dataset.series.len();
    let n = opt.rendered_series;
    if n == 0 || n > total_series {
        return Err(PlotError::Config(format!(
            "rendered_series must be between 1 and {}, got {}",
            total_series, n
        )));
    }

    let groups = dataset.num_demands();
    let bw = opt.bar_width as f64;
    let m = &opt.margins;

    let title_space = if opt.show_title {
        opt.label_font_size * 1.6
    } else {
        0.0
    };
    let plot_left = m.left;
    let plot_right = opt.width_pt - m.right;
    let plot_top = m.top + title_space;
    let plot_bottom = opt.height_pt - m.bottom;

    // x: bars span [-bw/2, last group + (n-1)*bw + bw/2]
    let x_min = -bw / 2.0;
    let x_max = (groups - 1) as f64 + (n - 1) as f64 * bw + bw / 2.0;
    let x_pad = (x_max - x_min) * AXIS_MARGIN as f64;
    let x_scale = AxisScale {
        lo: x_min - x_pad,
        hi: x_max + x_pad,
        px_lo: plot_left,
        px_hi: plot_right,
    };

    // y: bars stick to zero; margin on top only
    let y_top = dataset.max_time(n) * (1.0 + AXIS_MARGIN as f64);
    let (y_step, y_ticks) = nice_ticks(y_top);
    let y_scale = AxisScale {
        lo: 0.0,
        hi: if y_top > 0.0 { y_top } else { 1.0 },
        px_lo: plot_bottom,
        px_hi: plot_top,
    };
    debug!(
        "chart layout: {} groups x {} bars, y range 0..{:.3}, y step {}",
        groups, n, y_scale.hi, y_step
    );

    let mut scene = Scene::new(opt.width_pt, opt.height_pt);
    scene.rect(0.0, 0.0, opt.width_pt, opt.height_pt, Rgb::WHITE);

    // bars
    let mut bar_tops = Vec::new();
    for (k, series) in dataset.series.iter().take(n).enumerate() {
        let color = Rgb::from_hex(series.method.color())?;
        for (i, &value) in series.times.iter().enumerate() {
            let center = i as f64 + k as f64 * bw;
            let x0 = x_scale.map(center - bw / 2.0);
            let x1 = x_scale.map(center + bw / 2.0);
            let y0 = y_scale.map(value);
            scene.rect(x0, y0, x1 - x0, plot_bottom - y0, color);
            bar_tops.push(((x0 + x1) / 2.0, y0, value));
        }
    }

    // gridlines at the tick positions, drawn over the bars
    let group_center = (total_series - 1) as f64 / 2.0 * bw;
    let x_ticks: Vec<f64> = (0..groups).map(|i| i as f64 + group_center).collect();
    if opt.show_grid {
        for &t in &x_ticks {
            let x = x_scale.map(t);
            push_grid(&mut scene, (x, plot_top), (x, plot_bottom));
        }
        for &t in &y_ticks {
            let y = y_scale.map(t);
            push_grid(&mut scene, (plot_left, y), (plot_right, y));
        }
    }

    // spines
    scene.push(Shape::Rect {
        x: plot_left,
        y: plot_top,
        w: plot_right - plot_left,
        h: plot_bottom - plot_top,
        fill: None,
        stroke: Some(Rgb::BLACK),
        stroke_width: SPINE_WIDTH,
    });

    // x ticks: vehicle counts under each group
    let tick_size = opt.tick_font_size;
    for (&t, vehicles) in x_ticks.iter().zip(&dataset.demand_levels) {
        let x = x_scale.map(t);
        scene.line(
            (x, plot_bottom),
            (x, plot_bottom + TICK_LENGTH),
            Rgb::BLACK,
            SPINE_WIDTH,
        );
        scene.text(
            x,
            plot_bottom + TICK_LENGTH + TICK_PAD + tick_size * 0.8,
            tick_size,
            Anchor::Middle,
            vehicles.to_string(),
        );
    }

    // y ticks
    let decimals = tick_decimals(y_step);
    let mut widest_y_label: f32 = 0.0;
    for &t in &y_ticks {
        let y = y_scale.map(t);
        scene.line(
            (plot_left - TICK_LENGTH, y),
            (plot_left, y),
            Rgb::BLACK,
            SPINE_WIDTH,
        );
        let label = format!("{:.*}", decimals, t);
        widest_y_label = widest_y_label.max(text_width(&label, tick_size));
        scene.text(
            plot_left - TICK_LENGTH - TICK_PAD,
            y + tick_size * 0.35,
            tick_size,
            Anchor::End,
            label,
        );
    }

    // axis labels
    let label_size = opt.label_font_size;
    scene.text(
        (plot_left + plot_right) / 2.0,
        plot_bottom + TICK_LENGTH + TICK_PAD + tick_size + 6.0 + label_size * 0.8,
        label_size,
        Anchor::Middle,
        X_LABEL,
    );
    scene.push(Shape::Text {
        x: plot_left - TICK_LENGTH - TICK_PAD - widest_y_label - 6.0,
        y: (plot_top + plot_bottom) / 2.0,
        size: label_size,
        anchor: Anchor::Middle,
        vertical: true,
        color: Rgb::BLACK,
        content: Y_LABEL.to_string(),
    });

    if opt.show_title {
        scene.text(
            (plot_left + plot_right) / 2.0,
            m.top + label_size,
            label_size,
            Anchor::Middle,
            CHART_TITLE,
        );
    }

    if opt.annotate {
        for (x, y, value) in bar_tops {
            scene.text(
                x,
                y - ANNOTATION_OFFSET_PT,
                tick_size,
                Anchor::Middle,
                value.to_string(),
            );
        }
    }

    if opt.show_legend {
        let methods: Vec<Method> = dataset.series.iter().take(n).map(|s| s.method).collect();
        push_legend(&mut scene, &methods, plot_left, plot_top, tick_size)?;
    }

    Ok(scene)
}

fn push_grid(scene: &mut Scene, (x1, y1): (f32, f32), (x2, y2): (f32, f32)) {
    scene.push(Shape::Line {
        x1,
        y1,
        x2,
        y2,
        color: Rgb::GRID,
        width: GRID_WIDTH,
        dash: Some(GRID_DASH),
        opacity: GRID_ALPHA,
    });
}

/// Legend box in the upper-left corner of the plot area
fn push_legend(
    scene: &mut Scene,
    methods: &[Method],
    plot_left: f32,
    plot_top: f32,
    size: f32,
) -> Result<()> {
    let pad = size * 0.4;
    let row_h = size * 1.3;
    let handle_w = size * 2.0;
    let handle_h = size * 0.7;
    let gap = size * 0.8;

    let text_w = methods
        .iter()
        .map(|m| text_width(&m.to_string(), size))
        .fold(0.0, f32::max);
    let box_w = pad * 2.0 + handle_w + gap + text_w;
    let box_h = pad * 2.0 + row_h * methods.len() as f32;
    let x0 = plot_left + size * 0.5;
    let y0 = plot_top + size * 0.5;

    scene.push(Shape::Rect {
        x: x0,
        y: y0,
        w: box_w,
        h: box_h,
        fill: Some(Rgb::WHITE),
        stroke: Some(Rgb::FRAME),
        stroke_width: 0.8,
    });

    for (i, method) in methods.iter().enumerate() {
        let row_mid = y0 + pad + row_h * (i as f32 + 0.5);
        scene.rect(
            x0 + pad,
            row_mid - handle_h / 2.0,
            handle_w,
            handle_h,
            Rgb::from_hex(method.color())?,
        );
        scene.text(
            x0 + pad + handle_w + gap,
            row_mid + size * 0.35,
            size,
            Anchor::Start,
            method.to_string(),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use strum::IntoEnumIterator;

    /// Palette-colored rects standing on the x axis
    fn bars(scene: &Scene) -> Vec<(f32, f32, f32, f32, Rgb)> {
        let opt = ChartOptions::default();
        let plot_bottom = opt.height_pt - opt.margins.bottom;
        let palette: Vec<Rgb> = Method::iter()
            .map(|m| Rgb::from_hex(m.color()).unwrap())
            .collect();
        scene
            .shapes
            .iter()
            .filter_map(|s| match *s {
                Shape::Rect {
                    x,
                    y,
                    w,
                    h,
                    fill: Some(fill),
                    ..
                } if palette.contains(&fill) && (y + h - plot_bottom).abs() < 1e-3 => {
                    Some((x, y, w, h, fill))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_nice_ticks() {
        let (step, ticks) = nice_ticks(871.03);
        assert_eq!(step, 200.0);
        assert_eq!(ticks, vec![0.0, 200.0, 400.0, 600.0, 800.0]);

        let (step, ticks) = nice_ticks(10.0);
        assert_eq!(step, 2.0);
        assert_eq!(ticks.last(), Some(&10.0));

        let (step, ticks) = nice_ticks(20.0);
        assert_eq!(step, 2.5);
        assert_eq!(ticks.len(), 9);

        let (step, _) = nice_ticks(0.0);
        assert!(step > 0.0);
    }

    #[test]
    fn test_tick_decimals() {
        assert_eq!(tick_decimals(200.0), 0);
        assert_eq!(tick_decimals(2.5), 1);
        assert_eq!(tick_decimals(0.25), 2);
    }

    #[test]
    fn test_axis_scale() {
        let s = AxisScale {
            lo: 0.0,
            hi: 100.0,
            px_lo: 300.0,
            px_hi: 100.0,
        };
        assert_eq!(s.map(0.0), 300.0);
        assert_eq!(s.map(100.0), 100.0);
        assert_eq!(s.map(50.0), 200.0);
    }

    #[test]
    fn test_default_draws_three_of_four_series() {
        let ds = Dataset::embedded(1).unwrap();
        let scene = build_bar_chart(&ds, &ChartOptions::default()).unwrap();

        let drawn = bars(&scene);
        assert_eq!(drawn.len(), 12);
        let dyna = Rgb::from_hex(Method::BfstDynaLane.color()).unwrap();
        assert!(drawn.iter().all(|b| b.4 != dyna));

        let labels: Vec<&str> = scene.texts().collect();
        assert!(labels.contains(&"FIFO"));
        assert!(labels.contains(&"BFST"));
        assert!(!labels.contains(&"BFST-DynaLane"));
        for vehicles in ["10", "50", "100", "200"] {
            assert!(labels.contains(&vehicles));
        }
        assert!(labels.contains(&X_LABEL));
        assert!(labels.contains(&Y_LABEL));
        assert!(!labels.contains(&CHART_TITLE));
    }

    #[test]
    fn test_all_series_and_annotations() {
        let ds = Dataset::embedded(2).unwrap();
        let opt = ChartOptions {
            rendered_series: 4,
            annotate: true,
            show_title: true,
            ..Default::default()
        };
        let scene = build_bar_chart(&ds, &opt).unwrap();

        assert_eq!(bars(&scene).len(), 16);
        let labels: Vec<&str> = scene.texts().collect();
        assert!(labels.contains(&"BFST-DynaLane"));
        assert!(labels.contains(&"769.571"));
        assert!(labels.contains(&"31.9797"));
        assert!(labels.contains(&CHART_TITLE));
    }

    #[test]
    fn test_bar_heights_follow_values() {
        let ds = Dataset::embedded(1).unwrap();
        let scene = build_bar_chart(&ds, &ChartOptions::default()).unwrap();
        let drawn = bars(&scene);

        // FIFO bars come first, in demand order
        let fifo: Vec<f32> = drawn.iter().take(4).map(|b| b.3).collect();
        assert!(fifo.windows(2).all(|w| w[0] < w[1]));

        let ratio = drawn[3].3 / drawn[0].3;
        let expected = (829.554 / 43.6323) as f32;
        assert!((ratio - expected).abs() / expected < 1e-3);

        // bars in a group are adjacent, left to right by method
        assert!(drawn[0].0 < drawn[4].0 && drawn[4].0 < drawn[8].0);
        assert!((drawn[0].0 + drawn[0].2 - drawn[4].0).abs() < 1e-3);
    }

    #[test]
    fn test_grid_toggle() {
        let ds = Dataset::embedded(1).unwrap();
        let dashed = |scene: &Scene| {
            scene
                .shapes
                .iter()
                .filter(|s| matches!(s, Shape::Line { dash: Some(_), .. }))
                .count()
        };

        let with_grid = build_bar_chart(&ds, &ChartOptions::default()).unwrap();
        // 4 vertical + 5 horizontal
        assert_eq!(dashed(&with_grid), 9);

        let opt = ChartOptions {
            show_grid: false,
            ..Default::default()
        };
        assert_eq!(dashed(&build_bar_chart(&ds, &opt).unwrap()), 0);
    }

    #[test]
    fn test_rendered_series_bounds() {
        let ds = Dataset::embedded(1).unwrap();
        for n in [0, 5] {
            let opt = ChartOptions {
                rendered_series: n,
                ..Default::default()
            };
            assert!(matches!(
                build_bar_chart(&ds, &opt),
                Err(PlotError::Config(_))
            ));
        }
    }
}
