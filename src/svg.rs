//! Minimal SVG writer for diagram models.
//!
//! The output is meant for quick inspection; publication figures are
//! expected to be drawn from the JSON model.

use crate::diagram::{Diagram, PieChart, UpSetPlot, VennDiagram};

const FONT: &str = "Arial, sans-serif";
const VENN_SIZE: f64 = 480.0;
const MARGIN: f64 = 40.0;
const BAR_AREA: f64 = 220.0;
const BOX_AREA: f64 = 160.0;
const COLUMN_WIDTH: f64 = 28.0;
const ROW_HEIGHT: f64 = 26.0;
const SET_LABEL_WIDTH: f64 = 120.0;
const SET_BAR_WIDTH: f64 = 140.0;
const PIE_RADIUS: f64 = 120.0;

/// Render a diagram to an SVG document.
pub fn render(diagram: &Diagram) -> String {
    match diagram {
        Diagram::Venn(v) => render_venn(v),
        Diagram::UpSet(u) => render_upset(u),
        Diagram::Pie(p) => render_pie(p),
    }
}

/// Append one markup element on its own line.
fn element(svg: &mut String, markup: String) {
    svg.push_str(&markup);
    svg.push('\n');
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn open(svg: &mut String, width: f64, height: f64) {
    element(
        svg,
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}" font-family="{FONT}">"#,
            w = width,
            h = height
        ),
    );
    element(svg, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##.to_string());
}

fn text(svg: &mut String, x: f64, y: f64, size: u32, anchor: &str, content: &str) {
    element(
        svg,
        format!(
            r#"<text x="{x:.2}" y="{y:.2}" font-size="{size}" text-anchor="{anchor}" dominant-baseline="middle">{}</text>"#,
            escape(content)
        ),
    );
}

fn render_venn(venn: &VennDiagram) -> String {
    let (mut x0, mut y0, mut x1, mut y1) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for c in &venn.circles {
        x0 = x0.min(c.cx - c.r);
        y0 = y0.min(c.cy - c.r);
        x1 = x1.max(c.cx + c.r);
        y1 = y1.max(c.cy + c.r);
    }
    let span = (x1 - x0).max(y1 - y0).max(f64::EPSILON);
    let scale = (VENN_SIZE - 2.0 * MARGIN) / span;
    let px = |x: f64| MARGIN + (x - x0) * scale;
    let py = |y: f64| MARGIN + (y - y0) * scale;

    let mut svg = String::new();
    open(&mut svg, VENN_SIZE, VENN_SIZE);
    for (circle, set) in venn.circles.iter().zip(&venn.sets) {
        element(
            &mut svg,
            format!(
                r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" fill-opacity="0.4" stroke="{}" stroke-width="2"/>"#,
                px(circle.cx),
                py(circle.cy),
                circle.r * scale,
                set.color,
                set.color
            ),
        );
        text(
            &mut svg,
            px(circle.cx),
            (py(circle.cy - circle.r) - 14.0).max(12.0),
            16,
            "middle",
            &set.name,
        );
    }
    for region in &venn.regions {
        text(&mut svg, px(region.x), py(region.y), 14, "middle", &region.label);
    }
    svg.push_str("</svg>\n");
    svg
}

fn render_upset(plot: &UpSetPlot) -> String {
    let n_groups = plot.groups.len() as f64;
    let n_sets = plot.sets.len() as f64;
    let box_area = if plot.summary.is_some() { BOX_AREA } else { 0.0 };
    let left = MARGIN + SET_LABEL_WIDTH + SET_BAR_WIDTH;
    let bars_top = MARGIN + box_area;
    let matrix_top = bars_top + BAR_AREA + 10.0;
    let width = left + n_groups * COLUMN_WIDTH + MARGIN;
    let height = matrix_top + n_sets * ROW_HEIGHT + MARGIN;

    let max_group = plot.groups.iter().map(|g| g.size).max().unwrap_or(1).max(1) as f64;
    let max_set = plot.sets.iter().map(|s| s.size).max().unwrap_or(1).max(1) as f64;
    let col_x = |i: usize| left + (i as f64 + 0.5) * COLUMN_WIDTH;
    let row_y = |i: usize| matrix_top + (i as f64 + 0.5) * ROW_HEIGHT;

    let mut svg = String::new();
    open(&mut svg, width, height);

    // Intersection bars.
    for (i, group) in plot.groups.iter().enumerate() {
        let h = BAR_AREA * group.size as f64 / max_group;
        element(
            &mut svg,
            format!(
                r##"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="#333333"/>"##,
                col_x(i) - COLUMN_WIDTH * 0.35,
                bars_top + BAR_AREA - h,
                COLUMN_WIDTH * 0.7,
                h
            ),
        );
        text(
            &mut svg,
            col_x(i),
            bars_top + BAR_AREA - h - 8.0,
            10,
            "middle",
            &group.size.to_string(),
        );
    }

    // Summary boxplots share one value axis across groups.
    if let Some(panel) = &plot.summary {
        let stats: Vec<_> = plot.groups.iter().filter_map(|g| g.summary.as_ref()).collect();
        let lo = stats.iter().map(|s| s.min).fold(f64::INFINITY, f64::min);
        let hi = stats.iter().map(|s| s.max).fold(f64::NEG_INFINITY, f64::max);
        let range = if hi > lo { hi - lo } else { 1.0 };
        let vy = |v: f64| MARGIN + BOX_AREA - 10.0 - (v - lo) / range * (BOX_AREA - 20.0);
        text(
            &mut svg,
            left - 10.0,
            MARGIN + BOX_AREA / 2.0,
            12,
            "end",
            &format!("{} ({})", panel.var, panel.reducer),
        );
        for (i, group) in plot.groups.iter().enumerate() {
            let Some(s) = &group.summary else { continue };
            let x = col_x(i);
            let w = COLUMN_WIDTH * 0.3;
            element(
                &mut svg,
                format!(
                    r##"<line x1="{x:.2}" x2="{x:.2}" y1="{:.2}" y2="{:.2}" stroke="#333333"/>"##,
                    vy(s.lower_whisker),
                    vy(s.upper_whisker)
                ),
            );
            element(
                &mut svg,
                format!(
                    r##"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="#ffffff" stroke="#333333"/>"##,
                    x - w,
                    vy(s.q3),
                    2.0 * w,
                    (vy(s.q1) - vy(s.q3)).max(0.5)
                ),
            );
            element(
                &mut svg,
                format!(
                    r##"<line x1="{:.2}" x2="{:.2}" y1="{m:.2}" y2="{m:.2}" stroke="#333333" stroke-width="2"/>"##,
                    x - w,
                    x + w,
                    m = vy(s.median)
                ),
            );
            for outlier in &s.outliers {
                element(
                    &mut svg,
                    format!(
                        r##"<circle cx="{x:.2}" cy="{:.2}" r="1.5" fill="#333333"/>"##,
                        vy(*outlier)
                    ),
                );
            }
        }
    }

    // Set rows: name, size bar, membership dots.
    for (r, set) in plot.sets.iter().enumerate() {
        let y = row_y(r);
        text(&mut svg, MARGIN + SET_LABEL_WIDTH - 6.0, y, 12, "end", &set.name);
        let w = SET_BAR_WIDTH * 0.9 * set.size as f64 / max_set;
        element(
            &mut svg,
            format!(
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"/>"#,
                left - w - 6.0,
                y - ROW_HEIGHT * 0.3,
                w,
                ROW_HEIGHT * 0.6,
                set.color
            ),
        );
        for (i, group) in plot.groups.iter().enumerate() {
            let member = group.sets.iter().any(|s| s == &set.name);
            let fill = if member { "#333333" } else { "#dddddd" };
            element(
                &mut svg,
                format!(
                    r#"<circle cx="{:.2}" cy="{y:.2}" r="6" fill="{fill}"/>"#,
                    col_x(i)
                ),
            );
        }
    }

    // Connect member dots within each column.
    for (i, group) in plot.groups.iter().enumerate() {
        let rows: Vec<usize> = plot
            .sets
            .iter()
            .enumerate()
            .filter(|(_, s)| group.sets.contains(&s.name))
            .map(|(r, _)| r)
            .collect();
        if let (Some(first), Some(last)) = (rows.first(), rows.last()) {
            if first != last {
                element(
                    &mut svg,
                    format!(
                        r##"<line x1="{x:.2}" x2="{x:.2}" y1="{:.2}" y2="{:.2}" stroke="#333333" stroke-width="2"/>"##,
                        row_y(*first),
                        row_y(*last),
                        x = col_x(i)
                    ),
                );
            }
        }
    }

    svg.push_str("</svg>\n");
    svg
}

fn render_pie(chart: &PieChart) -> String {
    let cell = 2.0 * (PIE_RADIUS + MARGIN);
    let width = cell * chart.facets.len().max(1) as f64;
    let height = cell + 20.0;

    let mut svg = String::new();
    open(&mut svg, width, height);

    for (f, facet) in chart.facets.iter().enumerate() {
        let cx = cell * (f as f64 + 0.5);
        let cy = 20.0 + cell / 2.0;
        if let Some(label) = &facet.label {
            text(&mut svg, cx, 16.0, 14, "middle", label);
        }
        let point = |angle: f64, r: f64| (cx + r * angle.sin(), cy - r * angle.cos());

        for slice in &facet.slices {
            if slice.proportion >= 1.0 {
                element(
                    &mut svg,
                    format!(
                        r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{PIE_RADIUS:.2}" fill="{}"/>"#,
                        slice.color
                    ),
                );
            } else {
                let (x0, y0) = point(slice.start_angle, PIE_RADIUS);
                let (x1, y1) = point(slice.end_angle, PIE_RADIUS);
                let large = if slice.end_angle - slice.start_angle > std::f64::consts::PI {
                    1
                } else {
                    0
                };
                element(
                    &mut svg,
                    format!(
                        r##"<path d="M {cx:.2} {cy:.2} L {x0:.2} {y0:.2} A {r:.2} {r:.2} 0 {large} 1 {x1:.2} {y1:.2} Z" fill="{}" stroke="#ffffff"/>"##,
                        slice.color,
                        r = PIE_RADIUS
                    ),
                );
            }
            if let Some(label) = &slice.label {
                let mid = 0.5 * (slice.start_angle + slice.end_angle);
                let (lx, ly) = point(mid, PIE_RADIUS * 0.65);
                text(&mut svg, lx, ly, 11, "middle", label);
            }
        }
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::overlaps::{plot_overlaps, Collections};
    use crate::commands::pie::{plot_pie, PieConfig};
    use crate::config::{OverlapConfig, PlotType};
    use crate::interval::{Attribute, BedRecord};

    fn tokens(s: &str) -> Vec<String> {
        s.chars().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_venn_svg() {
        let input = Collections::tokens([("a&b", tokens("abc")), ("c", tokens("cd"))]);
        let diagram = plot_overlaps(&input, &OverlapConfig::new()).unwrap();
        let svg = render(&diagram);

        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains("a&amp;b"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_upset_svg_has_one_bar_per_group() {
        let input = Collections::tokens([
            ("a", tokens("abc")),
            ("b", tokens("cd")),
            ("c", tokens("e")),
            ("d", tokens("ae")),
        ]);
        let config = OverlapConfig::new().with_type(PlotType::UpSet);
        let diagram = plot_overlaps(&input, &config).unwrap();
        let groups = diagram.as_upset().unwrap().groups.len();
        let svg = render(&diagram);

        assert!(svg.matches("fill=\"#333333\"/>").count() >= groups);
        assert!(svg.contains(">a</text>"));
    }

    #[test]
    fn test_one_element_per_line() {
        let scored = |start: u64, end: u64, v: f64| {
            BedRecord::new("chr1", start, end).with_attribute("score", Attribute::Numeric(v))
        };
        let input = Collections::intervals([
            ("a", vec![scored(0, 100, 1.0), scored(50, 150, 9.0), scored(400, 500, 2.0)]),
            ("b", vec![scored(120, 200, 3.0), scored(900, 950, 4.0)]),
        ]);
        let config = OverlapConfig::new().with_type(PlotType::UpSet).with_var("score");
        let svg = render(&plot_overlaps(&input, &config).unwrap());

        assert!(svg.ends_with("</svg>\n"));
        for line in svg.lines() {
            assert!(line.starts_with('<') && line.ends_with('>'), "{}", line);
        }
        assert!(svg.contains("score (mean)"));
    }

    #[test]
    fn test_pie_svg_single_category_is_circle() {
        let records = vec![
            BedRecord::new("chr1", 0, 10).with_attribute("region", Attribute::Text("promoter".into())),
        ];
        let diagram = plot_pie(&records, &PieConfig::new("region")).unwrap();
        let svg = render(&diagram);

        assert!(svg.contains("<circle"));
        assert!(!svg.contains("<path"));
    }
}
