//! Visualization utilities for Ant System results.
//!
//! Generates SVG renderings of the best tour and of the convergence curve,
//! and a plain-text export for external plotting.

use crate::instance::TspInstance;
use crate::solution::AntSystemResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// SVG visualization generator
pub struct Visualizer {
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Margin
    pub margin: f64,
    /// City radius
    pub node_radius: f64,
    /// Height of the convergence chart
    pub chart_height: f64,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer {
            width: 800.0,
            height: 800.0,
            margin: 50.0,
            node_radius: 5.0,
            chart_height: 400.0,
        }
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate SVG of the cities and the best tour
    pub fn generate_tour_svg(&self, instance: &TspInstance, result: &AntSystemResult) -> String {
        let mut svg = String::new();

        let (min_x, max_x, min_y, max_y) = self.get_bounds(instance);

        let scale_x = (self.width - 2.0 * self.margin) / (max_x - min_x).max(1e-9);
        let scale_y = (self.height - 2.0 * self.margin) / (max_y - min_y).max(1e-9);
        let scale = scale_x.min(scale_y);

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .city {{ fill: #2c3e50; }}
    .start {{ fill: #e74c3c; stroke: #c0392b; stroke-width: 2; }}
    .edge {{ stroke: #3498db; stroke-width: 2; fill: none; }}
    .label {{ font-family: Arial; font-size: 10px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ecf0f1"/>
"##,
            self.width, self.height, self.width, self.height
        ));

        svg.push_str(&format!(
            r##"<text x="{}" y="25" class="title">Instance: {} | Length: {:.2} | Iterations: {}</text>
"##,
            self.margin, instance.name, result.length, result.iterations
        ));

        let transform = |x: f64, y: f64| -> (f64, f64) {
            let tx = self.margin + (x - min_x) * scale;
            let ty = self.height - self.margin - (y - min_y) * scale;
            (tx, ty)
        };

        for w in result.tour.windows(2) {
            let (from, to) = (&instance.cities[w[0]], &instance.cities[w[1]]);
            let (x1, y1) = transform(from.x, from.y);
            let (x2, y2) = transform(to.x, to.y);

            svg.push_str(&format!(
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" class="edge"/>
"#,
                x1, y1, x2, y2
            ));
        }

        for city in &instance.cities {
            let (x, y) = transform(city.x, city.y);
            let class = if city.id == 0 { "start" } else { "city" };

            svg.push_str(&format!(
                r##"<circle cx="{:.2}" cy="{:.2}" r="{}" class="{}"/>
"##,
                x, y, self.node_radius, class
            ));

            if instance.dimension() <= 100 {
                svg.push_str(&format!(
                    r##"<text x="{:.2}" y="{:.2}" class="label" text-anchor="middle">{}</text>
"##,
                    x,
                    y - self.node_radius - 3.0,
                    city.id
                ));
            }
        }

        svg.push_str("</svg>");

        svg
    }

    /// Generate SVG line chart of best length so far per iteration
    pub fn generate_convergence_svg(&self, result: &AntSystemResult) -> String {
        let trace = &result.convergence;
        let mut svg = String::new();

        let width = self.width;
        let height = self.chart_height;
        let margin = self.margin;

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .line {{ stroke: #3498db; stroke-width: 2; fill: none; }}
    .axis {{ stroke: #2c3e50; stroke-width: 1; }}
    .label {{ font-family: Arial; font-size: 12px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ecf0f1"/>
"##,
            width, height, width, height
        ));

        svg.push_str(&format!(
            r#"<text x="{}" y="25" class="title">Convergence - best length {:.2}</text>
"#,
            margin, result.length
        ));

        let plot_width = width - 2.0 * margin;
        let plot_height = height - 2.0 * margin;
        let bottom = height - margin;

        svg.push_str(&format!(
            r##"<line x1="{}" y1="{}" x2="{}" y2="{}" class="axis"/>
<line x1="{}" y1="{}" x2="{}" y2="{}" class="axis"/>
<text x="{}" y="{}" class="label" text-anchor="middle">Iterations</text>
"##,
            margin, bottom, width - margin, bottom,
            margin, margin, margin, bottom,
            margin + plot_width / 2.0, height - 10.0
        ));

        if trace.is_empty() {
            svg.push_str("</svg>");
            return svg;
        }

        let y_max = trace.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let y_min = trace.iter().cloned().fold(f64::INFINITY, f64::min);
        let y_span = (y_max - y_min).max(1e-9);
        let x_scale = plot_width / (trace.len().max(2) - 1) as f64;

        svg.push_str(&format!(
            r##"<text x="{}" y="{}" class="label" text-anchor="end">{:.2}</text>
<text x="{}" y="{}" class="label" text-anchor="end">{:.2}</text>
"##,
            margin - 5.0, margin + 4.0, y_max,
            margin - 5.0, bottom + 4.0, y_min
        ));

        let mut path = String::new();
        for (i, &length) in trace.iter().enumerate() {
            let x = margin + i as f64 * x_scale;
            let y = bottom - (length - y_min) / y_span * plot_height;

            if i == 0 {
                path.push_str(&format!("M {:.2} {:.2}", x, y));
            } else {
                path.push_str(&format!(" L {:.2} {:.2}", x, y));
            }
        }

        svg.push_str(&format!(r##"<path d="{}" class="line"/>
"##, path));

        svg.push_str("</svg>");

        svg
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(svg.as_bytes())?;
        Ok(())
    }

    /// Get coordinate bounds
    fn get_bounds(&self, instance: &TspInstance) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for city in &instance.cities {
            min_x = min_x.min(city.x);
            max_x = max_x.max(city.x);
            min_y = min_y.min(city.y);
            max_y = max_y.max(city.y);
        }

        (min_x, max_x, min_y, max_y)
    }

    /// Export data for external plotting (e.g., matplotlib)
    pub fn export_plot_data(&self, instance: &TspInstance, result: &AntSystemResult) -> String {
        let mut data = String::new();

        data.push_str("# Ant System Result Data\n");
        data.push_str(&format!("# Instance: {}\n", instance.name));
        data.push_str(&format!("# Length: {:.4}\n\n", result.length));

        data.push_str("# Cities: id, x, y\n");
        for city in &instance.cities {
            data.push_str(&format!("{},{},{}\n", city.id, city.x, city.y));
        }

        data.push_str("\n# Tour: sequence of city ids\n");
        let tour_str: Vec<String> = result.tour.iter().map(|n| n.to_string()).collect();
        data.push_str(&tour_str.join(","));
        data.push('\n');

        data.push_str("\n# Convergence: best length per iteration\n");
        let trace_str: Vec<String> = result.convergence.iter().map(|l| format!("{:.4}", l)).collect();
        data.push_str(&trace_str.join(","));
        data.push('\n');

        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_result() -> (TspInstance, AntSystemResult) {
        let instance =
            TspInstance::from_coordinates("test", &[0.0, 0.0, 1.0, 1.0], &[0.0, 1.0, 1.0, 0.0])
                .unwrap();
        let result = AntSystemResult {
            tour: vec![0, 1, 2, 3, 0],
            length: 4.0,
            convergence: vec![4.83, 4.0, 4.0],
            iterations: 3,
            seed: 1,
            computation_time: 0.0,
            algorithm: "AntSystem".to_string(),
        };
        (instance, result)
    }

    #[test]
    fn test_tour_svg() {
        let (instance, result) = create_test_result();
        let viz = Visualizer::new();
        let svg = viz.generate_tour_svg(&instance, &result);

        assert!(svg.contains("<svg"));
        assert!(svg.contains("test"));
        assert_eq!(svg.matches("<line").count(), 4);
        assert_eq!(svg.matches("<circle").count(), 4);
    }

    #[test]
    fn test_convergence_svg() {
        let (_, result) = create_test_result();
        let svg = Visualizer::new().generate_convergence_svg(&result);

        assert!(svg.contains("<path d=\"M "));
        assert_eq!(svg.matches(" L ").count(), 2);
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_plot_data() {
        let (instance, result) = create_test_result();
        let data = Visualizer::new().export_plot_data(&instance, &result);
        assert!(data.contains("0,1,2,3,0"));
        assert!(data.contains("4.8300,4.0000,4.0000"));
    }
}
