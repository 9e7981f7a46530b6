//! Terminal rendering of the sample weather table and its line chart.
//!
//! Presentation only: the data is a fixed sample and is not read from the
//! pipeline.

use colored::Colorize;
use std::fmt;

const CHART_HEIGHT: usize = 5;
const COLUMN_WIDTH: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    pub date: &'static str,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
}

pub fn sample_data() -> Vec<SampleRow> {
    vec![
        SampleRow { date: "2024-12-18", temperature: 22.0, humidity: 65.0, pressure: 1012.0 },
        SampleRow { date: "2024-12-19", temperature: 21.0, humidity: 60.0, pressure: 1013.0 },
        SampleRow { date: "2024-12-20", temperature: 25.0, humidity: 70.0, pressure: 1011.0 },
    ]
}

/// Title, table and chart in one block.
pub fn render(rows: &[SampleRow]) -> String {
    Dashboard(rows).to_string()
}

pub fn render_table(rows: &[SampleRow]) -> String {
    Table(rows).to_string()
}

pub fn render_chart(rows: &[SampleRow]) -> String {
    Chart(rows).to_string()
}

struct Dashboard<'a>(&'a [SampleRow]);

impl fmt::Display for Dashboard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "Weather Data Anomaly Detection".bright_green().bold())?;
        writeln!(f)?;
        writeln!(f, "{}", "Sample Weather Data".bold())?;
        write!(f, "{}", Table(self.0))?;
        writeln!(f)?;
        write!(f, "{}", Chart(self.0))
    }
}

struct Table<'a>(&'a [SampleRow]);

impl fmt::Display for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header =
            format!("{:<12}{:>13}{:>10}{:>10}", "Date", "Temperature", "Humidity", "Pressure");
        writeln!(f, "{}", header.bold())?;
        writeln!(f, "{}", "─".repeat(header.chars().count()).bright_black())?;

        for row in self.0 {
            writeln!(
                f,
                "{:<12}{:>13}{:>10}{:>10}",
                row.date,
                format_value(row.temperature),
                format_value(row.humidity),
                format_value(row.pressure),
            )?;
        }
        Ok(())
    }
}

/// One panel per measurement, each scaled to its own range, indexed by date.
struct Chart<'a>(&'a [SampleRow]);

impl fmt::Display for Chart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let series: [(&str, fn(&SampleRow) -> f64); 3] = [
            ("Temperature", |r| r.temperature),
            ("Humidity", |r| r.humidity),
            ("Pressure", |r| r.pressure),
        ];

        for (name, value_of) in series {
            let values: Vec<f64> = self.0.iter().map(value_of).collect();
            writeln!(f, "{}", name.cyan().bold())?;
            write_series(f, &values)?;
            write_axis(f, self.0)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

fn write_series(f: &mut fmt::Formatter<'_>, values: &[f64]) -> fmt::Result {
    if values.is_empty() {
        return Ok(());
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let levels: Vec<usize> = values.iter().map(|v| level_of(*v, min, max)).collect();

    for level in (0..CHART_HEIGHT).rev() {
        let label = min + (max - min) * level as f64 / (CHART_HEIGHT - 1) as f64;
        let mut line = String::new();
        for (i, l) in levels.iter().enumerate() {
            let cell = if *l == level { "●" } else { " " };
            let pad = if i == 0 { COLUMN_WIDTH / 2 } else { COLUMN_WIDTH - 1 };
            line.push_str(&" ".repeat(pad - 1));
            line.push_str(cell);
        }
        writeln!(f, "{:>8.1} ┤{}", label, line.trim_end())?;
    }
    Ok(())
}

fn write_axis(f: &mut fmt::Formatter<'_>, rows: &[SampleRow]) -> fmt::Result {
    let axis = format!("{:>8} └{}", "", "─".repeat(COLUMN_WIDTH * rows.len()));
    writeln!(f, "{}", axis.bright_black())?;

    let dates: String = rows
        .iter()
        .map(|row| format!("{:^width$}", row.date, width = COLUMN_WIDTH - 1))
        .collect();
    writeln!(f, "{}", format!("{:>10}{dates}", "").trim_end())
}

fn level_of(value: f64, min: f64, max: f64) -> usize {
    if max <= min {
        return CHART_HEIGHT / 2;
    }
    let scaled = (value - min) / (max - min) * (CHART_HEIGHT - 1) as f64;
    scaled.round() as usize
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 { format!("{v:.0}") } else { format!("{v:.1}") }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn sample_has_three_consecutive_days() {
        let rows = sample_data();
        let dates: Vec<_> = rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, ["2024-12-18", "2024-12-19", "2024-12-20"]);
    }

    #[test]
    fn table_lists_every_row() {
        plain();
        let table = render_table(&sample_data());
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("Temperature"));
        assert!(lines[2].starts_with("2024-12-18"));
        assert!(lines[4].contains("1011"));
    }

    #[test]
    fn level_of_spans_chart_height() {
        assert_eq!(level_of(21.0, 21.0, 25.0), 0);
        assert_eq!(level_of(25.0, 21.0, 25.0), CHART_HEIGHT - 1);
        assert_eq!(level_of(23.0, 21.0, 25.0), 2);
        assert_eq!(level_of(5.0, 5.0, 5.0), CHART_HEIGHT / 2);
    }

    #[test]
    fn chart_plots_one_point_per_date_and_series() {
        plain();
        let chart = render_chart(&sample_data());

        assert_eq!(chart.matches('●').count(), 9);
        assert!(chart.contains("Humidity"));
        assert!(chart.contains("2024-12-20"));
    }

    #[test]
    fn render_includes_title_table_and_chart() {
        plain();
        let out = render(&sample_data());

        assert!(out.starts_with("Weather Data Anomaly Detection"));
        assert!(out.contains("Sample Weather Data"));
        assert!(out.contains("Pressure"));
    }

    #[test]
    fn empty_rows_render_axes_without_points() {
        plain();
        let chart = render_chart(&[]);

        assert_eq!(chart.matches('●').count(), 0);
        assert_eq!(chart.matches('└').count(), 3);
        assert!(chart.contains("Temperature"));
    }
}
