//! Per-genre yearly aggregates, the data behind the profit bar charts.
//!
//! Rendering stays with the caller; this module only selects rows and
//! computes the bar heights together with the axis limits the charts use.

use crate::error::{Error, Result};
use memchr::memmem::Finder;
use polars::prelude::*;
use std::collections::BTreeMap;

/// Number of grouped years shown per chart.
pub const YEAR_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// mean `worldwide_net`, in dollars
    WorldwideNet,
    /// mean `percent_gross`
    PercentGross,
}

impl Metric {
    pub fn field(self) -> &'static str {
        match self {
            Metric::WorldwideNet => "worldwide_net",
            Metric::PercentGross => "percent_gross",
        }
    }

    /// Fixed upper y-axis limit, so charts of different genres compare.
    pub fn y_max(self) -> f64 {
        match self {
            Metric::WorldwideNet => 5.5e8,
            Metric::PercentGross => 2e3,
        }
    }
}

/// Rows of `df` whose `genres` column contains `genre` as a substring.
pub fn select_genre(df: &DataFrame, genre: &str) -> Result<DataFrame> {
    let finder = Finder::new(genre);
    let genres = df
        .column("genres")
        .map_err(|_| Error::schema("dropped_genres", "genres"))?;

    let mask: BooleanChunked = genres
        .str()?
        .into_iter()
        .map(|g| Some(g.is_some_and(|g| finder.find(g.as_bytes()).is_some())))
        .collect();
    Ok(df.filter(&mask)?)
}

/// Mean of `metric` per `start_year`, years ascending, limited to the first
/// `window` years. Null years and null values are skipped.
pub fn yearly_means(df: &DataFrame, metric: Metric, window: usize) -> Result<Vec<(i64, f64)>> {
    let field = metric.field();
    let years = df
        .column("start_year")
        .map_err(|_| Error::schema("dropped_genres", "start_year"))?
        .cast(&DataType::Int64)?;
    let values = df
        .column(field)
        .map_err(|_| Error::schema("dropped_genres", field))?
        .cast(&DataType::Float64)?;

    let mut sums: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for (year, value) in years.i64()?.into_iter().zip(values.f64()?) {
        if let Some(year) = year {
            let entry = sums.entry(year).or_insert((0.0, 0));
            if let Some(value) = value {
                entry.0 += value;
                entry.1 += 1;
            }
        }
    }

    Ok(sums
        .into_iter()
        .take(window)
        .filter(|(_, (_, n))| *n > 0)
        .map(|(year, (sum, n))| (year, sum / n as f64))
        .collect())
}

/// Optional text decorations for a chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartLabels {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenreChart {
    pub genre: String,
    pub metric: Metric,
    pub bars: Vec<(i64, f64)>,
    pub y_max: f64,
    pub labels: ChartLabels,
}

pub fn genre_chart(df: &DataFrame, genre: &str, metric: Metric) -> Result<GenreChart> {
    let selected = select_genre(df, genre)?;
    log::debug!("{genre}: {} rows", selected.height());
    Ok(GenreChart {
        genre: genre.to_string(),
        metric,
        bars: yearly_means(&selected, metric, YEAR_WINDOW)?,
        y_max: metric.y_max(),
        labels: ChartLabels {
            title: Some(genre.to_string()),
            ..ChartLabels::default()
        },
    })
}

impl GenreChart {
    /// Set any of the title and axis labels; `None` leaves a label unchanged.
    pub fn label(mut self, title: Option<&str>, x_label: Option<&str>, y_label: Option<&str>) -> Self {
        if let Some(title) = title {
            self.labels.title = Some(title.to_string());
        }
        if let Some(x) = x_label {
            self.labels.x_label = Some(x.to_string());
        }
        if let Some(y) = y_label {
            self.labels.y_label = Some(y.to_string());
        }
        self
    }

    /// Horizontal bars, `width` characters for a value at the y limit.
    /// Values are clamped to `[0, y_max]` like the plotted axis.
    pub fn render_text(&self, width: usize) -> String {
        let title = self.labels.title.as_deref().unwrap_or(&self.genre);
        let mut lines = vec![format!(
            "{title} ({}, max {:e})",
            self.metric.field(),
            self.y_max
        )];
        lines.extend(self.labels.y_label.clone());
        for (year, value) in &self.bars {
            let frac = (value / self.y_max).clamp(0.0, 1.0);
            let len = (frac * width as f64).round() as usize;
            lines.push(format!("{year} | {:<width$} {value:.1}", "#".repeat(len)));
        }
        lines.extend(self.labels.x_label.clone());

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod test_genre {
    use super::*;

    fn frame() -> PolarsResult<DataFrame> {
        df!(
            "genres" => ["Action,Drama", "Drama", "Action", "Action,Comedy", "Action"],
            "start_year" => [Some(2012i64), Some(2010), Some(2012), Some(2010), None],
            "worldwide_net" => [100i64, 999, 300, 50, 7],
            "percent_gross" => [Some(10.0), Some(1.0), None, Some(40.0), Some(2.0)]
        )
    }

    #[test]
    fn test_select_genre() -> Result<()> {
        let df = select_genre(&frame()?, "Action")?;
        assert_eq!(df.height(), 4);
        assert_eq!(select_genre(&frame()?, "Horror")?.height(), 0);
        Ok(())
    }

    #[test]
    fn test_yearly_means() -> Result<()> {
        let df = select_genre(&frame()?, "Action")?;
        assert_eq!(
            yearly_means(&df, Metric::WorldwideNet, YEAR_WINDOW)?,
            [(2010, 50.0), (2012, 200.0)]
        );
        // the null percent_gross for 2012 is skipped, not counted as zero
        assert_eq!(
            yearly_means(&df, Metric::PercentGross, YEAR_WINDOW)?,
            [(2010, 40.0), (2012, 10.0)]
        );
        assert_eq!(yearly_means(&df, Metric::WorldwideNet, 1)?, [(2010, 50.0)]);
        Ok(())
    }

    #[test]
    fn test_window_keeps_first_years() -> Result<()> {
        let years: Vec<i64> = (2000..2015).rev().collect();
        let nets: Vec<i64> = years.iter().map(|y| y * 10).collect();
        let df = df!("start_year" => years, "worldwide_net" => nets)?;
        let bars = yearly_means(&df, Metric::WorldwideNet, YEAR_WINDOW)?;
        assert_eq!(bars.len(), 10);
        assert_eq!(bars[0], (2000, 20000.0));
        assert_eq!(bars[9].0, 2009);
        Ok(())
    }

    #[test]
    fn test_genre_chart() -> Result<()> {
        let chart = genre_chart(&frame()?, "Drama", Metric::PercentGross)?;
        assert_eq!(chart.y_max, 2e3);
        assert_eq!(chart.bars, [(2010, 1.0), (2012, 10.0)]);
        assert_eq!(chart.labels.title.as_deref(), Some("Drama"));
        assert_eq!(Metric::WorldwideNet.y_max(), 5.5e8);

        let chart = chart.label(Some("Drama profit"), None, Some("% of budget"));
        let text = chart.render_text(20);
        assert!(text.starts_with("Drama profit"));
        assert!(text.contains("% of budget"));
        assert!(text.contains("2012 | "));
        assert!(text.ends_with('\n'));

        // title, y label, one line per bar, x label
        let chart = chart.label(None, Some("start year"), None);
        let rendered = chart.render_text(20);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "% of budget");
        assert_eq!(lines[2], format!("2010 | {:<20} 1.0", ""));
        assert_eq!(lines[4], "start year");
        Ok(())
    }

    #[test]
    fn test_missing_columns() -> Result<()> {
        let df = df!("start_year" => [2010i64])?;
        assert!(matches!(select_genre(&df, "Action"), Err(Error::Schema { .. })));
        assert!(matches!(
            yearly_means(&df, Metric::PercentGross, YEAR_WINDOW),
            Err(Error::Schema { .. })
        ));
        Ok(())
    }
}
