use crate::data::MovieData;
use crate::error::{Error, Result};
use crate::join::{inner_join, left_join};
use polars::prelude::*;
use std::time::Instant;

/// The analysis-ready tables derived from a [`MovieData`].
pub struct Analysis {
    /// titles with a budget, joined with their rating
    pub joined_table: DataFrame,
    /// `joined_table` rows with positive domestic and worldwide gross
    pub no_zero_gross: DataFrame,
    /// `no_zero_gross` joined one-to-one with directors and writers
    pub crew_grosses: DataFrame,
    /// `no_zero_gross` joined one-to-many with principal roles
    pub principal_grosses: DataFrame,
    /// `no_zero_gross` rows that list at least one genre
    pub dropped_genres: DataFrame,
}

impl Analysis {
    pub fn build(db: &MovieData) -> Result<Self> {
        let t = &db.title;
        let tn = &db.budgets;
        let r = &db.ratings;

        let start = Instant::now();

        let joined = left_join(t, tn, "primary_title")?;
        let joined = left_join(&joined, r, "tconst")?;
        let mut joined_table = drop_nulls(&joined, "joined_table", "production_budget")?;
        if joined_table.get_column_index("id").is_some() {
            joined_table = joined_table.drop("id")?;
        }
        log::debug!("joined,{:}", start.elapsed().as_secs_f32());

        let no_zero_gross = positive_gross(&joined_table)?;
        let crew_grosses = inner_join(&no_zero_gross, &db.crew, "tconst")?;
        let principal_grosses = inner_join(&no_zero_gross, &db.principals, "tconst")?;
        let dropped_genres = drop_nulls(&no_zero_gross, "no_zero_gross", "genres")?;
        log::debug!("derived,{:}", start.elapsed().as_secs_f32());

        let analysis = Analysis {
            joined_table,
            no_zero_gross,
            crew_grosses,
            principal_grosses,
            dropped_genres,
        };
        for (name, rows) in analysis.summary() {
            log::info!("{name}: {rows} rows");
        }
        Ok(analysis)
    }

    /// Row count of each derived table.
    pub fn summary(&self) -> [(&'static str, usize); 5] {
        [
            ("joined_table", self.joined_table.height()),
            ("no_zero_gross", self.no_zero_gross.height()),
            ("crew_grosses", self.crew_grosses.height()),
            ("principal_grosses", self.principal_grosses.height()),
            ("dropped_genres", self.dropped_genres.height()),
        ]
    }
}

/// Rows of `df` where `column` is not null. `table` names `df` in errors.
pub fn drop_nulls(df: &DataFrame, table: &str, column: &str) -> Result<DataFrame> {
    let c = df
        .column(column)
        .map_err(|_| Error::schema(table, column))?;
    Ok(df.filter(&c.is_not_null())?)
}

/// Rows with strictly positive `domestic_gross` and `worldwide_gross`.
pub fn positive_gross(df: &DataFrame) -> Result<DataFrame> {
    let table = "joined_table";
    let domestic = df
        .column("domestic_gross")
        .map_err(|_| Error::schema(table, "domestic_gross"))?
        .cast(&DataType::Int64)?;
    let worldwide = df
        .column("worldwide_gross")
        .map_err(|_| Error::schema(table, "worldwide_gross"))?
        .cast(&DataType::Int64)?;

    let mask: BooleanChunked = domestic
        .i64()?
        .into_iter()
        .zip(worldwide.i64()?)
        .map(|(d, w)| Some(matches!((d, w), (Some(d), Some(w)) if d > 0 && w > 0)))
        .collect();
    Ok(df.filter(&mask)?)
}
