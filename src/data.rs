use crate::currency::dollars_column;
use crate::error::{Error, Result};
use crate::source::{Source, read_source};
use polars::prelude::*;
use std::path::Path;

/// Which optional parts of the load to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Derive `foreign_gross = worldwide_gross - domestic_gross` on the budgets table.
    pub foreign_gross: bool,
    /// Also load the Rotten Tomatoes review and info tables.
    pub rotten_tomatoes: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            foreign_gross: true,
            rotten_tomatoes: true,
        }
    }
}

pub struct MovieData {
    /// imdb.title.basics: tconst, primary_title, original_title, start_year, runtime_minutes, genres
    pub title: DataFrame,
    /// imdb.name.basics: nconst, primary_name, known_for_titles
    pub name: DataFrame,
    /// imdb.title.akas, keyed by tconst
    pub akas: DataFrame,
    /// imdb.title.crew: tconst, directors, writers
    pub crew: DataFrame,
    /// imdb.title.principals: tconst, ordering, nconst, category, job, characters
    pub principals: DataFrame,
    /// imdb.title.ratings: tconst, averagerating
    pub ratings: DataFrame,
    pub bom_gross: DataFrame,
    /// tn.movie_budgets after [`clean_budgets`]
    pub budgets: DataFrame,
    pub rt_reviews: Option<DataFrame>,
    pub rt_info: Option<DataFrame>,
}

impl MovieData {
    /// Read every source from `dir` and apply the per-table edits.
    /// Any malformed source aborts the whole load.
    pub fn load(dir: &Path, options: &LoadOptions) -> Result<Self> {
        let title = read_source(dir, Source::TitleBasics)?;
        let name = clean_names(read_source(dir, Source::NameBasics)?)?;
        let akas = clean_akas(read_source(dir, Source::TitleAkas)?)?;
        let crew = read_source(dir, Source::TitleCrew)?;
        let principals = read_source(dir, Source::TitlePrincipals)?;
        let ratings = clean_ratings(read_source(dir, Source::TitleRatings)?)?;
        let bom_gross = read_source(dir, Source::BomMovieGross)?;
        let budgets = clean_budgets(read_source(dir, Source::TnMovieBudgets)?, options)?;

        let (rt_reviews, rt_info) = if options.rotten_tomatoes {
            (
                Some(read_source(dir, Source::RtReviews)?),
                Some(read_source(dir, Source::RtMovieInfo)?),
            )
        } else {
            (None, None)
        };

        Ok(MovieData {
            title,
            name,
            akas,
            crew,
            principals,
            ratings,
            bom_gross,
            budgets,
            rt_reviews,
            rt_info,
        })
    }
}

fn require(df: &DataFrame, table: &str, columns: &[&str]) -> Result<()> {
    for c in columns {
        if df.get_column_index(c).is_none() {
            return Err(Error::schema(table, *c));
        }
    }
    Ok(())
}

fn drop_columns(mut df: DataFrame, table: &str, columns: &[&str]) -> Result<DataFrame> {
    require(&df, table, columns)?;
    for c in columns {
        df = df.drop(c)?;
    }
    Ok(df)
}

fn rename_column(mut df: DataFrame, table: &str, from: &str, to: &str) -> Result<DataFrame> {
    require(&df, table, &[from])?;
    df.rename(from, to.into())?;
    Ok(df)
}

/// Drop the birth, death and profession columns.
pub fn clean_names(df: DataFrame) -> Result<DataFrame> {
    drop_columns(
        df,
        Source::NameBasics.table_name(),
        &["birth_year", "death_year", "primary_profession"],
    )
}

/// Rename `title_id` to the `tconst` key shared by the other IMDB tables.
pub fn clean_akas(df: DataFrame) -> Result<DataFrame> {
    rename_column(df, Source::TitleAkas.table_name(), "title_id", "tconst")
}

pub fn clean_ratings(df: DataFrame) -> Result<DataFrame> {
    drop_columns(df, Source::TitleRatings.table_name(), &["numvotes"])
}

/// Turn the budget table's dollar strings into integers and add the derived
/// profit columns.
///
/// `percent_gross` is `worldwide_net / production_budget * 100`, and null
/// where the budget is zero.
pub fn clean_budgets(mut df: DataFrame, options: &LoadOptions) -> Result<DataFrame> {
    let table = Source::TnMovieBudgets.table_name();
    require(
        &df,
        table,
        &[
            "movie",
            "release_date",
            "production_budget",
            "domestic_gross",
            "worldwide_gross",
        ],
    )?;

    for c in ["worldwide_gross", "domestic_gross", "production_budget"] {
        dollars_column(&mut df, table, c)?;
    }

    let budget: Vec<i64> = df.column("production_budget")?.i64()?.into_no_null_iter().collect();
    let domestic: Vec<i64> = df.column("domestic_gross")?.i64()?.into_no_null_iter().collect();
    let worldwide: Vec<i64> = df.column("worldwide_gross")?.i64()?.into_no_null_iter().collect();

    let net: Vec<i64> = worldwide
        .iter()
        .zip(budget.iter())
        .map(|(w, b)| w - b)
        .collect();
    let percent: Vec<Option<f64>> = net
        .iter()
        .zip(budget.iter())
        .map(|(n, b)| (*b != 0).then(|| *n as f64 / *b as f64 * 100.0))
        .collect();

    df.with_column(Column::new("worldwide_net".into(), net))?;
    if options.foreign_gross {
        let foreign: Vec<i64> = worldwide
            .iter()
            .zip(domestic.iter())
            .map(|(w, d)| w - d)
            .collect();
        df.with_column(Column::new("foreign_gross".into(), foreign))?;
    }
    df.with_column(Column::new("percent_gross".into(), percent))?;

    df.rename("movie", "primary_title".into())?;
    Ok(df.drop("release_date")?)
}
