use crate::error::{Error, Result};
use polars::prelude::*;
use rustc_hash::FxHashMap as HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinKind {
    Left,
    Inner,
}

/// Keep every row of `left`; unmatched rows get nulls in the `right` columns.
pub fn left_join(left: &DataFrame, right: &DataFrame, key: &str) -> Result<DataFrame> {
    hash_join(left, right, key, JoinKind::Left)
}

/// Keep only the rows of `left` with at least one match in `right`.
pub fn inner_join(left: &DataFrame, right: &DataFrame, key: &str) -> Result<DataFrame> {
    hash_join(left, right, key, JoinKind::Inner)
}

/// Equi-join on a single key column.
///
/// Output rows follow `left` row order; a left row matching several right
/// rows is repeated once per match, in `right` row order. Null keys never
/// match. The key column is taken from `left` only, and right columns whose
/// names are already used on the left are suffixed with `_right`.
fn hash_join(
    left: &DataFrame,
    right: &DataFrame,
    key: &str,
    kind: JoinKind,
) -> Result<DataFrame> {
    let l_key = key_column(left, key, "left")?;
    let r_key = key_column(right, key, "right")?;

    let mut r_m: HashMap<&str, Vec<IdxSize>> = HashMap::default();
    for (idx, k) in r_key.str()?.into_iter().enumerate() {
        if let Some(k) = k {
            r_m.entry(k).or_default().push(idx as IdxSize);
        }
    }

    let mut l_idx: Vec<IdxSize> = Vec::with_capacity(left.height());
    let mut r_idx: Vec<Option<IdxSize>> = Vec::with_capacity(left.height());
    for (idx, k) in l_key.str()?.into_iter().enumerate() {
        match k.and_then(|k| r_m.get(k)) {
            Some(matches) => {
                for m in matches {
                    l_idx.push(idx as IdxSize);
                    r_idx.push(Some(*m));
                }
            }
            None if kind == JoinKind::Left => {
                l_idx.push(idx as IdxSize);
                r_idx.push(None);
            }
            None => {}
        }
    }

    let l_take = IdxCa::from_vec("".into(), l_idx);
    let r_take = IdxCa::from_iter_options("".into(), r_idx.into_iter());

    let mut columns = left.take(&l_take)?.take_columns();
    let r_rest = right.drop(key)?.take(&r_take)?;
    for c in r_rest.take_columns() {
        if left.get_column_index(c.name()).is_some() {
            let name = format!("{}_right", c.name());
            columns.push(c.with_name(name.into()));
        } else {
            columns.push(c);
        }
    }

    Ok(DataFrame::new(columns)?)
}

fn key_column(df: &DataFrame, key: &str, side: &'static str) -> Result<Column> {
    let c = df.column(key).map_err(|_| Error::Join {
        key: key.to_string(),
        side,
    })?;
    Ok(c.cast(&DataType::String)?)
}

#[cfg(test)]
mod test_join {
    use super::*;

    fn titles() -> PolarsResult<DataFrame> {
        df!(
            "tconst" => ["tt1", "tt2", "tt3", "tt4"],
            "primary_title" => [Some("Avatar"), Some("Nobody"), Some("Avatar"), None]
        )
    }

    fn budgets() -> PolarsResult<DataFrame> {
        df!(
            "primary_title" => ["Avatar", "Avatar", "Other", "Nobody"],
            "production_budget" => [425i64, 1, 7, 9]
        )
    }

    #[test]
    fn test_left_join_order_and_fanout() -> Result<()> {
        let res = left_join(&titles()?, &budgets()?, "primary_title")?;

        // tt1 and tt3 fan out to both Avatar rows; tt4 has a null key.
        let tconst: Vec<Option<&str>> = res.column("tconst")?.str()?.into_iter().collect();
        assert_eq!(
            tconst,
            [
                Some("tt1"),
                Some("tt1"),
                Some("tt2"),
                Some("tt3"),
                Some("tt3"),
                Some("tt4")
            ]
        );
        let budget: Vec<Option<i64>> = res
            .column("production_budget")?
            .i64()?
            .into_iter()
            .collect();
        assert_eq!(
            budget,
            [Some(425), Some(1), Some(9), Some(425), Some(1), None]
        );
        assert_eq!(res.width(), 3);
        Ok(())
    }

    #[test]
    fn test_inner_join_drops_unmatched() -> Result<()> {
        let res = inner_join(&titles()?, &budgets()?, "primary_title")?;
        assert_eq!(res.height(), 5);
        assert_eq!(res.column("production_budget")?.null_count(), 0);
        Ok(())
    }

    #[test]
    fn test_unmatched_left_rows_keep_nulls() -> Result<()> {
        let right = df!("primary_title" => ["Else"], "production_budget" => [1i64])?;
        let res = left_join(&titles()?, &right, "primary_title")?;
        assert_eq!(res.height(), 4);
        assert_eq!(res.column("production_budget")?.null_count(), 4);
        Ok(())
    }

    #[test]
    fn test_clashing_columns_are_suffixed() -> Result<()> {
        let left = df!("tconst" => ["tt1"], "id" => [1i64])?;
        let right = df!("tconst" => ["tt1"], "id" => [2i64])?;
        let res = inner_join(&left, &right, "tconst")?;
        assert_eq!(res.column("id")?.i64()?.get(0), Some(1));
        assert_eq!(res.column("id_right")?.i64()?.get(0), Some(2));
        Ok(())
    }

    #[test]
    fn test_missing_key_is_join_error() -> Result<()> {
        let right = df!("movie" => ["Avatar"])?;
        assert!(matches!(
            left_join(&titles()?, &right, "primary_title"),
            Err(Error::Join { side: "right", .. })
        ));
        assert!(matches!(
            inner_join(&right, &titles()?, "primary_title"),
            Err(Error::Join { side: "left", .. })
        ));
        Ok(())
    }
}
