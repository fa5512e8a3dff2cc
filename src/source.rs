use crate::error::{Error, Result};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Comma separated, plain strings.
    Csv,
    /// Tab separated, with backslash escapes inside string fields.
    EscapedTsv,
}

/// The raw files the analysis is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    TitleBasics,
    NameBasics,
    TitleAkas,
    TitleCrew,
    TitlePrincipals,
    TitleRatings,
    BomMovieGross,
    TnMovieBudgets,
    RtReviews,
    RtMovieInfo,
}

impl Source {
    pub const ALL: [Source; 10] = [
        Source::TitleBasics,
        Source::NameBasics,
        Source::TitleAkas,
        Source::TitleCrew,
        Source::TitlePrincipals,
        Source::TitleRatings,
        Source::BomMovieGross,
        Source::TnMovieBudgets,
        Source::RtReviews,
        Source::RtMovieInfo,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Source::TitleBasics => "imdb.title.basics.csv.gz",
            Source::NameBasics => "imdb.name.basics.csv.gz",
            Source::TitleAkas => "imdb.title.akas.csv.gz",
            Source::TitleCrew => "imdb.title.crew.csv.gz",
            Source::TitlePrincipals => "imdb.title.principals.csv.gz",
            Source::TitleRatings => "imdb.title.ratings.csv.gz",
            Source::BomMovieGross => "bom.movie_gross.csv.gz",
            Source::TnMovieBudgets => "tn.movie_budgets.csv.gz",
            Source::RtReviews => "rt.reviews.tsv.gz",
            Source::RtMovieInfo => "rt.movie_info.tsv.gz",
        }
    }

    pub fn format(self) -> Format {
        match self {
            Source::RtReviews | Source::RtMovieInfo => Format::EscapedTsv,
            _ => Format::Csv,
        }
    }

    /// Short table name used in logs and errors.
    pub fn table_name(self) -> &'static str {
        self.file_name()
            .trim_end_matches(".gz")
            .trim_end_matches(".csv")
            .trim_end_matches(".tsv")
    }

    pub fn path_in(self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

/// Read one source file from `dir` into a `DataFrame`.
///
/// Compression is detected from the file contents, so the gzip files as
/// shipped and their decompressed copies load the same way.
pub fn read_source(dir: &Path, source: Source) -> Result<DataFrame> {
    let path = source.path_in(dir);
    let start = Instant::now();

    let mut df = read_delimited(&path, source.format())?;
    if source.format() == Format::EscapedTsv {
        unescape_strings(&mut df)?;
    }

    log::info!(
        "loaded {} ({} rows, {} columns)",
        source.table_name(),
        df.height(),
        df.width()
    );
    log::debug!("{},{:}", source.table_name(), start.elapsed().as_secs_f32());
    Ok(df)
}

pub fn read_delimited(path: &Path, format: Format) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(Error::parse(path.display().to_string(), "file not found"));
    }
    let separator = match format {
        Format::Csv => b',',
        Format::EscapedTsv => b'\t',
    };

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(separator)
                .with_encoding(CsvEncoding::LossyUtf8),
        )
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| Error::parse(path.display().to_string(), e.to_string()))
}

/// Decode backslash escapes in every string column of `df`.
pub fn unescape_strings(df: &mut DataFrame) -> Result<()> {
    let names: Vec<PlSmallStr> = df
        .get_columns()
        .iter()
        .filter(|c| c.dtype() == &DataType::String)
        .map(|c| c.name().clone())
        .collect();

    for name in names {
        let decoded: StringChunked = df
            .column(&name)?
            .str()?
            .into_iter()
            .map(|v| v.map(unescape))
            .collect();
        df.with_column(decoded.with_name(name).into_series())?;
    }
    Ok(())
}

/// Decode `\\`, `\n`, `\t`, `\r`, `\'`, `\"`, `\xNN` and `\uNNNN`.
/// Unknown or truncated escapes are kept as written.
pub fn unescape(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('\\') => {
                chars.next();
                out.push('\\');
            }
            Some('n') => {
                chars.next();
                out.push('\n');
            }
            Some('t') => {
                chars.next();
                out.push('\t');
            }
            Some('r') => {
                chars.next();
                out.push('\r');
            }
            Some(q @ ('\'' | '"')) => {
                chars.next();
                out.push(q);
            }
            Some(kind @ ('x' | 'u')) => {
                let width = if kind == 'x' { 2 } else { 4 };
                let digits: String = chars.clone().skip(1).take(width).collect();
                let decoded = (digits.len() == width)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => {
                        for _ in 0..=width {
                            chars.next();
                        }
                        out.push(ch);
                    }
                    None => out.push('\\'),
                }
            }
            _ => out.push('\\'),
        }
    }
    out
}
