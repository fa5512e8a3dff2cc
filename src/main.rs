use clap::{Parser, Subcommand, ValueEnum};
use movie_grosses::genre::{Metric, genre_chart};
use movie_grosses::source::Source;
use movie_grosses::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

/// Box-office profit by genre and year, from the IMDB, Box Office Mojo,
/// The Numbers and Rotten Tomatoes extracts.
#[derive(Parser)]
#[command(name = "movie-grosses", version)]
struct Cli {
    /// Directory holding the source files
    #[arg(long, global = true, env = "MOVIE_GROSSES_DATA", default_value = "zippedData")]
    data_dir: PathBuf,

    /// Skip the foreign_gross column on the budgets table
    #[arg(long, global = true)]
    no_foreign_gross: bool,

    /// Skip loading the Rotten Tomatoes tables
    #[arg(long, global = true)]
    no_rotten_tomatoes: bool,

    /// Debug logging, including per-step timings
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load everything and print the row count of each derived table
    Summary,

    /// Print the yearly mean of a metric for one genre
    Chart {
        /// Substring matched against the genres column
        #[arg(short, long)]
        genre: String,

        #[arg(short, long, value_enum, default_value_t = MetricArg::Net)]
        metric: MetricArg,

        /// Bar width in characters at the axis limit
        #[arg(long, default_value_t = 50)]
        width: usize,
    },

    /// List the expected source files and whether they exist
    Sources,
}

#[derive(Clone, Copy, ValueEnum)]
enum MetricArg {
    Net,
    Percent,
}

impl From<MetricArg> for Metric {
    fn from(m: MetricArg) -> Self {
        match m {
            MetricArg::Net => Metric::WorldwideNet,
            MetricArg::Percent => Metric::PercentGross,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.debug { "debug" } else { "info" };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let options = LoadOptions {
        foreign_gross: !cli.no_foreign_gross,
        rotten_tomatoes: !cli.no_rotten_tomatoes,
    };

    match cli.command {
        Commands::Summary => {
            let start = Instant::now();
            let db = MovieData::load(&cli.data_dir, &options)?;
            let analysis = Analysis::build(&db)?;
            for (name, rows) in analysis.summary() {
                println!("{name:<20}{rows:>10}");
            }
            log::debug!("total,{:}", start.elapsed().as_secs_f32());
        }
        Commands::Chart {
            genre,
            metric,
            width,
        } => {
            let db = MovieData::load(&cli.data_dir, &options)?;
            let analysis = Analysis::build(&db)?;
            let chart = genre_chart(&analysis.dropped_genres, &genre, metric.into())?;
            print!(
                "{}",
                chart
                    .label(None, Some("start year"), None)
                    .render_text(width)
            );
        }
        Commands::Sources => {
            for source in Source::ALL {
                let path = source.path_in(&cli.data_dir);
                let status = if path.is_file() { "ok" } else { "missing" };
                println!("{:<32}{status}", source.file_name());
            }
        }
    }

    Ok(())
}
