use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use shiritori_lexicon::{
    load_exclusions, open_input, Config, CsvRecordWriter, EntryReader, Error, Pipeline, Result,
    RunStats,
};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

const IO_BUFFER_CAPACITY: usize = 256 * 1024;
const PROGRESS_INTERVAL: usize = 1000;

#[derive(Parser)]
#[command(name = "jmdict-shiritori")]
#[command(about = "Build a shiritori word list (CSV) from JMdict XML")]
struct Args {
    /// Input JMdict XML file (.xml or .xml.bz2)
    input: PathBuf,

    /// Output CSV file (word, reading, meaning, level)
    output: PathBuf,

    /// Write a header row
    #[arg(long)]
    with_header: bool,

    /// Stop after this many rows (0 = no limit)
    #[arg(long, default_value_t = 0)]
    max_rows: usize,

    /// Words to leave out: a .csv with a `word` column, or one word per line
    #[arg(long)]
    exclude_words: Option<PathBuf>,

    /// Path to the word rules schema YAML (default: built-in schema)
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Also write the run summary as JSON
    #[arg(long)]
    stats_json: Option<PathBuf>,

    /// Quiet mode - minimal output
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging() {
    // Default to warn so log lines don't fight the spinner
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn create_output(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    File::create(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb
}

fn run(args: &Args) -> Result<(RunStats, Duration)> {
    let config = match &args.schema {
        Some(path) => Config::load(path)?,
        None => Config::builtin()?,
    };
    let rules = config.compile()?;

    let exclusions = args
        .exclude_words
        .as_deref()
        .map(load_exclusions)
        .transpose()?;
    if let Some(words) = &exclusions {
        info!(words = words.len(), "loaded exclusion set");
        if !args.quiet {
            println!("Excluded words loaded: {}", words.len());
            println!();
        }
    }

    let reader = open_input(&args.input)?;
    let output = create_output(&args.output)?;
    let mut writer = CsvRecordWriter::new(
        BufWriter::with_capacity(IO_BUFFER_CAPACITY, output),
        args.with_header,
    )?;

    let start_time = Instant::now();
    let pb = progress_bar(args.quiet);

    let mut pipeline = Pipeline::new(&rules).with_max_rows(Some(args.max_rows));
    if let Some(words) = &exclusions {
        pipeline = pipeline.with_exclusions(words);
    }

    let stats = pipeline.run(EntryReader::new(reader), &mut writer, |stats| {
        if !args.quiet && stats.entries % PROGRESS_INTERVAL == 0 {
            let elapsed = start_time.elapsed().as_secs_f64();
            let rate = stats.entries as f64 / elapsed;
            pb.set_message(format!(
                "Entries: {} | Written: {} | Rate: {:.0} entries/s",
                stats.entries, stats.written, rate
            ));
        }
    })?;
    writer.flush()?;

    if args.max_rows > 0 && stats.written >= args.max_rows && !args.quiet {
        pb.finish_with_message(format!("Reached limit of {} rows", args.max_rows));
    } else {
        pb.finish_and_clear();
    }

    if let Some(path) = &args.stats_json {
        let mut file = BufWriter::new(create_output(path)?);
        serde_json::to_writer_pretty(&mut file, &stats)?;
        writeln!(file)?;
        file.flush()?;
    }

    Ok((stats, start_time.elapsed()))
}

fn print_stats(stats: &RunStats, elapsed: Duration) {
    let reasons = &stats.invalid_reasons;
    println!();
    println!("============================================================");
    println!("Entries parsed: {}", stats.entries);
    println!("Rows written: {}", stats.written);
    println!("Skipped invalid: {}", stats.skipped_invalid);
    println!("Skipped no meaning: {}", stats.skipped_no_meaning);
    println!("Skipped duplicate word: {}", stats.skipped_duplicate);
    println!("Skipped excluded word: {}", stats.skipped_excluded);
    println!("------------------------------------------------------------");
    println!("Invalid entries by rule:");
    println!("  missing expression/reading: {}", reasons.missing_field);
    println!("  expression length: {}", reasons.expression_length);
    println!("  reading length: {}", reasons.reading_length);
    println!("  expression script: {}", reasons.expression_script);
    println!("  reading script: {}", reasons.reading_script);
    println!("  no start phoneme: {}", reasons.no_start_phoneme);
    println!("  no end phoneme: {}", reasons.no_end_phoneme);
    println!("  not common: {}", reasons.uncommon);
    println!("------------------------------------------------------------");
    println!("Time: {}m {}s", elapsed.as_secs() / 60, elapsed.as_secs() % 60);
    println!(
        "Rate: {:.0} entries/sec",
        stats.entries as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    println!("============================================================");
}

fn main() {
    let args = Args::parse();
    init_logging();

    if !args.quiet {
        println!("Input: {}", args.input.display());
        println!("Output: {}", args.output.display());
        match &args.schema {
            Some(path) => println!("Schema: {}", path.display()),
            None => println!("Schema: built-in"),
        }
        if args.max_rows > 0 {
            println!("Limit: {} rows", args.max_rows);
        }
        println!();
    }

    match run(&args) {
        Ok((stats, elapsed)) => {
            if !args.quiet {
                print_stats(&stats, elapsed);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsStr;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_have_no_limit_and_no_header() {
        let args = Args::try_parse_from(["jmdict-shiritori", "JMdict_e.xml", "out.csv"]).unwrap();
        assert_eq!(args.max_rows, 0);
        assert!(!args.with_header);
        assert!(args.exclude_words.is_none());
        assert!(args.schema.is_none());
    }

    #[test]
    fn run_writes_csv_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("JMdict_e.xml");
        fs::write(
            &input,
            "<!DOCTYPE JMdict [\n<!ENTITY n \"noun (common) (futsuumeishi)\">\n]>\n<JMdict>\n\
             <entry><k_ele><keb>子猫</keb><ke_pri>ichi1</ke_pri></k_ele><r_ele><reb>こねこ</reb></r_ele>\
             <sense><pos>&n;</pos><gloss>kitten</gloss></sense></entry>\n</JMdict>\n",
        )
        .unwrap();

        let output = dir.path().join("data").join("output.csv");
        let stats_json = dir.path().join("stats.json");
        let args = Args::try_parse_from([
            OsStr::new("jmdict-shiritori"),
            input.as_os_str(),
            output.as_os_str(),
            OsStr::new("--with-header"),
            OsStr::new("--quiet"),
            OsStr::new("--stats-json"),
            stats_json.as_os_str(),
        ])
        .unwrap();

        let (stats, _) = run(&args).unwrap();
        assert_eq!(stats.written, 1);

        let csv = fs::read_to_string(&output).unwrap();
        assert_eq!(
            csv.lines().collect::<Vec<_>>(),
            vec!["word,reading,meaning,level", "子猫,こねこ,kitten,"]
        );

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&stats_json).unwrap()).unwrap();
        assert_eq!(summary["written"], 1);
        assert_eq!(summary["invalid_reasons"]["uncommon"], 0);
    }
}
