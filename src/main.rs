//! `edfdemux` command-line tool: EDF header to JSON, data records to CSV.

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal};
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use tracing::info;

use edfdemux::logging::{init_logging, LogConfig, LogFormat};
use edfdemux::{output, DecodeOptions, EdfReader, FieldParsing, Selection};

#[derive(Parser)]
#[command(
    name = "edfdemux",
    version,
    about = "Convert an EDF recording into a JSON header and a CSV sample table"
)]
struct Cli {
    /// Path to the source EDF file.
    #[arg(short = 'f', long = "file", value_name = "PATH", default_value = "source.edf")]
    file: PathBuf,

    /// What to write: the header, the data records, or both.
    #[arg(short = 'r', long = "record", value_enum, default_value = "both")]
    record: RecordArg,

    /// Prefix each CSV row with the signal label.
    #[arg(short = 'l', long = "labels", action = ArgAction::Set, default_value_t = true)]
    labels: bool,

    /// Reject unparseable numeric header fields instead of reading them as 0.
    #[arg(long = "strict")]
    strict: bool,

    /// Directory for the generated files.
    #[arg(short = 'o', long = "output-dir", value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    log_format: LogFormatArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum RecordArg {
    #[value(alias = "0")]
    Header,
    #[value(alias = "1")]
    Data,
    #[value(alias = "2")]
    Both,
}

impl From<RecordArg> for Selection {
    fn from(arg: RecordArg) -> Self {
        match arg {
            RecordArg::Header => Selection::HeaderOnly,
            RecordArg::Data => Selection::DataOnly,
            RecordArg::Both => Selection::Both,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        use_env_filter: !cli.verbosity.is_present(),
        format: match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        },
        with_ansi: io::stderr().is_terminal(),
    };
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let options = DecodeOptions {
        include_labels: cli.labels,
        selection: cli.record.into(),
        parsing: if cli.strict {
            FieldParsing::Strict
        } else {
            FieldParsing::Lenient
        },
    };

    if let Err(error) = run(&cli, options) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli, options: DecodeOptions) -> edfdemux::Result<()> {
    let mut reader = EdfReader::open(&cli.file, options.parsing)?;

    if options.selection.emits_header() {
        let path = cli.output_dir.join(output::header_file_name(reader.header()));
        output::write_header_json(BufWriter::new(File::create(&path)?), reader.header())?;
        info!(path = %path.display(), "wrote header metadata");
    }

    if options.selection.emits_data() {
        let path = cli.output_dir.join(output::data_file_name(reader.header()));
        // 先完整解复用，失败时不留下半截的 CSV 文件
        let matrix = reader.read_samples(options.include_labels)?;
        output::write_samples_csv(BufWriter::new(File::create(&path)?), &matrix)?;
        info!(path = %path.display(), signals = matrix.signal_count(), "wrote sample table");
    }

    Ok(())
}
