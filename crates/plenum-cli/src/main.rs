mod display;
mod pipeline;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use plenum_core::{MissingSpeakerPolicy, Settings, TableFormat};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "plenum", version, about = "Align floor-session protocols with recording transcripts")]
struct Cli {
    /// TOML settings file; flags and PLENUM_* variables override it.
    #[arg(long, global = true, env = "PLENUM_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct Overrides {
    /// Session XML documents.
    #[arg(long, global = true, env = "PLENUM_PROTOCOL_DIR")]
    protocol_dir: Option<PathBuf>,

    /// Per-date utterance caches.
    #[arg(long, global = true, env = "PLENUM_UTTERANCE_DIR")]
    utterance_dir: Option<PathBuf>,

    /// Diarized transcript CSVs.
    #[arg(long, global = true, env = "PLENUM_TRANSCRIPT_DIR")]
    transcript_dir: Option<PathBuf>,

    /// Per-date match tables.
    #[arg(long, global = true, env = "PLENUM_MATCHED_DIR")]
    matched_dir: Option<PathBuf>,

    #[arg(long = "ledger", global = true, env = "PLENUM_LEDGER")]
    ledger_path: Option<PathBuf>,

    /// Handling of speech nodes without a speaker line.
    #[arg(long, global = true, env = "PLENUM_MISSING_SPEAKER", value_enum)]
    missing_speaker: Option<SpeakerPolicyArg>,

    #[arg(long, global = true, env = "PLENUM_MATCH_FORMAT", value_enum)]
    match_format: Option<FormatArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SpeakerPolicyArg {
    Drop,
    EmitEmpty,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Csv,
    Parquet,
}

impl Overrides {
    fn apply(self, settings: &mut Settings) {
        let paths = [
            (self.protocol_dir, &mut settings.protocol_dir),
            (self.utterance_dir, &mut settings.utterance_dir),
            (self.transcript_dir, &mut settings.transcript_dir),
            (self.matched_dir, &mut settings.matched_dir),
            (self.ledger_path, &mut settings.ledger_path),
        ];
        for (value, slot) in paths {
            if let Some(value) = value {
                *slot = value;
            }
        }
        if let Some(policy) = self.missing_speaker {
            settings.missing_speaker = match policy {
                SpeakerPolicyArg::Drop => MissingSpeakerPolicy::Drop,
                SpeakerPolicyArg::EmitEmpty => MissingSpeakerPolicy::EmitEmpty,
            };
        }
        if let Some(format) = self.match_format {
            settings.match_format = match format {
                FormatArg::Csv => TableFormat::Csv,
                FormatArg::Parquet => TableFormat::Parquet,
            };
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Segment session documents into per-date utterance files
    Segment,

    /// Merge consecutive same-speaker segments of one transcript
    Cluster {
        /// Transcript CSV to read
        input: PathBuf,
        /// Clustered transcript CSV to write
        output: PathBuf,
    },

    /// Match pending recordings against cached utterances
    Match,

    /// Segment, then match
    Run,

    /// Print the ledger with per-flag counts
    Ledger,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    info!("plenum v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;
    cli.overrides.apply(&mut settings);

    match cli.command {
        Command::Segment => cmd_segment(&settings),
        Command::Cluster { input, output } => cmd_cluster(&input, &output),
        Command::Match => cmd_match(&settings),
        Command::Run => {
            cmd_segment(&settings)?;
            cmd_match(&settings)
        }
        Command::Ledger => cmd_ledger(&settings),
    }
}

fn cmd_segment(settings: &Settings) -> anyhow::Result<()> {
    let stats = pipeline::segment_protocols(settings)?;
    display::print_segment_stats(&stats);
    Ok(())
}

fn cmd_match(settings: &Settings) -> anyhow::Result<()> {
    let stats = pipeline::match_recordings(settings)?;
    display::print_run_stats(&stats);
    Ok(())
}

fn cmd_cluster(input: &std::path::Path, output: &std::path::Path) -> anyhow::Result<()> {
    let segments = plenum_store::read_transcript(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let clustered = plenum_core::transcript::cluster(&segments);
    plenum_store::write_transcript(output, &clustered)
        .with_context(|| format!("writing {}", output.display()))?;
    info!(
        input = segments.len(),
        output = clustered.len(),
        "clustered transcript"
    );
    Ok(())
}

fn cmd_ledger(settings: &Settings) -> anyhow::Result<()> {
    let ledger = plenum_store::load_ledger(&settings.ledger_path)
        .with_context(|| format!("loading ledger {}", settings.ledger_path.display()))?;
    display::print_ledger(&ledger)
}
