use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use readalong_rs::{
    render, AlignConfig, AudioSource, DocumentInput, Granularity, OutputFormat,
    PresentationOptions, ReadAlongBuilder, SegmentFileAligner,
};
use tracing_subscriber::EnvFilter;

#[path = "readalong/output_writer.rs"]
mod output_writer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatChoice {
    Xml,
    Xhtml,
    Smil,
    Json,
}

impl From<FormatChoice> for OutputFormat {
    fn from(choice: FormatChoice) -> Self {
        match choice {
            FormatChoice::Xml => OutputFormat::Xml,
            FormatChoice::Xhtml => OutputFormat::Xhtml,
            FormatChoice::Smil => OutputFormat::Smil,
            FormatChoice::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GranularityChoice {
    Word,
    Sentence,
}

impl From<GranularityChoice> for Granularity {
    fn from(choice: GranularityChoice) -> Self {
        match choice {
            GranularityChoice::Word => Granularity::Word,
            GranularityChoice::Sentence => Granularity::Sentence,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "readalong",
    about = "Align a marked-up document with recorded segments and render a read-along"
)]
struct Args {
    /// XML document, or plain text when the file ends in `.txt`.
    #[arg(long)]
    input: PathBuf,
    /// JSON list of `{"id", "start_ms", "end_ms"}` segments from an aligner run.
    #[arg(long)]
    segments: PathBuf,
    #[arg(long)]
    audio: PathBuf,
    #[arg(long, env = "READALONG_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = FormatChoice::Xml)]
    format: FormatChoice,
    /// Overrides the granularity from `--config`.
    #[arg(long, value_enum)]
    granularity: Option<GranularityChoice>,
    /// Overrides the language from `--config`.
    #[arg(long)]
    language: Option<String>,
    #[arg(long, default_value = "Book")]
    title: String,
    /// Text document the SMIL `<text src>` entries point at. Defaults to the
    /// annotated XML written next to `--output`.
    #[arg(long)]
    text_src: Option<String>,
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Args::parse()) {
        eprintln!("readalong: {err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), String> {
    let mut config = match args.config.as_ref() {
        Some(path) => AlignConfig::load(path).map_err(|err| err.to_string())?,
        None => AlignConfig::default(),
    };
    if let Some(granularity) = args.granularity {
        config.granularity = granularity.into();
    }
    if let Some(language) = args.language.as_ref() {
        config.language = language.clone();
    }

    let source = fs::read_to_string(&args.input)
        .map_err(|err| format!("Failed to read input '{}': {err}", args.input.display()))?;
    let input = if is_plain_text(&args.input) {
        DocumentInput::PlainText(&source)
    } else {
        DocumentInput::Xml(&source)
    };

    let aligner = SegmentFileAligner::load(&args.segments).map_err(|err| err.to_string())?;
    let audio = AudioSource::Path(args.audio.clone());

    let pipeline = ReadAlongBuilder::new(config)
        .with_aligner(Box::new(aligner))
        .build()
        .map_err(|err| err.to_string())?;
    let output = pipeline
        .align(input, &audio)
        .map_err(|err| err.to_string())?;

    let format = OutputFormat::from(args.format);
    let options = presentation_options(&args, format);
    let rendered = render(&output.aligned, format, &options).map_err(|err| err.to_string())?;

    match args.output.as_ref() {
        Some(path) => output_writer::write_file(path, &rendered)?,
        None => output_writer::write_stdout(&rendered)?,
    }
    if let Some(path) = companion_text_path(&args, format) {
        let annotated = render(&output.aligned, OutputFormat::Xml, &options)
            .map_err(|err| err.to_string())?;
        output_writer::write_file(&path, &annotated)?;
    }

    tracing::info!(
        words = output.words.len(),
        format = format.extension(),
        "readalong: done"
    );
    Ok(())
}

fn is_plain_text(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}

fn presentation_options(args: &Args, format: OutputFormat) -> PresentationOptions {
    let mut options = PresentationOptions {
        title: args.title.clone(),
        audio_src: file_name(&args.audio),
        ..PresentationOptions::default()
    };
    if let Some(text_src) = args.text_src.as_ref() {
        options.text_src = text_src.clone();
    } else if let Some(path) = companion_text_path(args, format) {
        options.text_src = file_name(&path);
    }
    options
}

/// Annotated XML written beside a SMIL file when no `--text-src` is given.
fn companion_text_path(args: &Args, format: OutputFormat) -> Option<PathBuf> {
    if format != OutputFormat::Smil || args.text_src.is_some() {
        return None;
    }
    args.output
        .as_ref()
        .map(|output| output.with_extension(OutputFormat::Xml.extension()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
