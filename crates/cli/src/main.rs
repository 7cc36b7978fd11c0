mod settings;

use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use autoso_core::audio::domain::capture_gate::CaptureGate;
use autoso_core::audio::infrastructure::cpal_audio_source::CpalAudioSource;
use autoso_core::audio::infrastructure::whisper_streaming_recognizer::WhisperStreamingRecognizer;
use autoso_core::corpus::domain::corpus::Corpus;
use autoso_core::corpus::infrastructure::json_corpus_loader::JsonCorpusLoader;
use autoso_core::matching::domain::score_combiner::ScoreCombiner;
use autoso_core::matching::infrastructure::metaphone_encoder::MetaphoneEncoder;
use autoso_core::matching::infrastructure::onnx_sentence_encoder::OnnxSentenceEncoder;
use autoso_core::matching::infrastructure::phonetic_scorer::PhoneticScorer;
use autoso_core::matching::infrastructure::semantic_scorer::SemanticScorer;
use autoso_core::navigation::domain::candidate_windower::CandidateWindower;
use autoso_core::navigation::domain::navigation_result::NavigationResult;
use autoso_core::pipeline::advance_signal::{AdvanceSignal, LogAdvanceSignal};
use autoso_core::pipeline::infrastructure::threaded_streaming_pipeline::ThreadedStreamingPipeline;
use autoso_core::pipeline::navigate_unit::NavigateUnit;
use autoso_core::pipeline::navigation_logger::LogNavigationLogger;
use autoso_core::pipeline::navigator::Navigator;
use autoso_core::shared::constants::{SENTENCE_MODEL, SENTENCE_TOKENIZER, WHISPER_MODEL};
use autoso_core::shared::model_resolver::{self, ModelFile};
use autoso_core::shared::transcript_cursor::TranscriptCursor;

use settings::Settings;

/// Voice-driven navigation over a segmented transcript corpus.
#[derive(Parser)]
#[command(name = "autoso")]
struct Cli {
    /// JSON settings file; unset fields keep their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Listen to the microphone and advance through the transcripts.
    Listen {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[command(flatten)]
        models: ModelArgs,
        /// Transcript index to start from.
        #[arg(long)]
        start_index: Option<usize>,
    },
    /// Match one utterance against the transcripts around an index.
    Navigate {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[command(flatten)]
        models: ModelArgs,
        /// Current transcript index.
        #[arg(long)]
        index: usize,
        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
        /// Utterance text.
        text: String,
    },
    /// Feed utterances, one per line, through the navigate stage.
    Replay {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[command(flatten)]
        models: ModelArgs,
        /// Transcript index to start from.
        #[arg(long)]
        start_index: Option<usize>,
        /// Text file with one utterance per line (default: stdin).
        input: Option<PathBuf>,
    },
    /// Show corpus statistics, or the candidate window at an index.
    Inspect {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[arg(long)]
        index: Option<usize>,
    },
}

#[derive(Args)]
struct CorpusArgs {
    /// Corpus file holding both `segments` and `transcripts`.
    #[arg(long, conflicts_with_all = ["segments", "transcripts"])]
    corpus: Option<PathBuf>,

    /// Segments array file (with --transcripts).
    #[arg(long, requires = "transcripts")]
    segments: Option<PathBuf>,

    /// Transcripts array file (with --segments).
    #[arg(long, requires = "segments")]
    transcripts: Option<PathBuf>,
}

#[derive(Args)]
struct ModelArgs {
    /// Whisper ggml model (default: downloaded to the model cache).
    #[arg(long)]
    whisper_model: Option<PathBuf>,

    /// Sentence-embedding ONNX model (default: downloaded to the model cache).
    #[arg(long)]
    sentence_model: Option<PathBuf>,

    /// Tokenizer for the sentence model (default: downloaded to the model cache).
    #[arg(long)]
    tokenizer: Option<PathBuf>,
}

/// Prints the newly current transcript whenever the display advances.
struct TranscriptDisplay {
    corpus: Arc<Corpus>,
}

impl AdvanceSignal for TranscriptDisplay {
    fn advance(&mut self, _from: usize, to: usize) -> Result<(), Box<dyn std::error::Error>> {
        let transcript = self
            .corpus
            .transcript_at(to)
            .ok_or_else(|| format!("No transcript at index {to}"))?;
        println!("\n[{to}] {}\n{}\n", transcript.id, transcript.text);
        Ok(())
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = Settings::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Listen {
            corpus,
            models,
            start_index,
        } => run_listen(&settings, &corpus, &models, start_index),
        Command::Navigate {
            corpus,
            models,
            index,
            json,
            text,
        } => run_navigate(&settings, &corpus, &models, index, json, &text),
        Command::Replay {
            corpus,
            models,
            start_index,
            input,
        } => run_replay(&settings, &corpus, &models, start_index, input.as_deref()),
        Command::Inspect { corpus, index } => run_inspect(&corpus, index),
    }
}

fn run_listen(
    settings: &Settings,
    corpus_args: &CorpusArgs,
    models: &ModelArgs,
    start_index: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let corpus = load_corpus(corpus_args)?;
    let cursor = start_cursor(settings, &corpus, start_index)?;

    let whisper_path = resolve_model(models.whisper_model.as_deref(), WHISPER_MODEL, settings)?;
    let recognizer = WhisperStreamingRecognizer::new(
        &whisper_path,
        settings.sample_rate,
        settings.whisper_window_secs,
    )?;
    let display = TranscriptDisplay {
        corpus: Arc::clone(&corpus),
    };
    let unit = build_unit(
        settings,
        Arc::clone(&corpus),
        models,
        cursor.clone(),
        Box::new(display),
    )?;
    let pipeline =
        ThreadedStreamingPipeline::start(&settings.streaming_config(), Box::new(recognizer), unit);

    let gate = CaptureGate::new(
        settings.voice_detector()?,
        settings.sub_frame_len(),
        pipeline.audio_sender(),
    );
    let mut source = CpalAudioSource::new(gate, settings.sample_rate, settings.frame_len());
    source.start()?;

    eprintln!("Listening. Commands: l = previous, r = next, s = pause/resume capture, q = quit");
    show_current(&corpus, cursor.get());

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        match line?.trim() {
            "l" | "left" => {
                show_current(&corpus, cursor.seek_left());
            }
            "r" | "right" => {
                let index = cursor.seek_right_within(corpus.transcript_count());
                show_current(&corpus, index);
            }
            "s" | "toggle" => {
                let capturing = source.toggle()?;
                eprintln!("Capture {}", if capturing { "resumed" } else { "paused" });
            }
            "q" | "quit" => break,
            "" => {}
            other => eprintln!("Unknown command: {other}"),
        }
    }

    source.stop();
    pipeline.stop()
}

fn run_navigate(
    settings: &Settings,
    corpus_args: &CorpusArgs,
    models: &ModelArgs,
    index: usize,
    json: bool,
    text: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let corpus = load_corpus(corpus_args)?;
    let navigator = build_navigator(settings, Arc::clone(&corpus), models)?;
    let result = navigator.navigate(index, text);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&corpus, &result);
    }
    Ok(())
}

fn run_replay(
    settings: &Settings,
    corpus_args: &CorpusArgs,
    models: &ModelArgs,
    start_index: Option<usize>,
    input: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let corpus = load_corpus(corpus_args)?;
    let cursor = start_cursor(settings, &corpus, start_index)?;
    let mut unit = build_unit(
        settings,
        Arc::clone(&corpus),
        models,
        cursor.clone(),
        Box::new(LogAdvanceSignal),
    )?;
    unit.info(&format!("Replaying from transcript {}", cursor.get()));

    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(fs::File::open(path).map_err(|e| {
            format!("Cannot open {}: {e}", path.display())
        })?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match unit.handle(&line) {
            Some(result) => print_result(&corpus, &result),
            None => println!("skipped (too short): {line}"),
        }
    }

    unit.summary();
    println!("Final position: {}", cursor.get());
    Ok(())
}

fn run_inspect(
    corpus_args: &CorpusArgs,
    index: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let corpus = load_corpus(corpus_args)?;

    let Some(index) = index else {
        println!(
            "{} transcripts, {} segments",
            corpus.transcript_count(),
            corpus.segment_count()
        );
        for t in corpus.transcripts() {
            let owned = corpus
                .segments_owned_by(&t.id)
                .filter(|s| s.owner() == Some(t.id.as_str()))
                .count();
            let flag = if t.early_forward { "  [early-forward]" } else { "" };
            println!("  [{}] {}: {owned} segments{flag}", t.sequence_index, t.id);
        }
        return Ok(());
    };

    if index >= corpus.transcript_count() {
        return Err(format!(
            "Index {index} is out of range (corpus has {} transcripts)",
            corpus.transcript_count()
        )
        .into());
    }
    let window = CandidateWindower::window(&corpus, index);
    println!("Candidate window at [{index}] ({} segments):", window.len());
    for candidate in window.iter() {
        let owners = corpus
            .segment_by_id(&candidate.segment_id)
            .map(|s| s.owning_transcripts.join(","))
            .unwrap_or_default();
        println!("  {:<24} ({owners}) {}", candidate.segment_id, candidate.text);
    }
    Ok(())
}

fn load_corpus(args: &CorpusArgs) -> Result<Arc<Corpus>, Box<dyn std::error::Error>> {
    let corpus = match (&args.corpus, &args.segments, &args.transcripts) {
        (Some(path), _, _) => JsonCorpusLoader::load_from_file(path)?,
        (None, Some(segments), Some(transcripts)) => {
            JsonCorpusLoader::load_from_parts(segments, transcripts)?
        }
        _ => return Err("A corpus is required: --corpus, or --segments with --transcripts".into()),
    };
    Ok(Arc::new(corpus))
}

/// An explicit `--start-index` must exist; the settings default is clamped.
fn start_cursor(
    settings: &Settings,
    corpus: &Corpus,
    start_index: Option<usize>,
) -> Result<TranscriptCursor, Box<dyn std::error::Error>> {
    let Some(start_index) = start_index else {
        return Ok(TranscriptCursor::new(
            settings.start_index_for(corpus.transcript_count()),
        ));
    };
    if start_index >= corpus.transcript_count() {
        return Err(format!(
            "Start index {start_index} is out of range (corpus has {} transcripts)",
            corpus.transcript_count()
        )
        .into());
    }
    Ok(TranscriptCursor::new(start_index))
}

fn build_navigator(
    settings: &Settings,
    corpus: Arc<Corpus>,
    models: &ModelArgs,
) -> Result<Navigator, Box<dyn std::error::Error>> {
    let model_path = resolve_model(models.sentence_model.as_deref(), SENTENCE_MODEL, settings)?;
    let tokenizer_path = resolve_model(models.tokenizer.as_deref(), SENTENCE_TOKENIZER, settings)?;
    let encoder = OnnxSentenceEncoder::new(&model_path, &tokenizer_path)?;

    let combiner = ScoreCombiner::new(
        Arc::new(PhoneticScorer::new(MetaphoneEncoder::new())),
        Arc::new(SemanticScorer::new(encoder)),
        settings.weights,
    );
    Ok(Navigator::new(corpus, combiner).with_query_window(settings.query_window_tokens))
}

fn build_unit(
    settings: &Settings,
    corpus: Arc<Corpus>,
    models: &ModelArgs,
    cursor: TranscriptCursor,
    signal: Box<dyn AdvanceSignal>,
) -> Result<NavigateUnit, Box<dyn std::error::Error>> {
    let navigator = build_navigator(settings, corpus, models)?;
    Ok(NavigateUnit::new(
        navigator,
        cursor,
        signal,
        Box::new(LogNavigationLogger::new()),
    )
    .with_min_utterance_tokens(settings.min_utterance_tokens))
}

fn resolve_model(
    explicit: Option<&Path>,
    model: ModelFile,
    settings: &Settings,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(format!("Model file not found: {}", path.display()).into());
        }
        return Ok(path.to_path_buf());
    }

    log::info!("Resolving model: {}", model.file_name);
    let name = model.file_name;
    let path = model_resolver::resolve(
        model,
        settings.model_dir.as_deref(),
        Some(Box::new(move |downloaded, total| {
            download_progress(name, downloaded, total)
        })),
    )?;
    Ok(path)
}

fn show_current(corpus: &Corpus, index: usize) {
    if let Some(t) = corpus.transcript_at(index) {
        println!("\n[{index}] {}\n{}\n", t.id, t.text);
    }
}

fn print_result(corpus: &Corpus, result: &NavigationResult) {
    println!(
        "{:?} -> {}  ({:.1}ms)  \"{}\"",
        result.decision,
        result.target_transcript_id.as_deref().unwrap_or("-"),
        result.elapsed_ms,
        result.query
    );
    if let Some(segment) = result
        .matched_segment_id
        .as_deref()
        .and_then(|id| corpus.segment_by_id(id))
    {
        println!("  matched {}: {}", segment.id, segment.text);
    }
    for s in &result.suggestions {
        println!("  {:.3}  {}", s.score, s.segment_id);
    }
}

fn download_progress(name: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {name}... {pct}%");
    } else {
        eprint!("\rDownloading {name}... {downloaded} bytes");
    }
    if total > 0 && downloaded >= total {
        eprintln!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigate_args_parse() {
        let cli = Cli::try_parse_from([
            "autoso",
            "navigate",
            "--corpus",
            "corpus.json",
            "--index",
            "2",
            "--json",
            "revenue grew by twenty percent",
        ])
        .unwrap();
        match cli.command {
            Command::Navigate {
                corpus,
                index,
                json,
                text,
                ..
            } => {
                assert_eq!(corpus.corpus, Some(PathBuf::from("corpus.json")));
                assert_eq!(index, 2);
                assert!(json);
                assert_eq!(text, "revenue grew by twenty percent");
            }
            _ => panic!("expected navigate"),
        }
    }

    #[test]
    fn test_split_corpus_files_must_come_together() {
        let result = Cli::try_parse_from(["autoso", "inspect", "--segments", "segments.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_corpus_file_conflicts_with_split_files() {
        let result = Cli::try_parse_from([
            "autoso",
            "inspect",
            "--corpus",
            "c.json",
            "--segments",
            "s.json",
            "--transcripts",
            "t.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli =
            Cli::try_parse_from(["autoso", "inspect", "--corpus", "c.json", "--config", "x.json"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.json")));
    }

    fn single_transcript_corpus() -> Corpus {
        JsonCorpusLoader::from_json_str(
            r#"{
                "segments": [{"id": "s0", "sequence_index": 0, "text": "hello there", "owning_transcripts": ["t0"]}],
                "transcripts": [{"id": "t0", "sequence_index": 0, "text": "hello there"}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_default_start_index_fits_single_transcript_corpus() {
        let corpus = single_transcript_corpus();
        let cursor = start_cursor(&Settings::default(), &corpus, None).unwrap();
        assert_eq!(cursor.get(), 0);
    }

    #[test]
    fn test_explicit_start_index_out_of_range_fails() {
        let corpus = single_transcript_corpus();
        assert!(start_cursor(&Settings::default(), &corpus, Some(1)).is_err());
        assert_eq!(
            start_cursor(&Settings::default(), &corpus, Some(0))
                .unwrap()
                .get(),
            0
        );
    }

    #[test]
    fn test_load_corpus_requires_a_source() {
        let args = CorpusArgs {
            corpus: None,
            segments: None,
            transcripts: None,
        };
        assert!(load_corpus(&args).is_err());
    }
}
