use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use transcript_search::{
    display_timestamp, search_transcript_with_window, watch_link, ArtifactStore, Config,
    FallbackTranscriber, MatchRecord, ModelSize, PythonWhisperEngine, TranscriptAcquirer,
    WhisperCppEngine, YtDlpCli,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("transcript-search")
        .version("0.1.0")
        .about("Video transcript acquisition and keyword search")
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .value_name("URL")
                .help("Video URL to transcribe")
                .required(true),
        )
        .arg(
            Arg::new("keywords")
                .short('k')
                .long("keywords")
                .value_name("LIST")
                .help("Comma-separated keywords to search for"),
        )
        .arg(
            Arg::new("language")
                .short('l')
                .long("language")
                .value_name("LANG")
                .help("Language hint ('auto' or omitted = auto-detect)"),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("SIZE")
                .help("Whisper model size: tiny, base, small, medium")
                .default_value("small"),
        )
        .arg(
            Arg::new("no-captions")
                .long("no-captions")
                .help("Skip caption tracks and always transcribe audio")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("case-sensitive")
                .long("case-sensitive")
                .help("Match keyword case exactly")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Base directory for artifacts")
                .default_value("./data"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    // Initialize logging
    let filter = if matches.get_flag("verbose") {
        "transcript_search=debug,info"
    } else {
        "transcript_search=info,warn"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using environment/defaults: {}", e);
        Config::from_env()
    });

    // CLI overrides
    let url = matches.get_one::<String>("url").unwrap();
    let model_size: ModelSize = matches.get_one::<String>("model").unwrap().parse()?;
    config.transcription.model_size = model_size;
    if let Some(language) = matches.get_one::<String>("language") {
        config.transcription.language = match language.as_str() {
            "auto" => None,
            other => Some(other.to_string()),
        };
    }
    config.output.base_dir = PathBuf::from(matches.get_one::<String>("output-dir").unwrap());
    let prefer_captions = config.acquisition.prefer_captions && !matches.get_flag("no-captions");
    let case_sensitive = config.search.case_sensitive || matches.get_flag("case-sensitive");
    config.validate()?;

    info!("🚀 Preparing transcript for {}", url);
    info!(
        "⚙️  Model: {}, language: {}, captions preferred: {}",
        config.transcription.model_size,
        config.transcription.language.as_deref().unwrap_or("auto"),
        prefer_captions
    );

    // Wire up collaborators
    let provider = YtDlpCli::new().with_program(config.acquisition.downloader.clone());
    if !provider.check_availability().await {
        warn!(
            "⚠️  {} not found on PATH; acquisition will fail without it",
            config.acquisition.downloader
        );
    }
    let transcriber = FallbackTranscriber::new(vec![
        Box::new(
            WhisperCppEngine::new()
                .with_model_dir(config.transcription.model_dir.clone())
                .with_threads(config.transcription.threads),
        ),
        Box::new(PythonWhisperEngine::new()),
    ]);
    let store = ArtifactStore::for_request(&config.output.base_dir, url);
    let acquirer = TranscriptAcquirer::new(Arc::new(provider), transcriber, store.clone());

    // Acquire the transcript
    let result = match acquirer
        .prepare_from_url(
            url,
            config.transcription.language.as_deref(),
            config.transcription.model_size,
            prefer_captions,
        )
        .await
    {
        Ok(result) => result,
        Err(e) => {
            error!("❌ Transcript acquisition failed: {}", e);
            return Err(e.into());
        }
    };

    info!(
        "✅ {} segments ready (source: {})",
        result.segments.len(),
        result.source.as_str()
    );

    // Search, print, persist
    if let Some(keyword_spec) = matches.get_one::<String>("keywords") {
        let hits = search_transcript_with_window(
            &result.segments,
            keyword_spec,
            case_sensitive,
            config.search.context_window,
        );

        if hits.is_empty() {
            warn!("No matches for {:?}", keyword_spec);
        } else {
            info!("🔍 {} match(es)", hits.len());
            for hit in &hits {
                let link = watch_link(result.video_id.as_deref(), hit.start);
                if link.is_empty() {
                    println!(
                        "{:>8}  [{}]  {}",
                        display_timestamp(hit.start),
                        hit.keyword,
                        hit.context
                    );
                } else {
                    println!(
                        "{:>8}  [{}]  {}  ({})",
                        display_timestamp(hit.start),
                        hit.keyword,
                        hit.context,
                        link
                    );
                }
            }

            let records: Vec<MatchRecord> = hits
                .iter()
                .map(|hit| MatchRecord::from_hit(hit, result.video_id.as_deref()))
                .collect();
            let path = store.save_matches(&records).await?;
            info!("💾 Match records saved: {}", path.display());
        }
    }

    Ok(())
}
