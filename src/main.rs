use std::io::{self, Read};
use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use localize_segments::parsers::decode_html;
use localize_segments::translation::{
    constants, extract_html_segments, machine_translate, restore_html_segments, CascadeOutcome,
    CompletenessTracker, ConfigManager, ContentObject, DummyTranslator, HtmlSegments,
    LocalizeConfig, MemoryStore, Registry, SegmentExtractor, SourceRevision, TrackerOptions,
    TranslationError, TranslationResult, TranslationStore, WalkOptions,
};

#[derive(Debug, Parser)]
#[command(name = "localize-segments", version, about = "Extract and restore translatable segments")]
struct Cli {
    /// Path to a configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Split an HTML fragment into a template and translatable fragments
    Extract {
        /// HTML file, or "-" for stdin
        input: String,

        /// Input character encoding
        #[arg(short, long, default_value = "utf-8")]
        encoding: String,
    },
    /// Rebuild HTML from the JSON printed by `extract`
    Restore {
        /// JSON file, or "-" for stdin
        input: String,
    },
    /// Print the segments of a content object
    Segments {
        /// JSON array of model definitions
        #[arg(short, long)]
        schema: String,

        /// Content object JSON, or "-" for stdin
        object: String,

        /// Override the foreign key recursion depth
        #[arg(long)]
        max_related_depth: Option<usize>,
    },
    /// Translate a content object with the built-in word-reversing translator
    Translate {
        /// JSON array of model definitions
        #[arg(short, long)]
        schema: String,

        /// Content object JSON, or "-" for stdin
        object: String,

        /// Target locale
        #[arg(short, long)]
        target: String,

        /// Source locale, defaults to `source_locale` from the configuration
        #[arg(long)]
        source: Option<String>,
    },
    /// Write an example configuration file
    InitConfig {
        #[arg(default_value = constants::EXAMPLE_CONFIG_FILE)]
        path: String,
    },
}

fn read_input(input: &str) -> TranslationResult<Vec<u8>> {
    if input == "-" {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data)?;
        return Ok(data);
    }

    std::fs::read(Path::new(input))
        .map_err(|e| TranslationError::IoError(format!("无法读取 {}: {}", input, e)))
}

fn read_text(input: &str) -> TranslationResult<String> {
    Ok(decode_html(&read_input(input)?, "utf-8"))
}

fn load_config(path: Option<&str>) -> TranslationResult<LocalizeConfig> {
    let manager = match path {
        Some(path) => ConfigManager::from_file(path)?,
        None => ConfigManager::new()?,
    };
    Ok(manager.get_config().clone())
}

fn translate_object(
    config: &LocalizeConfig,
    registry: &Registry,
    object: &ContentObject,
    source: Option<String>,
    target: &str,
) -> TranslationResult<ContentObject> {
    let source_locale = source.unwrap_or_else(|| config.source_locale.clone());
    if object.locale != source_locale {
        tracing::warn!("对象语言 {} 与源语言 {} 不一致", object.locale, source_locale);
    }

    let store = MemoryStore::new();
    let revision = SourceRevision::capture(registry, object, WalkOptions::from(config))?;

    let report = machine_translate(
        &DummyTranslator,
        &store,
        &revision.segments,
        &source_locale,
        target,
    )?;
    if !report.is_clean() {
        tracing::warn!(
            "{} 个译文被拒绝，{} 个字符串没有译文",
            report.rejected.len(),
            report.missing.len()
        );
    }

    let tracker =
        CompletenessTracker::with_options(registry, &store, TrackerOptions::from(config));
    match tracker.check(&revision, target)? {
        CascadeOutcome::Materialized { .. } | CascadeOutcome::AlreadyTranslated => {
            store.get_object(&object.translation_key, target).ok_or_else(|| {
                TranslationError::StorageError(format!("{} 的译本丢失", object.translation_key))
            })
        }
        outcome => {
            tracing::info!("未能直接物化: {:?}，按当前译文同步", outcome);
            tracker.sync_translation(&revision, target)
        }
    }
}

fn run(cli: Cli) -> TranslationResult<()> {
    match cli.command {
        Command::Extract { input, encoding } => {
            let html = decode_html(&read_input(&input)?, &encoding);
            let segments = extract_html_segments(&html);
            println!("{}", serde_json::to_string_pretty(&segments)?);
        }
        Command::Restore { input } => {
            let segments: HtmlSegments = serde_json::from_str(&read_text(&input)?)?;
            println!(
                "{}",
                restore_html_segments(&segments.template, &segments.fragments)?
            );
        }
        Command::Segments {
            schema,
            object,
            max_related_depth,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let mut options = WalkOptions::from(&config);
            if let Some(depth) = max_related_depth {
                options.max_related_depth = depth;
            }

            let registry = Registry::from_json(&read_text(&schema)?)?;
            let object: ContentObject = serde_json::from_str(&read_text(&object)?)?;
            let segments = SegmentExtractor::with_options(&registry, options).extract(&object)?;

            println!("{}", serde_json::to_string_pretty(&segments)?);
        }
        Command::Translate {
            schema,
            object,
            target,
            source,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let registry = Registry::from_json(&read_text(&schema)?)?;
            let object: ContentObject = serde_json::from_str(&read_text(&object)?)?;

            let translated = translate_object(&config, &registry, &object, source, &target)?;
            println!("{}", serde_json::to_string_pretty(&translated)?);
        }
        Command::InitConfig { path } => {
            ConfigManager::generate_example_config(&path)?;
            println!("{}", path);
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    localize_segments::translation::init();

    let cli = Cli::parse();

    if let Err(error) = run(cli) {
        eprintln!("错误: {}", error);
        process::exit(1);
    }
}
