use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use region_ocr::engines::EngineRegistry;
use region_ocr::postprocessing::Transform;
use region_ocr::rules::parse_legacy_replacements;
use region_ocr::{
    Config, DictionaryManager, ImageInput, OcrProcessor, Pipeline, Profile, RuleBook, RuleSet,
    Scope, TextPipeline, Vocabulary,
};

#[derive(Parser, Debug)]
#[command(name = "region-ocr")]
#[command(about = "Condition screen captures for OCR and clean up the recognized text")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "RUST_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the image pipeline and write the conditioned image
    Preprocess {
        /// Captured image
        input: PathBuf,

        /// Where to write the conditioned PNG
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        profile: ProfileArgs,

        /// Write every intermediate stage image into this directory
        #[arg(long)]
        debug_dir: Option<PathBuf>,
    },

    /// Clean raw OCR text read from a file or stdin
    Clean {
        /// Text file; stdin when omitted
        input: Option<PathBuf>,

        #[command(flatten)]
        profile: ProfileArgs,

        #[command(flatten)]
        text: TextArgs,
    },

    /// Preprocess, recognize and clean a captured image
    Recognize {
        /// Captured image
        input: PathBuf,

        #[command(flatten)]
        profile: ProfileArgs,

        #[command(flatten)]
        text: TextArgs,

        #[command(flatten)]
        engine: EngineArgs,

        /// Write every intermediate stage image into this directory
        #[arg(long)]
        debug_dir: Option<PathBuf>,

        /// Print the full result as JSON instead of the cleaned text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct ProfileArgs {
    /// Built-in profile (`default`, `manhwa`) or path to a profile JSON file
    #[arg(long, env = "REGION_OCR_PROFILE", default_value = "default")]
    profile: String,
}

#[derive(Args, Debug)]
struct TextArgs {
    /// Rule book JSON with global and per-site rules
    #[arg(long, env = "REGION_OCR_RULES")]
    rules: Option<PathBuf>,

    /// Replacement list in the `find → replace` line format
    #[arg(long)]
    legacy_rules: Option<PathBuf>,

    /// Page origin selecting the site rules, e.g. https://example.com
    #[arg(long)]
    origin: Option<String>,

    /// Word list for dictionary correction (one word per line)
    #[arg(long)]
    dictionary: Option<PathBuf>,

    /// Finishing transform: single-line, lower-case or upper-case
    #[arg(long)]
    transform: Option<Transform>,
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// OCR engine name; the first compiled-in engine when omitted
    #[arg(long, env = "REGION_OCR_ENGINE")]
    engine: Option<String>,

    /// Path to tessdata directory (uses TESSDATA_PREFIX env var if not set)
    #[arg(long, env = "TESSDATA_PREFIX")]
    tessdata_path: Option<PathBuf>,
}

impl EngineArgs {
    fn config(&self, profile: &Profile) -> Config {
        Config {
            default_language: profile.tess_lang.clone(),
            tessdata_path: self.tessdata_path.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Preprocess {
            input,
            output,
            profile,
            debug_dir,
        } => preprocess(&input, &output, &load_profile(&profile.profile)?, debug_dir),
        Command::Clean {
            input,
            profile,
            text,
        } => clean(input.as_deref(), &load_profile(&profile.profile)?, &text),
        Command::Recognize {
            input,
            profile,
            text,
            engine,
            debug_dir,
            json,
        } => recognize(
            &input,
            &load_profile(&profile.profile)?,
            &text,
            &engine,
            debug_dir,
            json,
        ),
    }
}

fn preprocess(
    input: &Path,
    output: &Path,
    profile: &Profile,
    debug_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let capture = open_capture(input)?;
    let pipeline = Pipeline::from_options(&profile.image_options());

    let result = match debug_dir {
        Some(dir) => pipeline.run_with_observer(capture, &mut DebugWriter::new(dir)?)?,
        None => pipeline.run(capture)?,
    };
    tracing::info!(
        "Preprocessed {:?} in {}ms ({} stages)",
        input,
        result.total_time_ms,
        result.steps.len()
    );
    println!("{}", serde_json::to_string_pretty(&result)?);

    result
        .into_bitmap()?
        .save(output)
        .with_context(|| format!("Failed to write {:?}", output))?;
    Ok(())
}

fn clean(input: Option<&Path>, profile: &Profile, args: &TextArgs) -> anyhow::Result<()> {
    let raw = match input {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?
        }
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let mut pipeline = TextPipeline::new(profile.text_options());
    if let Some(vocabulary) = load_vocabulary(profile, args)? {
        pipeline = pipeline.with_vocabulary(vocabulary);
    }

    let output = pipeline.process(raw.trim(), &load_rules(profile, args)?);
    for warning in &output.warnings {
        tracing::warn!("{}", warning);
    }
    println!("{}", finish(&output.text, args));
    Ok(())
}

fn recognize(
    input: &Path,
    profile: &Profile,
    text: &TextArgs,
    engine_args: &EngineArgs,
    debug_dir: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let registry = EngineRegistry::new(&engine_args.config(profile))?;
    let engine = registry.resolve(engine_args.engine.as_deref())?;

    let processor = OcrProcessor::from_profile(engine, profile, load_vocabulary(profile, text)?)?;
    let rules = load_rules(profile, text)?;
    let capture = open_capture(input)?;

    let mut output = match debug_dir.or_else(|| debug_default(profile)) {
        Some(dir) => {
            processor.perform_with_observer(capture, &rules, &mut DebugWriter::new(dir)?)?
        }
        None => processor.perform(capture, &rules)?,
    };
    output.text = finish(&output.text, text);

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for warning in &output.warnings {
            tracing::warn!("{}", warning);
        }
        println!("{}", output.text);
    }
    Ok(())
}

/// Profiles with `debug_mode` dump stages into `./ocr-debug`
fn debug_default(profile: &Profile) -> Option<PathBuf> {
    profile.debug_mode.then(|| PathBuf::from("ocr-debug"))
}

fn finish(text: &str, args: &TextArgs) -> String {
    match args.transform {
        Some(transform) => transform.apply(text),
        None => text.to_string(),
    }
}

fn open_capture(path: &Path) -> anyhow::Result<ImageInput> {
    let image = image::open(path).with_context(|| format!("Failed to load image {:?}", path))?;
    Ok(ImageInput::from(image))
}

fn load_profile(name_or_path: &str) -> anyhow::Result<Profile> {
    if let Some(profile) = Profile::builtin(name_or_path) {
        return Ok(profile);
    }
    let json = std::fs::read_to_string(name_or_path)
        .with_context(|| format!("'{}' is neither a built-in profile nor a readable file", name_or_path))?;
    Ok(Profile::from_json(&json)?)
}

/// Rule book rules for the origin's scope, then profile rules, then legacy rules
fn load_rules(profile: &Profile, args: &TextArgs) -> anyhow::Result<RuleSet> {
    let scope = Scope::for_origin(args.origin.as_deref());

    let mut rules = match &args.rules {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read rules {:?}", path))?;
            RuleBook::from_json(&json)?.effective(&scope)
        }
        None => RuleSet::default(),
    };
    rules.extend(&profile.rules());

    if let Some(path) = &args.legacy_rules {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules {:?}", path))?;
        rules.replacements.extend(parse_legacy_replacements(&text));
    }

    tracing::debug!(
        "Using {} replacement and {} deletion rules for {}",
        rules.replacements.len(),
        rules.deletions.len(),
        scope.key()
    );
    Ok(rules)
}

fn load_vocabulary(profile: &Profile, args: &TextArgs) -> anyhow::Result<Option<Arc<Vocabulary>>> {
    if !profile.clean_dict {
        return Ok(None);
    }

    let language = &profile.tess_lang;
    let mut manager = DictionaryManager::new();
    let loaded = match &args.dictionary {
        Some(path) => manager.load_file(language, path),
        None => manager.load_or_default(language),
    };

    match loaded {
        Ok(vocabulary) => Ok(Some(vocabulary)),
        Err(e) if !e.is_fatal() => {
            tracing::warn!("{}", e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Writes each stage's image as `NN-name.png`
struct DebugWriter {
    dir: PathBuf,
    index: usize,
}

impl DebugWriter {
    fn new(dir: PathBuf) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create debug directory {:?}", dir))?;
        Ok(Self { dir, index: 0 })
    }
}

impl region_ocr::preprocessing::StageObserver for DebugWriter {
    fn on_stage_complete(&mut self, name: &str, image: &ImageInput) {
        self.index += 1;
        let Some(bitmap) = image.as_bitmap() else {
            tracing::warn!("Stage '{}' produced an unreadable surface, not saved", name);
            return;
        };

        let path = self.dir.join(format!("{:02}-{}.png", self.index, name));
        match bitmap.save(&path) {
            Ok(()) => tracing::debug!("Saved stage '{}' to {:?}", name, path),
            Err(e) => tracing::warn!("Failed to save stage '{}': {}", name, e),
        }
    }
}
