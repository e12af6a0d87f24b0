//! `translate`: command-line front end for the reflect-and-revise pipeline.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use translation_agent::client::{CompletionClient, ScriptedCompletionClient};
use translation_agent::config::AppConfig;
use translation_agent::core::{PipelineState, TranslationRequest};
use translation_agent::errors::{ConfigurationError, TranslationError};
use translation_agent::events::LoggingEventSink;
use translation_agent::pipeline::{TranslationPipeline, DEFAULT_MODEL};

#[derive(Parser, Debug)]
#[command(name = "translate")]
#[command(about = "Translate text with a draft, critique and revision pass", long_about = None)]
struct Args {
    /// Text to translate (default: read --file, or stdin)
    #[arg(value_name = "TEXT", conflicts_with = "file")]
    text: Option<String>,

    /// Read the source text from a file
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Source language name (e.g. English)
    #[arg(long, default_value = "English")]
    source_lang: String,

    /// Target language name (e.g. Chinese)
    #[arg(long, default_value = "Chinese")]
    target_lang: String,

    /// Country or region whose colloquial style the result should follow
    #[arg(long, value_name = "COUNTRY", default_value = "")]
    country: String,

    /// Model identifier (overrides TRANSLATION_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Use a local client that echoes prompts instead of calling the provider
    #[arg(long)]
    dry_run: bool,

    /// Also print the draft and the critique
    #[arg(long, conflicts_with = "json")]
    show_stages: bool,

    /// Print the whole run as JSON (failures too, on stderr)
    #[arg(long)]
    json: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenvy::dotenv().ok();
    init_tracing(args.log_format);

    let json = args.json;
    match run(args, AppConfig::from_env).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", render_error(&err, json));
            ExitCode::FAILURE
        }
    }
}

async fn run(
    args: Args,
    load_config: impl FnOnce() -> Result<AppConfig, ConfigurationError>,
) -> anyhow::Result<String> {
    // configuration problems surface before we block on stdin
    let pipeline = build_pipeline(&args, load_config)?;
    debug!(?pipeline, "Pipeline ready");
    let source_text = read_source(&args)?;

    let request = TranslationRequest::new(&args.source_lang, &args.target_lang, source_text)
        .with_locale_hint(args.country.clone());
    info!(
        source_lang = %request.source_lang,
        target_lang = %request.target_lang,
        locale = ?request.locale_hint(),
        source_chars = request.source_text.chars().count(),
        "Translating"
    );

    let state = pipeline.run(&request).await?;
    render_output(&state, &args)
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn read_source(args: &Args) -> anyhow::Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    if let Some(path) = &args.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read source text from {}", path.display()));
    }

    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("failed to read source text from stdin")?;
    Ok(text)
}

fn build_pipeline(
    args: &Args,
    load_config: impl FnOnce() -> Result<AppConfig, ConfigurationError>,
) -> anyhow::Result<TranslationPipeline> {
    let events = Arc::new(LoggingEventSink::debug());

    if args.dry_run {
        let client: Arc<dyn CompletionClient> = Arc::new(ScriptedCompletionClient::echo());
        return TranslationPipeline::builder()
            .client(client)
            .events(events)
            .model(args.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()))
            .build()
            .context("invalid pipeline configuration");
    }

    let mut config = load_config().context("failed to load configuration")?;
    if let Some(model) = &args.model {
        config.client.model.clone_from(model);
    }
    TranslationPipeline::from_config(&config, events).context("failed to set up the completion client")
}

fn render_output(state: &PipelineState, args: &Args) -> anyhow::Result<String> {
    if args.json {
        return serde_json::to_string_pretty(state).context("failed to serialize the run");
    }

    let final_translation = state.final_translation().unwrap_or_default();
    if !args.show_stages {
        return Ok(final_translation.to_string());
    }

    Ok(format!(
        "== Draft ==\n{}\n\n== Critique ==\n{}\n\n== Final ==\n{}",
        state.draft().unwrap_or_default(),
        state.critique().unwrap_or_default(),
        final_translation,
    ))
}

/// Formats a failure for stderr. With `--json`, known errors print their
/// diagnostic fields instead of the message chain.
fn render_error(err: &anyhow::Error, json: bool) -> String {
    if json {
        let dict = err
            .downcast_ref::<TranslationError>()
            .map(TranslationError::to_dict)
            .or_else(|| err.downcast_ref::<ConfigurationError>().map(ConfigurationError::to_dict));
        if let Some(text) = dict.and_then(|d| serde_json::to_string_pretty(&d).ok()) {
            return text;
        }
    }
    format!("error: {err:#}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use translation_agent::core::{RunIdentity, StageKind};

    fn finished_state() -> PipelineState {
        let mut state = PipelineState::new(
            RunIdentity::new(),
            TranslationRequest::new("English", "Chinese", "Hello, world."),
        );
        let now = chrono::Utc::now();
        state.record(StageKind::Draft, "你好，世界。".into(), now).unwrap();
        state.record(StageKind::Reflect, "Looks fine.".into(), now).unwrap();
        state.record(StageKind::Improve, "你好，世界！".into(), now).unwrap();
        state
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["translate", "Hello"]).unwrap();
        assert_eq!(args.text.as_deref(), Some("Hello"));
        assert_eq!(args.source_lang, "English");
        assert_eq!(args.target_lang, "Chinese");
        assert_eq!(args.country, "");
        assert_eq!(args.log_format, LogFormat::Text);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_args_full() {
        let args = Args::try_parse_from([
            "translate",
            "--source-lang",
            "Chinese",
            "--target-lang",
            "English",
            "--country",
            "Taiwan",
            "--model",
            "llama3",
            "--dry-run",
            "--show-stages",
            "--log-format",
            "json",
            "你好",
        ])
        .unwrap();

        assert_eq!(args.source_lang, "Chinese");
        assert_eq!(args.country, "Taiwan");
        assert_eq!(args.model.as_deref(), Some("llama3"));
        assert!(args.dry_run && args.show_stages);
        assert_eq!(args.log_format, LogFormat::Json);
    }

    #[test]
    fn test_text_and_file_conflict() {
        assert!(Args::try_parse_from(["translate", "hi", "--file", "in.txt"]).is_err());
    }

    #[test]
    fn test_show_stages_and_json_conflict() {
        assert!(Args::try_parse_from(["translate", "hi", "--show-stages", "--json"]).is_err());
    }

    #[test]
    fn test_read_source_from_file() {
        let path = std::env::temp_dir().join(format!("translate-cli-{}.txt", std::process::id()));
        std::fs::write(&path, "from a file").unwrap();

        let args = Args::try_parse_from(["translate", "--file", path.to_str().unwrap()]).unwrap();
        assert_eq!(read_source(&args).unwrap(), "from a file");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_read_source_missing_file() {
        let args = Args::try_parse_from(["translate", "--file", "/nonexistent/source.txt"]).unwrap();
        let err = read_source(&args).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/source.txt"));
    }

    #[test]
    fn test_render_final_only() {
        let args = Args::try_parse_from(["translate", "x"]).unwrap();
        assert_eq!(render_output(&finished_state(), &args).unwrap(), "你好，世界！");
    }

    #[test]
    fn test_render_show_stages() {
        let args = Args::try_parse_from(["translate", "x", "--show-stages"]).unwrap();
        let out = render_output(&finished_state(), &args).unwrap();

        assert!(out.starts_with("== Draft ==\n你好，世界。"));
        assert!(out.contains("== Critique ==\nLooks fine."));
        assert!(out.ends_with("== Final ==\n你好，世界！"));
    }

    #[test]
    fn test_render_json() {
        let args = Args::try_parse_from(["translate", "x", "--json"]).unwrap();
        let out = render_output(&finished_state(), &args).unwrap();

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["phase"], "finalized");
        assert_eq!(value["records"][2]["output"], "你好，世界！");
    }

    #[tokio::test]
    async fn test_dry_run_pipeline_needs_no_credentials() {
        let args = Args::try_parse_from(["translate", "Hello, world.", "--dry-run", "--country", "Taiwan"])
            .unwrap();
        let pipeline = build_pipeline(&args, AppConfig::from_env).unwrap();

        let request = TranslationRequest::new(&args.source_lang, &args.target_lang, "Hello, world.")
            .with_locale_hint(args.country.clone());
        let state = pipeline.run(&request).await.unwrap();

        assert!(state.critique().unwrap().contains("colloquially spoken in Taiwan"));
        assert!(state.final_translation().unwrap().contains("<EXPERT_SUGGESTIONS>"));
    }

    #[tokio::test]
    async fn test_configuration_error_comes_before_reading_source() {
        let args = Args::try_parse_from(["translate", "--file", "/nonexistent/source.txt"]).unwrap();
        let err = run(args, || Err(ConfigurationError::missing("TAIDE_API_KEY")))
            .await
            .unwrap_err();

        let config_err = err.downcast_ref::<ConfigurationError>().unwrap();
        assert_eq!(config_err.key, "TAIDE_API_KEY");
    }

    #[tokio::test]
    async fn test_dry_run_never_loads_configuration() {
        let args = Args::try_parse_from(["translate", "Hello, world.", "--dry-run"]).unwrap();
        let output = run(args, || panic!("configuration loaded during a dry run"))
            .await
            .unwrap();
        assert!(output.contains("Hello, world."));
    }

    #[test]
    fn test_render_error_as_json() {
        let err = anyhow::Error::from(TranslationError::SourceTooLarge {
            estimated_tokens: 1001,
            max_tokens: 1000,
        });
        let value: serde_json::Value = serde_json::from_str(&render_error(&err, true)).unwrap();
        assert_eq!(value["type"], "SourceTooLarge");
        assert_eq!(value["estimated_tokens"], 1001);

        let err = anyhow::Error::from(ConfigurationError::missing("TAIDE_API_KEY"))
            .context("failed to load configuration");
        let value: serde_json::Value = serde_json::from_str(&render_error(&err, true)).unwrap();
        assert_eq!(value["type"], "ConfigurationError");
        assert_eq!(value["key"], "TAIDE_API_KEY");
    }

    #[test]
    fn test_render_error_as_text() {
        let err = anyhow::Error::from(ConfigurationError::missing("TAIDE_API_KEY"))
            .context("failed to load configuration");
        let text = render_error(&err, false);
        assert!(text.starts_with("error: failed to load configuration: "));
        assert!(text.contains("TAIDE_API_KEY"));

        let err = anyhow::anyhow!("plain failure");
        assert_eq!(render_error(&err, true), "error: plain failure");
    }
}
