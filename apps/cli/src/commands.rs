//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use soapbridge_core::assembler::ContextAssembler;
use soapbridge_core::hints::extract_soap_hints;
use soapbridge_core::llm::{GeminiClient, SUPPORTED_MODELS};
use soapbridge_core::output::{RunInfo, write_outputs};
use soapbridge_core::pipeline::{ConvertOutput, ConvertRequest, ProgressReporter, default_assembler};
use soapbridge_shared::{
    AppConfig, DocumentKind, ReferenceDocument, RetrievalConfig, TargetStack, init_config,
    load_config, resolve_api_key,
};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SoapBridge: migrate SOAP services to REST with reference-grounded prompts.
#[derive(Parser)]
#[command(
    name = "soapbridge",
    version,
    about = "Convert SOAP/WSDL into a REST design, OpenAPI 3.0, and client code.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Client stack selectable on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum StackArg {
    PythonRequests,
    NodeAxios,
    JavaHttp,
    DotnetHttpClient,
}

impl From<StackArg> for TargetStack {
    fn from(arg: StackArg) -> Self {
        match arg {
            StackArg::PythonRequests => TargetStack::PythonRequests,
            StackArg::NodeAxios => TargetStack::NodeAxios,
            StackArg::JavaHttp => TargetStack::JavaHttp,
            StackArg::DotnetHttpClient => TargetStack::DotnetHttpClient,
        }
    }
}

/// Retrieval window overrides shared by `context` and `convert`.
#[derive(clap::Args, Debug, Default)]
pub(crate) struct RetrievalArgs {
    /// Number of chunks to keep in the context pack.
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Words per chunk window.
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Words shared between consecutive windows.
    #[arg(long)]
    pub overlap: Option<usize>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Build and print the reference context pack for a query.
    Context {
        /// Query text.
        #[arg(short, long, conflicts_with = "query_file", required_unless_present = "query_file")]
        query: Option<String>,

        /// Read the query from a file (e.g. a WSDL).
        #[arg(long)]
        query_file: Option<PathBuf>,

        /// Reference file (.json, .yaml, .yml, .txt, .md, .pdf). Repeatable.
        #[arg(short = 'r', long = "ref", required = true)]
        refs: Vec<PathBuf>,

        #[command(flatten)]
        retrieval: RetrievalArgs,

        /// Print a score table instead of the rendered pack.
        #[arg(long)]
        scores: bool,
    },

    /// Print structural hints for a SOAP/WSDL file as JSON.
    Hints {
        /// SOAP envelope, WSDL, or SOAP client code.
        soap_file: PathBuf,
    },

    /// Run the full SOAP → REST conversion.
    Convert {
        /// SOAP envelope, WSDL, or SOAP client code.
        soap_file: PathBuf,

        /// Reference file (.json, .yaml, .yml, .txt, .md, .pdf). Repeatable.
        #[arg(short = 'r', long = "ref")]
        refs: Vec<PathBuf>,

        /// Client stack for generated code (defaults to config).
        #[arg(short, long, value_enum)]
        stack: Option<StackArg>,

        /// REST preferences, e.g. "use /v1 prefix, idempotency keys".
        #[arg(short, long)]
        prefs: Option<String>,

        /// Gemini model (defaults to config).
        #[arg(short, long)]
        model: Option<String>,

        /// Write outputs to this directory instead of printing them.
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        retrieval: RetrievalArgs,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "soapbridge=info",
        1 => "soapbridge=debug",
        _ => "soapbridge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Context {
            query,
            query_file,
            refs,
            retrieval,
            scores,
        } => cmd_context(query, query_file.as_deref(), &refs, &retrieval, scores),
        Command::Hints { soap_file } => cmd_hints(&soap_file),
        Command::Convert {
            soap_file,
            refs,
            stack,
            prefs,
            model,
            out,
            retrieval,
        } => {
            let opts = ConvertOptions {
                soap_file,
                refs,
                stack: stack.map(TargetStack::from),
                prefs,
                model,
                out,
                retrieval,
            };
            cmd_convert(opts).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_context(
    query: Option<String>,
    query_file: Option<&Path>,
    refs: &[PathBuf],
    retrieval: &RetrievalArgs,
    scores: bool,
) -> Result<()> {
    let config = load_config()?;
    let retrieval = resolve_retrieval(&config, retrieval)?;

    let query = match (query, query_file) {
        (Some(q), _) => q,
        (None, Some(path)) => read_text(path)?,
        (None, None) => return Err(eyre!("either --query or --query-file is required")),
    };

    let documents = load_references(refs)?;
    let assembler = default_assembler(retrieval);
    let pack = assembler.select(&documents, &query);

    info!(
        references = documents.len(),
        chunks = pack.len(),
        top_k = assembler.config().top_k,
        "context pack built"
    );

    if scores {
        println!("{:>8}  {:<32}  PREVIEW", "SCORE", "SOURCE#CHUNK");
        for entry in pack.entries() {
            let source = format!("{}#{}", entry.chunk.source_name, entry.chunk.ordinal);
            println!("{:>8.2}  {:<32}  {}", entry.score, source, preview(&entry.chunk.text, 60));
        }
    } else {
        println!("{}", pack.render());
    }

    Ok(())
}

fn cmd_hints(soap_file: &Path) -> Result<()> {
    let text = read_text(soap_file)?;
    let hints = extract_soap_hints(&text);
    println!("{}", serde_json::to_string_pretty(&hints)?);
    Ok(())
}

struct ConvertOptions {
    soap_file: PathBuf,
    refs: Vec<PathBuf>,
    stack: Option<TargetStack>,
    prefs: Option<String>,
    model: Option<String>,
    out: Option<PathBuf>,
    retrieval: RetrievalArgs,
}

async fn cmd_convert(opts: ConvertOptions) -> Result<()> {
    // Validate API key before doing anything
    let config = load_config()?;
    let api_key = resolve_api_key(&config)?;
    let retrieval = resolve_retrieval(&config, &opts.retrieval)?;

    let model = opts
        .model
        .unwrap_or_else(|| config.gemini.default_model.clone());
    if !SUPPORTED_MODELS.contains(&model.as_str()) {
        warn!(model = %model, supported = ?SUPPORTED_MODELS, "model is not in the supported list");
    }

    let request = ConvertRequest {
        soap_text: read_text(&opts.soap_file)?,
        target_stack: opts.stack.unwrap_or(config.defaults.target_stack),
        rest_preferences: opts
            .prefs
            .unwrap_or_else(|| config.defaults.rest_preferences.clone()),
    };

    let documents = load_references(&opts.refs)?;
    let assembler: ContextAssembler = default_assembler(retrieval);
    let client = GeminiClient::new(&config.gemini, model.clone(), api_key)?;

    info!(
        soap_file = %opts.soap_file.display(),
        references = documents.len(),
        stack = %request.target_stack,
        model = %model,
        "starting conversion"
    );

    let reporter = CliProgress::new();
    let output =
        soapbridge_core::pipeline::convert(&request, &documents, &assembler, &client, &reporter)
            .await?;

    match opts.out {
        Some(dir) => {
            let reference_files: Vec<String> =
                documents.iter().map(|d| d.name.clone()).collect();
            let manifest = write_outputs(
                &dir,
                &output,
                &RunInfo {
                    model: &model,
                    target_stack: request.target_stack,
                    reference_files: &reference_files,
                },
            )?;

            println!();
            println!("  Conversion complete!");
            println!("  Run:     {}", manifest.run_id);
            println!("  Model:   {}", manifest.model);
            println!("  Stack:   {}", manifest.target_stack);
            println!("  Context: {} chunk(s)", manifest.context_chunks);
            println!("  Files:   {}", manifest.files.len() + 1);
            println!("  Path:    {}", dir.display());
            println!("  Time:    {:.1}s", output.elapsed.as_secs_f64());
            println!();
        }
        None => {
            println!("# REST design + OpenAPI\n");
            println!("{}", output.design);
            println!("\n# Client code\n");
            println!("{}", output.code);
        }
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn resolve_retrieval(config: &AppConfig, args: &RetrievalArgs) -> Result<RetrievalConfig> {
    let retrieval =
        RetrievalConfig::from(config).with_overrides(args.top_k, args.chunk_size, args.overlap);
    retrieval.validate()?;
    Ok(retrieval)
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))
}

/// Load reference files, skipping unsupported extensions with a warning.
fn load_references(paths: &[PathBuf]) -> Result<Vec<ReferenceDocument>> {
    let mut documents = Vec::with_capacity(paths.len());

    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let kind = match DocumentKind::from_file_name(&name) {
            Ok(kind) => kind,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping unsupported reference file");
                continue;
            }
        };

        if kind == DocumentKind::Pdf && !soapbridge_normalize::pdf_support_compiled() {
            eprintln!(
                "note: {name}: PDF text extraction is not compiled in; \
                 rebuild with the `pdf` feature or upload JSON/YAML/TXT instead"
            );
        }

        documents.push(ReferenceDocument::from_path(path)?);
    }

    Ok(documents)
}

fn preview(text: &str, max_chars: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{cut}…")
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _output: &ConvertOutput) {
        self.spinner.finish_and_clear();
    }
}
