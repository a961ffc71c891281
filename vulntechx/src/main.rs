use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use command_builder::{AggregateTags, Expansion, PerTagPath, DEFAULT_WORDLIST_DIR};
use job_runner::{run_pipeline, OutputSink, RunOptions};
use record_source::{resolve_source, RecordStream, DEFAULT_DETECTOR};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tech_list::TechPolicy;
use tracing::debug;
use vulntechx_core::SlotPool;

mod config;
mod logging;

const EXAMPLES: &str = "Examples:
  echo hackerone.com | vulntechx nuclei --cmd \"nuclei -duc -t ~/nuclei-templates -tags {tech} -es unknown,info,low\" --parallel 10 -o nuclei-output.txt
  cat subs.txt | vulntechx httpx --cmd \"httpx -duc -silent -path {tech}\" --parallel 10 -o httpx-output.txt
  cat techx-output.json | vulntechx run --cmd \"nuclei -duc -tc {tech}\"";

#[derive(Debug, Parser)]
#[command(
    name = "vulntechx",
    version,
    about = "Fan out scans across hosts in parallel, filtered by detected technology stack",
    after_help = EXAMPLES
)]
struct Cli {
    /// Optional config file (YAML). If omitted, loads ./vulntechx.yaml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct ScanArgs {
    /// The command template; every {tech} is replaced per job
    #[arg(short = 'c', long = "cmd", value_name = "TEMPLATE")]
    cmd: Option<String>,
    /// Enable verbose output for debugging purposes
    #[arg(long, default_value_t = false)]
    verbose: bool,
    /// Show each command as it starts
    #[arg(long, default_value_t = false)]
    process: bool,
    /// Number of parallel processes (values <= 0 mean 50)
    #[arg(long, allow_negative_numbers = true)]
    parallel: Option<i64>,
    /// File to append saved output to
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Comma-separated technologies to exclude, or a file with one per line
    #[arg(short = 'e', long = "exclude-tech", default_value = "")]
    exclude_tech: String,
    /// Comma-separated technologies to include (only these run), or a file with one per line
    #[arg(short = 'i', long = "include-tech", default_value = "")]
    include_tech: String,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print version information
    Version,
    /// One nuclei run per host with all of its tags (reads JSON from stdin or runs the detector)
    Nuclei(ScanArgs),
    /// One httpx run per host and tag, resolving wordlists for -path templates
    Httpx(ScanArgs),
    /// Pick the strategy from the template: -path runs per tag, anything else aggregates
    Run(ScanArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Nuclei,
    Httpx,
    Infer,
}

impl Mode {
    fn name(self) -> &'static str {
        match self {
            Mode::Nuclei => "nuclei",
            Mode::Httpx => "httpx",
            Mode::Infer => "run",
        }
    }

    fn expansion(self, template: &str, wordlist_dir: PathBuf) -> Arc<dyn Expansion> {
        match self {
            Mode::Nuclei => Arc::new(AggregateTags::new(template)),
            Mode::Httpx => Arc::new(PerTagPath::new(template, wordlist_dir)),
            Mode::Infer => Arc::from(command_builder::infer(template, wordlist_dir)),
        }
    }

    fn tool(self, template: &str) -> String {
        match self {
            Mode::Nuclei => "Nuclei".into(),
            Mode::Httpx => "httpx".into(),
            Mode::Infer => template.split_whitespace().next().unwrap_or("command").to_string(),
        }
    }
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };
    match cli.command {
        Commands::Version => {
            println!("Current vulntechx version v{} (core {})", env!("CARGO_PKG_VERSION"), vulntechx_core::version());
            Ok(())
        }
        Commands::Nuclei(args) => scan(Mode::Nuclei, args, cli.config),
        Commands::Httpx(args) => scan(Mode::Httpx, args, cli.config),
        Commands::Run(args) => scan(Mode::Infer, args, cli.config),
    }
}

fn scan(mode: Mode, args: ScanArgs, config_path: Option<PathBuf>) -> Result<()> {
    let template = match args.cmd.as_deref() {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => {
            println!(
                "Usage: vulntechx {} --cmd <command template> [--parallel N] [--output file]",
                mode.name()
            );
            std::process::exit(1);
        }
    };
    logging::init(args.verbose);

    let cfg = config::load_config(config_path.as_deref())?;
    let mode_cfg = cfg.mode(mode.name()).cloned().unwrap_or_default();
    let parallel = args.parallel.or(mode_cfg.parallel).or(cfg.parallel).unwrap_or(0);
    let slots = SlotPool::from_requested(parallel);
    let output = args.output.or(mode_cfg.output);
    let detector = cfg.detector.unwrap_or_else(|| DEFAULT_DETECTOR.to_string());
    let wordlist_dir = cfg.wordlist_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_WORDLIST_DIR));

    let policy = TechPolicy::from_specs(&args.include_tech, &args.exclude_tech)?;
    match &policy {
        TechPolicy::Include(set) => debug!(?set, "including only these technologies"),
        TechPolicy::Exclude(set) => debug!(?set, "excluding technologies"),
        TechPolicy::All => {}
    }

    let mut input = Vec::new();
    std::io::stdin()
        .read_to_end(&mut input)
        .map_err(vulntechx_core::Error::Stdin)?;

    let expansion = mode.expansion(&template, wordlist_dir);
    let opts = RunOptions { tool: mode.tool(&template), process: args.process };

    let rt = tokio::runtime::Runtime::new().context("starting runtime")?;
    let mut writer = None;
    let result = rt.block_on(async {
        let source = resolve_source(input, &detector).await?;
        let (sink, w) = OutputSink::open(output.as_deref())?;
        writer = Some(w);
        let records = RecordStream::from_slice(&source);
        run_pipeline(records, &policy, expansion, sink, slots, &opts).await
    });
    // Shutting the runtime down drops aborted jobs and their sink handles.
    drop(rt);
    if let Some(writer) = writer {
        writer.finish();
    }
    result?;
    Ok(())
}
