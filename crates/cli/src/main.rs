use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use result_processor::{ProcessorRegistry, ResultPostProcessor, ResultSetProcessor};
use search_api::{CourseDiscoverySearch, InMemoryBackend, SearchRequest};
use search_types::{load_result_set, QueryContext, Requester, Settings};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// course-search - Course discovery search with pluggable result processing
#[derive(Parser)]
#[command(name = "course-search")]
#[command(about = "Course discovery search with pluggable result processing", long_about = None)]
struct Cli {
    /// Settings file (JSON)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    /// Dotted path of the result processor, overrides settings and environment
    #[arg(short, long, global = true)]
    processor: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Who the results are for
#[derive(Args)]
struct RequesterArgs {
    /// Username of the requester (anonymous when omitted)
    #[arg(long)]
    user: Option<String>,

    /// Requester is staff
    #[arg(long)]
    staff: bool,

    /// Course ids the requester is enrolled in
    #[arg(long, value_delimiter = ',')]
    enrolled: Vec<String>,
}

impl RequesterArgs {
    fn requester(&self) -> Requester {
        let mut requester = match &self.user {
            Some(user) => Requester::user(user.clone()),
            None => Requester::anonymous(),
        };
        requester.is_staff = self.staff;
        for course_id in &self.enrolled {
            requester = requester.with_enrollment(course_id.clone());
        }
        requester
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Search a result set file and print the JSON response
    Search {
        /// Result set file (JSON array or JSON lines)
        #[arg(long)]
        data: PathBuf,

        /// Phrase to search for
        #[arg(long)]
        phrase: Option<String>,

        #[command(flatten)]
        requester: RequesterArgs,

        /// Page size
        #[arg(long, default_value = "20")]
        size: usize,

        /// Offset of the first hit
        #[arg(long, default_value = "0")]
        from: usize,
    },

    /// Post-process every record of a result set and print one JSON line per survivor
    Process {
        /// Result set file (JSON array or JSON lines)
        #[arg(long)]
        data: PathBuf,

        /// Phrase the records matched
        #[arg(long)]
        phrase: Option<String>,

        #[command(flatten)]
        requester: RequesterArgs,
    },

    /// Resolve the configured result processor
    Resolve,

    /// List the registered result processors
    Variants,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_deref(), cli.processor)?;
    let registry = ProcessorRegistry::with_builtin();

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Search {
            data,
            phrase,
            requester,
            size,
            from,
        } => handle_search(&registry, &settings, &data, phrase, &requester, size, from).await?,
        Commands::Process {
            data,
            phrase,
            requester,
        } => handle_process(&registry, &settings, &data, phrase, &requester)?,
        Commands::Resolve => handle_resolve(&registry, &settings)?,
        Commands::Variants => handle_variants(&registry, &settings),
    }

    Ok(())
}

/// Settings file, then environment, then `--processor`
fn load_settings(path: Option<&Path>, processor: Option<String>) -> Result<Settings> {
    let settings = match path {
        Some(path) => Settings::load_from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    let settings = settings.with_env_overrides();
    Ok(match processor {
        Some(reference) => settings.with_result_processor(reference),
        None => settings,
    })
}

/// Handle the 'search' command
async fn handle_search(
    registry: &ProcessorRegistry,
    settings: &Settings,
    data: &Path,
    phrase: Option<String>,
    requester: &RequesterArgs,
    size: usize,
    from: usize,
) -> Result<()> {
    let backend = Arc::new(InMemoryBackend::load_from_file(data)?);
    let handler = CourseDiscoverySearch::from_settings(backend, registry, settings)?;

    let request = SearchRequest {
        search_phrase: phrase,
        size,
        from,
    };
    let response = handler.search(request, requester.requester()).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&response).context("Failed to serialize response")?
    );
    Ok(())
}

/// Handle the 'process' command
fn handle_process(
    registry: &ProcessorRegistry,
    settings: &Settings,
    data: &Path,
    phrase: Option<String>,
    requester: &RequesterArgs,
) -> Result<()> {
    let post_processor = ResultPostProcessor::from_settings(registry, settings)
        .context("Failed to resolve the configured result processor")?;
    tracing::info!(
        "Processing {} with {}",
        data.display(),
        post_processor.processor_type().name()
    );
    let records = load_result_set(data)
        .with_context(|| format!("Failed to load result set from {}", data.display()))?;
    let input_count = records.len();

    let query = QueryContext {
        match_phrase: phrase,
    };
    let start = Instant::now();
    let processed = ResultSetProcessor::new(post_processor).process_all(
        records,
        &query,
        &requester.requester(),
    );

    for record in &processed.results {
        println!(
            "{}",
            serde_json::to_string(record).context("Failed to serialize record")?
        );
    }

    eprintln!(
        "{} Processed {} records with {} in {:?}",
        "✓".green(),
        input_count,
        post_processor.processor_type().name().bold(),
        start.elapsed()
    );
    eprintln!("{}Kept: {}", "• ".green(), processed.results.len());
    eprintln!("{}Removed: {}", "• ".yellow(), processed.removed_count);
    eprintln!("{}Failed: {}", "• ".red(), processed.failed_count);
    Ok(())
}

/// Handle the 'resolve' command
fn handle_resolve(registry: &ProcessorRegistry, settings: &Settings) -> Result<()> {
    let reference = settings.result_processor().unwrap_or("(default)");
    let post_processor = ResultPostProcessor::from_settings(registry, settings)
        .with_context(|| format!("Failed to resolve result processor {reference}"))?;
    tracing::info!("Resolved {} to {}", reference, post_processor.processor_type().name());

    println!(
        "{} {} -> {}",
        "✓".green(),
        reference,
        post_processor.processor_type().name().bold()
    );
    println!("{}Taxonomy facets enabled: {}", "• ".cyan(), settings.is_using_taxoman());
    Ok(())
}

/// Handle the 'variants' command
fn handle_variants(registry: &ProcessorRegistry, settings: &Settings) {
    println!("{}", "Registered result processors:".bold().blue());
    for (path, processor_type) in registry.entries() {
        let marker = if settings.result_processor() == Some(path.as_str()) {
            "* ".green()
        } else {
            "  ".normal()
        };
        println!("{}{} ({})", marker, path, processor_type.name());
    }
}
