use clap::{Parser, Subcommand};
use ferrous_hooks_domain::{CliOverrides, HookQuery, RecordType};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

mod answers;
mod bootstrap;
mod di;

#[derive(Parser)]
#[command(name = "ferrous-hooks")]
#[command(version)]
#[command(about = "Ferrous Hooks - scriptable pre/post resolution hooks for DNS pipelines")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Number of script runtimes
    #[arg(long)]
    pool_size: Option<usize>,

    /// Timeout for a single fetch.get call, in milliseconds
    #[arg(long)]
    fetch_timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile every enabled hook script and report failures
    Check,

    /// Evaluate one query through the hook chain and print the result as JSON
    Run {
        /// Query name
        #[arg(short = 'n', long)]
        name: String,

        /// Query type
        #[arg(short = 't', long = "type", default_value = "A")]
        record_type: RecordType,

        /// Upstream answer fed to the post phase, as 'TYPE DATA' (repeatable)
        #[arg(short = 'a', long = "answer", value_name = "RECORD")]
        answers: Vec<String>,

        /// TTL of the upstream answers
        #[arg(long, default_value_t = 300)]
        ttl: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        log_level: cli.log_level.clone(),
        pool_size: cli.pool_size,
        fetch_timeout_ms: cli.fetch_timeout_ms,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting Ferrous Hooks v{}", env!("CARGO_PKG_VERSION"));

    let engine = di::HookEngine::new(&config)?;
    if engine.hooks.is_empty() {
        warn!("No enabled hooks configured");
    }

    match cli.command {
        Command::Check => {
            let failed = engine.preload().await;
            if failed > 0 {
                anyhow::bail!("{} of {} hooks failed to compile", failed, engine.hooks.len());
            }
            info!(hooks = engine.hooks.len(), "All hook scripts compiled");
        }
        Command::Run {
            name,
            record_type,
            answers,
            ttl,
        } => run(&engine, name, record_type, &answers, ttl).await?,
    }

    Ok(())
}

async fn run(
    engine: &di::HookEngine,
    name: String,
    record_type: RecordType,
    upstream: &[String],
    ttl: u32,
) -> anyhow::Result<()> {
    let name = if name.ends_with('.') {
        name
    } else {
        format!("{}.", name)
    };
    let query = HookQuery::new(name, record_type);
    if !query.is_fqdn() {
        anyhow::bail!("'{}' is not a valid domain name", query.name);
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling hooks");
            interrupt.cancel();
        }
    });

    engine.preload().await;

    let pre = engine.chain.run_pre(query, &cancel).await;

    let answers = if pre.done {
        debug!(qname = %pre.query.name, "Query answered in the pre phase");
        pre.answers
    } else {
        let owner: Arc<str> = Arc::clone(&pre.query.name);
        let mut resolved = pre.answers;
        for text in upstream {
            resolved.push(answers::parse_answer(&owner, ttl, text)?);
        }
        engine.chain.run_post(&pre.query, resolved, &cancel).await
    };

    if cancel.is_cancelled() {
        anyhow::bail!("cancelled");
    }

    let output = json!({
        "question": {
            "name": pre.query.name.as_ref(),
            "type": pre.query.record_type.as_str(),
        },
        "done": pre.done,
        "answers": answers.iter().map(answers::render).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    debug!(
        live = engine.pool.live_count(),
        idle = engine.pool.idle_count(),
        "Script runtimes in use"
    );

    Ok(())
}
