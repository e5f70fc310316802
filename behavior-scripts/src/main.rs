use anyhow::{bail, Context};
use behavior_scripts::runner::{run, RunConfig};
use behavior_scripts::variants::{VARIANT_A, VARIANT_B};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use user_behavior::{BehaviorDefinition, Registry, StopCondition};

/// Replays `GET /` behavior definitions against a target
#[derive(Parser, Debug)]
#[command(name = "behavior-scripts")]
#[command(version)]
struct Cli {
    /// Base url of the target, overrides any host a definition declares
    #[arg(long, env = "BEHAVIOR_HOST")]
    host: Option<String>,

    /// Which built-in definition to run
    #[arg(long, value_enum, default_value_t = Variant::A)]
    variant: Variant,

    /// Load a JSON definition instead of a built-in variant
    #[arg(long, conflicts_with = "variant")]
    definition: Option<PathBuf>,

    /// Number of concurrent simulated users
    #[arg(short, long, default_value = "1")]
    users: usize,

    /// Tasks each user executes before stopping
    #[arg(long, conflicts_with = "run_time")]
    iterations: Option<usize>,

    /// Seconds to run before every user stops
    #[arg(long)]
    run_time: Option<u64>,

    /// Per request timeout in seconds
    #[arg(long, default_value = "30")]
    request_timeout: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Variant {
    /// Wait 1 to 3 seconds between requests
    A,
    /// Wait 2 to 4 seconds between requests
    B,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .init();

    let registry = load_registry(&cli)?;
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build runtime")?;
    let _guard = rt.enter();
    rt.block_on(run_scripts(cli, registry))
}

fn load_registry(cli: &Cli) -> anyhow::Result<Registry> {
    if let Some(path) = &cli.definition {
        let definition = BehaviorDefinition::from_file(path)
            .with_context(|| format!("Failed to load definition from {}", path.display()))?;
        return Ok(Registry::new().register(definition));
    }
    let all = behavior_scripts::registry().context("Failed to build built-in definitions")?;
    let name = match cli.variant {
        Variant::A => VARIANT_A,
        Variant::B => VARIANT_B,
    };
    let definition = all
        .get(name)
        .with_context(|| format!("Definition `{name}` is not registered"))?;
    Ok(Registry::new().register(BehaviorDefinition::clone(definition)))
}

async fn run_scripts(cli: Cli, registry: Registry) -> anyhow::Result<()> {
    if cli.users == 0 {
        bail!("--users must be at least 1");
    }
    let stop = match (cli.iterations, cli.run_time) {
        (Some(n), _) => StopCondition::Iterations(n),
        (None, Some(secs)) => StopCondition::Deadline(Instant::now() + Duration::from_secs(secs)),
        (None, None) => bail!("Pass either --iterations or --run-time"),
    };
    for definition in registry.iter() {
        tracing::info!(
            definition = definition.name(),
            wait_min = definition.wait_time().min_secs(),
            wait_max = definition.wait_time().max_secs(),
            tasks = definition.tasks().len(),
            "running behavior definition"
        );
    }
    let config = RunConfig {
        users: cli.users,
        stop,
        host: cli.host,
        request_timeout: Duration::from_secs(cli.request_timeout),
    };
    let stats = run(&registry, config).await?;
    println!("{stats}");
    Ok(())
}
