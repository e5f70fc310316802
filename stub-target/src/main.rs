use anyhow::Context;
use axum::http::StatusCode;
use clap::Parser;
use mimalloc::MiMalloc;
use stub_target::StubTarget;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Serves `GET /` with a fixed status for load-test dry runs.
#[derive(Parser, Debug)]
#[command(name = "stub-target")]
#[command(version)]
struct Args {
    #[arg(long, default_value = "127.0.0.1:8080", env = "STUB_TARGET_ADDR")]
    addr: String,

    /// Status code returned for every request
    #[arg(long, default_value_t = 200)]
    status: u16,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
    let status = StatusCode::from_u16(args.status).context("Invalid status code")?;
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build runtime")?;
    let _guard = rt.enter();
    rt.block_on(async {
        let target = StubTarget::bind(&args.addr, status).await?;
        tracing::info!(addr = %target.addr(), %status, "stub target listening");
        target.serve_forever().await
    })
}
