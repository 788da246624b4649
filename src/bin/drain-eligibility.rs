use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use color_eyre::config::Frame;
use eyre::Result;
use kube::ResourceExt;
use tracing::{Level, debug, error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::filter::FromEnvError;
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, filter::Directive};

use drain_eligibility::{
    ApiResolver, Config, DrainEngine, KubeControllerLookup, SerializedReferenceDecoder, Shutdown,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let config = Config::parse();

    init_tracing_subscriber()?;
    install_color_eyre()?;

    print_build_info();

    let shutdown = Shutdown::new();
    try_main(config, &shutdown).await
}

async fn try_main(config: Config, shutdown: &Shutdown) -> Result<ExitCode> {
    let api_resolver = ApiResolver::try_new(kube::Config::infer().await?)?;
    let lookup = KubeControllerLookup::new(&api_resolver);
    let engine = DrainEngine::new(Arc::new(SerializedReferenceDecoder), Arc::new(lookup))
        .with_max_concurrent_lookups(config.max_concurrent_lookups)
        .with_lookup_timeout(config.lookup_timeout());
    let policy = config.policy();

    let pods = api_resolver.list_pods_on_node(&config.node).await?;
    info!(node = %config.node, pods = pods.len(), "Deciding");

    let result = engine
        .pods_for_deletion(&pods, &policy, shutdown.wait_shutdown_triggered())
        .await;
    if shutdown.is_shutdown_triggered() {
        info!("Cancelled, the decision may be incomplete");
    }

    match result {
        Ok(decision) => {
            for (pod, reason) in &decision.skipped {
                debug!(pod = %pod.name_any(), ?reason, "skip");
            }
            for (pod, params) in decision.evictions(&policy) {
                let grace_period = params
                    .delete_options
                    .and_then(|options| options.grace_period_seconds);
                match (pod.namespace(), grace_period) {
                    (Some(namespace), Some(seconds)) => {
                        println!("{namespace}/{} grace-period={seconds}s", pod.name_any())
                    }
                    (Some(namespace), None) => println!("{namespace}/{}", pod.name_any()),
                    (None, _) => println!("{}", pod.name_any()),
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            error!(violations = err.violations().len(), "Node cannot be drained");
            eprintln!("{err}");
            Ok(ExitCode::from(1))
        }
    }
}

fn selfish_frame_filter(frames: &mut Vec<&Frame>) {
    frames.retain(|frame| {
        matches!(frame.name.as_ref(),
            Some(name) if name == "drain_eligibility"
            || name.starts_with("drain_eligibility::"))
    });
}

fn init_tracing_subscriber() -> Result<()> {
    tracing_subscriber::registry()
        .with({
            let layer = Layer::default().with_writer(std::io::stderr);
            let filter = env_filter()?;
            layer.with_filter(filter)
        })
        .with({
            let layer = ErrorLayer::default();
            let filter = env_filter()?;
            layer.with_filter(filter)
        })
        .try_init()?;

    return Ok(());

    fn env_filter() -> Result<EnvFilter, FromEnvError> {
        EnvFilter::builder()
            .with_default_directive(Directive::from(Level::INFO))
            .from_env()
    }
}

fn install_color_eyre() -> Result<()> {
    color_eyre::config::HookBuilder::new()
        .capture_span_trace_by_default(true)
        .add_frame_filter(Box::new(selfish_frame_filter))
        .install()?;
    Ok(())
}

fn print_build_info() {
    info!("{}: {}", drain_eligibility::BINARY_NAME, env!("VERGEN_GIT_DESCRIBE"));
    debug!("commit: {}", env!("VERGEN_GIT_SHA"));
    debug!("build date: {}", env!("VERGEN_BUILD_TIMESTAMP"));
}
