//! Command line surface shared by the `deploy` and `mint` binaries.

use std::{io::Write, path::PathBuf};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::{
    config::Config,
    evm::EvmBackend,
    runner::{run, RunFailure, RunReport, RunStage},
    wrapper::{run_main, RunStatus},
};

#[derive(Debug, Clone, Default, Parser)]
#[command(version, about = "Deploy a contract and optionally invoke it")]
pub struct ScriptArgs {
    /// TOML config file (defaults to ./deploy.toml when present)
    #[arg(short, long, env = "DEPLOY_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Refuse to run against a node reporting another chain id
    #[arg(long, env = "CHAIN_ID")]
    pub chain_id: Option<u64>,

    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Contract artifact name
    #[arg(long)]
    pub contract: Option<String>,

    /// Directory holding compiled artifacts
    #[arg(long)]
    pub artifacts: Option<PathBuf>,

    /// Zero-argument method invoked after deployment
    #[arg(long)]
    pub method: Option<String>,

    /// Number of invocations after deployment
    #[arg(short = 'n', long)]
    pub invocations: Option<u32>,

    /// Debug-level logs on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl ScriptArgs {
    /// Reads `.env` first so its values feed the `env` fallbacks.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::parse()
    }

    pub fn apply(&self, config: &mut Config) {
        if let Some(rpc_url) = &self.rpc_url {
            config.network.rpc_url = rpc_url.clone();
        }
        if let Some(chain_id) = self.chain_id {
            config.network.chain_id = Some(chain_id);
        }
        if let Some(key) = &self.private_key {
            config.signer.private_key = Some(key.clone());
        }
        if let Some(contract) = &self.contract {
            config.contract.name = contract.clone();
        }
        if let Some(artifacts) = &self.artifacts {
            config.contract.artifacts_dir = artifacts.clone();
        }
        if let Some(method) = &self.method {
            config.contract.method = method.clone();
        }
        if let Some(invocations) = self.invocations {
            config.run.invocations = Some(invocations);
        }
    }

    pub fn load_config(&self) -> crate::Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}

/// Logs go to stderr so stdout only carries the script lines.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let default_filter = if verbose { "helpers=debug,info" } else { "helpers=info,warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .with(env_filter)
        .try_init();
}

/// Runs a script end to end against the configured node.
pub async fn run_script(args: ScriptArgs, default_invocations: u32) -> RunStatus {
    init_logging(args.verbose);
    let mut console = std::io::stdout();
    let mut errors = std::io::stdout();
    run_main(execute(&args, default_invocations, &mut console), &mut errors).await
}

async fn execute(
    args: &ScriptArgs,
    default_invocations: u32,
    out: &mut impl Write,
) -> Result<RunReport, RunFailure> {
    let at_start = |source: crate::Error| RunFailure {
        stage: RunStage::Start,
        source,
    };

    let config = args.load_config().map_err(at_start)?;
    let plan = config.plan(default_invocations);
    info!(
        contract = %plan.contract,
        method = %plan.method,
        invocations = plan.invocations,
        "starting run"
    );

    let backend = EvmBackend::from_config(&config).await.map_err(at_start)?;
    run(&backend, &plan, out)
        .await
        .inspect_err(|failure| debug!(stage = %failure.stage, "run aborted"))
}
