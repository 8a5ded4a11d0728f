//! Deploy a contract, then call one of its methods a fixed number of times.

use std::io::Write;

use tracing::{info, instrument};

use crate::{
    contract::{ContractBackend, ContractFactory, ContractInstance, PendingTransaction, TxOutcome},
    error::Error,
};

/// What to deploy and how many times to invoke it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub contract: String,
    pub method: String,
    pub invocations: u32,
    /// Prefix of the per-invocation success line, e.g. `Minted NFT #1`.
    pub label: String,
}

/// Last step the run completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Start,
    FactoryObtained,
    Deployed,
    Invoked(u32),
    Done,
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::FactoryObtained => f.write_str("factory obtained"),
            Self::Deployed => f.write_str("deployed"),
            Self::Invoked(n) => write!(f, "invocation #{n} confirmed"),
            Self::Done => f.write_str("done"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub address: String,
    pub deployment: TxOutcome,
    pub invocations: Vec<TxOutcome>,
}

/// An aborted run: the error plus the stage reached before it.
#[derive(thiserror::Error, Debug)]
#[error("{source}")]
pub struct RunFailure {
    pub stage: RunStage,
    #[source]
    pub source: Error,
}

/// Writes go to the script's console; a broken stdout aborts the run like
/// any other error.
fn emit(
    out: &mut impl Write,
    stage: RunStage,
    line: std::fmt::Arguments<'_>,
) -> Result<(), RunFailure> {
    writeln!(out, "{line}").map_err(|e| RunFailure {
        stage,
        source: Error::Io(e),
    })
}

/// Runs `plan` against `backend`, writing the script lines to `out`.
///
/// Every transaction is confirmed before its line is written and before the
/// next one is sent.
#[instrument(skip_all, fields(contract = %plan.contract, invocations = plan.invocations))]
pub async fn run<B, W>(backend: &B, plan: &RunPlan, out: &mut W) -> Result<RunReport, RunFailure>
where
    B: ContractBackend,
    W: Write,
{
    let mut stage = RunStage::Start;
    let fail = |stage: RunStage| move |source: Error| RunFailure { stage, source };

    let factory = backend
        .contract_factory(&plan.contract)
        .await
        .map_err(fail(stage))?;
    stage = RunStage::FactoryObtained;

    let mut contract = factory.deploy().await.map_err(fail(stage))?;
    let deployment = contract.deployed().await.map_err(fail(stage))?;
    stage = RunStage::Deployed;

    let address = contract.address().to_string();
    emit(out, stage, format_args!("contract deployed to: {address}"))?;

    let mut invocations = Vec::with_capacity(plan.invocations as usize);
    for n in 1..=plan.invocations {
        let pending = contract.invoke(&plan.method).await.map_err(fail(stage))?;
        info!(n, method = %plan.method, tx_hash = %pending.tx_hash(), "waiting for invocation");
        let outcome = pending.wait().await.map_err(fail(stage))?;
        stage = RunStage::Invoked(n);

        info!(
            n,
            tx_hash = %outcome.tx_hash,
            block = ?outcome.block_number,
            gas_used = ?outcome.gas_used,
            "invocation confirmed"
        );
        emit(out, stage, format_args!("{} #{n}", plan.label))?;
        invocations.push(outcome);
    }

    info!(stage = %RunStage::Done, address = %address, "run finished");
    Ok(RunReport {
        address,
        deployment,
        invocations,
    })
}
