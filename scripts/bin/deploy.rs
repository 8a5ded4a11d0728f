//! Deploys the NFT contract and prints its address.

use std::process::ExitCode;

use helpers::{run_script, ScriptArgs};

#[tokio::main]
async fn main() -> ExitCode {
    run_script(ScriptArgs::from_env(), 0).await.into()
}
