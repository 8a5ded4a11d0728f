//! Deploys the NFT contract, then mints two NFTs one after the other.

use std::process::ExitCode;

use helpers::{run_script, ScriptArgs};

const MINTS: u32 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    run_script(ScriptArgs::from_env(), MINTS).await.into()
}
