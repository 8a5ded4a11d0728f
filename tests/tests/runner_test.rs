use helpers::{
    config::{DEFAULT_CONTRACT, DEFAULT_METHOD},
    MockContractBackend, MockContractFactory, MockContractInstance, MockPendingTransaction,
    RunStage, RunStatus,
};
use mockall::{predicate::eq, Sequence};
use tests::{
    backend_for, confirming_tx, deployed_contract, failing_tx, minting_contract, nft_plan,
    outcome, random_address, run_script_with, scripted,
};

#[tokio::test]
async fn deploy_only_prints_address_and_exits_zero() -> anyhow::Result<()> {
    let mut contract = deployed_contract("0xABC123");
    contract.expect_invoke().never();
    let backend = backend_for(contract);

    let transcript = run_script_with(&backend, &nft_plan(0)).await;

    assert_eq!(transcript.status, RunStatus::Success);
    assert_eq!(transcript.status.code(), 0);
    assert_eq!(transcript.lines, vec!["contract deployed to: 0xABC123"]);
    Ok(())
}

#[tokio::test]
async fn mint_run_prints_two_numbered_lines_in_order() -> anyhow::Result<()> {
    let backend = backend_for(minting_contract("0xABC123"));

    let transcript = run_script_with(&backend, &nft_plan(2)).await;

    assert_eq!(transcript.status, RunStatus::Success);
    assert_eq!(
        transcript.lines,
        vec![
            "contract deployed to: 0xABC123",
            "Minted NFT #1",
            "Minted NFT #2",
        ]
    );

    let report = transcript
        .report
        .ok_or_else(|| anyhow::anyhow!("successful run has no report"))?;
    assert_eq!(report.address, "0xABC123");
    assert_eq!(report.invocations.len(), 2);
    Ok(())
}

#[tokio::test]
async fn each_call_is_confirmed_before_the_next_starts() -> anyhow::Result<()> {
    let mut seq = Sequence::new();
    let mut backend = MockContractBackend::new();
    let mut factory = MockContractFactory::new();
    let mut contract = MockContractInstance::new();
    let mut first = MockPendingTransaction::new();
    let mut second = MockPendingTransaction::new();

    // Expectations are registered in the order the calls must happen.
    let factory_call = backend
        .expect_contract_factory()
        .with(eq(DEFAULT_CONTRACT))
        .times(1)
        .in_sequence(&mut seq);
    let deploy_call = factory.expect_deploy().times(1).in_sequence(&mut seq);
    contract.expect_address().return_const("0xABC123".to_string());
    contract
        .expect_deployed()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(outcome(1)));

    let first_call = contract
        .expect_invoke()
        .with(eq(DEFAULT_METHOD))
        .times(1)
        .in_sequence(&mut seq);
    first.expect_tx_hash().returning(|| "0x02".to_string());
    first
        .expect_wait()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|| Ok(outcome(2)));
    first_call.return_once(move |_| Ok(first));

    let second_call = contract
        .expect_invoke()
        .with(eq(DEFAULT_METHOD))
        .times(1)
        .in_sequence(&mut seq);
    second.expect_tx_hash().returning(|| "0x03".to_string());
    second
        .expect_wait()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|| Ok(outcome(3)));
    second_call.return_once(move |_| Ok(second));

    deploy_call.return_once(move || Ok(contract));
    factory_call.return_once(move |_| Ok(factory));

    let transcript = run_script_with(&backend, &nft_plan(2)).await;

    assert_eq!(transcript.status, RunStatus::Success);
    Ok(())
}

#[tokio::test]
async fn factory_failure_prints_error_only() -> anyhow::Result<()> {
    let mut backend = MockContractBackend::new();
    backend
        .expect_contract_factory()
        .return_once(|_| Err(scripted("artifact MyEpicNFT not found")));

    let transcript = run_script_with(&backend, &nft_plan(2)).await;

    assert_eq!(transcript.status, RunStatus::Failure);
    assert_eq!(transcript.status.code(), 1);
    assert_eq!(transcript.lines, vec!["artifact MyEpicNFT not found"]);
    assert_eq!(transcript.count("contract deployed to:"), 0);
    assert_eq!(transcript.count("Minted NFT"), 0);
    assert!(transcript.report.is_none());
    Ok(())
}

#[tokio::test]
async fn failed_deployment_submission_prints_error_only() -> anyhow::Result<()> {
    let mut factory = MockContractFactory::new();
    factory
        .expect_deploy()
        .times(1)
        .return_once(|| Err(scripted("insufficient funds")));
    let mut backend = MockContractBackend::new();
    backend
        .expect_contract_factory()
        .return_once(move |_| Ok(factory));

    let transcript = run_script_with(&backend, &nft_plan(2)).await;

    assert_eq!(transcript.status, RunStatus::Failure);
    assert_eq!(transcript.lines, vec!["insufficient funds"]);
    Ok(())
}

#[tokio::test]
async fn failed_deployment_confirmation_prints_no_address() -> anyhow::Result<()> {
    let mut contract = MockContractInstance::new();
    contract.expect_address().return_const("0xABC123".to_string());
    contract
        .expect_deployed()
        .returning(|| Err(scripted("transaction reverted")));
    contract.expect_invoke().never();
    let backend = backend_for(contract);

    let transcript = run_script_with(&backend, &nft_plan(2)).await;

    assert_eq!(transcript.status, RunStatus::Failure);
    assert_eq!(transcript.count("contract deployed to:"), 0);
    assert_eq!(transcript.lines.last().map(String::as_str), Some("transaction reverted"));
    Ok(())
}

#[tokio::test]
async fn first_invocation_failure_stops_minting() -> anyhow::Result<()> {
    let mut contract = deployed_contract("0xABC123");
    contract
        .expect_invoke()
        .times(1)
        .returning(|_| Err(scripted("insufficient funds for gas")));
    let backend = backend_for(contract);

    let transcript = run_script_with(&backend, &nft_plan(2)).await;

    assert_eq!(transcript.status, RunStatus::Failure);
    assert_eq!(
        transcript.lines,
        vec!["contract deployed to: 0xABC123", "insufficient funds for gas"]
    );
    assert_eq!(transcript.count("Minted NFT #2"), 0);
    Ok(())
}

#[tokio::test]
async fn second_invocation_revert_is_reported_after_first_mint() -> anyhow::Result<()> {
    let mut contract = deployed_contract("0xABC123");
    contract
        .expect_invoke()
        .times(1)
        .return_once(|_| Ok(confirming_tx(2)));
    contract
        .expect_invoke()
        .times(1)
        .return_once(|_| Ok(failing_tx("revert: insufficient balance")));
    let backend = backend_for(contract);

    let transcript = run_script_with(&backend, &nft_plan(2)).await;

    assert_eq!(transcript.status, RunStatus::Failure);
    assert_eq!(
        transcript.lines,
        vec![
            "contract deployed to: 0xABC123",
            "Minted NFT #1",
            "revert: insufficient balance",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn reruns_deploy_fresh_contracts() -> anyhow::Result<()> {
    let mut backend = MockContractBackend::new();
    backend.expect_contract_factory().times(2).returning(|_| {
        let mut factory = MockContractFactory::new();
        factory
            .expect_deploy()
            .times(1)
            .returning(|| Ok(deployed_contract(&random_address())));
        Ok(factory)
    });

    let first = run_script_with(&backend, &nft_plan(0)).await;
    let second = run_script_with(&backend, &nft_plan(0)).await;

    assert_eq!(first.status, RunStatus::Success);
    assert_eq!(second.status, RunStatus::Success);
    assert_ne!(first.lines, second.lines);
    Ok(())
}

#[tokio::test]
async fn invocation_count_is_configurable() -> anyhow::Result<()> {
    let backend = backend_for(minting_contract("0xABC123"));

    let transcript = run_script_with(&backend, &nft_plan(3)).await;

    assert_eq!(transcript.status, RunStatus::Success);
    assert_eq!(transcript.count("Minted NFT #"), 3);
    assert_eq!(transcript.lines.last().map(String::as_str), Some("Minted NFT #3"));
    Ok(())
}

#[tokio::test]
async fn failure_records_last_completed_stage() -> anyhow::Result<()> {
    let mut contract = deployed_contract("0xABC123");
    contract
        .expect_invoke()
        .times(1)
        .return_once(|_| Ok(confirming_tx(2)));
    contract
        .expect_invoke()
        .times(1)
        .return_once(|_| Ok(failing_tx("reverted")));
    let backend = backend_for(contract);
    let mut out = Vec::new();

    let failure = match helpers::run(&backend, &nft_plan(2), &mut out).await {
        Ok(report) => anyhow::bail!("expected failure, got {report:?}"),
        Err(failure) => failure,
    };

    assert_eq!(failure.stage, RunStage::Invoked(1));
    assert_eq!(failure.to_string(), "reverted");
    Ok(())
}
