//! # `crs demo` — Scripted Concurrent-Verification Scenario
//!
//! Creates one confidential record, then fires a configurable number of
//! concurrent verification requests at it through the coordinator and
//! reports which caller committed, who observed the committed value, and
//! the final record state. The provider runs with artificial latency so
//! the race window is real.

use clap::Args;

use crs_core::{LifecycleTag, OwnerId, PublicAttributes, RecordId};
use crs_compute::MockConfidentialCompute;
use std::time::Duration;

/// Arguments for the `demo` subcommand.
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// The confidential value to encrypt into the record.
    #[arg(long, default_value_t = 42)]
    pub secret: u64,

    /// Number of stakeholders racing to verify the record.
    #[arg(long, default_value_t = 4)]
    pub stakeholders: usize,

    /// Artificial provider round-trip latency in milliseconds.
    #[arg(long, default_value_t = 25)]
    pub latency_ms: u64,
}

/// Run the scenario and print a per-stakeholder report.
pub async fn run(args: DemoArgs) -> anyhow::Result<()> {
    let provider =
        MockConfidentialCompute::new().with_latency(Duration::from_millis(args.latency_ms));
    let api = crate::assemble(provider);

    let id = api
        .create(
            RecordId::new(),
            OwnerId::new("demo-owner")?,
            PublicAttributes {
                name: "Demo shipment".to_string(),
                description: "Scripted concurrent-verification scenario".to_string(),
                tag: LifecycleTag::InTransit,
            },
            args.secret,
        )
        .await?;
    println!("created {id} (secret value {} encrypted)", args.secret);

    let tasks: Vec<_> = (0..args.stakeholders)
        .map(|caller| {
            let api = api.clone();
            tokio::spawn(async move { (caller, api.request_verification(&id).await) })
        })
        .collect();

    for task in tasks {
        let (caller, result) = task.await?;
        match result {
            Ok(outcome) => println!(
                "stakeholder {caller}: clear value {} ({})",
                outcome.clear_value, outcome.kind
            ),
            Err(err) => println!("stakeholder {caller}: error: {err}"),
        }
    }

    let record = api.get(&id)?;
    println!(
        "final state: status={} version={} clear_value={:?}",
        record.status, record.version, record.clear_value
    );
    Ok(())
}
