//! Pipe network demo.
//!
//! Generates a seeded workload, applies it to a verifying session while
//! recording a replay log, then replays the log on a fresh session and checks
//! that both end in the same state.
//!
//! Run with: `RUST_LOG=info cargo run -p pipenet-engine --example pipe_demo [seed]`

use pipenet_engine::prelude::*;
use tracing::info;

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let seed = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 42,
    };
    let scenario = ScenarioConfig {
        seed,
        edits: 2_000,
        ..Default::default()
    };
    let edits = generate_edits(&scenario)?;
    info!(seed, edits = edits.len(), "generated workload");

    let config = SessionConfig {
        verify_invariants: true,
        journal_capacity: None,
        ..Default::default()
    };
    let mut session = PipeSession::new(config.clone());
    let mut recorder = ReplayRecorder::new(session.capture_snapshot(), 100);

    for edit in edits {
        recorder.record_edit(session.edit_count(), edit, Some(session.state_hash()))?;
        session.apply(edit)?;
    }
    let log = recorder.finish(Some(session.state_hash()));

    let journal = session.journal();
    info!(
        pipes = session.world().len(),
        groups = session.network().group_count(),
        changes = journal.len(),
        merges = journal.merges().count(),
        splits = journal.splits().count(),
        "workload applied"
    );

    if let Some((id, group)) = session.network().groups().max_by_key(|(_, g)| g.len()) {
        if let Some(cell) = group.sorted_members().first().copied() {
            let mesh = session.highlight_at(cell).unwrap_or_default();
            info!(
                group = %id,
                members = group.len(),
                quads = mesh.quad_count(),
                "largest group"
            );
        }
    }

    let mut fresh = PipeSession::new(config);
    let result = replay(&mut fresh, &log)?;
    anyhow::ensure!(
        result.completed && fresh.state_hash() == session.state_hash(),
        "replay diverged: {:?}",
        result.first_divergence
    );
    info!(edits = result.edits_replayed, hash = %fresh.state_hash(), "replay verified");
    Ok(())
}
