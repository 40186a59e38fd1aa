//! Tests for the terminal session loop.

use quantum_tictactoe::{EngineSettings, Offline, QuantumBoardEngine, SeedStrategy};
use quantum_tictactoe_server::terminal::run_session;

fn offline_engine() -> QuantumBoardEngine<Offline> {
    QuantumBoardEngine::with_settings(
        Offline,
        EngineSettings::default()
            .with_seed(SeedStrategy::Fixed(1))
            .with_fallback_seed(Some(5)),
    )
}

async fn run(engine: &mut QuantumBoardEngine<Offline>, script: &str) -> String {
    let mut output = Vec::new();
    run_session(engine, script.as_bytes(), &mut output)
        .await
        .unwrap();
    String::from_utf8(output).unwrap()
}

#[tokio::test]
async fn test_session_places_a_move() {
    let mut engine = offline_engine();
    let output = run(&mut engine, "0\n1\n").await;

    assert!(output.contains("Select one more cell"));
    assert!(output.contains("Select two cells for your quantum move"));
    assert!(output.contains("X1"));
    assert!(output.contains("Player O to move | move 2"));
    assert!(output.contains("measurement: disconnected (using fallback)"));
    assert_eq!(engine.state().move_number(), 2);
}

#[tokio::test]
async fn test_session_reports_bad_input() {
    let mut engine = offline_engine();
    let output = run(&mut engine, "bogus\n12\n").await;

    assert!(output.contains("Unknown command: bogus"));
    assert!(output.contains("Cell index 12 is out of range (must be 0-8)"));
    assert_eq!(engine.state().move_number(), 1);
}

#[tokio::test]
async fn test_session_collapses_on_third_move() {
    let mut engine = offline_engine();
    let output = run(&mut engine, "0\n1\n2\n3\n4\n5\nhistory\n").await;

    assert!(output.contains("Move X3 collapsed to cell"));
    assert!(output.contains("(fallback)"));
    assert!(output.contains("X1 -> cells 0 and 1"));
    assert!(output.contains("Player O to move | move 4"));
}

#[tokio::test]
async fn test_quit_stops_reading() {
    let mut engine = offline_engine();
    run(&mut engine, "quit\n0\n").await;
    assert!(engine.state().selected_cells().is_empty());
}

#[tokio::test]
async fn test_reset_starts_over() {
    let mut engine = offline_engine();
    run(&mut engine, "0\n1\nreset\n").await;
    assert_eq!(engine.state().move_number(), 1);
    assert!(engine.state().history().is_empty());
}
