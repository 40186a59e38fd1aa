//! Line-based terminal session driving the engine.
//!
//! Reads cell indices and commands from any async reader and writes the
//! board and messages to any async writer, so the same loop serves stdin
//! and tests.

use crate::config::GameConfig;
use crate::error::ServerError;
use crate::http_source::{HttpMeasurementSource, SimulatedMeasurement};
use anyhow::Result;
use quantum_tictactoe::{
    GameState, HistoryEntry, MeasurementSource, Offline, QuantumBoardEngine, Transition,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument};

const HELP: &str = "Commands: a cell index 0-8 to select or deselect it, \
`board`, `history`, `reset`, `help`, `quit`";

/// A parsed line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Select or deselect a cell.
    Select(usize),
    /// Print the board.
    Board,
    /// Print the move history.
    History,
    /// Start a new game.
    Reset,
    /// Print the command list.
    Help,
    /// Leave the session.
    Quit,
}

/// Parses one line of input.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if let Ok(index) = line.parse::<usize>() {
        return Some(Command::Select(index));
    }
    match line.to_lowercase().as_str() {
        "board" | "b" => Some(Command::Board),
        "history" | "h" => Some(Command::History),
        "reset" | "r" => Some(Command::Reset),
        "help" | "?" => Some(Command::Help),
        "quit" | "q" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

/// Picks the measurement source for a session.
///
/// `simulate` runs the qubit simulation in-process; otherwise the configured
/// backend URL is used, or no source at all.
#[instrument(skip(config))]
pub fn build_source(
    config: &GameConfig,
    simulate: bool,
) -> Result<Box<dyn MeasurementSource>, ServerError> {
    if simulate {
        info!("Using in-process measurement simulator");
        return Ok(Box::new(SimulatedMeasurement));
    }
    match config.measurement_url() {
        Some(url) => {
            info!(%url, "Using HTTP measurement backend");
            let source = HttpMeasurementSource::new(url, config.measurement_timeout())
                .map_err(|e| ServerError::new(e.message))?;
            Ok(Box::new(source))
        }
        None => {
            info!("No measurement backend configured, collapses use the fallback coin");
            Ok(Box::new(Offline))
        }
    }
}

fn status_line<M: MeasurementSource>(engine: &QuantumBoardEngine<M>) -> String {
    let state = engine.state();
    let link = if engine.remote_available() {
        "connected"
    } else {
        "disconnected (using fallback)"
    };
    format!(
        "Player {} to move | move {} | measurement: {}",
        state.current_player(),
        state.move_number(),
        link
    )
}

fn history_text(state: &GameState) -> String {
    if state.history().is_empty() {
        return "No moves yet".to_string();
    }
    state
        .history()
        .iter()
        .map(|entry| match entry {
            HistoryEntry::Placed(mv) => format!("  {}", mv),
            HistoryEntry::Collapsed(record) => format!("  {}", record),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}

/// Runs the session until `quit` or end of input.
#[instrument(skip_all)]
pub async fn run_session<M, R, W>(
    engine: &mut QuantumBoardEngine<M>,
    input: R,
    mut output: W,
) -> Result<()>
where
    M: MeasurementSource,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    engine.refresh_connectivity().await;
    write_line(&mut output, "Quantum tic-tac-toe. Select two cells for your quantum move.").await?;
    write_line(&mut output, HELP).await?;
    write_line(&mut output, &engine.state().board().display()).await?;
    write_line(&mut output, &status_line(engine)).await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = parse_command(&line) else {
            write_line(&mut output, &format!("Unknown command: {}. {}", line.trim(), HELP)).await?;
            continue;
        };
        debug!(?command, "Player command");

        match command {
            Command::Select(index) => match engine.select_cell(index).await {
                Ok(transition) => {
                    write_line(&mut output, &transition.to_string()).await?;
                    if matches!(
                        transition,
                        Transition::Placed(_) | Transition::Collapsed { .. }
                    ) {
                        write_line(&mut output, &engine.state().board().display()).await?;
                    }
                    match engine.state().outcome() {
                        Some(_) => {
                            write_line(&mut output, "Type `reset` to play again.").await?
                        }
                        None => write_line(&mut output, &status_line(engine)).await?,
                    }
                }
                Err(e) => write_line(&mut output, &e.to_string()).await?,
            },
            Command::Board => {
                write_line(&mut output, &engine.state().board().display()).await?;
                write_line(&mut output, &status_line(engine)).await?;
            }
            Command::History => write_line(&mut output, &history_text(engine.state())).await?,
            Command::Reset => {
                engine.reset();
                engine.refresh_connectivity().await;
                write_line(&mut output, "Select two cells for your quantum move").await?;
                write_line(&mut output, &engine.state().board().display()).await?;
                write_line(&mut output, &status_line(engine)).await?;
            }
            Command::Help => write_line(&mut output, HELP).await?,
            Command::Quit => break,
        }
    }

    info!("Session ended");
    Ok(())
}
