// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `nuketune delete` command implementation.
//!
//! Shows the preview, asks for the confirmation phrase on stdin, then runs
//! the deletion with one progress bar per category. While running, stdin
//! accepts `p` (pause), `r` (resume) and `c` (cancel); SIGINT and SIGTERM
//! cancel as well. The log is written whether or not the run was cancelled.

use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use nuketune_config::NukeTuneConfig;
use nuketune_core::{DeletionPhase, NukeError};
use nuketune_engine::shutdown::{cancel_session_on, install_signal_handler};
use nuketune_engine::{RunSummary, Session, SessionSnapshot};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::task::JoinHandle;
use tracing::info;

use crate::Selection;
use crate::preview::{build_engine, load_selection, render_preview};

type StdinLines = Lines<BufReader<Stdin>>;

/// What a line typed during a run asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunCommand {
    Pause,
    Resume,
    Cancel,
}

fn parse_command(line: &str) -> Option<RunCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "pause" => Some(RunCommand::Pause),
        "r" | "resume" => Some(RunCommand::Resume),
        "c" | "cancel" => Some(RunCommand::Cancel),
        _ => None,
    }
}

/// Run the `nuketune delete` command.
pub async fn run_delete(
    config: &NukeTuneConfig,
    selection: &Selection,
    log_path: Option<&Path>,
) -> Result<(), NukeError> {
    let engine = build_engine(config)?;
    let session = Arc::clone(engine.session());
    load_selection(&engine, selection).await?;

    let use_color = std::io::stdout().is_terminal();
    let snapshot = session.snapshot();
    print!("{}", render_preview(&snapshot, use_color));
    if snapshot.total_object_count() == 0 {
        println!("Nothing to delete.");
        return Ok(());
    }

    session.open_preview()?;
    let phrase = session.confirmation_phrase().to_string();
    println!();
    println!("This permanently deletes the objects above. Type {phrase} to continue:");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let typed = lines
        .next_line()
        .await
        .map_err(|e| NukeError::Internal(format!("failed to read stdin: {e}")))?
        .unwrap_or_default();
    if let Err(e) = session.begin_confirmation(typed.trim()) {
        println!("Aborted: {e}");
        session.close_preview()?;
        return Ok(());
    }

    let signal = install_signal_handler();
    let forward = cancel_session_on(signal.clone(), Arc::clone(&session));
    let multi = MultiProgress::new();
    let controls = spawn_controls(lines, Arc::clone(&session), multi.clone());
    let progress = spawn_progress(&session, &multi);

    eprintln!("Deleting. Type p to pause, r to resume, c to cancel.");
    let summary = engine.start_deletion().await?;

    let _ = progress.await;
    controls.abort();
    forward.abort();
    signal.cancel();

    print_summary(&summary, &session.snapshot(), use_color);

    let written = match log_path {
        Some(path) => engine.write_log_to(path).await.map(|()| path.to_path_buf()),
        None => engine.write_log(Path::new(&config.general.export_dir)).await,
    }?;
    println!("Deletion log written to {}", written.display());
    Ok(())
}

/// Reads run commands from stdin until cancelled or stdin closes.
fn spawn_controls(
    mut lines: StdinLines,
    session: Arc<Session>,
    multi: MultiProgress,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Ok(Some(line)) = lines.next_line().await {
            let feedback = match parse_command(&line) {
                Some(RunCommand::Pause) => match session.pause() {
                    Ok(()) => "paused; r to resume".to_string(),
                    Err(e) => e.to_string(),
                },
                Some(RunCommand::Resume) => {
                    session.resume();
                    "resumed".to_string()
                }
                Some(RunCommand::Cancel) => {
                    session.cancel();
                    let _ = multi.println("cancelling; in-flight deletes will finish");
                    break;
                }
                None if line.trim().is_empty() => continue,
                None => format!("unknown command `{}` (p, r or c)", line.trim()),
            };
            let _ = multi.println(feedback);
        }
    })
}

/// One bar per category with candidates, driven by session snapshots.
fn spawn_progress(session: &Session, multi: &MultiProgress) -> JoinHandle<()> {
    let style = ProgressStyle::with_template("{prefix:>32} [{bar:30}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");

    let bars: Vec<(String, ProgressBar)> = session
        .snapshot()
        .selected_categories()
        .filter(|c| c.selected_object_count() > 0)
        .map(|c| {
            let bar = multi.add(ProgressBar::new(c.selected_object_count() as u64));
            bar.set_style(style.clone());
            bar.set_prefix(c.category.name.clone());
            (c.id().to_string(), bar)
        })
        .collect();

    let mut rx = session.subscribe();
    tokio::spawn(async move {
        loop {
            let snapshot = Arc::clone(&rx.borrow_and_update());
            update_bars(&bars, &snapshot);
            if snapshot.phase == DeletionPhase::Complete {
                break;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
        for (_, bar) in &bars {
            bar.finish();
        }
    })
}

fn update_bars(bars: &[(String, ProgressBar)], snapshot: &SessionSnapshot) {
    for (id, bar) in bars {
        let Some(state) = snapshot.category(id) else {
            continue;
        };
        bar.set_position(state.processed() as u64);
        let mut message = format!(
            "{} deleted, {} failed, {} skipped",
            state.deleted_count, state.failed_count, state.skipped_count
        );
        if snapshot.is_paused {
            message.push_str(" (paused)");
        }
        bar.set_message(message);
    }
}

fn print_summary(summary: &RunSummary, snapshot: &SessionSnapshot, use_color: bool) {
    let stats = snapshot.deletion_stats();
    info!(
        deleted = stats.deleted,
        failed = stats.failed,
        skipped = stats.skipped,
        "run summary"
    );

    println!();
    println!("  nuketune delete");
    println!("  {}", "-".repeat(35));
    if use_color {
        use colored::Colorize;
        println!("    Deleted:   {}", stats.deleted.to_string().green());
        println!("    Failed:    {}", stats.failed.to_string().red());
        println!("    Skipped:   {}", stats.skipped.to_string().yellow());
    } else {
        println!("    Deleted:   {}", stats.deleted);
        println!("    Failed:    {}", stats.failed);
        println!("    Skipped:   {}", stats.skipped);
    }
    println!("    Remaining: {}", stats.remaining);
    if summary.cancelled {
        println!("    Run was cancelled; categories not reached were left untouched.");
    }
    println!();
}
