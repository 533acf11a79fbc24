use std::io::Write;
use std::time::Duration;

use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use tokio::time::Instant;

use volley::metrics::ProgressSnapshot;
use volley::progress::{Observer, ProgressEvent};

const RENDER_INTERVAL: Duration = Duration::from_millis(100);

/// Draws a single progress line on stderr until the run finishes.
pub(super) fn setup_progress_indicator(
    mut observer: Observer,
    no_color: bool,
) -> tokio::task::JoinHandle<()> {
    let style = ProgressStyle::new(30);
    tokio::spawn(async move {
        let mut last_render: Option<Instant> = None;
        let mut latest: Option<ProgressSnapshot> = None;

        while let Some(event) = observer.receiver.recv().await {
            match event {
                ProgressEvent::Started { .. } => {}
                ProgressEvent::Progress(snapshot) => {
                    let due = last_render.is_none_or(|at| at.elapsed() >= RENDER_INTERVAL);
                    if due {
                        if render_progress_line(&style, &snapshot, no_color).is_err() {
                            break;
                        }
                        last_render = Some(Instant::now());
                    }
                    latest = Some(snapshot);
                }
                ProgressEvent::Finished(_) => {
                    if let Some(snapshot) = latest.as_ref() {
                        drop(render_progress_line(&style, snapshot, no_color));
                    }
                    drop(finish_progress_line());
                    break;
                }
            }
        }
    })
}

fn render_progress_line(
    style: &ProgressStyle,
    snapshot: &ProgressSnapshot,
    no_color: bool,
) -> Result<(), std::io::Error> {
    let line = build_progress_line(style, snapshot, no_color);

    let mut out = std::io::stderr();
    queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    for segment in line {
        if let Some(color) = segment.color {
            queue!(
                out,
                SetForegroundColor(color),
                Print(&segment.text),
                ResetColor
            )?;
        } else {
            queue!(out, Print(&segment.text))?;
        }
    }
    out.flush()?;
    Ok(())
}

fn finish_progress_line() -> Result<(), std::io::Error> {
    let mut out = std::io::stderr();
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn build_progress_line(
    style: &ProgressStyle,
    snapshot: &ProgressSnapshot,
    no_color: bool,
) -> Vec<ProgressSegment> {
    let size = style.size.max(1);
    let goal = u128::from(snapshot.total.max(1));
    let current = u128::from(snapshot.completed).min(goal);
    let size_u128 = u128::from(u64::try_from(size).unwrap_or(u64::MAX));

    let scaled = current
        .saturating_mul(size_u128)
        .checked_div(goal)
        .unwrap_or(0);
    let complete_size = usize::try_from(scaled).unwrap_or(size).min(size);
    let incomplete_size = size.saturating_sub(complete_size);

    let progress_bar = format!(
        "{}{}{}{}",
        style.begin,
        style.fill.repeat(complete_size),
        style.empty.repeat(incomplete_size),
        style.end
    );
    let percent_text = format!(" {}%", snapshot.percentage);
    let count_text = format!(" {}/{}", snapshot.completed, snapshot.total);
    let rate_text = format!(
        " | {} req/s | avg {}ms",
        snapshot.current_rps, snapshot.avg_response_time
    );
    let fail_text = format!(" | {} failed", snapshot.fail_count);

    if no_color {
        vec![
            ProgressSegment::plain(progress_bar),
            ProgressSegment::plain(percent_text),
            ProgressSegment::plain(count_text),
            ProgressSegment::plain(rate_text),
            ProgressSegment::plain(fail_text),
        ]
    } else {
        let fail_color = if snapshot.fail_count > 0 {
            Color::Red
        } else {
            Color::DarkGrey
        };
        vec![
            ProgressSegment::plain(progress_bar),
            ProgressSegment::colored(percent_text, Color::Cyan),
            ProgressSegment::plain(count_text),
            ProgressSegment::colored(rate_text, Color::Yellow),
            ProgressSegment::colored(fail_text, fail_color),
        ]
    }
}

struct ProgressStyle {
    size: usize,
    begin: String,
    end: String,
    fill: String,
    empty: String,
}

impl ProgressStyle {
    fn new(size: usize) -> Self {
        Self {
            size,
            begin: "[".to_owned(),
            end: "]".to_owned(),
            fill: "#".to_owned(),
            empty: "-".to_owned(),
        }
    }
}

struct ProgressSegment {
    text: String,
    color: Option<Color>,
}

impl ProgressSegment {
    const fn plain(text: String) -> Self {
        Self { text, color: None }
    }

    const fn colored(text: String, color: Color) -> Self {
        Self {
            text,
            color: Some(color),
        }
    }
}
