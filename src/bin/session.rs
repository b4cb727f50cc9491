//! Terminal front-end for a `MindMinute` session
//!
//! Type how you feel to get a reset, then run the one-minute timer with
//! `start`, `pause` and `end`.

use mindminute::client::{DisplayKind, ResetClient, DEFAULT_SERVER_URL};
use mindminute::session::{
    ControlError, ControlVisibility, SessionContext, SessionRuntime, SessionView,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const RING_WIDTH: usize = 30;

struct TerminalView {
    circumference: f64,
}

impl TerminalView {
    fn new(context: &SessionContext) -> Self {
        Self {
            circumference: context.ring.circumference(),
        }
    }
}

impl SessionView for TerminalView {
    fn render(&mut self, remaining: u32, ring_offset: f64) {
        let progress = (ring_offset / self.circumference).clamp(0.0, 1.0);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let filled = (progress * RING_WIDTH as f64).round() as usize;
        println!(
            "  {remaining:>2}s [{}{}]",
            "#".repeat(filled),
            ".".repeat(RING_WIDTH - filled)
        );
    }

    fn show_controls(&mut self, controls: ControlVisibility) {
        let available: Vec<&str> = [
            (controls.start, "start"),
            (controls.pause, "pause"),
            (controls.end, "end"),
        ]
        .into_iter()
        .filter_map(|(shown, name)| shown.then_some(name))
        .collect();
        println!("  controls: {}", available.join(" | "));
    }

    fn completed(&mut self) {
        println!("  The minute is complete. Notice how you feel now.");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mindminute=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();

    let server_url =
        std::env::var("MINDMINUTE_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
    let client = ResetClient::new(&server_url)?;

    let context = SessionContext::default();
    let view = TerminalView::new(&context);
    let (session, task) = SessionRuntime::spawn(context, view);

    println!("How are you feeling right now? (commands: start, pause, end, quit)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let applied = match line.trim().to_lowercase().as_str() {
            "start" => session.start().await,
            "pause" => session.pause().await,
            "end" => session.end().await,
            "quit" | "exit" => break,
            _ => {
                println!("  Listening to you...");
                let display = client.request_reset(&line).await;
                if display.kind == DisplayKind::Reflection {
                    println!("{}", display.text);
                    println!("Type `start` when you are ready for your minute.");
                } else {
                    println!("  {}", display.text);
                }
                continue;
            }
        };
        match applied {
            Ok(_) => {}
            Err(ControlError::Rejected(reason)) => println!("  ({reason})"),
            Err(ControlError::Stopped) => {
                tracing::error!("Session runtime stopped unexpectedly");
                break;
            }
        }
    }

    drop(session);
    task.await?;
    Ok(())
}
