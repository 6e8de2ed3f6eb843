use anyhow::Result;
use dsa_mentor_core::{AnswerSource, AskClient, Config, DispatchReceiver, QueryDispatcher};
use tracing::{error, info};

mod app;
mod handler;
mod logging;
mod markdown;
mod tui;
mod ui;

use app::App;
use handler::handle_event;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    let log_path = logging::init()?;

    let config = Config::load()?;
    let client = AskClient::new(config.endpoint(), config.request_timeout())?;
    info!(
        endpoint = client.endpoint(),
        debounce_ms = config.debounce().as_millis() as u64,
        log = %log_path.display(),
        "starting dsa-mentor"
    );

    let (dispatcher, dispatch_rx) = QueryDispatcher::new(client, config.debounce());
    let mut app = App::new(dispatcher);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, &mut app, dispatch_rx).await;

    tui::restore()?;
    if let Err(e) = &result {
        error!("exiting with error: {e:#}");
    }
    result
}

async fn run<S: AnswerSource>(
    terminal: &mut Tui,
    app: &mut App<S>,
    mut dispatch_rx: DispatchReceiver,
) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        tokio::select! {
            Some(event) = events.next() => handle_event(app, event),
            Some(event) = dispatch_rx.recv() => app.apply(event),
            else => break,
        }
    }

    info!("user quit");
    Ok(())
}
