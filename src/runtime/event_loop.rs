use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::actions::{
    ActionDispatcher, AppLauncher, ControlTargets, MediaButtonSink, PendingAction,
};
use crate::artwork::ContentResolver;
use crate::config::Settings;
use crate::host::TerminalHost;
use crate::pipeline::RefreshPipeline;
use crate::session::SessionProvider;
use crate::store::{StateStore, snapshot_or_default};

/// Longest we block on input, so resizes and ticks stay responsive.
const MAX_POLL: Duration = Duration::from_millis(250);

/// What a key press asks the loop to do.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    Toggle,
    Next,
    Previous,
    OpenApp,
    Refresh,
    Quit,
}

impl KeyCommand {
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Self::Quit),
            KeyCode::Char(' ') | KeyCode::Char('p') => Some(Self::Toggle),
            KeyCode::Char('l') => Some(Self::Next),
            KeyCode::Char('h') => Some(Self::Previous),
            KeyCode::Enter | KeyCode::Char('o') => Some(Self::OpenApp),
            KeyCode::Char('r') => Some(Self::Refresh),
            KeyCode::Char('q') | KeyCode::Esc => Some(Self::Quit),
            _ => None,
        }
    }

    /// The widget action this command fires, if any.
    pub fn target(self, actions: &ControlTargets) -> Option<&PendingAction> {
        match self {
            Self::Toggle => Some(&actions.toggle),
            Self::Next => Some(&actions.next),
            Self::Previous => Some(&actions.previous),
            Self::OpenApp => Some(&actions.open_app),
            Self::Refresh | Self::Quit => None,
        }
    }
}

/// Tick on the configured interval, redraw, and fire the primary widget's
/// actions from the keyboard. Any fired action triggers an immediate tick.
pub fn run<P, R, S, L>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &Settings,
    pipeline: &RefreshPipeline<P, R>,
    dispatcher: &ActionDispatcher<S, L>,
    store: &dyn StateStore,
    host: &mut TerminalHost,
) -> Result<(), Box<dyn std::error::Error>>
where
    P: SessionProvider,
    R: ContentResolver,
    S: MediaButtonSink,
    L: AppLauncher,
{
    let interval = Duration::from_millis(settings.widget.refresh_interval_ms);
    let mut next_tick = Instant::now();

    loop {
        if Instant::now() >= next_tick {
            let snapshot = snapshot_or_default(store);
            pipeline.on_update(host, &settings.widget.instances, &snapshot);
            next_tick = Instant::now() + interval;
        }

        terminal.draw(|f| host.draw(f))?;

        let timeout = next_tick
            .saturating_duration_since(Instant::now())
            .min(MAX_POLL);
        if !event::poll(timeout)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match KeyCommand::from_key(key) {
            Some(KeyCommand::Quit) => break,
            Some(KeyCommand::Refresh) => next_tick = Instant::now(),
            Some(cmd) => {
                let action = host
                    .primary()
                    .and_then(|view| cmd.target(&view.actions))
                    .cloned();
                match action {
                    Some(action) => dispatcher.dispatch(&action),
                    None => debug!(?cmd, "no widget rendered yet"),
                }
                next_tick = Instant::now();
            }
            None => {}
        }
    }

    Ok(())
}
