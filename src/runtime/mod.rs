use std::env;
use std::error::Error;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::actions::ActionDispatcher;
use crate::artwork::FsContentResolver;
use crate::config::Settings;
use crate::host::{FileHost, TerminalHost};
use crate::logging;
use crate::pipeline::RefreshPipeline;
use crate::session::MprisClient;
use crate::store::{FileStateStore, snapshot_or_default};

mod event_loop;
mod settings;

const USAGE: &str = "usage: nowplaying-widget [watch | once | set key=value...]";

/// What the command line asked for.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Live terminal widget.
    Watch,
    /// One tick into the file host.
    Once,
    /// Update the persisted snapshot.
    Set(Vec<(String, String)>),
}

pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Command, String> {
    let mut args = args.into_iter();
    let command = match args.next().as_deref() {
        None | Some("watch") => Command::Watch,
        Some("once") => Command::Once,
        Some("set") => {
            let pairs = args
                .by_ref()
                .map(|arg| {
                    arg.split_once('=')
                        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                        .ok_or_else(|| format!("expected key=value, got `{arg}`"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            if pairs.is_empty() {
                return Err(USAGE.to_string());
            }
            return Ok(Command::Set(pairs));
        }
        Some("-h" | "--help" | "help") => return Err(USAGE.to_string()),
        Some(other) => return Err(format!("unknown command `{other}`\n{USAGE}")),
    };
    match args.next() {
        None => Ok(command),
        Some(extra) => Err(format!("unexpected argument `{extra}`\n{USAGE}")),
    }
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let command = parse_args(env::args().skip(1))?;
    let (settings, warning) = settings::load_settings();

    let _log_guard = match command {
        Command::Watch => Some(logging::init_file(&settings.log.level, &settings.log_dir())?),
        _ => {
            logging::init_stderr(&settings.log.level);
            None
        }
    };
    if let Some(w) = warning {
        warn!("{w}");
    }

    match command {
        Command::Set(pairs) => set(&settings, &pairs),
        Command::Once => once(&settings),
        Command::Watch => watch(&settings),
    }
}

fn set(settings: &Settings, pairs: &[(String, String)]) -> Result<(), Box<dyn Error>> {
    let store = FileStateStore::new(settings.store_path());
    let mut snapshot = snapshot_or_default(&store);
    for (key, value) in pairs {
        snapshot.assign(key, value)?;
    }
    store.save(&snapshot)?;
    info!(path = %store.path().display(), "snapshot saved");
    Ok(())
}

fn once(settings: &Settings) -> Result<(), Box<dyn Error>> {
    let client = MprisClient::new(settings.session.players.clone(), settings.session.priority);
    let pipeline = RefreshPipeline::new(&client, FsContentResolver, settings);
    let store = FileStateStore::new(settings.store_path());
    let mut host = FileHost::new(settings.output_dir());

    let ids = &settings.widget.instances;
    let committed = pipeline.on_update(&mut host, ids, &snapshot_or_default(&store));
    info!(
        committed,
        total = ids.len(),
        dir = %settings.output_dir().display(),
        "widgets refreshed"
    );
    if committed < ids.len() {
        let failed = ids.len() - committed;
        return Err(format!("{failed} of {} widget commits failed", ids.len()).into());
    }
    Ok(())
}

fn watch(settings: &Settings) -> Result<(), Box<dyn Error>> {
    let client = MprisClient::new(settings.session.players.clone(), settings.session.priority);
    let pipeline = RefreshPipeline::new(&client, FsContentResolver, settings);
    let dispatcher = ActionDispatcher::new(&client);
    let store = FileStateStore::new(settings.store_path());
    let mut host = TerminalHost::new();

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        settings,
        &pipeline,
        &dispatcher,
        &store,
        &mut host,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

#[cfg(test)]
mod tests;
