//! Control actions attached to the widget, and their dispatch.
//!
//! Actions are plain descriptors built at render time. They are fired later,
//! when the user activates a control, by `ActionDispatcher`.

use std::process::{Child, Command};
use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::session::SessionError;

/// Request code reused by every open-app action so re-renders replace it.
pub const OPEN_APP_REQUEST_CODE: i32 = 1001;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("unable to open app: no launch command configured")]
    NoLaunchCommand,

    #[error("unable to open app: {0}")]
    Launch(#[from] std::io::Error),
}

/// Standard media buttons.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKey {
    PlayPause,
    Next,
    Previous,
}

impl MediaKey {
    /// Media key code, used as the action's request code.
    pub fn key_code(self) -> i32 {
        match self {
            MediaKey::PlayPause => 85,
            MediaKey::Next => 87,
            MediaKey::Previous => 88,
        }
    }
}

/// How the host application is brought up.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LaunchFlags {
    /// Start outside the widget's own process.
    pub new_task: bool,
    /// Reuse a running instance instead of stacking a new one.
    pub clear_top: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LaunchIntent {
    pub command: Vec<String>,
    pub flags: LaunchFlags,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionKind {
    MediaButton { key: MediaKey },
    OpenApp(LaunchIntent),
}

/// Deferred action bound to one control of the widget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PendingAction {
    pub request_code: i32,
    #[serde(flatten)]
    pub kind: ActionKind,
}

/// All actions the widget layout carries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ControlTargets {
    pub toggle: PendingAction,
    pub next: PendingAction,
    pub previous: PendingAction,
    /// Attached to the root container.
    pub open_app: PendingAction,
}

pub fn media_button(key: MediaKey) -> PendingAction {
    PendingAction {
        request_code: key.key_code(),
        kind: ActionKind::MediaButton { key },
    }
}

pub fn open_app(command: &[String]) -> PendingAction {
    PendingAction {
        request_code: OPEN_APP_REQUEST_CODE,
        kind: ActionKind::OpenApp(LaunchIntent {
            command: command.to_vec(),
            flags: LaunchFlags {
                new_task: true,
                clear_top: true,
            },
        }),
    }
}

pub fn control_targets(launch_command: &[String]) -> ControlTargets {
    ControlTargets {
        toggle: media_button(MediaKey::PlayPause),
        next: media_button(MediaKey::Next),
        previous: media_button(MediaKey::Previous),
        open_app: open_app(launch_command),
    }
}

/// Receiver of media-button presses.
pub trait MediaButtonSink {
    fn press(&self, key: MediaKey) -> Result<(), ActionError>;
}

impl<T: MediaButtonSink + ?Sized> MediaButtonSink for &T {
    fn press(&self, key: MediaKey) -> Result<(), ActionError> {
        (**self).press(key)
    }
}

/// Brings up the host application.
pub trait AppLauncher {
    fn launch(&self, intent: &LaunchIntent) -> Result<(), ActionError>;
}

/// Spawns the launch command as a child process.
#[derive(Debug, Default)]
pub struct ProcessLauncher {
    launched: Mutex<Option<Child>>,
}

impl ProcessLauncher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AppLauncher for ProcessLauncher {
    fn launch(&self, intent: &LaunchIntent) -> Result<(), ActionError> {
        let (program, args) = intent
            .command
            .split_first()
            .filter(|(p, _)| !p.is_empty())
            .ok_or(ActionError::NoLaunchCommand)?;

        let mut launched = self
            .launched
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if intent.flags.clear_top {
            if let Some(child) = launched.as_mut() {
                if matches!(child.try_wait(), Ok(None)) {
                    info!(pid = child.id(), "app already running");
                    return Ok(());
                }
            }
        }

        let child = Command::new(program).args(args).spawn()?;
        info!(pid = child.id(), program = %program, "app launched");
        *launched = Some(child);
        Ok(())
    }
}

/// Fires pending actions.
pub struct ActionDispatcher<S, L = ProcessLauncher> {
    sink: S,
    launcher: L,
}

impl<S: MediaButtonSink> ActionDispatcher<S> {
    pub fn new(sink: S) -> Self {
        Self::with_launcher(sink, ProcessLauncher::new())
    }
}

impl<S: MediaButtonSink, L: AppLauncher> ActionDispatcher<S, L> {
    pub fn with_launcher(sink: S, launcher: L) -> Self {
        Self { sink, launcher }
    }

    /// Fire `action`. Failures are logged, never returned to the caller.
    pub fn dispatch(&self, action: &PendingAction) {
        let result = match &action.kind {
            ActionKind::MediaButton { key } => self.sink.press(*key),
            ActionKind::OpenApp(intent) => self.launcher.launch(intent),
        };
        match result {
            Ok(()) => debug!(request_code = action.request_code, "action dispatched"),
            Err(e) => warn!(request_code = action.request_code, "{e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSink {
        pressed: RefCell<Vec<MediaKey>>,
    }

    impl MediaButtonSink for RecordingSink {
        fn press(&self, key: MediaKey) -> Result<(), ActionError> {
            self.pressed.borrow_mut().push(key);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingLauncher {
        launched: RefCell<Vec<Vec<String>>>,
    }

    impl AppLauncher for RecordingLauncher {
        fn launch(&self, intent: &LaunchIntent) -> Result<(), ActionError> {
            self.launched.borrow_mut().push(intent.command.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl MediaButtonSink for FailingSink {
        fn press(&self, _key: MediaKey) -> Result<(), ActionError> {
            Err(SessionError::NoSession.into())
        }
    }

    #[test]
    fn control_targets_use_media_key_codes_and_fixed_open_code() {
        let t = control_targets(&["player".to_string()]);
        assert_eq!(t.toggle.request_code, 85);
        assert_eq!(t.next.request_code, 87);
        assert_eq!(t.previous.request_code, 88);
        assert_eq!(t.open_app.request_code, OPEN_APP_REQUEST_CODE);
        assert_eq!(
            t.toggle.kind,
            ActionKind::MediaButton {
                key: MediaKey::PlayPause
            }
        );
        match &t.open_app.kind {
            ActionKind::OpenApp(intent) => {
                assert_eq!(intent.command, vec!["player".to_string()]);
                assert!(intent.flags.new_task);
                assert!(intent.flags.clear_top);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn repeated_builds_are_identical() {
        let cmd = vec!["player".to_string(), "--raise".to_string()];
        assert_eq!(control_targets(&cmd), control_targets(&cmd));
    }

    #[test]
    fn dispatch_routes_media_buttons_to_sink() {
        let d =
            ActionDispatcher::with_launcher(RecordingSink::default(), RecordingLauncher::default());
        let t = control_targets(&[]);
        d.dispatch(&t.toggle);
        d.dispatch(&t.next);
        d.dispatch(&t.previous);
        assert!(d.launcher.launched.borrow().is_empty());
        assert_eq!(
            *d.sink.pressed.borrow(),
            vec![MediaKey::PlayPause, MediaKey::Next, MediaKey::Previous]
        );
    }

    #[test]
    fn dispatch_swallows_failures() {
        let d = ActionDispatcher::new(FailingSink);
        d.dispatch(&media_button(MediaKey::Next));
        d.dispatch(&open_app(&[]));
    }

    #[test]
    fn dispatch_routes_open_app_to_launcher() {
        let d = ActionDispatcher::with_launcher(FailingSink, RecordingLauncher::default());
        d.dispatch(&open_app(&["player".to_string()]));
        assert_eq!(*d.launcher.launched.borrow(), vec![vec!["player".to_string()]]);
    }

    #[test]
    fn launch_without_command_is_an_error() {
        let ActionKind::OpenApp(intent) = open_app(&[]).kind else {
            unreachable!()
        };
        assert!(matches!(
            ProcessLauncher::new().launch(&intent),
            Err(ActionError::NoLaunchCommand)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn clear_top_reuses_running_instance() {
        let launcher = ProcessLauncher::new();
        let ActionKind::OpenApp(intent) = open_app(&["sleep".to_string(), "5".to_string()]).kind
        else {
            unreachable!()
        };
        launcher.launch(&intent).unwrap();
        let first = launcher.launched.lock().unwrap().as_ref().map(Child::id);
        launcher.launch(&intent).unwrap();
        let second = launcher.launched.lock().unwrap().as_ref().map(Child::id);
        assert_eq!(first, second);

        if let Some(mut child) = launcher.launched.lock().unwrap().take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
