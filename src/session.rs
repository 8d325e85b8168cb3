//! Media session discovery.
//!
//! A `SessionProvider` lists the media sessions the environment currently
//! exposes; `discover` turns that into at most one session for the tick and
//! never lets a provider failure escape.

mod discovery;
mod model;
mod mpris;

pub use discovery::{discover, select};
pub use model::*;
pub use mpris::MprisClient;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The registry refused the query.
    #[error("permission denied while querying media sessions")]
    PermissionDenied,

    /// Session bus failure other than a permission denial.
    #[error("D-Bus error: {0}")]
    Bus(zbus::Error),

    /// Requested player is no longer on the bus.
    #[error("no media session to deliver to")]
    NoSession,
}

impl From<zbus::Error> for SessionError {
    fn from(e: zbus::Error) -> Self {
        let denied = match &e {
            zbus::Error::FDO(fdo) => matches!(**fdo, zbus::fdo::Error::AccessDenied(_)),
            zbus::Error::MethodError(name, _, _) => {
                name.as_str() == "org.freedesktop.DBus.Error.AccessDenied"
            }
            _ => false,
        };
        if denied {
            SessionError::PermissionDenied
        } else {
            SessionError::Bus(e)
        }
    }
}

impl From<zbus::fdo::Error> for SessionError {
    fn from(e: zbus::fdo::Error) -> Self {
        zbus::Error::FDO(Box::new(e)).into()
    }
}

/// Read-only view of the environment's active media sessions.
pub trait SessionProvider {
    /// Active sessions in priority order; index 0 ranks highest.
    fn active_sessions(&self) -> Result<Vec<SessionMetadata>, SessionError>;
}

impl<T: SessionProvider + ?Sized> SessionProvider for &T {
    fn active_sessions(&self) -> Result<Vec<SessionMetadata>, SessionError> {
        (**self).active_sessions()
    }
}
