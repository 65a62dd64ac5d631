//! Turning transport faults into [`ConnectionError`]s.

use std::io::{self, ErrorKind};

use thiserror::Error;

/// Everything that can go wrong below the protocol layer, as far as
/// probing is concerned.
#[derive(Debug)]
pub enum TransportFault {
    InvalidPort(u16),
    Unresolvable(io::Error),
    Io(io::Error),
}

impl From<io::Error> for TransportFault {
    fn from(err: io::Error) -> Self {
        TransportFault::Io(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("Invalid port: {0}")]
    InvalidPort(u16),
    #[error("Unable to resolve domain")]
    DomainUnresolvable,
    #[error("Connection timed out")]
    ConnectionTimedOut,
    #[error("Connection refused")]
    ConnectionRefused,
    #[error("Connection reset by server")]
    ConnectionReset,
    #[error("Host unreachable")]
    HostUnreachable,
    /// A fault without an OS error code, passed through as is.
    #[error("{0}")]
    Generic(String),
}

/// An OS error we have no mapping for. This means the classifier is missing
/// a case, so it isn't retried like the other errors.
#[derive(Debug, Error)]
#[error("unclassified transport fault (os error {code}): {source}")]
pub struct UnclassifiedFault {
    pub code: i32,
    #[source]
    pub source: io::Error,
}

pub fn classify(fault: TransportFault) -> Result<ConnectionError, UnclassifiedFault> {
    let err = match fault {
        TransportFault::InvalidPort(port) => return Ok(ConnectionError::InvalidPort(port)),
        TransportFault::Unresolvable(_) => return Ok(ConnectionError::DomainUnresolvable),
        TransportFault::Io(err) => err,
    };

    Ok(match err.kind() {
        ErrorKind::TimedOut => ConnectionError::ConnectionTimedOut,
        ErrorKind::ConnectionRefused => ConnectionError::ConnectionRefused,
        // writing to a socket the server already reset gives EPIPE
        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe => {
            ConnectionError::ConnectionReset
        }
        ErrorKind::HostUnreachable | ErrorKind::NetworkUnreachable => {
            ConnectionError::HostUnreachable
        }
        _ => match err.raw_os_error() {
            None => ConnectionError::Generic(err.to_string()),
            Some(code) => return Err(UnclassifiedFault { code, source: err }),
        },
    })
}
