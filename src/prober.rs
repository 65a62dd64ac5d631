//! Figuring out which dialect a server speaks, one candidate at a time.

use std::{sync::LazyLock, time::Duration};

use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    attempt::{AttemptError, ConnectionAttempt},
    classify::UnclassifiedFault,
    completion::Completion,
    parsers::ParserSelector,
    protocols::{CANDIDATES, Dialect},
    status::StatusRecord,
    transport::{TcpTransport, Transport},
};

/// The port Minecraft servers listen on by default.
pub const DEFAULT_PORT: u16 = 25565;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct QueryOptions {
    /// Only try this dialect instead of all of them.
    pub dialect: Option<Dialect>,
    /// How long each attempt gets, including connecting.
    pub timeout: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            dialect: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    /// Every candidate failed. Only the last failure is in the message, the
    /// rest are kept in `failures` in the order they happened.
    #[error("Unable to get server info: {}", last_failure_message(.failures))]
    Exhausted {
        failures: Vec<(Dialect, AttemptError)>,
    },
    #[error(transparent)]
    Unclassified(#[from] UnclassifiedFault),
    #[error("Probe ended without a result")]
    Abandoned,
}

impl ProbeError {
    pub fn last_failure(&self) -> Option<&AttemptError> {
        match self {
            ProbeError::Exhausted { failures } => failures.last().map(|(_, err)| err),
            _ => None,
        }
    }
}

fn last_failure_message(failures: &[(Dialect, AttemptError)]) -> String {
    failures
        .last()
        .map(|(_, err)| err.to_string())
        .unwrap_or_default()
}

/// The outcome of a probe along with the dialects that were tried, in order.
#[derive(Debug)]
pub struct ProbeReport {
    pub attempted: Vec<Dialect>,
    pub outcome: Result<StatusRecord, ProbeError>,
}

pub struct Prober<T = TcpTransport> {
    transport: T,
    parsers: ParserSelector,
}

impl Default for Prober<TcpTransport> {
    fn default() -> Self {
        Self::new(TcpTransport)
    }
}

impl<T: Transport> Prober<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            parsers: ParserSelector::default(),
        }
    }

    pub fn with_parsers(mut self, parsers: ParserSelector) -> Self {
        self.parsers = parsers;
        self
    }

    pub async fn query(
        &self,
        host: &str,
        port: u16,
        options: &QueryOptions,
    ) -> Result<StatusRecord, ProbeError> {
        self.query_detailed(host, port, options).await.outcome
    }

    pub async fn query_detailed(
        &self,
        host: &str,
        port: u16,
        options: &QueryOptions,
    ) -> ProbeReport {
        let (completion, outcome) = Completion::new();
        let attempted = self.drive(host.trim(), port, options, &completion).await;
        drop(completion);

        ProbeReport {
            attempted,
            outcome: outcome.await.unwrap_or(Err(ProbeError::Abandoned)),
        }
    }

    async fn drive(
        &self,
        host: &str,
        port: u16,
        options: &QueryOptions,
        completion: &Completion<Result<StatusRecord, ProbeError>>,
    ) -> Vec<Dialect> {
        let mut candidates = match options.dialect {
            Some(dialect) => vec![dialect],
            None => CANDIDATES.to_vec(),
        };
        let mut attempted = Vec::with_capacity(candidates.len());
        let mut failures = Vec::new();

        // popping from the end means the oldest dialect goes first
        while let Some(dialect) = candidates.pop() {
            attempted.push(dialect);
            debug!("trying {dialect} on {host}:{port}");

            let mut attempt = ConnectionAttempt::new(
                &self.transport,
                &self.parsers,
                dialect,
                host,
                port,
                options.timeout,
            );
            match attempt.run().await {
                Ok(Ok(status)) => {
                    info!("{host}:{port} answered {dialect} ({:?})", status.shape);
                    completion.complete(Ok(status));
                    return attempted;
                }
                Ok(Err(err)) => {
                    debug!("{dialect} failed on {host}:{port}: {err}");
                    failures.push((dialect, err));
                }
                Err(unclassified) => {
                    error!("giving up on {host}:{port}: {unclassified}");
                    completion.complete(Err(unclassified.into()));
                    return attempted;
                }
            }
        }

        completion.complete(Err(ProbeError::Exhausted { failures }));
        attempted
    }
}

static DEFAULT_PROBER: LazyLock<Prober> = LazyLock::new(Prober::default);

/// Get the status of a server over TCP, trying every dialect unless one is
/// given in `options`.
pub async fn query(
    host: &str,
    port: u16,
    options: &QueryOptions,
) -> Result<StatusRecord, ProbeError> {
    DEFAULT_PROBER.query(host, port, options).await
}
