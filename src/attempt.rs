//! A single connection trying a single dialect.

use std::{future, time::Duration};

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, trace, warn};

use crate::{
    classify::{ConnectionError, TransportFault, UnclassifiedFault, classify},
    parsers::ParserSelector,
    protocols::Dialect,
    status::StatusRecord,
    transport::Transport,
};

/// How much we read from the server. Only the first chunk is ever looked at.
const READ_BUFFER_SIZE: usize = 1 << 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    #[error("Timed out")]
    TimedOut,
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error("Unable to parse server response")]
    Unparsable,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AttemptState {
    Connecting,
    QuerySent,
    TimedOut,
    TransportError,
    DataReceived,
}

impl AttemptState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AttemptState::TimedOut | AttemptState::TransportError | AttemptState::DataReceived
        )
    }
}

pub type AttemptOutcome = Result<StatusRecord, AttemptError>;

pub struct ConnectionAttempt<'a, T: Transport> {
    transport: &'a T,
    parsers: &'a ParserSelector,
    dialect: Dialect,
    host: &'a str,
    port: u16,
    timeout: Duration,
    state: AttemptState,
}

impl<'a, T: Transport> ConnectionAttempt<'a, T> {
    pub fn new(
        transport: &'a T,
        parsers: &'a ParserSelector,
        dialect: Dialect,
        host: &'a str,
        port: u16,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            parsers,
            dialect,
            host,
            port,
            timeout,
            state: AttemptState::Connecting,
        }
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Move to the next state. Once a terminal state is reached every later
    /// transition is ignored, so only the first of timeout, error or data
    /// decides the outcome.
    fn transition(&mut self, next: AttemptState) -> bool {
        if self.state.is_terminal() {
            warn!(
                "{} attempt already ended as {:?}, ignoring {next:?}",
                self.dialect, self.state
            );
            return false;
        }
        trace!("{} attempt: {:?} -> {next:?}", self.dialect, self.state);
        self.state = next;
        true
    }

    /// Run the attempt to completion. The connection and the timer are both
    /// gone by the time this returns.
    ///
    /// Transport faults the classifier doesn't know about are returned as
    /// `Err` since retrying with another dialect won't help.
    pub async fn run(&mut self) -> Result<AttemptOutcome, UnclassifiedFault> {
        let timer = tokio::time::sleep(self.timeout);
        tokio::pin!(timer);

        let exchanged = tokio::select! {
            // a response racing the timer loses
            biased;
            () = &mut timer => None,
            res = self.exchange() => Some(res),
        };
        // the select dropped whichever branch lost, so the timer is cancelled
        // and the connection is closed unless we're holding it below

        match exchanged {
            None => {
                self.transition(AttemptState::TimedOut);
                debug!("{} attempt on {}:{} timed out", self.dialect, self.host, self.port);
                Ok(Err(AttemptError::TimedOut))
            }
            Some(Err(fault)) => {
                self.transition(AttemptState::TransportError);
                let err = classify(fault)?;
                debug!("{} attempt on {}:{} failed: {err}", self.dialect, self.host, self.port);
                Ok(Err(err.into()))
            }
            Some(Ok((mut conn, data))) => {
                self.transition(AttemptState::DataReceived);
                // no more reads, the first chunk is all we use
                if let Err(err) = conn.shutdown().await {
                    trace!("error shutting down connection: {err}");
                }
                drop(conn);

                debug!(
                    "{} attempt on {}:{} got {} bytes",
                    self.dialect,
                    self.host,
                    self.port,
                    data.len()
                );
                Ok(self.parsers.parse(&data).ok_or(AttemptError::Unparsable))
            }
        }
    }

    /// Connect, send the query and wait for the first chunk of the response.
    async fn exchange(&mut self) -> Result<(T::Conn, Vec<u8>), TransportFault> {
        let (dialect, host, port) = (self.dialect, self.host, self.port);
        let mut conn = self.transport.connect(host, port).await?;

        conn.write_all(&dialect.encoder().payload(host, port)).await?;
        conn.flush().await?;
        self.transition(AttemptState::QuerySent);

        let mut buf = vec![0; READ_BUFFER_SIZE];
        let n = conn.read(&mut buf).await?;
        if n == 0 {
            // closed without saying anything, all that's left is the timer
            trace!("{dialect} attempt on {host}:{port} got eof before any data");
            future::pending::<()>().await;
        }
        buf.truncate(n);

        Ok((conn, buf))
    }
}
