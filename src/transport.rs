use std::{
    future::Future,
    io,
    net::{IpAddr, SocketAddr},
    str::FromStr,
};

use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::{TcpStream, lookup_host},
};
use tracing::trace;

use crate::classify::TransportFault;

/// Opens the byte stream a status query is sent over.
pub trait Transport: Send + Sync {
    type Conn: AsyncRead + AsyncWrite + Unpin + Send;

    fn connect(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = Result<Self::Conn, TransportFault>> + Send;
}

/// Plain TCP with Nagle's algorithm disabled, the requests are tiny and we
/// want them sent immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpTransport;

impl Transport for TcpTransport {
    type Conn = TcpStream;

    async fn connect(&self, host: &str, port: u16) -> Result<TcpStream, TransportFault> {
        let addr = resolve(host, port).await?;
        trace!("connecting to {addr}");
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

/// Resolve the host unless it's already an IP address.
pub async fn resolve(host: &str, port: u16) -> Result<SocketAddr, TransportFault> {
    if port == 0 {
        return Err(TransportFault::InvalidPort(port));
    }

    if let Ok(ip) = IpAddr::from_str(host) {
        return Ok(SocketAddr::new(ip, port));
    }

    let mut addrs = lookup_host((host, port))
        .await
        .map_err(TransportFault::Unresolvable)?;
    addrs.next().ok_or_else(|| {
        TransportFault::Unresolvable(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no addresses for {host}"),
        ))
    })
}
