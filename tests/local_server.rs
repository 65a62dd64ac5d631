use std::time::Duration;

use mcprobe::{
    Dialect, ProbeError, Prober, QueryOptions,
    attempt::AttemptError,
    classify::ConnectionError,
    protocols::write_varint,
    status::ResponseShape,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

const STATUS_JSON: &str = r#"{"version":{"name":"1.21.1","protocol":767},"players":{"max":50,"online":3},"description":{"text":"local test server"}}"#;

fn status_packet() -> Vec<u8> {
    let mut data = vec![0x00];
    write_varint(&mut data, STATUS_JSON.len() as i32);
    data.extend_from_slice(STATUS_JSON.as_bytes());

    let mut packet = Vec::new();
    write_varint(&mut packet, data.len() as i32);
    packet.extend(data);
    packet
}

/// A server that only understands the 1.7+ handshake and resets the
/// connection on legacy pings.
async fn spawn_modern_only_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let mut first = [0];
                if stream.read_exact(&mut first).await.is_err() {
                    return;
                }
                if first[0] == 0xfe {
                    // dropping with a zero linger sends an RST
                    #[allow(deprecated)]
                    let _ = stream.set_linger(Some(Duration::ZERO));
                    return;
                }
                let _ = stream.write_all(&status_packet()).await;
                let mut rest = Vec::new();
                let _ = stream.read_to_end(&mut rest).await;
            });
        }
    });

    port
}

#[tokio::test]
async fn test_falls_back_to_modern_dialect() {
    let port = spawn_modern_only_server().await;

    let report = Prober::default()
        .query_detailed("127.0.0.1", port, &QueryOptions::default())
        .await;

    assert_eq!(
        report.attempted,
        vec![Dialect::V1_4, Dialect::V1_6, Dialect::V1_7]
    );
    let status = report.outcome.unwrap();
    assert_eq!(status.shape, ResponseShape::Netty);
    assert_eq!(status.description_plaintext, "local test server");
    assert_eq!(status.online_players, Some(3));
    assert_eq!(status.max_players, Some(50));
}

#[tokio::test]
async fn test_forced_legacy_dialect_is_reset() {
    let port = spawn_modern_only_server().await;

    let options = QueryOptions {
        dialect: Some(Dialect::V1_4),
        ..Default::default()
    };
    let err = mcprobe::query("127.0.0.1", port, &options)
        .await
        .unwrap_err();

    assert_eq!(
        err.last_failure(),
        Some(&AttemptError::Connection(ConnectionError::ConnectionReset))
    );
    assert_eq!(
        err.to_string(),
        "Unable to get server info: Connection reset by server"
    );
}

#[tokio::test]
async fn test_connection_refused() {
    // grab a free port and close it again
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let options = QueryOptions {
        dialect: Some(Dialect::V1_7),
        timeout: Duration::from_secs(5),
    };
    let err = mcprobe::query("127.0.0.1", port, &options)
        .await
        .unwrap_err();

    assert!(matches!(err, ProbeError::Exhausted { ref failures } if failures.len() == 1));
    assert_eq!(err.to_string(), "Unable to get server info: Connection refused");
}

#[tokio::test]
async fn test_invalid_port() {
    let err = mcprobe::query("127.0.0.1", 0, &QueryOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Unable to get server info: Invalid port: 0");
}
