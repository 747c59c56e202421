// Integration tests for TCP command dispatch against loopback listeners

use anyhow::Result;
use hotkeyndq::network::{send_command, CommandFrame, CommandSender, ConnectionTarget};
use hotkeyndq::SendError;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

/// Accept one connection and return everything the client wrote before closing
async fn read_one(listener: &TcpListener) -> Result<Vec<u8>> {
    let (mut stream, _) = listener.accept().await?;
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes).await?;
    Ok(bytes)
}

/// A port nothing is listening on
async fn closed_port() -> Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}

#[tokio::test]
async fn test_command_success_exact_bytes() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    let (outcome, received) = tokio::join!(
        send_command("127.0.0.1", i64::from(port), "GEAR_TOGGLE"),
        read_one(&listener)
    );

    assert!(outcome.success);
    assert_eq!(outcome.message, "Sent: GEAR_TOGGLE");
    assert_eq!(received?, b"{\"type\":\"command\",\"id\":\"GEAR_TOGGLE\"}\n");
    Ok(())
}

#[tokio::test]
async fn test_connect_failure_reports_error() -> Result<()> {
    let port = closed_port().await?;

    let start = Instant::now();
    let outcome = send_command("127.0.0.1", i64::from(port), "GEAR_TOGGLE").await;

    assert!(!outcome.success);
    assert!(outcome.message.starts_with("Error: "), "{}", outcome.message);
    assert!(outcome.message.len() > "Error: ".len());
    assert!(start.elapsed() < Duration::from_millis(1500));
    Ok(())
}

#[tokio::test]
async fn test_unresolvable_host_reports_error() {
    let outcome = send_command("no-such-host.invalid", 5555, "GEAR_TOGGLE").await;
    assert!(!outcome.success);
    assert!(outcome.message.starts_with("Error: "));
}

#[tokio::test]
async fn test_port_validation_happens_before_network() {
    for port in [0, -5, 65536] {
        let err = ConnectionTarget::new("127.0.0.1", port).unwrap_err();
        assert!(matches!(err, SendError::InvalidInput(_)));

        let outcome = send_command("127.0.0.1", port, "GEAR_TOGGLE").await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Invalid port");
    }
}

#[tokio::test]
async fn test_concurrent_sends_use_separate_connections() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let target = ConnectionTarget::new("127.0.0.1", i64::from(listener.local_addr()?.port()))?;
    let sender = CommandSender::default();

    let first = sender.dispatch(target.clone(), "FLAPS_UP");
    let second = sender.dispatch(target, "FLAPS_DOWN");

    let mut frames = HashSet::new();
    for _ in 0..2 {
        let bytes = read_one(&listener).await?;
        let text = String::from_utf8(bytes)?;
        // Exactly one frame per connection
        assert_eq!(text.matches('\n').count(), 1, "{:?}", text);
        let frame = CommandFrame::decode(text.trim_end_matches('\n'))?;
        frames.insert(frame.id);
    }

    assert!(first.await?.success);
    assert!(second.await?.success);
    assert_eq!(
        frames,
        HashSet::from(["FLAPS_UP".to_string(), "FLAPS_DOWN".to_string()])
    );
    Ok(())
}

#[tokio::test]
async fn test_send_time_is_bounded_by_connect_timeout() -> Result<()> {
    // Whatever the network does with an unroutable address (drop, reject,
    // or a proxy that accepts), the send must settle within the bound.
    let sender = CommandSender::new(Duration::from_millis(200));
    let target = ConnectionTarget::new("10.255.255.1", 5555)?;

    let start = Instant::now();
    let result = sender.try_send(&target, "GEAR_TOGGLE").await;

    assert!(start.elapsed() < Duration::from_millis(1000), "{:?}", start.elapsed());
    if let Err(e) = result {
        assert!(!e.is_invalid_input());
    }
    Ok(())
}
