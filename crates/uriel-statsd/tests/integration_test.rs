// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::time::{timeout, Duration};
use uriel_statsd::{StatsClient, StatsClientConfig, StatsFactory};

async fn bind_receiver() -> (UdpSocket, u16) {
    let receiver = UdpSocket::bind("127.0.0.1:0")
        .await
        .expect("failed to bind receiver");
    let port = receiver.local_addr().expect("no local addr").port();
    (receiver, port)
}

async fn recv_line(receiver: &UdpSocket) -> String {
    let mut buf = [0u8; 512];
    let (amt, _) = timeout(Duration::from_secs(1), receiver.recv_from(&mut buf))
        .await
        .expect("timed out waiting for datagram")
        .expect("recv failed");
    String::from_utf8(buf[..amt].to_vec()).expect("non-utf8 datagram")
}

#[tokio::test]
async fn test_factory_emits_tagged_lines_over_udp() {
    let (receiver, port) = bind_receiver().await;
    let client = StatsClient::connect(
        &StatsClientConfig {
            host: "127.0.0.1".to_string(),
            port,
            use_alternate_protocol: false,
        },
        Arc::new(|_| {}),
    )
    .await
    .expect("connect failed");

    let factory = StatsFactory::new("svc_box1", client, vec!["env:prod".to_string()]);

    factory.count("requests", 2).await;
    assert_eq!(recv_line(&receiver).await, "svc_box1.requests:2|c|#env:prod");

    factory.gauge("cpu.load", 0.5).await;
    assert_eq!(recv_line(&receiver).await, "svc_box1.cpu.load:0.5|g|#env:prod");

    factory
        .timing("poll.duration", Duration::from_millis(42))
        .await;
    assert_eq!(
        recv_line(&receiver).await,
        "svc_box1.poll.duration:42|ms|#env:prod"
    );
}

#[tokio::test]
async fn test_factory_alternate_protocol_over_udp() {
    let (receiver, port) = bind_receiver().await;
    let client = StatsClient::connect(
        &StatsClientConfig {
            host: "127.0.0.1".to_string(),
            port,
            use_alternate_protocol: true,
        },
        Arc::new(|_| {}),
    )
    .await
    .expect("connect failed");

    let factory = StatsFactory::new("svc", client, vec!["env=prod".to_string()]);

    factory.count("requests", 1).await;
    assert_eq!(recv_line(&receiver).await, "svc.requests,env=prod:1|c");
}

#[tokio::test]
async fn test_concurrent_emission_through_shared_client() {
    let (receiver, port) = bind_receiver().await;
    let client = StatsClient::connect(
        &StatsClientConfig {
            host: "127.0.0.1".to_string(),
            port,
            use_alternate_protocol: false,
        },
        Arc::new(|_| {}),
    )
    .await
    .expect("connect failed");

    let factory = StatsFactory::new("svc", client, Vec::new());

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let factory = factory.clone();
        tasks.push(tokio::spawn(async move {
            factory.count("hits", 1).await;
        }));
    }
    for task in tasks {
        task.await.expect("emission task failed");
    }

    for _ in 0..8 {
        assert_eq!(recv_line(&receiver).await, "svc.hits:1|c");
    }
}
