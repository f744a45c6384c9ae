//! Client Module Tests
//!
//! ## Test Scopes
//! - **Resolution**: answers and silence from a linker.
//! - **Reporting**: SERVICE_DOWN is acknowledged.
//! - **Calls**: a silent service is reported and replaced by a live one.

#[cfg(test)]
mod tests {
    use crate::client::LinkerClient;
    use crate::error::MeshError;
    use crate::linker::{LinkerConfig, LinkerNode, PeerSet};
    use crate::protocol::{Address, ServiceCategory};
    use crate::service::{LeetReply, ServiceNode};

    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::UdpSocket;

    async fn start_linker() -> Arc<LinkerNode> {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let local = Address::from(socket.local_addr().unwrap());
        let config = LinkerConfig {
            probe_timeout_ms: 200,
            stats_interval_secs: 0,
            ..LinkerConfig::default()
        };

        let peers = PeerSet::new(vec![local.clone()]);
        let node = LinkerNode::with_socket(socket, local, peers, config);
        node.clone().start();
        node
    }

    async fn client_for(node: &LinkerNode) -> LinkerClient {
        let linker = Address::from(node.socket_addr().unwrap());
        LinkerClient::bind("127.0.0.1:0".parse().unwrap(), vec![linker])
            .await
            .unwrap()
            .with_request_timeout(Duration::from_millis(400))
    }

    // ============================================================
    // RESOLUTION TESTS
    // ============================================================

    #[tokio::test]
    async fn test_client_requires_linkers() {
        let result = LinkerClient::bind("127.0.0.1:0".parse().unwrap(), vec![]).await;
        assert!(matches!(result, Err(MeshError::Config(_))));
    }

    #[tokio::test]
    async fn test_resolve_registered_service() {
        let node = start_linker().await;
        let service = Address::new("10.0.0.5", 9001);
        node.registry()
            .register(ServiceCategory::Reply, service.clone())
            .await;

        let mut client = client_for(&node).await;
        assert_eq!(client.resolve(ServiceCategory::Reply).await.unwrap(), service);
    }

    #[tokio::test]
    async fn test_resolve_without_service() {
        let node = start_linker().await;
        let mut client = client_for(&node).await;

        let result = client.resolve(ServiceCategory::Time).await;
        assert!(matches!(
            result,
            Err(MeshError::NoServiceAvailable(ServiceCategory::Time))
        ));
    }

    // ============================================================
    // REPORTING TESTS
    // ============================================================

    #[tokio::test]
    async fn test_report_down_is_acknowledged() {
        let node = start_linker().await;
        let mut client = client_for(&node).await;

        client
            .report_down(&Address::new("127.0.0.1", 9))
            .await
            .unwrap();
    }

    // ============================================================
    // CALL TESTS
    // ============================================================

    #[tokio::test]
    async fn test_call_skips_dead_service() {
        let node = start_linker().await;
        let linker = Address::from(node.socket_addr().unwrap());

        // registered but never answers
        let dead = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let dead_addr = Address::from(dead.local_addr().unwrap());
        node.registry()
            .register(ServiceCategory::Reply, dead_addr.clone())
            .await;

        let service = ServiceNode::bind(
            "127.0.0.1:0".parse().unwrap(),
            Box::new(LeetReply),
            vec![linker],
        )
        .await
        .unwrap();
        service.register().await.unwrap();
        tokio::spawn(async move { service.serve().await });

        let mut client = client_for(&node).await.with_max_attempts(5);
        for _ in 0..5 {
            let reply = client.call(ServiceCategory::Reply, b"test").await.unwrap();
            assert_eq!(reply, b"T35T");
        }

        assert_eq!(node.registry().count(ServiceCategory::Reply).await, 1);
        assert_ne!(
            node.registry().lookup(ServiceCategory::Reply).await.unwrap(),
            dead_addr
        );
    }
}
