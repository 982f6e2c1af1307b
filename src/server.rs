use std::time::Duration;

use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tonic::codec::CompressionEncoding;
use tonic::transport::Server;

use grpc_patterns::pb::patterns_server::PatternsServer;
use grpc_patterns::pb::FILE_DESCRIPTOR_SET;
use grpc_patterns::PatternsService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .init();

    let addr = "[::1]:50051".parse().unwrap();

    // One stdin pump for the whole process; chat calls take turns
    // draining it.
    let (line_tx, line_rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    let service = PatternsService::new(Duration::from_secs(1), line_rx);

    let reflection = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    tracing::info!("PatternsServer listening on {}", addr);

    Server::builder()
        .add_service(reflection)
        .add_service(
            PatternsServer::new(service)
                .send_compressed(CompressionEncoding::Gzip)
                .accept_compressed(CompressionEncoding::Gzip),
        )
        .serve(addr)
        .await?;

    Ok(())
}
