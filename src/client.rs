use tokio_stream::StreamExt;
use tonic::codec::CompressionEncoding;
use tonic::transport::Channel;
use tonic::Request;

use grpc_patterns::pb::patterns_client::PatternsClient;
use grpc_patterns::pb::{AddRequest, ChatMessage, FibonacciRequest, NumberRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let channel = Channel::builder("http://[::1]:50051".parse().unwrap())
        .connect()
        .await?;

    let mut client = PatternsClient::new(channel)
        .send_compressed(CompressionEncoding::Gzip)
        .accept_compressed(CompressionEncoding::Gzip);

    println!("Add(2, 3):");
    let response = client.add(Request::new(AddRequest { a: 2, b: 3 })).await?;
    println!("\tsum = {}", response.into_inner().sum);

    println!("GenerateFibonacci(5):");
    let mut stream = client
        .generate_fibonacci(Request::new(FibonacciRequest { n: 5 }))
        .await?
        .into_inner();
    while let Some(item) = stream.next().await {
        println!("\treceived: {}", item?.number);
    }

    println!("SendNumbers([1, 2, 3, 4]):");
    let numbers = tokio_stream::iter(1..=4).map(|number| NumberRequest { number });
    let response = client.send_numbers(numbers).await?;
    println!("\tsum = {}", response.into_inner().sum);

    println!("Chat:");
    let outbound = tokio_stream::iter(vec![
        ChatMessage {
            message: "hello from the client".into(),
        },
        ChatMessage {
            message: "goodbye".into(),
        },
    ]);
    let mut inbound = client.chat(outbound).await?.into_inner();
    while let Some(msg) = inbound.next().await {
        println!("\treceived: {}", msg?.message);
    }

    Ok(())
}
