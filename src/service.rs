use std::io::{self, Write};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status, Streaming};

use crate::pb::patterns_server::Patterns;
use crate::pb::{
    AddRequest, AddResponse, ChatMessage, FibonacciRequest, FibonacciResponse, NumberRequest,
    NumberResponse,
};

/// Line the operator types to end the send half of a chat.
pub const QUIT_COMMAND: &str = "quit";

type ResponseStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send + 'static>>;

/// Handler for the four demo operations, constructed once at startup and
/// handed to the transport.
///
/// The pacing delay for `GenerateFibonacci` and the source of operator
/// lines for `Chat` are injected so tests can run without wall-clock
/// waits or a real stdin.
#[derive(Debug)]
pub struct PatternsService {
    fib_delay: Duration,
    operator: Arc<Mutex<mpsc::Receiver<String>>>,
}

impl PatternsService {
    pub fn new(fib_delay: Duration, operator: mpsc::Receiver<String>) -> Self {
        Self {
            fib_delay,
            operator: Arc::new(Mutex::new(operator)),
        }
    }
}

/// The first `n` Fibonacci numbers, wrapping past the `i32` range.
fn fibonacci(n: i32) -> impl Iterator<Item = i32> {
    let mut pair = (0i32, 1i32);
    (0..n).map(move |_| {
        let current = pair.0;
        pair = (pair.1, pair.0.wrapping_add(pair.1));
        current
    })
}

#[tonic::async_trait]
impl Patterns for PatternsService {
    async fn add(
        &self,
        request: Request<AddRequest>,
    ) -> Result<Response<AddResponse>, Status> {
        let AddRequest { a, b } = request.into_inner();
        let sum = a.wrapping_add(b);
        tracing::info!(a, b, sum, "add called");

        Ok(Response::new(AddResponse { sum }))
    }

    type GenerateFibonacciStream = ResponseStream<FibonacciResponse>;

    async fn generate_fibonacci(
        &self,
        request: Request<FibonacciRequest>,
    ) -> Result<Response<Self::GenerateFibonacciStream>, Status> {
        let n = request.into_inner().n;
        let delay = self.fib_delay;

        // Produce through a channel; a failed send means the client went
        // away and stops the producer.
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(async move {
            for number in fibonacci(n) {
                if tx
                    .send(Result::<_, Status>::Ok(FibonacciResponse { number }))
                    .await
                    .is_err()
                {
                    tracing::warn!("client disconnected mid-stream");
                    return;
                }
                tracing::info!(number, "sent fibonacci number");
                tokio::time::sleep(delay).await;
            }
        });

        Ok(Response::new(
            Box::pin(ReceiverStream::new(rx)) as Self::GenerateFibonacciStream
        ))
    }

    async fn send_numbers(
        &self,
        request: Request<Streaming<NumberRequest>>,
    ) -> Result<Response<NumberResponse>, Status> {
        let mut stream = request.into_inner();

        let mut sum = 0i32;
        while let Some(req) = stream.message().await? {
            tracing::info!(number = req.number, "received number");
            sum = sum.wrapping_add(req.number);
        }
        tracing::info!(sum, "number stream complete");

        Ok(Response::new(NumberResponse { sum }))
    }

    type ChatStream = ResponseStream<ChatMessage>;

    async fn chat(
        &self,
        request: Request<Streaming<ChatMessage>>,
    ) -> Result<Response<Self::ChatStream>, Status> {
        let mut inbound = request.into_inner();
        let (tx, rx) = mpsc::channel(16);
        let (done_tx, done_rx) = oneshot::channel();

        // Receive loop. It owns the call's completion signal, and its
        // sender clone keeps the outbound stream open until the peer is
        // done even if the operator has already quit.
        let keepalive = tx.clone();
        tokio::spawn(async move {
            let _keepalive = keepalive;
            loop {
                match inbound.message().await {
                    Ok(Some(msg)) => {
                        tracing::info!(received = %msg.message, "chat message from peer");
                    }
                    Ok(None) => {
                        tracing::info!("peer closed its send stream");
                        break;
                    }
                    Err(status) => {
                        tracing::warn!(%status, "error receiving from peer");
                        break;
                    }
                }
            }
            let _ = done_tx.send(());
        });

        // Send loop: forwards operator lines until the quit command.
        // Finishing here does not end the call; if the call ends first
        // this task is left parked on the operator channel and exits on
        // its next failed send.
        let operator = Arc::clone(&self.operator);
        tokio::spawn(async move {
            let mut lines = operator.lock().await;
            loop {
                print!("Enter message to send (type '{QUIT_COMMAND}' to end this chat): ");
                let _ = io::stdout().flush();

                let Some(line) = lines.recv().await else {
                    break;
                };
                let line = line.trim().to_owned();
                if line == QUIT_COMMAND {
                    tracing::info!("operator ended the chat");
                    break;
                }
                if tx
                    .send(Result::<_, Status>::Ok(ChatMessage { message: line }))
                    .await
                    .is_err()
                {
                    break;
                }
            }
        });

        // The call ends exactly when the receive loop does.
        let outbound = ReceiverStream::new(rx).take_until(done_rx);

        Ok(Response::new(Box::pin(outbound) as Self::ChatStream))
    }
}
