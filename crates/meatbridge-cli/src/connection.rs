//! Websocket transport to the multiworld server
//!
//! The socket lives on its own thread with a current-thread tokio runtime.
//! Events go to the bridge over a std channel, in arrival order; commands come
//! back over an unbounded tokio channel. Dropping either end closes the session.

use std::sync::mpsc as std_mpsc;
use std::thread;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use meatbridge_core::game::LocationId;
use meatbridge_core::protocol::{decode_frame, encode_frame};
use meatbridge_core::{
    ClientCommand, ClientSession, Error, ExponentialBackoff, LocationSink, RetryStrategy,
    ServerEvent,
};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, warn};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Handle to a server session running in the background
pub struct Connection {
    outbound: mpsc::UnboundedSender<Vec<ClientCommand>>,
}

impl Connection {
    /// Start a session; the returned receiver yields its events
    pub fn open(
        url: &str,
        slot: &str,
        password: &str,
    ) -> Result<(Self, std_mpsc::Receiver<ServerEvent>)> {
        let (events_tx, events_rx) = std_mpsc::channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let url = url.to_string();
        let session = ClientSession::new(slot, password);

        thread::Builder::new()
            .name("meatbridge-ws".into())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        error!("Failed to start network runtime: {}", e);
                        return;
                    }
                };
                if let Err(e) = runtime.block_on(run_session(&url, session, events_tx, outbound_rx))
                {
                    warn!("Server session ended: {:#}", e);
                }
            })
            .context("Failed to spawn network thread")?;

        Ok((
            Self {
                outbound: outbound_tx,
            },
            events_rx,
        ))
    }

    fn send(&self, command: ClientCommand) -> meatbridge_core::Result<()> {
        self.outbound
            .send(vec![command])
            .map_err(|_| Error::SessionClosed)
    }
}

impl LocationSink for Connection {
    fn send_location_checks(&mut self, ids: &[LocationId]) -> meatbridge_core::Result<()> {
        self.send(ClientCommand::LocationChecks {
            locations: ids.to_vec(),
        })
    }

    fn send_goal_complete(&mut self) -> meatbridge_core::Result<()> {
        self.send(ClientCommand::goal_complete())
    }
}

async fn connect(url: &str) -> Result<Socket> {
    let backoff = ExponentialBackoff::new();
    let mut attempt = 0;
    loop {
        match connect_async(url).await {
            Ok((socket, _)) => {
                info!("Connected to {}", url);
                return Ok(socket);
            }
            Err(e) if attempt + 1 >= backoff.max_attempts() => {
                return Err(e).with_context(|| format!("Failed to connect to {}", url));
            }
            Err(e) => {
                let delay = backoff.delay_for_attempt(attempt).unwrap_or_default();
                warn!(
                    "Connection attempt {}/{} failed: {} (retry in {:?})",
                    attempt + 1,
                    backoff.max_attempts(),
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

async fn run_session(
    url: &str,
    mut session: ClientSession,
    events: std_mpsc::Sender<ServerEvent>,
    mut outbound: mpsc::UnboundedReceiver<Vec<ClientCommand>>,
) -> Result<()> {
    let (mut write, mut read) = connect(url).await?.split();

    loop {
        tokio::select! {
            message = read.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    let mut refused = false;
                    for message in decode_frame(&text) {
                        let output = session.handle(message);
                        if !output.commands.is_empty() {
                            write.send(Message::Text(encode_frame(&output.commands)?)).await?;
                        }
                        for event in output.events {
                            refused |= matches!(event, ServerEvent::ConnectionRefused { .. });
                            if events.send(event).is_err() {
                                debug!("Bridge gone, closing session");
                                return Ok(());
                            }
                        }
                    }
                    if refused {
                        break;
                    }
                }
                Some(Ok(Message::Ping(data))) => write.send(Message::Pong(data)).await?,
                Some(Ok(Message::Close(frame))) => {
                    info!("Server closed the connection: {:?}", frame);
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("Websocket error"),
                None => break,
            },
            commands = outbound.recv() => match commands {
                Some(commands) => {
                    write.send(Message::Text(encode_frame(&commands)?)).await?;
                }
                None => break,
            },
        }
    }

    if let Err(e) = write.close().await {
        debug!("Websocket close failed: {}", e);
    }
    Ok(())
}
