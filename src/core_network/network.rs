use std::sync::Arc;

use anyhow::Result;
use log::{debug, info, trace};
use tokio::net::{TcpListener, TcpStream};

use crate::constants::{GREETING, MAX_COMMAND_LENGTH};
use crate::core_channel::{Channel, ChannelError, ControlChannel};
use crate::core_ftpcommand::handlers::dispatch_command;
use crate::core_registry::EndpointHandlers;
use crate::server::ServerContext;

/// Accept loop: one task per control connection, strictly serialized
/// command handling inside each task. The passive pool is the only state
/// shared across tasks.
pub async fn start_server(
    listener: TcpListener,
    context: Arc<ServerContext>,
    registry: Arc<dyn EndpointHandlers>,
) -> Result<()> {
    info!("Server listening on {:?}", listener.local_addr()?);
    let mut next_conn_id: u64 = 0;
    loop {
        let (socket, addr) = listener.accept().await?;
        next_conn_id += 1;
        let conn_id = next_conn_id;
        info!("New control connection from {:?}", addr);

        let context = Arc::clone(&context);
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, conn_id, &context, &registry).await {
                debug!("Connection {} ended with error: {:?}", conn_id, e);
            }
            // Frees queued reservations and any still-occupied slot.
            context.pool.disconnect(conn_id);
            info!("Control connection closed for {:?}", addr);
        });
    }
}

/// Per-connection control loop: greet, then read one line at a time and
/// run it through the dispatcher. The dispatcher owns the current channel
/// and hands back its (possibly replaced) successor; the next line is only
/// read once that hand-back has happened.
pub async fn handle_connection(
    socket: TcpStream,
    conn_id: u64,
    context: &Arc<ServerContext>,
    registry: &Arc<dyn EndpointHandlers>,
) -> Result<(), ChannelError> {
    socket.set_nodelay(true).ok();
    let mut channel = ControlChannel::Bare(Channel::new(socket, conn_id));
    channel.respond(GREETING).await?;

    loop {
        let line = match channel.read_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                channel.close().await;
                return Err(e);
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        if line.len() > MAX_COMMAND_LENGTH {
            channel.respond("500 Command too long").await?;
            continue;
        }
        trace!("<< {}", line);

        // Transport and handshake failures are the only fatal outcomes;
        // everything else came back as a reply already.
        channel = dispatch_command(channel, context, registry, &line).await?;

        if !channel.is_open() {
            break;
        }
    }
    channel.close().await;
    Ok(())
}
