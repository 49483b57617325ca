use std::sync::Arc;

use futures::StreamExt;
use log::warn;

use crate::core_channel::{ChannelError, SessionChannel};
use crate::core_ftpcommand::utils::format_list_line;
use crate::core_registry::EndpointHandlers;

/// Handles the LIST FTP command.
///
/// Pulls the listing sequence from the Directory-Listing handler, waits for
/// the client to land on the reserved passive port, then writes one
/// fixed-width line per entry. The data socket is shut down before the 226
/// so a TLS-wrapped connection gets its close_notify out.
pub async fn handle_list_command(
    sc: &mut SessionChannel,
    registry: &Arc<dyn EndpointHandlers>,
    _pathname: &str,
) -> Result<(), ChannelError> {
    let mut entries = registry.list_directory(&sc.session.current_dir).await;

    let Some(reservation) = sc.session.take_reservation() else {
        return sc
            .channel
            .respond("425 Data connection not configured; send PASV or PORT")
            .await;
    };
    let mut data = tokio::select! {
        result = reservation.wait_socket() => match result {
            Ok(conn) => conn,
            Err(_) => return Err(ChannelError::NotOpen),
        },
        _ = sc.channel.wait_for_shutdown() => return Err(ChannelError::NotOpen),
    };

    sc.channel
        .respond("150 Here comes the directory listing")
        .await?;
    while let Some(file) = entries.next().await {
        let line = format_list_line(&file);
        if let Err(e) = data.write_all(line.as_bytes()).await {
            warn!("Data connection dropped mid-listing: {}", e);
            break;
        }
    }
    if let Err(e) = data.shutdown().await {
        warn!("Failed to close data connection cleanly: {}", e);
    }
    drop(data); // releases the passive slot
    sc.channel.respond("226 Transfer OK").await
}
