use std::sync::Arc;

use log::{debug, warn};

use crate::core_channel::{ChannelError, SessionChannel};
use crate::core_ftpcommand::utils::format_pasv_reply;
use crate::core_network::PasvError;
use crate::server::ServerContext;

/// Handles the PASV FTP command.
///
/// Reserves a slot from the shared passive pool (queueing FIFO when every
/// port is occupied) and tells the client where to connect. A reservation
/// already pending on this session is superseded by the new one. If the
/// client walks away while we are queued, the wait resolves to a failure
/// and the connection task winds down; no reply is sent in that case.
pub async fn handle_pasv_command(
    sc: &mut SessionChannel,
    context: &Arc<ServerContext>,
) -> Result<(), ChannelError> {
    let conn_id = sc.channel.conn_id();
    let secure = sc.channel.is_secure();

    let reserve = context.pool.reserve(conn_id, secure);
    tokio::pin!(reserve);
    let reservation = tokio::select! {
        result = &mut reserve => match result {
            Ok(reservation) => reservation,
            Err(PasvError::PortUnavailable(port)) => {
                warn!("Passive port {} could not be bound", port);
                return sc.channel.respond("425 Can't open data connection.").await;
            }
            Err(PasvError::ChannelClosed) => return Err(ChannelError::NotOpen),
        },
        _ = sc.channel.wait_for_shutdown() => return Err(ChannelError::NotOpen),
    };

    debug!(
        "Connection {} occupies passive port {}",
        conn_id,
        reservation.port()
    );
    let response = format_pasv_reply(&context.internet_host_address, reservation.port());
    sc.session.set_reservation(reservation);
    sc.channel.respond(&response).await
}
