use log::{debug, warn};

use crate::core_channel::{ChannelError, SessionChannel};

/// Handles the STOR FTP command.
///
/// Byte handling is a pass-through left to the backend; the core drains the
/// data connection, counts what arrived and closes the exchange. The 150
/// goes out before the data connection is awaited, since many clients only
/// connect to the passive port once they have seen it.
pub async fn handle_stor_command(
    sc: &mut SessionChannel,
    _pathname: &str,
) -> Result<(), ChannelError> {
    let Some(reservation) = sc.session.take_reservation() else {
        return sc
            .channel
            .respond("425 Data connection not configured; send PASV or PORT")
            .await;
    };
    sc.channel.respond("150 Ok to send data").await?;
    let mut data = tokio::select! {
        result = reservation.wait_socket() => match result {
            Ok(conn) => conn,
            Err(_) => return Err(ChannelError::NotOpen),
        },
        _ = sc.channel.wait_for_shutdown() => return Err(ChannelError::NotOpen),
    };

    let mut received: u64 = 0;
    let mut chunk = [0u8; 8192];
    loop {
        match data.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => received += n as u64,
            Err(e) => {
                warn!("Data connection error during STOR: {}", e);
                break;
            }
        }
    }
    debug!("Retrieved bytes length: {}", received);
    drop(data);
    sc.channel.respond("226 Closing data connection").await
}
