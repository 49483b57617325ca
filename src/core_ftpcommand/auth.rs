use std::sync::Arc;

use log::{debug, info};

use crate::core_channel::{ChannelError, ControlChannel};
use crate::server::ServerContext;

/// Handles AUTH, the explicit TLS upgrade (RFC 4217).
///
/// Anything but `AUTH TLS` on a TLS-configured server is not implemented.
/// On success the old channel is superseded by a fresh secure one carrying
/// no session state; the client logs in again afterwards. A failed
/// handshake is fatal to the connection and no reply is attempted, the
/// transport being unreliable at that point.
pub async fn handle_auth_command(
    mut channel: ControlChannel,
    context: &Arc<ServerContext>,
    mechanism: &str,
) -> Result<ControlChannel, ChannelError> {
    let mechanism = mechanism.to_ascii_uppercase();
    let acceptor = match &context.tls {
        Some(acceptor) if mechanism == "TLS" && !channel.is_secure() => acceptor.clone(),
        _ => {
            channel.respond("502 Command not implemented").await?;
            return Ok(channel);
        }
    };

    channel.respond("234 Honored").await?;
    debug!("Starting control-channel TLS handshake");
    let secure = channel.into_channel().upgrade_to_secure(&acceptor).await?;
    info!("Control channel upgraded to TLS");
    Ok(ControlChannel::Bare(secure))
}
