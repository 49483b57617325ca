use std::sync::Arc;

use crate::core_channel::{ChannelError, ControlChannel};
use crate::server::ServerContext;

/// Handles PBSZ, the Protection Buffer Size command (RFC 2228).
///
/// Only meaningful once the control channel is secure. Any nonzero size is
/// answered with the 200-with-note form RFC 2228 prescribes, since TLS
/// needs no protection buffer at all.
pub async fn handle_pbsz_command(
    channel: &mut ControlChannel,
    context: &Arc<ServerContext>,
    arg: &str,
) -> Result<(), ChannelError> {
    if context.tls.is_none() {
        return channel.respond("202 Not supported").await;
    }
    if !channel.is_secure() {
        return channel.respond("503 Secure connection not established").await;
    }
    channel.channel_mut().pbsz_received = true;
    if matches!(arg.parse::<u64>(), Ok(0)) {
        channel.respond("200 OK").await
    } else {
        channel.respond("200 buffer too big, PBSZ=0").await
    }
}
