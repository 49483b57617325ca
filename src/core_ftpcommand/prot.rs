use std::sync::Arc;

use crate::core_channel::{ChannelError, ControlChannel};
use crate::server::ServerContext;

/// Handles PROT, the Data Channel Protection Level command.
///
/// Only level P is accepted; C, S and E are refused with 536 because data
/// connections of a secure session are always TLS-wrapped here. PBSZ must
/// have been received first.
pub async fn handle_prot_command(
    channel: &mut ControlChannel,
    context: &Arc<ServerContext>,
    level: &str,
) -> Result<(), ChannelError> {
    if context.tls.is_none() {
        return channel.respond("202 Not supported").await;
    }
    if !channel.channel().pbsz_received {
        return channel.respond("503 No PBSZ command received").await;
    }
    match level {
        "S" | "E" | "C" => channel.respond("536 Not supported").await,
        "P" => channel.respond("200 OK").await,
        _ => channel.respond("504 Not recognized").await,
    }
}
