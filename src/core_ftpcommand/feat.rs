use std::sync::Arc;

use crate::core_channel::{ChannelError, ControlChannel};
use crate::server::ServerContext;

/// Handles the FEAT (Feature) FTP command.
///
/// The TLS feature set (AUTH TLS, PBSZ, PROT) is only advertised when a TLS
/// acceptor is actually configured.
pub async fn handle_feat_command(
    channel: &mut ControlChannel,
    context: &Arc<ServerContext>,
) -> Result<(), ChannelError> {
    let mut response = String::from("211-Features\r\n SIZE\r\n UTF8\r\n MDTM\r\n");
    if context.tls.is_some() {
        response.push_str(" AUTH TLS\r\n PBSZ\r\n PROT\r\n");
    }
    response.push_str("211 end");
    channel.respond(&response).await
}
