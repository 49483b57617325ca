use crate::core_channel::{ChannelError, SessionChannel};

/// Extended passive mode is not offered; clients fall back to PASV.
pub async fn handle_epsv_command(sc: &mut SessionChannel) -> Result<(), ChannelError> {
    sc.channel.respond("202 Not supported").await
}
