use std::sync::Arc;

use log::debug;

use crate::core_channel::{ChannelError, SessionChannel};
use crate::core_registry::EndpointHandlers;

/// Handles the MDTM FTP command: file modification time, UTC, as
/// `YYYYMMDDHHmmss`, looked up through the File-Descriptor handler.
pub async fn handle_mdtm_command(
    sc: &mut SessionChannel,
    registry: &Arc<dyn EndpointHandlers>,
    pathname: &str,
) -> Result<(), ChannelError> {
    match registry.describe_file(pathname).await {
        Ok(file) => {
            let response = format!("213 {}", file.updated_at.format("%Y%m%d%H%M%S"));
            sc.channel.respond(&response).await
        }
        Err(e) => {
            debug!("MDTM lookup failed for {}: {}", pathname, e);
            sc.channel.respond("550 File unavailable").await
        }
    }
}
