use log::info;

use crate::core_channel::{ChannelError, SessionChannel};
use crate::core_ftpcommand::utils::path_escape;

/// Handles the MKD FTP command. Directory creation is intentionally not
/// implemented; the reply still names the directory that was asked for.
pub async fn handle_mkd_command(
    sc: &mut SessionChannel,
    pathname: &str,
) -> Result<(), ChannelError> {
    let directory = if pathname.starts_with('/') {
        pathname.to_string()
    } else if sc.session.current_dir.ends_with('/') {
        format!("{}{}", sc.session.current_dir, pathname)
    } else {
        format!("{}/{}", sc.session.current_dir, pathname)
    };
    info!("Refusing MKD for: {}", directory);
    let response = format!("550 \"{}\" directory NOT created", path_escape(&directory));
    sc.channel.respond(&response).await
}
