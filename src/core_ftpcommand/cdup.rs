use std::path::Path;

use crate::core_channel::{ChannelError, SessionChannel};
use crate::core_ftpcommand::utils::path_escape;

/// Change working directory to the parent directory.
pub async fn handle_cdup_command(sc: &mut SessionChannel) -> Result<(), ChannelError> {
    let parent = Path::new(&sc.session.current_dir)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("/"));
    sc.session.current_dir = parent.clone();
    let response = format!("250 Directory changed to \"{}\"", path_escape(&parent));
    sc.channel.respond(&response).await
}
