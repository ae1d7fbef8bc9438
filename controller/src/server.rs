use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::error::Result;
use crate::session::Session;

/// Accept switch connections and run one session task per switch. Each
/// session owns its brain outright; tasks share nothing but the config.
pub async fn run(listen: &str, config: Arc<Config>) -> Result<()> {
    let listener = TcpListener::bind(listen).await?;
    log::info!("listening for switches on {}", listener.local_addr()?);

    loop {
        let (stream, peer) = listener.accept().await?;
        stream.set_nodelay(true)?;
        let config = config.clone();
        tokio::spawn(async move {
            if let Err(e) = Session::new(stream, peer.to_string(), config).run().await {
                log::error!("[southbound] session with {} failed: {}", peer, e);
            }
        });
    }
}
