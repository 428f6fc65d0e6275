//! Session Server Binary
//!
//! Serves the lobby, games and replay library over HTTP and WebSocket,
//! with a pool of CPU players arranging matches among themselves.

use cardroom::*;
use clap::Parser;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, env = "BIND_ADDR", help = "Address to listen on")]
    bind: Option<String>,
    #[arg(long, help = "Unanswered prompt timeout, e.g. 30s")]
    prompt_timeout: Option<String>,
    #[arg(long, default_value_t = 2, help = "Number of CPU players")]
    bots: usize,
    #[arg(long, help = "Replay capture modes, e.g. states,actions")]
    capture: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log()?;
    kys();
    let args = Args::parse();
    let mut config = Config::from_env();
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(timeout) = args.prompt_timeout {
        config.prompt_timeout = parse_duration(&timeout)
            .ok_or_else(|| anyhow::anyhow!("bad prompt timeout {}", timeout))?;
    }
    if let Some(capture) = args.capture {
        config.capture = records::Capture::parse(&capture)
            .ok_or_else(|| anyhow::anyhow!("bad capture mode {}", capture))?;
    }
    let catalogue = Arc::new(cards::Catalogue::standard());
    let storage = Arc::new(storage::MemoryStorage::default());
    let rules = Arc::new(rules::BasicRules::new(catalogue.clone()));
    let core = Arc::new(hub::Core::new(config.clone(), rules, catalogue, storage));
    let manager = bots::BotManager::new(config);
    for i in 1..=args.bots {
        manager.register(&format!("fish{:02}", i), Box::new(bots::Fish)).await;
    }
    manager.init(&core).await?;
    let sessions = Arc::new(transport::Sessions::default());
    hosting::Server::run(core, sessions).await?;
    Ok(())
}
