use std::net::Ipv4Addr;
use std::process;

use structopt::StructOpt;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use icmp_probe::{scheduler, Config, Outcome, ProbeSession};

#[derive(StructOpt, Debug)]
#[structopt(name = "icmp-probe")]
struct Opt {
    /// Destination IPv4 address in dotted-decimal form.
    host: Ipv4Addr,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    pretty_env_logger::init();
    let opt = Opt::from_args();

    let config = Config::default();
    let mut session = match ProbeSession::new(opt.host, &config) {
        Ok(session) => session,
        Err(e) => {
            error!("{}", e);
            eprintln!("icmp-probe: {}", e);
            process::exit(1);
        }
    };
    info!("PING {} ident={}", opt.host, session.ident);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            // Keep the sender alive, a dropped sender stops the loop.
            warn!("cannot listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
        let _ = shutdown_tx.send(());
    });

    let stats = scheduler::run(&mut session, config.interval, shutdown_rx, |outcome| {
        if let Outcome::Reply { .. } = outcome {
            println!("{}", outcome);
        }
    })
    .await;
    println!("\n{}", stats);
}
