//! Host link task
//!
//! Waits for the host, then answers every 'H' with the latest sample.
//! A 'Q' drops back to signalling until the host answers again.

use defmt::*;
use embassy_rp::uart::BufferedUart;
use embassy_time::{Delay, Duration, Ticker};

use loadlink_hal::IoStream;
use loadlink_protocol::{Exchange, LinkConfig, LinkProtocol};

use crate::channels::{latest, LOAD_CELLS};

/// How often pending host commands are checked
const POLL_PERIOD_MS: u64 = 1;

/// Period of the diagnostic line
#[cfg(feature = "diagnostic")]
const DIAGNOSTIC_PERIOD_MS: u64 = 100;

type Link = LinkProtocol<IoStream<BufferedUart>, Delay>;

/// Link task - serves samples to the host
#[embassy_executor::task]
pub async fn link_task(uart: BufferedUart, config: LinkConfig) {
    info!("Link task started");

    let mut link: Link = LinkProtocol::with_config(IoStream::new(uart), Delay, config);

    #[cfg(feature = "diagnostic")]
    diagnostic_loop(&mut link).await;

    #[cfg(not(feature = "diagnostic"))]
    serve_loop(&mut link).await;
}

#[cfg(not(feature = "diagnostic"))]
async fn serve_loop(link: &mut Link) {
    connect(link).await;

    let mut ticker = Ticker::every(Duration::from_millis(POLL_PERIOD_MS));
    loop {
        let sample = latest();
        match link.exchange(&sample, LOAD_CELLS) {
            Ok(Exchange::Quit) => {
                info!("Host quit, waiting for reconnect");
                connect(link).await;
            }
            Ok(_) => {}
            Err(e) => warn!("Link error: {:?}", e),
        }
        ticker.next().await;
    }
}

#[cfg(not(feature = "diagnostic"))]
async fn connect(link: &mut Link) {
    let mut delay = Delay;
    loop {
        match link.establish_async(&mut delay).await {
            Ok(()) => {
                info!("Host connected");
                return;
            }
            Err(e) => warn!("Connect failed: {:?}", e),
        }
    }
}

#[cfg(feature = "diagnostic")]
async fn diagnostic_loop(link: &mut Link) {
    let mut ticker = Ticker::every(Duration::from_millis(DIAGNOSTIC_PERIOD_MS));
    loop {
        let sample = latest();
        // Fields 0..=count: pass the last index so the line covers every cell
        if let Err(e) = link.diagnostic_print(&sample, LOAD_CELLS - 1) {
            warn!("Link error: {:?}", e);
        }
        ticker.next().await;
    }
}
