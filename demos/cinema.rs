//! The cinema booth with its default parameters: four consecutive seeds starting at 541, seven days each, 10:00 to
//! the 18:30 show.
//!
//! Pass a path to a JSON configuration to override any of the defaults, e.g.
//! `cargo run --example cinema -- booth.json`. Set `RUST_LOG=boothsim=debug` to see each day's summary.

use boothsim::config::BoothConfig;
use boothsim::logging::init_logging;
use boothsim::replication::ReplicationDriver;

fn main() -> boothsim::Result {
    init_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => BoothConfig::from_path(path)?,
        None => BoothConfig::default(),
    };
    let driver = ReplicationDriver::new(config)?;

    for (seed, result) in driver.run() {
        match result {
            Ok(report) => println!("{report}\n"),
            Err(error) => println!("seed {seed} failed: {error}\n"),
        }
    }
    Ok(())
}
