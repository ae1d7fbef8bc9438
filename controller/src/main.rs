use std::collections::HashSet;
use std::sync::Arc;

use clap::{App, AppSettings, Arg};

use livesteer::config::{
    Config, Mode, DEFAULT_LISTEN_ADDR, DEFAULT_NOTIFY_PORT, DEFAULT_RTMP_PORT, DEFAULT_STREAM_KEY,
};
use livesteer::{server, Error};

// RUST_LOG=debug cargo run -- --mode bypass --stream-key 6829proj

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let mut app = App::new("livesteer")
        .version("0.1.0")
        .about("SDN controller that steers a local livestream onto a direct peer-to-peer path.")
        .setting(AppSettings::DeriveDisplayOrder)
        .arg(
            Arg::with_name("FULLHELP")
                .help("Prints more detailed help information")
                .long("fullhelp"),
        )
        .arg(
            Arg::with_name("listen")
                .default_value(DEFAULT_LISTEN_ADDR)
                .takes_value(true)
                .long("listen")
                .help("Address to accept switch connections on"),
        )
        .arg(
            Arg::with_name("mode")
                .default_value("bypass")
                .takes_value(true)
                .long("mode")
                .help("'bypass' steers local peers together; 'direct' is a plain learning switch"),
        )
        .arg(
            Arg::with_name("rtmp-port")
                .takes_value(true)
                .long("rtmp-port")
                .help("TCP port carrying RTMP signaling (defaults to 1935)"),
        )
        .arg(
            Arg::with_name("notify-port")
                .takes_value(true)
                .long("notify-port")
                .help("TCP port carrying the notification heartbeats (defaults to 42857)"),
        )
        .arg(
            Arg::with_name("stream-key")
                .default_value(DEFAULT_STREAM_KEY)
                .takes_value(true)
                .long("stream-key")
                .help("Stream key substring that marks the experiment's RTMP flows"),
        )
        .arg(
            Arg::with_name("transparent")
                .long("transparent")
                .help("Forward link-local (LLDP, 802.1x) traffic instead of dropping it"),
        )
        .arg(
            Arg::with_name("ignore")
                .takes_value(true)
                .long("ignore")
                .help("Comma-separated hex datapath ids to leave unmanaged"),
        );

    let matches = app.clone().get_matches();

    if matches.is_present("FULLHELP") {
        app.print_long_help().unwrap();
        std::process::exit(0);
    }

    let listen = matches.value_of("listen").unwrap().to_owned();
    let mode: Mode = matches.value_of("mode").unwrap().parse()?;
    let rtmp_port = parse_port(matches.value_of("rtmp-port"), DEFAULT_RTMP_PORT)?;
    let notify_port = parse_port(matches.value_of("notify-port"), DEFAULT_NOTIFY_PORT)?;
    let stream_key = matches.value_of("stream-key").unwrap().to_owned();
    let ignore = parse_dpids(matches.value_of("ignore"))?;

    let config = Config {
        mode,
        rtmp_port,
        notify_port,
        stream_key,
        transparent: matches.is_present("transparent"),
        ignore,
    };
    server::run(&listen, Arc::new(config)).await
}

fn parse_port(value: Option<&str>, default: u16) -> Result<u16, Error> {
    match value {
        None => Ok(default),
        Some(s) => s
            .parse()
            .map_err(|_| Error::ErrInvalidArg(format!("bad port '{}'", s))),
    }
}

fn parse_dpids(value: Option<&str>) -> Result<HashSet<u64>, Error> {
    let mut dpids = HashSet::new();
    if let Some(list) = value {
        for entry in list.split(',').filter(|s| !s.is_empty()) {
            let raw = entry.trim().trim_start_matches("0x");
            let dpid = u64::from_str_radix(raw, 16)
                .map_err(|_| Error::ErrInvalidArg(format!("bad datapath id '{}'", entry)))?;
            dpids.insert(dpid);
        }
    }
    Ok(dpids)
}
