pub mod config;
pub mod proxy;

pub use config::{ProxyRule, Settings};
pub use netproxy_addr::{AddrError, Endpoint};
pub use proxy::{
    connect_any, dial, relay, Connection, DialError, ListenError, ListenerStats, RaceFailure,
    RelayError, RelayListener,
};
