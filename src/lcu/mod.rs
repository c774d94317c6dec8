// LCU module - transport capability and the concrete League client connection

mod client;
mod connection;
mod events;
mod transport;

pub use client::LcuClient;
pub use connection::{read_lockfile_once, wait_for_client, LcuConnection};
pub use events::{parse_lcu_ws_event, EventRouter, LcuEvent};
pub use transport::{get_json, Subscription, Transport};
