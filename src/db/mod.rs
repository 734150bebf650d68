pub mod connection;

pub use connection::{begin_snapshot, connect_to_database, describe_target, mask_url_password};
