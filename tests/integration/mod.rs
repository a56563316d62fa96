//! Integration tests for the crescendo review pipeline

mod cli_binary;
mod config_layering;
mod end_to_end;
mod http_transport;
mod test_utils;
