//! Frame sources

mod channel;
mod udp;

pub use channel::{channel_source, ChannelFrameSource};
pub use udp::UdpFrameSource;
