//! Frame publisher implementations

mod channel;
mod log;
mod udp;

pub use channel::{channel_publisher, ChannelFramePublisher};
pub use log::LogPublisher;
pub use udp::UdpFramePublisher;
