//! # Ingestion
//!
//! IMU ingress module.
//!
//! Responsibilities:
//! - Receive two-part frames from a `FrameSource` (UDP, in-process channel, mock)
//! - Filter by topic, decode and validate the 12-field payload
//! - Publish only the freshest sample through a latest-wins `SampleSlot`
//! - Log and drop malformed frames without stopping
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{Ingress, SampleDecoder, SampleSlot, UdpFrameSource};
//!
//! let slot = Arc::new(SampleSlot::new());
//! let source = UdpFrameSource::bind("imu_sub", "127.0.0.1:5559", 65000).await?;
//! let decoder = SampleDecoder::new("imu", PayloadFormat::Bincode);
//! let ingress = Ingress::new(source, decoder, slot.clone()).spawn();
//!
//! // Fusion loop
//! if let Some(sample) = slot.take() {
//!     // fuse
//! }
//!
//! ingress.shutdown();
//! ingress.join().await?;
//! ```
//!
//! ## Mock Testing
//!
//! ```ignore
//! use ingestion::MockImuSource;
//!
//! let mock = MockImuSource::rocking("imu", 100.0);
//! let source = mock.start(100);
//! ```

mod decode;
mod error;
mod ingress;
mod metrics;
mod mock;
mod slot;
mod sources;

// Re-exports
pub use crate::metrics::{IngestionMetrics, MetricsSnapshot};
pub use contracts::{Frame, ImuSample};
pub use decode::SampleDecoder;
pub use error::{IngestionError, Result};
pub use ingress::{Ingress, IngressHandle};
pub use mock::{MockImuConfig, MockImuSource};
pub use slot::SampleSlot;
pub use sources::{channel_source, ChannelFrameSource, UdpFrameSource};
