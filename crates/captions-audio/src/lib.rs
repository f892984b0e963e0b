pub mod frame_aggregator;
pub mod signal;
pub mod wav;

pub use frame_aggregator::{AudioFrame, AudioWindow, FrameAggregator, FrameAggregatorConfig};
pub use signal::rms;
pub use wav::encode_wav;
