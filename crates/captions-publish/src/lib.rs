pub mod publisher;
pub mod wire;

pub use publisher::{DataPublisher, OutboundPublisher, CAPTIONS_TOPIC};
pub use wire::{now_millis, CaptionRecord};
