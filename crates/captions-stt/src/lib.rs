pub mod client;

pub use client::{HttpSttClient, SttClient};
