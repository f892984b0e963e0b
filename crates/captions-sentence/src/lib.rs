//! C6: the per-speaker sentence assembler. [`assembler`] is the pure state
//! machine; [`merge`] is the overlap-aware text merge it relies on;
//! [`actor`] wraps it in a `tokio::select!` loop that owns the real
//! pause/finalize timers.

pub mod actor;
pub mod assembler;
pub mod merge;

pub use actor::{spawn, SentenceAssemblerHandle, SpawnArgs};
pub use assembler::{AppendOutcome, AssemblerConfig, Emission, SentenceAssembler};
