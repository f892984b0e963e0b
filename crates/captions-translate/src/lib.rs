pub mod client;
pub mod dispatcher;

pub use client::{HttpTranslator, Translator};
pub use dispatcher::TranslationDispatcher;
