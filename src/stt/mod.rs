//! Speech recognition: the client contract and the remote service backend.

pub mod recognizer;
pub mod remote;

pub use recognizer::{MockRecognizer, Outcome, SpeechRecognizer};
pub use remote::RemoteRecognizer;
