//! Live streaming translation sessions.
//!
//! One session per connection, driven message-by-message by the transport
//! layer. The engine is a state machine: frames accumulate into a window,
//! partial predictions stream back as feedback, and an explicit
//! end-of-utterance signal finalizes the window through the full-accuracy
//! model. Wire framing is the transport's concern; this module only defines
//! the message and event payloads.

pub mod engine;
pub mod protocol;

pub use engine::{SessionState, StreamingEngine, StreamingSession};
pub use protocol::{ClientMessage, SessionEvent};
