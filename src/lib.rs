// Tabula - relational session storage with migrating codecs
//
// Sessions are kept in one SQL table. The data column is written by a
// configurable codec, and the migrating codec moves a deployment from the
// legacy binary format to JSON one session save at a time.

// Re-export the session store
pub use tabula_session::*;

// Logging macros and controls
pub use tabula_log as log;
