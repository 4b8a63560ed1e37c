//! Record → log sentence → prompt.
//!
//! A structured record is flattened into a "log sentence" following a fixed
//! field order, then merged with free-form human context into one prompt:
//!
//! ```
//! use crewline_sentence::{compose, encode, FieldOrder, Record};
//! use serde_json::json;
//!
//! let record = Record::from_json(&json!({ "status": 403, "method": "GET" })).unwrap();
//! let sentence = encode(&record, &FieldOrder::server_log());
//! assert_eq!(sentence, "STATUS_403 METHOD_GET");
//!
//! let prompt = compose(&sentence, "Failed calls from a script").unwrap();
//! assert!(prompt.contains("STATUS_403 METHOD_GET"));
//! ```

pub mod composer;
pub mod encoder;

pub use composer::{compose, ComposeError, PromptComposer, DEFAULT_TEMPLATE};
pub use encoder::{encode, EncodeError, FieldOrder, Record, RecordError, Scalar};
