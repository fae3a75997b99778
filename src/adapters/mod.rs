//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements   | Connects to                      |
//! |----------------|--------------|----------------------------------|
//! | `config_file`  | ConfigPort   | JSON file on disk                |
//! | `hardware`     | PinDriver    | backend chosen by configuration  |
//! | `log_sink`     | EventSink    | `log` facade                     |
//! | `time`         | Clock        | monotonic system timer           |

pub mod config_file;
pub mod hardware;
pub mod log_sink;
pub mod time;
