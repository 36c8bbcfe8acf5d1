//! Driver for 7941W dual-frequency (13.56MHz / 125kHz) RFID reader/writer
//! modules, plus an encoder for HID H10301 card numbers written to T5577 chips.
//!
//! # Features
//!
//! - `serial` - Serial port transport for desktop using serialport crate
//!
//! # Example
//!
//! ```ignore
//! use rfid_7941w::{H10301, Reader7941w, SerialTransport, DEFAULT_PASSWORD, KEY_GROUP_A};
//!
//! let transport = SerialTransport::new("/dev/ttyUSB0", 115200)?;
//! let mut reader = Reader7941w::new(transport);
//!
//! let block = reader.read_sector(1, 0, KEY_GROUP_A, &DEFAULT_PASSWORD)?;
//! println!("Block: {:02X?}", block);
//!
//! reader.write_card_number(&H10301::new(99, 7205))?;
//! ```

mod config;
pub mod frame;
mod h10301;
mod reader;
mod transport;
mod types;

#[cfg(feature = "serial")]
mod serial;

// Re-exports
pub use config::ReaderConfig;
pub use h10301::{H10301, H10301_LEN};
pub use reader::Reader7941w;
pub use transport::ReaderTransport;
pub use types::{
    FrameError, ReaderError, DEFAULT_PASSWORD, KEY_GROUP_A, KEY_GROUP_B, PASSWORD_LEN,
};

#[cfg(feature = "serial")]
pub use serial::{SerialConfig, SerialTransport};
