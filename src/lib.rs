// CodeStamp library: text and barcode stamping for batches of images

pub mod batch;
pub mod config;
pub mod error;
pub mod logging;
pub mod preview;
pub mod session;
pub mod stamp;

pub use error::StampError;
