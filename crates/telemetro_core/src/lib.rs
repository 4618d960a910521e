//! # Telemetro Core
//!
//! Crate compartilhada do driver do telêmetro infravermelho TeraRanger
//! Evo 40m: protocolo de frame do sensor, protocolo de publicação
//! binário (bincode), estado compartilhado e configuração TOML.
//!
//! ## Módulos
//! - [`frame`] – Decodificação/validação do frame serial de 4 bytes
//! - [`types`] – Leitura publicada ([`RangeReading`]) e classificação
//! - [`protocol`] – Encode/decode binário com magic byte
//! - [`state`] – Slot atômico last-write-wins e entrega de frames
//! - [`config`] – Configuração unificada via TOML

pub mod config;
pub mod frame;
pub mod protocol;
pub mod state;
pub mod types;

// Re-exports convenientes
pub use config::{AppConfig, DriverConfig, MonitorConfig};
pub use frame::{FrameError, decode_frame};
pub use protocol::{PROTOCOL_VERSION, decode_reading, encode_reading};
pub use state::{FrameSink, SharedRange};
pub use types::{RangeClass, RangeReading};
