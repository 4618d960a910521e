//! Protocolo de publicação binário.
//!
//! Envelopa a leitura de distância em bincode para transmissão UDP.
//! Formato do pacote:
//!
//! ```text
//! ┌──────────┬─────────┬──────────────┐
//! │ Magic(1) │ Ver.(1) │ Payload (N)  │
//! └──────────┴─────────┴──────────────┘
//! ```
//!
//! - Magic byte `0x52` ('R') identifica pacote de leitura de distância
//! - Versão do protocolo (1 byte)
//! - Payload [`RangeReading`] serializado com bincode
//!
//! Nota: o magic byte do pacote UDP não tem relação com o header `0x54`
//! do frame serial do sensor — são camadas distintas.

use crate::types::RangeReading;

/// Magic byte que identifica pacotes de leitura publicados.
pub const MAGIC_BYTE: u8 = 0x52; // 'R'

/// Versão atual do protocolo.
pub const PROTOCOL_VERSION: u8 = 1;

/// Tamanho do header (magic + version).
const HEADER_SIZE: usize = 2;

/// Tamanho máximo de pacote UDP seguro (sem fragmentação).
pub const MAX_UDP_PAYLOAD: usize = 65507;

/// Erros do protocolo de publicação.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Pacote muito curto ({0} bytes, mínimo {HEADER_SIZE})")]
    TooShort(usize),

    #[error("Magic byte inválido: 0x{0:02X} (esperado 0x{MAGIC_BYTE:02X})")]
    InvalidMagic(u8),

    #[error("Versão incompatível: {0} (suportada: {PROTOCOL_VERSION})")]
    VersionMismatch(u8),

    #[error("Erro de serialização: {0}")]
    Serialize(String),

    #[error("Erro de deserialização: {0}")]
    Deserialize(String),
}

/// Codifica uma [`RangeReading`] para transmissão UDP.
///
/// Retorna bytes no formato: `[MAGIC][VERSION][bincode_payload...]`
pub fn encode_reading(reading: &RangeReading) -> Result<Vec<u8>, ProtocolError> {
    let body = bincode::serialize(reading).map_err(|e| ProtocolError::Serialize(e.to_string()))?;

    let mut packet = Vec::with_capacity(HEADER_SIZE + body.len());
    packet.push(MAGIC_BYTE);
    packet.push(PROTOCOL_VERSION);
    packet.extend_from_slice(&body);

    Ok(packet)
}

/// Decodifica bytes recebidos via UDP em [`RangeReading`].
///
/// Valida magic byte e versão antes de deserializar.
pub fn decode_reading(data: &[u8]) -> Result<RangeReading, ProtocolError> {
    if data.len() < HEADER_SIZE {
        return Err(ProtocolError::TooShort(data.len()));
    }

    let magic = data[0];
    if magic != MAGIC_BYTE {
        return Err(ProtocolError::InvalidMagic(magic));
    }

    let version = data[1];
    if version != PROTOCOL_VERSION {
        return Err(ProtocolError::VersionMismatch(version));
    }

    let payload_bytes = &data[HEADER_SIZE..];
    bincode::deserialize(payload_bytes).map_err(|e| ProtocolError::Deserialize(e.to_string()))
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_reading() -> RangeReading {
        RangeReading::sample("teraranger_evo_40m", 4.2, 1_700_000_000_000)
    }

    #[test]
    fn encode_decode_roundtrip() {
        let original = sample_reading();
        let encoded = encode_reading(&original).unwrap();
        let decoded = decode_reading(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn header_is_correct() {
        let encoded = encode_reading(&sample_reading()).unwrap();
        assert_eq!(encoded[0], MAGIC_BYTE);
        assert_eq!(encoded[1], PROTOCOL_VERSION);
    }

    #[test]
    fn packet_fits_udp() {
        let encoded = encode_reading(&sample_reading()).unwrap();
        assert!(encoded.len() < MAX_UDP_PAYLOAD);
    }

    #[test]
    fn rejects_invalid_magic() {
        let mut encoded = encode_reading(&sample_reading()).unwrap();
        encoded[0] = 0xFF;
        assert!(matches!(
            decode_reading(&encoded),
            Err(ProtocolError::InvalidMagic(0xFF))
        ));
    }

    #[test]
    fn rejects_short_packet() {
        assert!(matches!(
            decode_reading(&[MAGIC_BYTE]),
            Err(ProtocolError::TooShort(1))
        ));
    }

    #[test]
    fn rejects_wrong_version() {
        let mut encoded = encode_reading(&sample_reading()).unwrap();
        encoded[1] = 99;
        assert!(matches!(
            decode_reading(&encoded),
            Err(ProtocolError::VersionMismatch(99))
        ));
    }
}
