//! Protocolo de frame do sensor TeraRanger Evo 40m.
//!
//! O sensor emite frames binários de 4 bytes pela porta serial:
//!
//! ```text
//! ┌───────────┬──────────┬──────────┬──────────┐
//! │ 'T' (1)   │ High (1) │ Low (1)  │ CRC-8(1) │
//! └───────────┴──────────┴──────────┴──────────┘
//! ```
//!
//! - Header fixo `0x54` ('T')
//! - Leitura crua de 16 bits com sinal, big-endian (`high`/`low`)
//! - CRC-8 (polinômio 0x07, tabela) sobre os bytes [0..2]
//!
//! A leitura crua reserva valores sentinela: `0` = alvo perto demais,
//! `-1` = fora de alcance, `1` = medida inválida. Os demais valores são
//! milímetros, convertidos para metros e saturados nos limites do sensor.

use thiserror::Error;

/// Byte de header que abre todo frame de medição.
pub const FRAME_HEADER: u8 = 0x54; // 'T'

/// Tamanho fixo do frame de medição.
pub const FRAME_LEN: usize = 4;

/// Fator de conversão da leitura crua (mm) para metros.
pub const VALUE_TO_METER: f32 = 0.001;

/// Alcance mínimo do Evo 40m (m).
pub const MIN_RANGE_M: f32 = 0.5;

/// Alcance máximo do Evo 40m (m).
pub const MAX_RANGE_M: f32 = 40.0;

/// Abertura do feixe infravermelho (rad), ~2°.
pub const FIELD_OF_VIEW_RAD: f32 = 0.0349066;

// ──────────────────────────────────────────────
// Sentinelas da leitura crua
// ──────────────────────────────────────────────

/// Alvo mais perto que o alcance mínimo.
const RAW_TOO_CLOSE: i16 = 0;

/// Alvo além do alcance máximo (padrão de bits 0xFFFF).
const RAW_OUT_OF_RANGE: i16 = -1;

/// O sensor não conseguiu medir.
const RAW_INVALID: i16 = 1;

// ──────────────────────────────────────────────
// Comandos de inicialização do sensor
// ──────────────────────────────────────────────
// Enviados uma única vez na abertura da porta; o último byte de cada
// comando é o CRC-8 dos anteriores.

/// Liga o emissor do sensor.
pub const ENABLE_CMD: [u8; 5] = [0x00, 0x52, 0x02, 0x01, 0xDF];

/// Seleciona o modo de streaming binário (frames 'T').
pub const BINARY_MODE_CMD: [u8; 4] = [0x00, 0x11, 0x02, 0x4C];

/// Seleciona o modo texto (não usado pelo driver; documentado por completude).
pub const TEXT_MODE_CMD: [u8; 4] = [0x00, 0x11, 0x01, 0x45];

/// Tabela CRC-8 do sensor (polinômio 0x07, valor inicial 0, sem reflexão).
const CRC_TABLE: [u8; 256] = [
    0x00, 0x07, 0x0E, 0x09, 0x1C, 0x1B, 0x12, 0x15, 0x38, 0x3F, 0x36, 0x31, 0x24, 0x23, 0x2A, 0x2D,
    0x70, 0x77, 0x7E, 0x79, 0x6C, 0x6B, 0x62, 0x65, 0x48, 0x4F, 0x46, 0x41, 0x54, 0x53, 0x5A, 0x5D,
    0xE0, 0xE7, 0xEE, 0xE9, 0xFC, 0xFB, 0xF2, 0xF5, 0xD8, 0xDF, 0xD6, 0xD1, 0xC4, 0xC3, 0xCA, 0xCD,
    0x90, 0x97, 0x9E, 0x99, 0x8C, 0x8B, 0x82, 0x85, 0xA8, 0xAF, 0xA6, 0xA1, 0xB4, 0xB3, 0xBA, 0xBD,
    0xC7, 0xC0, 0xC9, 0xCE, 0xDB, 0xDC, 0xD5, 0xD2, 0xFF, 0xF8, 0xF1, 0xF6, 0xE3, 0xE4, 0xED, 0xEA,
    0xB7, 0xB0, 0xB9, 0xBE, 0xAB, 0xAC, 0xA5, 0xA2, 0x8F, 0x88, 0x81, 0x86, 0x93, 0x94, 0x9D, 0x9A,
    0x27, 0x20, 0x29, 0x2E, 0x3B, 0x3C, 0x35, 0x32, 0x1F, 0x18, 0x11, 0x16, 0x03, 0x04, 0x0D, 0x0A,
    0x57, 0x50, 0x59, 0x5E, 0x4B, 0x4C, 0x45, 0x42, 0x6F, 0x68, 0x61, 0x66, 0x73, 0x74, 0x7D, 0x7A,
    0x89, 0x8E, 0x87, 0x80, 0x95, 0x92, 0x9B, 0x9C, 0xB1, 0xB6, 0xBF, 0xB8, 0xAD, 0xAA, 0xA3, 0xA4,
    0xF9, 0xFE, 0xF7, 0xF0, 0xE5, 0xE2, 0xEB, 0xEC, 0xC1, 0xC6, 0xCF, 0xC8, 0xDD, 0xDA, 0xD3, 0xD4,
    0x69, 0x6E, 0x67, 0x60, 0x75, 0x72, 0x7B, 0x7C, 0x51, 0x56, 0x5F, 0x58, 0x4D, 0x4A, 0x43, 0x44,
    0x19, 0x1E, 0x17, 0x10, 0x05, 0x02, 0x0B, 0x0C, 0x21, 0x26, 0x2F, 0x28, 0x3D, 0x3A, 0x33, 0x34,
    0x4E, 0x49, 0x40, 0x47, 0x52, 0x55, 0x5C, 0x5B, 0x76, 0x71, 0x78, 0x7F, 0x6A, 0x6D, 0x64, 0x63,
    0x3E, 0x39, 0x30, 0x37, 0x22, 0x25, 0x2C, 0x2B, 0x06, 0x01, 0x08, 0x0F, 0x1A, 0x1D, 0x14, 0x13,
    0xAE, 0xA9, 0xA0, 0xA7, 0xB2, 0xB5, 0xBC, 0xBB, 0x96, 0x91, 0x98, 0x9F, 0x8A, 0x8D, 0x84, 0x83,
    0xDE, 0xD9, 0xD0, 0xD7, 0xC2, 0xC5, 0xCC, 0xCB, 0xE6, 0xE1, 0xE8, 0xEF, 0xFA, 0xFD, 0xF4, 0xF3,
];

/// Erros de validação de frame.
///
/// Todos são locais ao frame: o chamador descarta o frame e segue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame com {0} bytes (esperado {FRAME_LEN})")]
    WrongLength(usize),

    #[error("Header inválido: 0x{0:02X} (esperado 0x{FRAME_HEADER:02X})")]
    BadHeader(u8),

    #[error("CRC divergente: calculado 0x{expected:02X}, recebido 0x{received:02X}")]
    ChecksumMismatch { expected: u8, received: u8 },
}

/// Calcula o CRC-8 de uma sequência de bytes.
///
/// O acumulador é de 16 bits para acomodar o deslocamento antes da
/// máscara, como na referência do fabricante.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u16 = 0;
    for &byte in data {
        let i = ((crc ^ u16::from(byte)) & 0xFF) as usize;
        crc = (u16::from(CRC_TABLE[i]) ^ (crc << 8)) & 0xFF;
    }
    crc as u8
}

/// Decodifica um frame de medição em distância (metros).
///
/// Valida na ordem: tamanho, header, CRC. Em caso de sucesso interpreta
/// a leitura crua:
/// - sentinela `0` → [`f32::NEG_INFINITY`] (perto demais)
/// - sentinela `-1` → [`f32::INFINITY`] (fora de alcance)
/// - sentinela `1` → [`f32::NAN`] (medida inválida)
/// - demais valores → metros, saturados em ±infinito fora de
///   [`MIN_RANGE_M`]..[`MAX_RANGE_M`]
pub fn decode_frame(buf: &[u8]) -> Result<f32, FrameError> {
    if buf.len() != FRAME_LEN {
        return Err(FrameError::WrongLength(buf.len()));
    }

    if buf[0] != FRAME_HEADER {
        return Err(FrameError::BadHeader(buf[0]));
    }

    let expected = crc8(&buf[..3]);
    if expected != buf[3] {
        return Err(FrameError::ChecksumMismatch {
            expected,
            received: buf[3],
        });
    }

    let raw = i16::from_be_bytes([buf[1], buf[2]]);

    let range = match raw {
        RAW_TOO_CLOSE => f32::NEG_INFINITY,
        RAW_OUT_OF_RANGE => f32::INFINITY,
        RAW_INVALID => f32::NAN,
        _ => {
            let meters = raw as f32 * VALUE_TO_METER;
            if meters > MAX_RANGE_M {
                f32::INFINITY
            } else if meters < MIN_RANGE_M {
                f32::NEG_INFINITY
            } else {
                meters
            }
        }
    };

    Ok(range)
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Monta um frame válido a partir da leitura crua.
    fn frame_for(raw: i16) -> [u8; 4] {
        let [high, low] = raw.to_be_bytes();
        let mut frame = [FRAME_HEADER, high, low, 0];
        frame[3] = crc8(&frame[..3]);
        frame
    }

    #[test]
    fn crc_of_single_byte_is_table_lookup() {
        // Com valor inicial 0, um único byte indexa a tabela diretamente
        for b in 0..=255u8 {
            assert_eq!(crc8(&[b]), CRC_TABLE[b as usize]);
        }
    }

    #[test]
    fn crc_of_empty_slice_is_zero() {
        assert_eq!(crc8(&[]), 0);
    }

    #[test]
    fn bringup_commands_end_in_own_crc() {
        assert_eq!(crc8(&ENABLE_CMD[..4]), ENABLE_CMD[4]);
        assert_eq!(crc8(&BINARY_MODE_CMD[..3]), BINARY_MODE_CMD[3]);
        assert_eq!(crc8(&TEXT_MODE_CMD[..3]), TEXT_MODE_CMD[3]);
    }

    #[test]
    fn decodes_one_meter() {
        // raw 1000 → 1.000 m
        let frame = [0x54, 0x03, 0xE8, 0x26];
        assert_eq!(decode_frame(&frame), Ok(1.0));
    }

    #[test]
    fn decodes_thirty_meters() {
        let range = decode_frame(&frame_for(30_000)).unwrap();
        assert!((range - 30.0).abs() < 1e-4);
    }

    #[test]
    fn rejects_short_frame() {
        assert_eq!(decode_frame(&[0x54, 0x03, 0xE8]), Err(FrameError::WrongLength(3)));
    }

    #[test]
    fn rejects_long_frame() {
        let buf = [0x54, 0x03, 0xE8, 0x26, 0x00];
        assert_eq!(decode_frame(&buf), Err(FrameError::WrongLength(5)));
    }

    #[test]
    fn rejects_bad_header() {
        let buf = [0x41, 0x03, 0xE8, 0x26];
        assert_eq!(decode_frame(&buf), Err(FrameError::BadHeader(0x41)));
    }

    #[test]
    fn rejects_corrupted_checksum() {
        let mut frame = frame_for(1000);
        frame[3] ^= 0xFF;
        assert!(matches!(
            decode_frame(&frame),
            Err(FrameError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn raw_zero_is_too_close() {
        // [0x54, 0x00, 0x00, 0x8F]
        let range = decode_frame(&frame_for(0)).unwrap();
        assert_eq!(range, f32::NEG_INFINITY);
    }

    #[test]
    fn raw_minus_one_is_out_of_range() {
        // padrão de bits 0xFFFF → [0x54, 0xFF, 0xFF, 0xAB]
        let range = decode_frame(&frame_for(-1)).unwrap();
        assert_eq!(range, f32::INFINITY);
    }

    #[test]
    fn raw_one_is_invalid_measure() {
        // [0x54, 0x00, 0x01, 0x88]
        let range = decode_frame(&frame_for(1)).unwrap();
        assert!(range.is_nan());
    }

    #[test]
    fn below_min_range_saturates_negative() {
        // raw 450 → 0.45 m, abaixo do alcance mínimo
        let range = decode_frame(&frame_for(450)).unwrap();
        assert_eq!(range, f32::NEG_INFINITY);
    }

    #[test]
    fn negative_raw_saturates_negative() {
        // A leitura é assinada: 0xAF 0xC8 é -20536, não 45000
        let range = decode_frame(&frame_for(-20_536)).unwrap();
        assert_eq!(range, f32::NEG_INFINITY);
    }

    #[test]
    fn max_representable_raw_is_finite() {
        // i16::MAX → 32.767 m, ainda dentro do alcance do Evo 40m
        let range = decode_frame(&frame_for(i16::MAX)).unwrap();
        assert!(range.is_finite());
        assert!((range - 32.767).abs() < 1e-4);
    }
}
