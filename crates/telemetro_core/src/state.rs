//! Estado compartilhado entre a thread serial e o loop de publicação.
//!
//! Um único slot de `f32` com política last-write-wins: cada decodificação
//! bem-sucedida sobrescreve a anterior, e o publicador amostra o slot no
//! seu próprio ritmo. Leituras repetidas ou perdidas entre escritas fazem
//! parte do contrato — não há fila nem histórico.

use crate::frame::{FrameError, decode_frame};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, trace};

/// Slot atômico com a última distância decodificada (m).
///
/// O `f32` é guardado pelos bits em um [`AtomicU32`]; store/load de uma
/// única palavra bastam, pois não há invariante composta entre campos.
/// Antes do primeiro frame válido o slot contém `0.0`.
#[derive(Debug)]
pub struct SharedRange {
    bits: AtomicU32,
}

impl SharedRange {
    pub fn new() -> Self {
        Self {
            bits: AtomicU32::new(0.0_f32.to_bits()),
        }
    }

    /// Sobrescreve o slot com uma nova distância.
    pub fn set(&self, range: f32) {
        self.bits.store(range.to_bits(), Ordering::Relaxed);
    }

    /// Retorna a última distância gravada (ou `0.0` se nenhuma).
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

impl Default for SharedRange {
    fn default() -> Self {
        Self::new()
    }
}

// ──────────────────────────────────────────────
// Entrega de frames
// ──────────────────────────────────────────────

/// Destino dos frames entregues pelo transporte serial.
///
/// Interface de um método só: o transporte chama [`frame_received`] uma
/// vez por frame e nunca é chamado de volta. Frames rejeitados são
/// registrados e descartados sem tocar o estado.
///
/// [`frame_received`]: FrameSink::frame_received
#[derive(Debug, Clone)]
pub struct FrameSink {
    state: Arc<SharedRange>,
}

impl FrameSink {
    pub fn new(state: Arc<SharedRange>) -> Self {
        Self { state }
    }

    /// Decodifica um frame e grava a distância no slot compartilhado.
    ///
    /// Retorna o motivo da rejeição apenas para fins de teste/diagnóstico;
    /// nenhum erro aqui é fatal para o chamador.
    pub fn frame_received(&self, buf: &[u8]) -> Result<(), FrameError> {
        match decode_frame(buf) {
            Ok(range) => {
                self.state.set(range);
                trace!("Frame decodificado: {range} m");
                Ok(())
            }
            Err(e) => {
                debug!("Frame descartado: {e}");
                Err(e)
            }
        }
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::crc8;

    fn frame_for(raw: i16) -> [u8; 4] {
        let [high, low] = raw.to_be_bytes();
        let mut frame = [0x54, high, low, 0];
        frame[3] = crc8(&frame[..3]);
        frame
    }

    #[test]
    fn starts_at_zero() {
        let state = SharedRange::new();
        assert_eq!(state.get(), 0.0);
    }

    #[test]
    fn reads_are_idempotent() {
        let state = SharedRange::new();
        state.set(3.25);
        assert_eq!(state.get(), 3.25);
        assert_eq!(state.get(), 3.25);
        assert_eq!(state.get(), 3.25);
    }

    #[test]
    fn last_write_wins() {
        let state = SharedRange::new();
        state.set(1.0);
        state.set(2.0);
        state.set(37.5);
        assert_eq!(state.get(), 37.5);
    }

    #[test]
    fn special_values_survive_bit_cast() {
        let state = SharedRange::new();

        state.set(f32::NEG_INFINITY);
        assert_eq!(state.get(), f32::NEG_INFINITY);

        state.set(f32::INFINITY);
        assert_eq!(state.get(), f32::INFINITY);

        state.set(f32::NAN);
        assert!(state.get().is_nan());
    }

    #[test]
    fn write_is_visible_across_threads() {
        let state = Arc::new(SharedRange::new());
        let writer = Arc::clone(&state);

        std::thread::spawn(move || writer.set(7.5))
            .join()
            .unwrap();

        assert_eq!(state.get(), 7.5);
    }

    #[test]
    fn sink_stores_valid_frame() {
        let state = Arc::new(SharedRange::new());
        let sink = FrameSink::new(Arc::clone(&state));

        sink.frame_received(&frame_for(1000)).unwrap();
        assert_eq!(state.get(), 1.0);
    }

    #[test]
    fn sink_drops_rejected_frame_without_touching_state() {
        let state = Arc::new(SharedRange::new());
        let sink = FrameSink::new(Arc::clone(&state));

        sink.frame_received(&frame_for(2000)).unwrap();
        assert_eq!(state.get(), 2.0);

        // Header errado: o slot mantém o valor anterior
        let bad = [0x41, 0x03, 0xE8, 0x26];
        assert!(sink.frame_received(&bad).is_err());
        assert_eq!(state.get(), 2.0);

        // CRC corrompido: idem
        let mut corrupted = frame_for(3000);
        corrupted[3] ^= 0x01;
        assert!(sink.frame_received(&corrupted).is_err());
        assert_eq!(state.get(), 2.0);

        // Frame curto: idem
        assert!(sink.frame_received(&[0x54, 0x03]).is_err());
        assert_eq!(state.get(), 2.0);
    }
}
