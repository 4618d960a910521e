//! Tipos da leitura de distância publicada.
//!
//! A distância viaja como `f32` com codificação IEEE-754 especial:
//! `-inf` = alvo perto demais, `+inf` = fora de alcance, `NaN` = medida
//! inválida. Consumidores que precisem ramificar sobre essas classes
//! usam [`RangeClass`] em vez de comparar floats diretamente.

use crate::frame::{FIELD_OF_VIEW_RAD, MAX_RANGE_M, MIN_RANGE_M};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Modalidade de sensoriamento do emissor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadiationType {
    Ultrasound,
    Infrared,
}

/// Leitura de distância publicada via UDP.
///
/// Os campos de metadados (frame, abertura, limites) são fixos por
/// sensor; apenas `timestamp_ms` e `range` variam entre amostras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeReading {
    /// Instante da amostragem (ms desde a época Unix)
    pub timestamp_ms: u64,
    /// Identificador do frame de referência do sensor
    pub frame_id: String,
    /// Modalidade do emissor (infravermelho para o Evo 40m)
    pub radiation_type: RadiationType,
    /// Abertura do feixe (rad)
    pub field_of_view: f32,
    /// Alcance mínimo (m)
    pub min_range: f32,
    /// Alcance máximo (m)
    pub max_range: f32,
    /// Distância amostrada (m, ±inf ou NaN)
    pub range: f32,
}

impl RangeReading {
    /// Compõe uma leitura com os metadados fixos do Evo 40m.
    pub fn sample(frame_id: &str, range: f32, timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            frame_id: frame_id.to_owned(),
            radiation_type: RadiationType::Infrared,
            field_of_view: FIELD_OF_VIEW_RAD,
            min_range: MIN_RANGE_M,
            max_range: MAX_RANGE_M,
            range,
        }
    }

    /// Classe semântica da distância transportada.
    pub fn class(&self) -> RangeClass {
        RangeClass::of(self.range)
    }
}

// ──────────────────────────────────────────────
// Classificação da distância
// ──────────────────────────────────────────────

/// Classe semântica de uma distância decodificada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeClass {
    /// Medida válida dentro dos limites do sensor
    Finite,
    /// Alvo mais perto que o alcance mínimo (`-inf`)
    TooClose,
    /// Alvo além do alcance máximo (`+inf`)
    OutOfRange,
    /// O sensor não conseguiu medir (`NaN`)
    Invalid,
}

impl RangeClass {
    /// Classifica um valor de distância codificado em IEEE-754.
    pub fn of(range: f32) -> Self {
        if range.is_nan() {
            RangeClass::Invalid
        } else if range == f32::INFINITY {
            RangeClass::OutOfRange
        } else if range == f32::NEG_INFINITY {
            RangeClass::TooClose
        } else {
            RangeClass::Finite
        }
    }
}

impl fmt::Display for RangeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RangeClass::Finite => "ok",
            RangeClass::TooClose => "perto demais",
            RangeClass::OutOfRange => "fora de alcance",
            RangeClass::Invalid => "medida inválida",
        };
        f.write_str(label)
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
