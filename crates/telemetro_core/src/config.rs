//! Configuração unificada via TOML.
//!
//! Um único `config.toml` cobre o driver e o monitor.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuração do Driver (lado do sensor).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Caminho do dispositivo serial
    pub device: String,
    /// Baud rate da porta serial
    pub baud_rate: u32,
    /// Timeout de leitura da porta serial (ms)
    pub serial_timeout_ms: u64,
    /// Período de publicação (ms); 5 ms ≈ 200 Hz
    pub publish_period_ms: u64,
    /// Identificador do frame de referência publicado
    pub frame_id: String,
    /// Modo de envio: "broadcast" ou "unicast"
    pub mode: String,
    /// IP de destino (255.255.255.255 para broadcast)
    pub dest_ip: String,
    /// Porta UDP
    pub port: u16,
    /// IP local para bind (vazio = auto)
    pub bind_ip: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            device: "/dev/ttyACM0".into(),
            baud_rate: 115_200,
            serial_timeout_ms: 1000,
            publish_period_ms: 5,
            frame_id: "teraranger_evo_40m".into(),
            mode: "broadcast".into(),
            dest_ip: "255.255.255.255".into(),
            port: 5005,
            bind_ip: String::new(),
        }
    }
}

/// Configuração do Monitor (consumidor de leituras).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Porta UDP para escutar
    pub port: u16,
    /// IP do driver (vazio = broadcast/auto)
    pub sender_ip: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            port: 5005,
            sender_ip: String::new(),
        }
    }
}

/// Configuração raiz do aplicativo (unifica driver e monitor).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub driver: DriverConfig,
    pub monitor: MonitorConfig,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.driver.device.is_empty() {
            errors.push("Dispositivo serial não pode ser vazio".into());
        }
        if self.driver.baud_rate == 0 {
            errors.push("Baud rate não pode ser 0".into());
        }
        if self.driver.publish_period_ms == 0 {
            errors.push("Período de publicação não pode ser 0".into());
        }
        if self.driver.port == 0 {
            errors.push("Porta do driver não pode ser 0".into());
        }
        if self.monitor.port == 0 {
            errors.push("Porta do monitor não pode ser 0".into());
        }

        errors
    }
}
