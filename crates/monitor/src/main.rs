//! # Telemetro Monitor
//!
//! Consumidor de linha de comando: escuta as leituras publicadas pelo
//! driver via UDP e as registra no terminal, uma linha por pacote.
//!
//! Distâncias finitas aparecem em metros; as classes especiais (perto
//! demais, fora de alcance, medida inválida) aparecem pelo nome.

use std::net::UdpSocket;
use telemetro_core::config::{AppConfig, MonitorConfig};
use telemetro_core::protocol::decode_reading;
use telemetro_core::types::RangeClass;
use tracing::{debug, error, info, warn};

fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Config ──
    let config_path = AppConfig::default_path();
    let config = AppConfig::load(&config_path);

    if !config_path.exists() {
        let _ = config.save(&config_path);
    }

    listen_loop(&config.monitor);
}

fn listen_loop(cfg: &MonitorConfig) -> ! {
    loop {
        match UdpSocket::bind(format!("0.0.0.0:{}", cfg.port)) {
            Ok(sock) => {
                sock.set_read_timeout(Some(std::time::Duration::from_secs(1)))
                    .ok();

                let mode = if cfg.sender_ip.is_empty() {
                    "Auto (broadcast)"
                } else {
                    cfg.sender_ip.as_str()
                };
                info!("Monitor escutando em 0.0.0.0:{} – Modo: {mode}", cfg.port);

                let mut buf = [0u8; 65536];
                loop {
                    match sock.recv_from(&mut buf) {
                        Ok((size, addr)) => {
                            let source = addr.ip().to_string();

                            // Filtro de IP se configurado
                            if !cfg.sender_ip.is_empty() && source != cfg.sender_ip {
                                debug!("Ignorando pacote de {source} (esperado: {})", cfg.sender_ip);
                                continue;
                            }

                            match decode_reading(&buf[..size]) {
                                Ok(reading) => match reading.class() {
                                    RangeClass::Finite => info!(
                                        "{} | {:.3} m",
                                        reading.frame_id, reading.range
                                    ),
                                    class => info!("{} | {class}", reading.frame_id),
                                },
                                Err(e) => {
                                    debug!("Pacote inválido de {source}: {e}");
                                }
                            }
                        }
                        Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut
                            || e.kind() == std::io::ErrorKind::WouldBlock =>
                        {
                            // Timeout normal, continua
                        }
                        Err(e) => {
                            warn!("Erro ao receber UDP: {e}");
                        }
                    }
                }
            }
            Err(e) => {
                error!("Falha ao bind porta {}: {e}. Tentando novamente em 2s...", cfg.port);
                std::thread::sleep(std::time::Duration::from_secs(2));
            }
        }
    }
}
