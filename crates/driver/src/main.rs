//! # Telemetro Driver
//!
//! Lê frames do telêmetro infravermelho TeraRanger Evo 40m pela porta
//! serial e publica a última distância válida via UDP broadcast, em
//! cadência fixa desacoplada do ritmo do sensor.
//!
//! ## Uso
//! ```bash
//! telemetro_driver                  # Porta e destino do config.toml
//! RUST_LOG=debug telemetro_driver   # Mostra frames descartados
//! ```

mod serial_thread;

use serial_thread::spawn_serial_thread;
use std::io::Write;
use std::net::UdpSocket;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use telemetro_core::config::AppConfig;
use telemetro_core::frame::{BINARY_MODE_CMD, ENABLE_CMD};
use telemetro_core::protocol::encode_reading;
use telemetro_core::state::{FrameSink, SharedRange};
use telemetro_core::types::RangeReading;
use tracing::{debug, error, info, warn};

fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Carregar config ──
    let config_path = AppConfig::default_path();
    let config = AppConfig::load(&config_path);

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    for e in config.validate() {
        warn!("Config: {e}");
    }

    let cfg = &config.driver;
    let period = Duration::from_millis(cfg.publish_period_ms);

    // ── Porta serial ──
    // Falha na abertura é fatal: sem sensor não há o que publicar
    let mut port = match serialport::new(&cfg.device, cfg.baud_rate)
        .timeout(Duration::from_millis(cfg.serial_timeout_ms))
        .open()
    {
        Ok(port) => port,
        Err(e) => {
            error!("Erro ao abrir porta serial {}: {e}", cfg.device);
            std::process::exit(1);
        }
    };

    // Liga o emissor e seleciona streaming binário
    if let Err(e) = sensor_bringup(&mut port) {
        error!("Erro ao enviar comandos de inicialização do sensor: {e}");
        std::process::exit(1);
    }
    info!("Sensor habilitado em modo binário ({} @ {} baud)", cfg.device, cfg.baud_rate);

    // ── Estado compartilhado + thread serial ──
    let state = Arc::new(SharedRange::new());
    let _serial = spawn_serial_thread(port, FrameSink::new(Arc::clone(&state)));

    // ── Socket UDP ──
    let sock = UdpSocket::bind(if cfg.bind_ip.is_empty() {
        "0.0.0.0:0".to_string()
    } else {
        format!("{}:0", cfg.bind_ip)
    })
    .expect("Falha ao criar socket UDP");

    if cfg.mode == "broadcast" || cfg.dest_ip == "255.255.255.255" {
        sock.set_broadcast(true).expect("Falha ao habilitar broadcast");
        info!("Modo BROADCAST ativado");
    } else {
        info!("Modo UNICAST → {}", cfg.dest_ip);
    }

    let dest_addr = format!("{}:{}", cfg.dest_ip, cfg.port);

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   📡 TELEMETRO DRIVER – ATIVO (Evo 40m)");
    println!("══════════════════════════════════════════════");
    println!("  Sensor:    {} @ {} baud", cfg.device, cfg.baud_rate);
    println!("  Destino:   {dest_addr}");
    println!("  Período:   {} ms", cfg.publish_period_ms);
    println!("  Protocolo: bincode v{}", telemetro_core::PROTOCOL_VERSION);
    println!("══════════════════════════════════════════════");
    println!();

    // ── Loop de publicação ──
    // Amostra o slot compartilhado no período configurado, repetindo a
    // última distância se o sensor estiver mais lento que o publicador.
    loop {
        let cycle_start = Instant::now();

        let reading = RangeReading::sample(&cfg.frame_id, state.get(), now_ms());
        match encode_reading(&reading) {
            Ok(packet) => match sock.send_to(&packet, &dest_addr) {
                Ok(sent) => debug!("→ {sent} bytes | {:.3} m", reading.range),
                Err(e) => error!("Erro ao enviar UDP: {e}"),
            },
            Err(e) => error!("Erro ao serializar leitura: {e}"),
        }

        // Dormir pelo tempo restante do período
        let elapsed = cycle_start.elapsed();
        if elapsed < period {
            std::thread::sleep(period - elapsed);
        }
    }
}

/// Envia os comandos de bring-up do sensor (habilitar + modo binário).
fn sensor_bringup(port: &mut Box<dyn serialport::SerialPort>) -> std::io::Result<()> {
    port.write_all(&ENABLE_CMD)?;
    port.write_all(&BINARY_MODE_CMD)?;
    port.flush()
}

/// Relógio de parede em ms desde a época Unix.
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
