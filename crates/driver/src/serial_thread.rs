//! Thread serial que lê frames do sensor e os entrega ao estado
//! compartilhado.
//!
//! O sensor emite um frame completo de 4 bytes por medição; a thread lê
//! exatamente um frame por vez e o repassa ao [`FrameSink`]. Não há
//! ressincronização de stream nem reconexão: se o link cair, o slot
//! compartilhado simplesmente deixa de ser atualizado.

use serialport::SerialPort;
use std::io::Read;
use telemetro_core::frame::FRAME_LEN;
use telemetro_core::state::FrameSink;
use tracing::{info, warn};

/// Inicia a thread de leitura serial. Retorna o handle da thread.
pub fn spawn_serial_thread(
    port: Box<dyn SerialPort>,
    sink: FrameSink,
) -> std::thread::JoinHandle<()> {
    std::thread::Builder::new()
        .name("serial-reader".into())
        .spawn(move || read_loop(port, &sink))
        .expect("Falha ao criar thread serial")
}

fn read_loop(mut port: Box<dyn SerialPort>, sink: &FrameSink) {
    info!("Lendo frames de {}", port.name().unwrap_or_default());

    let mut buf = [0u8; FRAME_LEN];
    loop {
        match port.read_exact(&mut buf) {
            // Rejeições são registradas pelo sink; nada a fazer aqui
            Ok(()) => {
                let _ = sink.frame_received(&buf);
            }
            Err(ref e)
                if e.kind() == std::io::ErrorKind::TimedOut
                    || e.kind() == std::io::ErrorKind::WouldBlock =>
            {
                // Timeout normal, continua
            }
            Err(e) => {
                warn!("Erro ao ler da porta serial: {e}");
            }
        }
    }
}
