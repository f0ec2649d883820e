//! Replay a synthetic swipe through the full protocol
//!
//! Scripts the bring-up acknowledgements, two idle polls and one finger
//! swipe, then writes the reconstructed image as a PGM file.
//!
//! ```text
//! RUST_LOG=vfs301=debug OUTPUT_DIR=/tmp cargo run --example replay_capture
//! ```

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use vfs301::{Device, DeviceConfig, ImageSink, PgmWriter, ScriptedTransport};
use vfs301_core::constants::{line, CAPTURE_PREAMBLE_SIZE, FIRST_BLOCK_SIZE, NEXT_BLOCK_SIZE};
use vfs301_core::sequence::{Step, ARM};
use vfs301_core::{Endpoint, ScanLine};

/// Ridges drifting across the sensor, one record per line
fn swipe_block(start: u16, len: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(len);
    let mut counter = start;
    while buf.len() + line::RECORD_SIZE <= len {
        let mut scan = [0u8; line::SAMPLES];
        for (x, sample) in scan.iter_mut().enumerate() {
            let phase = (x + counter as usize / 3) % 12;
            *sample = if phase < 6 { 40 } else { 200 };
        }
        buf.extend_from_slice(&ScanLine::new(counter, scan).encode());
        counter = counter.wrapping_add(1);
    }
    buf.resize(len, 0);
    buf
}

fn acknowledge(script: &ScriptedTransport, steps: &[Step]) {
    for step in steps {
        if let Step::Receive(reply) = step {
            script.reply(reply.endpoint, vec![0u8; reply.len]);
        }
    }
}

fn build_script(config: &DeviceConfig) -> ScriptedTransport {
    let script = ScriptedTransport::new();
    acknowledge(&script, &config.generation.bring_up());

    // wait for finger
    acknowledge(&script, ARM);
    script
        .reply(Endpoint::RecvCtrl, vec![0u8; 7])
        .reply(Endpoint::RecvCtrl, vec![0u8; 7])
        .reply(Endpoint::RecvCtrl, vec![0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00]);

    // swipe
    let first = swipe_block(0, FIRST_BLOCK_SIZE);
    let next_start = (FIRST_BLOCK_SIZE / line::RECORD_SIZE) as u16;
    script
        .reply(Endpoint::RecvData, vec![0u8; CAPTURE_PREAMBLE_SIZE])
        .reply(Endpoint::RecvData, first)
        .reply(Endpoint::RecvData, swipe_block(next_start, NEXT_BLOCK_SIZE / 2));

    // end of capture
    script
        .reply(Endpoint::RecvCtrl, vec![0u8; 2])
        .reply(Endpoint::RecvData, vec![0u8; 16384])
        .reply(Endpoint::RecvData, vec![0u8; 5760])
        .reply(Endpoint::RecvCtrl, vec![0u8; 2]);

    script
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let output_dir = std::env::var("OUTPUT_DIR").unwrap_or_else(|_| ".".to_string());

    let config = DeviceConfig::default();
    let script = build_script(&config);
    let mut device = Device::with_config(script.clone(), config);

    device.initialize().await.context("bring-up failed")?;

    let idle = device.wait_for_finger().await?;
    println!("Finger detected after {} idle polls", idle);

    match device.capture().await? {
        Some(image) => {
            println!("{}", image);
            let mut writer = PgmWriter::new(&output_dir);
            let path = writer.next_path();
            writer
                .accept(&image)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => println!("Swipe too short, no image"),
    }

    device.shutdown();
    println!(
        "{} messages sent, {} scripted replies left",
        script.sent().len(),
        script.remaining()
    );

    Ok(())
}
