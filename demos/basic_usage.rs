//! Basic usage example of the epochbus registry and topics

use epochbus::{FixedMessage, Registry, Result};

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    println!("epochbus Example");
    println!("================");

    let registry = Registry::new();

    // Byte topic: variable-length payloads
    let imu = registry.get_or_create_byte_topic("/imu", 4)?;
    println!("Created topic '{}' ({})", imu.name(), imu.id());
    println!("  Capacity: {} slots", imu.capacity());
    println!("  Max payload: {} bytes", imu.max_payload());

    // A second lookup returns the same storage
    let same = registry.get_or_create_byte_topic("/imu", 4)?;
    assert!(same.same_topic(&imu));

    println!("\nPublishing 6 messages into 4 slots...");
    for i in 0..6u8 {
        let epoch = imu.publish(&[i; 12])?;
        println!("  Published epoch {}", epoch);
    }

    let mut out = [0u8; 256];
    if let Some(latest) = imu.peek_latest(&mut out)? {
        println!("\nLatest value: epoch {} ({} bytes)", latest.epoch, latest.len);
    }

    println!("\nDraining:");
    while let Some(received) = same.try_receive(&mut out)? {
        println!("  epoch {} -> first byte {}", received.epoch, out[0]);
    }

    let stats = imu.stats().snapshot();
    println!("\nStats: published {}, consumed {}, overwritten {}",
             stats.messages_published, stats.messages_consumed, stats.messages_overwritten);

    // Typed topic: fixed-size messages
    let depth = registry.get_or_create_typed_topic("/depth", 8, f32::SIZE)?;
    let publisher = depth.publisher();
    let subscriber = depth.subscriber();

    publisher.publish_message(&1.25f32)?;
    publisher.publish_message(&1.30f32)?;

    if let Some((meters, epoch)) = subscriber.poll_latest_message::<f32>()? {
        println!("\nDepth {:.2}m at epoch {}", meters, epoch);
    }
    println!("New data pending: {}", subscriber.has_new());

    println!("\nRegistered topics:");
    for info in registry.list_topics() {
        println!("  {} [{}] capacity {} latest epoch {}",
                 info.name, info.kind, info.capacity, info.latest_epoch);
    }

    registry.destroy();
    println!("\nExample completed successfully!");
    Ok(())
}
