//! A sensor thread feeding a fixed-rate control loop
//!
//! The sensor publishes faster than the controller runs; the controller only
//! cares about the freshest reading and reports how many it skipped.

use epochbus::{FixedMessage, Registry, Result};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

#[derive(Debug, Clone, Copy)]
struct Attitude {
    roll: f32,
    pitch: f32,
    yaw: f32,
}

impl FixedMessage for Attitude {
    const SIZE: usize = 12;

    fn encode(&self, out: &mut [u8]) {
        [self.roll, self.pitch, self.yaw].encode(out);
    }

    fn decode(bytes: &[u8]) -> Self {
        let [roll, pitch, yaw] = <[f32; 3]>::decode(bytes);
        Self { roll, pitch, yaw }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let registry = Registry::new();
    let topic = registry.get_or_create_typed_topic("/attitude", 16, Attitude::SIZE)?;
    let running = Arc::new(AtomicBool::new(true));

    let sensor = {
        let publisher = topic.publisher();
        let running = running.clone();
        thread::spawn(move || -> Result<()> {
            let mut t = 0.0f32;
            while running.load(Ordering::Relaxed) {
                publisher.publish_message(&Attitude {
                    roll: t.sin() * 0.1,
                    pitch: t.cos() * 0.05,
                    yaw: t,
                })?;
                t += 0.01;
                thread::sleep(Duration::from_millis(1));
            }
            Ok(())
        })
    };

    let subscriber = topic.subscriber();
    for tick in 0..20 {
        thread::sleep(Duration::from_millis(10));

        let skipped = subscriber.missed_since_last_seen();
        match subscriber.poll_latest_message::<Attitude>()? {
            Some((attitude, epoch)) => println!(
                "tick {:2}: epoch {:4} skipped {:2} roll {:+.3} pitch {:+.3} yaw {:.2}",
                tick, epoch, skipped, attitude.roll, attitude.pitch, attitude.yaw
            ),
            None => println!("tick {:2}: no new attitude", tick),
        }
    }

    running.store(false, Ordering::Relaxed);
    if let Ok(result) = sensor.join() {
        result?;
    }

    let stats = topic.stats().snapshot();
    println!(
        "\nPublished {}, overwritten {}, peeked {}",
        stats.messages_published, stats.messages_overwritten, stats.messages_peeked
    );
    Ok(())
}
