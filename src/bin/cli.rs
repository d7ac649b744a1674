use clap::{App, Arg, ArgMatches, SubCommand};
use epochbus::{BusError, ByteTopic, Registry, Result};
use log::info;
use std::{
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Barrier,
    },
    thread,
    time::{Duration, Instant},
};

fn main() -> Result<()> {
    env_logger::init();

    let matches = App::new("epochbus-cli")
        .version(env!("CARGO_PKG_VERSION"))
        .about("epochbus topic latency and stress driver")
        .subcommand(
            SubCommand::with_name("latency")
                .about("Measure publish-to-observe latency through peek_latest")
                .arg(
                    Arg::with_name("count")
                        .short("n")
                        .long("count")
                        .value_name("COUNT")
                        .help("Number of messages to publish")
                        .default_value("1000")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("interval")
                        .short("i")
                        .long("interval-us")
                        .value_name("MICROS")
                        .help("Delay between publishes in microseconds")
                        .default_value("100")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("capacity")
                        .short("c")
                        .long("capacity")
                        .value_name("CAPACITY")
                        .help("Topic capacity in slots")
                        .default_value("8")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("stress")
                .about("Hammer one topic with concurrent publishers and consumers")
                .arg(
                    Arg::with_name("publishers")
                        .short("p")
                        .long("publishers")
                        .value_name("N")
                        .help("Publisher threads")
                        .default_value("4")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("consumers")
                        .short("c")
                        .long("consumers")
                        .value_name("N")
                        .help("Consumer threads")
                        .default_value("2")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("messages")
                        .short("m")
                        .long("messages")
                        .value_name("COUNT")
                        .help("Messages per publisher")
                        .default_value("100000")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("capacity")
                        .long("capacity")
                        .value_name("CAPACITY")
                        .help("Topic capacity in slots")
                        .default_value("64")
                        .takes_value(true),
                ),
        )
        .subcommand(SubCommand::with_name("info").about("Show version and layout constants"))
        .get_matches();

    match matches.subcommand() {
        ("latency", Some(latency_matches)) => handle_latency(latency_matches),
        ("stress", Some(stress_matches)) => handle_stress(stress_matches),
        ("info", Some(_)) => show_info(),
        _ => {
            println!("Use --help for usage information");
            Ok(())
        }
    }
}

fn parse_arg<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T> {
    matches
        .value_of(name)
        .ok_or_else(|| BusError::invalid_parameter(name, "missing value"))?
        .parse()
        .map_err(|_| BusError::invalid_parameter(name, "invalid number"))
}

fn handle_latency(matches: &ArgMatches) -> Result<()> {
    let count: u64 = parse_arg(matches, "count")?;
    let interval = Duration::from_micros(parse_arg(matches, "interval")?);
    let capacity: usize = parse_arg(matches, "capacity")?;

    println!("Measuring latency over {} messages ({:?} apart)", count, interval);

    let topic = ByteTopic::new("/latency", capacity)?;
    let subscriber = topic.subscriber();
    let start = Instant::now();
    let done = Arc::new(AtomicBool::new(false));

    let publisher = {
        let publisher = topic.publisher();
        let done = Arc::clone(&done);
        thread::spawn(move || -> Result<()> {
            for _ in 0..count {
                let sent = start.elapsed().as_nanos() as u64;
                publisher.publish(&sent.to_le_bytes())?;
                thread::sleep(interval);
            }
            done.store(true, Ordering::Release);
            Ok(())
        })
    };

    let mut out = [0u8; 8];
    let mut latencies = Vec::with_capacity(count as usize);
    let mut skipped = 0u64;

    loop {
        let previous = subscriber.last_seen_epoch();
        match subscriber.poll_latest(&mut out)? {
            Some(received) => {
                let now = start.elapsed().as_nanos() as u64;
                latencies.push(now.saturating_sub(u64::from_le_bytes(out)));
                skipped += received.epoch - previous - 1;
            }
            None if done.load(Ordering::Acquire) && !subscriber.has_new() => break,
            None => std::hint::spin_loop(),
        }
    }

    publisher
        .join()
        .map_err(|_| BusError::invalid_parameter("publisher", "thread panicked"))??;

    if latencies.is_empty() {
        println!("No messages observed");
        return Ok(());
    }

    latencies.sort_unstable();
    let percentile = |p: f64| latencies[((latencies.len() - 1) as f64 * p) as usize] as f64 / 1000.0;
    let avg = latencies.iter().sum::<u64>() as f64 / latencies.len() as f64 / 1000.0;

    println!("\nResults:");
    println!("  Observed: {} (skipped {})", latencies.len(), skipped);
    println!("  Min: {:.2}μs", percentile(0.0));
    println!("  Avg: {:.2}μs", avg);
    println!("  P50: {:.2}μs", percentile(0.50));
    println!("  P99: {:.2}μs", percentile(0.99));
    println!("  Max: {:.2}μs", percentile(1.0));

    Ok(())
}

fn handle_stress(matches: &ArgMatches) -> Result<()> {
    let publishers: usize = parse_arg(matches, "publishers")?;
    let consumers: usize = parse_arg(matches, "consumers")?;
    let messages: u32 = parse_arg(matches, "messages")?;
    let capacity: usize = parse_arg(matches, "capacity")?;

    println!(
        "Stress: {} publishers x {} messages, {} consumers, capacity {}",
        publishers, messages, consumers, capacity
    );

    let registry = Registry::new();
    let topic = registry.get_or_create_byte_topic("/stress", capacity)?;
    let barrier = Arc::new(Barrier::new(publishers + consumers));
    let done = Arc::new(AtomicBool::new(false));
    let start = Instant::now();

    let publisher_threads: Vec<_> = (0..publishers as u32)
        .map(|publisher_id| {
            let publisher = topic.publisher();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || -> Result<Vec<u64>> {
                barrier.wait();
                let mut payload = [0u8; 16];
                let mut epochs = Vec::with_capacity(messages as usize);
                for seq in 0..messages {
                    payload[..4].copy_from_slice(&publisher_id.to_le_bytes());
                    payload[4..8].copy_from_slice(&seq.to_le_bytes());
                    payload[8..].copy_from_slice(&(u64::from(publisher_id) ^ u64::from(seq)).to_le_bytes());
                    epochs.push(publisher.publish(&payload)?);
                }
                Ok(epochs)
            })
        })
        .collect();

    let consumer_threads: Vec<_> = (0..consumers)
        .map(|_| {
            let subscriber = topic.subscriber();
            let barrier = Arc::clone(&barrier);
            let done = Arc::clone(&done);
            thread::spawn(move || -> Result<(u64, u64)> {
                barrier.wait();
                let mut out = [0u8; 16];
                let (mut received, mut corrupt) = (0u64, 0u64);
                loop {
                    match subscriber.try_receive(&mut out)? {
                        Some(_) => {
                            received += 1;
                            let id = u32::from_le_bytes([out[0], out[1], out[2], out[3]]);
                            let seq = u32::from_le_bytes([out[4], out[5], out[6], out[7]]);
                            let mut check = [0u8; 8];
                            check.copy_from_slice(&out[8..]);
                            if u64::from_le_bytes(check) != u64::from(id) ^ u64::from(seq) {
                                corrupt += 1;
                            }
                        }
                        None if done.load(Ordering::Acquire) => break,
                        None => std::hint::spin_loop(),
                    }
                }
                Ok((received, corrupt))
            })
        })
        .collect();

    let mut epochs = Vec::new();
    for handle in publisher_threads {
        let published = handle
            .join()
            .map_err(|_| BusError::invalid_parameter("publisher", "thread panicked"))??;
        epochs.extend(published);
    }
    done.store(true, Ordering::Release);

    let (mut consumed, mut corrupt) = (0u64, 0u64);
    for handle in consumer_threads {
        let (received, bad) = handle
            .join()
            .map_err(|_| BusError::invalid_parameter("consumer", "thread panicked"))??;
        consumed += received;
        corrupt += bad;
    }
    let elapsed = start.elapsed();

    epochs.sort_unstable();
    let gap_free = epochs.iter().enumerate().all(|(i, epoch)| *epoch == i as u64 + 1);
    let stats = topic.stats().snapshot();
    info!("Final topic stats: {:?}", stats);

    println!("\nResults:");
    println!("  Published: {}", stats.messages_published);
    println!("  Consumed: {}", consumed);
    println!("  Overwritten: {}", stats.messages_overwritten);
    println!("  Corrupt payloads: {}", corrupt);
    println!("  Epochs gap-free: {}", gap_free);
    println!("  Total time: {:.2}ms", elapsed.as_secs_f64() * 1000.0);
    println!(
        "  Publish rate: {:.0} msgs/sec",
        stats.messages_published as f64 / elapsed.as_secs_f64()
    );

    Ok(())
}

fn show_info() -> Result<()> {
    use epochbus::config;

    println!("epochbus");
    println!("Version: {}", epochbus::VERSION);

    println!("\nLayout:");
    println!("  Byte slot: {} bytes ({}-byte header)", config::DEFAULT_SLOT_SIZE, config::BYTE_HEADER_SIZE);
    println!("  Default max payload: {} bytes", config::DEFAULT_MAX_PAYLOAD);
    println!("  Typed header: {} bytes", config::TYPED_HEADER_SIZE);

    println!("\nFeatures:");
    #[cfg(feature = "c-api")]
    println!("  ✓ C API for foreign function interface");
    #[cfg(not(feature = "c-api"))]
    println!("  - C API disabled (enable the `c-api` feature)");

    Ok(())
}
