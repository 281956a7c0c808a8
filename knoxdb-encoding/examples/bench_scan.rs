use clap::Parser;
use knoxdb_encoding::bitset::Bitset;
use knoxdb_encoding::compression::bitpacking::{FilterMode, PackedBlock, PackedData};
use knoxdb_encoding::conf::BitpackConfig;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

fn main() {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => {
            let s = std::fs::read_to_string(path).unwrap();
            BitpackConfig::from_toml(&s).unwrap()
        }
        None => BitpackConfig::default(),
    };
    let mode = match &args.mode[..] {
        "eq" => FilterMode::Equal,
        "ne" => FilterMode::NotEqual,
        "lt" => FilterMode::Less,
        "ge" => FilterMode::GreaterEqual,
        "between" => FilterMode::Range,
        _ => panic!("unknown mode"),
    };

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mask = u64::MAX >> (64 - args.bits as u32);
    let values: Vec<u64> = (0..args.rows).map(|_| rng.random::<u64>() & mask).collect();
    let start = Instant::now();
    let block = PackedBlock::encode(&values);
    println!(
        "encode: rows={}, bits={}, bytes={}, dur={}",
        args.rows,
        block.bits(),
        block.data().len(),
        humantime::format_duration(start.elapsed())
    );
    let lo = mask / 4;
    let hi = mask / 2;

    // long running scans are stopped through the cancel flag
    let stop = AtomicBool::new(false);
    let start = Instant::now();
    let total: usize = std::thread::scope(|s| {
        let handles: Vec<_> = (0..args.threads)
            .map(|_| {
                let (block, config, stop) = (&block, &config, &stop);
                s.spawn(move || {
                    let view = block.view();
                    let mut scans = 0usize;
                    loop {
                        let mut out = Bitset::new(view.len());
                        match view.filter_chunked(mode, lo, hi, &mut out, config.chunk_rows(), stop) {
                            Ok(()) => scans += 1,
                            Err(_) => return scans,
                        }
                    }
                })
            })
            .collect();
        std::thread::sleep(args.duration);
        stop.store(true, Ordering::Relaxed);
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });
    let dur = start.elapsed();
    let rows_per_sec = (total * args.rows) as f64 / dur.as_secs_f64();
    println!(
        "scan {}: threads={}, scans={}, dur={}, rows/s={:.2}M, row={:.3}ns",
        args.mode,
        args.threads,
        total,
        humantime::format_duration(Duration::from_millis(dur.as_millis() as u64)),
        rows_per_sec / 1_000_000f64,
        1_000_000_000f64 * args.threads as f64 / rows_per_sec
    );
}

#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
struct Args {
    /// Rows of the packed block
    #[arg(long, default_value = "1000000")]
    rows: usize,

    /// Bit width of generated values, 1 to 64
    #[arg(long, default_value = "13", value_parser = clap::value_parser!(u8).range(1..=64))]
    bits: u8,

    /// eq, ne, lt, ge or between
    #[arg(long, default_value = "lt")]
    mode: String,

    /// scan thread count
    #[arg(long, default_value = "1")]
    threads: usize,

    #[arg(long, default_value = "5s", value_parser = humantime::parse_duration)]
    duration: Duration,

    #[arg(long, default_value = "42")]
    seed: u64,

    /// Config file in toml format
    #[arg(long)]
    config: Option<String>,
}
