use dasq_lib::{DataAvailabilityHeader, ExtendedDataSquare, NAMESPACE_SIZE, SHARE_SIZE, Share};
use rand::Rng;
use std::{fmt::Debug, time::Duration};

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::Divan::default().bytes_format(divan::counter::BytesFormat::Binary).main();
}

struct SquareConfig {
    original_width: usize,
}

impl Debug for SquareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format!("Extend {0}x{0} square + Compute DAH", self.original_width))
    }
}

const ARGS: &[SquareConfig] = &[
    SquareConfig { original_width: 8 },
    SquareConfig { original_width: 32 },
    SquareConfig { original_width: 64 },
    SquareConfig { original_width: 128 },
];

fn random_sorted_shares(count: usize) -> Vec<Share> {
    let mut rng = rand::rng();

    let mut shares = (0..count)
        .map(|_| {
            let mut bytes = vec![0u8; SHARE_SIZE];
            rng.fill(&mut bytes[..]);
            bytes[0] &= 0x7f;

            unsafe { Share::new(bytes).unwrap_unchecked() }
        })
        .collect::<Vec<Share>>();

    shares.sort_by(|a, b| a.as_bytes()[..NAMESPACE_SIZE].cmp(&b.as_bytes()[..NAMESPACE_SIZE]));
    shares
}

#[divan::bench(args = ARGS, max_time = Duration::from_secs(100), skip_ext_time = true)]
fn build_eds(bencher: divan::Bencher, config: &SquareConfig) {
    bencher
        .with_inputs(|| random_sorted_shares(config.original_width * config.original_width))
        .input_counter(|shares| divan::counter::BytesCount::new(shares.len() * SHARE_SIZE))
        .bench_values(|shares| {
            let eds = unsafe { ExtendedDataSquare::new(divan::black_box(shares)).unwrap_unchecked() };
            divan::black_box(DataAvailabilityHeader::from_eds(&eds))
        });
}
