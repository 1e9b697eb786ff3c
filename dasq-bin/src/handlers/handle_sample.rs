use crate::{file_store::FileShareStore, utils::read_dah_or_exit};
use dasq_lib::{Availability, Context, DasqError, LightAvailability, SamplerConfig, StoreGetter};
use std::{path::Path, process::exit, sync::Arc, time::Duration};

pub async fn handle_sample_command(square_dir_path: &Path, sample_count: usize, max_concurrency: usize, timeout_ms: u64) {
    let dah = read_dah_or_exit(square_dir_path);
    let getter = Arc::new(StoreGetter::new(Arc::new(FileShareStore::new(square_dir_path, &dah))));

    let config = SamplerConfig {
        sample_count,
        max_concurrency,
        sample_timeout: Duration::from_millis(timeout_ms),
    };
    let sampler = match LightAvailability::with_config(getter, config) {
        Ok(sampler) => sampler,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    };

    println!("Sampling {} random coordinates...", sample_count.min(dah.square_width() * dah.square_width()));

    match sampler.shares_available(&Context::background(), &dah).await {
        Ok(()) => println!("Square is available ✅"),
        Err(DasqError::Unavailable { sampled, failed }) => {
            println!("Square is unavailable 🚫\t{}/{} samples failed", failed.len(), sampled);
            failed.iter().for_each(|(row, col)| println!("\t- ({}, {})", row, col));
            exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    }
}
