use dasq_lib::{DataAvailabilityHeader, Namespace};
use rand::Rng;
use std::{
    path::{Path, PathBuf},
    process::exit,
    str::FromStr,
};

use crate::errors::DasqCLIError;

pub const DAH_FILE_NAME: &str = "dah.commit";

pub fn format_bytes(bytes: usize) -> String {
    let suffixes = ["B", "KB", "MB", "GB"];
    let mut index = 0;
    let mut size = bytes as f64;

    while size >= 1024.0 && index < suffixes.len() - 1 {
        size /= 1024.0;
        index += 1;
    }

    format!("{:.1}{}", size, suffixes[index])
}

/// Parses a hex encoded namespace, rejecting the ones reserved for padding and parity shares.
pub fn parse_namespace(hex: &str) -> Result<Namespace, DasqCLIError> {
    let bytes = const_hex::decode(hex).map_err(|e| DasqCLIError::InvalidNamespace(e.to_string()))?;
    let namespace = Namespace::from_slice(&bytes).map_err(|e| DasqCLIError::InvalidNamespace(e.to_string()))?;

    if namespace >= Namespace::TAIL_PADDING {
        return Err(DasqCLIError::InvalidNamespace(format!("{:?} is reserved", namespace)));
    }

    Ok(namespace)
}

pub fn read_dah(square_dir_path: &Path) -> Result<DataAvailabilityHeader, DasqCLIError> {
    let dah_path = square_dir_path.join(DAH_FILE_NAME);

    match std::fs::read(&dah_path) {
        Ok(bytes) => match DataAvailabilityHeader::from_bytes(&bytes) {
            Ok((dah, n)) => {
                if n != bytes.len() {
                    Err(DasqCLIError::FailedToReadDataAvailabilityHeader(format!(
                        "Data availability header file {:?} is {} bytes longer than it should be",
                        dah_path,
                        bytes.len() - n
                    )))
                } else {
                    Ok(dah)
                }
            }
            Err(e) => Err(DasqCLIError::FailedToReadDataAvailabilityHeader(e.to_string())),
        },
        Err(e) => Err(DasqCLIError::FailedToReadDataAvailabilityHeader(e.to_string())),
    }
}

/// Reads the header of the square laid out under `square_dir_path`, or exits.
pub fn read_dah_or_exit(square_dir_path: &Path) -> DataAvailabilityHeader {
    if !square_dir_path.is_dir() {
        eprintln!("{:?} is not a directory", square_dir_path);
        exit(1);
    }

    println!("Looking for data availability header file {:?}...", square_dir_path.join(DAH_FILE_NAME));

    match read_dah(square_dir_path) {
        Ok(dah) => {
            println!("Data availability header: {}", dah.hash());
            println!("Extended square width: {}", dah.square_width());
            dah
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    }
}

pub fn get_target_directory_path<R: Rng + ?Sized>(blob_path: &Path, opt_target_dir: &Option<PathBuf>, rng: &mut R) -> PathBuf {
    match opt_target_dir {
        Some(path) => match path.try_exists() {
            Ok(ok) => {
                if ok {
                    prepare_random_target_directory_name(&path.to_string_lossy(), rng)
                } else {
                    path.clone()
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                exit(1);
            }
        },
        None => match blob_path.file_name() {
            Some(name) => prepare_random_target_directory_name(&name.to_string_lossy(), rng),
            None => {
                eprintln!("{:?} doesn't name a file", blob_path);
                exit(1);
            }
        },
    }
}

fn prepare_random_target_directory_name<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> PathBuf {
    let mut rand_suffix = [0u8; 4];
    rng.fill_bytes(&mut rand_suffix);

    let mut res = String::new();
    res.push_str(prefix);
    res.push('-');
    res.push_str(&const_hex::encode(rand_suffix));

    unsafe { PathBuf::from_str(&res).unwrap_unchecked() }
}
