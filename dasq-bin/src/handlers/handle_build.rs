use crate::{
    file_store::FileShareStore,
    utils::{DAH_FILE_NAME, format_bytes, get_target_directory_path, parse_namespace},
};
use dasq_lib::{DataAvailabilityHeader, ExtendedDataSquare, NAMESPACE_SIZE, Namespace, SHARE_SIZE, Share, put_eds};
use std::{
    path::{Path, PathBuf},
    process::exit,
};

pub async fn handle_build_command(blob_path: &Path, namespace: &str, opt_target_dir: &Option<PathBuf>) {
    let namespace = match parse_namespace(namespace) {
        Ok(namespace) => namespace,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    };

    match std::fs::read(blob_path) {
        Ok(blob_bytes) => {
            println!("Read {:?}", blob_path);
            println!("Size {}", format_bytes(blob_bytes.len()));

            let original = match split_into_square(namespace, &blob_bytes) {
                Ok(shares) => shares,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    exit(1);
                }
            };
            let original_width = original.len().isqrt();

            let (eds, dah) = match ExtendedDataSquare::new(original).and_then(|eds| DataAvailabilityHeader::from_eds(&eds).map(|dah| (eds, dah))) {
                Ok(res) => res,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    exit(1);
                }
            };

            println!("BLAKE3 Digest: {}", blake3::hash(&blob_bytes));
            println!("Namespace: {:?}", namespace);
            println!("Original square width: {}", original_width);
            println!("Extended square width: {}", eds.width());
            println!("Data availability header: {}", dah.hash());

            let mut rng = rand::rng();
            let target_dir_path = get_target_directory_path(blob_path, opt_target_dir, &mut rng);

            if let Err(e) = std::fs::DirBuilder::new().recursive(true).create(&target_dir_path) {
                eprintln!("Error: {}", e);
                exit(1);
            }

            println!("Writing data availability header and extended square...");

            match dah.to_bytes() {
                Ok(bytes) => {
                    if let Err(e) = std::fs::write(target_dir_path.join(DAH_FILE_NAME), bytes) {
                        eprintln!("Error: {}", e);
                        exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    exit(1);
                }
            }

            let store = FileShareStore::new(&target_dir_path, &dah);
            if let Err(e) = put_eds(&store, &dah, &eds).await {
                eprintln!("Error: {}", e);
                exit(1);
            }

            println!("Extended square placed in {:?}", &target_dir_path);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    }
}

/// Chops `blob` into shares of `namespace`, then pads with tail padding shares up to the smallest power of two square.
fn split_into_square(namespace: Namespace, blob: &[u8]) -> Result<Vec<Share>, dasq_lib::DasqError> {
    let mut shares = blob
        .chunks(SHARE_SIZE - NAMESPACE_SIZE)
        .map(|payload| Share::from_payload(namespace, payload, SHARE_SIZE))
        .collect::<Result<Vec<Share>, _>>()?;

    if shares.is_empty() {
        shares.push(Share::from_payload(namespace, &[], SHARE_SIZE)?);
    }

    let original_width = shares.len().isqrt();
    let original_width = if original_width * original_width == shares.len() { original_width } else { original_width + 1 }.next_power_of_two();

    let padding = Share::tail_padding(SHARE_SIZE)?;
    shares.resize(original_width * original_width, padding);

    Ok(shares)
}
