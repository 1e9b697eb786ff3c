use crate::{
    file_store::FileShareStore,
    utils::{format_bytes, parse_namespace, read_dah_or_exit},
};
use dasq_lib::{Context, Getter, StoreGetter};
use std::{path::Path, process::exit, sync::Arc};

pub async fn handle_namespace_command(square_dir_path: &Path, namespace: &str) {
    let namespace = match parse_namespace(namespace) {
        Ok(namespace) => namespace,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    };

    let dah = read_dah_or_exit(square_dir_path);
    let getter = StoreGetter::new(Arc::new(FileShareStore::new(square_dir_path, &dah)));

    println!("Retrieving shares of {:?}...", namespace);

    let namespaced = match getter.get_shares_by_namespace(&Context::background(), &dah, namespace).await {
        Ok(namespaced) => namespaced,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    };

    if let Err(e) = namespaced.verify(&dah, namespace) {
        eprintln!("Error: {}", e);
        exit(1);
    }

    namespaced.rows().iter().for_each(|row| {
        let proof = if row.proof.is_inclusion() { "inclusion" } else { "absence" };
        println!("\t- row {}\t{} shares\t{} proof ✅", row.row_index, row.shares.len(), proof);
    });

    let mut hasher = blake3::Hasher::new();
    let shares = namespaced.flatten();
    shares.iter().for_each(|share| {
        hasher.update(share.payload());
    });

    println!(
        "Found {} shares carrying {} of payload, BLAKE3 Digest: {}",
        shares.len(),
        format_bytes(shares.iter().map(|share| share.payload().len()).sum()),
        hasher.finalize()
    );
}
