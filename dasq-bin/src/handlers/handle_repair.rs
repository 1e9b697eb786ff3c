use crate::{file_store::FileShareStore, utils::read_dah_or_exit};
use dasq_lib::{Context, Getter, ShareKey, ShareStore, StoreGetter};
use std::{path::Path, process::exit, sync::Arc};

pub async fn handle_repair_command(square_dir_path: &Path) {
    let dah = read_dah_or_exit(square_dir_path);
    let store = Arc::new(FileShareStore::new(square_dir_path, &dah));
    let getter = StoreGetter::new(store.clone());

    println!("Repairing extended square in {:?}...", square_dir_path);

    let eds = match getter.get_eds(&Context::background(), &dah).await {
        Ok(eds) => eds,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    };

    let mut num_restored_shares = 0;
    for row in 0..eds.width() {
        for col in 0..eds.width() {
            if store.share_path(row, col).is_file() {
                continue;
            }

            let share = match eds.share(row, col) {
                Ok(share) => share.clone(),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    exit(1);
                }
            };

            if let Err(e) = store.put(ShareKey::new(&dah, row, col), share).await {
                eprintln!("Error: {}", e);
                exit(1);
            }
            num_restored_shares += 1;
        }
    }

    println!("Restored {} missing shares of {}x{} extended square ✅", num_restored_shares, eds.width(), eds.width());
}
