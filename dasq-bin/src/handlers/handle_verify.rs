use crate::{file_store::FileShareStore, utils::read_dah_or_exit};
use dasq_lib::{Axis, DataAvailabilityHeader, ShareKey, ShareStore};
use std::path::Path;

pub async fn handle_verify_command(square_dir_path: &Path) {
    let dah = read_dah_or_exit(square_dir_path);
    let store = FileShareStore::new(square_dir_path, &dah);

    println!("Verifying rows and columns of extended square...\n");
    println!("{}", square_dir_path.display());

    let mut num_valid_lines = 0;
    for axis in [Axis::Row, Axis::Col] {
        for index in 0..dah.square_width() {
            let (line_log, valid) = verify_line(&store, &dah, axis, index).await;
            if valid {
                num_valid_lines += 1;
            }

            println!("\t{}", line_log);
        }
    }

    println!(
        "\nFound {}/{} rows and columns matching their root in {:?}.",
        num_valid_lines,
        2 * dah.square_width(),
        square_dir_path
    );
}

async fn verify_line(store: &FileShareStore, dah: &DataAvailabilityHeader, axis: Axis, index: usize) -> (String, bool) {
    let width = dah.square_width();
    let name = match axis {
        Axis::Row => format!("row {}", index),
        Axis::Col => format!("column {}", index),
    };

    let mut shares = Vec::with_capacity(width);
    for position in 0..width {
        let (row, col) = axis.coordinate(index, position);
        if let Ok(share) = store.get(&ShareKey::new(dah, row, col)).await {
            shares.push(share);
        }
    }

    if shares.len() != width {
        return (format!("- {}\t🚫\tError: only {}/{} shares present", name, shares.len(), width), false);
    }

    match dah.verify_axis(axis, index, &shares) {
        Ok(()) => (format!("- {}\t✅", name), true),
        Err(e) => (format!("- {}\t🚫\tError: {}", name, e), false),
    }
}
