//! The `bandscore convert` command.

use anyhow::Result;

use bandscore_core::band::{convert_count_to_band, percentage};

pub fn execute(correct: u32, total: u32) -> Result<()> {
    anyhow::ensure!(
        correct <= total,
        "correct ({correct}) cannot exceed total ({total})"
    );

    let band = convert_count_to_band(correct, total);
    println!(
        "{correct}/{total} correct ({:.1}%) → band {band}",
        percentage(correct, total)
    );

    Ok(())
}
