//! The `bandscore average` command.

use anyhow::Result;

use bandscore_core::band::average_band;

pub fn execute(scores: Vec<f64>) -> Result<()> {
    if let Some(bad) = scores.iter().find(|s| !(0.0..=9.0).contains(*s)) {
        anyhow::bail!("score {bad} is outside 0.0-9.0");
    }

    println!("{}", average_band(&scores));
    Ok(())
}
