use rand::Rng;
use rand::seq::SliceRandom;
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const NAMES: [&str; 7] = ["Hồng", "Bình", "Minh", "Thắng", "Tuấn", "Quân", "Hải"];

pub fn generate_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["Amount", "Description", "Paid By", "Participants"])?;

    for i in 1..=rows {
        wtr.write_record([
            "30",
            &format!("Expense {}", i),
            "Hồng",
            "Hồng, Bình, Minh",
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes `rows` random but valid expense rows.
pub fn generate_random_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(["Amount", "Description", "Paid By", "Participants"])?;

    let mut rng = rand::thread_rng();
    for i in 1..=rows {
        let count = rng.gen_range(1..=NAMES.len());
        let participants: Vec<&str> = NAMES.choose_multiple(&mut rng, count).copied().collect();
        let payer = participants[rng.gen_range(0..participants.len())];
        let amount = rng.gen_range(1..=5_000_000u64);

        wtr.write_record([
            amount.to_string(),
            format!("Random expense {}", i),
            payer.to_string(),
            participants.join(", "),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
