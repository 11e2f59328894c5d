use std::path::Path;

use anyhow::{ensure, Context, Result};
use oddex_core::Triplet;
use rand::Rng;

/// Read the condition table (`Stim1,Stim2,Stim3` headers) from a CSV file.
pub fn load_conditions(path: &Path) -> Result<Vec<Triplet>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening condition file {}", path.display()))?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: Triplet = record.context("malformed condition row")?;
        rows.push(row);
    }
    log::info!("loaded {} condition rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Draw `n` distinct rows in random order, as the original script samples
/// its practice + main trials once before the session starts.
pub fn sample_conditions<R: Rng>(rows: &[Triplet], n: usize, rng: &mut R) -> Result<Vec<Triplet>> {
    ensure!(
        n <= rows.len(),
        "requested {} trials but the condition table has only {} rows",
        n,
        rows.len()
    );
    let picked = rand::seq::index::sample(rng, rows.len(), n);
    Ok(picked.into_iter().map(|i| rows[i].clone()).collect())
}

/// Write a sampled trial list back out (practice_triplets.csv /
/// main_triplets.csv next to the data file).
pub fn write_conditions(path: &Path, rows: &[Triplet]) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating condition file {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table(n: usize) -> Vec<Triplet> {
        (0..n)
            .map(|i| Triplet {
                stim1: format!("a{i}.png"),
                stim2: format!("b{i}.png"),
                stim3: format!("c{i}.png"),
            })
            .collect()
    }

    #[test]
    fn sampling_is_without_replacement() {
        let rows = table(20);
        let mut rng = StdRng::seed_from_u64(7);
        let picked = sample_conditions(&rows, 10, &mut rng).unwrap();
        assert_eq!(picked.len(), 10);
        let mut names: Vec<&str> = picked.iter().map(|t| t.stim1.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn oversampling_is_rejected() {
        let rows = table(3);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(sample_conditions(&rows, 4, &mut rng).is_err());
    }

    #[test]
    fn conditions_round_trip_through_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("practice_triplets.csv");
        let rows = table(4);
        write_conditions(&path, &rows).unwrap();
        let back = load_conditions(&path).unwrap();
        assert_eq!(back, rows);
    }
}
