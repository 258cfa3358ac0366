use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const CHANNELS: [&str; 7] = ["FSC-H", "SSC-H", "FL1-H", "FL2-H", "FL3-H", "FL1-A", "FL1-W"];

/// A cell population: share of events, then per-channel (mean, std-dev) in
/// log10 space.
struct Population {
    weight: f64,
    log_mean: [f64; 7],
    log_sd: [f64; 7],
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Draw `n_events` rows from a mixture of populations, clamped to a
/// 10-bit detector range.
fn generate(populations: &[Population], n_events: usize, rng: &mut SimpleRng) -> Vec<Vec<f64>> {
    let total_weight: f64 = populations.iter().map(|p| p.weight).sum();
    let mut columns = vec![Vec::with_capacity(n_events); CHANNELS.len()];

    for _ in 0..n_events {
        let mut pick = rng.next_f64() * total_weight;
        let pop = populations
            .iter()
            .find(|p| {
                pick -= p.weight;
                pick <= 0.0
            })
            .unwrap_or(&populations[populations.len() - 1]);

        for (ch, column) in columns.iter_mut().enumerate() {
            let v = 10f64.powf(rng.gauss(pop.log_mean[ch], pop.log_sd[ch]));
            column.push(v.clamp(1.0, 1023.0).round());
        }
    }
    columns
}

fn write_parquet(path: &Path, columns: &[Vec<f64>]) {
    let schema = Arc::new(Schema::new(
        CHANNELS
            .iter()
            .map(|name| Field::new(*name, DataType::Float64, false))
            .collect::<Vec<_>>(),
    ));
    let arrays: Vec<ArrayRef> = columns
        .iter()
        .map(|c| Arc::new(Float64Array::from(c.clone())) as ArrayRef)
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), arrays).expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn write_csv(path: &Path, columns: &[Vec<f64>]) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create output file");
    writer.write_record(CHANNELS).expect("Failed to write header");
    let n_events = columns.first().map_or(0, Vec::len);
    for row in 0..n_events {
        writer
            .write_record(columns.iter().map(|c| c[row].to_string()))
            .expect("Failed to write row");
    }
    writer.flush().expect("Failed to flush CSV");
}

fn main() {
    let out_dir = std::env::args().nth(1).unwrap_or_else(|| "import".to_string());
    let out_dir = Path::new(&out_dir);
    std::fs::create_dir_all(out_dir).expect("Failed to create output directory");

    let mut rng = SimpleRng::new(42);

    let lymphocytes = Population {
        weight: 0.6,
        log_mean: [2.3, 1.6, 1.2, 1.0, 0.9, 1.3, 1.8],
        log_sd: [0.06, 0.08, 0.15, 0.12, 0.12, 0.15, 0.05],
    };
    let monocytes = Population {
        weight: 0.25,
        log_mean: [2.6, 2.1, 2.3, 1.4, 1.1, 2.4, 1.9],
        log_sd: [0.05, 0.07, 0.12, 0.14, 0.10, 0.12, 0.05],
    };
    let debris = Population {
        weight: 0.15,
        log_mean: [1.4, 1.2, 0.6, 0.5, 0.5, 0.7, 1.4],
        log_sd: [0.20, 0.20, 0.25, 0.20, 0.20, 0.25, 0.10],
    };
    let stained = Population {
        weight: 0.3,
        log_mean: [2.3, 1.6, 2.8, 1.2, 1.0, 2.9, 1.8],
        log_sd: [0.06, 0.08, 0.10, 0.12, 0.12, 0.10, 0.05],
    };

    let control = generate(&[lymphocytes, monocytes, debris], 5000, &mut rng);
    let parquet_path = out_dir.join("control.parquet");
    write_parquet(&parquet_path, &control);

    let treated = generate(
        &[
            Population {
                weight: 0.45,
                log_mean: [2.3, 1.6, 1.2, 1.0, 0.9, 1.3, 1.8],
                log_sd: [0.06, 0.08, 0.15, 0.12, 0.12, 0.15, 0.05],
            },
            stained,
        ],
        3000,
        &mut rng,
    );
    let csv_path = out_dir.join("treated.csv");
    write_csv(&csv_path, &treated);

    println!(
        "Wrote {} events to {} and {} events to {}",
        control[0].len(),
        parquet_path.display(),
        treated[0].len(),
        csv_path.display()
    );
}
