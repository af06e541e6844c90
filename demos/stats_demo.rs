use clap::Parser;
use dense_hash::DenseTable;
use dense_hash::MixHash;
use dense_hash::dense_table::Entry;
use dense_hash::hash::WyHashState;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 100_000)]
    target_capacity: usize,
}

fn main() {
    let args = Args::parse();
    let hasher = WyHashState;

    println!(
        "Creating DenseTable with target capacity: {}",
        args.target_capacity
    );
    let mut table: DenseTable<u64> = DenseTable::with_capacity(args.target_capacity);
    println!(
        "Bucket count: {}, capacity: {}",
        table.bucket_count(),
        table.capacity()
    );

    println!("Filling table to capacity with u64 values...");
    let num_values = table.capacity() as u64;
    for value in 0..num_values {
        let hash = hasher.mixed_hash(&value);
        match table.entry(hash, |&v| v == value, |v| hasher.mixed_hash(v)) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(_) => {
                panic!("value already exists in table: {}", value);
            }
        }
    }

    println!(
        "Inserted {} values (load factor {:.2}%)",
        table.len(),
        f64::from(table.load_factor()) * 100.0
    );
    println!();

    table.print_displacement_histogram();
    println!();
    table.debug_stats().print();
}
