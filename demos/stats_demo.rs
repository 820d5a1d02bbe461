use clap::Parser;
use prim_hash::DEFAULT_LOAD_FACTOR;
use prim_hash::PrimitiveHashMap;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    #[arg(short = 'f', long = "load_factor", default_value_t = DEFAULT_LOAD_FACTOR)]
    load_factor: f32,

    /// Insert keys spaced by this stride instead of consecutively.
    #[arg(short = 's', long = "stride", default_value_t = 1)]
    stride: u64,
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating PrimitiveHashMap with target capacity {} and load factor {}",
        args.target_capacity, args.load_factor
    );

    let created =
        PrimitiveHashMap::with_capacity_and_load_factor(args.target_capacity, args.load_factor);
    let mut map: PrimitiveHashMap<u64, u64> = match created {
        Ok(map) => map,
        Err(err) => {
            eprintln!("Cannot create map: {err}");
            std::process::exit(1);
        }
    };

    println!("Table size: {}", map.table_size());
    println!("Capacity before growth: {}", map.capacity());
    println!("Filling map with u64 keys...");

    let num_values = map.capacity() as u64;
    for i in 0..num_values {
        let key = i.wrapping_mul(args.stride);
        if map.contains_key(&key) {
            panic!("Key already exists in map: {key}");
        }
        map.insert(key, i);
    }

    println!("Inserted {} keys, table size {}", map.len(), map.table_size());
    println!(
        "Final load factor: {:.2}%",
        (map.len() as f64 / map.table_size() as f64) * 100.0
    );

    map.probe_stats().print();
}
