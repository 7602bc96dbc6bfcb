//! Fit a tree on the `separable` resource file, evaluate it, and reload it from disk.
use entropy_tree::{Datum, DecisionTree, TreeConfig, TreeIO};
use std::env;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    let min_split_size = match args.get(1) {
        Some(m) => m.parse::<usize>()?,
        None => 1,
    };

    let file = File::open("resources/separable.csv")?;
    let reader = BufReader::new(file);
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let target_name = "label";
    let headers = csv_reader.headers()?.clone();
    let target_index = headers
        .iter()
        .position(|h| h == target_name)
        .ok_or("label column not found")?;

    let mut data = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let mut x = Vec::with_capacity(record.len() - 1);
        for (i, v) in record.iter().enumerate() {
            if i != target_index {
                x.push(v.parse::<f64>()?);
            }
        }
        let y = record[target_index].parse::<usize>()?;
        data.push(Datum::new(x, y));
    }

    let tree = TreeConfig::default().set_min_split_size(min_split_size).fit(&data)?;
    println!("{}", tree);
    println!("Mismatch rate: {:.3}", tree.check_performance(&data)?);

    let path = env::temp_dir().join("separable_tree.json");
    tree.save(&path)?;
    let loaded = DecisionTree::load(&path)?;
    println!("Reloaded tree is identical: {}", loaded == tree);
    Ok(())
}
