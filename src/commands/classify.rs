use comfy_table::Table;
use comfy_table::presets::NOTHING;
use std::path::PathBuf;

use crate::services::classifier::classify;

pub fn run(paths: &[PathBuf]) {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec!["Path", "Kind"]);

    for path in paths {
        table.add_row(vec![path.display().to_string(), classify(path).to_string()]);
    }

    println!("{table}");
}
