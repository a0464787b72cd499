use entities::ENTITIES;
use std::io::{BufWriter, Write};
use std::{env, fs, path::PathBuf};

// entity::lookup is handed just the inner entity name, like "amp" for
// "&amp;"; we only match those with a trailing ";". entities::ENTITIES also
// interleaves upper- and lower-case variants unsorted, so sort here for
// binary search at runtime.
fn main() {
    let out_dir: PathBuf = env::var("OUT_DIR").unwrap().parse().unwrap();

    let mut table = ENTITIES
        .iter()
        .filter(|e| e.entity.starts_with('&') && e.entity.ends_with(';'))
        .map(|e| (&e.entity[1..e.entity.len() - 1], e.characters))
        .collect::<Vec<_>>();
    table.sort_by_key(|(name, _characters)| *name);

    let out = fs::File::create(out_dir.join("entitydata.rs")).unwrap();
    let mut bw = BufWriter::new(out);
    writeln!(bw, "mod entitydata {{").unwrap();
    writeln!(
        bw,
        "    pub static NAMED_ENTITIES: &[(&str, &str); {}] = &[",
        table.len()
    )
    .unwrap();
    for (name, characters) in table {
        writeln!(bw, "        ({:?}, {:?}),", name, characters).unwrap();
    }
    writeln!(bw, "    ];").unwrap();
    writeln!(bw, "}}").unwrap();
}
