use anyhow::Result;

use fagsvar_rag::SegmentStore;

pub fn run(store_path: String) -> Result<()> {
    let store = SegmentStore::load(&store_path);
    println!("store: {store_path}");
    println!("segments: {}", store.len());
    println!("sources: {}", store.source_count());
    match store.dimension() {
        Some(dims) => println!("dimensions: {dims}"),
        None => println!("dimensions: -"),
    }
    Ok(())
}
