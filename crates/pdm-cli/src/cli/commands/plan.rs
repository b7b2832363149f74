//! `pdm plan` – resolve and plan every URL without transferring anything.

use anyhow::Result;
use pdm_core::preprocess::preprocess;

use super::{prepare, Prepared};
use crate::cli::Inputs;

pub fn run_plan(inputs: &Inputs) -> Result<()> {
    let Prepared { settings, urls } = prepare(inputs)?;
    let tasks = preprocess(&urls, &settings);

    for task in tasks.values() {
        println!(
            "{:<5} {} -> {}",
            task.protocol(),
            task.url(),
            task.destination().display()
        );
    }
    let skipped: Vec<_> = urls.iter().filter(|u| !tasks.contains_key(*u)).collect();
    for url in &skipped {
        println!("skip  {}", url);
    }
    println!("{} planned, {} skipped", tasks.len(), skipped.len());
    Ok(())
}
