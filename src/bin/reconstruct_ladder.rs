//! Batch ladder-network reconstruction driver.
//!
//! Scans a directory of binarized network masks, pairs each with its
//! recognized-tag JSON, runs the full pipeline, and writes all stage
//! artifacts into the output directory. A unit that fails (missing tags
//! file, unreadable mask, malformed JSON) is logged and skipped; the
//! batch always runs to completion.
//!
//! Usage: `reconstruct_ladder <masks_dir> <tags_dir> <out_dir>`

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use log::warn;

use ladder_oxide::pipeline::LadderPipeline;
use ladder_oxide::raster::BinaryMask;
use ladder_oxide::tags::load_tags;
use ladder_oxide::ArtifactStore;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        eprintln!("usage: {} <masks_dir> <tags_dir> <out_dir>", args[0]);
        process::exit(1);
    }
    let masks_dir = Path::new(&args[1]);
    let tags_dir = Path::new(&args[2]);

    let store = match ArtifactStore::new(&args[3]) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("cannot open output directory {}: {}", args[3], e);
            process::exit(1);
        },
    };

    let mut mask_paths = match collect_masks(masks_dir) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("cannot read masks directory {}: {}", masks_dir.display(), e);
            process::exit(1);
        },
    };
    mask_paths.sort();
    println!("Found {} mask(s) in {}", mask_paths.len(), masks_dir.display());

    let pipeline = LadderPipeline::new();
    let mut processed = 0usize;
    let mut skipped = 0usize;

    for (idx, mask_path) in mask_paths.iter().enumerate() {
        let base = match mask_path.file_stem().and_then(|s| s.to_str()) {
            Some(b) => b.to_string(),
            None => {
                warn!("skipping mask with non-UTF-8 name: {}", mask_path.display());
                skipped += 1;
                continue;
            },
        };
        print!("[{:3}/{:3}] {} ... ", idx + 1, mask_paths.len(), base);

        match process_unit(&pipeline, mask_path, &base, tags_dir, &store) {
            Ok((blocks, converted)) => {
                processed += 1;
                println!("{} block(s), {} expression(s)", blocks, converted);
            },
            Err(e) => {
                skipped += 1;
                println!("skipped");
                warn!("'{}' failed: {}", base, e);
            },
        }
    }

    println!("Done: {} processed, {} skipped", processed, skipped);
}

fn collect_masks(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("png") {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// Locate `<base>_tags_with_nf.json`, falling back to the first file
/// whose name starts with `base` and carries the tags suffix.
fn find_tags_file(tags_dir: &Path, base: &str) -> Option<PathBuf> {
    let exact = tags_dir.join(format!("{}_tags_with_nf.json", base));
    if exact.is_file() {
        return Some(exact);
    }
    let entries = fs::read_dir(tags_dir).ok()?;
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(base) && n.ends_with("_tags_with_nf.json"))
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

fn process_unit(
    pipeline: &LadderPipeline,
    mask_path: &Path,
    base: &str,
    tags_dir: &Path,
    store: &ArtifactStore,
) -> ladder_oxide::Result<(usize, usize)> {
    let tags_path = find_tags_file(tags_dir, base).ok_or_else(|| {
        ladder_oxide::Error::MissingArtifact {
            base: base.to_string(),
            kind: "tags".to_string(),
        }
    })?;
    let mask = BinaryMask::load(mask_path)?;
    let tags = load_tags(tags_path)?;
    let result = pipeline.process(base, &mask, &tags, Some(store))?;
    Ok((result.final_blocks.len(), result.expressions.len()))
}
