//! The offline augmentation program.
//!
//! It loads an annotated image set, runs every record through the configured
//! pipeline `repeat` times and writes the results to a timestamped run
//! directory.

pub mod common;
pub mod config;
pub mod dataset;
pub mod writer;

use crate::{
    common::*,
    config::Config,
    dataset::Dataset,
    writer::{ManifestEntry, Writer, MANIFEST_FILE_NAME},
};
use tracing::Instrument;

pub const FILE_STRFTIME: &str = "%Y-%m-%d-%H-%M-%S.%3f";

/// The entry of augmentation program. Returns the run directory.
pub async fn start(config: Arc<Config>) -> Result<PathBuf> {
    let start_time = Local::now();
    let run_dir = config
        .output
        .dir
        .join(format!("{}", start_time.format(FILE_STRFTIME)));

    // create dirs and save config
    {
        tokio::fs::create_dir_all(&run_dir).await?;
        let path = run_dir.join("config.json5");
        let text = serde_json::to_string_pretty(&*config)?;
        tokio::fs::write(&path, text).await?;
    }

    // load dataset
    info!("loading dataset");
    let dataset = {
        let annotation_file = config.dataset.annotation_file.clone();
        Arc::new(tokio::task::spawn_blocking(move || Dataset::open(annotation_file)).await??)
    };
    let pipeline = Arc::new(config.pipeline.build()?);
    let writer = Arc::new(Writer::new(&run_dir, &config.output));
    info!(
        "augment {} records {} times with stages {:?}",
        dataset.len(),
        config.repeat,
        pipeline.stage_names()
    );

    // job n is the pair (repetition, record)
    let num_records = dataset.len();
    let jobs = (0..config.repeat.get())
        .flat_map(|repetition| (0..num_records).map(move |index| (repetition, index)))
        .enumerate();

    let mut entries: Vec<(usize, ManifestEntry)> = stream::iter(jobs)
        .map(|(job_index, (repetition, record_index))| {
            let dataset = dataset.clone();
            let pipeline = pipeline.clone();
            let writer = writer.clone();
            let seed = config.seed;
            let span = info_span!("job", index = job_index);

            tokio::task::spawn_blocking(move || -> Result<_> {
                let _guard = span.enter();
                let record = &dataset.records()[record_index];
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(job_index as u64)),
                    None => StdRng::from_entropy(),
                };

                let sample = record.load()?;
                let sample = pipeline.apply(sample, &mut rng).with_context(|| {
                    format!("failed to augment '{}'", record.image_file.display())
                })?;
                let entry = writer.write(&record.stem, repetition, &sample)?;
                Ok((job_index, entry))
            })
            .map(|result| Ok::<_, Error>(result??))
        })
        .buffer_unordered(config.num_workers.get())
        .try_collect()
        .instrument(info_span!("augment"))
        .await?;

    // restore job order
    entries.sort_by_key(|(job_index, _)| *job_index);
    let entries: Vec<_> = entries.into_iter().map(|(_, entry)| entry).collect();

    let manifest_file = run_dir.join(MANIFEST_FILE_NAME);
    let num_entries = entries.len();
    tokio::task::spawn_blocking({
        let manifest_file = manifest_file.clone();
        move || writer::save_manifest(manifest_file, &entries)
    })
    .await??;

    info!(
        "wrote {} samples to '{}'",
        num_entries,
        run_dir.display()
    );
    Ok(run_dir)
}
