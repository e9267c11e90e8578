//! Parallel batch composition

use crate::ingest::Row;
use anyhow::{Context, Result};
use certificate::{CertificateComposer, CertificateId, RecordData, StyleConfiguration};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{error, info};

/// Redraws allowed per record before giving up on a unique identifier
const MAX_ID_ATTEMPTS: usize = 16;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub out_dir: PathBuf,
    pub base_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issued {
    pub certificate_id: String,
    pub name: String,
    pub course: String,
    pub issue_date: String,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Failed {
    pub certificate_id: String,
    pub error: String,
}

#[derive(Debug, Default, Serialize)]
pub struct Manifest {
    pub issued: Vec<Issued>,
    pub failed: Vec<Failed>,
}

/// Give every row an identifier unique within the batch
pub fn assign_ids(rows: Vec<Row>) -> Result<Vec<RecordData>> {
    let mut taken = HashSet::with_capacity(rows.len());
    rows.into_iter()
        .map(|row| {
            let id = CertificateId::generate_unique(|id| taken.contains(id), MAX_ID_ATTEMPTS)?;
            taken.insert(id.clone());
            Ok(RecordData::new(row.name, row.course, row.issue_date, id))
        })
        .collect()
}

/// Compose every record and write `{id}.pdf` plus `manifest.json`
///
/// Records are independent: one failing does not stop the others. Runs on
/// the current rayon pool.
pub fn run_batch(
    composer: &CertificateComposer,
    template: &[u8],
    records: &[RecordData],
    style: Option<&StyleConfiguration>,
    options: &BatchOptions,
) -> Result<Manifest> {
    std::fs::create_dir_all(&options.out_dir)
        .with_context(|| format!("Failed to create {}", options.out_dir.display()))?;

    info!(records = records.len(), configured = style.is_some(), "Starting batch");

    let outcomes: Vec<std::result::Result<Issued, Failed>> = records
        .par_iter()
        .map(|record| render_one(composer, template, record, style, options))
        .collect();

    let mut manifest = Manifest::default();
    for outcome in outcomes {
        match outcome {
            Ok(issued) => manifest.issued.push(issued),
            Err(failed) => manifest.failed.push(failed),
        }
    }

    let manifest_path = options.out_dir.join("manifest.json");
    let json = serde_json::to_vec_pretty(&manifest)?;
    std::fs::write(&manifest_path, json)
        .with_context(|| format!("Failed to write {}", manifest_path.display()))?;

    info!(
        issued = manifest.issued.len(),
        failed = manifest.failed.len(),
        manifest = %manifest_path.display(),
        "Batch finished"
    );
    Ok(manifest)
}

fn render_one(
    composer: &CertificateComposer,
    template: &[u8],
    record: &RecordData,
    style: Option<&StyleConfiguration>,
    options: &BatchOptions,
) -> std::result::Result<Issued, Failed> {
    let id = record.certificate_id.to_string();
    let file_name = format!("{id}.pdf");

    let written = composer
        .compose(template, record, style, options.base_address.as_deref())
        .map_err(anyhow::Error::from)
        .and_then(|bytes| {
            let path = options.out_dir.join(&file_name);
            std::fs::write(&path, bytes)
                .with_context(|| format!("Failed to write {}", path.display()))
        });

    match written {
        Ok(()) => Ok(Issued {
            certificate_id: id,
            name: record.name.clone(),
            course: record.course.clone(),
            issue_date: record.issue_date.clone(),
            file: file_name,
        }),
        Err(e) => {
            error!(certificate_id = %id, error = %format!("{e:#}"), "Certificate failed");
            Err(Failed {
                certificate_id: id,
                error: format!("{e:#}"),
            })
        }
    }
}
