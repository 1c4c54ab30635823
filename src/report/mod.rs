//! Report data model and report directory writer
//!
//! `Report` is everything the page needs: the ordered day list, the global
//! totals, the visitor leaderboard, the four day-keyed breakdowns, and the
//! region attribution. Maps are `BTreeMap` so the serialized data is stable.

pub mod assets;
pub mod render;

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::analysis::counter::{Direction, OrderedCounter};
use crate::analysis::Analysis;
use crate::error::ReportError;
use crate::geoip::region::RegionAggregate;

#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub days: Vec<String>,
    pub hit_total: u64,
    pub bytes_total: u64,
    /// Visitors, busiest first
    pub visitors: OrderedCounter,
    pub status_total: BTreeMap<String, u64>,

    pub hit_days: BTreeMap<String, u64>,
    pub bytes_days: BTreeMap<String, u64>,
    pub visitors_days: BTreeMap<String, BTreeMap<String, u64>>,
    pub status_days: BTreeMap<String, BTreeMap<String, u64>>,

    pub region_total: BTreeMap<String, u64>,
    /// `[longitude, latitude]` per region
    pub region_location: BTreeMap<String, [f64; 2]>,
}

fn sorted(map: &HashMap<String, u64>) -> BTreeMap<String, u64> {
    map.iter().map(|(k, v)| (k.clone(), *v)).collect()
}

impl Report {
    pub fn build(analysis: &Analysis, regions: &RegionAggregate) -> Self {
        let mut visitors = analysis.visitor_counter();
        visitors.sort_by(Direction::Descending);

        let mut report = Report {
            days: analysis.days.clone(),
            hit_total: analysis.hit_total,
            bytes_total: analysis.bytes_total,
            visitors,
            status_total: sorted(&analysis.statuses),
            region_total: sorted(&regions.totals()),
            region_location: regions
                .locations()
                .into_iter()
                .map(|(name, (lon, lat))| (name, [lon, lat]))
                .collect(),
            ..Default::default()
        };

        for (day, stats) in &analysis.per_day {
            report.hit_days.insert(day.clone(), stats.hits);
            report.bytes_days.insert(day.clone(), stats.bytes);
            report.visitors_days.insert(day.clone(), sorted(&stats.visitors));
            report.status_days.insert(day.clone(), sorted(&stats.statuses));
        }
        report
    }

    /// Write the report directory: the copied template tree, `index.html`
    /// and `data.json`. `out_dir` must not exist yet.
    pub fn write(&self, template_dir: &Path, out_dir: &Path) -> Result<PathBuf, ReportError> {
        if out_dir.exists() {
            return Err(ReportError::OutputExists(out_dir.to_path_buf()));
        }

        // Render before touching the filesystem so a failure leaves nothing behind
        let page = render::page(self)?;
        let data = serde_json::to_string_pretty(self)?;

        let copied = assets::copy_dir(template_dir, out_dir)?;
        info!("Copied {} template files to {}", copied, out_dir.display());

        let index = out_dir.join("index.html");
        write_file(&index, &page)?;
        write_file(&out_dir.join("data.json"), &data)?;
        Ok(index)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), ReportError> {
    fs::write(path, contents).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
