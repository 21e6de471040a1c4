use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One line of the download-spec file, resolved to concrete years and months.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSpec {
    pub site_id: String,
    pub years: Vec<i32>,
    pub months: Vec<u32>,
    pub start_time: String,
    pub end_time: String,
}

/// Year -> months for which the remote archive reports at least one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityIndex {
    months: BTreeMap<i32, BTreeSet<u32>>,
}

impl AvailabilityIndex {
    pub fn insert(&mut self, year: i32, month: u32) {
        self.months.entry(year).or_default().insert(month);
    }

    pub fn contains(&self, year: i32, month: u32) -> bool {
        self.months
            .get(&year)
            .map(|months| months.contains(&month))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn len(&self) -> usize {
        self.months.values().map(BTreeSet::len).sum()
    }
}

impl FromIterator<(i32, u32)> for AvailabilityIndex {
    fn from_iter<I: IntoIterator<Item = (i32, u32)>>(iter: I) -> Self {
        let mut index = AvailabilityIndex::default();
        for (year, month) in iter {
            index.insert(year, month);
        }
        index
    }
}

/// Identity of one requestable archive. `day == None` is a whole month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveUnit {
    pub site_id: String,
    pub year: i32,
    pub month: u32,
    pub day: Option<u32>,
}

impl ArchiveUnit {
    pub fn daily(site_id: &str, year: i32, month: u32, day: u32) -> Self {
        Self {
            site_id: site_id.to_string(),
            year,
            month,
            day: Some(day),
        }
    }

    pub fn monthly(site_id: &str, year: i32, month: u32) -> Self {
        Self {
            site_id: site_id.to_string(),
            year,
            month,
            day: None,
        }
    }

    /// Temporary archive file name, e.g. `harvard_2020_6_15.zip`.
    pub fn archive_name(&self) -> String {
        match self.day {
            Some(day) => format!("{}_{}_{}_{}.zip", self.site_id, self.year, self.month, day),
            None => format!("{}_{}_{}.zip", self.site_id, self.year, self.month),
        }
    }

    /// Prefix shared by every image of this unit, e.g. `harvard_2020_06_15`.
    pub fn file_prefix(&self) -> String {
        match self.day {
            Some(day) => format!("{}_{}_{:02}_{:02}", self.site_id, self.year, self.month, day),
            None => format!("{}_{}_{:02}", self.site_id, self.year, self.month),
        }
    }

    pub fn partition(&self, mirror_root: &Path) -> PathBuf {
        let path = mirror_root
            .join(&self.site_id)
            .join(self.year.to_string())
            .join(format!("{:02}", self.month));
        match self.day {
            Some(day) => path.join(format!("{:02}", day)),
            None => path,
        }
    }

    /// First and last calendar day covered by this unit.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match self.day {
            Some(day) => {
                let date = NaiveDate::from_ymd_opt(self.year, self.month, day)?;
                Some((date, date))
            }
            None => {
                let last = days_in_month(self.year, self.month)?;
                Some((
                    NaiveDate::from_ymd_opt(self.year, self.month, 1)?,
                    NaiveDate::from_ymd_opt(self.year, self.month, last)?,
                ))
            }
        }
    }
}

impl std::fmt::Display for ArchiveUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.day {
            Some(day) => write!(f, "{} {}/{:02}/{:02}", self.site_id, self.year, self.month, day),
            None => write!(f, "{} {}/{:02}", self.site_id, self.year, self.month),
        }
    }
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Month absent from the availability index; nothing requested.
    Pruned,
    /// Partition already holds matching images.
    Skipped,
    /// The service produced no archive link for this unit.
    MissingRemote,
    Unpacked { files: usize, bytes: u64 },
}

#[derive(Debug)]
pub struct UnitReport {
    pub unit: ArchiveUnit,
    pub outcome: UnitOutcome,
}

#[derive(Debug, Default)]
pub struct MirrorSummary {
    pub reports: Vec<UnitReport>,
    pub total_duration: Duration,
}

impl MirrorSummary {
    pub fn record(&mut self, unit: ArchiveUnit, outcome: UnitOutcome) {
        self.reports.push(UnitReport { unit, outcome });
    }

    pub fn count(&self, matches: fn(&UnitOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| matches(&r.outcome)).count()
    }

    pub fn unpacked(&self) -> usize {
        self.count(|o| matches!(o, UnitOutcome::Unpacked { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| *o == UnitOutcome::Skipped)
    }

    pub fn pruned(&self) -> usize {
        self.count(|o| *o == UnitOutcome::Pruned)
    }

    pub fn missing_remote(&self) -> usize {
        self.count(|o| *o == UnitOutcome::MissingRemote)
    }

    pub fn files_written(&self) -> usize {
        self.reports
            .iter()
            .map(|r| match r.outcome {
                UnitOutcome::Unpacked { files, .. } => files,
                _ => 0,
            })
            .sum()
    }

    pub fn bytes_written(&self) -> u64 {
        self.reports
            .iter()
            .map(|r| match r.outcome {
                UnitOutcome::Unpacked { bytes, .. } => bytes,
                _ => 0,
            })
            .sum()
    }
}
