//! `plugfetch fetch <id>` – start an acquisition and poll it to completion.

use anyhow::{bail, Result};
use plugfetch_core::jobs::{JobRecord, JobStatus, ProgressStats};
use plugfetch_core::service::Service;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub async fn run_fetch(svc: &Service, id: &str, quiet: bool) -> Result<()> {
    let reply = svc.start_acquisition(id);
    if !reply.success {
        bail!("{}", reply.error.unwrap_or_default());
    }

    let mut last_status = JobStatus::Unknown;
    let mut download_started: Option<Instant> = None;
    let record = loop {
        let record = svc.acquisition_status(id).state.unwrap_or_default();
        if record.status != last_status {
            if record.status == JobStatus::Downloading {
                download_started = Some(Instant::now());
            }
            if !quiet {
                eprintln!("{}{}", record.status.as_str(), mirror_suffix(&record));
            }
            last_status = record.status;
        }
        if record.status.is_terminal() {
            break record;
        }
        if !quiet && record.status == JobStatus::Downloading {
            let elapsed = download_started.map(|t| t.elapsed().as_secs_f64()).unwrap_or(0.0);
            eprint!("\r  {}", progress_line(&ProgressStats::from_record(&record, elapsed)));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    };

    match record.status {
        JobStatus::Done => {
            let path = record
                .installed_path
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!("installed {}", path);
            Ok(())
        }
        _ => bail!("{}", record.error_message.unwrap_or_default()),
    }
}

fn mirror_suffix(record: &JobRecord) -> String {
    match (record.status, record.current_mirror_index) {
        (JobStatus::Checking, Some(i)) => format!(" (mirror {})", i),
        _ => String::new(),
    }
}

fn progress_line(stats: &ProgressStats) -> String {
    let done_kib = stats.bytes_done as f64 / 1024.0;
    let rate_kib = stats.bytes_per_sec() / 1024.0;
    match stats.fraction() {
        Some(f) => {
            let eta = stats
                .eta_secs()
                .map(|s| format!("{:.0}s", s))
                .unwrap_or_else(|| "?".to_string());
            format!(
                "{:.1} / {:.1} KiB ({:.1}%)  {:.1} KiB/s  ETA {}  ",
                done_kib,
                stats.total_bytes as f64 / 1024.0,
                f * 100.0,
                rate_kib,
                eta
            )
        }
        None => format!("{:.1} KiB  {:.1} KiB/s  ", done_kib, rate_kib),
    }
}
