//! Replays decoded HDDP replies into the reconciler
//!
//! Input is JSON lines, one `DiscoveryPacket` per line. Blank lines and
//! lines starting with `#` are ignored. A bad line or a failed packet is
//! logged and counted; the replay continues with the next one.

use anyhow::{Context, Result};
use hddp_core::DiscoveryPacket;
use hddp_hosts::HostReconciler;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, error, warn};

/// Where replies are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacketSource {
    File(PathBuf),
    Stdin,
}

impl PacketSource {
    pub fn from_path(path: Option<&str>) -> Self {
        match path {
            None | Some("-") => Self::Stdin,
            Some(p) => Self::File(PathBuf::from(p)),
        }
    }
}

impl std::fmt::Display for PacketSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PacketSource::File(path) => write!(f, "{}", path.display()),
            PacketSource::Stdin => write!(f, "stdin"),
        }
    }
}

/// Totals over a replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub packets: usize,
    pub failed: usize,
    pub created: usize,
    pub moved: usize,
    pub skipped: usize,
}

/// Parse one input line; `None` for blank and comment lines
pub fn parse_packet_line(line: &str) -> Result<Option<DiscoveryPacket>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let packet: DiscoveryPacket = serde_json::from_str(line).context("invalid discovery packet")?;
    Ok(Some(packet))
}

/// Replay every packet from `source`
pub async fn replay_source(source: &PacketSource, reconciler: &HostReconciler) -> Result<ReplayStats> {
    match source {
        PacketSource::File(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?;
            replay(BufReader::new(file), reconciler).await
        }
        PacketSource::Stdin => replay(BufReader::new(tokio::io::stdin()), reconciler).await,
    }
}

/// Replay every packet from a line reader
pub async fn replay<R: AsyncBufRead + Unpin>(reader: R, reconciler: &HostReconciler) -> Result<ReplayStats> {
    let mut stats = ReplayStats::default();
    let mut lines = reader.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let packet = match parse_packet_line(&line) {
            Ok(Some(packet)) => packet,
            Ok(None) => continue,
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping unreadable packet");
                stats.failed += 1;
                continue;
            }
        };

        stats.packets += 1;
        debug!(line = line_no, devices = packet.num_devices, mode = packet.mode, "Reconciling packet");

        match reconciler.reconcile(&packet) {
            Ok(summary) => {
                stats.created += summary.created;
                stats.moved += summary.moved;
                stats.skipped += summary.skipped;
            }
            Err(e) => {
                error!(line = line_no, error = %e, "Failed to reconcile packet");
                stats.failed += 1;
            }
        }
    }

    Ok(stats)
}
