//! Stream metadata of the source video, read with ffprobe and handed to
//! filter appliers alongside each request.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

pub const DEFAULT_FFPROBE: &str = "ffprobe";
pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    #[serde(default)]
    pub audio_streams: usize,
}

#[derive(Debug, Deserialize)]
struct FfprobeReport {
    #[serde(default)]
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    format_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
}

/// Runs `program` (ffprobe) on `video_path` and reads its JSON report.
pub async fn analyze_video(
    program: &str,
    video_path: &str,
    timeout: Duration,
) -> Result<VideoInfo> {
    let child = Command::new(program)
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(video_path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to spawn {program}"))?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.with_context(|| format!("failed to collect {program} output"))?,
        Err(_) => bail!(
            "{program} timed out after {} seconds",
            timeout.as_secs_f64()
        ),
    };
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{program} failed on {video_path}: {}", stderr.trim());
    }

    let info = parse_ffprobe_report(&String::from_utf8_lossy(&output.stdout))
        .with_context(|| format!("failed to parse {program} output for {video_path}"))?;
    debug!(video = video_path, ?info, "video analyzed");
    Ok(info)
}

pub fn parse_ffprobe_report(json: &str) -> Result<VideoInfo> {
    let report: FfprobeReport = serde_json::from_str(json)?;
    let video = report
        .streams
        .iter()
        .find(|stream| stream.codec_type.as_deref() == Some("video"));

    Ok(VideoInfo {
        duration_secs: report
            .format
            .duration
            .and_then(|raw| raw.trim().parse().ok()),
        format_name: report.format.format_name,
        width: video.and_then(|stream| stream.width),
        height: video.and_then(|stream| stream.height),
        fps: video
            .and_then(|stream| stream.r_frame_rate.as_deref())
            .and_then(parse_frame_rate),
        video_codec: video.and_then(|stream| stream.codec_name.clone()),
        audio_streams: report
            .streams
            .iter()
            .filter(|stream| stream.codec_type.as_deref() == Some("audio"))
            .count(),
    })
}

/// `30000/1001` as frames per second, rounded to two decimals.
fn parse_frame_rate(raw: &str) -> Option<f64> {
    let (num, den) = raw.trim().split_once('/')?;
    let num: f64 = num.parse().ok()?;
    let den: f64 = den.parse().ok()?;
    if den == 0.0 || num <= 0.0 {
        return None;
    }
    Some((num / den * 100.0).round() / 100.0)
}
