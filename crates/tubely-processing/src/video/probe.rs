use crate::error::{ProcessingError, ProcessingResult};
use serde::Deserialize;
use tubely_core::ProbeResult;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<serde_json::Value>,
    height: Option<serde_json::Value>,
}

fn dimension(value: Option<&serde_json::Value>) -> Option<u32> {
    let n = value?.as_u64()?;
    u32::try_from(n).ok().filter(|n| *n > 0)
}

/// Extract the geometry of the first video stream from `ffprobe -print_format json` output.
pub fn parse_probe_output(stdout: &[u8]) -> ProcessingResult<ProbeResult> {
    let output: FfprobeOutput = serde_json::from_slice(stdout)
        .map_err(|e| ProcessingError::Probe(format!("unparseable ffprobe output: {}", e)))?;

    let stream = output
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ProcessingError::Probe("no video stream".to_string()))?;

    match (dimension(stream.width.as_ref()), dimension(stream.height.as_ref())) {
        (Some(width), Some(height)) => Ok(ProbeResult { width, height }),
        _ => Err(ProcessingError::Probe(
            "first video stream has no width and height".to_string(),
        )),
    }
}
