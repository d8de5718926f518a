/// Demuxer options applied when opening stream sources.
///
/// Parsed from the OpenCV-style `key;value|key;value` string so existing
/// deployments can keep their `rtsp_transport;tcp` configuration. Built once
/// at startup and reused for every (re)open.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptureOptions {
    pairs: Vec<(String, String)>,
}

/// Options that keep decoder-side buffering to a single frame.
const LOW_LATENCY_OPTIONS: &[(&str, &str)] = &[("fflags", "nobuffer"), ("flags", "low_delay")];

impl CaptureOptions {
    pub fn parse(raw: &str) -> Self {
        let pairs = raw
            .split('|')
            .filter_map(|entry| {
                let (key, value) = entry.split_once(';')?;
                let key = key.trim();
                if key.is_empty() {
                    return None;
                }
                Some((key.to_string(), value.trim().to_string()))
            })
            .collect();
        Self { pairs }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Configured pairs plus the low-latency defaults, configured keys winning.
    pub fn stream_options(&self) -> Vec<(String, String)> {
        let mut options = self.pairs.clone();
        for (key, value) in LOW_LATENCY_OPTIONS {
            if !options.iter().any(|(k, _)| k == key) {
                options.push((key.to_string(), value.to_string()));
            }
        }
        options
    }
}
