#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub codec: String,
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction() {
        let meta = VideoMetadata {
            width: 1920,
            height: 1080,
            fps: 25.0,
            codec: "h264".to_string(),
            source: "rtsp://camera.local/stream".to_string(),
        };
        assert_eq!(meta.width, 1920);
        assert_eq!(meta.height, 1080);
        assert_eq!(meta.fps, 25.0);
        assert_eq!(meta.codec, "h264");
        assert_eq!(meta.source, "rtsp://camera.local/stream");
    }
}
