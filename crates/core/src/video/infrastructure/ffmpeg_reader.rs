use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::source_spec::SourceSpec;
use crate::video::domain::video_reader::VideoReader;
use crate::video::infrastructure::capture_options::CaptureOptions;

#[cfg(target_os = "linux")]
const DEFAULT_DEVICE: Option<(&str, &str)> = Some(("v4l2", "/dev/video0"));
#[cfg(target_os = "macos")]
const DEFAULT_DEVICE: Option<(&str, &str)> = Some(("avfoundation", "0"));
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
const DEFAULT_DEVICE: Option<(&str, &str)> = None;

/// Decodes camera, stream and file frames via ffmpeg-next (libavformat +
/// libavcodec), one frame per call.
///
/// Converts each decoded frame to RGB24 and wraps it in a [`Frame`]. Stream
/// sources are opened with the configured [`CaptureOptions`] plus
/// low-latency flags so at most one decoded frame is ever pending.
pub struct FfmpegReader {
    options: CaptureOptions,
    stream: Option<OpenStream>,
}

// Safety: FfmpegReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    pub fn new(options: CaptureOptions) -> Self {
        Self {
            options,
            stream: None,
        }
    }
}

impl Default for FfmpegReader {
    fn default() -> Self {
        Self::new(CaptureOptions::default())
    }
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, source: &SourceSpec) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        self.stream = None;

        let ictx = open_input(source, &self.options)?;

        let (video_stream_index, decoder, fps) = {
            let stream = ictx
                .streams()
                .best(ffmpeg_next::media::Type::Video)
                .ok_or("No video stream found")?;
            let codec_ctx =
                ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
            let decoder = codec_ctx.decoder().video()?;
            let rate = stream.rate();
            let fps = if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            };
            (stream.index(), decoder, fps)
        };

        let width = decoder.width();
        let height = decoder.height();
        if width == 0 || height == 0 {
            return Err(format!("{source}: video stream reports no frame size").into());
        }

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        let metadata = VideoMetadata {
            width,
            height,
            fps,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source: source.to_string(),
        };

        self.stream = Some(OpenStream {
            ictx,
            decoder,
            scaler,
            width,
            height,
            video_stream_index,
            frame_index: 0,
            flushing: false,
            done: false,
        });

        Ok(metadata)
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let Some(stream) = self.stream.as_mut() else {
            return Err("FfmpegReader: not opened".into());
        };
        stream.next_frame()
    }

    fn close(&mut self) {
        self.stream = None;
    }
}

/// Demuxer, decoder and scaler for one opened source.
struct OpenStream {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    video_stream_index: usize,
    frame_index: usize,
    flushing: bool,
    done: bool,
}

impl OpenStream {
    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        if self.done {
            return Ok(None);
        }

        if let Some(frame) = self.try_receive()? {
            return Ok(Some(frame));
        }

        if self.flushing {
            self.done = true;
            return Ok(None);
        }

        loop {
            let Some((stream, packet)) = self.ictx.packets().next() else {
                let _ = self.decoder.send_eof();
                self.flushing = true;
                if let Some(frame) = self.try_receive()? {
                    return Ok(Some(frame));
                }
                self.done = true;
                return Ok(None);
            };

            if stream.index() != self.video_stream_index {
                continue;
            }

            if self.decoder.send_packet(&packet).is_err() {
                continue;
            }

            if let Some(frame) = self.try_receive()? {
                return Ok(Some(frame));
            }
        }
    }

    fn try_receive(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        self.scaler.run(&decoded, &mut rgb_frame)?;

        let pixels = extract_rgb_pixels(&rgb_frame, self.width, self.height);
        let frame = Frame::new(pixels, self.width, self.height, 3, self.frame_index);
        self.frame_index += 1;
        Ok(Some(frame))
    }
}

fn open_input(
    source: &SourceSpec,
    options: &CaptureOptions,
) -> Result<ffmpeg_next::format::context::Input, Box<dyn std::error::Error>> {
    match source {
        SourceSpec::DefaultDevice => open_default_device(),
        SourceSpec::Stream(url) => {
            let mut dict = ffmpeg_next::Dictionary::new();
            for (key, value) in options.stream_options() {
                dict.set(&key, &value);
            }
            Ok(ffmpeg_next::format::input_with_dictionary(url, dict)?)
        }
        SourceSpec::Path(path) => Ok(ffmpeg_next::format::input(path)?),
    }
}

/// Opens the platform's first camera through the matching device demuxer.
fn open_default_device() -> Result<ffmpeg_next::format::context::Input, Box<dyn std::error::Error>>
{
    let (demuxer, device) =
        DEFAULT_DEVICE.ok_or("no default camera demuxer for this platform")?;

    let format = ffmpeg_next::device::input::video()
        .find(|f| f.name().split(',').any(|name| name == demuxer))
        .ok_or_else(|| format!("capture demuxer '{demuxer}' is not available"))?;

    let ctx = ffmpeg_next::format::open_with(
        device,
        &ffmpeg_next::format::format::Format::Input(format),
        ffmpeg_next::Dictionary::new(),
    )?;

    match ctx {
        ffmpeg_next::format::context::Context::Input(input) => Ok(input),
        ffmpeg_next::format::context::Context::Output(_) => {
            Err(format!("{device} opened as an output").into())
        }
    }
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer.
///
/// ffmpeg frames may have padding bytes at the end of each row (stride > width*3).
/// This function strips that padding to produce a tightly-packed pixel buffer.
fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn create_test_video(path: &Path, num_frames: usize, width: u32, height: u32, fps: i32) {
        ffmpeg_next::init().unwrap();

        let mut octx = ffmpeg_next::format::output(path).unwrap();

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4).unwrap();
        let mut ost = octx.add_stream(Some(codec)).unwrap();

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .unwrap();

        encoder_ctx.set_width(width);
        encoder_ctx.set_height(height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, fps));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let mut encoder = encoder_ctx
            .open_with(ffmpeg_next::Dictionary::new())
            .unwrap();
        ost.set_parameters(&encoder);

        octx.write_header().unwrap();

        let ost_time_base = octx.stream(0).unwrap().time_base();

        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::format::Pixel::YUV420P,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .unwrap();

        for i in 0..num_frames {
            let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
                ffmpeg_next::format::Pixel::RGB24,
                width,
                height,
            );
            let stride = rgb_frame.stride(0);
            let data = rgb_frame.data_mut(0);
            let value = ((i * 40) % 256) as u8;
            for row in 0..height as usize {
                for col in 0..width as usize {
                    let offset = row * stride + col * 3;
                    data[offset] = value;
                    data[offset + 1] = value;
                    data[offset + 2] = value;
                }
            }

            let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
            scaler.run(&rgb_frame, &mut yuv_frame).unwrap();
            yuv_frame.set_pts(Some(i as i64));

            encoder.send_frame(&yuv_frame).unwrap();

            let mut encoded = ffmpeg_next::Packet::empty();
            while encoder.receive_packet(&mut encoded).is_ok() {
                encoded.set_stream(0);
                encoded.rescale_ts(ffmpeg_next::Rational(1, fps), ost_time_base);
                encoded.write_interleaved(&mut octx).unwrap();
            }
        }

        encoder.send_eof().unwrap();
        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(0);
            encoded.rescale_ts(ffmpeg_next::Rational(1, fps), ost_time_base);
            encoded.write_interleaved(&mut octx).unwrap();
        }

        octx.write_trailer().unwrap();
    }

    fn test_video(dir: &Path, frames: usize) -> (PathBuf, SourceSpec) {
        let path = dir.join("test.mp4");
        create_test_video(&path, frames, 160, 120, 25);
        let spec = SourceSpec::Path(path.to_string_lossy().into_owned());
        (path, spec)
    }

    fn read_all(reader: &mut FfmpegReader) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Some(frame) = reader.read_frame().unwrap() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn test_open_returns_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let (path, spec) = test_video(dir.path(), 5);

        let mut reader = FfmpegReader::default();
        let meta = reader.open(&spec).unwrap();
        assert_eq!(meta.width, 160);
        assert_eq!(meta.height, 120);
        assert!(meta.fps > 0.0);
        assert_eq!(meta.source, path.to_string_lossy());
    }

    #[test]
    fn test_open_nonexistent_fails() {
        let mut reader = FfmpegReader::default();
        let spec = SourceSpec::Path("/nonexistent/test.mp4".into());
        assert!(reader.open(&spec).is_err());
    }

    #[test]
    fn test_read_before_open_fails() {
        let mut reader = FfmpegReader::default();
        assert!(reader.read_frame().is_err());
    }

    #[test]
    fn test_reads_every_frame_then_end_of_stream() {
        let dir = tempfile::tempdir().unwrap();
        let (_, spec) = test_video(dir.path(), 5);

        let mut reader = FfmpegReader::default();
        reader.open(&spec).unwrap();
        let frames = read_all(&mut reader);

        assert_eq!(frames.len(), 5);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.index(), i);
            assert_eq!(frame.width(), 160);
            assert_eq!(frame.height(), 120);
            assert_eq!(frame.channels(), 3);
        }
        // stays at end of stream
        assert!(reader.read_frame().unwrap().is_none());
    }

    #[test]
    fn test_reopen_after_close_restarts_from_first_frame() {
        let dir = tempfile::tempdir().unwrap();
        let (_, spec) = test_video(dir.path(), 3);

        let mut reader = FfmpegReader::default();
        reader.open(&spec).unwrap();
        reader.read_frame().unwrap();
        reader.close();
        assert!(reader.read_frame().is_err());

        reader.open(&spec).unwrap();
        let first = reader.read_frame().unwrap().unwrap();
        assert_eq!(first.index(), 0);
    }

    #[test]
    fn test_extract_rgb_pixels_strips_padding() {
        ffmpeg_next::init().unwrap();
        let mut frame =
            ffmpeg_next::util::frame::video::Video::new(ffmpeg_next::format::Pixel::RGB24, 3, 2);
        let stride = frame.stride(0);
        let data = frame.data_mut(0);
        for row in 0..2 {
            for byte in 0..9 {
                data[row * stride + byte] = (row * 10 + byte) as u8;
            }
        }
        let pixels = extract_rgb_pixels(&frame, 3, 2);
        assert_eq!(pixels.len(), 18);
        assert_eq!(pixels[0], 0);
        assert_eq!(pixels[9], 10);
        assert_eq!(pixels[17], 18);
    }
}
