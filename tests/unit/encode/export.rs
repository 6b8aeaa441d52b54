use super::*;
use crate::encode::sink::InMemorySink;
use chrono::TimeZone;

fn frames(n: u64, w: u32, h: u32) -> Vec<Frame> {
    (0..n)
        .map(|i| {
            let shade = (i * 20) as u8;
            let rgba = FrameRGBA {
                width: w,
                height: h,
                data: [shade, shade, shade, 255].repeat((w * h) as usize),
                premultiplied: true,
            };
            Frame::encode(FrameIndex(i), &rgba).unwrap()
        })
        .collect()
}

#[test]
fn opts_from_capture_interval() {
    let opts = ExportOpts::for_interval(Duration::from_millis(50)).unwrap();
    assert_eq!(opts.fps, 20);
    assert_eq!(opts.pace, Some(Duration::from_millis(50)));
    assert_eq!(opts.tail_frames(), 10);
    opts.validate().unwrap();

    let mut bad = opts.clone();
    bad.decode_chunk = 0;
    assert!(bad.validate().is_err());
}

#[test]
fn filename_uses_utc_timestamp() {
    let t = chrono::Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
    assert_eq!(
        timestamped_filename(t, VideoContainer::WebM),
        "code-playback-2024-03-09T07-05-01.webm"
    );
    assert_eq!(
        timestamped_filename(t, VideoContainer::Mp4),
        "code-playback-2024-03-09T07-05-01.mp4"
    );
}

#[tokio::test]
async fn empty_buffer_never_opens_the_sink() {
    let opts = ExportOpts::for_interval(Duration::from_millis(50)).unwrap();
    let (sink, report) = export_frames(Vec::new(), InMemorySink::new(), &opts)
        .await
        .unwrap();
    assert!(sink.config().is_none());
    assert!(!sink.is_ended());
    assert!(report.is_empty());
}

#[tokio::test]
async fn frames_are_pushed_in_order_with_tail_hold() {
    let opts = ExportOpts {
        decode_chunk: 3,
        ..ExportOpts::unpaced(Duration::from_millis(50)).unwrap()
    };
    let (sink, report) = export_frames(frames(7, 4, 2), InMemorySink::new(), &opts)
        .await
        .unwrap();

    assert_eq!(
        sink.config(),
        Some(SinkConfig {
            width: 4,
            height: 2,
            fps: 20
        })
    );
    assert!(sink.is_ended());
    assert_eq!(report.captured, 7);
    assert_eq!(report.written, 17);
    assert_eq!(report.duration(), Duration::from_millis(850));

    let pushed = sink.frames();
    assert!(pushed.iter().enumerate().all(|(i, (idx, _))| idx.0 == i as u64));
    for (i, (_, f)) in pushed.iter().take(7).enumerate() {
        assert_eq!(f.data[0], (i * 20) as u8);
    }
    assert!(pushed[7..].iter().all(|(_, f)| f.data[0] == 120));
}

#[tokio::test(start_paused = true)]
async fn paced_export_takes_real_time() {
    let opts = ExportOpts::for_interval(Duration::from_millis(50)).unwrap();
    let start = tokio::time::Instant::now();
    let (_, report) = export_frames(frames(4, 2, 2), InMemorySink::new(), &opts)
        .await
        .unwrap();
    assert_eq!(report.written, 14);
    // First push is immediate, each further push waits one interval.
    assert!(start.elapsed() >= Duration::from_millis(13 * 50));
}

#[tokio::test]
async fn mixed_sizes_are_an_encode_error() {
    let mut all = frames(2, 2, 2);
    all.extend(frames(1, 4, 4));
    let opts = ExportOpts::unpaced(Duration::from_millis(50)).unwrap();
    let err = export_frames(all, InMemorySink::new(), &opts)
        .await
        .unwrap_err();
    assert!(matches!(err, PlaybackError::Encode(_)));
}
