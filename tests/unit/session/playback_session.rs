use super::*;
use crate::foundation::core::Canvas;

fn opts() -> SessionOpts {
    SessionOpts {
        capture: CaptureConfig {
            canvas: Canvas {
                width: 64,
                height: 48,
            },
            scale: 1,
            font_size: 8.0,
            line_height: 10.0,
            padding: 4.0,
            gutter_width: 12.0,
        },
        font: FontChoice::Disabled,
        realtime_export: false,
        ..SessionOpts::default()
    }
}

#[test]
fn default_opts_are_valid() {
    let o = SessionOpts::default();
    o.validate().unwrap();
    assert_eq!(o.capture_interval, Duration::from_millis(50));
    assert_eq!(o.rate, 30);
    assert_eq!(o.export_opts().unwrap().pace, Some(Duration::from_millis(50)));
}

#[test]
fn invalid_opts_are_rejected() {
    let mut o = opts();
    o.capture_interval = Duration::ZERO;
    assert!(o.validate().is_err());

    let mut o = opts();
    o.rate = 0;
    assert!(o.validate().is_err());

    let mut o = opts();
    o.channel_capacity = 0;
    assert!(o.validate().is_err());
}

#[tokio::test(start_paused = true)]
async fn typing_reveals_and_pauses_at_end() {
    let (h, _task) = PlaybackSession::spawn(opts()).unwrap();
    h.load(SourceFile::new("a.js", "ab")).await.unwrap();
    let mut rx = h.subscribe();
    assert_eq!(&**rx.borrow_and_update(), "");

    assert!(h.start().await.unwrap());
    rx.changed().await.unwrap();
    assert_eq!(&**rx.borrow_and_update(), "a");
    rx.changed().await.unwrap();
    assert_eq!(&**rx.borrow_and_update(), "ab");

    let st = h.status().await.unwrap();
    assert_eq!(st.playback.cursor, 2);
    assert!(!st.playback.running);
    assert_eq!(st.language, "javascript");
    assert_eq!(st.path.as_deref(), Some("a.js"));
}

#[tokio::test(start_paused = true)]
async fn start_on_empty_source_is_a_no_op() {
    let (h, _task) = PlaybackSession::spawn(opts()).unwrap();
    assert!(!h.start().await.unwrap());
    assert!(!h.status().await.unwrap().playback.running);
}

#[tokio::test(start_paused = true)]
async fn set_rate_zero_is_an_input_error() {
    let (h, _task) = PlaybackSession::spawn(opts()).unwrap();
    assert!(matches!(h.set_rate(0).await, Err(PlaybackError::Input(_))));
    h.set_rate(120).await.unwrap();
    assert_eq!(h.status().await.unwrap().playback.rate, 120);
}

#[tokio::test(start_paused = true)]
async fn load_resets_prefix_and_frames() {
    let (h, _task) = PlaybackSession::spawn(opts()).unwrap();
    h.load(SourceFile::new("x.py", "print(1)")).await.unwrap();
    h.start_recording().await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(h.status().await.unwrap().frames > 0);
    assert!(!h.displayed().is_empty());

    h.load(SourceFile::new("y.py", "pass")).await.unwrap();
    let st = h.status().await.unwrap();
    assert!(!st.recording);
    assert_eq!(st.frames, 0);
    assert_eq!(st.playback.cursor, 0);
    assert_eq!(&*h.displayed(), "");
}

#[tokio::test(start_paused = true)]
async fn shutdown_ends_the_task() {
    let (h, task) = PlaybackSession::spawn(opts()).unwrap();
    h.shutdown().await.unwrap();
    task.await.unwrap();
    assert!(h.status().await.is_err());
}
